//! Python bindings over numpy arrays

use crate::core::classifier::{
    classify_burned_area, BurnRule, ClassifierConfig, DEFAULT_NDVI_THRESHOLD,
    DEFAULT_NDWI_THRESHOLD,
};
use crate::types::{BurnError, EventPair, SceneBands};
use crate::workflow::{BurnedAreaWorkflow, WorkflowConfig};
use numpy::{PyReadonlyArray2, ToPyArray};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

impl From<BurnError> for PyErr {
    fn from(err: BurnError) -> Self {
        match err {
            BurnError::InvalidInputShape { .. } | BurnError::InvalidThreshold { .. } => {
                PyValueError::new_err(err.to_string())
            }
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

fn parse_config(ndvi_threshold: f64, ndwi_threshold: f64, rule: &str) -> PyResult<ClassifierConfig> {
    let rule: BurnRule = rule
        .parse()
        .map_err(|e: BurnError| PyValueError::new_err(e.to_string()))?;
    Ok(ClassifierConfig::new(ndvi_threshold, ndwi_threshold).with_rule(rule))
}

/// Classify burned area from pre/post-event B04, B08, B11 (uint16) and SCL (uint8).
///
/// Returns a dict with the uint8 `classification` array and per-class counts.
#[pyfunction]
#[pyo3(signature = (
    pre_b04, pre_b08, pre_b11, pre_scl,
    post_b04, post_b08, post_b11, post_scl,
    ndvi_threshold = DEFAULT_NDVI_THRESHOLD,
    ndwi_threshold = DEFAULT_NDWI_THRESHOLD,
    rule = "reference"
))]
#[allow(clippy::too_many_arguments)]
fn classify(
    py: Python,
    pre_b04: PyReadonlyArray2<u16>,
    pre_b08: PyReadonlyArray2<u16>,
    pre_b11: PyReadonlyArray2<u16>,
    pre_scl: PyReadonlyArray2<u8>,
    post_b04: PyReadonlyArray2<u16>,
    post_b08: PyReadonlyArray2<u16>,
    post_b11: PyReadonlyArray2<u16>,
    post_scl: PyReadonlyArray2<u8>,
    ndvi_threshold: f64,
    ndwi_threshold: f64,
    rule: &str,
) -> PyResult<PyObject> {
    let config = parse_config(ndvi_threshold, ndwi_threshold, rule)?;

    let scenes = EventPair::new(
        SceneBands {
            b04: pre_b04.as_array().to_owned(),
            b08: pre_b08.as_array().to_owned(),
            b11: pre_b11.as_array().to_owned(),
            scl: pre_scl.as_array().to_owned(),
        },
        SceneBands {
            b04: post_b04.as_array().to_owned(),
            b08: post_b08.as_array().to_owned(),
            b11: post_b11.as_array().to_owned(),
            scl: post_scl.as_array().to_owned(),
        },
    );

    let result = classify_burned_area(&scenes, config)?;

    let output = PyDict::new(py);
    output.set_item("classification", result.classification.to_pyarray(py))?;
    output.set_item("unburned", result.stats.unburned)?;
    output.set_item("burned", result.stats.burned)?;
    output.set_item("unreliable", result.stats.unreliable)?;
    Ok(output.into())
}

/// Run the catalog-to-catalog workflow; returns the output catalog path
#[pyfunction]
#[pyo3(signature = (
    pre_event, post_event, output_dir = ".",
    ndvi_threshold = DEFAULT_NDVI_THRESHOLD,
    ndwi_threshold = DEFAULT_NDWI_THRESHOLD,
    rule = "reference"
))]
fn run_workflow(
    pre_event: &str,
    post_event: &str,
    output_dir: &str,
    ndvi_threshold: f64,
    ndwi_threshold: f64,
    rule: &str,
) -> PyResult<String> {
    let mut config = WorkflowConfig::new(pre_event, post_event);
    config.output_dir = output_dir.into();
    config.classifier = parse_config(ndvi_threshold, ndwi_threshold, rule)?;

    let output = BurnedAreaWorkflow::new(config).run()?;
    Ok(output.catalog_path.display().to_string())
}

#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(classify, m)?)?;
    m.add_function(wrap_pyfunction!(run_workflow, m)?)?;
    m.add("DEFAULT_NDVI_THRESHOLD", DEFAULT_NDVI_THRESHOLD)?;
    m.add("DEFAULT_NDWI_THRESHOLD", DEFAULT_NDWI_THRESHOLD)?;
    Ok(())
}
