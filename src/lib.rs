//! Burned area detection from paired Sentinel-2 Level-2A acquisitions
//!
//! The change in NDVI and NDWI2 between a pre-event and a post-event scene is
//! thresholded, and pixels flagged as clouds, shadows, water or no data by
//! the scene classification layer are masked out. The product is a byte
//! raster where 0 = unburned, 1 = burned and 2 = unreliable.

pub mod types;
pub mod core;
pub mod io;
pub mod workflow;

#[cfg(feature = "python")]
mod python;

// Re-export main types and functions for easier access
pub use types::{
    Acquisition, BurnClass, BurnError, BurnRaster, BurnResult, EventPair, GeoTransform,
    RasterGrid, SceneBands,
};

pub use crate::core::{
    classify_burned_area, BurnRule, BurnedAreaClassifier, BurnedAreaResult, ClassificationStats,
    ClassifierConfig,
};

pub use crate::io::{BandReader, CatalogWriter, RasterWriter};
pub use workflow::{BurnedAreaWorkflow, WorkflowConfig, WorkflowOutput};
