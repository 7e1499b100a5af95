use crate::core::indices;
use crate::core::scl;
use crate::types::{
    BurnClass, BurnError, BurnRaster, BurnResult, EventPair, IndexArray, SceneBands, SclValue,
};
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

/// Default minimum NDVI increase (post - pre) for a burned pixel
pub const DEFAULT_NDVI_THRESHOLD: f64 = 0.19;

/// Default minimum NDWI2 increase (post - pre) for a burned pixel
pub const DEFAULT_NDWI_THRESHOLD: f64 = 0.18;

/// How the spectral test and the scene classification test are combined.
///
/// With `A = dNDWI2 > ndwi_threshold`, `B = dNDVI > ndvi_threshold`,
/// `C = pre_scl == 4` and `D = post_scl == 4`:
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BurnRule {
    /// `(A && B && C) || D`. Any pixel classified as vegetation after the
    /// event is marked burned whatever its index change. Keeps output
    /// identical to previously published burned area products.
    ReferenceCompatible,
    /// `A && B && (C || D)`. Burning always requires the spectral change.
    Corrected,
}

impl Default for BurnRule {
    fn default() -> Self {
        BurnRule::ReferenceCompatible
    }
}

impl std::str::FromStr for BurnRule {
    type Err = BurnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reference" | "reference-compatible" => Ok(BurnRule::ReferenceCompatible),
            "corrected" => Ok(BurnRule::Corrected),
            _ => Err(BurnError::Processing(format!("Unknown burn rule: {}", s))),
        }
    }
}

/// Classifier parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub ndvi_threshold: f64,
    pub ndwi_threshold: f64,
    pub rule: BurnRule,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            ndvi_threshold: DEFAULT_NDVI_THRESHOLD,
            ndwi_threshold: DEFAULT_NDWI_THRESHOLD,
            rule: BurnRule::default(),
        }
    }
}

impl ClassifierConfig {
    pub fn new(ndvi_threshold: f64, ndwi_threshold: f64) -> Self {
        Self {
            ndvi_threshold,
            ndwi_threshold,
            ..Self::default()
        }
    }

    pub fn with_rule(self, rule: BurnRule) -> Self {
        Self { rule, ..self }
    }

    /// Both thresholds must be finite
    pub fn validate(&self) -> BurnResult<()> {
        if !self.ndvi_threshold.is_finite() {
            return Err(BurnError::InvalidThreshold {
                name: "ndvi_threshold",
                value: self.ndvi_threshold,
            });
        }
        if !self.ndwi_threshold.is_finite() {
            return Err(BurnError::InvalidThreshold {
                name: "ndwi_threshold",
                value: self.ndwi_threshold,
            });
        }
        Ok(())
    }
}

/// Pixel counts per output class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationStats {
    pub unburned: usize,
    pub burned: usize,
    pub unreliable: usize,
}

impl ClassificationStats {
    pub fn from_raster(raster: &BurnRaster) -> Self {
        let mut stats = Self::default();
        for &code in raster.iter() {
            match BurnClass::from_code(code) {
                Some(BurnClass::Unburned) => stats.unburned += 1,
                Some(BurnClass::Burned) => stats.burned += 1,
                Some(BurnClass::Unreliable) => stats.unreliable += 1,
                None => {}
            }
        }
        stats
    }

    pub fn total(&self) -> usize {
        self.unburned + self.burned + self.unreliable
    }

    /// Share of burned pixels among the reliable ones, in percent
    pub fn burned_percentage(&self) -> f64 {
        let reliable = self.unburned + self.burned;
        if reliable == 0 {
            0.0
        } else {
            self.burned as f64 / reliable as f64 * 100.0
        }
    }
}

/// Classification raster with its class counts
#[derive(Debug, Clone)]
pub struct BurnedAreaResult {
    pub classification: BurnRaster,
    pub stats: ClassificationStats,
}

/// Burned area classifier over paired pre/post-event Level-2A scenes
pub struct BurnedAreaClassifier {
    config: ClassifierConfig,
}

impl BurnedAreaClassifier {
    /// Classifier with the default thresholds and reference-compatible rule
    pub fn new() -> Self {
        Self {
            config: ClassifierConfig::default(),
        }
    }

    pub fn with_config(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ClassifierConfig {
        self.config
    }

    /// Classify every pixel as unburned (0), burned (1) or unreliable (2).
    ///
    /// Inputs are validated up front, so on error no output is produced.
    pub fn classify(&self, scenes: &EventPair<SceneBands>) -> BurnResult<BurnedAreaResult> {
        self.config.validate()?;
        validate_shapes(scenes)?;

        let (height, width) = scenes.pre.dim();
        log::debug!(
            "Classifying {}x{} pixels (ndvi_threshold={}, ndwi_threshold={}, rule={:?})",
            width,
            height,
            self.config.ndvi_threshold,
            self.config.ndwi_threshold,
            self.config.rule
        );

        let delta_ndwi2 = indices::ndwi2_delta(&scenes.pre, &scenes.post)?;
        let delta_ndvi = indices::ndvi_delta(&scenes.pre, &scenes.post)?;

        let classification = self.classify_deltas(
            &delta_ndvi,
            &delta_ndwi2,
            &scenes.pre.scl,
            &scenes.post.scl,
        );
        let stats = ClassificationStats::from_raster(&classification);

        log::debug!(
            "Classification: {} unburned, {} burned, {} unreliable",
            stats.unburned,
            stats.burned,
            stats.unreliable
        );
        if stats.total() > 0 && stats.unreliable == stats.total() {
            log::warn!("Every pixel is masked as unreliable");
        }

        Ok(BurnedAreaResult {
            classification,
            stats,
        })
    }

    /// Threshold and mask precomputed index deltas. Shapes must already match.
    fn classify_deltas(
        &self,
        delta_ndvi: &IndexArray,
        delta_ndwi2: &IndexArray,
        pre_scl: &Array2<SclValue>,
        post_scl: &Array2<SclValue>,
    ) -> BurnRaster {
        let config = self.config;
        let mut burned = BurnRaster::from_elem(delta_ndvi.dim(), BurnClass::Unburned.code());

        let zip = Zip::from(&mut burned)
            .and(delta_ndvi)
            .and(delta_ndwi2)
            .and(pre_scl)
            .and(post_scl);

        let classify_pixel = |out: &mut u8, &d_ndvi: &f64, &d_ndwi2: &f64, &pre: &u8, &post: &u8| {
            *out = pixel_class(&config, d_ndvi, d_ndwi2, pre, post).code();
        };

        #[cfg(feature = "parallel")]
        zip.par_for_each(classify_pixel);
        #[cfg(not(feature = "parallel"))]
        zip.for_each(classify_pixel);

        burned
    }
}

impl Default for BurnedAreaClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Decision for a single pixel. NaN deltas never pass a threshold.
pub fn pixel_class(
    config: &ClassifierConfig,
    delta_ndvi: f64,
    delta_ndwi2: f64,
    pre_scl: SclValue,
    post_scl: SclValue,
) -> BurnClass {
    if scl::is_unreliable(pre_scl) || scl::is_unreliable(post_scl) {
        return BurnClass::Unreliable;
    }

    let spectral = delta_ndwi2 > config.ndwi_threshold && delta_ndvi > config.ndvi_threshold;
    let pre_valid = scl::is_reference(pre_scl);
    let post_valid = scl::is_reference(post_scl);

    let burned = match config.rule {
        BurnRule::ReferenceCompatible => (spectral && pre_valid) || post_valid,
        BurnRule::Corrected => spectral && (pre_valid || post_valid),
    };

    if burned {
        BurnClass::Burned
    } else {
        BurnClass::Unburned
    }
}

/// Convenience wrapper over [`BurnedAreaClassifier::classify`]
pub fn classify_burned_area(
    scenes: &EventPair<SceneBands>,
    config: ClassifierConfig,
) -> BurnResult<BurnedAreaResult> {
    BurnedAreaClassifier::with_config(config).classify(scenes)
}

/// Every band of both acquisitions must have the shape of pre-event B04
pub fn validate_shapes(scenes: &EventPair<SceneBands>) -> BurnResult<()> {
    let expected = scenes.pre.b04.dim();

    for (acquisition, bands) in scenes.iter() {
        let dims = [
            ("B04", bands.b04.dim()),
            ("B08", bands.b08.dim()),
            ("B11", bands.b11.dim()),
            ("SCL", bands.scl.dim()),
        ];
        for (name, found) in dims {
            if found != expected {
                return Err(BurnError::InvalidInputShape {
                    band: format!("{} {}", acquisition, name),
                    expected,
                    found,
                });
            }
        }
    }

    Ok(())
}
