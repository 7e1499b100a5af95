//! Burned area detection algorithms

pub mod indices;
pub mod scl;
pub mod classifier;

// Re-export main types
pub use indices::{ndvi, ndwi2, normalized_difference, index_delta, GAIN};
pub use scl::{SceneClass, REFERENCE_CLASS, UNRELIABLE_CLASSES};
pub use classifier::{
    BurnedAreaClassifier, BurnedAreaResult, BurnRule, ClassifierConfig, ClassificationStats,
    classify_burned_area, DEFAULT_NDVI_THRESHOLD, DEFAULT_NDWI_THRESHOLD,
};
