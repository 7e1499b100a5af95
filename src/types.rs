use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Scaled surface reflectance (digital number) as delivered in Level-2A
pub type BandValue = u16;

/// Scene classification code
pub type SclValue = u8;

/// 2D reflectance band (rows x cols)
pub type BandRaster = Array2<BandValue>;

/// 2D scene classification layer (rows x cols)
pub type SclRaster = Array2<SclValue>;

/// 2D spectral index or index difference
pub type IndexArray = Array2<f64>;

/// 2D burned area classification (codes 0, 1, 2)
pub type BurnRaster = Array2<u8>;

/// Which side of the event an acquisition belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Acquisition {
    PreEvent,
    PostEvent,
}

impl std::fmt::Display for Acquisition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Acquisition::PreEvent => write!(f, "pre-event"),
            Acquisition::PostEvent => write!(f, "post-event"),
        }
    }
}

/// A value held once per acquisition
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EventPair<T> {
    pub pre: T,
    pub post: T,
}

impl<T> EventPair<T> {
    pub fn new(pre: T, post: T) -> Self {
        Self { pre, post }
    }

    pub fn get(&self, acquisition: Acquisition) -> &T {
        match acquisition {
            Acquisition::PreEvent => &self.pre,
            Acquisition::PostEvent => &self.post,
        }
    }

    pub fn as_ref(&self) -> EventPair<&T> {
        EventPair {
            pre: &self.pre,
            post: &self.post,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, mut f: F) -> EventPair<U> {
        EventPair {
            pre: f(self.pre),
            post: f(self.post),
        }
    }

    /// Fallible map, evaluated pre first then post
    pub fn try_map<U, E, F>(self, mut f: F) -> Result<EventPair<U>, E>
    where
        F: FnMut(Acquisition, T) -> Result<U, E>,
    {
        Ok(EventPair {
            pre: f(Acquisition::PreEvent, self.pre)?,
            post: f(Acquisition::PostEvent, self.post)?,
        })
    }

    /// Iterate as `(Acquisition, &T)`, pre first
    pub fn iter(&self) -> impl Iterator<Item = (Acquisition, &T)> {
        [
            (Acquisition::PreEvent, &self.pre),
            (Acquisition::PostEvent, &self.post),
        ]
        .into_iter()
    }
}

/// The four bands of one Sentinel-2 L2A acquisition used for burn mapping
#[derive(Debug, Clone)]
pub struct SceneBands {
    /// Red, 665 nm
    pub b04: BandRaster,
    /// NIR, 842 nm
    pub b08: BandRaster,
    /// SWIR, 1610 nm
    pub b11: BandRaster,
    /// Scene classification layer
    pub scl: SclRaster,
}

impl SceneBands {
    /// (rows, cols) of the red band, which every other band must match
    pub fn dim(&self) -> (usize, usize) {
        self.b04.dim()
    }
}

/// Geospatial transformation parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub top_left_x: f64,
    pub pixel_width: f64,
    pub rotation_x: f64,
    pub top_left_y: f64,
    pub rotation_y: f64,
    pub pixel_height: f64,
}

impl GeoTransform {
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self {
            top_left_x: gt[0],
            pixel_width: gt[1],
            rotation_x: gt[2],
            top_left_y: gt[3],
            rotation_y: gt[4],
            pixel_height: gt[5],
        }
    }

    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.top_left_x,
            self.pixel_width,
            self.rotation_x,
            self.top_left_y,
            self.rotation_y,
            self.pixel_height,
        ]
    }
}

/// Spatial frame shared by all rasters of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterGrid {
    pub width: usize,
    pub height: usize,
    pub geo_transform: GeoTransform,
    /// Spatial reference as WKT, empty when unknown
    pub projection: String,
}

/// Per-pixel output codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum BurnClass {
    Unburned = 0,
    Burned = 1,
    Unreliable = 2,
}

impl BurnClass {
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(BurnClass::Unburned),
            1 => Some(BurnClass::Burned),
            2 => Some(BurnClass::Unreliable),
            _ => None,
        }
    }
}

/// Error types for burned area processing
#[derive(Debug, thiserror::Error)]
pub enum BurnError {
    #[error("Invalid input shape for {band}: expected {expected:?}, found {found:?}")]
    InvalidInputShape {
        band: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Invalid threshold {name}: {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Item {item} has no asset {asset}")]
    MissingAsset { item: String, asset: String },

    #[error("Processing error: {0}")]
    Processing(String),
}

/// Result type for burned area operations
pub type BurnResult<T> = Result<T, BurnError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geotransform_gdal_order() {
        let gt = [500000.0, 10.0, 0.0, 4200000.0, 0.0, -10.0];
        let transform = GeoTransform::from_gdal(gt);
        assert_eq!(transform.pixel_width, 10.0);
        assert_eq!(transform.pixel_height, -10.0);
        assert_eq!(transform.to_gdal(), gt);
    }

    #[test]
    fn test_event_pair_accessors() {
        let pair = EventPair::new(1, 2);
        assert_eq!(*pair.get(Acquisition::PreEvent), 1);
        assert_eq!(*pair.get(Acquisition::PostEvent), 2);

        let labels: Vec<String> = pair.iter().map(|(acq, _)| acq.to_string()).collect();
        assert_eq!(labels, vec!["pre-event", "post-event"]);

        let doubled = pair.map(|v| v * 2);
        assert_eq!(doubled, EventPair::new(2, 4));
    }

    #[test]
    fn test_event_pair_try_map_stops_on_error() {
        let pair = EventPair::new(1, -1);
        let result: Result<EventPair<u32>, String> = pair.try_map(|acq, v| {
            u32::try_from(v).map_err(|_| format!("{} negative", acq))
        });
        assert_eq!(result.unwrap_err(), "post-event negative");
    }

    #[test]
    fn test_burn_class_codes() {
        assert_eq!(BurnClass::Unburned.code(), 0);
        assert_eq!(BurnClass::Burned.code(), 1);
        assert_eq!(BurnClass::Unreliable.code(), 2);
        assert_eq!(BurnClass::from_code(1), Some(BurnClass::Burned));
        assert_eq!(BurnClass::from_code(3), None);
    }
}
