//! I/O modules for STAC catalogs, Sentinel-2 bands and output rasters

pub mod stac;
pub mod band_reader;
pub mod raster_writer;
pub mod catalog_writer;

pub use stac::{find_first_item, SceneItem, StacItem};
pub use band_reader::{BandReader, BAND_ASSETS};
pub use raster_writer::RasterWriter;
pub use catalog_writer::{output_name, CatalogWriter};
