//! End-to-end burned area processing: catalogs in, packaged product out

use crate::core::classifier::{BurnedAreaClassifier, ClassificationStats, ClassifierConfig};
use crate::io::{output_name, find_first_item, BandReader, CatalogWriter, RasterWriter};
use crate::types::{BurnResult, EventPair, RasterGrid};
use std::path::{Path, PathBuf};

/// Inputs and parameters of one processing run
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Directory (or catalog file) of the pre-event acquisition
    pub pre_event: PathBuf,
    /// Directory (or catalog file) of the post-event acquisition
    pub post_event: PathBuf,
    /// Where catalog.json and the product directory are written
    pub output_dir: PathBuf,
    pub classifier: ClassifierConfig,
}

impl WorkflowConfig {
    pub fn new<P: AsRef<Path>>(pre_event: P, post_event: P) -> Self {
        Self {
            pre_event: pre_event.as_ref().to_path_buf(),
            post_event: post_event.as_ref().to_path_buf(),
            output_dir: PathBuf::from("."),
            classifier: ClassifierConfig::default(),
        }
    }
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct WorkflowOutput {
    pub name: String,
    pub raster_path: PathBuf,
    pub catalog_path: PathBuf,
    pub grid: RasterGrid,
    pub stats: ClassificationStats,
}

pub struct BurnedAreaWorkflow {
    config: WorkflowConfig,
}

impl BurnedAreaWorkflow {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Catalog traversal, band stacking, classification, GeoTIFF and
    /// STAC catalog output.
    pub fn run(&self) -> BurnResult<WorkflowOutput> {
        self.config.classifier.validate()?;

        let locations = EventPair::new(
            self.config.pre_event.as_path(),
            self.config.post_event.as_path(),
        );
        let items = locations.try_map(|acquisition, location| {
            log::info!("Locating {} scene in {}", acquisition, location.display());
            find_first_item(location)
        })?;

        let stacked = items.as_ref().try_map(|acquisition, item| {
            log::info!("Stacking bands for input {} ({})", acquisition, item.id());
            BandReader::read_scene(item)
        })?;
        let EventPair {
            pre: (pre_bands, pre_grid),
            post: (post_bands, grid),
        } = stacked;

        if pre_grid.geo_transform != grid.geo_transform {
            log::warn!(
                "Pre-event geotransform {:?} differs from post-event {:?}; using post-event",
                pre_grid.geo_transform,
                grid.geo_transform
            );
        }

        let classifier = BurnedAreaClassifier::with_config(self.config.classifier);
        let result = classifier.classify(&EventPair::new(pre_bands, post_bands))?;

        log::info!(
            "Burned {} of {} reliable pixels ({:.2}%), {} unreliable",
            result.stats.burned,
            result.stats.burned + result.stats.unburned,
            result.stats.burned_percentage(),
            result.stats.unreliable
        );

        let dates = items.as_ref().try_map(|_, item| item.datetime())?;
        let name = output_name(&dates);

        log::info!("Write output product");
        let catalog_writer = CatalogWriter::new(&self.config.output_dir);
        catalog_writer.prepare(&name)?;
        let raster_path = catalog_writer.raster_path(&name);
        RasterWriter::write_classification(&result.classification, &grid, &raster_path)?;

        let catalog_path = catalog_writer.write_catalog(&name, &items.pre)?;

        Ok(WorkflowOutput {
            name,
            raster_path,
            catalog_path,
            grid,
            stats: result.stats,
        })
    }
}

/// Convenience wrapper over [`BurnedAreaWorkflow::run`]
pub fn run_burned_area(config: WorkflowConfig) -> BurnResult<WorkflowOutput> {
    BurnedAreaWorkflow::new(config).run()
}
