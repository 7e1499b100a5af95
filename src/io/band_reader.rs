use crate::io::stac::SceneItem;
use crate::types::{BurnError, BurnResult, GeoTransform, RasterGrid, SceneBands};
use gdal::raster::GdalType;
use gdal::Dataset;
use ndarray::Array2;
use std::path::Path;

/// Asset keys read for every acquisition, in stacking order
pub const BAND_ASSETS: [&str; 4] = ["B04", "B08", "B11", "SCL"];

/// Reads the Level-2A bands of a scene onto a common 10 m grid
pub struct BandReader;

impl BandReader {
    /// Read B04, B08, B11 and SCL of a scene.
    ///
    /// B04 defines the grid. Assets stored at another resolution (SCL is
    /// delivered at 20 m) are read onto it with nearest neighbour RasterIO.
    pub fn read_scene(item: &SceneItem) -> BurnResult<(SceneBands, RasterGrid)> {
        let b04_path = item.asset_path(BAND_ASSETS[0])?;
        let grid = Self::read_grid(&b04_path)?;

        log::debug!(
            "Scene {} grid: {}x{}, geotransform {:?}",
            item.id(),
            grid.width,
            grid.height,
            grid.geo_transform
        );

        let bands = SceneBands {
            b04: Self::read_band_on_grid::<u16, _>(&b04_path, &grid)?,
            b08: Self::read_band_on_grid::<u16, _>(item.asset_path(BAND_ASSETS[1])?, &grid)?,
            b11: Self::read_band_on_grid::<u16, _>(item.asset_path(BAND_ASSETS[2])?, &grid)?,
            scl: Self::read_band_on_grid::<u8, _>(item.asset_path(BAND_ASSETS[3])?, &grid)?,
        };

        Ok((bands, grid))
    }

    /// Size, geotransform and projection of a raster
    pub fn read_grid<P: AsRef<Path>>(path: P) -> BurnResult<RasterGrid> {
        let dataset = Dataset::open(path.as_ref())?;
        let (width, height) = dataset.raster_size();
        let geo_transform = GeoTransform::from_gdal(dataset.geo_transform()?);

        Ok(RasterGrid {
            width,
            height,
            geo_transform,
            projection: dataset.projection(),
        })
    }

    /// Read band 1 of `path` resampled to `grid.width` x `grid.height`
    pub fn read_band_on_grid<T, P>(path: P, grid: &RasterGrid) -> BurnResult<Array2<T>>
    where
        T: GdalType + Copy,
        P: AsRef<Path>,
    {
        log::debug!("Reading band {}", path.as_ref().display());

        let dataset = Dataset::open(path.as_ref())?;
        let (src_width, src_height) = dataset.raster_size();

        if (src_width, src_height) != (grid.width, grid.height) {
            log::debug!(
                "Resampling {} from {}x{} to {}x{}",
                path.as_ref().display(),
                src_width,
                src_height,
                grid.width,
                grid.height
            );
        }

        let rasterband = dataset.rasterband(1)?;
        let buffer = rasterband.read_as::<T>(
            (0, 0),
            (src_width, src_height),
            (grid.width, grid.height),
            None,
        )?;

        Array2::from_shape_vec((grid.height, grid.width), buffer.data).map_err(|e| {
            BurnError::Processing(format!(
                "Failed to reshape {}: {}",
                path.as_ref().display(),
                e
            ))
        })
    }
}
