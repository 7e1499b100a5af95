use crate::types::{BurnError, BurnRaster, BurnResult, RasterGrid};
use gdal::raster::{Buffer, GdalType};
use gdal::{Dataset, DriverManager};
use ndarray::Array2;
use std::path::Path;

/// GeoTIFF writer for single-band rasters
pub struct RasterWriter;

impl RasterWriter {
    /// Save the burned area classification as a byte GeoTIFF
    pub fn write_classification<P: AsRef<Path>>(
        classification: &BurnRaster,
        grid: &RasterGrid,
        output_path: P,
    ) -> BurnResult<()> {
        log::info!(
            "Saving burned area classification: {}",
            output_path.as_ref().display()
        );
        Self::write_band(classification, grid, output_path)
    }

    /// Write `data` as band 1 of a new GeoTIFF georeferenced by `grid`
    pub fn write_band<T, P>(data: &Array2<T>, grid: &RasterGrid, output_path: P) -> BurnResult<()>
    where
        T: GdalType + Copy,
        P: AsRef<Path>,
    {
        let (height, width) = data.dim();
        if (width, height) != (grid.width, grid.height) {
            return Err(BurnError::InvalidInputShape {
                band: "output".to_string(),
                expected: (grid.height, grid.width),
                found: (height, width),
            });
        }

        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let mut dataset = driver.create_with_band_type::<T, _>(
            output_path.as_ref(),
            width as isize,
            height as isize,
            1,
        )?;

        dataset.set_geo_transform(&grid.geo_transform.to_gdal())?;
        if !grid.projection.is_empty() {
            dataset.set_projection(&grid.projection)?;
        }

        let mut rasterband = dataset.rasterband(1)?;
        let flat_data: Vec<T> = data.iter().copied().collect();
        let buffer = Buffer::new((width, height), flat_data);
        rasterband.write((0, 0), (width, height), &buffer)?;

        log::debug!(
            "Wrote {}x{} band to {}",
            width,
            height,
            output_path.as_ref().display()
        );
        Ok(())
    }

    /// Read a classification GeoTIFF back with its grid
    pub fn read_classification<P: AsRef<Path>>(path: P) -> BurnResult<(BurnRaster, RasterGrid)> {
        let dataset = Dataset::open(path.as_ref())?;
        let (width, height) = dataset.raster_size();
        let grid = RasterGrid {
            width,
            height,
            geo_transform: crate::types::GeoTransform::from_gdal(dataset.geo_transform()?),
            projection: dataset.projection(),
        };

        let buffer = dataset
            .rasterband(1)?
            .read_as::<u8>((0, 0), (width, height), (width, height), None)?;
        let raster = Array2::from_shape_vec((height, width), buffer.data)
            .map_err(|e| BurnError::Processing(format!("Failed to reshape classification: {}", e)))?;

        Ok((raster, grid))
    }
}
