//! Packaging of the classification as a self-contained STAC catalog
//!
//! ```text
//! <output_dir>/catalog.json
//! <output_dir>/<name>/<name>.json
//! <output_dir>/<name>/<name>.tif
//! ```

use crate::io::stac::{
    ItemProperties, SceneItem, StacAsset, StacCatalog, StacItem, StacLink, CATALOG_FILE,
    STAC_VERSION,
};
use crate::types::{BurnResult, EventPair};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const COG_MEDIA_TYPE: &str = "image/tiff; application=geotiff; profile=cloud-optimized";
pub const JSON_MEDIA_TYPE: &str = "application/json";
pub const RESULT_TITLE: &str = "Burned area analysis from Sentinel-2";
pub const RESULT_ASSET_KEY: &str = "data";

/// `S2_BURNED_AREA_<pre YYYYMMDD>_<post YYYYMMDD>`
pub fn output_name(dates: &EventPair<DateTime<Utc>>) -> String {
    format!(
        "S2_BURNED_AREA_{}_{}",
        dates.pre.format("%Y%m%d"),
        dates.post.format("%Y%m%d")
    )
}

pub struct CatalogWriter {
    output_dir: PathBuf,
}

impl CatalogWriter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.output_dir.join(CATALOG_FILE)
    }

    pub fn item_dir(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }

    pub fn item_path(&self, name: &str) -> PathBuf {
        self.item_dir(name).join(format!("{}.json", name))
    }

    /// Where the classification GeoTIFF of `name` is expected
    pub fn raster_path(&self, name: &str) -> PathBuf {
        self.item_dir(name).join(format!("{}.tif", name))
    }

    /// Create the Item directory so the raster can be written into it
    pub fn prepare(&self, name: &str) -> BurnResult<PathBuf> {
        let dir = self.item_dir(name);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Write the result Item and the root catalog.
    ///
    /// Geometry, bbox and datetime are copied from `reference`.
    pub fn write_catalog(&self, name: &str, reference: &SceneItem) -> BurnResult<PathBuf> {
        log::info!("Output catalog");
        self.prepare(name)?;

        let item = Self::result_item(name, reference)?;
        let item_path = self.item_path(name);
        std::fs::write(&item_path, serde_json::to_string_pretty(&item)?)?;
        log::debug!("Wrote item {}", item_path.display());

        let catalog = StacCatalog {
            object_type: "Catalog".to_string(),
            stac_version: STAC_VERSION.to_string(),
            id: "catalog".to_string(),
            description: "Results".to_string(),
            links: vec![
                StacLink::new("root", "./catalog.json", Some(JSON_MEDIA_TYPE)),
                StacLink::new("item", &format!("./{}/{}.json", name, name), Some(JSON_MEDIA_TYPE)),
            ],
        };
        let catalog_path = self.catalog_path();
        std::fs::write(&catalog_path, serde_json::to_string_pretty(&catalog)?)?;
        log::debug!("Wrote catalog {}", catalog_path.display());

        Ok(catalog_path)
    }

    fn result_item(name: &str, reference: &SceneItem) -> BurnResult<StacItem> {
        let datetime = reference
            .datetime()?
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut assets = HashMap::new();
        assets.insert(
            RESULT_ASSET_KEY.to_string(),
            StacAsset {
                href: format!("./{}.tif", name),
                media_type: Some(COG_MEDIA_TYPE.to_string()),
                title: Some(RESULT_TITLE.to_string()),
                roles: None,
            },
        );

        Ok(StacItem {
            object_type: "Feature".to_string(),
            stac_version: STAC_VERSION.to_string(),
            id: name.to_string(),
            geometry: reference.item.geometry.clone(),
            bbox: reference.item.bbox.clone(),
            properties: ItemProperties {
                datetime: Some(datetime),
                extra: serde_json::Map::new(),
            },
            links: vec![
                StacLink::new("root", "../catalog.json", Some(JSON_MEDIA_TYPE)),
                StacLink::new("parent", "../catalog.json", Some(JSON_MEDIA_TYPE)),
            ],
            assets,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::stac::find_first_item;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn reference_item() -> SceneItem {
        let item: StacItem = serde_json::from_str(
            r#"{
                "type": "Feature",
                "id": "S2A_pre",
                "geometry": {"type": "Point", "coordinates": [23.1, 38.0]},
                "bbox": [23.1, 38.0, 23.1, 38.0],
                "properties": {"datetime": "2018-07-17T09:20:21.000Z"},
                "assets": {}
            }"#,
        )
        .unwrap();
        SceneItem {
            item,
            path: PathBuf::from("pre/item.json"),
        }
    }

    #[test]
    fn test_output_name_uses_both_dates() {
        let dates = EventPair::new(
            Utc.with_ymd_and_hms(2018, 7, 17, 9, 20, 21).unwrap(),
            Utc.with_ymd_and_hms(2018, 7, 27, 9, 20, 19).unwrap(),
        );
        assert_eq!(output_name(&dates), "S2_BURNED_AREA_20180717_20180727");
    }

    #[test]
    fn test_layout_paths() {
        let writer = CatalogWriter::new("/out");
        assert_eq!(writer.catalog_path(), PathBuf::from("/out/catalog.json"));
        assert_eq!(writer.raster_path("X"), PathBuf::from("/out/X/X.tif"));
        assert_eq!(writer.item_path("X"), PathBuf::from("/out/X/X.json"));
    }

    #[test]
    fn test_written_catalog_is_traversable() {
        let dir = TempDir::new().unwrap();
        let writer = CatalogWriter::new(dir.path());
        let name = "S2_BURNED_AREA_20180717_20180727";

        writer.write_catalog(name, &reference_item()).unwrap();

        let scene = find_first_item(dir.path()).unwrap();
        assert_eq!(scene.id(), name);
        assert_eq!(
            scene.item.properties.datetime.as_deref(),
            Some("2018-07-17T09:20:21Z")
        );
        assert_eq!(scene.item.bbox, Some(vec![23.1, 38.0, 23.1, 38.0]));

        let asset = &scene.item.assets[RESULT_ASSET_KEY];
        assert_eq!(asset.media_type.as_deref(), Some(COG_MEDIA_TYPE));
        assert_eq!(asset.title.as_deref(), Some(RESULT_TITLE));
        assert_eq!(scene.asset_path(RESULT_ASSET_KEY).unwrap(), writer.raster_path(name));
    }
}
