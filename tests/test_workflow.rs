use burned_area::io::{find_first_item, BandReader, RasterWriter};
use burned_area::types::{BandRaster, GeoTransform, RasterGrid, SclRaster};
use burned_area::{BurnError, BurnedAreaWorkflow, ClassifierConfig, WorkflowConfig};
use ndarray::{array, Array2};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ORIGIN_X: f64 = 600000.0;
const ORIGIN_Y: f64 = 4200000.0;

fn grid(size: usize, resolution: f64) -> RasterGrid {
    RasterGrid {
        width: size,
        height: size,
        geo_transform: GeoTransform::from_gdal([ORIGIN_X, resolution, 0.0, ORIGIN_Y, 0.0, -resolution]),
        projection: String::new(),
    }
}

/// Stage a one-item catalog with 10 m reflectance bands and a 20 m SCL
fn stage_event(
    root: &Path,
    name: &str,
    datetime: &str,
    (b04, b08, b11): (u16, u16, u16),
    scl: &SclRaster,
    with_scl: bool,
) {
    let item_dir = root.join(name).join("item");
    fs::create_dir_all(&item_dir).unwrap();

    let grid_10m = grid(4, 10.0);
    for (band, value) in [("B04", b04), ("B08", b08), ("B11", b11)] {
        let data = BandRaster::from_elem((4, 4), value);
        RasterWriter::write_band(&data, &grid_10m, item_dir.join(format!("{}.tif", band))).unwrap();
    }
    RasterWriter::write_band(scl, &grid(scl.nrows(), 20.0), item_dir.join("SCL.tif")).unwrap();

    let mut assets = vec![
        r#""B04": {"href": "./B04.tif", "type": "image/tiff"}"#.to_string(),
        r#""B08": {"href": "./B08.tif", "type": "image/tiff"}"#.to_string(),
        r#""B11": {"href": "./B11.tif", "type": "image/tiff"}"#.to_string(),
    ];
    if with_scl {
        assets.push(r#""SCL": {"href": "./SCL.tif", "type": "image/tiff"}"#.to_string());
    }

    let item = format!(
        r#"{{
            "type": "Feature",
            "stac_version": "1.0.0",
            "id": "{name}-scene",
            "geometry": {{"type": "Polygon", "coordinates": [[[23.0, 37.9], [23.1, 37.9], [23.1, 38.0], [23.0, 38.0], [23.0, 37.9]]]}},
            "bbox": [23.0, 37.9, 23.1, 38.0],
            "properties": {{"datetime": "{datetime}"}},
            "links": [{{"rel": "root", "href": "../catalog.json"}}],
            "assets": {{{assets}}}
        }}"#,
        name = name,
        datetime = datetime,
        assets = assets.join(",")
    );
    fs::write(item_dir.join("item.json"), item).unwrap();

    fs::write(
        root.join(name).join("catalog.json"),
        r#"{"type": "Catalog", "id": "catalog", "description": "staged input",
            "links": [{"rel": "item", "href": "./item/item.json"}]}"#,
    )
    .unwrap();
}

fn stage_pair(root: &Path, post_scl: &SclRaster, with_scl: bool) -> WorkflowConfig {
    stage_event(
        root,
        "pre",
        "2018-07-17T09:20:21Z",
        (1000, 1000, 1000),
        &SclRaster::from_elem((2, 2), 4),
        true,
    );
    stage_event(
        root,
        "post",
        "2018-07-27T09:20:19Z",
        (700, 1300, 780),
        post_scl,
        with_scl,
    );

    let mut config = WorkflowConfig::new(root.join("pre"), root.join("post"));
    config.output_dir = root.join("out");
    config
}

#[test]
fn test_band_reader_resamples_scl_to_band_grid() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = TempDir::new().unwrap();
    let scl = array![[4u8, 6], [8, 4]];
    stage_event(dir.path(), "pre", "2018-07-17T09:20:21Z", (1000, 1200, 900), &scl, true);

    let item = find_first_item(dir.path().join("pre")).unwrap();
    let (bands, grid) = BandReader::read_scene(&item).unwrap();

    assert_eq!((grid.width, grid.height), (4, 4));
    assert_eq!(grid.geo_transform.pixel_width, 10.0);
    assert_eq!(bands.b08, BandRaster::from_elem((4, 4), 1200));
    assert_eq!(
        bands.scl,
        array![[4u8, 4, 6, 6], [4, 4, 6, 6], [8, 8, 4, 4], [8, 8, 4, 4]]
    );
}

#[test]
fn test_workflow_end_to_end() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = TempDir::new().unwrap();
    let config = stage_pair(dir.path(), &array![[4u8, 4], [4, 8]], true);

    let output = BurnedAreaWorkflow::new(config).run().unwrap();

    assert_eq!(output.name, "S2_BURNED_AREA_20180717_20180727");
    assert_eq!(
        output.raster_path,
        dir.path().join("out").join(&output.name).join("S2_BURNED_AREA_20180717_20180727.tif")
    );
    assert_eq!(output.stats.burned, 12);
    assert_eq!(output.stats.unreliable, 4);

    let (classification, written_grid) = RasterWriter::read_classification(&output.raster_path).unwrap();
    let mut expected = Array2::from_elem((4, 4), 1u8);
    for i in 2..4 {
        for j in 2..4 {
            expected[[i, j]] = 2;
        }
    }
    assert_eq!(classification, expected);
    assert_eq!(written_grid.geo_transform, grid(4, 10.0).geo_transform);

    // Output catalog points back at the raster and copies the pre-event footprint
    let result_item = find_first_item(dir.path().join("out")).unwrap();
    assert_eq!(result_item.id(), output.name);
    assert_eq!(result_item.asset_path("data").unwrap(), output.raster_path);
    assert_eq!(
        result_item.item.properties.datetime.as_deref(),
        Some("2018-07-17T09:20:21Z")
    );
    assert_eq!(result_item.item.bbox, Some(vec![23.0, 37.9, 23.1, 38.0]));
}

#[test]
fn test_workflow_missing_scl_asset() {
    let dir = TempDir::new().unwrap();
    let config = stage_pair(dir.path(), &SclRaster::from_elem((2, 2), 4), false);

    match BurnedAreaWorkflow::new(config).run() {
        Err(BurnError::MissingAsset { item, asset }) => {
            assert_eq!(item, "post-scene");
            assert_eq!(asset, "SCL");
        }
        other => panic!("expected MissingAsset, got {:?}", other.map(|o| o.name)),
    }
    assert!(!dir.path().join("out").join("catalog.json").exists());
}

#[test]
fn test_workflow_rejects_nan_threshold_before_reading() {
    let mut config = WorkflowConfig::new("/nonexistent/pre", "/nonexistent/post");
    config.classifier = ClassifierConfig::new(0.19, f64::NAN);

    assert!(matches!(
        BurnedAreaWorkflow::new(config).run(),
        Err(BurnError::InvalidThreshold { name: "ndwi_threshold", .. })
    ));
}
