//! Local STAC (SpatioTemporal Asset Catalog) traversal
//!
//! Each acquisition is staged as a self-contained catalog on disk. Only the
//! subset needed here is modelled: links for traversal, and for Items the
//! datetime, footprint and asset hrefs.

use crate::types::{BurnError, BurnResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Catalog file looked up inside an event directory
pub const CATALOG_FILE: &str = "catalog.json";

pub const STAC_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StacLink {
    pub rel: String,
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl StacLink {
    pub fn new(rel: &str, href: &str, media_type: Option<&str>) -> Self {
        Self {
            rel: rel.to_string(),
            href: href.to_string(),
            media_type: media_type.map(str::to_string),
            title: None,
        }
    }
}

/// Catalog or Collection; both are traversed the same way
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StacCatalog {
    #[serde(rename = "type", default = "catalog_type")]
    pub object_type: String,
    #[serde(default = "stac_version")]
    pub stac_version: String,
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub links: Vec<StacLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StacAsset {
    pub href: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemProperties {
    pub datetime: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StacItem {
    #[serde(rename = "type", default = "feature_type")]
    pub object_type: String,
    #[serde(default = "stac_version")]
    pub stac_version: String,
    pub id: String,
    pub geometry: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,
    pub properties: ItemProperties,
    #[serde(default)]
    pub links: Vec<StacLink>,
    #[serde(default)]
    pub assets: HashMap<String, StacAsset>,
}

fn catalog_type() -> String {
    "Catalog".to_string()
}

fn feature_type() -> String {
    "Feature".to_string()
}

fn stac_version() -> String {
    STAC_VERSION.to_string()
}

/// An Item together with the file it was read from
#[derive(Debug, Clone)]
pub struct SceneItem {
    pub item: StacItem,
    pub path: PathBuf,
}

impl SceneItem {
    pub fn id(&self) -> &str {
        &self.item.id
    }

    /// Acquisition time from `properties.datetime` (RFC 3339)
    pub fn datetime(&self) -> BurnResult<DateTime<Utc>> {
        let raw = self.item.properties.datetime.as_deref().ok_or_else(|| {
            BurnError::Catalog(format!("Item {} has no datetime", self.item.id))
        })?;

        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                BurnError::Catalog(format!(
                    "Item {} has invalid datetime '{}': {}",
                    self.item.id, raw, e
                ))
            })
    }

    /// GDAL-openable location of an asset, relative hrefs resolved
    /// against the Item file
    pub fn asset_path(&self, key: &str) -> BurnResult<PathBuf> {
        let asset = self
            .item
            .assets
            .get(key)
            .ok_or_else(|| BurnError::MissingAsset {
                item: self.item.id.clone(),
                asset: key.to_string(),
            })?;

        Ok(resolve_href(&self.path, &asset.href))
    }
}

/// `dir/catalog.json`, or the path itself when it already names a JSON file
pub fn catalog_path<P: AsRef<Path>>(location: P) -> PathBuf {
    let location = location.as_ref();
    let is_json = location
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        location.to_path_buf()
    } else {
        location.join(CATALOG_FILE)
    }
}

/// Resolve `href` against the document found at `base`.
///
/// Remote hrefs are routed through GDAL's `/vsicurl/` handler.
pub fn resolve_href(base: &Path, href: &str) -> PathBuf {
    if href.starts_with("http://") || href.starts_with("https://") {
        return PathBuf::from(format!("/vsicurl/{}", href));
    }
    if href.starts_with("/vsi") {
        return PathBuf::from(href);
    }

    let href = href.strip_prefix("file://").unwrap_or(href);
    let href_path = Path::new(href);
    if href_path.is_absolute() {
        return href_path.to_path_buf();
    }

    let parent = base.parent().unwrap_or_else(|| Path::new(""));
    let mut resolved = parent.to_path_buf();
    for component in href_path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                if !resolved.pop() {
                    resolved.push("..");
                }
            }
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}

pub fn read_item<P: AsRef<Path>>(path: P) -> BurnResult<SceneItem> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let item: StacItem = serde_json::from_str(&content)?;
    Ok(SceneItem {
        item,
        path: path.to_path_buf(),
    })
}

/// First Item reachable from a catalog: the catalog's own `item` links
/// in order, then its `child` links depth-first.
///
/// `location` may be an event directory or the JSON file itself; a path
/// that points straight at an Item returns that Item.
pub fn find_first_item<P: AsRef<Path>>(location: P) -> BurnResult<SceneItem> {
    let root = catalog_path(location);
    log::info!("Reading catalog {}", root.display());

    let mut visited = HashSet::new();
    search_items(&root, &mut visited)?.ok_or_else(|| {
        BurnError::Catalog(format!("No item found in catalog {}", root.display()))
    })
}

fn search_items(path: &Path, visited: &mut HashSet<PathBuf>) -> BurnResult<Option<SceneItem>> {
    if !visited.insert(path.to_path_buf()) {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        BurnError::Catalog(format!("Cannot read {}: {}", path.display(), e))
    })?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    if value.get("type").and_then(|t| t.as_str()) == Some("Feature") {
        let item: StacItem = serde_json::from_value(value)?;
        log::debug!("Found item {} at {}", item.id, path.display());
        return Ok(Some(SceneItem {
            item,
            path: path.to_path_buf(),
        }));
    }

    let catalog: StacCatalog = serde_json::from_value(value)?;
    log::debug!("Traversing {} {}", catalog.object_type, catalog.id);

    if let Some(link) = catalog.links.iter().find(|l| l.rel == "item") {
        let item_path = resolve_href(path, &link.href);
        return read_item(&item_path).map(Some);
    }

    for link in catalog.links.iter().filter(|l| l.rel == "child") {
        let child_path = resolve_href(path, &link.href);
        if let Some(item) = search_items(&child_path, visited)? {
            return Ok(Some(item));
        }
    }

    Ok(None)
}
