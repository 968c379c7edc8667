//! Matrixify image-upload manifest.
//!
//! Joins the inventory CSV with the Shopify style map and emits one row per
//! image of every known style. Gray images, when a product has any, are the
//! storefront image set; otherwise the non-gray images are used.

use log::{debug, info};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{InventoryRow, ManifestRow, StyleMapEntry, ViewKey};

pub const MANIFEST_HEADER: [&str; 9] = [
    "ID",
    "Image Type",
    "Image Src",
    "Image Command",
    "Image Position",
    "Image Width",
    "Image Height",
    "Image Alt Text",
    "Style",
];

const IMAGE_TYPE: &str = "IMAGE";
const IMAGE_COMMAND: &str = "REPLACE";

/// Shopify products keyed by style
pub type StyleMap = HashMap<String, StyleMapEntry>;

/// Load a `id,title,style` style map, skipping its header row
pub fn load_style_map(path: &Path) -> Result<StyleMap> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut styles = StyleMap::new();
    for record in reader.records() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or("").trim().to_string();
        let entry = StyleMapEntry {
            shopify_id: field(0),
            title: field(1),
            style: field(2),
        };
        if entry.style.is_empty() || entry.shopify_id.is_empty() {
            debug!("Skipping incomplete style map row: {:?}", entry);
            continue;
        }
        styles.insert(entry.style.clone(), entry);
    }

    info!("Loaded {} styles from {}", styles.len(), path.display());
    Ok(styles)
}

/// Recover the view key from an inventory filename such as
/// `ABC123_gray_instep_profile_800x600.jpg`
pub fn parse_file_name(product_id: &str, file_name: &str) -> Option<ViewKey> {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, ext)) if ext.eq_ignore_ascii_case("jpg") => stem,
        _ => file_name,
    };
    let key = stem.strip_prefix(product_id)?.strip_prefix('_')?;
    ViewKey::parse(key)
}

/// Alt text for an image: the title, plus the view unless it is `default`
pub fn alt_text(title: &str, view: Option<&str>) -> String {
    match view {
        Some(view) if !view.is_empty() && view != "default" => format!("{} - {}", title, view),
        _ => title.to_string(),
    }
}

/// Manifest rows for one inventory row
pub fn manifest_rows(row: &InventoryRow, entry: &StyleMapEntry, image_src_prefix: &str) -> Vec<ManifestRow> {
    let file_names = if row.gray_filenames.is_empty() {
        &row.non_gray_filenames
    } else {
        &row.gray_filenames
    };

    file_names
        .iter()
        .enumerate()
        .map(|(index, file_name)| {
            let key = parse_file_name(&row.product_id, file_name);
            let dimensions = key.as_ref().and_then(|k| k.dimensions);
            let is_first_row = index == 0;

            ManifestRow {
                shopify_id: entry.shopify_id.clone(),
                image_src: format!("{}{}", image_src_prefix, file_name),
                position: index + 1,
                width: dimensions.map(|d| d.width),
                height: dimensions.map(|d| d.height),
                alt_text: alt_text(&entry.title, key.as_ref().map(|k| k.view.as_str())),
                style_label: is_first_row.then(|| entry.style.clone()),
            }
        })
        .collect()
}

/// Manifest rows for every inventory row whose style is in the style map
pub fn generate_manifest(
    inventory: &[InventoryRow],
    styles: &StyleMap,
    image_src_prefix: &str,
) -> Vec<ManifestRow> {
    let mut rows = Vec::new();
    for row in inventory {
        match styles.get(&row.product_id) {
            Some(entry) => rows.extend(manifest_rows(row, entry, image_src_prefix)),
            None => debug!("Style {} not in style map; skipping", row.product_id),
        }
    }
    rows
}

/// Write the manifest CSV
pub fn write_manifest(path: &Path, rows: &[ManifestRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(MANIFEST_HEADER)?;
    for row in rows {
        let position = row.position.to_string();
        let width = row.width.map(|w| w.to_string()).unwrap_or_default();
        let height = row.height.map(|h| h.to_string()).unwrap_or_default();
        writer.write_record([
            row.shopify_id.as_str(),
            IMAGE_TYPE,
            row.image_src.as_str(),
            IMAGE_COMMAND,
            position.as_str(),
            width.as_str(),
            height.as_str(),
            row.alt_text.as_str(),
            row.style_label.as_deref().unwrap_or(""),
        ])?;
    }
    writer.flush()?;

    info!("Wrote {} manifest rows to {}", rows.len(), path.display());
    Ok(())
}
