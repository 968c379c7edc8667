//! Inventory aggregation and the inventory CSV.
//!
//! Each product's views are split into gray and non-gray lists, ordered by a
//! per-list preference over the semantic view, and written as one CSV row:
//! `productId,nonGrayImageFileNames,grayImageFileNames`.

use log::{debug, info};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{InventoryRow, ResolvedProduct, ViewKey};

pub const INVENTORY_HEADER: [&str; 3] = [
    "productId",
    "nonGrayImageFileNames",
    "grayImageFileNames",
];

/// Separator between filenames inside one list cell
const LIST_SEPARATOR: &str = ", ";

/// Preferred order of non-gray views
pub const NON_GRAY_PREFERENCE: [&str; 8] = [
    "main",
    "lifestyle",
    "outsole",
    "profile",
    "front",
    "back",
    "instep_profile",
    "birdseye",
];

/// Preferred order of gray views
pub const GRAY_PREFERENCE: [&str; 7] = [
    "profile",
    "lifestyle",
    "main",
    "instep_profile",
    "doubleheel",
    "doublequarter",
    "outsole",
];

/// Position of a view in a preference list; unknown views rank last
fn preference_rank(preference: &[&str], view: &str) -> usize {
    preference
        .iter()
        .position(|preferred| *preferred == view)
        .unwrap_or(preference.len())
}

/// Sort view keys by preference, breaking ties on the full key
pub fn sort_views(keys: &mut [ViewKey], preference: &[&str]) {
    keys.sort_by_cached_key(|key| (preference_rank(preference, &key.view), key.to_string()));
}

/// Build the inventory row for a product; `None` when it has no views
pub fn inventory_row(product: &ResolvedProduct) -> Option<InventoryRow> {
    if product.views.is_empty() {
        return None;
    }

    let (mut gray, mut non_gray): (Vec<ViewKey>, Vec<ViewKey>) = product
        .views
        .values()
        .map(|view| view.key.clone())
        .partition(ViewKey::is_gray);

    sort_views(&mut gray, &GRAY_PREFERENCE);
    sort_views(&mut non_gray, &NON_GRAY_PREFERENCE);

    let file_names = |keys: Vec<ViewKey>| -> Vec<String> {
        keys.iter()
            .map(|key| key.file_name(&product.product_id))
            .collect()
    };

    Some(InventoryRow {
        product_id: product.product_id.clone(),
        gray_filenames: file_names(gray),
        non_gray_filenames: file_names(non_gray),
    })
}

/// Build inventory rows for every product with at least one view
pub fn build_inventory(products: &[ResolvedProduct]) -> Vec<InventoryRow> {
    products.iter().filter_map(inventory_row).collect()
}

/// Split a list cell back into filenames
///
/// Filenames are separated by exactly [`LIST_SEPARATOR`]; a bare comma is
/// part of a filename.
fn split_list(cell: &str) -> Vec<String> {
    cell.split(LIST_SEPARATOR)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Write the inventory CSV
pub fn write_inventory(path: &Path, rows: &[InventoryRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(INVENTORY_HEADER)?;
    for row in rows {
        writer.write_record([
            row.product_id.as_str(),
            row.non_gray_filenames.join(LIST_SEPARATOR).as_str(),
            row.gray_filenames.join(LIST_SEPARATOR).as_str(),
        ])?;
    }
    writer.flush()?;

    info!("Wrote {} inventory rows to {}", rows.len(), path.display());
    Ok(())
}

/// Read an inventory CSV written by [`write_inventory`]
///
/// Rows without a product id are skipped.
pub fn read_inventory(path: &Path) -> Result<Vec<InventoryRow>> {
    if !path.is_file() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let product_id = record.get(0).unwrap_or("").trim();
        if product_id.is_empty() {
            debug!("Skipping inventory line without a product id");
            continue;
        }
        rows.push(InventoryRow {
            product_id: product_id.to_string(),
            non_gray_filenames: split_list(record.get(1).unwrap_or("")),
            gray_filenames: split_list(record.get(2).unwrap_or("")),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ClassifiedView, ColorBucket, Dimensions};
    use std::collections::BTreeMap;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn key(bucket: ColorBucket, view: &str) -> ViewKey {
        ViewKey::new(bucket, view, Some(Dimensions::new(800, 600)))
    }

    fn product(id: &str, keys: Vec<ViewKey>) -> ResolvedProduct {
        let mut product = ResolvedProduct {
            product_id: id.to_string(),
            source_catalog: "brand".to_string(),
            image_paths: Vec::new(),
            views: BTreeMap::new(),
        };
        for key in keys {
            product.insert_view(ClassifiedView {
                image_path: format!("{}.jpg", key),
                source: PathBuf::from(format!("/store/{}.jpg", key)),
                key,
            });
        }
        product
    }

    #[test]
    fn test_non_gray_preference_order() {
        let mut keys = vec![
            key(ColorBucket::Default, "birdseye"),
            key(ColorBucket::Default, "zoom"),
            key(ColorBucket::White, "main"),
            key(ColorBucket::Default, "front"),
            key(ColorBucket::Default, "main"),
            key(ColorBucket::Default, "detail"),
            key(ColorBucket::Default, "lifestyle"),
        ];
        sort_views(&mut keys, &NON_GRAY_PREFERENCE);

        let sorted: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(
            sorted,
            vec![
                "default_main_800x600",
                "white_main_800x600",
                "default_lifestyle_800x600",
                "default_front_800x600",
                "default_birdseye_800x600",
                "default_detail_800x600",
                "default_zoom_800x600",
            ]
        );
    }

    #[test]
    fn test_gray_preference_order() {
        let mut keys = vec![
            key(ColorBucket::Gray, "outsole"),
            key(ColorBucket::Gray, "main"),
            key(ColorBucket::Gray, "doublequarter"),
            key(ColorBucket::Gray, "profile"),
            key(ColorBucket::Gray, "doubleheel"),
        ];
        sort_views(&mut keys, &GRAY_PREFERENCE);

        let views: Vec<&str> = keys.iter().map(|k| k.view.as_str()).collect();
        assert_eq!(
            views,
            vec!["profile", "main", "doubleheel", "doublequarter", "outsole"]
        );
    }

    #[test]
    fn test_sorting_is_idempotent() {
        let mut keys = vec![
            key(ColorBucket::Default, "zeta"),
            key(ColorBucket::Default, "back"),
            key(ColorBucket::Default, "alpha"),
            key(ColorBucket::Default, "main"),
        ];
        sort_views(&mut keys, &NON_GRAY_PREFERENCE);
        let once = keys.clone();
        sort_views(&mut keys, &NON_GRAY_PREFERENCE);
        assert_eq!(keys, once);
    }

    #[test]
    fn test_inventory_row_partitions_buckets() {
        let product = product(
            "ABC123",
            vec![
                key(ColorBucket::Gray, "profile"),
                key(ColorBucket::White, "main"),
                key(ColorBucket::Default, "lifestyle"),
            ],
        );
        let row = inventory_row(&product).unwrap();

        assert_eq!(row.gray_filenames, vec!["ABC123_gray_profile_800x600.jpg"]);
        assert_eq!(
            row.non_gray_filenames,
            vec![
                "ABC123_white_main_800x600.jpg",
                "ABC123_default_lifestyle_800x600.jpg"
            ]
        );
    }

    #[test]
    fn test_products_without_views_have_no_row() {
        let products = vec![
            product("A", vec![key(ColorBucket::Default, "main")]),
            product("B", Vec::new()),
        ];
        let rows = build_inventory(&products);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_id, "A");
    }

    #[test]
    fn test_write_and_read_inventory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("brand_catalog-image-inventory-export.csv");

        let rows = vec![
            InventoryRow {
                product_id: "A".to_string(),
                gray_filenames: vec![
                    "A_gray_profile_800x600.jpg".to_string(),
                    "A_gray_main.jpg".to_string(),
                ],
                non_gray_filenames: vec!["A_default_main_800x600.jpg".to_string()],
            },
            InventoryRow {
                product_id: "B".to_string(),
                gray_filenames: Vec::new(),
                non_gray_filenames: vec![
                    "B_default_main.jpg".to_string(),
                    "B_default_front.jpg".to_string(),
                ],
            },
        ];
        write_inventory(&path, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("productId,nonGrayImageFileNames,grayImageFileNames")
        );
        assert_eq!(
            lines.next(),
            Some(r#"A,A_default_main_800x600.jpg,"A_gray_profile_800x600.jpg, A_gray_main.jpg""#)
        );

        assert_eq!(read_inventory(&path).unwrap(), rows);
    }

    #[test]
    fn test_comma_in_view_round_trips_as_one_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory.csv");

        let from_view = ViewKey::new(ColorBucket::Default, "front,alt", None).file_name("ABC123");
        assert_eq!(from_view, "ABC123_default_front_alt.jpg");

        let rows = vec![InventoryRow {
            product_id: "ABC123".to_string(),
            gray_filenames: Vec::new(),
            non_gray_filenames: vec![from_view, "ABC123_legacy,name.jpg".to_string()],
        }];
        write_inventory(&path, &rows).unwrap();

        let read = read_inventory(&path).unwrap();
        assert_eq!(read, rows);
        assert_eq!(read[0].non_gray_filenames.len(), 2);
    }

    #[test]
    fn test_read_inventory_skips_blank_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory.csv");
        std::fs::write(
            &path,
            "productId,nonGrayImageFileNames,grayImageFileNames\n\nA,\"A_default_main.jpg\",\n,,\n",
        )
        .unwrap();

        let rows = read_inventory(&path).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].non_gray_filenames, vec!["A_default_main.jpg"]);
        assert!(rows[0].gray_filenames.is_empty());
    }

    #[test]
    fn test_read_missing_inventory() {
        let result = read_inventory(Path::new("/no/such/inventory.csv"));
        assert!(matches!(result, Err(Error::FileNotFound(_))));
    }
}
