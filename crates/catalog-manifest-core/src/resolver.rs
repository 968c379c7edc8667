use log::{info, warn};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::logging::log_image_skip;
use crate::types::{CatalogProduct, ResolvedProduct};

/// Location of a catalog image path inside the image store
///
/// Catalog paths are relative to the store root; a leading `/` is ignored.
pub fn store_path(images_root: &Path, image_path: &str) -> PathBuf {
    images_root.join(image_path.trim_start_matches(['/', '\\']))
}

/// Narrow a product to the images present in the store
///
/// Returns `None` when none of the candidate paths exist.
pub fn resolve_product(product: &CatalogProduct, images_root: &Path) -> Option<ResolvedProduct> {
    let image_paths: Vec<(String, PathBuf)> = product
        .candidate_image_paths
        .iter()
        .filter_map(|image_path| {
            let path = store_path(images_root, image_path);
            if path.is_file() {
                Some((image_path.clone(), path))
            } else {
                log_image_skip(&path, "not found in image store");
                None
            }
        })
        .collect();

    if image_paths.is_empty() {
        warn!(
            "Product {} has no images in the store; dropping it",
            product.product_id
        );
        return None;
    }

    Some(ResolvedProduct {
        product_id: product.product_id.clone(),
        source_catalog: product.source_catalog.clone(),
        image_paths,
        views: BTreeMap::new(),
    })
}

/// Resolve every product of a catalog, keeping catalog order
pub fn resolve_products(products: &[CatalogProduct], images_root: &Path) -> Vec<ResolvedProduct> {
    let resolved: Vec<ResolvedProduct> = products
        .iter()
        .filter_map(|product| resolve_product(product, images_root))
        .collect();

    info!(
        "Resolved {} of {} products against {}",
        resolved.len(),
        products.len(),
        images_root.display()
    );

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn product(id: &str, paths: &[&str]) -> CatalogProduct {
        CatalogProduct {
            product_id: id.to_string(),
            candidate_image_paths: paths.iter().map(|p| p.to_string()).collect(),
            source_catalog: "brand".to_string(),
        }
    }

    #[test]
    fn test_store_path_ignores_leading_slash() {
        let root = Path::new("/store");
        assert_eq!(
            store_path(root, "/gray/A_large.jpg"),
            PathBuf::from("/store/gray/A_large.jpg")
        );
        assert_eq!(
            store_path(root, "gray/A_large.jpg"),
            PathBuf::from("/store/gray/A_large.jpg")
        );
    }

    #[test]
    fn test_resolve_keeps_existing_paths_only() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("default")).unwrap();
        fs::write(dir.path().join("default/A_large.jpg"), b"img").unwrap();

        let products = vec![
            product("A", &["default/A_large.jpg", "default/A_9_large.jpg"]),
            product("B", &["default/B_large.jpg"]),
        ];

        let resolved = resolve_products(&products, dir.path());
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].product_id, "A");
        assert_eq!(resolved[0].image_paths.len(), 1);
        assert_eq!(resolved[0].image_paths[0].0, "default/A_large.jpg");
        assert!(resolved[0].views.is_empty());
    }

    #[test]
    fn test_directory_is_not_an_image() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("gray")).unwrap();

        assert!(resolve_product(&product("A", &["gray"]), dir.path()).is_none());
    }
}
