//! View classification.
//!
//! Maps an image path and its product identifier to a [`ViewKey`]:
//!
//! 1. the parent folder picks the color bucket (`gray`, `white`, else `default`)
//! 2. the file stem minus the product prefix gives the raw view token
//! 3. one size label (`extralarge`, `large`, `regular`, `thumbnail`) is stripped
//! 4. an empty token becomes `main`
//! 5. numeric view codes are translated to their labels
//! 6. measured dimensions are appended when the image can be read
//!
//! Classification never fails. An unreadable image only loses its
//! dimension suffix.

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::inspector::{HeaderInspector, ImageInspector};
use crate::types::{ClassifiedView, ColorBucket, Dimensions, ResolvedProduct, ViewKey};

/// Size labels, checked in order; at most one is stripped
const SIZE_SUFFIXES: [&str; 4] = ["extralarge", "large", "regular", "thumbnail"];

/// Label for the hero image
pub const MAIN_VIEW: &str = "main";

/// View codes and spelled-out aliases mapped to their semantic label
static VIEW_LABELS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("2", "outsole"),
        ("3", "front"),
        ("4", "back"),
        ("5", "instep_profile"),
        ("6", "birdseye"),
        ("8", "profile"),
        ("9", "lifestyle"),
        ("instepprofile", "instep_profile"),
    ])
});

/// Color bucket for an image path
///
/// Folders in `ignored_folders` (spins, swatches) never carry color.
pub fn color_bucket(image_path: &Path, ignored_folders: &HashSet<String>) -> ColorBucket {
    let folder = image_path
        .parent()
        .and_then(|parent| parent.file_name())
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if ignored_folders.contains(&folder) {
        return ColorBucket::Default;
    }

    match folder.as_str() {
        "gray" => ColorBucket::Gray,
        "white" => ColorBucket::White,
        _ => ColorBucket::Default,
    }
}

/// Remove the first matching size label and the separators before it
pub fn strip_size_suffix(view: &str) -> &str {
    for suffix in SIZE_SUFFIXES {
        if let Some(stripped) = view.strip_suffix(suffix) {
            return stripped.trim_end_matches(['_', '-']);
        }
    }
    view
}

/// Semantic label for a view token; unknown tokens pass through
pub fn translate_view(view: &str) -> &str {
    VIEW_LABELS.get(view).copied().unwrap_or(view)
}

/// Semantic view token of an image, before bucket and dimensions are added
pub fn semantic_view(product_id: &str, image_path: &Path) -> String {
    let stem = image_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let without_id = match stem.get(..product_id.len()) {
        Some(prefix) if !product_id.is_empty() && prefix.eq_ignore_ascii_case(product_id) => {
            &stem[product_id.len()..]
        }
        _ => stem.as_str(),
    };
    let token = without_id.strip_prefix('_').unwrap_or(without_id).to_lowercase();

    let view = strip_size_suffix(&token);
    let view = if view.is_empty() { MAIN_VIEW } else { view };

    translate_view(view).to_string()
}

/// Derives view keys for product images
pub struct ViewClassifier {
    ignored_folders: HashSet<String>,
    inspector: Box<dyn ImageInspector>,
}

impl ViewClassifier {
    pub fn new(ignored_folders: &[String], inspector: Box<dyn ImageInspector>) -> Self {
        Self {
            ignored_folders: ignored_folders.iter().map(|f| f.to_lowercase()).collect(),
            inspector,
        }
    }

    /// Classifier using the `image`-crate inspector with the configured timeout
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.ignored_folders,
            Box::new(HeaderInspector::new(std::time::Duration::from_secs(
                config.dimension_timeout_secs,
            ))),
        )
    }

    /// View key for an image with already known dimensions
    pub fn view_key(
        &self,
        product_id: &str,
        image_path: &Path,
        dimensions: Option<Dimensions>,
    ) -> ViewKey {
        ViewKey::new(
            color_bucket(image_path, &self.ignored_folders),
            semantic_view(product_id, image_path),
            dimensions,
        )
    }

    /// View key for an image, probing `source` for its dimensions
    ///
    /// `image_path` is the catalog path that drives naming; `source` is the
    /// file in the image store.
    pub fn classify(&self, product_id: &str, image_path: &Path, source: &Path) -> ViewKey {
        let dimensions = match self.inspector.dimensions(source) {
            Ok(dims) => Some(dims),
            Err(e) => {
                warn!(
                    "Could not read dimensions of {}: {}; omitting size from view key",
                    source.display(),
                    e
                );
                None
            }
        };
        self.view_key(product_id, image_path, dimensions)
    }

    /// Classify every image of a product in order; later images replace
    /// earlier ones that produce the same key
    pub fn classify_product(&self, mut product: ResolvedProduct) -> ResolvedProduct {
        let image_paths = product.image_paths.clone();
        for (image_path, source) in image_paths {
            let key = self.classify(&product.product_id, Path::new(&image_path), &source);
            if let Some(replaced) = product.insert_view(ClassifiedView {
                key: key.clone(),
                image_path: image_path.clone(),
                source,
            }) {
                debug!(
                    "View {} of product {}: {} replaces {}",
                    key, product.product_id, image_path, replaced.image_path
                );
            }
        }
        product
    }

    /// Classify products in parallel, returning them in input order
    pub fn classify_products(
        &self,
        products: Vec<ResolvedProduct>,
        threads: usize,
    ) -> Result<Vec<ResolvedProduct>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| Error::Unknown(format!("Failed to build thread pool: {}", e)))?;

        let classified: Vec<ResolvedProduct> = pool.install(|| {
            products
                .into_par_iter()
                .map(|product| self.classify_product(product))
                .collect()
        });

        let views: usize = classified.iter().map(|p| p.views.len()).sum();
        info!(
            "Classified {} views across {} products",
            views,
            classified.len()
        );

        Ok(classified)
    }
}
