use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::PathBuf;

/// Catalog base name → permitted product identifiers
pub type StyleAllowList = BTreeMap<String, HashSet<String>>;

/// Coarse color variant of an image, derived from the folder it lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColorBucket {
    Default,
    Gray,
    White,
}

impl ColorBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Gray => "gray",
            Self::White => "white",
        }
    }

    /// Parse a lowercase bucket label
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "default" => Some(Self::Default),
            "gray" => Some(Self::Gray),
            "white" => Some(Self::White),
            _ => None,
        }
    }
}

impl fmt::Display for ColorBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse a `{width}x{height}` token
    pub fn parse(token: &str) -> Option<Self> {
        let (w, h) = token.split_once('x')?;
        if w.is_empty() || h.is_empty() {
            return None;
        }
        if !w.bytes().all(|b| b.is_ascii_digit()) || !h.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(Self::new(w.parse().ok()?, h.parse().ok()?))
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Make a view token safe to embed in a composed key and in inventory lists
///
/// Hyphens and commas become underscores. A trailing `_{w}x{h}` segment is
/// joined onto the token (`detail_100x100` → `detail100x100`) so that only
/// measured dimensions ever appear as the last segment of a key.
fn normalize_view(view: String) -> String {
    let view = view.replace(['-', ','], "_");
    match view.rsplit_once('_') {
        Some((head, last)) if !head.is_empty() && Dimensions::parse(last).is_some() => {
            format!("{}{}", head, last)
        }
        _ => view,
    }
}

/// Canonical identifier of one product image: bucket, semantic view and
/// optional pixel dimensions.
///
/// Displays as `{bucket}_{view}[_{width}x{height}]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ViewKey {
    pub bucket: ColorBucket,
    pub view: String,
    pub dimensions: Option<Dimensions>,
}

impl ViewKey {
    pub fn new(bucket: ColorBucket, view: impl Into<String>, dimensions: Option<Dimensions>) -> Self {
        let view = normalize_view(view.into());
        Self {
            bucket,
            view,
            dimensions,
        }
    }

    pub fn is_gray(&self) -> bool {
        self.bucket == ColorBucket::Gray
    }

    /// Parse a composed key such as `gray_instep_profile_800x600`.
    ///
    /// The leading segment is the bucket, a trailing `{w}x{h}` segment is the
    /// dimensions, and everything in between is the view, so views that
    /// contain underscores survive.
    pub fn parse(key: &str) -> Option<Self> {
        let (bucket, rest) = key.split_once('_')?;
        let bucket = ColorBucket::from_label(bucket)?;

        let (view, dimensions) = match rest.rsplit_once('_') {
            Some((view, last)) => match Dimensions::parse(last) {
                Some(dims) => (view, Some(dims)),
                None => (rest, None),
            },
            None => (rest, None),
        };

        if view.is_empty() {
            return None;
        }

        Some(Self::new(bucket, view, dimensions))
    }

    /// Output filename for this view of a product: `{productId}_{key}.jpg`
    pub fn file_name(&self, product_id: &str) -> String {
        format!("{}_{}.jpg", product_id, self)
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.bucket, self.view)?;
        if let Some(dims) = self.dimensions {
            write!(f, "_{}", dims)?;
        }
        Ok(())
    }
}

/// A product that passed the allow-list and has at least one image path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogProduct {
    pub product_id: String,

    /// Image paths relative to the image store, in document order
    pub candidate_image_paths: Vec<String>,

    /// Base name of the catalog the product came from
    pub source_catalog: String,
}

/// One classified image of a resolved product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedView {
    pub key: ViewKey,

    /// Candidate path as it appeared in the catalog
    pub image_path: String,

    /// Location of the file in the image store
    pub source: PathBuf,
}

/// A product narrowed to images that exist in the image store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedProduct {
    pub product_id: String,
    pub source_catalog: String,

    /// Confirmed catalog paths paired with their location on disk
    pub image_paths: Vec<(String, PathBuf)>,

    /// Composed view key → classified image; last write wins on collision
    pub views: BTreeMap<String, ClassifiedView>,
}

impl ResolvedProduct {
    /// Insert a view, replacing any earlier image with the same key
    pub fn insert_view(&mut self, view: ClassifiedView) -> Option<ClassifiedView> {
        self.views.insert(view.key.to_string(), view)
    }
}

/// One line of the inventory CSV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub product_id: String,
    pub gray_filenames: Vec<String>,
    pub non_gray_filenames: Vec<String>,
}

/// A Shopify product for a catalog style
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleMapEntry {
    pub shopify_id: String,
    pub title: String,
    pub style: String,
}

/// One line of the Matrixify image-upload CSV
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRow {
    pub shopify_id: String,
    pub image_src: String,
    pub position: usize,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub alt_text: String,
    pub style_label: Option<String>,
}

/// Outcome of copying images into the output store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializeReport {
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Per-catalog counts logged at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub catalog: String,
    pub extracted_products: usize,
    pub resolved_products: usize,
    pub inventory_rows: usize,
    pub materialized: MaterializeReport,
    pub manifest_rows: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_key_display() {
        let key = ViewKey::new(ColorBucket::Gray, "profile", Some(Dimensions::new(800, 600)));
        assert_eq!(key.to_string(), "gray_profile_800x600");

        let key = ViewKey::new(ColorBucket::Default, "lifestyle", None);
        assert_eq!(key.to_string(), "default_lifestyle");
    }

    #[test]
    fn test_view_key_replaces_hyphens() {
        let key = ViewKey::new(ColorBucket::White, "side-left", None);
        assert_eq!(key.to_string(), "white_side_left");
    }

    #[test]
    fn test_view_key_parse_multi_segment_view() {
        let key = ViewKey::parse("gray_instep_profile_800x600").unwrap();
        assert_eq!(key.bucket, ColorBucket::Gray);
        assert_eq!(key.view, "instep_profile");
        assert_eq!(key.dimensions, Some(Dimensions::new(800, 600)));

        let key = ViewKey::parse("default_instep_profile").unwrap();
        assert_eq!(key.view, "instep_profile");
        assert_eq!(key.dimensions, None);
    }

    #[test]
    fn test_view_key_replaces_commas() {
        let key = ViewKey::new(ColorBucket::Default, "front,alt", None);
        assert_eq!(key.to_string(), "default_front_alt");
    }

    #[test]
    fn test_dimension_like_view_token_is_not_read_as_size() {
        // An unmeasured image whose name ends in a size-looking token
        let key = ViewKey::new(ColorBucket::Default, "detail_100x100", None);
        assert_eq!(key.to_string(), "default_detail100x100");

        let parsed = ViewKey::parse(&key.to_string()).unwrap();
        assert_eq!(parsed.view, "detail100x100");
        assert_eq!(parsed.dimensions, None);

        let measured = ViewKey::new(
            ColorBucket::Default,
            "detail_100x100",
            Some(Dimensions::new(800, 600)),
        );
        let parsed = ViewKey::parse(&measured.to_string()).unwrap();
        assert_eq!(parsed.view, "detail100x100");
        assert_eq!(parsed.dimensions, Some(Dimensions::new(800, 600)));
    }

    #[test]
    fn test_view_key_parse_rejects_unknown_bucket() {
        assert!(ViewKey::parse("blue_main").is_none());
        assert!(ViewKey::parse("main").is_none());
        assert!(ViewKey::parse("gray_").is_none());
    }

    #[test]
    fn test_dimensions_parse() {
        assert_eq!(Dimensions::parse("1200x900"), Some(Dimensions::new(1200, 900)));
        assert_eq!(Dimensions::parse("x900"), None);
        assert_eq!(Dimensions::parse("12ax9"), None);
        assert_eq!(Dimensions::parse("profile"), None);
    }

    #[test]
    fn test_insert_view_last_write_wins() {
        let mut product = ResolvedProduct {
            product_id: "ABC123".to_string(),
            source_catalog: "brand".to_string(),
            image_paths: Vec::new(),
            views: BTreeMap::new(),
        };
        let key = ViewKey::new(ColorBucket::Default, "main", None);
        product.insert_view(ClassifiedView {
            key: key.clone(),
            image_path: "a.jpg".to_string(),
            source: PathBuf::from("/img/a.jpg"),
        });
        let replaced = product.insert_view(ClassifiedView {
            key,
            image_path: "b.jpg".to_string(),
            source: PathBuf::from("/img/b.jpg"),
        });

        assert_eq!(replaced.unwrap().image_path, "a.jpg");
        assert_eq!(product.views.len(), 1);
        assert_eq!(product.views["default_main"].image_path, "b.jpg");
    }
}
