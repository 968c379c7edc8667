//! Catalog document extraction.
//!
//! Walks `product` elements of a catalog export and collects the image paths
//! of allow-listed products. Elements are matched by local name so catalogs
//! with a default namespace parse the same way as bare ones.

use log::{debug, error, info, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::log_file_error;
use crate::types::{CatalogProduct, StyleAllowList};

/// Products extracted from every catalog, keyed by catalog base name
pub type CatalogProducts = BTreeMap<String, Vec<CatalogProduct>>;

/// Derive the catalog base name from a document path
///
/// The file stem is taken and `suffix` removed from its end when present.
pub fn catalog_base_name(path: &Path, suffix: &str) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let base = if suffix.is_empty() {
        stem
    } else {
        stem.strip_suffix(suffix).unwrap_or(stem)
    };
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}

/// List catalog documents in a directory, sorted by file name
pub fn discover_catalogs(catalogs_dir: &Path) -> Result<Vec<PathBuf>> {
    if !catalogs_dir.is_dir() {
        return Err(Error::FileNotFound(catalogs_dir.to_path_buf()));
    }

    let catalogs = WalkDir::new(catalogs_dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("xml"))
                .unwrap_or(false)
        })
        .collect();

    Ok(catalogs)
}

/// Read the value of an attribute by local name
fn attribute_value(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(quick_xml::Error::from)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Product currently being read
struct ProductState {
    product_id: String,
    allowed: bool,
    paths: Vec<String>,
}

impl ProductState {
    fn push_path(&mut self, path: String) {
        if !self.paths.contains(&path) {
            self.paths.push(path);
        }
    }
}

/// Parse one catalog document into the allow-listed products it contains
///
/// Only image groups whose `view-type` is in `accepted_view_types` contribute
/// paths. Products without any accepted path are not returned.
pub fn parse_catalog(
    xml: &str,
    catalog: &str,
    allowed: &HashSet<String>,
    accepted_view_types: &[String],
) -> Result<Vec<CatalogProduct>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut products = Vec::new();
    let mut current: Option<ProductState> = None;
    let mut images_depth = 0usize;
    // Some(accepted) while inside an image-group
    let mut group: Option<bool> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"product" if current.is_none() => {
                    let product_id = attribute_value(&e, b"product-id")?.unwrap_or_default();
                    let allowed = !product_id.is_empty() && allowed.contains(&product_id);
                    current = Some(ProductState {
                        product_id,
                        allowed,
                        paths: Vec::new(),
                    });
                    images_depth = 0;
                    group = None;
                }
                b"images" if current.is_some() => images_depth += 1,
                b"image-group" if current.is_some() && images_depth > 0 => {
                    let view_type = attribute_value(&e, b"view-type")?.unwrap_or_default();
                    group = Some(accepted_view_types.iter().any(|t| *t == view_type));
                }
                _ => collect_path(&e, group, current.as_mut())?,
            },
            Event::Empty(e) => {
                if e.local_name().as_ref() != b"image-group" {
                    collect_path(&e, group, current.as_mut())?;
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"product" => {
                    if let Some(state) = current.take() {
                        if state.allowed && !state.paths.is_empty() {
                            products.push(CatalogProduct {
                                product_id: state.product_id,
                                candidate_image_paths: state.paths,
                                source_catalog: catalog.to_string(),
                            });
                        } else if state.allowed {
                            debug!(
                                "Product {} in catalog '{}' has no accepted images",
                                state.product_id, catalog
                            );
                        }
                    }
                }
                b"images" => images_depth = images_depth.saturating_sub(1),
                b"image-group" => group = None,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(products)
}

fn collect_path(
    element: &BytesStart<'_>,
    group: Option<bool>,
    current: Option<&mut ProductState>,
) -> Result<()> {
    if group != Some(true) {
        return Ok(());
    }
    let Some(state) = current else {
        return Ok(());
    };
    if !state.allowed {
        return Ok(());
    }
    if let Some(path) = attribute_value(element, b"path")? {
        let path = path.trim();
        if !path.is_empty() {
            state.push_path(path.to_string());
        }
    }
    Ok(())
}

/// Extract allow-listed products from every catalog document
///
/// Catalogs without an allow-list, unreadable files and malformed documents
/// are logged and skipped; the remaining catalogs are still processed.
pub fn extract_catalogs(config: &Config, allow_lists: &StyleAllowList) -> Result<CatalogProducts> {
    let mut extracted = CatalogProducts::new();

    for path in discover_catalogs(&config.catalogs_path())? {
        let Some(catalog) = catalog_base_name(&path, &config.catalog_suffix) else {
            warn!("Cannot derive a catalog name from {}", path.display());
            continue;
        };

        let Some(allowed) = allow_lists.get(&catalog) else {
            warn!(
                "No allow-list found for catalog '{}' ({}); skipping",
                catalog,
                path.display()
            );
            continue;
        };

        let xml = match std::fs::read_to_string(&path) {
            Ok(xml) => xml,
            Err(e) => {
                log_file_error(&path, "read_catalog", &e);
                continue;
            }
        };

        match parse_catalog(&xml, &catalog, allowed, &config.accepted_view_types) {
            Ok(products) => {
                info!(
                    "Catalog '{}': {} allow-listed products with images",
                    catalog,
                    products.len()
                );
                extracted.entry(catalog).or_default().extend(products);
            }
            Err(e) => {
                error!("Failed to parse catalog {}: {}", path.display(), e);
            }
        }
    }

    Ok(extracted)
}
