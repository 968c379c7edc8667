//! Core functionality for turning a catalog export into Shopify image manifests.
//!
//! The pipeline runs in forward-only stages:
//! - Allow-list loading and catalog extraction
//! - Image availability resolution
//! - View classification
//! - Inventory CSV and renamed image copies
//! - Matrixify manifest generation from the inventory CSV

// -- External Dependencies --
use log::{error, info};
use walkdir::WalkDir;

// -- Standard Library --
use std::path::PathBuf;

// -- Internal Modules --
mod error;

// -- Public Re-exports --
pub use config::*;
pub use error::{Error, Result};
pub use types::*;

// -- Public Modules --
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod inspector;
pub mod inventory;
pub mod logging;
pub mod manifest;
pub mod materialize;
pub mod resolver;
pub mod styles;
pub mod types;

use classifier::ViewClassifier;
use inspector::ImageInspector;

/// File name suffix of inventory CSVs
const INVENTORY_SUFFIX: &str = "_catalog-image-inventory-export.csv";

/// Main entry point for the export process
pub struct CatalogExporter {
    config: Config,
    classifier: ViewClassifier,
}

impl CatalogExporter {
    /// Create a new CatalogExporter with the provided configuration
    pub fn new(config: Config) -> Self {
        let classifier = ViewClassifier::from_config(&config);
        Self { config, classifier }
    }

    /// Create an exporter that reads image dimensions through `inspector`
    pub fn with_inspector(config: Config, inspector: Box<dyn ImageInspector>) -> Self {
        let classifier = ViewClassifier::new(&config.ignored_folders, inspector);
        Self { config, classifier }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full export pipeline over every catalog
    ///
    /// Fails only when a required input directory is missing; everything
    /// else is logged and skipped per catalog, product or image.
    pub fn run(&self) -> Result<Vec<CatalogSummary>> {
        self.config.check_required_dirs()?;

        info!("Loading allow-lists...");
        let allow_lists = styles::load_allow_lists(&self.config.styles_path())?;

        info!("Extracting catalogs...");
        let catalogs = catalog::extract_catalogs(&self.config, &allow_lists)?;

        let mut summaries = Vec::with_capacity(catalogs.len());
        for (catalog, products) in &catalogs {
            summaries.push(self.export_catalog(catalog, products)?);
        }

        for summary in &summaries {
            info!(
                "Catalog '{}': {} extracted, {} resolved, {} inventory rows, {} images copied, {} manifest rows",
                summary.catalog,
                summary.extracted_products,
                summary.resolved_products,
                summary.inventory_rows,
                summary.materialized.copied,
                summary
                    .manifest_rows
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| "no".to_string()),
            );
        }

        Ok(summaries)
    }

    /// Resolve, classify and export the products of one catalog
    pub fn export_catalog(
        &self,
        catalog: &str,
        products: &[CatalogProduct],
    ) -> Result<CatalogSummary> {
        info!("Exporting catalog '{}'", catalog);

        let resolved = resolver::resolve_products(products, &self.config.images_path());
        let resolved_products = resolved.len();

        let classified = self
            .classifier
            .classify_products(resolved, self.config.effective_threads())?;

        let rows = inventory::build_inventory(&classified);
        let inventory_path = self.config.inventory_csv_path(catalog);
        let inventory_written = match inventory::write_inventory(&inventory_path, &rows) {
            Ok(()) => true,
            Err(e) => {
                error!(
                    "Failed to write inventory {}: {}",
                    inventory_path.display(),
                    e
                );
                false
            }
        };

        let materialized = match materialize::materialize_views(
            &classified,
            &self.config.images_output_path(),
            self.config.dry_run,
        ) {
            Ok(report) => report,
            Err(e) => {
                error!("Failed to materialize images for '{}': {}", catalog, e);
                MaterializeReport::default()
            }
        };

        let manifest_rows = if inventory_written {
            self.generate_manifest(catalog)
        } else {
            None
        };

        Ok(CatalogSummary {
            catalog: catalog.to_string(),
            extracted_products: products.len(),
            resolved_products,
            inventory_rows: rows.len(),
            materialized,
            manifest_rows,
        })
    }

    /// Build the manifest of one catalog from its inventory CSV
    ///
    /// Returns the number of rows written, or `None` when an input is
    /// missing or the manifest could not be written.
    pub fn generate_manifest(&self, catalog: &str) -> Option<usize> {
        match self.try_generate_manifest(catalog) {
            Ok(count) => Some(count),
            Err(e) => {
                error!("Manifest for catalog '{}' not produced: {}", catalog, e);
                None
            }
        }
    }

    fn try_generate_manifest(&self, catalog: &str) -> Result<usize> {
        let styles = manifest::load_style_map(&self.config.style_map_path(catalog))?;
        let inventory = inventory::read_inventory(&self.config.inventory_csv_path(catalog))?;

        let rows = manifest::generate_manifest(&inventory, &styles, &self.config.image_src_prefix);
        manifest::write_manifest(&self.config.manifest_csv_path(catalog), &rows)?;

        Ok(rows.len())
    }

    /// Catalogs that have an inventory CSV in the output directory
    pub fn inventory_catalogs(&self) -> Vec<String> {
        let output_dir: PathBuf = self.config.root.join(&self.config.output_dir);

        WalkDir::new(output_dir)
            .max_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                e.file_name()
                    .to_str()
                    .and_then(|name| name.strip_suffix(INVENTORY_SUFFIX))
                    .filter(|catalog| !catalog.is_empty())
                    .map(str::to_string)
            })
            .collect()
    }

    /// Re-run only the manifest stage for every existing inventory CSV
    pub fn run_manifests(&self) -> Vec<(String, Option<usize>)> {
        let catalogs = self.inventory_catalogs();
        if catalogs.is_empty() {
            error!("No inventory CSVs found; run the full export first");
        }

        catalogs
            .into_iter()
            .map(|catalog| {
                let rows = self.generate_manifest(&catalog);
                (catalog, rows)
            })
            .collect()
    }
}
