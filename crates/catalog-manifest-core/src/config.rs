use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Log level for the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Configuration for one export run.
///
/// Every directory is resolved against `root`, so the defaults reproduce the
/// conventional layout (`catalogs/`, `styles/`, `images/images/`, ...) in the
/// current working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base directory all relative paths below are resolved against
    pub root: PathBuf,

    /// Directory holding the catalog XML documents
    pub catalogs_dir: PathBuf,

    /// Directory holding `{catalog}_styles.txt` allow-lists
    pub styles_dir: PathBuf,

    /// Root of the image store referenced by catalog paths
    pub images_dir: PathBuf,

    /// Directory holding `{catalog}_styles.csv` Shopify style maps
    pub shopify_styles_dir: PathBuf,

    /// Where renamed image copies are written
    pub images_output_dir: PathBuf,

    /// Where the inventory and manifest CSVs are written
    pub output_dir: PathBuf,

    /// Directory for the append-only log file
    pub log_dir: PathBuf,

    /// Suffix stripped from a catalog file stem to get its base name
    pub catalog_suffix: String,

    /// Image-group `view-type` values whose images are collected
    pub accepted_view_types: Vec<String>,

    /// Parent folders that never carry color semantics (spins, swatches)
    pub ignored_folders: Vec<String>,

    /// Per-image timeout for reading dimensions, in seconds
    pub dimension_timeout_secs: u64,

    /// Number of threads used for dimension probing (0 = auto)
    pub threads: usize,

    /// Prefix prepended to the `Image Src` column of the manifest
    pub image_src_prefix: String,

    /// Log intended copies instead of writing image files
    pub dry_run: bool,

    /// Log level
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            catalogs_dir: PathBuf::from("catalogs"),
            styles_dir: PathBuf::from("styles"),
            images_dir: PathBuf::from("images/images"),
            shopify_styles_dir: PathBuf::from("shopify-styles"),
            images_output_dir: PathBuf::from("images-output"),
            output_dir: PathBuf::from("."),
            log_dir: PathBuf::from("logs"),
            catalog_suffix: "_catalog".to_string(),
            accepted_view_types: vec!["hi-res".to_string(), "grid-large".to_string()],
            ignored_folders: vec![
                "spins".to_string(),
                "spin".to_string(),
                "360".to_string(),
                "swatch".to_string(),
                "swatches".to_string(),
            ],
            dimension_timeout_secs: 10,
            threads: 0, // Auto
            image_src_prefix: String::new(),
            dry_run: false,
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .map_err(|e| Error::Configuration(format!("Failed to open config file: {}", e)))?;

        let config: Config = serde_json::from_reader(file)
            .map_err(|e| Error::Configuration(format!("Failed to parse config file: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .map_err(|e| Error::Configuration(format!("Failed to create config file: {}", e)))?;

        serde_json::to_writer_pretty(file, self)
            .map_err(|e| Error::Configuration(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.accepted_view_types.is_empty() {
            return Err(Error::Configuration(
                "At least one accepted image-group view type is required".to_string(),
            ));
        }

        if self.dimension_timeout_secs == 0 {
            return Err(Error::Configuration(
                "Dimension timeout must be at least one second".to_string(),
            ));
        }

        if self.catalog_suffix.ends_with(".xml") {
            return Err(Error::Configuration(
                "Catalog suffix is matched against the file stem and must not include .xml"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Check that the required input directories exist before any work starts
    pub fn check_required_dirs(&self) -> Result<()> {
        for dir in [self.catalogs_path(), self.styles_path(), self.images_path()] {
            if !dir.is_dir() {
                return Err(Error::FileNotFound(dir));
            }
        }
        Ok(())
    }

    pub fn catalogs_path(&self) -> PathBuf {
        self.root.join(&self.catalogs_dir)
    }

    pub fn styles_path(&self) -> PathBuf {
        self.root.join(&self.styles_dir)
    }

    pub fn images_path(&self) -> PathBuf {
        self.root.join(&self.images_dir)
    }

    pub fn shopify_styles_path(&self) -> PathBuf {
        self.root.join(&self.shopify_styles_dir)
    }

    pub fn images_output_path(&self) -> PathBuf {
        self.root.join(&self.images_output_dir)
    }

    pub fn log_path(&self) -> PathBuf {
        self.root.join(&self.log_dir)
    }

    /// `{catalog}_catalog-image-inventory-export.csv`
    pub fn inventory_csv_path(&self, catalog: &str) -> PathBuf {
        self.root
            .join(&self.output_dir)
            .join(format!("{}_catalog-image-inventory-export.csv", catalog))
    }

    /// `{catalog}_matrixify_image_upload.csv`
    pub fn manifest_csv_path(&self, catalog: &str) -> PathBuf {
        self.root
            .join(&self.output_dir)
            .join(format!("{}_matrixify_image_upload.csv", catalog))
    }

    /// `shopify-styles/{catalog}_styles.csv`
    pub fn style_map_path(&self, catalog: &str) -> PathBuf {
        self.shopify_styles_path()
            .join(format!("{}_styles.csv", catalog))
    }

    /// Number of worker threads, resolving 0 to the CPU count
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}
