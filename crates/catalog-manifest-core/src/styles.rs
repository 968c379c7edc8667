//! Per-catalog allow-lists of product styles.
//!
//! Each catalog `{base}` may have a `{base}_styles.txt` file in the styles
//! directory listing one permitted product identifier per line.

use log::{debug, error, info};
use std::collections::HashSet;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::logging::log_file_error;
use crate::types::StyleAllowList;

const STYLES_FILE_SUFFIX: &str = "_styles.txt";

/// Parse allow-list text into a set of identifiers
pub fn parse_allow_list(text: &str) -> HashSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Catalog base name for an allow-list file name, if it follows the convention
pub fn catalog_for_styles_file(file_name: &str) -> Option<&str> {
    file_name
        .strip_suffix(STYLES_FILE_SUFFIX)
        .filter(|base| !base.is_empty())
}

/// Load every `{catalog}_styles.txt` file in the styles directory
pub fn load_allow_lists(styles_dir: &Path) -> Result<StyleAllowList> {
    if !styles_dir.is_dir() {
        return Err(Error::FileNotFound(styles_dir.to_path_buf()));
    }

    let mut allow_lists = StyleAllowList::new();

    for entry in WalkDir::new(styles_dir)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy();

        let Some(catalog) = catalog_for_styles_file(&file_name) else {
            debug!("Ignoring non allow-list file: {}", path.display());
            continue;
        };

        match std::fs::read_to_string(path) {
            Ok(text) => {
                let styles = parse_allow_list(&text);
                info!(
                    "Loaded {} allowed styles for catalog '{}'",
                    styles.len(),
                    catalog
                );
                allow_lists.insert(catalog.to_string(), styles);
            }
            Err(e) => {
                log_file_error(path, "read_allow_list", &e);
                error!("Catalog '{}' has an unreadable allow-list", catalog);
            }
        }
    }

    Ok(allow_lists)
}
