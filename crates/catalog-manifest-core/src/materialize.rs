use log::{info, warn};
use std::path::Path;

use crate::error::Result;
use crate::logging::{log_file_error, log_fs_modification};
use crate::types::{MaterializeReport, ResolvedProduct};

/// Copy every classified view of `products` into `output_dir` under its
/// canonical `{productId}_{viewKey}.jpg` name
///
/// Bytes are copied unchanged. Individual copy failures are logged and
/// counted; only failure to create `output_dir` aborts the stage. With
/// `dry_run` the intended copies are logged and nothing is written.
pub fn materialize_views(
    products: &[ResolvedProduct],
    output_dir: &Path,
    dry_run: bool,
) -> Result<MaterializeReport> {
    if !dry_run {
        std::fs::create_dir_all(output_dir)?;
    }

    let mut report = MaterializeReport::default();

    for product in products {
        for view in product.views.values() {
            let target = output_dir.join(view.key.file_name(&product.product_id));

            if dry_run {
                info!(
                    "DRY RUN - would copy {} to {}",
                    view.source.display(),
                    target.display()
                );
                report.skipped += 1;
                continue;
            }

            match std::fs::copy(&view.source, &target) {
                Ok(bytes) => {
                    log_fs_modification(
                        "copy",
                        &target,
                        Some(&format!("{} bytes from {}", bytes, view.source.display())),
                    );
                    report.copied += 1;
                }
                Err(e) => {
                    log_file_error(&view.source, "copy", &e);
                    report.failed += 1;
                }
            }
        }
    }

    if report.failed > 0 {
        warn!("{} images could not be copied", report.failed);
    }
    info!(
        "Materialized images: {} copied, {} skipped, {} failed",
        report.copied, report.skipped, report.failed
    );

    Ok(report)
}
