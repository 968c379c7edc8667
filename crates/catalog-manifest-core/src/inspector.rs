use log::debug;
use std::path::Path;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::Dimensions;

/// Reads pixel dimensions of an image file
pub trait ImageInspector: Send + Sync {
    fn dimensions(&self, path: &Path) -> Result<Dimensions>;
}

/// Inspector backed by the `image` crate
///
/// Only the image header is read. Each header read runs on its own thread and is
/// abandoned after `timeout`, so a hung read cannot block the batch.
#[derive(Debug, Clone)]
pub struct HeaderInspector {
    timeout: Duration,
}

impl HeaderInspector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HeaderInspector {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

impl ImageInspector for HeaderInspector {
    fn dimensions(&self, path: &Path) -> Result<Dimensions> {
        let (width, height) = execute_with_timeout(path, "Dimension read", self.timeout, {
            let path = path.to_path_buf();
            move || image::image_dimensions(&path)
        })??;
        Ok(Dimensions::new(width, height))
    }
}

/// Execute a function with a timeout
///
/// Returns `Error::Timeout` if the task does not finish in time and
/// `Error::Unknown` if the worker thread panics.
pub fn execute_with_timeout<T, F>(
    path: &Path,
    operation_name: &str,
    timeout: Duration,
    task: F,
) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let (tx, rx) = mpsc::channel();

    let handle = thread::Builder::new()
        .name(format!("{}-worker", operation_name.to_lowercase().replace(' ', "-")))
        .spawn(move || {
            // The receiver may be gone after a timeout
            let _ = tx.send(task());
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            let _ = handle.join();
            Ok(result)
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            // The worker is left to finish on its own; its result is dropped
            debug!(
                "TIMEOUT: {} took too long for '{}'",
                operation_name,
                path.display()
            );
            Err(Error::Timeout {
                operation: operation_name.to_string(),
                path: path.to_path_buf(),
                seconds: timeout.as_secs(),
            })
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            let _ = handle.join();
            Err(Error::Unknown(format!(
                "{} panicked for '{}'",
                operation_name,
                path.display()
            )))
        }
    }
}
