use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the catalog-manifest library
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image metadata error
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Catalog document could not be parsed
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// CSV encode/decode error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// File or directory not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A bounded operation did not finish in time
    #[error("Timed out after {seconds}s: {operation} on {path}")]
    Timeout {
        operation: String,
        path: PathBuf,
        seconds: u64,
    },

    /// Unknown error
    #[error("Unknown error: {0}")]
    Unknown(String),
}
