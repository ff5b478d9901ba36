//! Error types for the purctally-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the purctally library.
#[derive(Error, Debug)]
pub enum PurcError {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// JSON store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Requested item does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Errors related to OCR processing.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR binary could not be started.
    #[error("OCR engine unavailable ({command}): {reason}")]
    Unavailable { command: String, reason: String },

    /// The OCR binary ran but reported a failure.
    #[error("OCR engine failed: {0}")]
    Engine(String),

    /// Image preprocessing failed.
    #[error("preprocessing failed: {0}")]
    Preprocessing(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),
}

/// Errors related to invoice field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// A configured regular expression does not compile.
    #[error("invalid pattern for {field}: {reason}")]
    InvalidPattern { field: String, reason: String },
}

/// Errors related to the JSON-backed stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A store file exists but does not hold the expected JSON.
    #[error("malformed file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    /// Supplier name is empty.
    #[error("supplier required")]
    EmptySupplier,

    /// Partition files could not be listed.
    #[error("failed to list partitions: {0}")]
    Glob(String),

    /// I/O error while reading or writing a store file.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for the purctally library.
pub type Result<T> = std::result::Result<T, PurcError>;
