//! Core library for purchase-bill OCR processing.
//!
//! This crate provides:
//! - OCR adapter around an external Tesseract binary
//! - Regex field extraction with per-supplier pattern overrides
//! - JSON-backed config, supplier pattern, and daily record stores
//! - A mocked Tally sync that marks today's records as sent
//! - A read-only patient directory over a static JSON dataset

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod patients;
pub mod storage;
pub mod tally;

pub use error::{ExtractionError, OcrError, PurcError, Result, StoreError};
pub use extract::{FieldExtractor, InvoiceScanner};
pub use models::config::{AuthConfig, Config, RegexConfig, TallyConfig};
pub use models::patterns::{PatternOverride, PatternUpdate, SupplierPatterns};
pub use models::record::{ExtractedFields, Record, SentFlag};
pub use ocr::{ImagePreprocessor, OcrEngine, TesseractEngine};
pub use patients::{PatientDirectory, SortOrder};
pub use storage::{ConfigStore, DataDir, PatternStore, RecordStore};
pub use tally::{SendSummary, SyncStatus, TallyClient};
