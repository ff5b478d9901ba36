//! Image-to-fields pipeline.

use std::path::Path;

use tracing::{info, warn};

use super::extractor::FieldExtractor;
use crate::error::Result;
use crate::models::record::ExtractedFields;
use crate::ocr::{ImagePreprocessor, OcrEngine, TesseractEngine};
use crate::storage::{ConfigStore, DataDir, PatternStore};

/// Error marker set on fields when the image cannot be read.
pub const UNREADABLE_IMAGE: &str = "file not found";

/// Reads an image, runs OCR, and extracts fields with the configured
/// patterns.
pub struct InvoiceScanner<E: OcrEngine> {
    config: ConfigStore,
    patterns: PatternStore,
    engine: E,
    preprocessor: ImagePreprocessor,
}

impl InvoiceScanner<TesseractEngine> {
    /// Scanner using the Tesseract binary named in the data directory config.
    pub fn from_data_dir(data: &DataDir) -> Result<Self> {
        let config = data.config_store().load()?;
        Ok(Self::new(data, TesseractEngine::new(config.tesseract_cmd)))
    }

    /// Recognize with the given Tesseract language, e.g. `eng` or `eng+hin`.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.engine = self.engine.with_language(language);
        self
    }
}

impl<E: OcrEngine> InvoiceScanner<E> {
    pub fn new(data: &DataDir, engine: E) -> Self {
        Self {
            config: data.config_store(),
            patterns: data.pattern_store(),
            engine,
            preprocessor: ImagePreprocessor::new(),
        }
    }

    pub fn with_preprocessor(mut self, preprocessor: ImagePreprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// OCR the image at `path` and extract its fields.
    ///
    /// An unreadable image yields all-empty fields with an error marker
    /// instead of an error. `source_file` is set to the file name either way.
    pub fn scan(&self, path: &Path) -> Result<ExtractedFields> {
        let source_file = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        let image = match image::open(path) {
            Ok(image) => image,
            Err(e) => {
                warn!("Cannot read image {}: {}", path.display(), e);
                return Ok(ExtractedFields::failed(UNREADABLE_IMAGE).with_source_file(source_file));
            }
        };

        info!("Scanning {} with {}", path.display(), self.engine.name());
        let prepared = self.preprocessor.prepare(&image);
        let text = self.engine.recognize(&prepared)?;

        Ok(self.extract_text(&text)?.with_source_file(source_file))
    }

    /// Extract fields from already recognized text.
    pub fn extract_text(&self, text: &str) -> Result<ExtractedFields> {
        let config = self.config.load()?;
        FieldExtractor::new(&self.patterns).extract(text, &config.regex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OcrError;
    use image::{DynamicImage, GenericImageView, RgbImage};
    use std::cell::Cell;
    use std::fs;

    /// Returns fixed text and records what it was given.
    struct FakeEngine {
        text: String,
        calls: Cell<usize>,
        last_was_gray: Cell<bool>,
    }

    impl FakeEngine {
        fn new(text: &str) -> Self {
            Self {
                text: text.to_string(),
                calls: Cell::new(0),
                last_was_gray: Cell::new(false),
            }
        }
    }

    impl OcrEngine for FakeEngine {
        fn name(&self) -> &str {
            "fake"
        }

        fn recognize(&self, image: &DynamicImage) -> std::result::Result<String, OcrError> {
            self.calls.set(self.calls.get() + 1);
            self.last_was_gray.set(matches!(image, DynamicImage::ImageLuma8(_)));
            assert!(image.dimensions().0 > 0);
            Ok(self.text.clone())
        }
    }

    fn write_png(dir: &Path, name: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbImage::new(8, 8).save(&path).unwrap();
        path
    }

    #[test]
    fn test_scan_image() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path().join("data"));
        data.ensure().unwrap();
        let image = write_png(dir.path(), "acme.png");

        let engine = FakeEngine::new(
            "Sold By: Acme Traders, \nBill No: 77\nBill Date: 2024-02-01\nTotal Amount: 1200.00",
        );
        let scanner = InvoiceScanner::new(&data, engine);
        let fields = scanner.scan(&image).unwrap();

        assert_eq!(fields.supplier, "Acme Traders");
        assert_eq!(fields.invoice_no, "77");
        assert_eq!(fields.invoice_date, "2024-02-01");
        assert_eq!(fields.invoice_amount, "1200.00");
        assert_eq!(fields.source_file.as_deref(), Some("acme.png"));
        assert_eq!(scanner.engine().calls.get(), 1);
        assert!(scanner.engine().last_was_gray.get());
        assert!(data.pattern_store().get("Acme Traders").unwrap().is_some());
    }

    #[test]
    fn test_missing_image_yields_error_marker() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path());
        let scanner = InvoiceScanner::new(&data, FakeEngine::new("Supplier: Nobody"));

        let fields = scanner.scan(&dir.path().join("missing.png")).unwrap();

        assert_eq!(fields.error.as_deref(), Some(UNREADABLE_IMAGE));
        assert_eq!(fields.supplier, "");
        assert_eq!(fields.full_text, "");
        assert_eq!(fields.source_file.as_deref(), Some("missing.png"));
        assert_eq!(scanner.engine().calls.get(), 0);
    }

    #[test]
    fn test_non_image_file_yields_error_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.png");
        fs::write(&path, "plain text, not an image").unwrap();

        let data = DataDir::new(dir.path());
        let scanner = InvoiceScanner::new(&data, FakeEngine::new(""));

        assert!(scanner.scan(&path).unwrap().is_failed());
    }

    #[test]
    fn test_scan_uses_configured_patterns() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path());
        let mut config = data.config_store().load().unwrap();
        config.regex.invamt = r"(Amount Due)\s*(\S+)".to_string();
        data.config_store().save(&config).unwrap();

        let scanner = InvoiceScanner::new(&data, FakeEngine::new(""));
        let fields = scanner.extract_text("Amount Due 45.10\nGrand Total: 1").unwrap();

        assert_eq!(fields.invoice_amount, "45.10");
    }

    #[test]
    fn test_engine_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let data = DataDir::new(dir.path());
        let mut config = data.config_store().load().unwrap();
        config.tesseract_cmd = "/opt/ocr/tesseract".to_string();
        data.config_store().save(&config).unwrap();

        let scanner = InvoiceScanner::from_data_dir(&data).unwrap();
        assert_eq!(scanner.engine().command(), "/opt/ocr/tesseract");
        assert_eq!(scanner.engine().language(), None);

        let scanner = scanner.with_language("eng");
        assert_eq!(scanner.engine().language(), Some("eng"));
    }
}
