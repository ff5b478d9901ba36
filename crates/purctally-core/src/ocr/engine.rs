//! OCR engine trait and the Tesseract process adapter.

use std::process::Command;
use std::time::Instant;

use image::{DynamicImage, GenericImageView, ImageFormat};
use tracing::{debug, info};

use crate::error::OcrError;

/// Turns a preprocessed image into raw text.
pub trait OcrEngine {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Recognize all text in the image.
    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError>;
}

/// Runs the `tesseract` binary on a temporary PNG and reads text from stdout.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    command: String,
    language: Option<String>,
}

impl TesseractEngine {
    /// `command` is a binary name resolved through `PATH` or a full path.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: None,
        }
    }

    /// Pass `-l <language>` to tesseract.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// Check that the binary can be started.
    pub fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String, OcrError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(OcrError::InvalidImage(format!("{}x{} image", width, height)));
        }

        let start = Instant::now();

        let input = tempfile::Builder::new()
            .prefix("purctally-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| OcrError::Preprocessing(format!("failed to create temp file: {}", e)))?;

        image
            .save_with_format(input.path(), ImageFormat::Png)
            .map_err(|e| OcrError::Preprocessing(format!("failed to write temp image: {}", e)))?;

        let mut cmd = Command::new(&self.command);
        cmd.arg(input.path()).arg("stdout");
        if let Some(ref lang) = self.language {
            cmd.arg("-l").arg(lang);
        }

        debug!("Running {:?}", cmd);
        let output = cmd.output().map_err(|e| OcrError::Unavailable {
            command: self.command.clone(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Engine(stderr.trim().to_string()));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        info!(
            "OCR complete: {} characters in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}
