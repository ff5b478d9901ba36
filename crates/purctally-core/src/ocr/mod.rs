//! OCR adapter: image preprocessing and the external engine.

mod engine;
mod preprocessing;

pub use engine::{OcrEngine, TesseractEngine};
pub use preprocessing::ImagePreprocessor;
