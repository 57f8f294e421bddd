//! OCR service seam.
//!
//! Recognition is an external collaborator: the orchestrator hands a cropped
//! payload and a language code to an [`OcrService`] and gets text back, or an
//! error it captures into the matching result cell. The bundled
//! implementation shells out to Tesseract.

pub mod engine;
pub mod setup;

pub use engine::TesseractEngine;
pub use setup::{ensure_tesseract, find_tessdata_dir, find_tesseract_executable};

use anyhow::Result;
use image::RgbaImage;

/// An opaque text recognizer.
///
/// Implementations must be safe to call from several OCR jobs at once; jobs
/// within a batch run concurrently.
pub trait OcrService: Sync {
    /// Recognizes text in `payload`. `language` is a Tesseract-style
    /// language code such as `"eng"`.
    fn recognize(&self, payload: &RgbaImage, language: &str) -> Result<String>;
}
