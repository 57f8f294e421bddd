//! Tesseract subprocess engine.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use image::RgbaImage;
use tempfile::NamedTempFile;

use super::setup::{find_tessdata_dir, find_tesseract_executable};
use super::OcrService;
use crate::config::AppConfig;

/// Runs Tesseract as a subprocess.
///
/// Each payload is staged through a temporary PNG and recognized in stdout
/// mode. Page segmentation defaults to mode 6 (single uniform block of
/// text), which fits rectangular region crops.
pub struct TesseractEngine {
    executable: PathBuf,
    /// Explicit tessdata directory, when one was found. Without it Tesseract
    /// falls back to its own installation default.
    tessdata: Option<PathBuf>,
    psm: u8,
}

impl TesseractEngine {
    /// Locates the Tesseract installation described by `config`.
    ///
    /// An explicit `tesseract_path` wins; otherwise the executable is
    /// discovered through the usual ladder (local dir, PATH, common install
    /// locations).
    pub fn discover(config: &AppConfig) -> Result<Self> {
        let executable = match &config.tesseract_path {
            Some(path) => PathBuf::from(path),
            None => find_tesseract_executable()?,
        };
        Ok(Self {
            executable,
            tessdata: find_tessdata_dir().ok(),
            psm: config.psm,
        })
    }
}

impl OcrService for TesseractEngine {
    fn recognize(&self, payload: &RgbaImage, language: &str) -> Result<String> {
        // Stage the payload where the subprocess can read it
        let temp_input = NamedTempFile::with_suffix(".png")?;
        payload
            .save(temp_input.path())
            .context("failed to stage OCR payload")?;

        let mut command = Command::new(&self.executable);
        command
            .arg(temp_input.path())
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .arg("--psm")
            .arg(self.psm.to_string());
        if let Some(tessdata) = &self.tessdata {
            command.arg("--tessdata-dir").arg(tessdata);
        }

        let output = command.output().context("failed to run tesseract")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("Tesseract failed: {}", stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
