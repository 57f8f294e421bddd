//! Image catalog entries and per-region OCR outcomes.

use std::path::PathBuf;

use anyhow::{Context, Result};
use image::RgbaImage;
use thiserror::Error;

use crate::crop::CropError;

/// Why a single (image, region) cell failed.
///
/// Failures are data, not control flow: they are stored in the cell they
/// belong to and never abort sibling jobs.
#[derive(Debug, Clone, Error)]
pub enum JobFailure {
    /// Cropping failed; no payload exists for this cell.
    #[error("invalid coordinates for this region: {0}")]
    Crop(#[from] CropError),
    /// The OCR service failed after cropping succeeded.
    #[error("OCR processing failed: {0}")]
    Recognition(String),
    /// The image itself could not be decoded.
    #[error("failed to load image: {0}")]
    Load(String),
}

/// The OCR outcome for one (image, region) cell.
#[derive(Debug, Clone)]
pub enum RegionResult {
    /// Never run.
    Pending,
    /// Recognition succeeded.
    Success { text: String, crop: RgbaImage },
    /// Cropping or recognition failed. The crop payload is kept when the
    /// failure happened after cropping succeeded, so the user can still see
    /// what was cropped.
    Failed {
        reason: JobFailure,
        crop: Option<RgbaImage>,
    },
}

impl RegionResult {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Recognized text, for successful cells only.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Success { text, .. } => Some(text),
            _ => None,
        }
    }

    /// The cropped payload, when one exists.
    pub fn crop(&self) -> Option<&RgbaImage> {
        match self {
            Self::Success { crop, .. } => Some(crop),
            Self::Failed { crop, .. } => crop.as_ref(),
            Self::Pending => None,
        }
    }

    pub fn failure(&self) -> Option<&JobFailure> {
        match self {
            Self::Failed { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Where an image's pixels come from.
///
/// Uploaded files decode lazily, on first use; already-decoded pixels are
/// used as-is.
#[derive(Clone, Debug)]
pub enum ImageSource {
    Path(PathBuf),
    Memory(RgbaImage),
}

impl ImageSource {
    /// Produces the decoded pixel data.
    pub fn load(&self) -> Result<RgbaImage> {
        match self {
            Self::Path(path) => Ok(image::open(path)
                .with_context(|| format!("failed to decode {}", path.display()))?
                .to_rgba8()),
            Self::Memory(pixels) => Ok(pixels.clone()),
        }
    }

    /// Intrinsic image dimensions, decoding if necessary.
    pub fn dimensions(&self) -> Result<(u32, u32)> {
        match self {
            Self::Path(_) => Ok(self.load()?.dimensions()),
            Self::Memory(pixels) => Ok(pixels.dimensions()),
        }
    }
}

/// One uploaded image and its per-region outcomes.
#[derive(Clone, Debug)]
pub struct ImageEntry {
    pub source: ImageSource,
    /// Display filename; empty means "no name" and export synthesizes one.
    pub filename: String,
    /// Positionally aligned 1:1 with the shared region list: `results[i]` is
    /// the outcome of applying region `i` to this image.
    pub results: Vec<RegionResult>,
}

impl ImageEntry {
    /// Creates an entry with its results row pre-sized to the current region
    /// count, every slot pending.
    pub fn new(source: ImageSource, filename: String, region_count: usize) -> Self {
        Self {
            source,
            filename,
            results: vec![RegionResult::Pending; region_count],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_presizes_results() {
        let entry = ImageEntry::new(ImageSource::Memory(RgbaImage::new(4, 4)), "a.png".into(), 3);
        assert_eq!(entry.results.len(), 3);
        assert!(entry.results.iter().all(RegionResult::is_pending));
    }

    #[test]
    fn test_memory_source_loads_without_io() {
        let source = ImageSource::Memory(RgbaImage::new(8, 6));
        assert_eq!(source.dimensions().unwrap(), (8, 6));
        assert_eq!(source.load().unwrap().dimensions(), (8, 6));
    }

    #[test]
    fn test_missing_path_fails_to_load() {
        let source = ImageSource::Path(PathBuf::from("does/not/exist.png"));
        assert!(source.load().is_err());
    }

    #[test]
    fn test_result_accessors() {
        let success = RegionResult::Success {
            text: "hello".into(),
            crop: RgbaImage::new(1, 1),
        };
        assert_eq!(success.text(), Some("hello"));
        assert!(success.crop().is_some());

        let failed = RegionResult::Failed {
            reason: JobFailure::Recognition("engine died".into()),
            crop: Some(RgbaImage::new(1, 1)),
        };
        assert_eq!(failed.text(), None);
        assert!(failed.crop().is_some(), "payload survives OCR failure");
        assert!(failed.failure().is_some());

        assert!(RegionResult::Pending.crop().is_none());
    }
}
