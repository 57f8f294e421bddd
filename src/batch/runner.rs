//! Batch OCR orchestration.
//!
//! Runs one, many, or all (image x region) jobs. Jobs are independent: each
//! one crops, recognizes, and produces exactly one result cell, and no job
//! touches the region list or another job's cell. Batches fan out on scoped
//! threads and join before any row is written back, so a reader can never
//! observe a partially updated row. Failures are data: they land in their own
//! cell and never cancel sibling jobs. There is no cancellation and no
//! timeout on the OCR call.

use std::sync::Arc;
use std::thread;

use image::RgbaImage;

use crate::crop::extract_crop;
use crate::ocr::OcrService;
use crate::store::{ImageSource, JobFailure, PixelRect, ProjectStore, RegionResult, StoreError};

use super::progress::BatchProgress;

/// Final counts for a settled batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchReport {
    pub completed: usize,
    pub total: usize,
}

/// Drives OCR jobs against a store.
pub struct Orchestrator<S> {
    service: S,
    language: String,
    progress: Arc<BatchProgress>,
}

impl<S: OcrService> Orchestrator<S> {
    pub fn new(service: S, language: impl Into<String>) -> Self {
        Self {
            service,
            language: language.into(),
            progress: Arc::new(BatchProgress::new()),
        }
    }

    /// Shared progress handle for observers.
    pub fn progress(&self) -> Arc<BatchProgress> {
        Arc::clone(&self.progress)
    }

    /// Runs OCR for a single (image, region) pair, overwriting exactly that
    /// cell.
    ///
    /// Crop failure stores a payload-less failure without attempting OCR;
    /// recognition failure keeps the crop payload so the user can still see
    /// what was cropped.
    pub fn run_one(
        &self,
        store: &mut ProjectStore,
        image_idx: usize,
        region_idx: usize,
    ) -> Result<(), StoreError> {
        if store.image_count() == 0 {
            return Err(StoreError::NoImages);
        }
        let rect = store
            .regions()
            .get(region_idx)
            .ok_or(StoreError::IndexOutOfRange(region_idx))?
            .coordinates;

        let result = {
            let entry = store
                .image(image_idx)
                .ok_or(StoreError::IndexOutOfRange(image_idx))?;
            match entry.source.load() {
                Ok(pixels) => self.run_job(&pixels, rect),
                Err(e) => RegionResult::Failed {
                    reason: JobFailure::Load(e.to_string()),
                    crop: None,
                },
            }
        };

        store.set_result(image_idx, region_idx, result)
    }

    /// Runs every region against one image, concurrently, and replaces that
    /// image's results row in one step after all jobs settle.
    pub fn run_all_regions(
        &self,
        store: &mut ProjectStore,
        image_idx: usize,
    ) -> Result<BatchReport, StoreError> {
        self.check_preconditions(store)?;
        if store.image(image_idx).is_none() {
            return Err(StoreError::IndexOutOfRange(image_idx));
        }

        let rects: Vec<PixelRect> = store.regions().iter().map(|r| r.coordinates).collect();
        let total = rects.len();
        self.progress.start(total);
        crate::log(&format!(
            "Batch start: {} regions on image {}",
            total, image_idx
        ));

        let row = match store.image(image_idx) {
            Some(entry) => self.run_row(&entry.source, &rects),
            None => Vec::new(), // checked above
        };
        store.set_results_row(image_idx, row)?;

        let report = BatchReport {
            completed: total,
            total,
        };
        self.progress.clear();
        crate::log(&format!(
            "Batch complete: {}/{} jobs",
            report.completed, report.total
        ));
        Ok(report)
    }

    /// Runs the full cross product of images x regions, concurrent per image
    /// and per region within an image.
    ///
    /// An image that fails to decode yields a whole row of failure cells
    /// rather than aborting the batch. Every row is written back only after
    /// the whole batch settles.
    pub fn run_all_images(&self, store: &mut ProjectStore) -> Result<BatchReport, StoreError> {
        self.check_preconditions(store)?;

        let rects: Vec<PixelRect> = store.regions().iter().map(|r| r.coordinates).collect();
        let total = store.image_count() * rects.len();
        self.progress.start(total);
        crate::log(&format!(
            "Batch start: {} images x {} regions ({} jobs)",
            store.image_count(),
            rects.len(),
            total
        ));

        let rows: Vec<Vec<RegionResult>> = thread::scope(|scope| {
            let handles: Vec<_> = store
                .images()
                .iter()
                .map(|entry| {
                    let rects = &rects;
                    let source = &entry.source;
                    scope.spawn(move || self.run_row(source, rects))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|_| rects.iter().map(|_| panicked_cell()).collect())
                })
                .collect()
        });

        for (image_idx, row) in rows.into_iter().enumerate() {
            store.set_results_row(image_idx, row)?;
        }

        let report = BatchReport {
            completed: total,
            total,
        };
        self.progress.clear();
        crate::log(&format!(
            "Batch complete: {}/{} jobs",
            report.completed, report.total
        ));
        Ok(report)
    }

    /// Caller precondition violations abort before any job starts.
    fn check_preconditions(&self, store: &ProjectStore) -> Result<(), StoreError> {
        if store.image_count() == 0 {
            return Err(StoreError::NoImages);
        }
        if store.region_count() == 0 {
            return Err(StoreError::NoRegions);
        }
        Ok(())
    }

    /// Runs one image's full row of region jobs concurrently and joins them.
    ///
    /// Decode failure fails the whole row. A panicking job is caught at the
    /// join and degrades to a failure cell; its siblings are unaffected.
    fn run_row(&self, source: &ImageSource, rects: &[PixelRect]) -> Vec<RegionResult> {
        let pixels = match source.load() {
            Ok(pixels) => pixels,
            Err(e) => {
                self.progress.settle_many(rects.len());
                return rects
                    .iter()
                    .map(|_| RegionResult::Failed {
                        reason: JobFailure::Load(e.to_string()),
                        crop: None,
                    })
                    .collect();
            }
        };

        thread::scope(|scope| {
            let handles: Vec<_> = rects
                .iter()
                .map(|&rect| {
                    let pixels = &pixels;
                    scope.spawn(move || {
                        let result = self.run_job(pixels, rect);
                        self.progress.settle_one();
                        result
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|_| panicked_cell()))
                .collect()
        })
    }

    /// One job: crop, then recognize.
    fn run_job(&self, pixels: &RgbaImage, rect: PixelRect) -> RegionResult {
        let crop = match extract_crop(pixels, rect) {
            Ok(crop) => crop,
            Err(e) => {
                return RegionResult::Failed {
                    reason: JobFailure::Crop(e),
                    crop: None,
                }
            }
        };
        match self.service.recognize(&crop, &self.language) {
            Ok(text) => RegionResult::Success { text, crop },
            Err(e) => RegionResult::Failed {
                reason: JobFailure::Recognition(e.to_string()),
                crop: Some(crop),
            },
        }
    }
}

/// Replacement cell for a job whose thread panicked.
fn panicked_cell() -> RegionResult {
    RegionResult::Failed {
        reason: JobFailure::Recognition("OCR job panicked".to_string()),
        crop: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crop::CropError;
    use anyhow::{anyhow, Result};
    use image::Rgba;

    /// Echoes the crop dimensions back as "WxH" text.
    struct EchoService;

    impl OcrService for EchoService {
        fn recognize(&self, payload: &RgbaImage, _language: &str) -> Result<String> {
            let (w, h) = payload.dimensions();
            Ok(format!("{}x{}", w, h))
        }
    }

    /// Always fails recognition.
    struct BrokenService;

    impl OcrService for BrokenService {
        fn recognize(&self, _payload: &RgbaImage, _language: &str) -> Result<String> {
            Err(anyhow!("engine exploded"))
        }
    }

    fn test_image() -> RgbaImage {
        RgbaImage::from_fn(100, 100, |x, y| Rgba([x as u8, y as u8, 0, 255]))
    }

    fn store_with_regions(rects: &[PixelRect]) -> ProjectStore {
        let mut store = ProjectStore::new();
        store.set_coordinates(0, rects[0]).unwrap();
        for &rect in &rects[1..] {
            let idx = store.add_region();
            store.set_coordinates(idx, rect).unwrap();
        }
        store.add_decoded("test.png", test_image());
        store
    }

    #[test]
    fn test_run_one_success() {
        let mut store = store_with_regions(&[PixelRect::new(10, 10, 90, 90)]);
        let orchestrator = Orchestrator::new(EchoService, "eng");

        orchestrator.run_one(&mut store, 0, 0).unwrap();

        let cell = store.result(0, 0).unwrap();
        assert_eq!(cell.text(), Some("80x80"));
        assert_eq!(cell.crop().unwrap().dimensions(), (80, 80));
    }

    #[test]
    fn test_run_one_crop_failure_skips_ocr() {
        let mut store = store_with_regions(&[PixelRect::new(50, 10, 10, 90)]);
        let orchestrator = Orchestrator::new(EchoService, "eng");

        orchestrator.run_one(&mut store, 0, 0).unwrap();

        let cell = store.result(0, 0).unwrap();
        assert!(matches!(
            cell.failure(),
            Some(JobFailure::Crop(CropError::DegenerateRectangle))
        ));
        assert!(cell.crop().is_none(), "no payload when cropping failed");
    }

    #[test]
    fn test_run_one_service_failure_keeps_payload() {
        let mut store = store_with_regions(&[PixelRect::new(0, 0, 20, 20)]);
        let orchestrator = Orchestrator::new(BrokenService, "eng");

        orchestrator.run_one(&mut store, 0, 0).unwrap();

        let cell = store.result(0, 0).unwrap();
        assert!(matches!(
            cell.failure(),
            Some(JobFailure::Recognition(_))
        ));
        assert_eq!(
            cell.crop().unwrap().dimensions(),
            (20, 20),
            "crop payload survives the OCR failure"
        );
    }

    #[test]
    fn test_run_one_without_images_is_rejected() {
        let mut store = ProjectStore::new();
        let orchestrator = Orchestrator::new(EchoService, "eng");
        assert_eq!(
            orchestrator.run_one(&mut store, 0, 0),
            Err(StoreError::NoImages)
        );
    }

    #[test]
    fn test_run_all_regions_isolates_failures() {
        // Region 2 of 3 is inverted; its failure must not affect siblings.
        let mut store = store_with_regions(&[
            PixelRect::new(0, 0, 10, 10),
            PixelRect::new(50, 10, 10, 90),
            PixelRect::new(20, 20, 60, 50),
        ]);
        let orchestrator = Orchestrator::new(EchoService, "eng");

        let report = orchestrator.run_all_regions(&mut store, 0).unwrap();
        assert_eq!(report, BatchReport { completed: 3, total: 3 });

        let row = &store.images()[0].results;
        assert_eq!(row.len(), 3);
        assert_eq!(row[0].text(), Some("10x10"));
        assert!(row[1].failure().is_some());
        assert_eq!(row[2].text(), Some("40x30"));

        // Live progress is cleared once the batch settles.
        assert_eq!(orchestrator.progress().snapshot(), (0, 0));
        assert!(!orchestrator.progress().is_active());
    }

    #[test]
    fn test_run_all_images_covers_cross_product() {
        let mut store = store_with_regions(&[
            PixelRect::new(0, 0, 10, 10),
            PixelRect::new(0, 0, 30, 40),
        ]);
        store.add_decoded("second.png", test_image());
        let orchestrator = Orchestrator::new(EchoService, "eng");

        let report = orchestrator.run_all_images(&mut store).unwrap();
        assert_eq!(report, BatchReport { completed: 4, total: 4 });

        for entry in store.images() {
            assert_eq!(entry.results.len(), 2);
            assert_eq!(entry.results[0].text(), Some("10x10"));
            assert_eq!(entry.results[1].text(), Some("30x40"));
        }
    }

    #[test]
    fn test_undecodable_image_fails_whole_row_without_aborting() {
        let mut store = store_with_regions(&[
            PixelRect::new(0, 0, 10, 10),
            PixelRect::new(0, 0, 30, 40),
        ]);
        store.add_images(&["no/such/file.png"]);
        let orchestrator = Orchestrator::new(EchoService, "eng");

        let report = orchestrator.run_all_images(&mut store).unwrap();
        assert_eq!(report.total, 4);

        let good_row = &store.images()[0].results;
        assert_eq!(good_row[0].text(), Some("10x10"));

        let bad_row = &store.images()[1].results;
        assert_eq!(bad_row.len(), 2);
        for cell in bad_row {
            assert!(matches!(cell.failure(), Some(JobFailure::Load(_))));
        }
    }

    #[test]
    fn test_empty_store_preconditions() {
        let mut store = ProjectStore::new();
        let orchestrator = Orchestrator::new(EchoService, "eng");

        assert_eq!(
            orchestrator.run_all_regions(&mut store, 0),
            Err(StoreError::NoImages)
        );
        assert_eq!(
            orchestrator.run_all_images(&mut store),
            Err(StoreError::NoImages)
        );
        // Nothing ran; progress untouched.
        assert_eq!(orchestrator.progress().snapshot(), (0, 0));
    }
}
