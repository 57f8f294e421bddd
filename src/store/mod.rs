//! Shared mutable project state.
//!
//! All region and catalog mutations go through [`ProjectStore`], so the
//! positional coupling between the shared region list and every image's
//! results row is maintained in one place: any structural change to the
//! region count is applied to every image in the same call. Ad hoc field
//! writes from the outside are not possible.

pub mod images;
pub mod regions;

pub use images::{ImageEntry, ImageSource, JobFailure, RegionResult};
pub use regions::{PixelRect, Region};

use std::path::Path;

use image::RgbaImage;
use thiserror::Error;

/// Errors surfaced directly to the user before any work is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Deleting the last region is forbidden; at least one must exist.
    #[error("can't delete the only region; at least one region is required")]
    LastRegion,
    #[error("no images uploaded")]
    NoImages,
    #[error("no regions defined")]
    NoRegions,
    #[error("index {0} is out of range")]
    IndexOutOfRange(usize),
}

/// The region registry, image catalog, and selection cursors.
#[derive(Debug)]
pub struct ProjectStore {
    regions: Vec<Region>,
    images: Vec<ImageEntry>,
    current_image: usize,
    current_region: usize,
}

impl Default for ProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProjectStore {
    /// Creates a store with the mandatory initial region.
    pub fn new() -> Self {
        Self {
            regions: vec![Region::numbered(1)],
            images: Vec::new(),
            current_image: 0,
            current_region: 0,
        }
    }

    /// Creates a store seeded with a caller-provided region list, falling
    /// back to the default single region when the list is empty.
    pub fn with_regions(regions: Vec<Region>) -> Self {
        if regions.is_empty() {
            return Self::new();
        }
        Self {
            regions,
            images: Vec::new(),
            current_image: 0,
            current_region: 0,
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn images(&self) -> &[ImageEntry] {
        &self.images
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn current_image_index(&self) -> usize {
        self.current_image
    }

    pub fn current_region_index(&self) -> usize {
        self.current_region
    }

    pub fn image(&self, index: usize) -> Option<&ImageEntry> {
        self.images.get(index)
    }

    /// One cell of the grid.
    pub fn result(&self, image_idx: usize, region_idx: usize) -> Option<&RegionResult> {
        self.images.get(image_idx)?.results.get(region_idx)
    }

    /// Appends a new region with a default name and zero rectangle, selects
    /// it, and appends a matching pending slot to every image's results row
    /// in the same step.
    ///
    /// Returns the new region's index.
    pub fn add_region(&mut self) -> usize {
        self.regions.push(Region::numbered(self.regions.len() + 1));
        for entry in &mut self.images {
            entry.results.push(RegionResult::Pending);
        }
        self.current_region = self.regions.len() - 1;
        self.current_region
    }

    /// Removes the region at `index` and splices the same slot out of every
    /// image's results row.
    ///
    /// Rejected when only one region remains. If the selected region was the
    /// last index, selection moves to the new last index; otherwise it stays
    /// numerically in place, now pointing at what was the next region.
    pub fn delete_region(&mut self, index: usize) -> Result<(), StoreError> {
        if index >= self.regions.len() {
            return Err(StoreError::IndexOutOfRange(index));
        }
        if self.regions.len() == 1 {
            return Err(StoreError::LastRegion);
        }

        self.regions.remove(index);
        for entry in &mut self.images {
            entry.results.remove(index);
        }

        if self.current_region > index {
            self.current_region -= 1;
        } else if self.current_region >= self.regions.len() {
            self.current_region = self.regions.len() - 1;
        }
        Ok(())
    }

    /// Renames a region. Names that trim to empty are ignored.
    pub fn rename_region(&mut self, index: usize, new_name: &str) -> Result<(), StoreError> {
        if index >= self.regions.len() {
            return Err(StoreError::IndexOutOfRange(index));
        }
        let trimmed = new_name.trim();
        if !trimmed.is_empty() {
            self.regions[index].name = trimmed.to_string();
        }
        Ok(())
    }

    /// Overwrites the rectangle for a region.
    ///
    /// No validation against any image happens here: the same region is
    /// applied to images of potentially different sizes, so bounds are only
    /// checked at crop time.
    pub fn set_coordinates(&mut self, index: usize, rect: PixelRect) -> Result<(), StoreError> {
        if index >= self.regions.len() {
            return Err(StoreError::IndexOutOfRange(index));
        }
        self.regions[index].coordinates = rect;
        Ok(())
    }

    /// Appends one image per path. Pixel data decodes lazily, on first use.
    /// Selection moves to the last added image.
    pub fn add_images<P: AsRef<Path>>(&mut self, paths: &[P]) {
        for path in paths {
            let path = path.as_ref();
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.images.push(ImageEntry::new(
                ImageSource::Path(path.to_path_buf()),
                filename,
                self.regions.len(),
            ));
        }
        if !self.images.is_empty() {
            self.current_image = self.images.len() - 1;
        }
    }

    /// Appends an already-decoded image and selects it.
    pub fn add_decoded(&mut self, filename: &str, pixels: RgbaImage) {
        self.images.push(ImageEntry::new(
            ImageSource::Memory(pixels),
            filename.to_string(),
            self.regions.len(),
        ));
        self.current_image = self.images.len() - 1;
    }

    /// Moves the image cursor.
    pub fn select_image(&mut self, index: usize) -> Result<(), StoreError> {
        if index >= self.images.len() {
            return Err(StoreError::IndexOutOfRange(index));
        }
        self.current_image = index;
        Ok(())
    }

    /// Moves the region cursor.
    pub fn select_region(&mut self, index: usize) -> Result<(), StoreError> {
        if index >= self.regions.len() {
            return Err(StoreError::IndexOutOfRange(index));
        }
        self.current_region = index;
        Ok(())
    }

    /// The text displayed for the currently selected cell.
    ///
    /// Pending (or absent) cells display as empty, not as an error; failed
    /// cells display their failure label.
    pub fn current_text(&self) -> String {
        match self
            .images
            .get(self.current_image)
            .and_then(|entry| entry.results.get(self.current_region))
        {
            Some(RegionResult::Success { text, .. }) => text.clone(),
            Some(RegionResult::Failed { reason, .. }) => reason.to_string(),
            Some(RegionResult::Pending) | None => String::new(),
        }
    }

    /// Overwrites exactly one result cell.
    pub(crate) fn set_result(
        &mut self,
        image_idx: usize,
        region_idx: usize,
        result: RegionResult,
    ) -> Result<(), StoreError> {
        let entry = self
            .images
            .get_mut(image_idx)
            .ok_or(StoreError::IndexOutOfRange(image_idx))?;
        let cell = entry
            .results
            .get_mut(region_idx)
            .ok_or(StoreError::IndexOutOfRange(region_idx))?;
        *cell = result;
        Ok(())
    }

    /// Replaces an image's whole results row in one step, once a batch has
    /// fully settled. The row length must match the current region count.
    pub(crate) fn set_results_row(
        &mut self,
        image_idx: usize,
        row: Vec<RegionResult>,
    ) -> Result<(), StoreError> {
        debug_assert_eq!(row.len(), self.regions.len());
        let entry = self
            .images
            .get_mut(image_idx)
            .ok_or(StoreError::IndexOutOfRange(image_idx))?;
        entry.results = row;
        Ok(())
    }

    /// True when every image's results row is aligned with the region list.
    #[cfg(test)]
    fn is_aligned(&self) -> bool {
        self.images
            .iter()
            .all(|entry| entry.results.len() == self.regions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_images(count: usize) -> ProjectStore {
        let mut store = ProjectStore::new();
        for i in 0..count {
            store.add_decoded(&format!("img{}.png", i), RgbaImage::new(10, 10));
        }
        store
    }

    #[test]
    fn test_new_store_has_one_region() {
        let store = ProjectStore::new();
        assert_eq!(store.region_count(), 1);
        assert_eq!(store.regions()[0].name, "Region 1");
        assert_eq!(store.current_region_index(), 0);
    }

    #[test]
    fn test_add_region_selects_it_and_extends_rows() {
        let mut store = store_with_images(2);
        let idx = store.add_region();

        assert_eq!(idx, 1);
        assert_eq!(store.current_region_index(), 1);
        assert_eq!(store.regions()[1].name, "Region 2");
        for entry in store.images() {
            assert_eq!(entry.results.len(), 2);
            assert!(entry.results[1].is_pending());
        }
    }

    #[test]
    fn test_delete_only_region_rejected_and_state_unchanged() {
        let mut store = store_with_images(1);
        store
            .set_coordinates(0, PixelRect::new(1, 2, 3, 4))
            .unwrap();

        assert_eq!(store.delete_region(0), Err(StoreError::LastRegion));
        assert_eq!(store.region_count(), 1);
        assert_eq!(store.regions()[0].coordinates, PixelRect::new(1, 2, 3, 4));
        assert_eq!(store.images()[0].results.len(), 1);
    }

    #[test]
    fn test_delete_last_index_moves_selection_back() {
        let mut store = store_with_images(1);
        store.add_region();
        store.add_region();
        store.select_region(2).unwrap();

        store.delete_region(2).unwrap();
        assert_eq!(store.current_region_index(), 1);
    }

    #[test]
    fn test_delete_middle_keeps_selection_in_place() {
        let mut store = store_with_images(1);
        store.add_region();
        store.add_region();
        store.select_region(1).unwrap();

        store.delete_region(1).unwrap();
        // Selection still at 1, now pointing at what was region 3.
        assert_eq!(store.current_region_index(), 1);
        assert_eq!(store.regions()[1].name, "Region 3");
    }

    #[test]
    fn test_delete_before_selection_shifts_it() {
        let mut store = store_with_images(1);
        store.add_region();
        store.add_region();
        store.select_region(2).unwrap();

        store.delete_region(0).unwrap();
        assert_eq!(store.current_region_index(), 1);
        assert_eq!(store.regions()[store.current_region_index()].name, "Region 3");
    }

    #[test]
    fn test_alignment_invariant_across_mutation_sequences() {
        let mut store = store_with_images(3);
        assert!(store.is_aligned());

        store.add_region();
        assert!(store.is_aligned());
        store.add_region();
        assert!(store.is_aligned());
        store.delete_region(0).unwrap();
        assert!(store.is_aligned());
        store.add_decoded("late.png", RgbaImage::new(5, 5));
        assert!(store.is_aligned());
        store.add_region();
        assert!(store.is_aligned());
        store.delete_region(store.region_count() - 1).unwrap();
        assert!(store.is_aligned());
    }

    #[test]
    fn test_add_images_presizes_to_current_region_count() {
        let mut store = ProjectStore::new();
        store.add_region();
        store.add_decoded("a.png", RgbaImage::new(4, 4));

        assert_eq!(store.images()[0].results.len(), 2);
        assert_eq!(store.current_image_index(), 0);
    }

    #[test]
    fn test_rename_region_ignores_blank_names() {
        let mut store = ProjectStore::new();
        store.rename_region(0, "  Price  ").unwrap();
        assert_eq!(store.regions()[0].name, "Price");

        store.rename_region(0, "   ").unwrap();
        assert_eq!(store.regions()[0].name, "Price");
    }

    #[test]
    fn test_rename_does_not_touch_results() {
        let mut store = store_with_images(1);
        store
            .set_result(
                0,
                0,
                RegionResult::Success {
                    text: "42".into(),
                    crop: RgbaImage::new(1, 1),
                },
            )
            .unwrap();

        store.rename_region(0, "Total").unwrap();
        assert_eq!(store.result(0, 0).unwrap().text(), Some("42"));
    }

    #[test]
    fn test_current_text_empty_for_pending() {
        let store = store_with_images(1);
        assert_eq!(store.current_text(), "");
    }

    #[test]
    fn test_current_text_follows_selection() {
        let mut store = store_with_images(2);
        store.add_region();
        store
            .set_result(
                0,
                1,
                RegionResult::Success {
                    text: "hello".into(),
                    crop: RgbaImage::new(1, 1),
                },
            )
            .unwrap();

        store.select_image(0).unwrap();
        store.select_region(1).unwrap();
        assert_eq!(store.current_text(), "hello");

        store.select_region(0).unwrap();
        assert_eq!(store.current_text(), "");
    }

    #[test]
    fn test_select_out_of_range_rejected() {
        let mut store = store_with_images(1);
        assert!(store.select_image(5).is_err());
        assert!(store.select_region(5).is_err());
    }
}
