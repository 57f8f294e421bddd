//! Display-to-image coordinate mapping and numeric field parsing.

use crate::store::{PixelRect, ProjectStore};

/// Maps points from on-screen display pixels to intrinsic image pixels.
///
/// The rendered canvas is usually scaled down from the intrinsic image size.
/// Storing display coordinates unscaled would only be correct when the two
/// sizes coincide, so every click goes through this mapping before it is
/// stored.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    /// Intrinsic image size in pixels.
    pub image_width: u32,
    pub image_height: u32,
    /// Rendered display size in (possibly fractional) pixels.
    pub display_width: f32,
    pub display_height: f32,
}

impl Viewport {
    pub fn new(image_width: u32, image_height: u32, display_width: f32, display_height: f32) -> Self {
        Self {
            image_width,
            image_height,
            display_width,
            display_height,
        }
    }

    /// A viewport rendering the image at its intrinsic size.
    pub fn unscaled(image_width: u32, image_height: u32) -> Self {
        Self::new(image_width, image_height, image_width as f32, image_height as f32)
    }

    /// Converts a display-space position to image pixels, rounding to the
    /// nearest integer.
    pub fn to_image_px(&self, display_x: f32, display_y: f32) -> (i32, i32) {
        let scale_x = self.image_width as f32 / self.display_width;
        let scale_y = self.image_height as f32 / self.display_height;
        (
            (display_x * scale_x).round() as i32,
            (display_y * scale_y).round() as i32,
        )
    }
}

/// The four numeric coordinate fields bound to the selected region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoordField {
    MinX,
    MinY,
    MaxX,
    MaxY,
}

impl CoordField {
    /// Returns `rect` with this field replaced by `value`.
    pub fn apply(self, mut rect: PixelRect, value: i32) -> PixelRect {
        match self {
            Self::MinX => rect.min_x = value,
            Self::MinY => rect.min_y = value,
            Self::MaxX => rect.max_x = value,
            Self::MaxY => rect.max_y = value,
        }
        rect
    }
}

/// Parses one coordinate input field as an integer.
///
/// Non-numeric input is treated as 0; validation against the image happens at
/// crop time, not here.
pub fn parse_coord_field(raw: &str) -> i32 {
    raw.trim().parse().unwrap_or(0)
}

/// Applies one numeric field edit to the currently selected region.
///
/// Manual edits bypass the click machine entirely and write straight through
/// the store.
pub fn apply_field_edit(store: &mut ProjectStore, field: CoordField, raw: &str) {
    let index = store.current_region_index();
    if let Some(region) = store.regions().get(index) {
        let rect = field.apply(region.coordinates, parse_coord_field(raw));
        let _ = store.set_coordinates(index, rect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unscaled_viewport_is_identity() {
        let view = Viewport::unscaled(640, 480);
        assert_eq!(view.to_image_px(12.0, 34.0), (12, 34));
    }

    #[test]
    fn test_scaled_viewport_corrects_clicks() {
        // 800x600 image rendered at 400x300: clicks land at half scale.
        let view = Viewport::new(800, 600, 400.0, 300.0);
        assert_eq!(view.to_image_px(100.0, 50.0), (200, 100));
        assert_eq!(view.to_image_px(399.0, 299.0), (798, 598));
    }

    #[test]
    fn test_parse_coord_field() {
        assert_eq!(parse_coord_field("42"), 42);
        assert_eq!(parse_coord_field(" -7 "), -7);
        assert_eq!(parse_coord_field("abc"), 0);
        assert_eq!(parse_coord_field(""), 0);
    }

    #[test]
    fn test_apply_field_edit_writes_selected_region() {
        let mut store = ProjectStore::new();
        apply_field_edit(&mut store, CoordField::MaxX, "120");
        apply_field_edit(&mut store, CoordField::MaxY, "junk");

        let rect = store.regions()[0].coordinates;
        assert_eq!(rect.max_x, 120);
        assert_eq!(rect.max_y, 0);
    }
}
