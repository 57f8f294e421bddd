//! Click-to-select state machine.
//!
//! Two clicks define the selected region's rectangle: the first records a
//! corner (the stored rectangle becomes degenerate, min == max), the second
//! normalizes both corners into min/max order and re-arms the machine for the
//! next first corner. Manual numeric edits bypass this machine entirely.

use crate::store::{PixelRect, ProjectStore};

use super::coords::Viewport;

/// How the next pointer click on the canvas will be interpreted.
///
/// Transient UI state; never persisted per region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClickMode {
    /// Clicks are ignored.
    #[default]
    Disabled,
    /// The next click sets the first corner.
    AwaitingFirstCorner,
    /// The next click sets the opposite corner.
    AwaitingSecondCorner,
}

/// A recorded first corner, anchored to the region it was clicked for.
#[derive(Clone, Copy, Debug)]
struct FirstCorner {
    point: (i32, i32),
    region_index: usize,
}

/// Tracks click-selection state for the canvas.
#[derive(Debug, Default)]
pub struct ClickEditor {
    mode: ClickMode,
    first_corner: Option<FirstCorner>,
}

impl ClickEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ClickMode {
        self.mode
    }

    /// Toggles click selection on or off. Enabling arms the first corner;
    /// disabling forgets any pending corner.
    pub fn toggle(&mut self) {
        self.mode = match self.mode {
            ClickMode::Disabled => ClickMode::AwaitingFirstCorner,
            _ => {
                self.first_corner = None;
                ClickMode::Disabled
            }
        };
    }

    /// Cancels a pending first corner when the selected region is no longer
    /// the one it was recorded for.
    ///
    /// A first corner must not survive a region switch, so callers invoke
    /// this after changing the region selection; `handle_click` also applies
    /// it before interpreting a click.
    pub fn sync_selection(&mut self, store: &ProjectStore) {
        if let Some(corner) = self.first_corner {
            if corner.region_index != store.current_region_index() {
                self.first_corner = None;
                self.mode = ClickMode::AwaitingFirstCorner;
            }
        }
    }

    /// Feeds one canvas click through the machine.
    ///
    /// `display_x`/`display_y` are display-space pixels, mapped to image
    /// pixels through `view` before being stored. Returns true when the click
    /// was consumed.
    pub fn handle_click(
        &mut self,
        store: &mut ProjectStore,
        display_x: f32,
        display_y: f32,
        view: &Viewport,
    ) -> bool {
        self.sync_selection(store);

        let point = view.to_image_px(display_x, display_y);
        let region = store.current_region_index();

        match self.mode {
            ClickMode::Disabled => false,
            ClickMode::AwaitingFirstCorner => {
                // Degenerate min == max rect until the opposite corner lands.
                let _ = store.set_coordinates(region, PixelRect::from_corners(point, point));
                self.first_corner = Some(FirstCorner {
                    point,
                    region_index: region,
                });
                self.mode = ClickMode::AwaitingSecondCorner;
                true
            }
            ClickMode::AwaitingSecondCorner => {
                if let Some(corner) = self.first_corner.take() {
                    let _ =
                        store.set_coordinates(region, PixelRect::from_corners(corner.point, point));
                }
                // Loop back for the next first corner, not to Disabled.
                self.mode = ClickMode::AwaitingFirstCorner;
                true
            }
        }
    }
}
