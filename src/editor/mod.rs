//! Coordinate editor: turning pointer clicks and numeric field edits into
//! region rectangles.

pub mod coords;
pub mod state;

pub use coords::{apply_field_edit, parse_coord_field, CoordField, Viewport};
pub use state::{ClickEditor, ClickMode};
