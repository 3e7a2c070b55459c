use egui::{Pos2, Rect};

/// Rows are split into three horizontal bands: the top 30% drops before, the bottom 30% after.
pub const BEFORE_FRACTION: f32 = 0.3;
pub const AFTER_FRACTION: f32 = 0.7;

/// Where a dragged folder lands relative to the hovered folder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum DropZone {
    /// Sibling, placed at the target's position.
    Before,

    /// Sibling, placed right after the target.
    After,

    /// First child of the target.
    Into,
}

/// Classify `pointer` against the hovered row's `target_rect`.
///
/// Total over its domain: pointers outside the rect and degenerate rects still get a zone.
/// The exact band edges (`0.3·h` and `0.7·h`) resolve to [`DropZone::Into`].
pub fn classify(pointer: Pos2, target_rect: Rect) -> DropZone {
    let height = target_rect.height().max(0.0);
    let relative_y = pointer.y - target_rect.top();

    if relative_y < BEFORE_FRACTION * height {
        DropZone::Before
    } else if relative_y > AFTER_FRACTION * height {
        DropZone::After
    } else {
        DropZone::Into
    }
}
