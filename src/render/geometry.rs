//! Shared geometry for scene rendering and pointer hit testing
//!
//! Constants and math used both by the rasterizer (tiny-skia) and by the
//! interaction surface when it decides which handle the pointer grabbed.

use crate::domain::{DragState, Point, Size, Transform};

/// Rounded corner geometry
pub mod shape {
    /// Circular arc bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;
}

/// Text layout and drop shadow
pub mod text {
    /// Line height as a multiple of the font size
    pub const LINE_HEIGHT: f32 = 1.16;
    /// Average glyph advance, relative to font size, used when no font is loaded
    pub const ESTIMATED_ADVANCE: f32 = 0.6;
    /// Shadow offset in unscaled layer pixels
    pub const SHADOW_OFFSET: (f32, f32) = (2.0, 2.0);
    /// Shadow blur radius in unscaled layer pixels
    pub const SHADOW_BLUR: f32 = 4.0;
    /// Shadow opacity (black)
    pub const SHADOW_ALPHA: f32 = 0.5;
    /// Extra sprite margin so the blurred shadow is not clipped
    pub const SPRITE_PADDING: u32 = 12;
}

/// Selection handles drawn in previews and grabbed by the pointer
pub mod handle {
    /// Side length of the square corner grips
    pub const SIZE: f32 = 13.0;
    /// Distance of the rotation grip above the top edge
    pub const ROTATE_OFFSET: f32 = 40.0;
    /// Smallest scale a corner drag can produce
    pub const MIN_SCALE: f32 = 0.05;
}

/// Canvas positions of the grips of a transformed box
///
/// Order: NW, NE, SE, SW, Rotate.
pub fn handle_points(transform: &Transform, size: Size) -> [(DragState, Point); 5] {
    let [nw, ne, se, sw] = transform.corners(size);
    let scaled = size.scaled(transform.scale);
    let rotate = transform.box_to_canvas(
        size,
        Point::new(scaled.width / 2.0, -handle::ROTATE_OFFSET),
    );
    [
        (DragState::NW, nw),
        (DragState::NE, ne),
        (DragState::SE, se),
        (DragState::SW, sw),
        (DragState::Rotate, rotate),
    ]
}

/// Which grip of a transformed box lies under `point`, if any
pub fn handle_at(transform: &Transform, size: Size, point: Point) -> Option<DragState> {
    let half = handle::SIZE / 2.0;
    handle_points(transform, size)
        .into_iter()
        .find(|(_, p)| (point.x - p.x).abs() <= half && (point.y - p.y).abs() <= half)
        .map(|(state, _)| state)
}
