//! Box geometry in network-input pixel space.
//!
//! Boxes are stored in corner format (`left`, `top`, `width`, `height`). The
//! decoder produces them from center-format regressions through
//! [`to_corner_box`], which clamps every edge into the frame and rejects boxes
//! that collapse below one pixel.

mod overlap;

pub use overlap::{interval_overlap, iou};

use crate::util::math::clamp;

/// Minimum accepted box side, in pixels.
pub const MIN_BOX_SIDE: f32 = 1.0;

/// Axis-aligned box in corner format.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BBox {
    /// X coordinate of the left edge.
    pub left: f32,
    /// Y coordinate of the top edge.
    pub top: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl BBox {
    /// Creates a box from its top-left corner and size.
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// X coordinate of the right edge.
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Y coordinate of the bottom edge.
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Box area; degenerate boxes report zero or less.
    pub fn area(&self) -> f32 {
        self.width * self.height
    }

    /// Returns `[left, top, right, bottom]`.
    pub fn to_xyxy(&self) -> [f32; 4] {
        [self.left, self.top, self.right(), self.bottom()]
    }
}

/// Converts a center-format box into a clamped corner-format box.
///
/// All four edges are clamped independently into `[0, max_w] x [0, max_h]` and
/// the size is recomputed from the clamped edges. Returns `None` when the
/// clamped width or height is below [`MIN_BOX_SIDE`].
pub fn to_corner_box(
    center_x: f32,
    center_y: f32,
    width: f32,
    height: f32,
    max_w: f32,
    max_h: f32,
) -> Option<BBox> {
    let x1 = center_x - width / 2.0;
    let y1 = center_y - height / 2.0;
    let x2 = x1 + width;
    let y2 = y1 + height;

    let left = clamp(x1, 0.0, max_w);
    let top = clamp(y1, 0.0, max_h);
    let right = clamp(x2, 0.0, max_w);
    let bottom = clamp(y2, 0.0, max_h);

    let bbox = BBox {
        left,
        top,
        width: clamp(right - left, 0.0, max_w),
        height: clamp(bottom - top, 0.0, max_h),
    };
    if bbox.width < MIN_BOX_SIDE || bbox.height < MIN_BOX_SIDE {
        return None;
    }
    Some(bbox)
}
