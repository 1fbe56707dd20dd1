//! Interval and box overlap measures.

use super::BBox;

/// Length of the overlap between `[a_min, a_max]` and `[b_min, b_max]`.
///
/// Returns 0 for disjoint intervals. The result does not depend on argument
/// order.
pub fn interval_overlap(a_min: f32, a_max: f32, b_min: f32, b_max: f32) -> f32 {
    let (a_min, a_max, b_min, b_max) = if a_min > b_min {
        (b_min, b_max, a_min, a_max)
    } else {
        (a_min, a_max, b_min, b_max)
    };
    if a_max < b_min {
        0.0
    } else {
        a_max.min(b_max) - b_min
    }
}

/// Intersection over union of two boxes.
///
/// A zero-area union yields 0.
pub fn iou(a: &BBox, b: &BBox) -> f32 {
    let overlap_x = interval_overlap(a.left, a.right(), b.left, b.right());
    let overlap_y = interval_overlap(a.top, a.bottom(), b.top, b.bottom());
    let overlap = overlap_x * overlap_y;
    let union = a.area() + b.area() - overlap;
    if union == 0.0 {
        0.0
    } else {
        overlap / union
    }
}
