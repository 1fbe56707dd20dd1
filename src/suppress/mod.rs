//! Class-wise greedy non-maximum suppression.
//!
//! Candidates are split into one bucket per class and each bucket is pruned
//! independently, so boxes of different classes never suppress each other.
//! Within a bucket, candidates are stably sorted by descending confidence and
//! kept only if their IoU with every already-kept box is at most the
//! threshold.

use crate::decode::Detection;
use crate::geometry::iou;
use crate::trace::{trace_event, trace_span};

#[cfg(feature = "rayon")]
mod rayon;

#[cfg(feature = "rayon")]
pub use self::rayon::suppress_classwise_par;

/// Sorts by descending confidence, keeping input order among ties.
pub(crate) fn sort_by_confidence_desc(candidates: &mut [Detection]) {
    candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
}

/// Greedy NMS over a single class bucket.
///
/// The highest-confidence candidate is always kept. A later candidate is
/// dropped as soon as it overlaps any kept box with IoU above
/// `iou_threshold`.
pub fn nms_greedy(mut candidates: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    sort_by_confidence_desc(&mut candidates);

    let mut kept: Vec<Detection> = Vec::with_capacity(candidates.len());
    'outer: for candidate in candidates {
        for accepted in kept.iter() {
            if iou(&candidate.bbox, &accepted.bbox) > iou_threshold {
                continue 'outer;
            }
        }
        kept.push(candidate);
    }
    kept
}

/// Splits candidates into `num_classes` buckets, preserving input order.
///
/// # Panics
///
/// Panics if a candidate carries a class id outside `[0, num_classes)`.
pub(crate) fn partition_by_class(
    candidates: Vec<Detection>,
    num_classes: usize,
) -> Vec<Vec<Detection>> {
    let mut buckets: Vec<Vec<Detection>> = vec![Vec::new(); num_classes];
    for candidate in candidates {
        assert!(
            candidate.class_id < num_classes,
            "class id {} out of range for {} classes",
            candidate.class_id,
            num_classes
        );
        buckets[candidate.class_id].push(candidate);
    }
    buckets
}

/// Runs greedy NMS independently for every class.
///
/// Kept candidates are returned grouped by class in ascending class order.
/// Callers should treat the order across classes as unspecified.
///
/// # Panics
///
/// Panics if a candidate carries a class id outside `[0, num_classes)`.
pub fn suppress_classwise(
    candidates: Vec<Detection>,
    num_classes: usize,
    iou_threshold: f32,
) -> Vec<Detection> {
    let _span = trace_span!("suppress", candidates = candidates.len()).entered();

    let total = candidates.len();
    let mut out = Vec::with_capacity(total);
    for bucket in partition_by_class(candidates, num_classes) {
        if bucket.is_empty() {
            continue;
        }
        out.extend(nms_greedy(bucket, iou_threshold));
    }

    trace_event!("suppressed", input = total, kept = out.len());
    out
}
