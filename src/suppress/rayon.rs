//! Rayon-parallel class-wise suppression (feature-gated).
//!
//! Buckets never read each other's data, so each class is pruned on its own
//! task. Output order matches [`super::suppress_classwise`].

use super::{nms_greedy, partition_by_class};
use crate::decode::Detection;
use crate::trace::{trace_event, trace_span};
use rayon::prelude::*;

/// Parallel variant of [`super::suppress_classwise`].
///
/// # Panics
///
/// Panics if a candidate carries a class id outside `[0, num_classes)`.
pub fn suppress_classwise_par(
    candidates: Vec<Detection>,
    num_classes: usize,
    iou_threshold: f32,
) -> Vec<Detection> {
    let _span = trace_span!("suppress", candidates = candidates.len(), parallel = true).entered();

    let total = candidates.len();
    let kept: Vec<Vec<Detection>> = partition_by_class(candidates, num_classes)
        .into_par_iter()
        .map(|bucket| {
            if bucket.is_empty() {
                bucket
            } else {
                nms_greedy(bucket, iou_threshold)
            }
        })
        .collect();

    let out: Vec<Detection> = kept.into_iter().flatten().collect();
    trace_event!("suppressed", input = total, kept = out.len());
    out
}
