//! Candidate decoding from raw prediction rows.
//!
//! Each cell is gated on objectness first. Surviving cells have every class
//! score calibrated as `class_score * objectness` and compared against that
//! class's threshold. A cell emits one candidate per class that clears its
//! threshold, so a single cell can yield several labels for the same box.
//! Deduplication is left to [`crate::suppress`].

use crate::geometry::{to_corner_box, BBox};
use crate::tensor::{PredictionView, BOX_COLUMNS, LABEL_START, OBJECTNESS_INDEX};
use crate::trace::{trace_event, trace_span};
use std::cmp::Ordering;

/// A labeled box in network-input pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection {
    /// Clamped corner-format box, at least one pixel on each side.
    pub bbox: BBox,
    /// Index into the class score block.
    pub class_id: usize,
    /// Calibrated score: objectness times the raw class score.
    pub confidence: f32,
}

/// Parameters for a single decode pass.
#[derive(Clone, Copy, Debug)]
pub struct DecodeParams<'a> {
    /// Network input width in pixels; boxes are clamped to it.
    pub network_width: f32,
    /// Network input height in pixels; boxes are clamped to it.
    pub network_height: f32,
    /// Cells with objectness at or below this value are skipped.
    pub objectness_gate: f32,
    /// Minimum calibrated score per class (exclusive).
    pub class_thresholds: &'a [f32],
}

/// Decodes all cells of `view` into unfiltered candidates.
///
/// Candidates are emitted in cell order, and within a cell in class order.
///
/// # Panics
///
/// Panics if `params.class_thresholds` holds fewer entries than the view has
/// classes, or if the objectness gate or any class threshold is NaN.
pub fn decode_candidates(view: PredictionView<'_>, params: &DecodeParams<'_>) -> Vec<Detection> {
    let thresholds = params.class_thresholds;
    assert!(
        thresholds.len() >= view.num_classes(),
        "{} class thresholds supplied for {} classes",
        thresholds.len(),
        view.num_classes()
    );
    assert!(!params.objectness_gate.is_nan(), "objectness gate is NaN");
    if let Some(class_id) = thresholds[..view.num_classes()]
        .iter()
        .position(|t| t.is_nan())
    {
        panic!("class threshold {class_id} is NaN");
    }

    let _span = trace_span!("decode", cells = view.cells(), classes = view.num_classes()).entered();

    let mut out = Vec::new();
    let mut gated = 0usize;
    for row in view.rows() {
        if decode_row(row, params, &mut out) {
            gated += 1;
        }
    }

    trace_event!("decoded_candidates", gated_cells = gated, count = out.len());
    out
}

/// Decodes one prediction row, appending accepted candidates to `out`.
///
/// Returns `true` if the row passed the objectness gate.
pub(crate) fn decode_row(row: &[f32], params: &DecodeParams<'_>, out: &mut Vec<Detection>) -> bool {
    let objectness = row[OBJECTNESS_INDEX];
    if !exceeds(objectness, params.objectness_gate) {
        return false;
    }
    let regression = &row[..BOX_COLUMNS];

    // The box is shared by every class of the cell; build it on first use.
    let mut bbox: Option<Option<BBox>> = None;
    for (column, &raw_score) in row.iter().enumerate().skip(LABEL_START) {
        let class_id = column - LABEL_START;
        let confidence = raw_score * objectness;
        if !exceeds(confidence, params.class_thresholds[class_id]) {
            continue;
        }
        let accepted = *bbox.get_or_insert_with(|| {
            to_corner_box(
                regression[0],
                regression[1],
                regression[2],
                regression[3],
                params.network_width,
                params.network_height,
            )
        });
        match accepted {
            Some(bbox) => out.push(Detection {
                bbox,
                class_id,
                confidence,
            }),
            // Degenerate box: no class of this cell can be emitted.
            None => break,
        }
    }
    true
}

/// Strict `value > threshold`; false whenever either side is NaN.
fn exceeds(value: f32, threshold: f32) -> bool {
    value.partial_cmp(&threshold) == Some(Ordering::Greater)
}
