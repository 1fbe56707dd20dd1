use bboxparse::lowlevel::{decode_candidates, DecodeParams};
use bboxparse::PredictionView;

fn cell(cx: f32, cy: f32, w: f32, h: f32, objectness: f32, scores: &[f32]) -> Vec<f32> {
    let mut row = vec![cx, cy, w, h, objectness];
    row.extend_from_slice(scores);
    row
}

fn params(thresholds: &[f32]) -> DecodeParams<'_> {
    DecodeParams {
        network_width: 640.0,
        network_height: 640.0,
        objectness_gate: 0.4,
        class_thresholds: thresholds,
    }
}

#[test]
fn confidence_is_objectness_times_class_score() {
    let objectness = 0.83f32;
    let score = 0.67f32;
    let data = cell(200.0, 150.0, 60.0, 40.0, objectness, &[score]);
    let view = PredictionView::new(&data, 1, 1).unwrap();

    let out = decode_candidates(view, &params(&[0.1]));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].confidence, objectness * score);
    assert_ne!(out[0].confidence, score);
}

#[test]
fn one_cell_can_emit_several_classes() {
    let data = cell(320.0, 320.0, 100.0, 80.0, 0.9, &[0.7, 0.05, 0.6, 0.5]);
    let view = PredictionView::new(&data, 1, 4).unwrap();

    let out = decode_candidates(view, &params(&[0.3; 4]));
    let classes: Vec<usize> = out.iter().map(|d| d.class_id).collect();
    assert_eq!(classes, vec![0, 2, 3]);
    for det in &out {
        assert_eq!(det.bbox, out[0].bbox);
    }
}

#[test]
fn gated_cell_emits_nothing_even_with_high_class_scores() {
    let data = cell(320.0, 320.0, 100.0, 80.0, 0.39, &[1.0, 1.0]);
    let view = PredictionView::new(&data, 1, 2).unwrap();
    assert!(decode_candidates(view, &params(&[0.0, 0.0])).is_empty());
}

#[test]
fn cell_above_gate_without_passing_class_emits_nothing() {
    let data = cell(320.0, 320.0, 100.0, 80.0, 0.9, &[0.2, 0.3]);
    let view = PredictionView::new(&data, 1, 2).unwrap();
    assert!(decode_candidates(view, &params(&[0.5, 0.5])).is_empty());
}

#[test]
fn degenerate_box_drops_all_classes_of_the_cell() {
    let mut data = cell(320.0, 320.0, 0.8, 80.0, 0.9, &[0.9, 0.9]);
    data.extend(cell(100.0, 100.0, 20.0, 20.0, 0.9, &[0.9, 0.0]));
    let view = PredictionView::new(&data, 2, 2).unwrap();

    let out = decode_candidates(view, &params(&[0.3, 0.3]));
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].bbox.left, 90.0);
}

#[test]
fn boxes_are_clamped_to_the_network_frame() {
    let data = cell(630.0, -5.0, 60.0, 50.0, 1.0, &[0.9]);
    let view = PredictionView::new(&data, 1, 1).unwrap();

    let out = decode_candidates(view, &params(&[0.3]));
    let bbox = out[0].bbox;
    assert_eq!(bbox.left, 600.0);
    assert_eq!(bbox.right(), 640.0);
    assert_eq!(bbox.top, 0.0);
    assert_eq!(bbox.bottom(), 20.0);
}

#[test]
fn candidates_follow_cell_order() {
    let mut data = Vec::new();
    for i in 0..5 {
        data.extend(cell(50.0 + 100.0 * i as f32, 50.0, 20.0, 20.0, 0.9, &[0.9]));
    }
    let view = PredictionView::new(&data, 5, 1).unwrap();
    let out = decode_candidates(view, &params(&[0.3]));
    let lefts: Vec<f32> = out.iter().map(|d| d.bbox.left).collect();
    assert_eq!(lefts, vec![40.0, 140.0, 240.0, 340.0, 440.0]);
}

#[test]
fn nan_scores_never_pass() {
    let data = cell(320.0, 320.0, 100.0, 80.0, 0.9, &[f32::NAN]);
    let view = PredictionView::new(&data, 1, 1).unwrap();
    assert!(decode_candidates(view, &params(&[0.0])).is_empty());
}

#[test]
#[should_panic(expected = "class threshold 1 is NaN")]
fn nan_threshold_is_rejected_loudly() {
    let data = cell(320.0, 320.0, 100.0, 80.0, 0.9, &[0.01, 0.01]);
    let view = PredictionView::new(&data, 1, 2).unwrap();
    let _ = decode_candidates(view, &params(&[0.3, f32::NAN]));
}

#[test]
#[should_panic(expected = "objectness gate is NaN")]
fn nan_objectness_gate_is_rejected_loudly() {
    let data = cell(320.0, 320.0, 100.0, 80.0, 0.9, &[0.9]);
    let view = PredictionView::new(&data, 1, 1).unwrap();
    let params = DecodeParams {
        objectness_gate: f32::NAN,
        ..params(&[0.3])
    };
    let _ = decode_candidates(view, &params);
}

#[test]
fn nan_objectness_never_passes_the_gate() {
    let data = cell(320.0, 320.0, 100.0, 80.0, f32::NAN, &[0.9]);
    let view = PredictionView::new(&data, 1, 1).unwrap();
    assert!(decode_candidates(view, &params(&[0.0])).is_empty());
}
