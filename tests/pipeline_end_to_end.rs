use bboxparse::{detect, DetectConfig, Detector};

fn cell(cx: f32, cy: f32, w: f32, h: f32, objectness: f32, scores: &[f32]) -> Vec<f32> {
    let mut row = vec![cx, cy, w, h, objectness];
    row.extend_from_slice(scores);
    row
}

fn config(cells: usize, num_classes: usize, threshold: f32) -> DetectConfig {
    DetectConfig {
        grid_cell_count: cells,
        network_width: 640,
        network_height: 640,
        num_classes,
        class_thresholds: vec![threshold; num_classes],
        objectness_gate: 0.4,
        iou_threshold: 0.45,
        parallel: false,
    }
}

#[test]
fn single_cell_yields_the_calibrated_class() {
    let tensor = cell(320.0, 240.0, 100.0, 60.0, 0.9, &[0.1, 0.8, 0.05]);
    let out = detect(&tensor, &config(1, 3, 0.3)).unwrap();

    assert_eq!(out.len(), 1);
    assert_eq!(out[0].class_id, 1);
    assert!((out[0].confidence - 0.72).abs() < 1e-6);
    assert_eq!(out[0].bbox.left, 270.0);
    assert_eq!(out[0].bbox.top, 210.0);
    assert_eq!(out[0].bbox.width, 100.0);
    assert_eq!(out[0].bbox.height, 60.0);
}

#[test]
fn overlapping_same_class_cells_keep_the_stronger() {
    // Box b is box a narrowed to 90% width on the same left edge: IoU 0.9.
    let mut tensor = cell(95.0, 100.0, 90.0, 100.0, 0.8, &[1.0]);
    tensor.extend(cell(100.0, 100.0, 100.0, 100.0, 0.95, &[1.0]));

    let out = detect(&tensor, &config(2, 1, 0.3)).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].confidence, 0.95);
    assert_eq!(out[0].bbox.width, 100.0);
}

#[test]
fn all_cells_below_gate_give_empty_result() {
    let mut tensor = Vec::new();
    for i in 0..16 {
        tensor.extend(cell(20.0 * i as f32 + 30.0, 50.0, 40.0, 40.0, 0.4, &[0.99, 0.99]));
    }
    let out = detect(&tensor, &config(16, 2, 0.1)).unwrap();
    assert!(out.is_empty());
}

#[test]
fn multi_label_cell_survives_suppression() {
    let tensor = cell(200.0, 200.0, 80.0, 80.0, 0.95, &[0.9, 0.85]);
    let out = detect(&tensor, &config(1, 2, 0.3)).unwrap();

    assert_eq!(out.len(), 2);
    assert_eq!(out[0].bbox, out[1].bbox);
    assert_ne!(out[0].class_id, out[1].class_id);
}

#[test]
fn tensor_is_left_untouched() {
    let mut tensor = cell(320.0, 240.0, 100.0, 60.0, 0.9, &[0.1, 0.8, 0.05]);
    tensor.extend(cell(330.0, 250.0, 100.0, 60.0, 0.7, &[0.6, 0.9, 0.0]));
    let before = tensor.clone();

    let detector = Detector::new(config(2, 3, 0.3)).unwrap();
    let _ = detector.detect(&tensor).unwrap();
    assert_eq!(tensor, before);
}

#[test]
fn repeated_calls_are_independent() {
    let detector = Detector::new(config(1, 2, 0.3)).unwrap();
    let first = cell(100.0, 100.0, 50.0, 50.0, 0.9, &[0.9, 0.0]);
    let second = cell(400.0, 400.0, 50.0, 50.0, 0.9, &[0.0, 0.9]);

    let a1 = detector.detect(&first).unwrap();
    let b = detector.detect(&second).unwrap();
    let a2 = detector.detect(&first).unwrap();

    assert_eq!(a1, a2);
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].class_id, 1);
}

#[test]
fn distant_same_class_boxes_are_both_kept() {
    let mut tensor = cell(100.0, 100.0, 50.0, 50.0, 0.9, &[0.9]);
    tensor.extend(cell(500.0, 500.0, 50.0, 50.0, 0.8, &[0.9]));
    let out = detect(&tensor, &config(2, 1, 0.3)).unwrap();
    assert_eq!(out.len(), 2);
}

#[test]
fn detector_is_shareable_across_threads() {
    let detector = Detector::new(config(1, 1, 0.3)).unwrap();
    let tensor = cell(100.0, 100.0, 50.0, 50.0, 0.9, &[0.9]);
    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| detector.detect(&tensor).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().len(), 1);
        }
    });
}

#[test]
fn config_loaded_from_json_drives_detection() {
    #[derive(serde::Deserialize)]
    struct Fixture {
        num_classes: usize,
        thresholds: Vec<f32>,
        objectness_gate: f32,
        iou_threshold: f32,
        cells: Vec<Vec<f32>>,
        expected_classes: Vec<usize>,
    }

    let fixture: Fixture = serde_json::from_str(
        r#"{
            "num_classes": 2,
            "thresholds": [0.5, 0.2],
            "objectness_gate": 0.5,
            "iou_threshold": 0.45,
            "cells": [
                [100, 100, 40, 40, 0.6, 0.9, 0.4],
                [300, 300, 40, 40, 0.5, 0.9, 0.9]
            ],
            "expected_classes": [0, 1]
        }"#,
    )
    .unwrap();

    let tensor: Vec<f32> = fixture.cells.concat();
    let cfg = DetectConfig {
        grid_cell_count: fixture.cells.len(),
        num_classes: fixture.num_classes,
        class_thresholds: fixture.thresholds,
        objectness_gate: fixture.objectness_gate,
        iou_threshold: fixture.iou_threshold,
        ..DetectConfig::default()
    };
    let out = detect(&tensor, &cfg).unwrap();
    let classes: Vec<usize> = out.iter().map(|d| d.class_id).collect();
    assert_eq!(classes, fixture.expected_classes);
}
