//! End-to-end detection: decode, then class-wise suppression.
//!
//! [`Detector`] validates a [`DetectConfig`] once and can then be applied to
//! any number of tensors. It holds no per-call state, so a single detector may
//! be shared across threads and invoked concurrently on different outputs.

use crate::decode::{decode_candidates, DecodeParams, Detection};
use crate::suppress::suppress_classwise;
#[cfg(feature = "rayon")]
use crate::suppress::suppress_classwise_par;
use crate::tensor::{HeadLayout, PredictionView};
use crate::trace::{trace_event, trace_span};
use crate::util::math::is_unit_interval;
use crate::util::{BBoxParseError, BBoxParseResult};

/// Default objectness gate.
pub const DEFAULT_OBJECTNESS_GATE: f32 = 0.4;
/// Default NMS IoU threshold.
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;
/// Default per-class confidence threshold.
pub const DEFAULT_CLASS_THRESHOLD: f32 = 0.25;

/// Configuration for one detection head.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectConfig {
    /// Number of prediction rows in the tensor.
    pub grid_cell_count: usize,
    /// Network input width in pixels.
    pub network_width: u32,
    /// Network input height in pixels.
    pub network_height: u32,
    /// Number of classes in each row's score block.
    pub num_classes: usize,
    /// Calibrated-score threshold per class; length must equal `num_classes`.
    pub class_thresholds: Vec<f32>,
    /// Cells with objectness at or below this value emit nothing.
    pub objectness_gate: f32,
    /// Same-class boxes overlapping a kept box above this IoU are dropped.
    pub iou_threshold: f32,
    /// Suppress class buckets in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for DetectConfig {
    fn default() -> Self {
        let num_classes = 80;
        Self {
            grid_cell_count: 25200,
            network_width: 640,
            network_height: 640,
            num_classes,
            class_thresholds: vec![DEFAULT_CLASS_THRESHOLD; num_classes],
            objectness_gate: DEFAULT_OBJECTNESS_GATE,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            parallel: false,
        }
    }
}

impl DetectConfig {
    /// Builds a config whose cell count is derived from `layout`.
    pub fn for_layout(
        layout: &HeadLayout,
        network_width: u32,
        network_height: u32,
        num_classes: usize,
    ) -> BBoxParseResult<Self> {
        let grid_cell_count = layout.cell_count(network_width, network_height)?;
        Ok(Self {
            grid_cell_count,
            network_width,
            network_height,
            num_classes,
            class_thresholds: vec![DEFAULT_CLASS_THRESHOLD; num_classes],
            ..Self::default()
        })
    }

    /// Uses the same threshold for every class.
    pub fn with_uniform_threshold(mut self, threshold: f32) -> Self {
        self.class_thresholds = vec![threshold; self.num_classes];
        self
    }

    /// Checks dimensions, threshold ranges and threshold count.
    pub fn validate(&self) -> BBoxParseResult<()> {
        if self.network_width == 0 || self.network_height == 0 {
            return Err(BBoxParseError::InvalidDimensions {
                width: self.network_width,
                height: self.network_height,
            });
        }
        if self.num_classes == 0 {
            return Err(BBoxParseError::InvalidConfig("num_classes must be > 0"));
        }
        if self.class_thresholds.len() != self.num_classes {
            return Err(BBoxParseError::ThresholdCountMismatch {
                expected: self.num_classes,
                got: self.class_thresholds.len(),
            });
        }
        if let Some(&value) = self
            .class_thresholds
            .iter()
            .find(|&&value| !is_unit_interval(value))
        {
            return Err(BBoxParseError::InvalidThreshold {
                name: "class_threshold",
                value,
            });
        }
        if !is_unit_interval(self.objectness_gate) {
            return Err(BBoxParseError::InvalidThreshold {
                name: "objectness_gate",
                value: self.objectness_gate,
            });
        }
        if !is_unit_interval(self.iou_threshold) {
            return Err(BBoxParseError::InvalidThreshold {
                name: "iou_threshold",
                value: self.iou_threshold,
            });
        }
        if self.parallel && !cfg!(feature = "rayon") {
            return Err(BBoxParseError::InvalidConfig(
                "parallel suppression requires the rayon feature",
            ));
        }
        Ok(())
    }

    /// Decoder parameters borrowed from this config.
    pub fn decode_params(&self) -> DecodeParams<'_> {
        DecodeParams {
            network_width: self.network_width as f32,
            network_height: self.network_height as f32,
            objectness_gate: self.objectness_gate,
            class_thresholds: &self.class_thresholds,
        }
    }
}

/// Validated, reusable detection pipeline.
#[derive(Clone, Debug)]
pub struct Detector {
    cfg: DetectConfig,
}

impl Detector {
    /// Validates `cfg` and builds a detector.
    pub fn new(cfg: DetectConfig) -> BBoxParseResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &DetectConfig {
        &self.cfg
    }

    /// Decodes and suppresses one flat output tensor.
    ///
    /// The tensor must hold at least `grid_cell_count * (5 + num_classes)`
    /// values. It is only read.
    pub fn detect(&self, tensor: &[f32]) -> BBoxParseResult<Vec<Detection>> {
        let view = PredictionView::new(tensor, self.cfg.grid_cell_count, self.cfg.num_classes)?;
        self.detect_view(view)
    }

    /// Runs the pipeline over an already-built view.
    ///
    /// The view's cell count is used as-is; its class count must match the
    /// configuration.
    pub fn detect_view(&self, view: PredictionView<'_>) -> BBoxParseResult<Vec<Detection>> {
        if view.num_classes() != self.cfg.num_classes {
            return Err(BBoxParseError::InvalidConfig(
                "prediction view class count differs from config",
            ));
        }
        Ok(run(view, &self.cfg))
    }
}

/// One-shot detection with a config that has not been validated yet.
///
/// Prefer [`Detector`] when processing a stream of outputs with the same head.
pub fn detect(tensor: &[f32], cfg: &DetectConfig) -> BBoxParseResult<Vec<Detection>> {
    cfg.validate()?;
    let view = PredictionView::new(tensor, cfg.grid_cell_count, cfg.num_classes)?;
    Ok(run(view, cfg))
}

fn run(view: PredictionView<'_>, cfg: &DetectConfig) -> Vec<Detection> {
    let _span = trace_span!("detect", cells = view.cells(), parallel = cfg.parallel).entered();

    let candidates = decode_candidates(view, &cfg.decode_params());
    let kept = suppress(candidates, cfg);

    trace_event!("detections", count = kept.len());
    kept
}

#[cfg(feature = "rayon")]
fn suppress(candidates: Vec<Detection>, cfg: &DetectConfig) -> Vec<Detection> {
    if cfg.parallel {
        suppress_classwise_par(candidates, cfg.num_classes, cfg.iou_threshold)
    } else {
        suppress_classwise(candidates, cfg.num_classes, cfg.iou_threshold)
    }
}

#[cfg(not(feature = "rayon"))]
fn suppress(candidates: Vec<Detection>, cfg: &DetectConfig) -> Vec<Detection> {
    suppress_classwise(candidates, cfg.num_classes, cfg.iou_threshold)
}
