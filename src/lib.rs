//! bboxparse turns a flat YOLO-style detection tensor into labeled boxes.
//!
//! Each tensor row holds `[cx, cy, w, h, objectness, class scores...]` in
//! network-input pixels. Decoding gates rows on objectness, calibrates class
//! scores by objectness, applies per-class thresholds, and clamps boxes into
//! the frame. A cell may emit one detection per class that clears its
//! threshold. Greedy non-maximum suppression then runs independently per
//! class, optionally in parallel via the `rayon` feature.

mod decode;
pub mod geometry;
pub mod lowlevel;
pub mod pipeline;
mod suppress;
pub mod tensor;
mod trace;
pub mod util;

pub use decode::Detection;
pub use geometry::BBox;
pub use pipeline::{detect, DetectConfig, Detector};
pub use tensor::{HeadLayout, PredictionView};
pub use util::{BBoxParseError, BBoxParseResult};
