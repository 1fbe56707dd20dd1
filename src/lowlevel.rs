//! Individual pipeline stages for hosts that need to interpose between them.
//!
//! Most users should call [`crate::Detector`] or [`crate::detect`] instead.

pub use crate::decode::{decode_candidates, DecodeParams};
pub use crate::geometry::{interval_overlap, iou, to_corner_box, MIN_BOX_SIDE};
pub use crate::suppress::{nms_greedy, suppress_classwise};
#[cfg(feature = "rayon")]
pub use crate::suppress::suppress_classwise_par;
pub use crate::tensor::{row_stride, BOX_COLUMNS, LABEL_START, OBJECTNESS_INDEX};
