//! Detection-head geometry used to size the prediction grid.

use crate::util::{BBoxParseError, BBoxParseResult};

/// Multi-scale anchor-based head description.
///
/// Each stride produces a `(height / stride) x (width / stride)` feature map
/// with `anchors_per_cell` predictions per location. The concatenated output
/// has [`HeadLayout::cell_count`] rows.
#[derive(Clone, Debug, PartialEq)]
pub struct HeadLayout {
    /// Downsampling factor of each output level.
    pub strides: Vec<u32>,
    /// Predictions emitted per feature-map location.
    pub anchors_per_cell: usize,
}

impl HeadLayout {
    /// The three-level P3/P4/P5 head with three anchors per location.
    pub fn yolov5() -> Self {
        Self {
            strides: vec![8, 16, 32],
            anchors_per_cell: 3,
        }
    }

    /// Total number of prediction rows for a `width x height` network input.
    pub fn cell_count(&self, width: u32, height: u32) -> BBoxParseResult<usize> {
        if width == 0 || height == 0 {
            return Err(BBoxParseError::InvalidDimensions { width, height });
        }
        if self.strides.is_empty() || self.anchors_per_cell == 0 {
            return Err(BBoxParseError::InvalidConfig(
                "head layout needs strides and anchors",
            ));
        }

        let mut total = 0usize;
        for &stride in &self.strides {
            if stride == 0 || width % stride != 0 || height % stride != 0 {
                return Err(BBoxParseError::InvalidConfig(
                    "network size must be divisible by every stride",
                ));
            }
            total = ((width / stride) as usize)
                .checked_mul((height / stride) as usize)
                .and_then(|cells| cells.checked_mul(self.anchors_per_cell))
                .and_then(|rows| total.checked_add(rows))
                .ok_or(BBoxParseError::InvalidConfig("tensor size overflows usize"))?;
        }
        Ok(total)
    }
}

impl Default for HeadLayout {
    fn default() -> Self {
        Self::yolov5()
    }
}
