//! Borrowed views over flat detection-head outputs.
//!
//! `PredictionView` wraps the caller's `f32` buffer as `cells` rows of
//! `5 + classes` columns laid out as
//! `[cx, cy, w, h, objectness, class_0 .. class_{n-1}]`. The view never copies
//! or mutates the buffer; calibrated scores are computed by the decoder into
//! its own storage.

use crate::util::{BBoxParseError, BBoxParseResult};

mod layout;

pub use layout::HeadLayout;

/// Number of box regression columns at the start of each row.
pub const BOX_COLUMNS: usize = 4;
/// Column holding the objectness score.
pub const OBJECTNESS_INDEX: usize = 4;
/// First column of the per-class score block.
pub const LABEL_START: usize = 5;

/// Returns the row stride for `num_classes` classes.
pub fn row_stride(num_classes: usize) -> usize {
    LABEL_START + num_classes
}

/// Read-only grid of per-cell predictions.
#[derive(Copy, Clone, Debug)]
pub struct PredictionView<'a> {
    data: &'a [f32],
    cells: usize,
    num_classes: usize,
}

impl<'a> PredictionView<'a> {
    /// Creates a view over `cells` rows of `5 + num_classes` values.
    ///
    /// Extra trailing values in `data` are ignored.
    pub fn new(data: &'a [f32], cells: usize, num_classes: usize) -> BBoxParseResult<Self> {
        if num_classes == 0 {
            return Err(BBoxParseError::InvalidConfig("num_classes must be > 0"));
        }
        let needed = required_len(cells, num_classes)?;
        if data.len() < needed {
            return Err(BBoxParseError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data: &data[..needed],
            cells,
            num_classes,
        })
    }

    /// Creates a view whose cell count is derived from the buffer length.
    ///
    /// The buffer length must be an exact multiple of the row stride.
    pub fn from_rows(data: &'a [f32], num_classes: usize) -> BBoxParseResult<Self> {
        if num_classes == 0 {
            return Err(BBoxParseError::InvalidConfig("num_classes must be > 0"));
        }
        let stride = row_stride(num_classes);
        if data.len() % stride != 0 {
            return Err(BBoxParseError::InvalidConfig(
                "buffer length is not a multiple of the row stride",
            ));
        }
        Self::new(data, data.len() / stride, num_classes)
    }

    /// Number of grid cells (rows).
    pub fn cells(&self) -> usize {
        self.cells
    }

    /// Number of classes per row.
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Values per row.
    pub fn stride(&self) -> usize {
        row_stride(self.num_classes)
    }

    /// Returns true if the view holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells == 0
    }

    /// Returns the backing slice, trimmed to `cells * stride`.
    pub fn as_slice(&self) -> &'a [f32] {
        self.data
    }

    /// Iterates over rows in cell order.
    pub fn rows(&self) -> impl Iterator<Item = &'a [f32]> + 'a {
        self.data.chunks_exact(row_stride(self.num_classes))
    }
}

fn required_len(cells: usize, num_classes: usize) -> BBoxParseResult<usize> {
    cells
        .checked_mul(row_stride(num_classes))
        .ok_or(BBoxParseError::InvalidConfig("tensor size overflows usize"))
}
