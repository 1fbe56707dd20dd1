//! Python bindings for the bboxparse detection post-processor.
//!
//! Tensors are passed as C-contiguous `float32` arrays of shape
//! `(cells, 5 + num_classes)`.

use numpy::{PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use bboxparse::{
    BBox, BBoxParseError, DetectConfig as RustDetectConfig, Detection as RustDetection,
    Detector as RustDetector, PredictionView,
};

/// Convert a BBoxParseError to a Python exception.
fn to_py_err(err: BBoxParseError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Borrow a 2-D tensor as a prediction view, checking its row width.
fn view_from_array<'a>(
    tensor: &'a PyReadonlyArray2<'_, f32>,
    num_classes: usize,
) -> PyResult<PredictionView<'a>> {
    let shape = tensor.shape();
    let cells = shape[0];
    let stride = shape[1];
    if stride != 5 + num_classes {
        return Err(PyValueError::new_err(format!(
            "tensor rows have {stride} values, expected {} for {num_classes} classes",
            5 + num_classes
        )));
    }
    let data = tensor.as_slice()?;
    PredictionView::new(data, cells, num_classes).map_err(to_py_err)
}

/// A labeled box in network-input pixels.
#[pyclass]
#[derive(Clone)]
pub struct Detection {
    /// Left edge.
    #[pyo3(get)]
    pub left: f32,
    /// Top edge.
    #[pyo3(get)]
    pub top: f32,
    /// Box width.
    #[pyo3(get)]
    pub width: f32,
    /// Box height.
    #[pyo3(get)]
    pub height: f32,
    /// Class index.
    #[pyo3(get)]
    pub class_id: usize,
    /// Objectness times class score.
    #[pyo3(get)]
    pub confidence: f32,
}

#[pymethods]
impl Detection {
    /// Box as (x1, y1, x2, y2).
    fn xyxy(&self) -> (f32, f32, f32, f32) {
        let [x1, y1, x2, y2] = BBox::new(self.left, self.top, self.width, self.height).to_xyxy();
        (x1, y1, x2, y2)
    }

    fn __repr__(&self) -> String {
        format!(
            "Detection(left={:.1}, top={:.1}, width={:.1}, height={:.1}, class_id={}, confidence={:.4})",
            self.left, self.top, self.width, self.height, self.class_id, self.confidence
        )
    }
}

impl From<RustDetection> for Detection {
    fn from(d: RustDetection) -> Self {
        Self {
            left: d.bbox.left,
            top: d.bbox.top,
            width: d.bbox.width,
            height: d.bbox.height,
            class_id: d.class_id,
            confidence: d.confidence,
        }
    }
}

/// Detection head configuration.
#[pyclass]
#[derive(Clone)]
pub struct DetectConfig {
    inner: RustDetectConfig,
}

#[pymethods]
impl DetectConfig {
    /// Create a new DetectConfig.
    ///
    /// Args:
    ///     num_classes: Classes per row (default: 80)
    ///     network_width: Network input width in pixels (default: 640)
    ///     network_height: Network input height in pixels (default: 640)
    ///     class_thresholds: Per-class thresholds; None uses class_threshold
    ///     class_threshold: Threshold for every class (default: 0.25)
    ///     objectness_gate: Objectness gate (default: 0.4)
    ///     iou_threshold: NMS IoU threshold (default: 0.45)
    ///     parallel: Suppress classes in parallel (default: False)
    #[new]
    #[pyo3(signature = (
        num_classes = 80,
        network_width = 640,
        network_height = 640,
        class_thresholds = None,
        class_threshold = 0.25,
        objectness_gate = 0.4,
        iou_threshold = 0.45,
        parallel = false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        num_classes: usize,
        network_width: u32,
        network_height: u32,
        class_thresholds: Option<Vec<f32>>,
        class_threshold: f32,
        objectness_gate: f32,
        iou_threshold: f32,
        parallel: bool,
    ) -> PyResult<Self> {
        let inner = RustDetectConfig {
            grid_cell_count: 0,
            network_width,
            network_height,
            num_classes,
            class_thresholds: class_thresholds
                .unwrap_or_else(|| vec![class_threshold; num_classes]),
            objectness_gate,
            iou_threshold,
            parallel,
        };
        inner.validate().map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Validate the configuration.
    fn validate(&self) -> PyResult<()> {
        self.inner.validate().map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        format!(
            "DetectConfig(num_classes={}, network={}x{}, objectness_gate={}, iou_threshold={}, parallel={})",
            self.inner.num_classes,
            self.inner.network_width,
            self.inner.network_height,
            self.inner.objectness_gate,
            self.inner.iou_threshold,
            self.inner.parallel
        )
    }
}

/// Reusable decoder and suppressor.
#[pyclass]
pub struct Detector {
    inner: RustDetector,
}

#[pymethods]
impl Detector {
    #[new]
    #[pyo3(signature = (config = None))]
    fn new(config: Option<DetectConfig>) -> PyResult<Self> {
        let cfg = match config {
            Some(config) => config.inner,
            None => RustDetectConfig::default(),
        };
        let inner = RustDetector::new(cfg).map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Decode and suppress one output tensor.
    ///
    /// Args:
    ///     tensor: 2D float32 numpy array (cells x (5 + num_classes))
    ///
    /// Returns:
    ///     List of Detection objects grouped by class
    fn detect(&self, tensor: PyReadonlyArray2<'_, f32>) -> PyResult<Vec<Detection>> {
        let view = view_from_array(&tensor, self.inner.config().num_classes)?;
        let results = self.inner.detect_view(view).map_err(to_py_err)?;
        Ok(results.into_iter().map(Detection::from).collect())
    }

    fn __repr__(&self) -> String {
        format!("Detector(num_classes={})", self.inner.config().num_classes)
    }
}

/// Convenience function: decode and suppress with a uniform class threshold.
///
/// Args:
///     tensor: 2D float32 numpy array (cells x (5 + num_classes))
///     network_width: Network input width in pixels (default: 640)
///     network_height: Network input height in pixels (default: 640)
///     class_threshold: Threshold for every class (default: 0.25)
///     objectness_gate: Objectness gate (default: 0.4)
///     iou_threshold: NMS IoU threshold (default: 0.45)
///
/// Returns:
///     List of Detection objects
#[pyfunction]
#[pyo3(signature = (
    tensor,
    network_width = 640,
    network_height = 640,
    class_threshold = 0.25,
    objectness_gate = 0.4,
    iou_threshold = 0.45
))]
fn detect(
    tensor: PyReadonlyArray2<'_, f32>,
    network_width: u32,
    network_height: u32,
    class_threshold: f32,
    objectness_gate: f32,
    iou_threshold: f32,
) -> PyResult<Vec<Detection>> {
    let stride = tensor.shape()[1];
    if stride <= 5 {
        return Err(PyValueError::new_err(
            "tensor rows must hold 5 box values plus at least one class score",
        ));
    }
    let num_classes = stride - 5;

    let cfg = RustDetectConfig {
        network_width,
        network_height,
        num_classes,
        objectness_gate,
        iou_threshold,
        ..RustDetectConfig::default()
    }
    .with_uniform_threshold(class_threshold);
    let detector = RustDetector::new(cfg).map_err(to_py_err)?;

    let view = view_from_array(&tensor, num_classes)?;
    let results = detector.detect_view(view).map_err(to_py_err)?;
    Ok(results.into_iter().map(Detection::from).collect())
}

/// Python module for bboxparse.
#[pymodule]
fn _bboxparse(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Detection>()?;
    m.add_class::<DetectConfig>()?;
    m.add_class::<Detector>()?;
    m.add_function(wrap_pyfunction!(detect, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
