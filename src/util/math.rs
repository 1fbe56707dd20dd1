//! Scalar helpers shared by geometry and validation code.

/// Clamps `value` into `[min, max]`.
///
/// NaN inputs collapse to `min` so a bad regression never escapes the frame.
pub(crate) fn clamp(value: f32, min: f32, max: f32) -> f32 {
    debug_assert!(min <= max, "clamp bounds inverted: {min} > {max}");
    if value.is_nan() {
        return min;
    }
    value.max(min).min(max)
}

/// Returns true when `value` is a finite probability in `[0, 1]`.
pub(crate) fn is_unit_interval(value: f32) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}
