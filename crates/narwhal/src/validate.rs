//! Numeric guards applied to every computed length, factor and coordinate.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct StatOptions {
    /// Reject zero as well as negative values.
    pub above_zero: bool,
}

/// Returns `value` if it is finite and non-negative (or positive with `above_zero`).
pub fn validate_stat(value: f64, label: &str, opts: StatOptions) -> Result<f64> {
    let reason = if !value.is_finite() {
        "must be finite"
    } else if opts.above_zero && value <= 0.0 {
        "must be above zero"
    } else if value < 0.0 {
        "must not be negative"
    } else {
        return Ok(value);
    };
    Err(Error::Validation {
        label: label.to_string(),
        value,
        reason,
    })
}

/// Coordinates may be negative but never NaN or infinite.
pub fn validate_coordinate(value: f64, label: &str) -> Result<f64> {
    if value.is_finite() {
        return Ok(value);
    }
    Err(Error::Validation {
        label: label.to_string(),
        value,
        reason: "must be finite",
    })
}
