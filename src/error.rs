//! Error types for the illumination pipeline.
//!
//! The numeric core only fails on precondition checks. Degenerate (zero-sized)
//! grids are not errors; they propagate to empty outputs.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SunshadeError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SunshadeError {
    #[error("location must be finite degrees, got lat={latitude}, lon={longitude}")]
    NonFiniteLocation { latitude: f64, longitude: f64 },

    #[error("sun vector must be finite, got ({x}, {y}, {z})")]
    NonFiniteSunVector { x: f64, y: f64, z: f64 },

    #[error("cell spacing must be finite and positive, got dx={dx}, dy={dy}")]
    InvalidSpacing { dx: f64, dy: f64 },

    #[error("elevation rows must all have the same length: row {row} has {found} values, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{what} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("invalid timestamp '{input}': {reason}")]
    InvalidTimestamp { input: String, reason: String },

    #[error("invalid log level '{0}'")]
    InvalidLogLevel(String),
}

impl SunshadeError {
    pub fn shape_mismatch(
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    ) -> Self {
        Self::ShapeMismatch {
            what,
            expected,
            found,
        }
    }
}

#[cfg(feature = "python")]
impl From<SunshadeError> for pyo3::PyErr {
    fn from(err: SunshadeError) -> Self {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
