//! Error types for cornerreel.
//!
//! All fallible operations return `Result<T, ReelError>` instead of panicking;
//! renderer and encoder failures surface to the caller unmodified, with no
//! retry and no partial output.

use thiserror::Error;

/// Result type alias for cornerreel operations.
pub type ReelResult<T> = Result<T, ReelError>;

/// Unified error type for all cornerreel operations.
#[derive(Debug, Error)]
pub enum ReelError {
    // ===== Input Validation =====
    /// Sample tensor has a zero-length axis.
    #[error(
        "Empty sample tensor: {iterations} iterations x {walkers} walkers x {dimensions} dimensions (all axes must be non-empty)"
    )]
    EmptyTensor {
        /// Number of iterations in the offending tensor.
        iterations: usize,
        /// Number of ensemble walkers.
        walkers: usize,
        /// Number of parameter dimensions.
        dimensions: usize,
    },

    /// Non-finite sample value (NaN or infinity) in the tensor.
    #[error("Non-finite sample at iteration {iteration}, walker {walker}, dimension {dimension}")]
    NonFiniteSample {
        /// Iteration index of the offending value.
        iteration: usize,
        /// Walker index of the offending value.
        walker: usize,
        /// Dimension index of the offending value.
        dimension: usize,
    },

    /// Sample data does not match the declared tensor shape.
    #[error("Shape mismatch: {message}")]
    Shape {
        /// Description of the mismatch.
        message: String,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration parameter.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== Rendering Errors =====
    /// Corner-plot rendering failed.
    #[error("Render error: {message}")]
    Render {
        /// Description of the rendering failure.
        message: String,
    },

    // ===== Encoding Errors =====
    /// Saving an animation with no frames.
    #[error("Animation contains no frames; nothing to save")]
    EmptyAnimation,

    /// Every encoder plan failed; the report lists per-plan stderr.
    #[error("Failed to encode animation:\n{report}")]
    Encode {
        /// Accumulated per-plan failure descriptions.
        report: String,
    },

    /// Image codec error (GIF/PNG paths).
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReelError {
    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a shape mismatch error.
    #[must_use]
    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }

    /// Create a rendering error.
    #[must_use]
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create an encoding failure report.
    #[must_use]
    pub fn encode(report: impl Into<String>) -> Self {
        Self::Encode {
            report: report.into(),
        }
    }

    /// Check if this error is an invalid-input rejection (caller bug, not an
    /// environment failure).
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::EmptyTensor { .. }
                | Self::NonFiniteSample { .. }
                | Self::Shape { .. }
                | Self::Config { .. }
        )
    }
}
