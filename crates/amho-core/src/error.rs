//! Construction-time configuration errors.

use thiserror::Error;

/// Rejected particle configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("particle count must not be negative, got {0}")]
    NegativeCount(i64),

    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f32 },

    #[error("particle radius must not be negative, got {0}")]
    NegativeRadius(f32),

    #[error("min radius {min} is larger than max radius {max}")]
    RadiusRange { min: f32, max: f32 },

    #[error("max parallax factor must be at least 1, got {0}")]
    ParallaxBelowOne(f32),

    #[error("loop duration must be positive, got {0}ms")]
    NonPositiveDuration(i64),
}
