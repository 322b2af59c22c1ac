//! Particle field configuration.

use crate::{ConfigError, Easing, Rgba};

/// Configuration for one particle field.
///
/// A field is seeded once from its configuration. Replacing the configuration
/// replaces the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleConfig {
    /// Number of particles created at seeding.
    pub count: usize,
    /// Smallest particle radius, in surface units.
    pub min_radius: f32,
    /// Largest particle radius, in surface units.
    pub max_radius: f32,
    /// Upper bound of the per-particle speed multiplier. `1.0` disables parallax.
    pub max_parallax_factor: f32,
    /// Duration of one loop in milliseconds.
    pub loop_duration_ms: u64,
    /// Easing applied to each particle's looped progress.
    pub easing: Easing,
    /// Fade particles out before they reach the end of their path.
    pub fade_out: bool,
    /// Particle colors are random blends between white and this color.
    pub color: Rgba,
}

impl ParticleConfig {
    /// Star field behind the whole scene.
    pub fn stars() -> Self {
        Self {
            count: 250,
            min_radius: 1.0,
            max_radius: 3.0,
            max_parallax_factor: 3.5,
            loop_duration_ms: 20_000,
            easing: Easing::Linear,
            fade_out: false,
            color: Rgba::from_argb(0xFF81D4FA),
        }
    }

    /// Particles streaming off the card while it is being revealed.
    pub fn dismantle() -> Self {
        Self {
            count: 250,
            min_radius: 1.0,
            max_radius: 5.0,
            max_parallax_factor: 1.0,
            loop_duration_ms: 400,
            easing: Easing::EaseInQuad,
            fade_out: true,
            color: Rgba::from_argb(0xFF2196F3),
        }
    }

    /// Check the invariants a field relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("min_radius", self.min_radius),
            ("max_radius", self.max_radius),
            ("max_parallax_factor", self.max_parallax_factor),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        if self.min_radius < 0.0 {
            return Err(ConfigError::NegativeRadius(self.min_radius));
        }
        if self.max_radius < 0.0 {
            return Err(ConfigError::NegativeRadius(self.max_radius));
        }
        if self.max_radius < self.min_radius {
            return Err(ConfigError::RadiusRange {
                min: self.min_radius,
                max: self.max_radius,
            });
        }
        if self.max_parallax_factor < 1.0 {
            return Err(ConfigError::ParallaxBelowOne(self.max_parallax_factor));
        }
        if self.loop_duration_ms == 0 {
            return Err(ConfigError::NonPositiveDuration(0));
        }
        Ok(())
    }
}
