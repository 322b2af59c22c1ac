//! Looping particle field (stateful seeding, stateless motion).
//!
//! Particles are seeded once with random static attributes. Every frame their
//! position and alpha are derived from the field clock and their own phase,
//! so the same progress always yields the same picture.

use std::num::NonZeroU64;

use amho_core::{ConfigError, Easing, ParticleConfig, Point, Rect, Rgba};
use rand::Rng;
use tracing::debug;

use crate::canvas::Canvas;
use crate::clock::LoopClock;

/// Fade coefficient: a fading particle reaches zero alpha at eased value 2/3.
const FADE_RATE: f32 = 1.5;

/// A particle's static attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Offset along the shared loop, `0.0..1.0`.
    pub phase: f32,
    /// Relative vertical position, `0.0..1.0`.
    pub vertical_position: f32,
    /// Radius in surface units.
    pub radius: f32,
    /// Multiplier on horizontal travel. A factor of 2 reaches the end twice as fast.
    pub parallax_factor: f32,
    /// Alpha before fading, `0.1..=1.0`.
    pub base_alpha: f32,
    pub color: Rgba,
}

impl Particle {
    /// Sample random attributes within the bounds of `config`.
    fn seed<R: Rng + ?Sized>(config: &ParticleConfig, rng: &mut R) -> Self {
        let parallax_factor = if config.max_parallax_factor == 1.0 {
            1.0
        } else {
            rng.gen_range(1.0..=config.max_parallax_factor)
        };
        Self {
            phase: rng.gen_range(0.0..1.0),
            vertical_position: rng.gen_range(0.0..1.0),
            radius: rng.gen_range(config.min_radius..=config.max_radius),
            parallax_factor,
            base_alpha: rng.gen_range(0.1..=1.0),
            color: Rgba::WHITE.lerp(config.color, rng.gen_range(0.0..=1.0)),
        }
    }

    /// Where and how visible this particle is at `progress` on a surface of
    /// the given size.
    pub fn sample(
        &self,
        config: &ParticleConfig,
        progress: f32,
        width: f32,
        height: f32,
    ) -> ParticleDraw {
        let eased = eased_value(config.easing, progress, self.phase);
        let start_x = -self.radius;
        let end_x = width + self.radius;
        let alpha = if config.fade_out {
            fade_alpha(self.base_alpha, eased)
        } else {
            self.base_alpha
        };
        ParticleDraw {
            center: Point::new(
                start_x + (end_x - start_x) * eased * self.parallax_factor,
                self.vertical_position * height,
            ),
            radius: self.radius,
            color: self.color,
            alpha,
        }
    }
}

/// One circle to draw for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleDraw {
    pub center: Point,
    pub radius: f32,
    pub color: Rgba,
    pub alpha: f32,
}

/// Eased position of a particle along the loop: `easing((progress + phase) mod 1)`.
pub fn eased_value(easing: Easing, progress: f32, phase: f32) -> f32 {
    easing.transform((progress + phase).rem_euclid(1.0))
}

/// Alpha of a fading particle at the given eased value.
pub fn fade_alpha(base_alpha: f32, eased: f32) -> f32 {
    (base_alpha * (1.0 - eased * FADE_RATE)).max(0.0)
}

/// A fixed set of particles moving along a shared loop.
#[derive(Debug, Clone)]
pub struct ParticleField {
    config: ParticleConfig,
    particles: Vec<Particle>,
    clock: LoopClock,
}

impl ParticleField {
    /// Validate `config` and seed `config.count` particles from `rng`.
    pub fn new<R: Rng + ?Sized>(
        config: ParticleConfig,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let duration = NonZeroU64::new(config.loop_duration_ms)
            .ok_or(ConfigError::NonPositiveDuration(0))?;
        let particles: Vec<Particle> = (0..config.count)
            .map(|_| Particle::seed(&config, rng))
            .collect();
        debug!(
            count = particles.len(),
            loop_ms = config.loop_duration_ms,
            "seeded particle field"
        );
        Ok(Self {
            config,
            particles,
            clock: LoopClock::new(duration),
        })
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Replace the field if `config` differs from the current one.
    ///
    /// Returns `true` when the particles were re-seeded. A running clock keeps
    /// running from `now_ms`.
    pub fn reconfigure<R: Rng + ?Sized>(
        &mut self,
        config: ParticleConfig,
        rng: &mut R,
        now_ms: u64,
    ) -> Result<bool, ConfigError> {
        if config == self.config {
            return Ok(false);
        }
        let was_running = self.clock.is_running();
        *self = Self::new(config, rng)?;
        if was_running {
            self.clock.start(now_ms);
        }
        Ok(true)
    }

    pub fn start(&mut self, now_ms: u64) {
        self.clock.start(now_ms);
    }

    pub fn stop(&mut self, now_ms: u64) {
        self.clock.stop(now_ms);
    }

    pub fn progress(&self, now_ms: u64) -> f32 {
        self.clock.progress(now_ms)
    }

    /// Draw commands for every particle at `progress` inside a surface of the
    /// given size.
    pub fn draw_list(&self, progress: f32, width: f32, height: f32) -> Vec<ParticleDraw> {
        self.particles
            .iter()
            .map(|p| p.sample(&self.config, progress, width, height))
            .collect()
    }

    /// Draw the field into `area` of `canvas`.
    pub fn render(&self, canvas: &mut Canvas, area: Rect, progress: f32) {
        for draw in self.draw_list(progress, area.width, area.height) {
            // Particles stay inside the area they were laid out for.
            if draw.center.x < 0.0 || draw.center.x >= area.width {
                continue;
            }
            let center = Point::new(area.x + draw.center.x, area.y + draw.center.y);
            canvas.draw_circle(center, draw.radius, draw.color, draw.alpha);
        }
    }
}
