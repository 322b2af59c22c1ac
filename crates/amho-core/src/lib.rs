//! Core types for the amho reveal effect.
//!
//! Colors, easing curves, geometry and particle configuration shared by the
//! effect engine, the configuration loader and the terminal host.

mod color;
mod easing;
mod error;
mod geometry;
mod particle;

pub use color::Rgba;
pub use easing::Easing;
pub use error::ConfigError;
pub use geometry::{Point, Rect};
pub use particle::ParticleConfig;

/// Period of one card crossing, in milliseconds.
pub const TRAVEL_PERIOD_MS: u64 = 7_000;

/// Characters the encrypted block is made of.
pub const ENCRYPTED_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ=1234567890";

/// Length of the encrypted character block.
pub const ENCRYPTED_LEN: usize = 600;

/// Highlight marks placed on every regeneration.
pub const HIGHLIGHT_COUNT: usize = 30;

/// Interval between encrypted text regenerations, in milliseconds.
pub const SHUFFLE_INTERVAL_MS: u64 = 250;

/// Alpha of regular encrypted characters.
pub const TEXT_ALPHA: f32 = 0.36;

/// Alpha of highlighted encrypted characters.
pub const TEXT_HIGHLIGHT_ALPHA: f32 = 0.9;

/// Maximum number of encrypted text lines shown.
pub const TEXT_MAX_LINES: usize = 13;

/// Width over height of the traveling card.
pub const CARD_ASPECT_RATIO: f32 = 1.5;

/// Accent color of the centerline glow and dismantle effect.
pub const ACCENT: Rgba = Rgba::from_argb(0xFF2196F3);
