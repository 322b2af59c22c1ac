//! Animation and compositing engine for the amho reveal effect.
//!
//! This crate provides the looping particle field, the traveling card's
//! translation and clip state, the clip compositor and the encrypted text
//! shuffler, plus a [`Scene`] that drives them all from elapsed time and
//! draws into a [`Canvas`] that ratatui can display.

mod canvas;
mod chars;
mod clock;
mod compositor;
mod encrypted;
mod particles;
mod scene;
mod spring;
mod travel;

pub use canvas::{Canvas, Cell, Glyph};
pub use clock::LoopClock;
pub use compositor::{erase_band, render_clipped};
pub use encrypted::{EncryptedText, Shuffler, ShufflerState, shuffled, source_block};
pub use particles::{Particle, ParticleDraw, ParticleField, eased_value, fade_alpha};
pub use scene::{Scene, SceneLayout, SceneOptions};
pub use spring::{Spring, SpringConfig};
pub use travel::{LayoutEvent, TravelState, clip_amount, is_revealing, translation};
