//! Traveling card position and centerline clip state.

use std::num::NonZeroU64;

use amho_core::{Rect, TRAVEL_PERIOD_MS};
use tracing::{debug, trace};

use crate::clock::LoopClock;

const TRAVEL_PERIOD: NonZeroU64 = match NonZeroU64::new(TRAVEL_PERIOD_MS) {
    Some(period) => period,
    None => panic!("travel period must be positive"),
};

/// Geometry measured by the host during a layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutEvent {
    /// Width of the element's parent.
    pub parent_width: f32,
    /// Bounds of the traveling element in parent coordinates, translation included.
    pub element_bounds: Rect,
}

/// Horizontal offset of an element of `element_width` at `progress`: from
/// fully left of the parent (`-element_width`) to fully right of it
/// (`parent_width`).
pub fn translation(progress: f32, parent_width: f32, element_width: f32) -> f32 {
    let x_min = -element_width;
    let x_max = parent_width;
    x_min + (x_max - x_min) * progress
}

/// How far the element extends right of the parent's center, in element
/// widths. `None` for degenerate geometry.
pub fn clip_amount(parent_width: f32, element_bounds: Rect) -> Option<f32> {
    let width = element_bounds.width;
    if !(parent_width > 0.0 && width > 0.0) || !parent_width.is_finite() || !width.is_finite() {
        return None;
    }
    let amount = (element_bounds.right() - parent_width / 2.0) / width;
    amount.is_finite().then_some(amount)
}

/// Whether the element straddles the centerline for this clip amount.
pub fn is_revealing(clip_amount: f32) -> bool {
    (0.0..=1.0).contains(&clip_amount)
}

/// State of the traveling element: its own looping clock plus the clip
/// derived from the last layout pass.
#[derive(Debug, Clone)]
pub struct TravelState {
    clock: LoopClock,
    parent_width: f32,
    clip_amount: Option<f32>,
    revealing: bool,
}

impl Default for TravelState {
    fn default() -> Self {
        Self::new()
    }
}

impl TravelState {
    pub fn new() -> Self {
        Self {
            clock: LoopClock::new(TRAVEL_PERIOD),
            parent_width: 0.0,
            clip_amount: None,
            revealing: false,
        }
    }

    pub fn start(&mut self, now_ms: u64) {
        self.clock.start(now_ms);
    }

    pub fn stop(&mut self, now_ms: u64) {
        self.clock.stop(now_ms);
    }

    /// Travel progress in `0.0..1.0`.
    pub fn progress(&self, now_ms: u64) -> f32 {
        self.clock.progress(now_ms)
    }

    /// Horizontal translation of an element of `element_width` at `now_ms`.
    pub fn translation(&self, now_ms: u64, parent_width: f32, element_width: f32) -> f32 {
        translation(self.progress(now_ms), parent_width, element_width)
    }

    /// Consume a layout pass. Returns the new reveal state when it changed.
    pub fn on_layout(&mut self, event: LayoutEvent) -> Option<bool> {
        self.parent_width = event.parent_width;
        self.clip_amount = clip_amount(event.parent_width, event.element_bounds);
        if self.clip_amount.is_none() {
            trace!(?event, "degenerate layout, no reveal");
        }

        let revealing = self.clip_amount.is_some_and(is_revealing);
        if revealing == self.revealing {
            return None;
        }
        self.revealing = revealing;
        debug!(revealing, clip = ?self.clip_amount, "reveal state changed");
        Some(revealing)
    }

    pub fn parent_width(&self) -> f32 {
        self.parent_width
    }

    /// Unclamped clip amount from the last layout pass.
    pub fn clip_amount(&self) -> Option<f32> {
        self.clip_amount
    }

    /// Clip amount clamped for the compositor. Zero until valid geometry
    /// has been observed.
    pub fn clip_fraction(&self) -> f32 {
        self.clip_amount.map_or(0.0, |amount| amount.clamp(0.0, 1.0))
    }

    pub fn is_revealing(&self) -> bool {
        self.revealing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn layout(parent_width: f32, x: f32, width: f32) -> LayoutEvent {
        LayoutEvent {
            parent_width,
            element_bounds: Rect::new(x, 0.0, width, 10.0),
        }
    }

    #[test]
    fn test_translation_endpoints() {
        assert_eq!(translation(0.0, 200.0, 30.0), -30.0);
        assert_eq!(translation(1.0, 200.0, 30.0), 200.0);
        assert_eq!(translation(0.5, 200.0, 30.0), 85.0);
    }

    #[test]
    fn test_translation_wraps_to_start() {
        let mut state = TravelState::new();
        state.start(0);
        let near_end = state.translation(6_999, 200.0, 30.0);
        assert!(near_end > 199.0 && near_end < 200.0);
        assert_eq!(state.translation(7_000, 200.0, 30.0), -30.0);
    }

    #[test]
    fn test_clip_amount() {
        // Right edge exactly on the centerline.
        assert_eq!(clip_amount(200.0, Rect::new(70.0, 0.0, 30.0, 10.0)), Some(0.0));
        // Left edge exactly on the centerline.
        assert_eq!(clip_amount(200.0, Rect::new(100.0, 0.0, 30.0, 10.0)), Some(1.0));
        assert_eq!(clip_amount(200.0, Rect::new(85.0, 0.0, 30.0, 10.0)), Some(0.5));
        assert!(clip_amount(200.0, Rect::new(0.0, 0.0, 30.0, 10.0)).unwrap() < 0.0);
    }

    #[test]
    fn test_degenerate_geometry() {
        assert_eq!(clip_amount(0.0, Rect::new(0.0, 0.0, 30.0, 10.0)), None);
        assert_eq!(clip_amount(200.0, Rect::new(90.0, 0.0, 0.0, 10.0)), None);
        assert_eq!(clip_amount(f32::NAN, Rect::new(90.0, 0.0, 10.0, 10.0)), None);

        let mut state = TravelState::new();
        assert_eq!(state.on_layout(layout(200.0, 90.0, 0.0)), None);
        assert!(!state.is_revealing());
        assert_eq!(state.clip_fraction(), 0.0);
    }

    #[test]
    fn test_reveal_boundaries() {
        assert!(!is_revealing(-0.1));
        assert!(is_revealing(0.0));
        assert!(is_revealing(0.5));
        assert!(is_revealing(1.0));
        assert!(!is_revealing(1.1));
    }

    #[test]
    fn test_on_layout_reports_transitions_once() {
        let mut state = TravelState::new();
        assert_eq!(state.on_layout(layout(200.0, 0.0, 30.0)), None);
        assert_eq!(state.on_layout(layout(200.0, 80.0, 30.0)), Some(true));
        assert_eq!(state.on_layout(layout(200.0, 90.0, 30.0)), None);
        assert!(state.is_revealing());
        assert_eq!(state.on_layout(layout(200.0, 150.0, 30.0)), Some(false));
        assert_eq!(state.on_layout(layout(200.0, 160.0, 30.0)), None);
    }

    #[test]
    fn test_clip_fraction_is_clamped() {
        let mut state = TravelState::new();
        state.on_layout(layout(200.0, 150.0, 30.0));
        assert!(state.clip_amount().unwrap() > 1.0);
        assert_eq!(state.clip_fraction(), 1.0);

        state.on_layout(layout(200.0, 0.0, 30.0));
        assert_eq!(state.clip_fraction(), 0.0);
        assert_eq!(state.parent_width(), 200.0);
    }

    #[test]
    fn test_degenerate_layout_ends_reveal() {
        let mut state = TravelState::new();
        assert_eq!(state.on_layout(layout(200.0, 85.0, 30.0)), Some(true));
        assert_eq!(state.on_layout(layout(0.0, 85.0, 30.0)), Some(false));
        assert_eq!(state.clip_fraction(), 0.0);
    }

    proptest! {
        #[test]
        fn test_revealing_iff_clip_in_unit_range(
            parent in 1.0f32..500.0,
            width in 1.0f32..200.0,
            progress in 0.0f32..1.0,
        ) {
            let x = translation(progress, parent, width);
            let mut state = TravelState::new();
            state.on_layout(layout(parent, x, width));
            let amount = state.clip_amount().unwrap();
            prop_assert_eq!(state.is_revealing(), (0.0..=1.0).contains(&amount));
            prop_assert!((0.0..=1.0).contains(&state.clip_fraction()));
        }
    }
}
