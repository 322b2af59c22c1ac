//! Looping animation clock.

use std::num::NonZeroU64;

/// Linear progress that repeats over a fixed duration.
///
/// The clock does not tick on its own. The host passes the elapsed time of
/// the current frame and the clock maps it to a progress value. Easing is left
/// to the consumer.
#[derive(Debug, Clone, Copy)]
pub struct LoopClock {
    duration_ms: NonZeroU64,
    /// Time the current cycle started, `None` while stopped.
    started_at_ms: Option<u64>,
    /// Progress held while stopped.
    held: f32,
}

impl LoopClock {
    pub fn new(duration_ms: NonZeroU64) -> Self {
        Self {
            duration_ms,
            started_at_ms: None,
            held: 0.0,
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms.get()
    }

    pub fn is_running(&self) -> bool {
        self.started_at_ms.is_some()
    }

    /// Begin looping from zero at `now_ms`. Restarting a running clock resets it.
    pub fn start(&mut self, now_ms: u64) {
        self.started_at_ms = Some(now_ms);
        self.held = 0.0;
    }

    /// Stop advancing and hold the progress reached at `now_ms`.
    pub fn stop(&mut self, now_ms: u64) {
        self.held = self.progress(now_ms);
        self.started_at_ms = None;
    }

    /// Progress in `0.0..1.0` at `now_ms`. Wraps back to zero at the end of
    /// every cycle.
    pub fn progress(&self, now_ms: u64) -> f32 {
        match self.started_at_ms {
            Some(start) => {
                let duration = self.duration_ms.get();
                let into_cycle = now_ms.saturating_sub(start) % duration;
                (into_cycle as f64 / duration as f64) as f32
            }
            None => self.held,
        }
    }
}
