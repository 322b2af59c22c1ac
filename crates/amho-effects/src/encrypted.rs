//! Encrypted text panel and the shuffler that regenerates it.

use amho_core::{
    ENCRYPTED_ALPHABET, ENCRYPTED_LEN, HIGHLIGHT_COUNT, Rect, Rgba, SHUFFLE_INTERVAL_MS,
    TEXT_ALPHA, TEXT_HIGHLIGHT_ALPHA, TEXT_MAX_LINES,
};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::SliceRandom};
use tracing::trace;

use crate::canvas::{Canvas, Glyph};

/// One generated block of encrypted text.
#[derive(Debug, Clone, PartialEq)]
pub struct EncryptedText {
    chars: Vec<char>,
    /// Highlight marks. Positions may repeat.
    highlights: Vec<usize>,
}

impl EncryptedText {
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn highlights(&self) -> &[usize] {
        &self.highlights
    }

    pub fn is_highlighted(&self, index: usize) -> bool {
        self.highlights.contains(&index)
    }

    /// Lay the text out row by row inside `rect`, up to the line limit.
    pub fn render(&self, canvas: &mut Canvas, rect: Rect) {
        let columns = rect.width.floor().max(0.0) as usize;
        let rows = (rect.height.floor().max(0.0) as usize).min(TEXT_MAX_LINES);
        if columns == 0 || rows == 0 {
            return;
        }
        let x0 = rect.x.round() as i32;
        let y0 = rect.y.round() as i32;

        for (row, line) in self.chars.chunks(columns).take(rows).enumerate() {
            for (col, &ch) in line.iter().enumerate() {
                let alpha = if self.is_highlighted(row * columns + col) {
                    TEXT_HIGHLIGHT_ALPHA
                } else {
                    TEXT_ALPHA
                };
                canvas.put_glyph(
                    x0 + col as i32,
                    y0 + row as i32,
                    Glyph {
                        ch,
                        color: Rgba::WHITE.with_alpha(alpha),
                    },
                );
            }
        }
    }
}

/// Build the fixed block every shuffle permutes.
pub fn source_block<R: Rng + ?Sized>(rng: &mut R) -> Vec<char> {
    let alphabet: Vec<char> = ENCRYPTED_ALPHABET.chars().collect();
    (0..ENCRYPTED_LEN)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect()
}

/// Shuffle `source` and pick highlight marks.
pub fn shuffled<R: Rng + ?Sized>(source: &[char], rng: &mut R) -> EncryptedText {
    let mut chars = source.to_vec();
    chars.shuffle(rng);
    let highlights = if chars.is_empty() {
        Vec::new()
    } else {
        (0..HIGHLIGHT_COUNT)
            .map(|_| rng.gen_range(0..chars.len()))
            .collect()
    };
    EncryptedText { chars, highlights }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShufflerState {
    Idle,
    Active { next_due_ms: u64 },
}

/// Regenerates the encrypted text on a fixed cadence while revealing.
#[derive(Debug, Clone)]
pub struct Shuffler {
    source: Vec<char>,
    rng: StdRng,
    state: ShufflerState,
    text: Option<EncryptedText>,
    regenerations: u64,
}

impl Shuffler {
    pub fn new(mut rng: StdRng) -> Self {
        let source = source_block(&mut rng);
        Self {
            source,
            rng,
            state: ShufflerState::Idle,
            text: None,
            regenerations: 0,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn state(&self) -> ShufflerState {
        self.state
    }

    pub fn source(&self) -> &[char] {
        &self.source
    }

    /// Text of the last regeneration, `None` while idle.
    pub fn text(&self) -> Option<&EncryptedText> {
        self.text.as_ref()
    }

    /// Regenerations since this shuffler was created.
    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }

    /// Follow the reveal state. Repeating the current state is a no-op.
    pub fn set_revealing(&mut self, revealing: bool, now_ms: u64) {
        match (self.state, revealing) {
            (ShufflerState::Idle, true) => {
                trace!(now_ms, "shuffler started");
                self.state = ShufflerState::Active {
                    next_due_ms: now_ms,
                };
            }
            (ShufflerState::Active { .. }, false) => {
                trace!(now_ms, regenerations = self.regenerations, "shuffler stopped");
                self.state = ShufflerState::Idle;
                self.text = None;
            }
            _ => {}
        }
    }

    /// Regenerate if a tick is due at `now_ms`. Returns `true` when the text
    /// changed. Ticks missed between two calls collapse into one.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let ShufflerState::Active { next_due_ms } = self.state else {
            return false;
        };
        if now_ms < next_due_ms {
            return false;
        }

        self.text = Some(shuffled(&self.source, &mut self.rng));
        self.regenerations += 1;

        let behind = (now_ms - next_due_ms) / SHUFFLE_INTERVAL_MS;
        self.state = ShufflerState::Active {
            next_due_ms: next_due_ms + (behind + 1) * SHUFFLE_INTERVAL_MS,
        };
        true
    }
}
