//! Character constants for drawing on a cell canvas.

/// Particle glyphs from smallest to largest radius.
pub const PARTICLE_CHARS: &[char] = &['·', '•', '*', '✦', '●'];

/// Core of the glowing centerline.
pub const LINE_CHAR: char = '┃';

/// Text printed on the card face.
pub const CARD_FACE: &str = "*shh*";

/// Pick a particle glyph for the given radius.
pub fn particle_char(radius: f32) -> char {
    let idx = (radius.max(0.0) - 0.5).max(0.0).floor() as usize;
    PARTICLE_CHARS[idx.min(PARTICLE_CHARS.len() - 1)]
}
