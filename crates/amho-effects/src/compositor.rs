//! Clip compositor: masks a foreground layer by a live fraction.

use amho_core::Rect;

use crate::canvas::Canvas;

/// Extra cells erased on each side of the band so no sliver of the
/// foreground survives at the band edges.
const OVERSCAN: f32 = 1.0;

/// Part of a layer of `width` to erase for `clip_fraction`, measured from the
/// right edge. `None` when nothing is erased.
pub fn erase_band(width: f32, height: f32, clip_fraction: f32) -> Option<Rect> {
    let clip = clip_fraction.clamp(0.0, 1.0);
    if clip <= 0.0 || width <= 0.0 || height <= 0.0 || clip.is_nan() {
        return None;
    }
    let left = width * (1.0 - clip) - OVERSCAN;
    Some(Rect::new(left, 0.0, width - left + OVERSCAN, height))
}

/// Draw `background` and then `foreground` into `bounds` of `target`, with
/// the right `clip_fraction` of the foreground erased so the background shows
/// through.
///
/// Both closures draw into their own layer sized to `bounds`, with `(0, 0)`
/// at the top-left of the element.
pub fn render_clipped<B, F>(
    target: &mut Canvas,
    bounds: Rect,
    clip_fraction: f32,
    background: B,
    foreground: F,
) where
    B: FnOnce(&mut Canvas),
    F: FnOnce(&mut Canvas),
{
    let width = bounds.width.round().max(0.0) as u16;
    let height = bounds.height.round().max(0.0) as u16;
    if width == 0 || height == 0 {
        return;
    }
    let dx = bounds.x.round() as i32;
    let dy = bounds.y.round() as i32;

    let mut back = Canvas::new(width, height);
    background(&mut back);
    target.composite(&back, dx, dy, 1.0);

    let mut front = Canvas::new(width, height);
    foreground(&mut front);
    if let Some(band) = erase_band(width as f32, height as f32, clip_fraction) {
        front.erase_rect(band);
    }
    target.composite(&front, dx, dy, 1.0);
}
