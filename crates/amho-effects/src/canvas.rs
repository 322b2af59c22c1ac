//! Cell canvas the effects draw into.
//!
//! Every cell holds a translucent fill and an optional glyph. Layers are
//! separate canvases composited onto a target, which is what the clip
//! compositor needs to erase part of a layer without touching what is below.

use amho_core::{Point, Rect, Rgba};
use ratatui::{buffer::Buffer, layout::Rect as TermRect, style::Color, widgets::Widget};

use crate::chars::particle_char;

/// A character drawn in a cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub ch: char,
    pub color: Rgba,
}

/// One canvas cell.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cell {
    pub fill: Rgba,
    pub glyph: Option<Glyph>,
}

impl Cell {
    fn is_clear(&self) -> bool {
        self.glyph.is_none() && self.fill.a <= 0.0
    }

    /// Source-over `src` onto this cell.
    fn paint(&mut self, src: &Cell, opacity: f32) {
        let src_fill = src.fill.with_alpha(src.fill.a * opacity);
        self.fill = src_fill.over(self.fill);
        match src.glyph {
            Some(glyph) => {
                self.glyph = Some(Glyph {
                    color: glyph.color.with_alpha(glyph.color.a * opacity),
                    ..glyph
                });
            }
            None if src_fill.a >= 1.0 => self.glyph = None,
            None => {}
        }
    }
}

/// A grid of cells in surface units, one unit per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    /// Opaque color shown behind transparent cells when displayed.
    backdrop: Rgba,
}

impl Canvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width as usize * height as usize],
            backdrop: Rgba::BLACK,
        }
    }

    pub fn with_backdrop(mut self, backdrop: Rgba) -> Self {
        self.backdrop = backdrop;
        self
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// The whole canvas as a rectangle.
    pub fn area(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f32, self.height as f32)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Resize, discarding content if the dimensions change.
    pub fn resize(&mut self, width: u16, height: u16) {
        if width != self.width || height != self.height {
            *self = Self::new(width, height).with_backdrop(self.backdrop);
        }
    }

    /// Reset every cell to transparent.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<&Cell> {
        self.index(x, y).map(|idx| &self.cells[idx])
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Fill every cell whose center lies inside `rect`.
    pub fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        self.fill_with(rect, |_, _| color);
    }

    /// Fill cells whose center lies inside `rect` with a per-cell color.
    /// The closure receives the cell center relative to `rect` in `0.0..=1.0`.
    pub fn fill_with(&mut self, rect: Rect, mut color: impl FnMut(f32, f32) -> Rgba) {
        if rect.is_empty() {
            return;
        }
        let x0 = (rect.x - 0.5).ceil().max(0.0) as i32;
        let y0 = (rect.y - 0.5).ceil().max(0.0) as i32;
        let x1 = (rect.right() - 0.5).ceil().min(self.width as f32) as i32;
        let y1 = (rect.bottom() - 0.5).ceil().min(self.height as f32) as i32;
        for y in y0..y1 {
            for x in x0..x1 {
                let u = (x as f32 + 0.5 - rect.x) / rect.width;
                let v = (y as f32 + 0.5 - rect.y) / rect.height;
                let src = Cell {
                    fill: color(u, v),
                    glyph: None,
                };
                if let Some(idx) = self.index(x, y) {
                    self.cells[idx].paint(&src, 1.0);
                }
            }
        }
    }

    /// Place a glyph, replacing any glyph already in the cell.
    pub fn put_glyph(&mut self, x: i32, y: i32, glyph: Glyph) {
        if let Some(idx) = self.index(x, y) {
            self.cells[idx].glyph = Some(glyph);
        }
    }

    /// Draw a circle as a single glyph sized by its radius.
    pub fn draw_circle(&mut self, center: Point, radius: f32, color: Rgba, alpha: f32) {
        if alpha <= 0.0 || !center.x.is_finite() || !center.y.is_finite() {
            return;
        }
        self.put_glyph(
            center.x.floor() as i32,
            center.y.floor() as i32,
            Glyph {
                ch: particle_char(radius),
                color: color.with_alpha(color.a * alpha),
            },
        );
    }

    /// Write `text` left to right starting at a cell.
    pub fn draw_text(&mut self, x: i32, y: i32, text: &str, color: Rgba) {
        for (offset, ch) in text.chars().enumerate() {
            self.put_glyph(x + offset as i32, y, Glyph { ch, color });
        }
    }

    /// Clear every cell that overlaps `rect` (destination-out).
    pub fn erase_rect(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let x0 = rect.x.floor().max(0.0) as i32;
        let y0 = rect.y.floor().max(0.0) as i32;
        let x1 = rect.right().ceil().min(self.width as f32) as i32;
        let y1 = rect.bottom().ceil().min(self.height as f32) as i32;
        for y in y0..y1 {
            for x in x0..x1 {
                if let Some(idx) = self.index(x, y) {
                    self.cells[idx] = Cell::default();
                }
            }
        }
    }

    /// Paint `layer` onto this canvas with its top-left cell at `(dx, dy)`.
    pub fn composite(&mut self, layer: &Canvas, dx: i32, dy: i32, opacity: f32) {
        if opacity <= 0.0 {
            return;
        }
        let opacity = opacity.min(1.0);
        for ly in 0..layer.height as i32 {
            for lx in 0..layer.width as i32 {
                let Some(src) = layer.cell(lx, ly) else {
                    continue;
                };
                if src.is_clear() {
                    continue;
                }
                if let Some(idx) = self.index(lx + dx, ly + dy) {
                    self.cells[idx].paint(src, opacity);
                }
            }
        }
    }
}

impl Widget for &Canvas {
    fn render(self, area: TermRect, buf: &mut Buffer) {
        for y in 0..area.height.min(self.height) {
            for x in 0..area.width.min(self.width) {
                let Some(cell) = self.cell(x as i32, y as i32) else {
                    continue;
                };
                let bg = cell.fill.over(self.backdrop.with_alpha(1.0));
                let (br, bgc, bb) = bg.to_rgb8_over(self.backdrop);
                let Some(target) = buf.cell_mut((area.x + x, area.y + y)) else {
                    continue;
                };
                target.set_bg(Color::Rgb(br, bgc, bb));
                match cell.glyph {
                    Some(glyph) => {
                        let (r, g, b) = glyph.color.to_rgb8_over(bg);
                        target.set_char(glyph.ch).set_fg(Color::Rgb(r, g, b));
                    }
                    None => {
                        target.set_char(' ');
                    }
                }
            }
        }
    }
}
