//! Scene composition.
//!
//! One render pass reads layout, derives the card translation and clip, then
//! composites: star field, card over encrypted text, centerline glow and the
//! dismantle overlay.

use std::fmt;

use amho_core::{ACCENT, CARD_ASPECT_RATIO, ConfigError, ParticleConfig, Rect, Rgba};
use rand::{RngCore, SeedableRng, rngs::StdRng};
use tracing::debug;

use crate::canvas::{Canvas, Glyph};
use crate::chars::{CARD_FACE, LINE_CHAR};
use crate::compositor::render_clipped;
use crate::encrypted::Shuffler;
use crate::particles::ParticleField;
use crate::spring::{Spring, SpringConfig};
use crate::travel::{LayoutEvent, TravelState};

/// Row height in the reference layout; other sizes are ratios of it.
const REFERENCE_ROW: f32 = 185.0;
/// Width of the dismantle band.
const DISMANTLE_WIDTH: f32 = 48.0;
/// Half width of the soft glow around the centerline.
const GLOW_HALF_WIDTH: f32 = 16.0;
/// Start color of the dismantle band gradient.
const DISMANTLE_TINT: Rgba = Rgba::from_argb(0x882196F3);
const CARD_FACE_COLOR: Rgba = Rgba::from_argb(0xFF263238);

/// Everything a scene is built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOptions {
    pub stars: ParticleConfig,
    pub dismantle: ParticleConfig,
    /// Seed for every random source in the scene.
    pub seed: u64,
    /// Height over width of one surface unit. Terminal cells are about 2.
    pub cell_aspect: f32,
    pub card_color: Rgba,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            stars: ParticleConfig::stars(),
            dismantle: ParticleConfig::dismantle(),
            seed: 0,
            cell_aspect: 2.0,
            card_color: Rgba::WHITE,
        }
    }
}

/// Geometry of one frame, in canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLayout {
    /// Horizontal strip the card travels through.
    pub row: Rect,
    /// Card bounds, translation included.
    pub card: Rect,
}

type RevealListener = Box<dyn FnMut(bool)>;

/// The full animated scene.
pub struct Scene {
    stars: ParticleField,
    dismantle: ParticleField,
    travel: TravelState,
    shuffler: Shuffler,
    /// Opacity of the dismantle overlay.
    fade: Spring,
    listeners: Vec<RevealListener>,
    /// Source for re-seeding fields on reconfiguration.
    rng: StdRng,
    cell_aspect: f32,
    card_color: Rgba,
    /// Last render time in milliseconds.
    last_update_ms: Option<u64>,
    /// Clocks are running. While stopped, frames still draw the held state
    /// but reveal transitions are not forwarded.
    running: bool,
    /// Reveal state last passed to the shuffler, fade and listeners.
    announced: bool,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("stars", &self.stars.config())
            .field("dismantle", &self.dismantle.config())
            .field("travel", &self.travel)
            .field("shuffler", &self.shuffler.state())
            .field("fade", &self.fade.value())
            .field("listeners", &self.listeners.len())
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Build a scene, rejecting invalid particle configurations.
    pub fn new(options: SceneOptions) -> Result<Self, ConfigError> {
        let mut rng = StdRng::seed_from_u64(options.seed);
        let stars = ParticleField::new(options.stars, &mut rng)?;
        let dismantle = ParticleField::new(options.dismantle, &mut rng)?;
        let shuffler = Shuffler::with_seed(rng.next_u64());
        Ok(Self {
            stars,
            dismantle,
            travel: TravelState::new(),
            shuffler,
            fade: Spring::new(SpringConfig::fade(), 0.0),
            listeners: Vec::new(),
            rng,
            cell_aspect: options.cell_aspect.max(f32::EPSILON),
            card_color: options.card_color,
            last_update_ms: None,
            running: false,
            announced: false,
        })
    }

    /// Register a callback for reveal transitions.
    pub fn on_reveal_change(&mut self, listener: impl FnMut(bool) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Start every clock at `now_ms`.
    pub fn start(&mut self, now_ms: u64) {
        self.stars.start(now_ms);
        self.dismantle.start(now_ms);
        self.travel.start(now_ms);
        self.running = true;
        self.last_update_ms = Some(now_ms);
        self.sync_reveal(now_ms);
    }

    /// Stop every clock and the text shuffler.
    pub fn stop(&mut self, now_ms: u64) {
        self.stars.stop(now_ms);
        self.dismantle.stop(now_ms);
        self.travel.stop(now_ms);
        self.shuffler.set_revealing(false, now_ms);
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Swap particle configurations. Fields whose configuration is unchanged
    /// keep their particles. Nothing changes unless both are valid.
    pub fn reconfigure(
        &mut self,
        stars: ParticleConfig,
        dismantle: ParticleConfig,
        now_ms: u64,
    ) -> Result<(), ConfigError> {
        stars.validate()?;
        dismantle.validate()?;
        if self.stars.reconfigure(stars, &mut self.rng, now_ms)? {
            debug!("star field re-seeded");
        }
        if self.dismantle.reconfigure(dismantle, &mut self.rng, now_ms)? {
            debug!("dismantle field re-seeded");
        }
        Ok(())
    }

    pub fn is_revealing(&self) -> bool {
        self.travel.is_revealing()
    }

    pub fn clip_fraction(&self) -> f32 {
        self.travel.clip_fraction()
    }

    pub fn shuffler(&self) -> &Shuffler {
        &self.shuffler
    }

    pub fn stars(&self) -> &ParticleField {
        &self.stars
    }

    /// Current opacity of the dismantle overlay.
    pub fn overlay_opacity(&self) -> f32 {
        self.fade.value().clamp(0.0, 1.0)
    }

    /// Frame geometry for a canvas `area` at `now_ms`.
    pub fn layout(&self, area: Rect, now_ms: u64) -> SceneLayout {
        let row_height = (area.height * 0.5).round().clamp(3.0, 15.0).min(area.height);
        let row = Rect::new(
            area.x,
            area.y + ((area.height - row_height) / 2.0).floor(),
            area.width,
            row_height,
        );
        let card_width = row.height * CARD_ASPECT_RATIO * self.cell_aspect;
        let x = self.travel.translation(now_ms, row.width, card_width);
        SceneLayout {
            row,
            card: Rect::new(row.x + x, row.y, card_width, row.height),
        }
    }

    /// Render one frame at `now_ms` into `canvas`.
    pub fn render(&mut self, canvas: &mut Canvas, now_ms: u64) {
        let dt_ms = self
            .last_update_ms
            .map_or(0, |last| now_ms.saturating_sub(last));
        self.last_update_ms = Some(now_ms);

        canvas.clear();
        let area = canvas.area();
        if area.is_empty() {
            return;
        }

        self.stars.render(canvas, area, self.stars.progress(now_ms));

        // Layout is read before clip and translation are derived, and both
        // are settled before anything is composited.
        let layout = self.layout(area, now_ms);
        let event = LayoutEvent {
            parent_width: layout.row.width,
            element_bounds: layout.card.translate_x(-layout.row.x),
        };
        let changed = self.travel.on_layout(event).is_some();
        if self.running {
            if changed {
                self.sync_reveal(now_ms);
            }
            self.shuffler.tick(now_ms);
            self.fade.advance(dt_ms as f32 / 1000.0);
        }

        let text = self.shuffler.text();
        let card_color = self.card_color;
        render_clipped(
            canvas,
            layout.card,
            self.travel.clip_fraction(),
            |layer| {
                if let Some(text) = text {
                    let area = layer.area();
                    text.render(layer, area);
                }
            },
            |layer| draw_card(layer, card_color),
        );

        draw_centerline(canvas, layout.row, self.scale(layout.row));
        self.render_dismantle(canvas, layout.row, now_ms);
    }

    /// Bring the shuffler, fade and listeners in line with the travel state.
    fn sync_reveal(&mut self, now_ms: u64) {
        let revealing = self.travel.is_revealing();
        self.shuffler.set_revealing(revealing, now_ms);
        self.fade.set_target(if revealing { 1.0 } else { 0.0 });
        if revealing != self.announced {
            self.announced = revealing;
            for listener in &mut self.listeners {
                listener(revealing);
            }
        }
    }

    /// Horizontal canvas units per reference unit.
    fn scale(&self, row: Rect) -> f32 {
        row.height / REFERENCE_ROW * self.cell_aspect
    }

    fn render_dismantle(&self, canvas: &mut Canvas, row: Rect, now_ms: u64) {
        let opacity = self.overlay_opacity();
        if opacity <= 0.001 {
            return;
        }
        let width = (DISMANTLE_WIDTH * self.scale(row)).round().max(1.0) as u16;
        let height = row.height.round() as u16;
        let mut layer = Canvas::new(width, height);
        let area = layer.area();
        layer.fill_with(area, |u, _| DISMANTLE_TINT.lerp(Rgba::TRANSPARENT, u));
        self.dismantle
            .render(&mut layer, area, self.dismantle.progress(now_ms));
        canvas.composite(
            &layer,
            row.center_x().floor() as i32,
            row.y.round() as i32,
            opacity,
        );
    }
}

/// Opaque card face with trimmed corners and a centered caption.
fn draw_card(layer: &mut Canvas, color: Rgba) {
    let area = layer.area();
    layer.fill_rect(area, color);
    let (w, h) = (layer.width() as f32, layer.height() as f32);
    if w >= 3.0 && h >= 3.0 {
        for (x, y) in [(0.0, 0.0), (w - 1.0, 0.0), (0.0, h - 1.0), (w - 1.0, h - 1.0)] {
            layer.erase_rect(Rect::new(x, y, 1.0, 1.0));
        }
    }
    let caption_len = CARD_FACE.chars().count() as i32;
    let x = (layer.width() as i32 - caption_len) / 2;
    let y = layer.height() as i32 / 2;
    layer.draw_text(x, y, CARD_FACE, CARD_FACE_COLOR);
}

/// Soft accent glow with a bright core at the row's center.
fn draw_centerline(canvas: &mut Canvas, row: Rect, scale: f32) {
    let half = (GLOW_HALF_WIDTH * scale).max(1.0);
    let center = row.center_x();
    canvas.fill_with(
        Rect::new(center - half, row.y, half * 2.0, row.height),
        |u, _| ACCENT.with_alpha(0.6 * (1.0 - (u * 2.0 - 1.0).abs())),
    );

    let core_x = center.floor() as i32;
    let inset = row.height * 0.025;
    let top = (row.y + inset).round() as i32;
    let bottom = (row.bottom() - inset).round() as i32;
    for y in top..bottom {
        canvas.put_glyph(
            core_x,
            y,
            Glyph {
                ch: LINE_CHAR,
                color: Rgba::WHITE.with_alpha(0.8),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::encrypted::ShufflerState;

    fn scene() -> Scene {
        Scene::new(SceneOptions {
            seed: 9,
            ..Default::default()
        })
        .unwrap()
    }

    // 80x24 canvas: row height 12, card 36 wide, revealing while the travel
    // progress is within [40/116, 76/116], i.e. about 2414ms..4586ms.

    #[test]
    fn test_invalid_config_rejected() {
        let options = SceneOptions {
            stars: ParticleConfig {
                max_parallax_factor: 0.0,
                ..ParticleConfig::stars()
            },
            ..Default::default()
        };
        assert!(matches!(
            Scene::new(options),
            Err(ConfigError::ParallaxBelowOne(_))
        ));
    }

    #[test]
    fn test_layout() {
        let scene = scene();
        let layout = scene.layout(Rect::new(0.0, 0.0, 80.0, 24.0), 0);
        assert_eq!(layout.row, Rect::new(0.0, 6.0, 80.0, 12.0));
        assert_eq!(layout.card, Rect::new(-36.0, 6.0, 36.0, 12.0));
    }

    #[test]
    fn test_reveal_transitions_notify_listeners() {
        let mut scene = scene();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        scene.on_reveal_change(move |revealing| sink.borrow_mut().push(revealing));

        let mut canvas = Canvas::new(80, 24);
        scene.start(0);
        for now in (0..7_000).step_by(16) {
            scene.render(&mut canvas, now);
        }
        assert_eq!(*events.borrow(), vec![true, false]);
    }

    #[test]
    fn test_mid_reveal_frame() {
        let mut scene = scene();
        let mut canvas = Canvas::new(80, 24);
        scene.start(0);
        for now in (0..=3_500).step_by(16) {
            scene.render(&mut canvas, now);
        }
        scene.render(&mut canvas, 3_500);

        assert!(scene.is_revealing());
        assert!((scene.clip_fraction() - 0.5).abs() < 1e-3);
        assert!(scene.shuffler().text().is_some());
        assert!(scene.overlay_opacity() > 0.9);

        // Card x = 22: left part still opaque card, right part shows text.
        let card_cell = canvas.cell(25, 10).unwrap();
        assert_eq!(card_cell.fill, Rgba::WHITE);
        let revealed = canvas.cell(56, 7).unwrap();
        assert_ne!(revealed.fill, Rgba::WHITE);
        assert!(revealed.glyph.is_some());
    }

    #[test]
    fn test_idle_frame_has_no_text() {
        let mut scene = scene();
        let mut canvas = Canvas::new(80, 24);
        scene.start(0);
        scene.render(&mut canvas, 500);
        assert!(!scene.is_revealing());
        assert!(scene.shuffler().text().is_none());
        assert_eq!(scene.clip_fraction(), 0.0);
        assert_eq!(scene.overlay_opacity(), 0.0);
    }

    #[test]
    fn test_centerline_drawn() {
        let mut scene = scene();
        let mut canvas = Canvas::new(80, 24);
        scene.start(0);
        scene.render(&mut canvas, 500);
        let core = canvas.cell(40, 12).unwrap().glyph.unwrap();
        assert_eq!(core.ch, LINE_CHAR);
        assert!(canvas.cell(40, 12).unwrap().fill.a > 0.0);
    }

    #[test]
    fn test_empty_canvas() {
        let mut scene = scene();
        let mut canvas = Canvas::new(0, 0);
        scene.start(0);
        scene.render(&mut canvas, 3_500);
        assert!(!scene.is_revealing());
    }

    #[test]
    fn test_stop_halts_shuffler() {
        let mut scene = scene();
        let mut canvas = Canvas::new(80, 24);
        scene.start(0);
        scene.render(&mut canvas, 3_000);
        assert!(scene.shuffler().text().is_some());

        scene.stop(3_100);
        assert!(scene.shuffler().text().is_none());
        let before = scene.shuffler().regenerations();
        scene.render(&mut canvas, 4_000);
        assert_eq!(scene.shuffler().regenerations(), before);
    }

    #[test]
    fn test_reconfigure_reseeds_changed_field_only() {
        let mut scene = scene();
        let stars_before = scene.stars().particles().to_vec();
        scene
            .reconfigure(ParticleConfig::stars(), ParticleConfig::dismantle(), 0)
            .unwrap();
        assert_eq!(scene.stars().particles(), stars_before.as_slice());

        let fewer = ParticleConfig {
            count: 10,
            ..ParticleConfig::stars()
        };
        scene
            .reconfigure(fewer, ParticleConfig::dismantle(), 0)
            .unwrap();
        assert_eq!(scene.stars().particles().len(), 10);
    }

    #[test]
    fn test_stopped_scene_ignores_resize() {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let mut scene = scene();
        scene.on_reveal_change(move |revealing| sink.borrow_mut().push(revealing));

        let mut canvas = Canvas::new(80, 24);
        scene.start(0);
        scene.render(&mut canvas, 3_000);
        assert!(scene.is_revealing());
        scene.stop(3_100);
        let regenerations = scene.shuffler().regenerations();
        let opacity = scene.overlay_opacity();

        // A wide canvas moves the held card off the line and back.
        let mut wide = Canvas::new(300, 24);
        scene.render(&mut wide, 3_200);
        assert!(!scene.is_revealing());
        for now in (3_300..6_000).step_by(16) {
            scene.render(&mut canvas, now);
        }
        assert!(scene.is_revealing());

        assert_eq!(scene.shuffler().state(), ShufflerState::Idle);
        assert_eq!(scene.shuffler().regenerations(), regenerations);
        assert!(scene.shuffler().text().is_none());
        assert_eq!(scene.overlay_opacity(), opacity);
        assert_eq!(*events.borrow(), vec![true]);

        // Restarting picks up the current reveal state.
        scene.start(6_000);
        assert!(matches!(
            scene.shuffler().state(),
            ShufflerState::Active { .. }
        ));
        scene.render(&mut canvas, 6_000);
        assert_eq!(*events.borrow(), vec![true, false]);
        assert_eq!(scene.shuffler().state(), ShufflerState::Idle);
    }

    #[test]
    fn test_reconfigure_is_all_or_nothing() {
        let mut scene = scene();
        let fewer = ParticleConfig {
            count: 10,
            ..ParticleConfig::stars()
        };
        let broken = ParticleConfig {
            max_radius: f32::INFINITY,
            ..ParticleConfig::dismantle()
        };
        assert!(matches!(
            scene.reconfigure(fewer, broken, 0),
            Err(ConfigError::NonFinite { .. })
        ));
        assert_eq!(scene.stars().particles().len(), 250);
    }

    #[test]
    fn test_infinite_parallax_rejected() {
        let options = SceneOptions {
            stars: ParticleConfig {
                max_parallax_factor: f32::INFINITY,
                ..ParticleConfig::stars()
            },
            ..Default::default()
        };
        assert!(matches!(
            Scene::new(options),
            Err(ConfigError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_same_seed_same_frames() {
        let mut a = scene();
        let mut b = scene();
        let mut canvas_a = Canvas::new(60, 20);
        let mut canvas_b = Canvas::new(60, 20);
        a.start(0);
        b.start(0);
        for now in (0..5_000).step_by(100) {
            a.render(&mut canvas_a, now);
            b.render(&mut canvas_b, now);
            assert_eq!(canvas_a, canvas_b);
        }
    }
}
