use std::fs::{self, File};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use amho_config::Config;
use amho_effects::{Canvas, Scene, SceneOptions};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::Rect,
    style::{Color, Stylize},
    text::Line,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "AMHO_LOG";

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    init_logging()?;

    let config = Config::load()?;
    let app = App::new(config)?;

    let terminal = ratatui::init();
    let result = app.run(terminal);
    ratatui::restore();
    result
}

/// Send logs to a file; the terminal belongs to the UI.
fn init_logging() -> color_eyre::Result<()> {
    let Some(path) = amho_config::log_path() else {
        return Ok(());
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let file = File::create(&path)?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// The main application which holds the state and logic of the application.
#[derive(Debug)]
pub struct App {
    /// Is the application running?
    running: bool,
    scene: Scene,
    canvas: Canvas,
    started: Instant,
    frame_interval: Duration,
}

impl App {
    /// Construct a new instance of [`App`].
    pub fn new(config: Config) -> color_eyre::Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        info!(seed, "building scene");

        let mut scene = Scene::new(SceneOptions {
            stars: config.stars,
            dismantle: config.dismantle,
            seed,
            ..SceneOptions::default()
        })?;
        scene.on_reveal_change(|revealing| info!(revealing, "reveal changed"));

        Ok(Self {
            running: false,
            scene,
            canvas: Canvas::new(0, 0),
            started: Instant::now(),
            frame_interval: Duration::from_millis(config.frame_interval_ms),
        })
    }

    fn now_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Run the application's main loop.
    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;
        self.started = Instant::now();
        self.scene.start(0);
        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_crossterm_events()?;
        }
        Ok(())
    }

    /// Renders the user interface.
    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        self.canvas.resize(area.width, area.height);
        let now = self.now_ms();
        self.scene.render(&mut self.canvas, now);
        frame.render_widget(&self.canvas, area);

        if area.height > 1 {
            let help = Line::from(vec![
                "q".bold().fg(Color::LightBlue),
                " quit  ".dark_gray(),
                "space".bold().fg(Color::LightBlue),
                " stop/start  ".dark_gray(),
                "r".bold().fg(Color::LightBlue),
                " reload config".dark_gray(),
            ])
            .centered();
            let row = Rect::new(area.x, area.bottom() - 1, area.width, 1);
            frame.render_widget(help, row);
        }
    }

    /// Reads the crossterm events and updates the state of [`App`].
    /// Polls with the frame interval so the animation keeps moving.
    fn handle_crossterm_events(&mut self) -> color_eyre::Result<()> {
        if event::poll(self.frame_interval)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
                Event::Resize(_, _) => {}
                _ => {}
            }
        }
        Ok(())
    }

    /// Handles the key events and updates the state of [`App`].
    fn on_key_event(&mut self, key: KeyEvent) {
        match (key.modifiers, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q'))
            | (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => self.quit(),
            (_, KeyCode::Char(' ')) => self.toggle_running(),
            (_, KeyCode::Char('r')) => self.reload_config(),
            _ => {}
        }
    }

    /// Stop the scene, or restart its loops from the beginning.
    fn toggle_running(&mut self) {
        let now = self.now_ms();
        if self.scene.is_running() {
            self.scene.stop(now);
        } else {
            self.scene.start(now);
        }
    }

    /// Re-read the config file and swap particle settings in place. A bad
    /// file is logged and the running settings are kept.
    fn reload_config(&mut self) {
        let now = self.now_ms();
        let result = Config::load()
            .map_err(color_eyre::Report::from)
            .and_then(|config| {
                self.frame_interval = Duration::from_millis(config.frame_interval_ms);
                self.scene
                    .reconfigure(config.stars, config.dismantle, now)
                    .map_err(color_eyre::Report::from)
            });
        match result {
            Ok(()) => info!("config reloaded"),
            Err(err) => warn!("config reload failed: {err:#}"),
        }
    }

    /// Set running to false to quit the application.
    fn quit(&mut self) {
        self.running = false;
    }
}
