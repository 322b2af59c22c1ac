//! Configuration loading for amho.
//!
//! Settings come from an optional `config.toml` in the platform config
//! directory, or from the file named by `AMHO_CONFIG`. Every key is optional;
//! missing keys fall back to the built-in presets.
//!
//! ```toml
//! seed = 42
//! frame_interval_ms = 16
//!
//! [stars]
//! count = 300
//! color = "#81D4FA"
//!
//! [dismantle]
//! easing = "ease-in-quad"
//! ```

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use amho_core::{ConfigError, Easing, ParticleConfig, Rgba};
use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "AMHO_CONFIG";

/// Default delay between frames.
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;

const CONFIG_FILE: &str = "config.toml";
const LOG_FILE: &str = "amho.log";

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid [{section}] settings: {source}")]
    Invalid {
        section: &'static str,
        #[source]
        source: ConfigError,
    },

    #[error("invalid color {0:?}, expected \"#RRGGBB\" or \"#AARRGGBB\"")]
    Color(String),

    #[error("frame_interval_ms must be positive")]
    FrameInterval,
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub stars: ParticleConfig,
    pub dismantle: ParticleConfig,
    /// Seed for all random sources. `None` picks one at startup.
    pub seed: Option<u64>,
    pub frame_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stars: ParticleConfig::stars(),
            dismantle: ParticleConfig::dismantle(),
            seed: None,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    seed: Option<u64>,
    frame_interval_ms: Option<u64>,
    stars: Option<RawParticles>,
    dismantle: Option<RawParticles>,
}

/// Particle settings as written in the file. Counts and durations are signed
/// so negative values are reported instead of failing to parse.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParticles {
    count: Option<i64>,
    min_radius: Option<f32>,
    max_radius: Option<f32>,
    max_parallax_factor: Option<f32>,
    loop_duration_ms: Option<i64>,
    easing: Option<Easing>,
    fade_out: Option<bool>,
    color: Option<String>,
}

impl RawParticles {
    fn resolve(
        self,
        section: &'static str,
        base: ParticleConfig,
    ) -> Result<ParticleConfig, LoadError> {
        let invalid = |source| LoadError::Invalid { section, source };

        let count = match self.count {
            Some(count) => {
                usize::try_from(count).map_err(|_| invalid(ConfigError::NegativeCount(count)))?
            }
            None => base.count,
        };
        let loop_duration_ms = match self.loop_duration_ms {
            Some(ms) if ms > 0 => ms as u64,
            Some(ms) => return Err(invalid(ConfigError::NonPositiveDuration(ms))),
            None => base.loop_duration_ms,
        };
        let color = match self.color {
            Some(hex) => Rgba::from_hex(&hex).ok_or(LoadError::Color(hex))?,
            None => base.color,
        };

        let config = ParticleConfig {
            count,
            min_radius: self.min_radius.unwrap_or(base.min_radius),
            max_radius: self.max_radius.unwrap_or(base.max_radius),
            max_parallax_factor: self.max_parallax_factor.unwrap_or(base.max_parallax_factor),
            loop_duration_ms,
            easing: self.easing.unwrap_or(base.easing),
            fade_out: self.fade_out.unwrap_or(base.fade_out),
            color,
        };
        config.validate().map_err(invalid)?;
        Ok(config)
    }
}

impl Config {
    /// Parse settings from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, LoadError> {
        let raw: RawConfig = toml::from_str(text)?;
        let defaults = Config::default();

        let stars = match raw.stars {
            Some(section) => section.resolve("stars", defaults.stars)?,
            None => defaults.stars,
        };
        let dismantle = match raw.dismantle {
            Some(section) => section.resolve("dismantle", defaults.dismantle)?,
            None => defaults.dismantle,
        };
        let frame_interval_ms = match raw.frame_interval_ms {
            Some(0) => return Err(LoadError::FrameInterval),
            Some(ms) => ms,
            None => defaults.frame_interval_ms,
        };

        Ok(Self {
            stars,
            dismantle,
            seed: raw.seed,
            frame_interval_ms,
        })
    }

    /// Load from a specific file.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load from `AMHO_CONFIG` if set, otherwise from the default location.
    /// A missing default file yields the defaults.
    pub fn load() -> Result<Self, LoadError> {
        if let Some(path) = env::var_os(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }
        match config_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "amho")
}

/// Default config file location.
pub fn config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// Where the log file goes.
pub fn log_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_local_dir().join(LOG_FILE))
}
