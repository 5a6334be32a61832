use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const PROMPT_COUNT: usize = 8;
pub const OPTION_COUNT: usize = 8;
pub const SLIDE_SECS: u64 = 15;
/// Length of the post-lock feedback window
pub const FEEDBACK_MS: u64 = 100;
pub const CORRECT_PROBABILITY: f64 = 0.5;
/// Draws below this show a cross, otherwise a tick
pub const CROSS_PROBABILITY: f64 = 0.75;

// digit keys 1..=9 pick an option
const MAX_OPTIONS: usize = 9;
pub const MAX_SLIDE_SECS: u64 = 3_600;
pub const MAX_FEEDBACK_MS: u64 = 10_000;

pub const DEFAULT_PROMPTS: [&str; PROMPT_COUNT] = [
    "Mathematics",
    "English",
    "Science",
    "History",
    "Geography",
    "Art",
    "Music",
    "Physical Education",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Csv,
}

impl LogFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub prompts: Vec<String>,
    pub option_count: usize,
    pub slide_secs: u64,
    pub feedback_ms: u64,
    pub log_format: LogFormat,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prompts: DEFAULT_PROMPTS.iter().map(|p| p.to_string()).collect(),
            option_count: OPTION_COUNT,
            slide_secs: SLIDE_SECS,
            feedback_ms: FEEDBACK_MS,
            log_format: LogFormat::Json,
            log_dir: None,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.prompts.is_empty() {
            return Err(ConfigError::Invalid("at least one prompt is required".into()));
        }
        if self.prompts.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::Invalid("prompts must not be blank".into()));
        }
        if !(1..=MAX_OPTIONS).contains(&self.option_count) {
            return Err(ConfigError::Invalid(format!(
                "option count must be between 1 and {MAX_OPTIONS}, got {}",
                self.option_count
            )));
        }
        if !(1..=MAX_SLIDE_SECS).contains(&self.slide_secs) {
            return Err(ConfigError::Invalid(format!(
                "slide duration must be between 1 and {MAX_SLIDE_SECS} seconds, got {}",
                self.slide_secs
            )));
        }
        if self.feedback_ms > MAX_FEEDBACK_MS {
            return Err(ConfigError::Invalid(format!(
                "feedback window must be at most {MAX_FEEDBACK_MS} ms, got {}",
                self.feedback_ms
            )));
        }
        Ok(())
    }

    pub fn slide_ms(&self) -> u64 {
        self.slide_secs.saturating_mul(1000)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "colourmatch") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("colourmatch_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "ignoring malformed config")
                }
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
