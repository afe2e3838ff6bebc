use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::CompletionParams;
use crate::error::ConfigError;
use crate::types::{ExamFact, ProfileSnapshot, ProgressFact};

static APP_DIR: &str = ".study-companion";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub tutor: TutorConfig,
    #[serde(default = "default_profile")]
    pub profile: ProfileSnapshot,
    #[serde(default)]
    pub progress: Vec<ProgressFact>,
    #[serde(default)]
    pub exams: Vec<ExamFact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub name: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Falls back to `OPENAI_API_KEY` when unset.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorConfig {
    /// Turns of history sent with each reply prompt.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Suggestions are generated whenever the turn count is a multiple of this.
    #[serde(default = "default_suggestion_every")]
    pub suggestion_every: usize,

    /// Used for the emotion and understanding classifiers.
    #[serde(default)]
    pub analysis_temperature: f32,

    #[serde(default = "default_analysis_max_tokens")]
    pub analysis_max_tokens: u32,
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_api_base() -> String {
    "https://api.openai.com/v1/".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1000
}
fn default_history_window() -> usize {
    crate::window::DEFAULT_WINDOW
}
fn default_suggestion_every() -> usize {
    crate::suggest::DEFAULT_CADENCE
}
fn default_analysis_max_tokens() -> u32 {
    20
}
fn default_profile() -> ProfileSnapshot {
    ProfileSnapshot {
        display_name: whoami::username(),
        ..Default::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            tutor: TutorConfig::default(),
            profile: default_profile(),
            progress: Vec::new(),
            exams: Vec::new(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            api_base: default_api_base(),
            api_key: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            suggestion_every: default_suggestion_every(),
            analysis_temperature: 0.0,
            analysis_max_tokens: default_analysis_max_tokens(),
        }
    }
}

impl ModelConfig {
    pub fn reply_params(&self) -> CompletionParams {
        CompletionParams {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

impl TutorConfig {
    pub fn analysis_params(&self) -> CompletionParams {
        CompletionParams {
            temperature: self.analysis_temperature,
            max_tokens: self.analysis_max_tokens,
        }
    }
}

impl Config {
    /// `~/.study-companion`
    pub fn app_dir() -> Result<PathBuf, ConfigError> {
        let home = homedir::my_home()
            .map_err(|_| ConfigError::HomeDir)?
            .ok_or(ConfigError::HomeDir)?;
        Ok(home.join(APP_DIR))
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::app_dir()?.join("config.toml"))
    }

    /// Reads the config file, or returns defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::parse(&std::fs::read_to_string(path)?)
    }

    /// A blank `display_name` is filled with the OS user name.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(text)?;
        if config.profile.display_name.trim().is_empty() {
            config.profile.display_name = whoami::username();
        }
        Ok(config)
    }
}
