//! Application-level configuration loading: hint pacing, answer mode and storage paths.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use serde_with::{DurationSeconds, serde_as};
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "EMOJI_CHARADE_CONFIG_PATH";
/// Delay between two hint reveals when the configuration does not say otherwise.
pub const DEFAULT_HINT_INTERVAL: Duration = Duration::from_secs(60);
/// Number of wrong answers shown next to the right one in multiple-choice mode.
pub const DECOY_COUNT: usize = 7;

/// How players submit their answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerMode {
    /// Players type the answer in the chat.
    #[default]
    FreeText,
    /// Players pick one of the offered choices.
    MultipleChoice,
}

/// Immutable runtime configuration shared across the application.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Delay between hint reveals, also the grace period after the last hint.
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(rename = "hint_interval_secs")]
    pub hint_interval: Duration,
    /// Free text or multiple choice.
    pub mode: AnswerMode,
    /// In multiple-choice mode, let each player answer only once per hint.
    pub one_attempt_per_hint: bool,
    /// JSON file holding the puzzles.
    pub question_bank_path: PathBuf,
    /// JSON file holding the leaderboard.
    pub leaderboard_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            hint_interval: DEFAULT_HINT_INTERVAL,
            mode: AnswerMode::default(),
            one_attempt_per_hint: false,
            question_bank_path: PathBuf::from("charadas.json"),
            leaderboard_path: PathBuf::from("ranking.json"),
        }
    }
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json(&contents) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        interval_secs = config.hint_interval.as_secs(),
                        mode = ?config.mode,
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON configuration document; absent keys keep their default.
    /// A zero hint interval is rejected.
    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        let config: Self = serde_json::from_str(contents)?;
        if config.hint_interval.is_zero() {
            return Err(serde::de::Error::custom(
                "hint_interval_secs must be at least 1",
            ));
        }
        Ok(config)
    }

    /// Whether rounds offer a fixed set of choices.
    pub fn multiple_choice(&self) -> bool {
        self.mode == AnswerMode::MultipleChoice
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
