use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

pub const SENTIMENT_TOKEN_ENV: &str = "BURNOUT_GUARD_SENTIMENT_TOKEN";

const DEFAULT_SENTIMENT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/distilbert-base-uncased-finetuned-sst-2-english";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub models: ModelConfig,
    pub sentiment: SentimentConfig,
    pub assessment: AssessmentConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8501".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("wellness_data.db"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub scaler_path: PathBuf,
    pub classifier_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            scaler_path: PathBuf::from("models/scaler.json"),
            classifier_path: PathBuf::from("models/burnout_model.json"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentProvider {
    Remote,
    Lexicon,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    pub provider: SentimentProvider,
    pub endpoint: String,
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub lexicon_path: Option<PathBuf>,
    pub timeout_secs: u64,
    pub cache_capacity: usize,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            provider: SentimentProvider::Lexicon,
            endpoint: DEFAULT_SENTIMENT_ENDPOINT.to_string(),
            api_token: None,
            lexicon_path: None,
            timeout_secs: 10,
            cache_capacity: 256,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    /// Used by the form UI, which does not ask for meeting load.
    pub default_meeting_hours_per_week: f64,
    pub break_minutes_per_break: f64,
    pub persist_assessments: bool,
    pub history_limit: usize,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            default_meeting_hours_per_week: 10.0,
            break_minutes_per_break: 10.0,
            persist_assessments: true,
            history_limit: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub directives: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Loads the YAML config at `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|err| {
                    AppError::config(format!("failed to read {}: {err}", path.display()))
                })?;
                let parsed = Self::from_yaml(&content)?;
                info!(target: "app::config", path = %path.display(), "configuration loaded");
                parsed
            }
            None => {
                debug!(target: "app::config", "no configuration file given, using defaults");
                Self::default()
            }
        };

        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|err| AppError::config(format!("invalid configuration: {err}")))
    }

    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(SENTIMENT_TOKEN_ENV) {
            let token = token.trim().to_string();
            if !token.is_empty() {
                self.sentiment.api_token = Some(token);
            }
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        self.bind_addr()?;

        if self.sentiment.timeout_secs == 0 {
            return Err(AppError::config("sentiment.timeout_secs must be positive"));
        }
        if self.sentiment.cache_capacity == 0 {
            return Err(AppError::config("sentiment.cache_capacity must be positive"));
        }
        if self.sentiment.provider == SentimentProvider::Remote
            && self.sentiment.endpoint.trim().is_empty()
        {
            return Err(AppError::config("sentiment.endpoint is required for the remote provider"));
        }

        let assessment = &self.assessment;
        if !assessment.default_meeting_hours_per_week.is_finite()
            || assessment.default_meeting_hours_per_week < 0.0
        {
            return Err(AppError::config(
                "assessment.default_meeting_hours_per_week must be a non-negative number",
            ));
        }
        if !assessment.break_minutes_per_break.is_finite() || assessment.break_minutes_per_break < 0.0
        {
            return Err(AppError::config(
                "assessment.break_minutes_per_break must be a non-negative number",
            ));
        }
        if assessment.history_limit == 0 {
            return Err(AppError::config("assessment.history_limit must be positive"));
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> AppResult<SocketAddr> {
        self.server.bind_addr.parse().map_err(|err| {
            AppError::config(format!("invalid server.bind_addr {}: {err}", self.server.bind_addr))
        })
    }
}
