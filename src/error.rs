use rusqlite;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("no text was provided for sentiment analysis")]
    EmptyInput,

    #[error("failed to load model artifact: {message}")]
    ModelLoad { message: String },

    #[error("prediction failed: {message}")]
    Prediction { message: String },

    #[error("sentiment analysis unavailable: {0}")]
    SentimentUnavailable(String),

    #[error("validation failed: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        details: Option<JsonValue>,
    },

    #[error("database error: {message}")]
    Database { message: String },

    #[error("record not found")]
    NotFound,

    #[error("record conflict: {message}")]
    Conflict { message: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn missing_field(field: &'static str) -> Self {
        warn!(target: "app::validation", field, "missing required field");
        AppError::MissingField { field }
    }

    pub fn empty_input() -> Self {
        warn!(target: "app::validation", "empty sentiment text rejected");
        AppError::EmptyInput
    }

    pub fn model_load(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::model", %message, "model artifact load failed");
        AppError::ModelLoad { message }
    }

    pub fn prediction(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::model", %message, "prediction failed");
        AppError::Prediction { message }
    }

    pub fn sentiment_unavailable(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::sentiment", %message, "sentiment backend unavailable");
        AppError::SentimentUnavailable(message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "validation error");
        AppError::Validation {
            message,
            source: None,
            details: None,
        }
    }

    pub fn validation_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, details = %details, "validation error with details");
        AppError::Validation {
            message,
            source: None,
            details: Some(details),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::conflict", %message, "conflict error");
        AppError::Conflict { message }
    }

    pub fn not_found() -> Self {
        warn!(target: "app::database", "resource not found");
        AppError::NotFound
    }

    pub fn database(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::database", %message, "database error");
        AppError::Database { message }
    }

    pub fn config(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::config", %message, "configuration error");
        AppError::Config { message }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }

    /// Startup failures that must abort initialization.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AppError::ModelLoad { .. } | AppError::Config { .. })
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        use rusqlite::Error::{QueryReturnedNoRows, SqliteFailure};
        use rusqlite::ErrorCode;

        match &error {
            QueryReturnedNoRows => AppError::not_found(),
            SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation => {
                AppError::conflict("unique or check constraint violated")
            }
            _ => {
                error!(target: "app::database", error = ?error, "sqlite error");
                AppError::database(error.to_string())
            }
        }
    }
}
