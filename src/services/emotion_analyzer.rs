use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration as StdDuration, Instant};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use lru::LruCache;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{SentimentConfig, SentimentProvider};
use crate::error::{AppError, AppResult};
use crate::models::behavior::SentimentScore;

const SCORE_DECIMALS: f64 = 10_000.0;

/// Maps free text to a polarity-signed confidence in [-1, 1].
#[async_trait]
pub trait SentimentBackend: Send + Sync {
    fn name(&self) -> &'static str;

    async fn classify(&self, text: &str) -> AppResult<f64>;
}

// ---------------------------------------------------------------------------
// Remote inference endpoint
// ---------------------------------------------------------------------------

pub struct RemoteSentimentBackend {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    api_token: Option<String>,
}

impl RemoteSentimentBackend {
    pub fn try_new(
        endpoint: &str,
        api_token: Option<String>,
        timeout: StdDuration,
    ) -> AppResult<Self> {
        let endpoint = reqwest::Url::parse(endpoint.trim()).map_err(|err| {
            AppError::sentiment_unavailable(format!("invalid sentiment endpoint {endpoint}: {err}"))
        })?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(2)
            .pool_idle_timeout(Some(StdDuration::from_secs(90)))
            .build()
            .map_err(|err| {
                AppError::sentiment_unavailable(format!("failed to build HTTP client: {err}"))
            })?;

        Ok(Self {
            client,
            endpoint,
            api_token,
        })
    }
}

#[async_trait]
impl SentimentBackend for RemoteSentimentBackend {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn classify(&self, text: &str) -> AppResult<f64> {
        let correlation_id = Uuid::new_v4().to_string();
        debug!(
            target: "app::sentiment",
            correlation_id = %correlation_id,
            text_chars = text.chars().count(),
            "invoking sentiment endpoint"
        );

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .json(&json!({ "inputs": text }));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let start = Instant::now();
        let response = request.send().await.map_err(|err| {
            AppError::sentiment_unavailable(format!(
                "sentiment request {correlation_id} failed: {err}"
            ))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::sentiment_unavailable(format!(
                "sentiment request {correlation_id} returned {status}"
            )));
        }

        let body: JsonValue = response.json().await.map_err(|err| {
            AppError::sentiment_unavailable(format!(
                "sentiment response {correlation_id} is not JSON: {err}"
            ))
        })?;

        let score = parse_inference_response(&body)?;
        debug!(
            target: "app::sentiment",
            correlation_id = %correlation_id,
            latency_ms = start.elapsed().as_millis() as u64,
            score,
            "sentiment endpoint responded"
        );
        Ok(score)
    }
}

/// Reads a text-classification response (`[{label, score}]`, optionally
/// nested one level) and signs the top-scoring label's confidence.
pub fn parse_inference_response(body: &JsonValue) -> AppResult<f64> {
    let entries = match body.as_array() {
        Some(outer) => match outer.first() {
            Some(JsonValue::Array(inner)) => inner.as_slice(),
            _ => outer.as_slice(),
        },
        None => {
            return Err(AppError::sentiment_unavailable(
                "sentiment response is not a list of labels",
            ))
        }
    };

    let top = entries
        .iter()
        .filter_map(|entry| {
            let label = entry.get("label")?.as_str()?;
            let score = entry.get("score")?.as_f64()?;
            Some((label, score))
        })
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .ok_or_else(|| AppError::sentiment_unavailable("sentiment response has no labels"))?;

    let (label, confidence) = top;
    if !confidence.is_finite() || !(0.0..=1.0).contains(&confidence) {
        return Err(AppError::sentiment_unavailable(format!(
            "sentiment confidence out of range: {confidence}"
        )));
    }

    match label.to_ascii_uppercase().as_str() {
        "POSITIVE" | "LABEL_1" => Ok(confidence),
        "NEGATIVE" | "LABEL_0" => Ok(-confidence),
        "NEUTRAL" => Ok(0.0),
        other => Err(AppError::sentiment_unavailable(format!(
            "unsupported sentiment label: {other}"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Offline lexicon
// ---------------------------------------------------------------------------

const BUILTIN_LEXICON: &[(&str, f64)] = &[
    ("balanced", 0.5),
    ("calm", 0.5),
    ("confident", 0.6),
    ("energized", 0.7),
    ("enjoy", 0.7),
    ("enjoying", 0.7),
    ("excited", 0.8),
    ("fine", 0.3),
    ("good", 0.6),
    ("grateful", 0.7),
    ("great", 0.8),
    ("happy", 0.8),
    ("love", 0.9),
    ("manageable", 0.4),
    ("motivated", 0.7),
    ("productive", 0.6),
    ("proud", 0.7),
    ("relaxed", 0.6),
    ("rested", 0.6),
    ("satisfied", 0.6),
    ("supported", 0.6),
    ("angry", -0.8),
    ("anxious", -0.7),
    ("awful", -0.9),
    ("bad", -0.6),
    ("behind", -0.4),
    ("bored", -0.4),
    ("burnout", -0.9),
    ("burned", -0.6),
    ("constant", -0.2),
    ("deadlines", -0.3),
    ("drained", -0.8),
    ("exhausted", -0.9),
    ("frustrated", -0.7),
    ("hate", -0.9),
    ("hopeless", -0.9),
    ("lonely", -0.6),
    ("overwhelmed", -0.9),
    ("overwhelming", -0.9),
    ("overworked", -0.8),
    ("pressure", -0.5),
    ("sad", -0.7),
    ("stress", -0.7),
    ("stressed", -0.8),
    ("struggling", -0.7),
    ("terrible", -0.9),
    ("tired", -0.6),
    ("unmotivated", -0.7),
    ("worried", -0.6),
];

const NEGATORS: &[&str] = &["not", "no", "never", "hardly", "without", "nothing"];

pub struct LexiconSentimentBackend {
    lexicon: HashMap<String, f64>,
    negators: HashSet<&'static str>,
    token_pattern: Regex,
}

impl LexiconSentimentBackend {
    pub fn builtin() -> AppResult<Self> {
        let lexicon = BUILTIN_LEXICON
            .iter()
            .map(|(word, weight)| (word.to_string(), *weight))
            .collect();
        Self::with_lexicon(lexicon)
    }

    /// Loads a YAML mapping of `word: weight` with weights in [-1, 1].
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|err| {
            AppError::sentiment_unavailable(format!("cannot read lexicon {}: {err}", path.display()))
        })?;
        let raw: HashMap<String, f64> = serde_yaml::from_str(&content).map_err(|err| {
            AppError::sentiment_unavailable(format!("invalid lexicon {}: {err}", path.display()))
        })?;

        if let Some((word, weight)) = raw
            .iter()
            .find(|(_, weight)| !weight.is_finite() || !(-1.0..=1.0).contains(*weight))
        {
            return Err(AppError::sentiment_unavailable(format!(
                "lexicon weight for {word} is out of range: {weight}"
            )));
        }

        let lexicon = raw
            .into_iter()
            .map(|(word, weight)| (word.to_lowercase(), weight))
            .collect();
        Self::with_lexicon(lexicon)
    }

    fn with_lexicon(lexicon: HashMap<String, f64>) -> AppResult<Self> {
        if lexicon.is_empty() {
            return Err(AppError::sentiment_unavailable("sentiment lexicon is empty"));
        }
        let token_pattern = Regex::new(r"[a-z]+(?:'[a-z]+)?")
            .map_err(|err| AppError::sentiment_unavailable(format!("bad token pattern: {err}")))?;

        Ok(Self {
            lexicon,
            negators: NEGATORS.iter().copied().collect(),
            token_pattern,
        })
    }

    pub fn score_text(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();
        let mut total = 0.0;
        let mut negate_next = false;
        let mut matched = false;

        for token in self.token_pattern.find_iter(&lowered).map(|m| m.as_str()) {
            if self.negators.contains(token) || token.ends_with("n't") {
                negate_next = true;
                continue;
            }
            if let Some(weight) = self.lexicon.get(token) {
                total += if negate_next { -weight } else { *weight };
                negate_next = false;
                matched = true;
            }
        }

        if matched {
            total.tanh()
        } else {
            0.0
        }
    }
}

#[async_trait]
impl SentimentBackend for LexiconSentimentBackend {
    fn name(&self) -> &'static str {
        "lexicon"
    }

    async fn classify(&self, text: &str) -> AppResult<f64> {
        Ok(self.score_text(text))
    }
}

// ---------------------------------------------------------------------------
// Analyzer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SentimentStatus {
    Ready { backend: String },
    Disabled,
    Degraded { reason: String },
}

/// Sentiment capability built once at startup.
///
/// Without a working backend every request scores neutral (0.0) and a
/// warning is logged; the assessment itself still proceeds.
pub struct EmotionAnalyzer {
    backend: Option<Arc<dyn SentimentBackend>>,
    status: SentimentStatus,
    cache: Mutex<LruCache<String, f64>>,
}

impl EmotionAnalyzer {
    pub fn from_config(config: &SentimentConfig) -> Self {
        info!(target: "app::sentiment", provider = ?config.provider, "initializing emotion analyzer");
        let capacity = config.cache_capacity;

        let backend: AppResult<Arc<dyn SentimentBackend>> = match config.provider {
            SentimentProvider::Disabled => return Self::disabled(capacity),
            SentimentProvider::Remote => RemoteSentimentBackend::try_new(
                &config.endpoint,
                config.api_token.clone(),
                StdDuration::from_secs(config.timeout_secs),
            )
            .map(|backend| Arc::new(backend) as Arc<dyn SentimentBackend>),
            SentimentProvider::Lexicon => match &config.lexicon_path {
                Some(path) => LexiconSentimentBackend::from_file(path),
                None => LexiconSentimentBackend::builtin(),
            }
            .map(|backend| Arc::new(backend) as Arc<dyn SentimentBackend>),
        };

        match backend {
            Ok(backend) => Self::with_backend(backend, capacity),
            Err(err) => Self::degraded(err.to_string(), capacity),
        }
    }

    pub fn with_backend(backend: Arc<dyn SentimentBackend>, cache_capacity: usize) -> Self {
        info!(target: "app::sentiment", backend = backend.name(), "emotion analyzer ready");
        Self {
            status: SentimentStatus::Ready {
                backend: backend.name().to_string(),
            },
            backend: Some(backend),
            cache: Mutex::new(LruCache::new(capacity(cache_capacity))),
        }
    }

    pub fn degraded(reason: impl Into<String>, cache_capacity: usize) -> Self {
        let reason = reason.into();
        warn!(
            target: "app::sentiment",
            %reason,
            "sentiment pipeline not available, scores will be neutral"
        );
        Self {
            backend: None,
            status: SentimentStatus::Degraded { reason },
            cache: Mutex::new(LruCache::new(capacity(cache_capacity))),
        }
    }

    pub fn disabled(cache_capacity: usize) -> Self {
        info!(target: "app::sentiment", "sentiment analysis disabled, scores will be neutral");
        Self {
            backend: None,
            status: SentimentStatus::Disabled,
            cache: Mutex::new(LruCache::new(capacity(cache_capacity))),
        }
    }

    pub fn status(&self) -> &SentimentStatus {
        &self.status
    }

    pub fn is_degraded(&self) -> bool {
        self.backend.is_none()
    }

    pub async fn analyze_sentiment(&self, text: &str) -> AppResult<SentimentScore> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::empty_input());
        }

        let backend = match &self.backend {
            Some(backend) => backend,
            None => {
                warn!(target: "app::sentiment", "sentiment pipeline not available, returning neutral score");
                return Ok(SentimentScore::NEUTRAL);
            }
        };

        let key = cache_key(text);
        if let Some(cached) = self.cached(&key) {
            debug!(target: "app::sentiment", "sentiment cache hit");
            return Ok(to_score(cached));
        }

        match backend.classify(text).await {
            Ok(raw) => {
                let value = round_sentiment(raw);
                if let Ok(mut cache) = self.cache.lock() {
                    cache.put(key, value);
                }
                Ok(to_score(value))
            }
            Err(err) => {
                warn!(
                    target: "app::sentiment",
                    backend = backend.name(),
                    error = %err,
                    "sentiment backend failed, returning neutral score"
                );
                Ok(SentimentScore::NEUTRAL)
            }
        }
    }

    fn cached(&self, key: &str) -> Option<f64> {
        self.cache
            .lock()
            .ok()
            .and_then(|mut cache| cache.get(key).copied())
    }
}

fn capacity(value: usize) -> NonZeroUsize {
    NonZeroUsize::new(value).unwrap_or(NonZeroUsize::MIN)
}

/// Statements are not kept verbatim; the memo is keyed by digest.
fn cache_key(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    STANDARD_NO_PAD.encode(digest)
}

fn round_sentiment(raw: f64) -> f64 {
    let clamped = if raw.is_finite() { raw.clamp(-1.0, 1.0) } else { 0.0 };
    (clamped * SCORE_DECIMALS).round() / SCORE_DECIMALS
}

fn to_score(value: f64) -> SentimentScore {
    SentimentScore::new(value).unwrap_or(SentimentScore::NEUTRAL)
}
