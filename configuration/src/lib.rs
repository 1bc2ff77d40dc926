use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const ENV_PREFIX: &str = "CHUNKSCRIBE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

pub type AppConfig = ChunkscribeConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkscribeConfig {
    #[serde(default)]
    pub splitter: SplitterConfig,
    #[serde(default)]
    pub remote_split: RemoteSplitConfig,
    #[serde(default)]
    pub transcription: TranscriptionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which chunking backend the pipeline is wired with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStrategy {
    SampleAccurate,
    ByteRange,
    Remote,
}

impl FromStr for SplitStrategy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "sample_accurate" => Ok(SplitStrategy::SampleAccurate),
            "byte_range" => Ok(SplitStrategy::ByteRange),
            "remote" => Ok(SplitStrategy::Remote),
            other => Err(format!(
                "unknown strategy {other:?}, expected sample_accurate, byte_range or remote"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitterConfig {
    #[serde(default = "default_strategy")]
    pub strategy: SplitStrategy,
    #[serde(default = "default_max_chunk_size_bytes")]
    pub max_chunk_size_bytes: u64,
    #[serde(default = "default_max_chunk_duration_secs")]
    pub max_chunk_duration_secs: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSplitConfig {
    #[serde(default = "default_remote_split_base_url")]
    pub base_url: String,
    #[serde(default = "default_target_size_mb")]
    pub target_size_mb: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptionConfig {
    #[serde(default = "default_transcription_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for ChunkscribeConfig {
    fn default() -> Self {
        Self {
            splitter: SplitterConfig::default(),
            remote_split: RemoteSplitConfig::default(),
            transcription: TranscriptionConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy(),
            max_chunk_size_bytes: default_max_chunk_size_bytes(),
            max_chunk_duration_secs: default_max_chunk_duration_secs(),
        }
    }
}

impl Default for RemoteSplitConfig {
    fn default() -> Self {
        Self {
            base_url: default_remote_split_base_url(),
            target_size_mb: default_target_size_mb(),
        }
    }
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            base_url: default_transcription_base_url(),
            api_key: String::new(),
            model: default_model(),
            language: None,
            request_timeout_ms: default_request_timeout_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Builds the config from defaults plus `CHUNKSCRIBE_*` environment
/// overrides.
pub fn load_config() -> Result<ChunkscribeConfig, ConfigError> {
    let mut config = ChunkscribeConfig::default();

    override_parsed("SPLITTER_STRATEGY", &mut config.splitter.strategy)?;
    override_parsed(
        "SPLITTER_MAX_CHUNK_SIZE_BYTES",
        &mut config.splitter.max_chunk_size_bytes,
    )?;
    override_parsed(
        "SPLITTER_MAX_CHUNK_DURATION_SECS",
        &mut config.splitter.max_chunk_duration_secs,
    )?;
    override_parsed("REMOTE_SPLIT_BASE_URL", &mut config.remote_split.base_url)?;
    override_parsed(
        "REMOTE_SPLIT_TARGET_SIZE_MB",
        &mut config.remote_split.target_size_mb,
    )?;
    override_parsed("TRANSCRIPTION_BASE_URL", &mut config.transcription.base_url)?;
    override_parsed("TRANSCRIPTION_API_KEY", &mut config.transcription.api_key)?;
    override_parsed("TRANSCRIPTION_MODEL", &mut config.transcription.model)?;
    override_optional("TRANSCRIPTION_LANGUAGE", &mut config.transcription.language);
    override_parsed(
        "TRANSCRIPTION_REQUEST_TIMEOUT_MS",
        &mut config.transcription.request_timeout_ms,
    )?;
    override_parsed(
        "TRANSCRIPTION_MAX_ATTEMPTS",
        &mut config.transcription.max_attempts,
    )?;
    override_parsed("LOGGING_LEVEL", &mut config.logging.level)?;
    override_parsed("LOGGING_JSON", &mut config.logging.json)?;

    Ok(config)
}

fn override_parsed<T>(suffix: &str, slot: &mut T) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let key = format!("{ENV_PREFIX}_{suffix}");
    if let Ok(raw) = std::env::var(&key) {
        *slot = raw.parse().map_err(|error: T::Err| ConfigError::InvalidValue {
            key,
            reason: error.to_string(),
        })?;
    }
    Ok(())
}

fn override_optional(suffix: &str, slot: &mut Option<String>) {
    let key = format!("{ENV_PREFIX}_{suffix}");
    if let Ok(raw) = std::env::var(&key) {
        *slot = if raw.is_empty() { None } else { Some(raw) };
    }
}

/// Initialize the tracing subscriber with structured logging.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},chunkscribe=debug", config.level)));

    if config.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}

fn default_strategy() -> SplitStrategy {
    SplitStrategy::SampleAccurate
}

fn default_max_chunk_size_bytes() -> u64 {
    20 * 1024 * 1024
}

fn default_max_chunk_duration_secs() -> f64 {
    300.0
}

fn default_remote_split_base_url() -> String {
    "http://localhost:8585".to_string()
}

fn default_target_size_mb() -> u32 {
    25
}

fn default_transcription_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "whisper-1".to_string()
}

fn default_request_timeout_ms() -> u64 {
    60_000
}

fn default_max_attempts() -> u32 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}
