use std::time::Duration;

use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::services::backoff::BackoffPolicy;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub qdrant: QdrantSettings,
    pub embeddings: EmbeddingsSettings,
    pub generative: GenerativeSettings,
    pub ingestion: IngestionSettings,
    pub chat: ChatSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QdrantSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub grpc_port: u16,
    pub collection: String,
}

impl QdrantSettings {
    pub fn get_grpc_base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.grpc_port)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingsSettings {
    pub api_base: String,
    pub api_key: Secret<String>,
    pub model: String,
    pub task: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
}

impl EmbeddingsSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerativeSettings {
    pub api_base: String,
    pub api_key: Secret<String>,
    pub model: String,
    /// Attempts made while the provider answers "overloaded"
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_attempts: u32,
    /// Wait before the second attempt, doubled after each failure
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub initial_delay_ms: u64,
    /// Number of conversation turns sent to the provider
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_history: usize,
}

impl GenerativeSettings {
    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }

    pub fn backoff_policy(&self) -> BackoffPolicy {
        BackoffPolicy {
            max_attempts: self.max_attempts,
            initial_delay: Duration::from_millis(self.initial_delay_ms),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestionSettings {
    /// Runs the ingestion in the background when the application starts
    pub enabled: bool,
    pub feeds: Vec<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_items_per_feed: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_articles: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatSettings {
    /// Number of articles retrieved to answer a message
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub top_k: u64,
    #[serde(default)]
    pub history_mode: HistoryMode,
}

/// Whether the previous exchanges of a session are sent to the generative model
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    /// Each message is answered on its own, the session history is only stored
    #[default]
    Stateless,
    HistoryAware,
}

/// Extracts app settings from configuration files and env variables
///
/// `base.yaml` should contain shared settings for all environments.
/// A specific env file should be created for each environment: `local.yaml` and `production.yaml`
/// The environment is set with the env var `APP_ENVIRONMENT`.
/// If `APP_ENVIRONMENT` is not set, `local.yaml` is the default.
///
/// Settings are also taken from environment variables: with a prefix of APP and '__' as separator
/// For ex: `APP_GENERATIVE__API_KEY=xxx` would set `Settings.generative.api_key`
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT.");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

/// The possible runtime environment for our application.
#[derive(Debug)]
pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
