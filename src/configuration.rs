use std::time::Duration;

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::entities::collection::Distance;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub indexer: IndexerSettings,
    pub qdrant: QdrantSettings,
    pub embedder: EmbedderSettings,
    pub source: SourceSettings,
}

/// Settings of the indexing pipeline itself
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct IndexerSettings {
    /// The single collection rebuilt on each run
    pub collection_name: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub vector_size: u64,
    pub distance: Distance,
    /// Number of points sent in one upsert request
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub batch_size: usize,
    /// Attempts for one batch, the first one included
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_attempts: usize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub retry_delay_ms: u64,
}

impl IndexerSettings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for IndexerSettings {
    fn default() -> Self {
        Self {
            collection_name: "docs".into(),
            // all-MiniLM-L12-v2 dimensions
            vector_size: 384,
            distance: Distance::Cosine,
            batch_size: 250,
            max_attempts: 10,
            retry_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct QdrantSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub grpc_port: u16,
    pub api_key: Option<Secret<String>>,
}

impl QdrantSettings {
    pub fn get_grpc_base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.grpc_port)
    }

    pub fn get_api_key(&self) -> Option<String> {
        self.api_key
            .as_ref()
            .map(|api_key| api_key.expose_secret().to_owned())
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderProvider {
    /// Text embeddings served over HTTP
    Http,
    /// Local model, needs the `huggingface` feature
    HuggingFace,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbedderSettings {
    pub provider: EmbedderProvider,
    pub base_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub root_directory: String,
    /// File extensions to index, without the leading dot
    pub extensions: Vec<String>,
    /// Paragraphs of a file are merged up to this size
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_chunk_chars: usize,
}

/// Extracts app settings from configuration files and env variables
///
/// `base.yaml` should contain shared settings for all environments.
/// A specific env file should be created for each environment: `develop.yaml`,`local.yaml` and `production.yaml`
/// The environment is set with the env var `APP_ENVIRONMENT`.
/// If `APP_ENVIRONMENT` is not set, `develop.yaml` is the default.
///
/// Settings are also taken from environment variables: with a prefix of APP and '__' as separator
/// For ex: `APP_INDEXER__BATCH_SIZE=100` would set `Settings.indexer.batch_size`
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "develop".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
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
#[derive(Debug, PartialEq, Eq)]
pub enum Environment {
    Develop,
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Develop => "develop",
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "develop" => Ok(Self::Develop),
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `develop`, `local` or `production`.",
                other
            )),
        }
    }
}
