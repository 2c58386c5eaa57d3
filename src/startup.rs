use std::sync::Arc;

use qdrant_client::prelude::{QdrantClient, QdrantClientConfig};
use tracing::info;

use crate::{
    adapters::{
        file_source_processor::FileSourceProcessor, http_embedder::HttpEmbedder,
        tokio_sleeper::TokioSleeper,
    },
    configuration::{EmbedderProvider, EmbedderSettings, QdrantSettings, Settings},
    domain::services::indexer::{Indexer, IndexerError},
    helper::error_chain_fmt,
    ports::embedder::Embedder,
    repositories::qdrant_repository::QdrantRepository,
};

/// Holds the indexer wired with its Qdrant, embedder and source adapters
pub struct Application {
    indexer: Indexer,
}

impl Application {
    #[tracing::instrument(name = "Building indexer application", skip(settings))]
    pub fn build(settings: Settings) -> Result<Self, ApplicationError> {
        let qdrant_client = get_qdrant_client(&settings.qdrant)?;
        // One repository for both the collection management and the point storage
        let qdrant_repository = Arc::new(QdrantRepository::new(qdrant_client));

        let embedder = get_embedder(&settings.embedder)?;
        let source_processor = FileSourceProcessor::from_settings(&settings.source);

        let indexer = Indexer::new(
            Arc::new(source_processor),
            embedder,
            qdrant_repository.clone(),
            qdrant_repository,
            Arc::new(TokioSleeper),
            settings.indexer,
        );

        Ok(Self { indexer })
    }

    /// Rebuilds the collection once, then returns
    pub async fn run(self) -> Result<(), ApplicationError> {
        self.indexer.init().await?;

        info!("👋 Bye!");
        Ok(())
    }
}

/// Set up a client to Qdrant
pub fn get_qdrant_client(config: &QdrantSettings) -> Result<QdrantClient, ApplicationError> {
    let mut qdrant_config = QdrantClientConfig::from_url(&config.get_grpc_base_url());
    qdrant_config.api_key = config.get_api_key();

    QdrantClient::new(Some(qdrant_config)).map_err(|e| ApplicationError::QdrantError(e.to_string()))
}

/// Set up the embedder selected in the configuration
pub fn get_embedder(config: &EmbedderSettings) -> Result<Arc<dyn Embedder>, ApplicationError> {
    match config.provider {
        EmbedderProvider::Http => Ok(Arc::new(HttpEmbedder::new(
            reqwest::Client::new(),
            &config.base_url,
        ))),
        #[cfg(feature = "huggingface")]
        EmbedderProvider::HuggingFace => Ok(Arc::new(
            crate::adapters::huggingface_embedder::HuggingFaceEmbedder::new(),
        )),
        #[cfg(not(feature = "huggingface"))]
        EmbedderProvider::HuggingFace => Err(ApplicationError::ConfigurationError(
            "the huggingface embedder needs the `huggingface` feature".into(),
        )),
    }
}

#[derive(thiserror::Error)]
pub enum ApplicationError {
    #[error("Error from Qdrant: {0}")]
    QdrantError(String),
    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),
    #[error(transparent)]
    IndexerError(#[from] IndexerError),
}

impl std::fmt::Debug for ApplicationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
