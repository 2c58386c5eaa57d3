use async_trait::async_trait;

use crate::{domain::entities::content_point::Embeddings, helper::error_chain_fmt};

/// Converts a text into a fixed-length embeddings vector
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embeddings, EmbedderError>;
}

#[derive(thiserror::Error)]
pub enum EmbedderError {
    #[error("Embeddings request failed: {0}")]
    RequestError(String),

    #[error("Invalid embeddings response: {0}")]
    InvalidResponse(String),

    #[error("Embeddings model error: {0}")]
    ModelError(String),
}

impl std::fmt::Debug for EmbedderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
