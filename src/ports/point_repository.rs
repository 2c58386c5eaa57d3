use async_trait::async_trait;

use crate::{domain::entities::content_point::ContentPoint, helper::error_chain_fmt};

/// Writes batches of points into a named collection
#[async_trait]
pub trait PointRepository: Send + Sync {
    async fn upsert(
        &self,
        collection_name: &str,
        points: &[ContentPoint],
    ) -> Result<(), PointRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum PointRepositoryError {
    #[error("Error from vector store: {0}")]
    StoreError(String),
}

impl std::fmt::Debug for PointRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
