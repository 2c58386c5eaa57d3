use async_trait::async_trait;

use crate::{domain::entities::collection::CollectionConfig, helper::error_chain_fmt};

/// Manages the existence of named vector collections
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    async fn collection_exists(&self, name: &str) -> Result<bool, CollectionRepositoryError>;

    async fn delete_collection(&self, name: &str) -> Result<(), CollectionRepositoryError>;

    async fn create_collection(
        &self,
        name: &str,
        config: CollectionConfig,
    ) -> Result<(), CollectionRepositoryError>;
}

#[derive(thiserror::Error)]
pub enum CollectionRepositoryError {
    #[error("Error from vector store: {0}")]
    StoreError(String),
}

impl std::fmt::Debug for CollectionRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
