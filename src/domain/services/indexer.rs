use std::sync::Arc;

use tracing::{error, info, warn};

use crate::{
    configuration::IndexerSettings,
    domain::{
        entities::{
            collection::CollectionConfig,
            content_point::{ContentPoint, ContentPointPayload},
            source_item::SourceItem,
        },
        services::helpers::{chunk, InvalidChunkSizeError},
    },
    helper::error_chain_fmt,
    ports::{
        collection_repository::{CollectionRepository, CollectionRepositoryError},
        embedder::{Embedder, EmbedderError},
        point_repository::{PointRepository, PointRepositoryError},
        sleeper::Sleeper,
        source_processor::{SourceProcessor, SourceProcessorError},
    },
};

/// Indexes source items into a vector collection for retrieval-augmented generation.
///
/// Orchestrates: processing the source items, generating their embeddings,
/// and upserting the resulting points in batches into the collection.
/// Everything runs one step at a time, so point ids always follow the source order.
pub struct Indexer {
    source_processor: Arc<dyn SourceProcessor>,
    embedder: Arc<dyn Embedder>,
    collection_repository: Arc<dyn CollectionRepository>,
    point_repository: Arc<dyn PointRepository>,
    sleeper: Arc<dyn Sleeper>,
    settings: IndexerSettings,
}

impl Indexer {
    pub fn new(
        source_processor: Arc<dyn SourceProcessor>,
        embedder: Arc<dyn Embedder>,
        collection_repository: Arc<dyn CollectionRepository>,
        point_repository: Arc<dyn PointRepository>,
        sleeper: Arc<dyn Sleeper>,
        settings: IndexerSettings,
    ) -> Self {
        Self {
            source_processor,
            embedder,
            collection_repository,
            point_repository,
            sleeper,
            settings,
        }
    }

    /// Rebuilds the collection from scratch and populates it.
    ///
    /// Any existing collection with the same name is deleted first, even if the population
    /// fails afterwards. Nothing is rolled back on failure.
    #[tracing::instrument(name = "Initializing collection", skip(self), fields(collection_name = %self.settings.collection_name))]
    pub async fn init(&self) -> Result<(), IndexerError> {
        let collection_name = self.settings.collection_name.as_str();
        info!("Initializing collection: {}", collection_name);

        if self
            .collection_repository
            .collection_exists(collection_name)
            .await?
        {
            info!("Deleting existing collection: {}", collection_name);
            self.collection_repository
                .delete_collection(collection_name)
                .await?;
        }

        self.collection_repository
            .create_collection(
                collection_name,
                CollectionConfig {
                    vector_size: self.settings.vector_size,
                    distance: self.settings.distance,
                },
            )
            .await?;

        self.populate(collection_name).await?;

        info!("Collection {} initialized and populated", collection_name);
        Ok(())
    }

    /// Indexes the current source snapshot into an already created collection.
    ///
    /// Stops at the first batch that could not be uploaded, the previous batches stay in the collection.
    #[tracing::instrument(name = "Populating collection", skip(self))]
    pub async fn populate(&self, collection_name: &str) -> Result<(), IndexerError> {
        info!("Starting population of collection: {}", collection_name);

        let source_items = self.source_processor.process()?;
        let points = self.generate_points(&source_items).await?;
        let batches = chunk(&points, self.settings.batch_size)?;

        for (batch_index, batch) in batches.iter().enumerate() {
            self.upsert_with_retry(
                collection_name,
                batch,
                batch_index,
                batches.len(),
                points.len(),
            )
            .await?;
        }

        info!("Population complete for collection: {}", collection_name);
        Ok(())
    }

    /// Generates one point per source item, in order, with the item position as id.
    ///
    /// The embeddings are requested one after the other.
    #[tracing::instrument(name = "Generating points", skip_all, fields(nb_items = source_items.len()))]
    pub async fn generate_points(
        &self,
        source_items: &[SourceItem],
    ) -> Result<Vec<ContentPoint>, IndexerError> {
        let mut points = Vec::with_capacity(source_items.len());

        for (index, source_item) in source_items.iter().enumerate() {
            let vector = self.embedder.embed(&source_item.content).await?;

            points.push(ContentPoint {
                id: index as u64,
                vector,
                payload: ContentPointPayload::from(source_item),
            });
        }

        Ok(points)
    }

    /// Upserts one batch of points, retrying the whole batch on failure.
    ///
    /// Waits a fixed `retry_delay_ms` between attempts, up to `max_attempts` attempts.
    #[tracing::instrument(name = "Uploading batch", skip(self, batch), fields(batch_len = batch.len()))]
    pub async fn upsert_with_retry(
        &self,
        collection_name: &str,
        batch: &[ContentPoint],
        batch_index: usize,
        total_batches: usize,
        total_points: usize,
    ) -> Result<(), IndexerError> {
        let max_attempts = self.settings.max_attempts;
        let mut attempts = 0;

        loop {
            let error = match self.point_repository.upsert(collection_name, batch).await {
                Ok(()) => {
                    let (start_index, end_index) = self.batch_range(batch_index, total_points);
                    info!(
                        "Batch upload {}/{}: {} - {}",
                        batch_index + 1,
                        total_batches,
                        start_index,
                        end_index
                    );
                    return Ok(());
                }
                Err(error) => error,
            };

            attempts += 1;

            if attempts >= max_attempts {
                error!(
                    ?error,
                    "Batch {}/{} failed after {} attempts",
                    batch_index + 1,
                    total_batches,
                    attempts
                );
                return Err(IndexerError::BatchUploadFailed {
                    batch_number: batch_index + 1,
                    total_batches,
                    attempts,
                    source: error,
                });
            }

            warn!(
                %error,
                "Batch {} failed (attempt {}/{}), retrying in {}ms...",
                batch_index + 1,
                attempts,
                max_attempts,
                self.settings.retry_delay_ms
            );
            self.sleeper.sleep(self.settings.retry_delay()).await;
        }
    }

    /// Global indexes of the first and last points covered by a batch
    fn batch_range(&self, batch_index: usize, total_points: usize) -> (usize, usize) {
        let batch_size = self.settings.batch_size;
        let start_index = batch_index * batch_size;
        let end_index = ((batch_index + 1) * batch_size)
            .min(total_points)
            .saturating_sub(1);

        (start_index, end_index)
    }
}

#[derive(thiserror::Error)]
pub enum IndexerError {
    #[error(transparent)]
    InvalidChunkSize(#[from] InvalidChunkSizeError),

    #[error(transparent)]
    SourceProcessorError(#[from] SourceProcessorError),

    #[error(transparent)]
    EmbedderError(#[from] EmbedderError),

    #[error(transparent)]
    CollectionRepositoryError(#[from] CollectionRepositoryError),

    #[error("Failed to upload batch {batch_number}/{total_batches} after {attempts} attempts: {source}")]
    BatchUploadFailed {
        batch_number: usize,
        total_batches: usize,
        attempts: usize,
        #[source]
        source: PointRepositoryError,
    },
}

impl std::fmt::Debug for IndexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
