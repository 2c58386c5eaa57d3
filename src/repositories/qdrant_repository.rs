use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::{
    prelude::QdrantClient,
    qdrant::{
        self, vectors_config::Config, CreateCollection, PointStruct, VectorParams, VectorsConfig,
    },
};
use tracing::info;

use crate::{
    domain::entities::{
        collection::{CollectionConfig, Distance},
        content_point::{ContentPoint, ContentPointPayload},
    },
    ports::{
        collection_repository::{CollectionRepository, CollectionRepositoryError},
        point_repository::{PointRepository, PointRepositoryError},
    },
};

/// Repository for collections and content points persisted in Qdrant
///
/// The same client serves both ports: the collection management and the point storage.
pub struct QdrantRepository {
    client: QdrantClient,
}

impl QdrantRepository {
    pub fn new(client: QdrantClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CollectionRepository for QdrantRepository {
    #[tracing::instrument(name = "Checking Qdrant collection existence", skip(self))]
    async fn collection_exists(&self, name: &str) -> Result<bool, CollectionRepositoryError> {
        // Qdrant client only returns anyhow errors for now
        self.client
            .has_collection(name)
            .await
            .map_err(|e| CollectionRepositoryError::StoreError(e.to_string()))
    }

    #[tracing::instrument(name = "Deleting Qdrant collection", skip(self))]
    async fn delete_collection(&self, name: &str) -> Result<(), CollectionRepositoryError> {
        self.client
            .delete_collection(name)
            .await
            .map_err(|e| CollectionRepositoryError::StoreError(e.to_string()))?;

        Ok(())
    }

    #[tracing::instrument(name = "Creating Qdrant collection", skip(self))]
    async fn create_collection(
        &self,
        name: &str,
        config: CollectionConfig,
    ) -> Result<(), CollectionRepositoryError> {
        self.client
            .create_collection(&CreateCollection {
                collection_name: name.to_string(),
                vectors_config: Some(VectorsConfig {
                    config: Some(Config::Params(VectorParams {
                        size: config.vector_size,
                        distance: qdrant::Distance::from(config.distance) as i32,
                        ..Default::default()
                    })),
                }),
                ..Default::default()
            })
            .await
            .map_err(|e| CollectionRepositoryError::StoreError(e.to_string()))?;

        info!("Created collection {}", name);
        Ok(())
    }
}

#[async_trait]
impl PointRepository for QdrantRepository {
    #[tracing::instrument(name = "Saving content points to Qdrant", skip(self, points), fields(nb_points = points.len()))]
    async fn upsert(
        &self,
        collection_name: &str,
        points: &[ContentPoint],
    ) -> Result<(), PointRepositoryError> {
        self.client
            .upsert_points(
                collection_name,
                points.iter().cloned().map(PointStruct::from).collect(),
                None,
            )
            .await
            .map_err(|e| PointRepositoryError::StoreError(e.to_string()))?;

        Ok(())
    }
}

impl From<Distance> for qdrant::Distance {
    fn from(distance: Distance) -> Self {
        match distance {
            Distance::Cosine => qdrant::Distance::Cosine,
            Distance::Dot => qdrant::Distance::Dot,
            Distance::Euclid => qdrant::Distance::Euclid,
        }
    }
}

impl From<ContentPoint> for PointStruct {
    fn from(content_point: ContentPoint) -> Self {
        Self {
            id: Some(content_point.id.into()),
            vectors: Some(content_point.vector.into()),
            payload: content_point.payload.into(),
        }
    }
}

/// Keys are the ones read by the retrieval side
impl From<ContentPointPayload> for HashMap<String, qdrant::Value> {
    fn from(payload: ContentPointPayload) -> Self {
        HashMap::from([
            ("content".into(), qdrant::Value::from(payload.content)),
            (
                "contentType".into(),
                qdrant::Value::from(payload.content_type.as_number()),
            ),
            (
                "sourceType".into(),
                qdrant::Value::from(payload.source_type.as_number()),
            ),
            (
                "sourceLocation".into(),
                qdrant::Value::from(payload.source_location),
            ),
        ])
    }
}
