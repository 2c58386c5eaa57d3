use serde::{Deserialize, Serialize};

use super::source_item::{ContentType, SourceItem, SourceType};

pub type Embeddings = Vec<f32>;

/// A point written to the vector store.
///
/// `id` is the position of the originating `SourceItem` in the processed list,
/// not derived from its content.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ContentPoint {
    pub id: u64,
    pub payload: ContentPointPayload,
    pub vector: Embeddings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ContentPointPayload {
    pub content: String,
    pub content_type: ContentType,
    pub source_type: SourceType,
    pub source_location: String,
}

impl From<&SourceItem> for ContentPointPayload {
    fn from(source_item: &SourceItem) -> Self {
        Self {
            content: source_item.content.clone(),
            content_type: source_item.content_type,
            source_type: source_item.source_type,
            source_location: source_item.source_location.clone(),
        }
    }
}
