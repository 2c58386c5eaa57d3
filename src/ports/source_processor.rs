use crate::{domain::entities::source_item::SourceItem, helper::error_chain_fmt};

/// Produces the ordered list of items to index
pub trait SourceProcessor: Send + Sync {
    fn process(&self) -> Result<Vec<SourceItem>, SourceProcessorError>;
}

#[derive(thiserror::Error)]
pub enum SourceProcessorError {
    #[error("Source root {0} is not a readable directory")]
    InvalidRoot(String),

    #[error("Failed to read source {location}")]
    ReadError {
        location: String,
        #[source]
        source: std::io::Error,
    },
}

impl std::fmt::Debug for SourceProcessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
