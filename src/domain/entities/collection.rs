use serde::Deserialize;

/// Distance metric of a vector collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum Distance {
    #[default]
    Cosine,
    Dot,
    Euclid,
}

/// Parameters used to create a vector collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionConfig {
    pub vector_size: u64,
    pub distance: Distance,
}
