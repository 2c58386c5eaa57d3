pub mod helpers;
pub mod indexer;
