pub mod collection_repository;
pub mod embedder;
pub mod point_repository;
pub mod sleeper;
pub mod source_processor;
