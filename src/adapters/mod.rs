pub mod file_source_processor;
pub mod http_embedder;
#[cfg(feature = "huggingface")]
pub mod huggingface_embedder;
pub mod tokio_sleeper;
