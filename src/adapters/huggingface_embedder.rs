use std::{
    sync::mpsc,
    thread::{self, JoinHandle},
};

use async_trait::async_trait;
use rust_bert::{
    pipelines::sentence_embeddings::{SentenceEmbeddingsBuilder, SentenceEmbeddingsModelType},
    RustBertError,
};
use tokio::{sync::oneshot, task};
use tracing::{error, info};

use crate::{
    domain::entities::content_point::Embeddings,
    ports::embedder::{Embedder, EmbedderError},
};

/// Generates embeddings locally, using models available from Hugging Face.
///
/// Currently using all-MiniLM-L12-v2: maps texts to a 384 dimensional dense vector space
pub struct HuggingFaceEmbedder {
    sender_to_runner: mpsc::SyncSender<RunnerMessage>,
    _thread_handle: JoinHandle<Result<(), RustBertError>>,
}

impl HuggingFaceEmbedder {
    /// Spawns the model runner on a separate thread
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::sync_channel(100);
        let handle = thread::spawn(move || Self::runner(receiver));

        Self {
            _thread_handle: handle,
            sender_to_runner: sender,
        }
    }

    /// The model runner itself
    ///
    /// Running the model inside a future would block the async runtime,
    /// so it lives on its own thread and receives the texts through a channel,
    /// each with a oneshot sender for the result.
    #[tracing::instrument(name = "Embeddings runner", skip(receiver))]
    fn runner(receiver: mpsc::Receiver<RunnerMessage>) -> Result<(), RustBertError> {
        let model = SentenceEmbeddingsBuilder::remote(SentenceEmbeddingsModelType::AllMiniLmL12V2)
            .create_model()
            .map_err(|error| {
                error!(?error, "Failed to load embeddings model");
                error
            })?;
        info!("Embeddings model loaded");

        while let Ok((text, sender)) = receiver.recv() {
            let result = model
                .encode(&[text.as_str()])
                .map_err(|e| e.to_string())
                .and_then(|embeddings_list| {
                    embeddings_list
                        .into_iter()
                        .next()
                        .ok_or_else(|| "no embeddings generated".to_string())
                });

            // The requester may have given up waiting
            let _ = sender.send(result);
        }

        Ok(())
    }
}

impl Default for HuggingFaceEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for HuggingFaceEmbedder {
    #[tracing::instrument(name = "Generating embeddings", skip(self, text), fields(text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Embeddings, EmbedderError> {
        let (sender, receiver) = oneshot::channel();

        task::block_in_place(|| self.sender_to_runner.send((text.to_string(), sender)))
            .map_err(|_| EmbedderError::ModelError("embeddings runner stopped".into()))?;

        receiver
            .await
            .map_err(|_| EmbedderError::ModelError("embeddings runner stopped".into()))?
            .map_err(EmbedderError::ModelError)
    }
}

/// Message type for internal channel, passing around the input text and the generated embeddings
type RunnerMessage = (String, oneshot::Sender<Result<Embeddings, String>>);
