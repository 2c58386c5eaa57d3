use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::{
    domain::entities::content_point::Embeddings,
    ports::embedder::{Embedder, EmbedderError},
};

/// Embedder calling a text-embeddings-inference compatible HTTP server.
///
/// `POST {base_url}/embed` with `{"inputs": "..."}` answers with a list of embeddings,
/// one per input.
pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a str,
}

impl HttpEmbedder {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn embed_url(&self) -> String {
        format!("{}/embed", self.base_url)
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    #[tracing::instrument(name = "Requesting embeddings", skip(self, text), fields(text_len = text.len()))]
    async fn embed(&self, text: &str) -> Result<Embeddings, EmbedderError> {
        let response = self
            .client
            .post(self.embed_url())
            .json(&EmbedRequest { inputs: text })
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| EmbedderError::RequestError(e.to_string()))?;

        let embeddings_list: Vec<Embeddings> = response
            .json()
            .await
            .map_err(|e| EmbedderError::InvalidResponse(e.to_string()))?;

        let embeddings = embeddings_list
            .into_iter()
            .next()
            .ok_or_else(|| EmbedderError::InvalidResponse("no embeddings returned".into()))?;

        debug!(dimensions = embeddings.len(), "Received embeddings");
        Ok(embeddings)
    }
}
