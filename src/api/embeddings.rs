//! Embeddings.

use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::client::{Client, ClientError};
use crate::http::HttpRequest;
use crate::model::Usage;

/// Request body for `POST /embeddings`.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest {
    pub model: String,
    /// Texts to embed, one vector is returned per entry
    pub input: NonEmpty<String>,
    /// Output dimensionality, supported by `text-embedding-3` models
    pub dimensions: Option<u32>,
    pub user: Option<String>,
}

impl EmbeddingRequest {
    pub fn new(model: impl Into<String>, input: NonEmpty<String>) -> Self {
        Self {
            model: model.into(),
            input,
            dimensions: None,
            user: None,
        }
    }

    /// Embed a single text.
    pub fn single(model: impl Into<String>, input: impl Into<String>) -> Self {
        Self::new(model, NonEmpty::new(input.into()))
    }

    pub fn with_dimensions(mut self, dimensions: u32) -> Self {
        self.dimensions = Some(dimensions);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    #[serde(default)]
    pub model: String,
    pub data: Vec<Embedding>,
    pub usage: Option<Usage>,
}

impl EmbeddingResponse {
    /// Vectors ordered by input position.
    pub fn into_vectors(mut self) -> Vec<Vec<f32>> {
        self.data.sort_by_key(|e| e.index);
        self.data.into_iter().map(|e| e.embedding).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Embedding {
    pub index: usize,
    pub embedding: Vec<f32>,
}

impl Client {
    /// Create embedding vectors for the given inputs.
    pub async fn create_embeddings(
        &self,
        request: EmbeddingRequest,
    ) -> Result<EmbeddingResponse, ClientError> {
        self.send_json(HttpRequest::post_json("embeddings", &request)?)
            .await
    }
}
