//! Model listing.

use serde::{Deserialize, Serialize};

use crate::client::{Client, ClientError};
use crate::http::HttpRequest;

/// A model that can be used with the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Model {
    pub id: String,
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub owned_by: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelList {
    pub data: Vec<Model>,
}

impl Client {
    /// List the models available to the API key.
    pub async fn list_models(&self) -> Result<ModelList, ClientError> {
        self.send_json(HttpRequest::get("models")).await
    }

    /// Fetch a single model by id.
    ///
    /// The id is sent as one path segment, so ids containing `/` or `?` are
    /// percent-encoded.
    pub async fn retrieve_model(&self, id: &str) -> Result<Model, ClientError> {
        if id.is_empty() {
            return Err(ClientError::Config("Model id must not be empty".to_string()));
        }
        self.send_json(HttpRequest::get(format!("models/{}", urlencoding::encode(id)))).await
    }
}
