//! Client composition root and error types.

use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::http::{HttpRequest, ReqwestTransport, Transport};
use crate::options::ClientOptions;
use crate::sse::DecodeFailure;
use crate::stream::{decode_event_stream, EventStream};

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("API error{}: {message}", format_status(.status))]
    Api {
        status: Option<u16>,
        message: String,
        kind: Option<String>,
        code: Option<String>,
    },

    #[error(transparent)]
    Decode(#[from] DecodeFailure),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// HTTP status of an API error, if the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => *status,
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn format_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

/// The `{"error": {...}}` body the API sends on failure.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    code: Option<Value>,
}

impl ApiErrorEnvelope {
    pub(crate) fn into_error(self, status: Option<u16>) -> ClientError {
        let code = match self.error.code {
            Some(Value::String(code)) => Some(code),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        };
        ClientError::Api {
            status,
            message: self.error.message,
            kind: self.error.kind,
            code,
        }
    }
}

/// Map a non-success response to an error.
pub(crate) fn handle_error_response(status: StatusCode, body: &[u8]) -> ClientError {
    warn!(status = status.as_u16(), "API request failed");
    match serde_json::from_slice::<ApiErrorEnvelope>(body) {
        Ok(envelope) => envelope.into_error(Some(status.as_u16())),
        Err(_) => {
            let text = String::from_utf8_lossy(body).trim().to_string();
            let message = if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                text
            };
            ClientError::Api {
                status: Some(status.as_u16()),
                message,
                kind: None,
                code: None,
            }
        }
    }
}

/// Typed client for the API.
///
/// Each endpoint lives in its own module under [`crate::api`] as a set of
/// `Client` methods. The client is cheap to clone; clones share a transport.
///
/// # Example
/// ```no_run
/// use oaikit::Client;
///
/// # async fn run() -> Result<(), oaikit::ClientError> {
/// let client = Client::from_env()?;
/// for model in client.list_models().await?.data {
///     println!("{}", model.id);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client backed by `reqwest`.
    pub fn new(options: ClientOptions) -> Result<Self, ClientError> {
        Ok(Self::with_transport(ReqwestTransport::new(options)?))
    }

    /// Create a client configured from environment variables.
    ///
    /// See [`ClientOptions::from_env`].
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientOptions::from_env()?)
    }

    /// Create a client on top of any transport.
    pub fn with_transport<T: Transport + 'static>(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Execute a buffered request and return the raw body of a successful response.
    pub(crate) async fn send(&self, request: HttpRequest) -> Result<Bytes, ClientError> {
        debug!(method = %request.method, path = %request.path, "sending request");
        let response = self.transport.execute(request).await?;
        if !response.status.is_success() {
            return Err(handle_error_response(response.status, &response.body));
        }
        Ok(response.body)
    }

    /// Execute a buffered request and decode a JSON response.
    pub(crate) async fn send_json<R: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<R, ClientError> {
        let body = self.send(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Execute a streaming request and decode its body as SSE events.
    pub(crate) async fn send_stream<T>(
        &self,
        request: HttpRequest,
    ) -> Result<EventStream<T>, ClientError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        debug!(method = %request.method, path = %request.path, "opening stream");
        let response = self.transport.execute_streaming(request).await?;
        if !response.status.is_success() {
            let chunks: Vec<Bytes> = response.body.try_collect().await?;
            return Err(handle_error_response(response.status, &chunks.concat()));
        }
        Ok(decode_event_stream(response.body))
    }
}
