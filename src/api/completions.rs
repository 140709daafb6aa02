//! Legacy text Completions API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

use crate::client::{Client, ClientError};
use crate::http::HttpRequest;
use crate::model::{FinishReason, Usage};
use crate::stream::EventStream;

const ENDPOINT: &str = "completions";

/// Request body for `POST /completions`.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub suffix: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub n: Option<u32>,
    pub stop: Option<Vec<String>>,
    pub echo: Option<bool>,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub best_of: Option<u32>,
    pub seed: Option<i64>,
    pub user: Option<String>,
    stream: Option<bool>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            suffix: None,
            max_tokens: None,
            temperature: None,
            top_p: None,
            n: None,
            stop: None,
            echo: None,
            presence_penalty: None,
            frequency_penalty: None,
            best_of: None,
            seed: None,
            user: None,
            stream: None,
        }
    }

    /// Set maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }
}

/// Response of `POST /completions`, and each event of its stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<CompletionChoice>,
    pub usage: Option<Usage>,
}

impl Completion {
    /// Text of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices.first().map(|choice| choice.text.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
    #[serde(default)]
    pub index: u32,
    pub finish_reason: Option<FinishReason>,
    pub logprobs: Option<Value>,
}

impl Client {
    /// Create a text completion.
    pub async fn create_completion(
        &self,
        mut request: CompletionRequest,
    ) -> Result<Completion, ClientError> {
        request.stream = None;
        self.send_json(HttpRequest::post_json(ENDPOINT, &request)?).await
    }

    /// Create a text completion, receiving partial completions as they are generated.
    pub async fn create_completion_stream(
        &self,
        mut request: CompletionRequest,
    ) -> Result<EventStream<Completion>, ClientError> {
        request.stream = Some(true);
        self.send_stream(HttpRequest::post_json(ENDPOINT, &request)?).await
    }
}
