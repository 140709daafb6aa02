//! Chat Completions API.
//!
//! See: <https://platform.openai.com/docs/api-reference/chat>

use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, skip_serializing_none, DefaultOnNull};
use std::collections::BTreeMap;

use crate::client::{Client, ClientError};
use crate::http::HttpRequest;
use crate::model::{FinishReason, Usage};
use crate::stream::EventStream;

const ENDPOINT: &str = "chat/completions";

/// Role of the message author.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Developer,
    User,
    Assistant,
    Tool,
    /// A role this version does not know about
    #[serde(other)]
    Other,
}

/// Message content: plain text, or parts for multimodal input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        MessageContent::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        MessageContent::Text(text.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageUrl {
    /// An `https` URL or a `data:` URL with base64 image data
    pub url: String,
    /// `low`, `high` or `auto`
    pub detail: Option<String>,
}

/// A single message in a conversation.
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Option<MessageContent>,
    pub name: Option<String>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    pub tool_call_id: Option<String>,
    pub refusal: Option<String>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<MessageContent>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            name: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
            refusal: None,
        }
    }

    pub fn system(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<MessageContent>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// The result of a tool call, answering the call with id `tool_call_id`.
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<MessageContent>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new(Role::Tool, content)
        }
    }

    /// Text content, if the message has plain text content.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Some(MessageContent::Text(text)) => Some(text),
            _ => None,
        }
    }
}

/// A function tool the model may call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tool {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionDefinition,
}

impl Tool {
    pub fn function(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            kind: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: Some(description.into()),
                parameters,
            },
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: Option<String>,
    /// JSON schema of the arguments
    pub parameters: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    /// Arguments as a JSON encoded string, exactly as generated
    pub arguments: String,
}

impl FunctionCall {
    /// Parse the generated arguments.
    pub fn parse_arguments(&self) -> Result<Value, ClientError> {
        Ok(serde_json::from_str(&self.arguments)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

#[derive(Debug, Clone, Copy, Serialize)]
struct StreamOptions {
    include_usage: bool,
}

/// Request body for `POST /chat/completions`.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: NonEmpty<ChatMessage>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub n: Option<u32>,
    pub max_tokens: Option<u32>,
    /// Used instead of `max_tokens` by reasoning models
    pub max_completion_tokens: Option<u32>,
    pub stop: Option<Vec<String>>,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub seed: Option<i64>,
    pub user: Option<String>,
    pub tools: Option<Vec<Tool>>,
    pub tool_choice: Option<Value>,
    pub response_format: Option<ResponseFormat>,
    stream: Option<bool>,
    stream_options: Option<StreamOptions>,
    #[serde(skip)]
    include_stream_usage: bool,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: NonEmpty<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            top_p: None,
            n: None,
            max_tokens: None,
            max_completion_tokens: None,
            stop: None,
            presence_penalty: None,
            frequency_penalty: None,
            seed: None,
            user: None,
            tools: None,
            tool_choice: None,
            response_format: None,
            stream: None,
            stream_options: None,
            include_stream_usage: false,
        }
    }

    /// Set the temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set top-p sampling parameter.
    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Set maximum tokens to generate.
    ///
    /// Reasoning models (`o1`, `o3`, `o4` families) only accept
    /// `max_completion_tokens`, so the limit is sent under that name for them.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        if is_reasoning_model(&self.model) {
            self.max_tokens = None;
            self.max_completion_tokens = Some(max_tokens);
        } else {
            self.max_tokens = Some(max_tokens);
            self.max_completion_tokens = None;
        }
        self
    }

    pub fn with_stop(mut self, stop: Vec<String>) -> Self {
        self.stop = Some(stop);
        self
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Ask for a final usage chunk when streaming.
    pub fn with_stream_usage(mut self, include: bool) -> Self {
        self.include_stream_usage = include;
        self
    }

    fn streaming(mut self, stream: bool) -> Self {
        if stream {
            self.stream = Some(true);
            self.stream_options = self.include_stream_usage.then_some(StreamOptions {
                include_usage: true,
            });
        } else {
            self.stream = None;
            self.stream_options = None;
        }
        self
    }
}

fn is_reasoning_model(model: &str) -> bool {
    ["o1", "o3", "o4"].iter().any(|prefix| model.starts_with(prefix))
}

/// Response of `POST /chat/completions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletion {
    pub id: String,
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<ChatChoice>,
    pub usage: Option<Usage>,
    pub system_fingerprint: Option<String>,
}

impl ChatCompletion {
    /// Text of the first choice.
    pub fn text(&self) -> Option<&str> {
        self.choices.first().and_then(|choice| choice.message.text())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    pub message: ChatMessage,
    pub finish_reason: Option<FinishReason>,
}

/// One streamed increment of a chat completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<ChunkChoice>,
    /// Present on the final chunk when stream usage was requested
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: ChatDelta,
    pub finish_reason: Option<FinishReason>,
}

#[serde_as]
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChatDelta {
    pub role: Option<Role>,
    pub content: Option<String>,
    pub refusal: Option<String>,
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    pub tool_calls: Vec<ToolCallDelta>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCallDelta {
    pub index: u32,
    pub id: Option<String>,
    pub function: Option<FunctionCallDelta>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FunctionCallDelta {
    pub name: Option<String>,
    pub arguments: Option<String>,
}

/// Folds streamed chunks of one choice back into a complete message.
///
/// Content and tool call fragments are concatenated in arrival order; tool
/// calls are keyed by their stream index.
#[derive(Debug, Clone)]
pub struct ChatAccumulator {
    choice: u32,
    role: Option<Role>,
    content: String,
    refusal: Option<String>,
    tool_calls: BTreeMap<u32, ToolCall>,
    finish_reason: Option<FinishReason>,
    usage: Option<Usage>,
}

impl Default for ChatAccumulator {
    fn default() -> Self {
        Self::for_choice(0)
    }
}

impl ChatAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate the choice with the given index, ignoring the others.
    pub fn for_choice(choice: u32) -> Self {
        Self {
            choice,
            role: None,
            content: String::new(),
            refusal: None,
            tool_calls: BTreeMap::new(),
            finish_reason: None,
            usage: None,
        }
    }

    pub fn push(&mut self, chunk: &ChatCompletionChunk) {
        if let Some(usage) = chunk.usage {
            self.usage = Some(usage);
        }

        for choice in chunk.choices.iter().filter(|c| c.index == self.choice) {
            let delta = &choice.delta;
            if let Some(role) = delta.role {
                self.role = Some(role);
            }
            if let Some(content) = &delta.content {
                self.content.push_str(content);
            }
            if let Some(refusal) = &delta.refusal {
                self.refusal.get_or_insert_with(String::new).push_str(refusal);
            }

            for call in &delta.tool_calls {
                let entry = self.tool_calls.entry(call.index).or_insert_with(|| ToolCall {
                    id: String::new(),
                    kind: "function".to_string(),
                    function: FunctionCall {
                        name: String::new(),
                        arguments: String::new(),
                    },
                });
                if let Some(id) = &call.id {
                    entry.id.clone_from(id);
                }
                if let Some(function) = &call.function {
                    if let Some(name) = &function.name {
                        entry.function.name.push_str(name);
                    }
                    if let Some(arguments) = &function.arguments {
                        entry.function.arguments.push_str(arguments);
                    }
                }
            }

            if choice.finish_reason.is_some() {
                self.finish_reason = choice.finish_reason;
            }
        }
    }

    /// Text received so far.
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    pub fn usage(&self) -> Option<Usage> {
        self.usage
    }

    /// The assembled assistant message.
    pub fn into_message(self) -> ChatMessage {
        let has_tool_calls = !self.tool_calls.is_empty();
        ChatMessage {
            role: self.role.unwrap_or(Role::Assistant),
            content: if self.content.is_empty() && has_tool_calls {
                None
            } else {
                Some(MessageContent::Text(self.content))
            },
            name: None,
            tool_calls: self.tool_calls.into_values().collect(),
            tool_call_id: None,
            refusal: self.refusal,
        }
    }
}

impl Client {
    /// Create a chat completion.
    pub async fn create_chat_completion(
        &self,
        request: ChatRequest,
    ) -> Result<ChatCompletion, ClientError> {
        let body = request.streaming(false);
        self.send_json(HttpRequest::post_json(ENDPOINT, &body)?).await
    }

    /// Create a chat completion, receiving it as a stream of chunks.
    pub async fn create_chat_completion_stream(
        &self,
        request: ChatRequest,
    ) -> Result<EventStream<ChatCompletionChunk>, ClientError> {
        let body = request.streaming(true);
        self.send_stream(HttpRequest::post_json(ENDPOINT, &body)?).await
    }
}
