//! # oaikit - typed client for OpenAI-compatible APIs
//!
//! A small, pragmatic async client covering model listing, text and chat
//! completions, image generation, embeddings, moderation, text-to-speech and
//! speech-to-text.
//!
//! ## Features
//! - Async-first, tokio compatible
//! - Streaming chat, completion and transcription via Server-Sent Events
//! - Type-safe request/response models
//! - Pluggable transport, `reqwest` by default
//!
//! ## Architecture
//!
//! - **`Client`**: one method per API operation, defined next to the types of
//!   each endpoint in [`api`]
//! - **`Transport`**: executes plain [`http::HttpRequest`] values; swap it out
//!   with [`Client::with_transport`]
//! - **Streaming**: [`sse`] splits the byte stream into frames and
//!   [`stream`] drives decoding into typed events
//!
//! ## Example
//! ```no_run
//! use futures::StreamExt;
//! use nonempty::nonempty;
//! use oaikit::api::{ChatMessage, ChatRequest};
//! use oaikit::options::ClientOptions;
//! use oaikit::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(ClientOptions::new("your-api-key"))?;
//!
//!     let request = ChatRequest::new("gpt-4o-mini", nonempty![ChatMessage::user("Hello!")]);
//!     let mut stream = client.create_chat_completion_stream(request).await?;
//!
//!     while let Some(chunk) = stream.next().await {
//!         for choice in chunk?.choices {
//!             print!("{}", choice.delta.content.unwrap_or_default());
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod client;
pub mod http;
pub mod model;
pub mod options;
pub mod sse;
pub mod stream;

// Re-exports for convenience
pub use client::{Client, ClientError};
pub use http::Transport;
pub use model::{FinishReason, Usage};
pub use options::ClientOptions;
pub use sse::DecodeFailure;
pub use stream::EventStream;
