//! Endpoint request/response types and the `Client` operations for them.

pub mod audio;
pub mod chat;
pub mod completions;
pub mod embeddings;
pub mod images;
pub mod models;
pub mod moderations;

// Re-export for convenience
pub use audio::{
    AudioFormat, SpeechRequest, Transcription, TranscriptionEvent, TranscriptionFormat,
    TranscriptionRequest, Voice,
};
pub use chat::{
    ChatAccumulator, ChatCompletion, ChatCompletionChunk, ChatMessage, ChatRequest, Role, Tool,
};
pub use completions::{Completion, CompletionRequest};
pub use embeddings::{EmbeddingRequest, EmbeddingResponse};
pub use images::{Image, ImageRequest, ImageSize, ImagesResponse};
pub use models::{Model, ModelList};
pub use moderations::{ModerationRequest, ModerationResponse};
