//! Text-to-speech and speech-to-text.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use std::fmt;

use crate::client::{Client, ClientError};
use crate::http::{HttpRequest, MultipartForm};
use crate::model::Usage;
use crate::stream::EventStream;

const TRANSCRIPTIONS: &str = "audio/transcriptions";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Alloy,
    Ash,
    Ballad,
    Coral,
    Echo,
    Fable,
    Onyx,
    Nova,
    Sage,
    Shimmer,
    Verse,
}

/// Encoding of synthesized speech.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    Opus,
    Aac,
    Flac,
    Wav,
    Pcm,
}

/// Request body for `POST /audio/speech`.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct SpeechRequest {
    pub model: String,
    pub input: String,
    pub voice: Voice,
    pub response_format: Option<AudioFormat>,
    /// Playback speed between 0.25 and 4.0
    pub speed: Option<f32>,
    /// Tone and delivery guidance, for `gpt-4o-mini-tts`
    pub instructions: Option<String>,
}

impl SpeechRequest {
    pub fn new(model: impl Into<String>, input: impl Into<String>, voice: Voice) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            voice,
            response_format: None,
            speed: None,
            instructions: None,
        }
    }

    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}

/// Output format of a transcription.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptionFormat {
    #[default]
    Json,
    Text,
    Srt,
    VerboseJson,
    Vtt,
}

impl TranscriptionFormat {
    fn as_str(self) -> &'static str {
        match self {
            TranscriptionFormat::Json => "json",
            TranscriptionFormat::Text => "text",
            TranscriptionFormat::Srt => "srt",
            TranscriptionFormat::VerboseJson => "verbose_json",
            TranscriptionFormat::Vtt => "vtt",
        }
    }

    fn is_json(self) -> bool {
        matches!(self, TranscriptionFormat::Json | TranscriptionFormat::VerboseJson)
    }
}

impl fmt::Display for TranscriptionFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multipart request for `POST /audio/transcriptions`.
#[derive(Debug, Clone)]
pub struct TranscriptionRequest {
    pub file: Bytes,
    /// File name sent with the upload; its extension tells the API the audio format
    pub file_name: String,
    pub model: String,
    /// ISO-639-1 language of the audio
    pub language: Option<String>,
    pub prompt: Option<String>,
    pub response_format: Option<TranscriptionFormat>,
    pub temperature: Option<f32>,
}

impl TranscriptionRequest {
    pub fn new(file: impl Into<Bytes>, file_name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            file_name: file_name.into(),
            model: model.into(),
            language: None,
            prompt: None,
            response_format: None,
            temperature: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_format(mut self, format: TranscriptionFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn into_form(self, stream: bool) -> MultipartForm {
        let mime_type = mime_for(&self.file_name);
        let form = MultipartForm::new()
            .text("model", self.model)
            .text_opt("language", self.language)
            .text_opt("prompt", self.prompt)
            .text_opt("response_format", self.response_format)
            .text_opt("temperature", self.temperature);
        let form = if stream { form.text("stream", "true") } else { form };
        form.file("file", self.file_name, mime_type, self.file)
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "mp3" | "mpga" | "mpeg" => "audio/mpeg",
        "mp4" | "m4a" => "audio/mp4",
        "wav" => "audio/wav",
        "webm" => "audio/webm",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        _ => "application/octet-stream",
    }
}

/// Result of a transcription.
///
/// For `text`, `srt` and `vtt` formats only `text` is populated, holding the
/// body as returned.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Transcription {
    pub text: String,
    pub language: Option<String>,
    pub duration: Option<f64>,
    /// Present for `verbose_json`
    pub segments: Option<Vec<Value>>,
}

/// One event of a streamed transcription.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum TranscriptionEvent {
    #[serde(rename = "transcript.text.delta")]
    TextDelta { delta: String },
    #[serde(rename = "transcript.text.done")]
    TextDone {
        text: String,
        #[serde(default)]
        usage: Option<TranscriptionUsage>,
    },
    /// An event type this version does not know about
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptionUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

impl From<TranscriptionUsage> for Usage {
    fn from(u: TranscriptionUsage) -> Self {
        Usage {
            prompt_tokens: u.input_tokens,
            completion_tokens: Some(u.output_tokens),
            total_tokens: u.total_tokens,
        }
    }
}

impl Client {
    /// Synthesize speech, returning the encoded audio.
    pub async fn create_speech(&self, request: SpeechRequest) -> Result<Bytes, ClientError> {
        if request.input.is_empty() {
            return Err(ClientError::Config("Speech input must not be empty".to_string()));
        }
        self.send(HttpRequest::post_json("audio/speech", &request)?)
            .await
    }

    /// Transcribe audio into text.
    pub async fn create_transcription(
        &self,
        request: TranscriptionRequest,
    ) -> Result<Transcription, ClientError> {
        let format = request.response_format.unwrap_or_default();
        let request = HttpRequest::post_multipart(TRANSCRIPTIONS, request.into_form(false));
        if format.is_json() {
            self.send_json(request).await
        } else {
            let body = self.send(request).await?;
            Ok(Transcription {
                text: String::from_utf8_lossy(&body).into_owned(),
                ..Transcription::default()
            })
        }
    }

    /// Transcribe audio, receiving text as it is recognized.
    ///
    /// Supported by the `gpt-4o-transcribe` model family.
    pub async fn create_transcription_stream(
        &self,
        request: TranscriptionRequest,
    ) -> Result<EventStream<TranscriptionEvent>, ClientError> {
        self.send_stream(HttpRequest::post_multipart(
            TRANSCRIPTIONS,
            request.into_form(true),
        ))
        .await
    }
}
