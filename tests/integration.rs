//! Integration tests for the reqwest transport using wiremock.

use futures::{StreamExt, TryStreamExt};
use nonempty::nonempty;
use oaikit::api::{
    ChatAccumulator, ChatCompletionChunk, ChatMessage, ChatRequest, SpeechRequest,
    TranscriptionEvent, TranscriptionRequest, Voice,
};
use oaikit::options::ClientOptions;
use oaikit::{Client, ClientError, DecodeFailure};
use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Client {
    let options = ClientOptions::new("test-api-key")
        .with_base_url(format!("{}/v1", server.uri()))
        .with_organization("org-abc123")
        .with_header("X-Trace", "t-1");
    Client::new(options).unwrap()
}

fn chat_request() -> ChatRequest {
    ChatRequest::new("gpt-4o", nonempty![ChatMessage::user("Hello")])
}

fn sse(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream")
}

#[tokio::test]
async fn sends_auth_and_extra_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/models"))
        .and(header("authorization", "Bearer test-api-key"))
        .and(header("openai-organization", "org-abc123"))
        .and(header("x-trace", "t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "list",
            "data": [{"id": "gpt-4o", "object": "model", "created": 1, "owned_by": "system"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let models = client_for(&server).list_models().await.unwrap();
    assert_eq!(models.data[0].id, "gpt-4o");
}

#[tokio::test]
async fn retrieves_model_with_slash_in_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/models/org%2Fmodel-7b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "org/model-7b", "object": "model", "created": 1, "owned_by": "org"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let model = client_for(&server).retrieve_model("org/model-7b").await.unwrap();
    assert_eq!(model.owned_by, "org");
}

#[tokio::test]
async fn chat_completion_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o",
            "messages": [{"role": "user", "content": "Hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-abc123",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "gpt-4o-2024-08-06",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello! How can I help you today?"},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 10, "total_tokens": 22}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let completion = client_for(&server)
        .create_chat_completion(chat_request())
        .await
        .unwrap();
    assert_eq!(completion.id, "chatcmpl-abc123");
    assert_eq!(completion.text(), Some("Hello! How can I help you today?"));
    assert_eq!(completion.usage.unwrap().completion_tokens, Some(10));
}

#[tokio::test]
async fn api_error_is_classified() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "error": {
                "message": "Incorrect API key provided",
                "type": "invalid_request_error",
                "param": null,
                "code": "invalid_api_key"
            }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .create_chat_completion(chat_request())
        .await
        .unwrap_err();
    match err {
        ClientError::Api {
            status, message, code, ..
        } => {
            assert_eq!(status, Some(401));
            assert_eq!(message, "Incorrect API key provided");
            assert_eq!(code.as_deref(), Some("invalid_api_key"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn streams_chat_completion() {
    let server = MockServer::start().await;

    let body = concat!(
        "data: {\"id\":\"c1\",\"object\":\"chat.completion.chunk\",\"created\":1,\"model\":\"gpt-4o\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"\"},\"finish_reason\":null}]}\n\n",
        ": keep-alive\n\n",
        "data: {\"id\":\"c1\",\"object\":\"chat.completion.chunk\",\"created\":1,\"model\":\"gpt-4o\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hi\"},\"finish_reason\":null}]}\n\n",
        "data: {\"id\":\"c1\",\"object\":\"chat.completion.chunk\",\"created\":1,\"model\":\"gpt-4o\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\" there\"},\"finish_reason\":\"stop\"}]}\n\n",
        "data: [DONE]\n\n",
    );

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(serde_json::json!({"stream": true})))
        .respond_with(sse(body))
        .expect(1)
        .mount(&server)
        .await;

    let stream = client_for(&server)
        .create_chat_completion_stream(chat_request())
        .await
        .unwrap();
    let chunks: Vec<ChatCompletionChunk> = stream.try_collect().await.unwrap();
    assert_eq!(chunks.len(), 3);

    let mut accumulator = ChatAccumulator::new();
    for chunk in &chunks {
        accumulator.push(chunk);
    }
    assert_eq!(accumulator.content(), "Hi there");
}

#[tokio::test]
async fn truncated_stream_ends_with_framing_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(sse(
            "data: {\"id\":\"c1\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Hi\"}}]}\n\ndata: {\"id\":\"c1\",\"cho",
        ))
        .mount(&server)
        .await;

    let mut stream = client_for(&server)
        .create_chat_completion_stream(chat_request())
        .await
        .unwrap();

    assert!(stream.next().await.unwrap().is_ok());
    match stream.next().await {
        Some(Err(ClientError::Decode(DecodeFailure::Framing { raw }))) => {
            assert_eq!(raw.as_ref(), b"data: {\"id\":\"c1\",\"cho");
        }
        other => panic!("expected framing failure, got {other:?}"),
    }
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn streaming_error_status_is_reported_before_streaming() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": {"message": "Rate limit reached", "type": "requests", "code": "rate_limit_exceeded"}
        })))
        .mount(&server)
        .await;

    let result = client_for(&server)
        .create_chat_completion_stream(chat_request())
        .await;
    assert!(matches!(
        result,
        Err(ClientError::Api { status: Some(429), .. })
    ));
}

#[tokio::test]
async fn speech_returns_audio_bytes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/audio/speech"))
        .and(body_partial_json(serde_json::json!({"voice": "alloy", "input": "Hi"})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0xFF, 0xFB, 0x90], "audio/mpeg"))
        .expect(1)
        .mount(&server)
        .await;

    let audio = client_for(&server)
        .create_speech(SpeechRequest::new("tts-1", "Hi", Voice::Alloy))
        .await
        .unwrap();
    assert_eq!(audio.as_ref(), &[0xFF, 0xFB, 0x90]);
}

#[tokio::test]
async fn transcription_uploads_multipart_form() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .and(body_string_contains("name=\"model\""))
        .and(body_string_contains("whisper-1"))
        .and(body_string_contains("filename=\"clip.wav\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "hello"})))
        .expect(1)
        .mount(&server)
        .await;

    let request = TranscriptionRequest::new(b"RIFF0000WAVE".to_vec(), "clip.wav", "whisper-1");
    let transcription = client_for(&server)
        .create_transcription(request)
        .await
        .unwrap();
    assert_eq!(transcription.text, "hello");
}

#[tokio::test]
async fn transcription_stream_yields_deltas() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/audio/transcriptions"))
        .and(body_string_contains("name=\"stream\""))
        .respond_with(sse(concat!(
            "data: {\"type\":\"transcript.text.delta\",\"delta\":\"Good \"}\n\n",
            "data: {\"type\":\"transcript.text.delta\",\"delta\":\"morning\"}\n\n",
            "data: {\"type\":\"transcript.text.done\",\"text\":\"Good morning\"}\n\n",
        )))
        .mount(&server)
        .await;

    let request = TranscriptionRequest::new(b"fake".to_vec(), "clip.mp3", "gpt-4o-transcribe");
    let events: Vec<TranscriptionEvent> = client_for(&server)
        .create_transcription_stream(request)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    let text: String = events
        .iter()
        .filter_map(|event| match event {
            TranscriptionEvent::TextDelta { delta } => Some(delta.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(text, "Good morning");
    assert!(matches!(
        events.last(),
        Some(TranscriptionEvent::TextDone { text, .. }) if text == "Good morning"
    ));
}

#[tokio::test]
async fn connection_failure_is_http_error() {
    let options = ClientOptions::new("k").with_base_url("http://127.0.0.1:9/v1");
    let result = Client::new(options).unwrap().list_models().await;
    assert!(matches!(result, Err(ClientError::Http(_))));
}
