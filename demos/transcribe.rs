//! Audio transcription example.
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY="your-api-key"
//! cargo run --example transcribe -- path/to/audio.mp3
//! ```

use futures::StreamExt;
use oaikit::api::{TranscriptionEvent, TranscriptionRequest};
use oaikit::Client;
use std::io::Write;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: transcribe <audio file>")?;
    let file_name = Path::new(&path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("audio.mp3")
        .to_string();
    let audio = tokio::fs::read(&path).await?;

    let client = Client::from_env()?;

    println!("=== whisper-1 ===");
    let request = TranscriptionRequest::new(audio.clone(), file_name.clone(), "whisper-1");
    let transcription = client.create_transcription(request).await?;
    println!("{}", transcription.text);

    println!("\n=== gpt-4o-transcribe (streaming) ===");
    let request = TranscriptionRequest::new(audio, file_name, "gpt-4o-transcribe");
    let mut stream = client.create_transcription_stream(request).await?;

    while let Some(event) = stream.next().await {
        match event? {
            TranscriptionEvent::TextDelta { delta } => {
                print!("{}", delta);
                std::io::stdout().flush()?;
            }
            TranscriptionEvent::TextDone { usage, .. } => {
                println!();
                if let Some(usage) = usage {
                    println!("Total tokens: {}", usage.total_tokens);
                }
            }
            TranscriptionEvent::Unknown => {}
        }
    }

    Ok(())
}
