//! Streaming chat completion example.
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY="your-api-key"
//! cargo run --example chat_streaming
//! ```

use futures::StreamExt;
use nonempty::nonempty;
use oaikit::api::{ChatAccumulator, ChatMessage, ChatRequest};
use oaikit::Client;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::from_env()?;

    let request = ChatRequest::new(
        "gpt-4o-mini",
        nonempty![
            ChatMessage::system("You are a poet."),
            ChatMessage::user("Write a haiku about Rust programming."),
        ],
    )
    .with_temperature(0.9)
    .with_stream_usage(true);

    println!("Streaming response...\n");

    let mut stream = client.create_chat_completion_stream(request).await?;
    let mut accumulator = ChatAccumulator::new();

    print!("Response: ");
    while let Some(chunk_result) = stream.next().await {
        match chunk_result {
            Ok(chunk) => {
                for choice in &chunk.choices {
                    if let Some(content) = &choice.delta.content {
                        print!("{}", content);
                        std::io::stdout().flush()?;
                    }
                }
                accumulator.push(&chunk);
            }
            Err(e) => {
                eprintln!("\nStream error: {}", e);
                return Err(e.into());
            }
        }
    }

    println!("\n\n=== Done ===");
    println!("Finish reason: {:?}", accumulator.finish_reason());
    if let Some(usage) = accumulator.usage() {
        println!("Total tokens: {}", usage.total_tokens);
    }

    Ok(())
}
