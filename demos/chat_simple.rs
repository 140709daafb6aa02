//! Simple chat completion example.
//!
//! Run with:
//! ```bash
//! export OPENAI_API_KEY="your-api-key"
//! cargo run --example chat_simple
//! ```

use nonempty::nonempty;
use oaikit::api::{ChatMessage, ChatRequest};
use oaikit::Client;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Reads OPENAI_API_KEY, and optionally OPENAI_BASE_URL / OPENAI_ORGANIZATION
    let client = Client::from_env()?;

    let request = ChatRequest::new(
        "gpt-4o-mini",
        nonempty![ChatMessage::user(
            "What is the capital of France? Answer in one word."
        )],
    )
    .with_temperature(0.7)
    .with_max_tokens(100);

    println!("Sending request...");

    match client.create_chat_completion(request).await {
        Ok(response) => {
            println!("\n=== Response ===");

            if let Some(usage) = &response.usage {
                println!("Prompt tokens: {}", usage.prompt_tokens);
                if let Some(completion_tokens) = usage.completion_tokens {
                    println!("Completion tokens: {}", completion_tokens);
                }
            }

            for choice in &response.choices {
                println!("Finish reason: {:?}", choice.finish_reason);
            }
            println!("\n{}", response.text().unwrap_or_default());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            return Err(e.into());
        }
    }

    // Example with conversation history
    println!("\n\n=== Multi-turn conversation ===");

    let request = ChatRequest::new(
        "gpt-4o-mini",
        nonempty![
            ChatMessage::user("My name is Alice."),
            ChatMessage::assistant("Hello Alice! Nice to meet you."),
            ChatMessage::user("What's my name?"),
        ],
    );

    match client.create_chat_completion(request).await {
        Ok(response) => println!("{}", response.text().unwrap_or_default()),
        Err(e) => eprintln!("Error: {}", e),
    }

    Ok(())
}
