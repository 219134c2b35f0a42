//! Chat example: one buffered answer, then the same question streamed.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! RUST_LOG=llm_request=debug cargo run --example chat_demo
//! ```

#![allow(clippy::print_stdout)]

use std::io::{Write, stdout};

use llm_request::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let client = LlmRequest::builder()
        .config(OpenAIConfig::from_env()?)
        .build()?;
    println!("environment: {}", client.environment());

    let request = ChatRequest::new("gpt-3.5-turbo")
        .system("You answer in one short paragraph.")
        .user("Why is the sky blue?")
        .max_tokens(120);

    if let ChatOutput::Complete(response) = client.chat(&request).await? {
        println!("{}", response.answer);
        println!("(finish reason: {:?})\n", response.finish_reason);
    }

    let mut out = stdout();
    client
        .stream_chat_callback(&request.stream(), |token| {
            print!("{token}");
            let _ = out.flush();
        })
        .await?;
    println!();

    Ok(())
}
