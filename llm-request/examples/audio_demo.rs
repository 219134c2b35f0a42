//! Audio example: synthesize speech to a file, then translate that file.
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! cargo run --example audio_demo
//! ```

#![allow(clippy::print_stdout)]

use llm_request::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let client = LlmRequest::builder()
        .config(OpenAIConfig::from_env()?)
        .environment(RuntimeEnvironment::Server)
        .build()?;

    let speech = SpeechRequest::new(
        "tts-1",
        "Bonjour! Ceci est un test de synthèse vocale.",
        "nova",
    )
    .format(AudioFormat::Mp3);

    let output_path = "output.mp3";
    match client.audio(AudioRequest::Speech(speech)).await? {
        AudioOutput::Speech(SpeechOutput::Server(audio)) => {
            tokio::fs::write(output_path, &audio).await?;
            println!("Audio saved to: {output_path} ({} bytes)", audio.len());
        }
        other => anyhow::bail!("unexpected speech output: {other:?}"),
    }

    let file = AudioFile::from_path(output_path).await?;
    let translation =
        TranslationOptions::new(file).response_format(TranslationResponseFormat::Text);
    if let AudioOutput::Transition(text) = client
        .audio(AudioRequest::Transition(translation.into()))
        .await?
    {
        println!("Translation: {text}");
    }

    Ok(())
}
