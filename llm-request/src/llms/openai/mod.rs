//! OpenAI API client implementation.
//!
//! This module provides a client for the OpenAI API, supporting:
//! - Chat completions (buffered, raw stream, and per-token callback)
//! - Text-to-Speech
//! - Audio translation (Whisper)

mod audio;
mod chat;
mod client;
mod config;
pub mod stream;
mod types;

pub use client::{CHAT_URL, OpenAI, SPEECH_URL, TRANSLATIONS_URL};
pub use config::OpenAIConfig;
pub use stream::{FrameStream, decode_frames, parse_frames, parse_tokens};
