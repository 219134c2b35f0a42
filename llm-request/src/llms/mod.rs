//! LLM backend implementations.
//!
//! # Available Backends
//!
//! - [`openai`] - OpenAI API (chat completions, speech, translation)

pub mod openai;

pub use openai::{OpenAI, OpenAIConfig};
