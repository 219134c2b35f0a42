//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```rust,ignore
//! use llm_request::prelude::*;
//! ```

pub use crate::llms::{OpenAI, OpenAIConfig};

pub use crate::audio::{
    AudioFile, AudioFormat, AudioKind, AudioOutput, AudioRequest, DataUrlFactory, ObjectUrlFactory,
    SpeechOutput, SpeechRequest, TranslationOptions, TranslationRequest, TranslationResponseFormat,
};
pub use crate::chat::{ChatMessage, ChatOutput, ChatRequest, ChatResponse, Role, Stop};
pub use crate::env::{EnvironmentProbe, GlobalsProbe, RuntimeEnvironment, TargetProbe};
pub use crate::error::{Error, LlmError, LlmErrorKind, Result};
pub use crate::request::{LlmRequest, LlmRequestBuilder};
pub use crate::stream::{ChatStream, StreamFrame};
pub use crate::transport::{HttpTransport, MockTransport, ReqwestTransport};
