//! Chat request and response types.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_request::prelude::*;
//!
//! let request = ChatRequest::new("gpt-3.5-turbo")
//!     .system("You are helpful.")
//!     .user("Hello!")
//!     .max_tokens(100)
//!     .temperature(0.7);
//!
//! let response = client.openai().chat(&request, &client.api_key()).await?;
//! println!("{}", response.answer);
//! ```

use serde::{Deserialize, Serialize};

use crate::stream::ChatStream;

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions.
    System,
    /// End user.
    User,
    /// Model reply.
    Assistant,
}

/// One message of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl ChatMessage {
    /// Creates a message.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Stop sequence(s): a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Stop {
    /// One stop sequence.
    One(String),
    /// Several stop sequences.
    Many(Vec<String>),
}

impl From<&str> for Stop {
    fn from(s: &str) -> Self {
        Self::One(s.to_owned())
    }
}

impl From<String> for Stop {
    fn from(s: String) -> Self {
        Self::One(s)
    }
}

impl From<Vec<String>> for Stop {
    fn from(v: Vec<String>) -> Self {
        Self::Many(v)
    }
}

const fn is_false(b: &bool) -> bool {
    !*b
}

/// A chat completion request.
///
/// `stream` is only serialized when `true`: on the wire the flag is either
/// absent or `true`, and its presence selects the streaming code paths.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation messages, oldest first.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,

    /// Model identifier (e.g., "gpt-3.5-turbo", "gpt-4").
    #[serde(default)]
    pub model: String,

    /// Whether to stream the response.
    #[serde(default, skip_serializing_if = "is_false")]
    pub stream: bool,

    /// Sampling temperature (0.0 to 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Stop sequences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Stop>,

    /// Frequency penalty (-2.0 to 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
}

impl ChatRequest {
    /// Creates an empty request for `model`.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Appends a message.
    #[must_use]
    pub fn message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Appends a system message.
    #[must_use]
    pub fn system(self, content: impl Into<String>) -> Self {
        self.message(ChatMessage::system(content))
    }

    /// Appends a user message.
    #[must_use]
    pub fn user(self, content: impl Into<String>) -> Self {
        self.message(ChatMessage::user(content))
    }

    /// Appends an assistant message.
    #[must_use]
    pub fn assistant(self, content: impl Into<String>) -> Self {
        self.message(ChatMessage::assistant(content))
    }

    /// Requests a streamed response.
    #[must_use]
    pub const fn stream(mut self) -> Self {
        self.stream = true;
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub const fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the generation limit.
    #[must_use]
    pub const fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the stop sequence(s).
    #[must_use]
    pub fn stop(mut self, stop: impl Into<Stop>) -> Self {
        self.stop = Some(stop.into());
        self
    }

    /// Sets the frequency penalty.
    #[must_use]
    pub const fn frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    /// A copy of this request with the stream flag removed.
    #[must_use]
    pub fn without_stream(&self) -> Self {
        Self {
            stream: false,
            ..self.clone()
        }
    }
}

/// A non-streamed chat answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// First choice's message content; empty when the provider sent none.
    pub answer: String,
    /// First choice's finish reason, when present.
    pub finish_reason: Option<String>,
}

/// Result of [`LlmRequest::chat`](crate::LlmRequest::chat).
#[derive(Debug)]
pub enum ChatOutput {
    /// A complete answer (`stream` unset).
    Complete(ChatResponse),
    /// A raw byte stream (`stream` set).
    Stream(ChatStream),
}

impl ChatOutput {
    /// The complete answer, if this was a non-streamed call.
    #[must_use]
    pub const fn as_response(&self) -> Option<&ChatResponse> {
        match self {
            Self::Complete(response) => Some(response),
            Self::Stream(_) => None,
        }
    }

    /// Consumes the output, returning the stream handle if there is one.
    #[must_use]
    pub fn into_stream(self) -> Option<ChatStream> {
        match self {
            Self::Stream(stream) => Some(stream),
            Self::Complete(_) => None,
        }
    }
}
