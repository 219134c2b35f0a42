//! Streaming chat types.
//!
//! A streamed completion is exposed two ways:
//!
//! - [`ChatStream`], the raw body handle tagged with the environment that
//!   produced it, for callers that want to read the bytes themselves.
//! - A per-token callback, driven by
//!   [`LlmRequest::stream_chat_callback`](crate::LlmRequest::stream_chat_callback)
//!   or [`ChatStream::for_each_token`].

use std::fmt;

use crate::env::RuntimeEnvironment;
use crate::error::Result;
use crate::llms::openai::stream::pump_tokens;
use crate::transport::ByteStream;

/// One decoded stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// A content delta.
    Token(String),
    /// The `[DONE]` sentinel.
    Done,
}

impl StreamFrame {
    /// Creates a token frame.
    #[must_use]
    pub fn token(text: impl Into<String>) -> Self {
        Self::Token(text.into())
    }

    /// The token text, if this is a token frame.
    #[must_use]
    pub fn into_token(self) -> Option<String> {
        match self {
            Self::Token(text) => Some(text),
            Self::Done => None,
        }
    }

    /// Whether this frame ends the stream.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Lifecycle of a token stream.
///
/// `Idle -> Streaming -> Draining -> Done` when `[DONE]` arrives and the rest
/// of the body is discarded, or `Streaming -> Done` when the transport ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamState {
    Idle,
    Streaming,
    Draining,
    Done,
}

impl StreamState {
    /// Moves to `next`.
    pub(crate) fn advance(self, next: Self) -> Self {
        debug_assert!(
            matches!(
                (self, next),
                (Self::Idle, Self::Streaming | Self::Done)
                    | (Self::Streaming, Self::Draining | Self::Done)
                    | (Self::Draining, Self::Done)
            ),
            "invalid stream transition {self:?} -> {next:?}"
        );
        tracing::trace!(from = ?self, to = ?next, "stream state");
        next
    }
}

/// Raw response body of a streamed chat completion.
///
/// The variant records which environment the stream was opened for. Both
/// known variants carry the same body type; `Unknown` carries nothing because
/// no request is made when the environment cannot be detected.
pub enum ChatStream {
    /// Stream opened on a server runtime.
    Server(ByteStream),
    /// Stream opened in a browser runtime.
    Browser(ByteStream),
    /// Environment undetected; no request was sent.
    Unknown,
}

impl ChatStream {
    /// Wraps `body` in the variant for `env`.
    pub(crate) fn new(env: RuntimeEnvironment, body: ByteStream) -> Self {
        match env {
            RuntimeEnvironment::Server => Self::Server(body),
            RuntimeEnvironment::Browser => Self::Browser(body),
            RuntimeEnvironment::Unknown => Self::Unknown,
        }
    }

    /// The environment this stream was opened for.
    #[must_use]
    pub const fn environment(&self) -> RuntimeEnvironment {
        match self {
            Self::Server(_) => RuntimeEnvironment::Server,
            Self::Browser(_) => RuntimeEnvironment::Browser,
            Self::Unknown => RuntimeEnvironment::Unknown,
        }
    }

    /// Whether no stream was opened.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// The raw body chunks, if a stream was opened.
    #[must_use]
    pub fn into_inner(self) -> Option<ByteStream> {
        match self {
            Self::Server(body) | Self::Browser(body) => Some(body),
            Self::Unknown => None,
        }
    }

    /// Decodes the stream, calling `on_token` once per token in arrival order.
    ///
    /// Returns the number of tokens delivered; `0` for [`ChatStream::Unknown`].
    ///
    /// # Errors
    ///
    /// Returns a transport error if the body fails mid-stream, or a
    /// response-format error if a frame is not JSON. Tokens already delivered
    /// stay delivered.
    pub async fn for_each_token<F>(self, mut on_token: F) -> Result<usize>
    where
        F: FnMut(&str) + Send,
    {
        match self.into_inner() {
            Some(body) => pump_tokens(body, &mut on_token).await,
            None => Ok(0),
        }
    }
}

impl fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(_) => f.write_str("ChatStream::Server(..)"),
            Self::Browser(_) => f.write_str("ChatStream::Browser(..)"),
            Self::Unknown => f.write_str("ChatStream::Unknown"),
        }
    }
}
