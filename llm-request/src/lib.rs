//! llm-request - A thin client for the OpenAI chat and audio APIs
//!
//! [`LlmRequest`] holds an API key and the runtime environment it was built
//! in, and exposes:
//!
//! - chat completions, buffered or streamed, with a per-token callback mode;
//! - text-to-speech, returning bytes on a server and a URL handle in a browser;
//! - audio translation into English text.
//!
//! All network traffic goes through the [`HttpTransport`](transport::HttpTransport)
//! trait, so tests can swap in [`MockTransport`](transport::MockTransport).

pub mod audio;
pub mod chat;
pub mod credentials;
pub mod env;
pub mod error;
pub mod llms;
pub mod prelude;
pub mod request;
pub mod stream;
pub mod transport;

pub use error::{Error, LlmError, LlmErrorKind, Result};
pub use request::{LlmRequest, LlmRequestBuilder};
