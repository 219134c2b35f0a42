//! The `LlmRequest` facade.
//!
//! Owns the API key and the runtime environment, and forwards every call to
//! the [`OpenAI`] client with both attached.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_request::prelude::*;
//!
//! let client = LlmRequest::new(std::env::var("OPENAI_API_KEY")?)?;
//!
//! let request = ChatRequest::new("gpt-3.5-turbo").user("Hello!");
//! if let ChatOutput::Complete(response) = client.chat(&request).await? {
//!     println!("{}", response.answer);
//! }
//!
//! client
//!     .stream_chat_callback(&request.stream(), |token| print!("{token}"))
//!     .await?;
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::audio::{AudioOutput, AudioRequest, ObjectUrlFactory};
use crate::chat::{ChatOutput, ChatRequest};
use crate::credentials::Credentials;
use crate::env::{EnvironmentProbe, RuntimeEnvironment, TargetProbe};
use crate::error::Result;
use crate::llms::openai::{OpenAI, OpenAIConfig};
use crate::transport::HttpTransport;

/// Entry point bundling credentials, environment, and the OpenAI client.
///
/// The environment is detected once, in [`LlmRequestBuilder::build`], and
/// never again. The API key may be replaced at any time with
/// [`set_api_key`](Self::set_api_key); requests already in flight keep the key
/// they started with.
#[derive(Debug)]
pub struct LlmRequest {
    credentials: Credentials,
    environment: RuntimeEnvironment,
    openai: OpenAI,
}

impl LlmRequest {
    /// Creates a client for `api_key` with the default transport and probe.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// Starts a builder.
    #[must_use]
    pub fn builder() -> LlmRequestBuilder {
        LlmRequestBuilder::default()
    }

    /// The current API key.
    #[must_use]
    pub fn api_key(&self) -> String {
        self.credentials.get()
    }

    /// Replaces the API key used by subsequent requests.
    pub fn set_api_key(&self, api_key: impl Into<String>) {
        self.credentials.set(api_key);
    }

    /// The environment detected at construction.
    #[must_use]
    pub const fn environment(&self) -> RuntimeEnvironment {
        self.environment
    }

    /// The underlying OpenAI client.
    #[must_use]
    pub const fn openai(&self) -> &OpenAI {
        &self.openai
    }

    /// Runs the audio operation the request selects.
    ///
    /// # Errors
    ///
    /// As [`OpenAI::speech`] or [`OpenAI::transition`].
    pub async fn audio(&self, request: AudioRequest) -> Result<AudioOutput> {
        let api_key = self.api_key();
        debug!(kind = request.kind().code(), "audio dispatch");

        match request {
            AudioRequest::Speech(speech) => self
                .openai
                .speech(&speech, &api_key, self.environment)
                .await
                .map(AudioOutput::Speech),
            AudioRequest::Transition(translation) => self
                .openai
                .transition(translation, &api_key)
                .await
                .map(AudioOutput::Transition),
        }
    }

    /// Sends a chat request.
    ///
    /// With `request.stream` set this opens a stream and returns its raw
    /// body; otherwise it returns the complete answer.
    ///
    /// # Errors
    ///
    /// As [`OpenAI::chat`] or [`OpenAI::stream_chat`].
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatOutput> {
        let api_key = self.api_key();
        if request.stream {
            self.openai
                .stream_chat(request, &api_key, self.environment)
                .await
                .map(ChatOutput::Stream)
        } else {
            self.openai
                .chat(request, &api_key)
                .await
                .map(ChatOutput::Complete)
        }
    }

    /// Streams a chat completion, calling `on_token` once per token in
    /// arrival order.
    ///
    /// # Errors
    ///
    /// A usage error, before anything is sent, when `request.stream` is not
    /// set. Otherwise as [`OpenAI::stream_chat_callback`].
    pub async fn stream_chat_callback<F>(&self, request: &ChatRequest, on_token: F) -> Result<()>
    where
        F: FnMut(&str) + Send,
    {
        let api_key = self.api_key();
        self.openai
            .stream_chat_callback(request, &api_key, self.environment, on_token)
            .await
    }
}

/// Builder for [`LlmRequest`].
#[derive(Default)]
pub struct LlmRequestBuilder {
    api_key: Option<String>,
    config: Option<OpenAIConfig>,
    probe: Option<Box<dyn EnvironmentProbe + Send + Sync>>,
    transport: Option<Arc<dyn HttpTransport>>,
    object_urls: Option<Arc<dyn ObjectUrlFactory>>,
}

impl LlmRequestBuilder {
    /// Sets the initial API key. Overrides the key in [`config`](Self::config).
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the client configuration.
    #[must_use]
    pub fn config(mut self, config: OpenAIConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the environment probe. Defaults to [`TargetProbe`].
    #[must_use]
    pub fn probe(mut self, probe: impl EnvironmentProbe + Send + Sync + 'static) -> Self {
        self.probe = Some(Box::new(probe));
        self
    }

    /// Pins the environment instead of probing for it.
    #[must_use]
    pub fn environment(self, environment: RuntimeEnvironment) -> Self {
        self.probe(environment)
    }

    /// Sets the HTTP transport. Defaults to a reqwest client.
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the factory for browser speech handles.
    #[must_use]
    pub fn object_urls(mut self, factory: Arc<dyn ObjectUrlFactory>) -> Self {
        self.object_urls = Some(factory);
        self
    }

    /// Detects the environment and builds the client.
    ///
    /// # Errors
    ///
    /// Fails if no transport was given and the HTTP client cannot be built.
    pub fn build(self) -> Result<LlmRequest> {
        let mut config = self.config.unwrap_or_default();
        if let Some(api_key) = self.api_key {
            config.api_key = api_key;
        }

        let environment = match self.probe {
            Some(probe) => probe.detect(),
            None => TargetProbe.detect(),
        };
        // the facade keeps the only copy of the key
        let credentials = Credentials::new(std::mem::take(&mut config.api_key));

        let mut openai = match self.transport {
            Some(transport) => OpenAI::with_transport(config, transport),
            None => OpenAI::new(config)?,
        };
        if let Some(factory) = self.object_urls {
            openai = openai.with_object_urls(factory);
        }

        debug!(environment = %environment, "llm-request client ready");
        Ok(LlmRequest {
            credentials,
            environment,
            openai,
        })
    }
}

impl fmt::Debug for LlmRequestBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmRequestBuilder")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("config", &self.config.as_ref().map(|_| ".."))
            .field("probe", &self.probe.is_some())
            .field("transport", &self.transport)
            .field("object_urls", &self.object_urls)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::audio::{SpeechOutput, SpeechRequest};
    use crate::env::GlobalsProbe;
    use crate::transport::MockTransport;

    #[derive(Debug, Clone, Default)]
    struct CountingProbe(Arc<AtomicUsize>);

    impl EnvironmentProbe for CountingProbe {
        fn detect(&self) -> RuntimeEnvironment {
            self.0.fetch_add(1, Ordering::SeqCst);
            RuntimeEnvironment::Server
        }
    }

    fn client(env: RuntimeEnvironment) -> (LlmRequest, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let client = LlmRequest::builder()
            .api_key("abc")
            .environment(env)
            .transport(Arc::clone(&transport) as _)
            .build()
            .unwrap();
        (client, transport)
    }

    mod construction {
        use super::*;

        #[test]
        fn probe_runs_exactly_once() {
            let probe = CountingProbe::default();
            let transport = Arc::new(MockTransport::new());
            let client = LlmRequest::builder()
                .probe(probe.clone())
                .transport(transport)
                .build()
                .unwrap();

            assert_eq!(client.environment(), RuntimeEnvironment::Server);
            let _ = client.environment();
            client.set_api_key("other");
            assert_eq!(probe.0.load(Ordering::SeqCst), 1);
        }

        #[test]
        fn globals_probe_prefers_window() {
            let client = LlmRequest::builder()
                .probe(GlobalsProbe::new().with_window().with_process_version("v20.0.0"))
                .transport(Arc::new(MockTransport::new()))
                .build()
                .unwrap();
            assert_eq!(client.environment(), RuntimeEnvironment::Browser);
        }

        #[test]
        fn api_key_overrides_config_key() {
            let client = LlmRequest::builder()
                .config(OpenAIConfig::new("from-config").with_organization("org"))
                .api_key("explicit")
                .transport(Arc::new(MockTransport::new()))
                .build()
                .unwrap();

            assert_eq!(client.api_key(), "explicit");
            assert_eq!(client.openai().config().organization.as_deref(), Some("org"));
        }

        #[test]
        fn new_uses_reqwest_transport() {
            let client = LlmRequest::new("abc").unwrap();
            assert_eq!(client.api_key(), "abc");
        }

        #[test]
        fn builder_debug_redacts_key() {
            let builder = LlmRequest::builder().api_key("sk-secret");
            assert!(!format!("{builder:?}").contains("sk-secret"));
        }
    }

    mod credentials {
        use super::*;

        #[tokio::test]
        async fn set_api_key_applies_to_next_request() {
            let (client, transport) = client(RuntimeEnvironment::Server);
            transport.push_json(json!({"choices": []}));
            transport.push_json(json!({"choices": []}));

            client.chat(&ChatRequest::new("gpt-4").user("a")).await.unwrap();
            client.set_api_key("xyz");
            client.chat(&ChatRequest::new("gpt-4").user("b")).await.unwrap();

            let sent = transport.requests();
            assert_eq!(sent[0].header("authorization"), Some("Bearer abc"));
            assert_eq!(sent[1].header("authorization"), Some("Bearer xyz"));
            assert_eq!(client.api_key(), "xyz");
        }

        #[test]
        fn debug_shows_neither_initial_nor_rotated_key() {
            let client = LlmRequest::builder()
                .config(OpenAIConfig::new("sk-secret-123"))
                .transport(Arc::new(MockTransport::new()))
                .build()
                .unwrap();
            client.set_api_key("sk-new-456");

            let debug = format!("{client:?}");
            assert!(!debug.contains("sk-secret-123"));
            assert!(!debug.contains("sk-new-456"));
            assert!(client.openai().config().api_key.is_empty());
        }
    }

    mod chat {
        use super::*;

        #[tokio::test]
        async fn dispatches_on_stream_flag() {
            let (client, transport) = client(RuntimeEnvironment::Browser);
            transport.push_json(json!({"choices": [{"message": {"content": "done"}}]}));
            transport.push_chunks(["data: [DONE]\n\n"]);

            let plain = client.chat(&ChatRequest::new("gpt-4").user("a")).await.unwrap();
            assert_eq!(plain.as_response().unwrap().answer, "done");

            let streamed = client
                .chat(&ChatRequest::new("gpt-4").user("a").stream())
                .await
                .unwrap()
                .into_stream()
                .unwrap();
            assert_eq!(streamed.environment(), RuntimeEnvironment::Browser);
        }

        #[tokio::test]
        async fn callback_without_stream_never_sends() {
            let (client, transport) = client(RuntimeEnvironment::Server);

            let err = client
                .stream_chat_callback(&ChatRequest::new("gpt-4").user("a"), |_| {})
                .await
                .unwrap_err();

            assert!(err.is_usage());
            assert_eq!(transport.calls(), 0);
        }
    }

    mod audio {
        use super::*;

        #[tokio::test]
        async fn speech_follows_environment() {
            let (server, transport) = client(RuntimeEnvironment::Server);
            transport.push_body(StatusCode::OK, "mp3");
            let out = server
                .audio(AudioRequest::Speech(SpeechRequest::new("tts-1", "hi", "alloy")))
                .await
                .unwrap();
            assert!(matches!(out, AudioOutput::Speech(SpeechOutput::Server(_))));

            let (unknown, transport) = client(RuntimeEnvironment::Unknown);
            let out = unknown
                .audio(AudioRequest::Speech(SpeechRequest::new("tts-1", "hi", "alloy")))
                .await
                .unwrap();
            assert_eq!(out, AudioOutput::Speech(SpeechOutput::Unknown));
            assert_eq!(transport.calls(), 0);
        }
    }
}
