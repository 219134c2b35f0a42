//! OpenAI chat completions.

use serde_json::Value;
use tracing::debug;

use crate::chat::{ChatRequest, ChatResponse};
use crate::env::RuntimeEnvironment;
use crate::error::{Error, LlmError, Result};
use crate::stream::ChatStream;

use super::client::{CHAT_URL, OpenAI};

impl OpenAI {
    /// Sends a non-streamed completion and returns the first choice.
    ///
    /// Any `stream` flag on `request` is dropped from the wire body; the
    /// caller's request is left as it was.
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx statuses, and bodies that are not JSON.
    pub async fn chat(&self, request: &ChatRequest, api_key: &str) -> Result<ChatResponse> {
        let body = request.without_stream();
        debug!(
            model = %body.model,
            messages = body.messages.len(),
            "OpenAI chat request"
        );

        let response = self.post_json(CHAT_URL, api_key, &body).await?;
        let completion: Value = serde_json::from_slice(&response.body).map_err(|e| {
            LlmError::response_format("JSON chat completion", format!("parse error: {e}"))
        })?;

        Ok(ChatResponse::from_completion(&completion))
    }

    /// Opens a streamed completion and returns its raw body.
    ///
    /// The request is always sent with `stream: true`. For
    /// [`RuntimeEnvironment::Unknown`] nothing is sent and
    /// [`ChatStream::Unknown`] is returned, unless the client is strict.
    ///
    /// # Errors
    ///
    /// Transport failures, non-2xx statuses, or
    /// [`Error::UnsupportedEnvironment`] in strict mode.
    pub async fn stream_chat(
        &self,
        request: &ChatRequest,
        api_key: &str,
        env: RuntimeEnvironment,
    ) -> Result<ChatStream> {
        if !self.check_environment(env)? {
            return Ok(ChatStream::Unknown);
        }

        let mut body = request.clone();
        body.stream = true;
        debug!(
            model = %body.model,
            messages = body.messages.len(),
            environment = %env,
            "OpenAI streaming chat request"
        );

        let response = self.post_json_streaming(CHAT_URL, api_key, &body).await?;
        Ok(ChatStream::new(env, response.body))
    }

    /// Streams a completion, calling `on_token` for each token in arrival
    /// order until `[DONE]` or the end of the body.
    ///
    /// # Errors
    ///
    /// A usage error, before any request is sent, when `request.stream` is
    /// not set. Otherwise as [`OpenAI::stream_chat`], plus mid-stream
    /// transport failures and frames that are not JSON.
    pub async fn stream_chat_callback<F>(
        &self,
        request: &ChatRequest,
        api_key: &str,
        env: RuntimeEnvironment,
        on_token: F,
    ) -> Result<()>
    where
        F: FnMut(&str) + Send,
    {
        if !request.stream {
            return Err(Error::usage(
                "stream_chat_callback requires a request with stream enabled",
            ));
        }

        let tokens = self
            .stream_chat(request, api_key, env)
            .await?
            .for_each_token(on_token)
            .await?;
        debug!(tokens, "OpenAI streaming chat finished");

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::error::LlmErrorKind;
    use crate::llms::openai::OpenAIConfig;
    use crate::transport::{MockResponse, MockTransport};

    fn client() -> (OpenAI, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::new());
        let openai = OpenAI::with_transport(OpenAIConfig::default(), Arc::clone(&transport) as _);
        (openai, transport)
    }

    fn request() -> ChatRequest {
        ChatRequest::new("gpt-3.5-turbo").user("hi")
    }

    fn frame(content: &str) -> String {
        format!("data: {}\n\n", json!({"choices": [{"delta": {"content": content}}]}))
    }

    mod chat {
        use super::*;

        #[tokio::test]
        async fn returns_first_choice() {
            let (openai, transport) = client();
            transport.push_json(json!({
                "choices": [{"message": {"content": "mock answer"}, "finish_reason": "finished"}]
            }));

            let res = openai.chat(&request(), "abc").await.unwrap();

            assert_eq!(res.answer, "mock answer");
            assert_eq!(res.finish_reason.as_deref(), Some("finished"));
        }

        #[tokio::test]
        async fn posts_to_completions_with_bearer() {
            let (openai, transport) = client();
            transport.push_json(json!({"choices": []}));

            openai.chat(&request(), "abc").await.unwrap();

            let sent = transport.last_request().unwrap();
            assert_eq!(sent.url, CHAT_URL);
            assert_eq!(sent.header("authorization"), Some("Bearer abc"));
            assert_eq!(sent.json_body().unwrap()["messages"][0]["content"], "hi");
        }

        #[tokio::test]
        async fn strips_stream_flag() {
            let (openai, transport) = client();
            transport.push_json(json!({"choices": []}));

            let req = request().stream();
            openai.chat(&req, "abc").await.unwrap();

            let body = transport.last_request().unwrap().json_body().unwrap();
            assert!(body.get("stream").is_none());
            assert!(req.stream);
        }

        #[tokio::test]
        async fn missing_content_is_empty_answer() {
            let (openai, transport) = client();
            transport.push_json(json!({"id": "x"}));

            let res = openai.chat(&request(), "abc").await.unwrap();
            assert_eq!(res.answer, "");
        }

        #[tokio::test]
        async fn invalid_json_is_malformed() {
            let (openai, transport) = client();
            transport.push_body(StatusCode::OK, "<html>");

            let err = openai.chat(&request(), "abc").await.unwrap_err();
            assert!(err.is_malformed());
        }

        #[tokio::test]
        async fn connection_failure_is_transport() {
            let (openai, transport) = client();
            transport.push_failure("connection refused");

            let err = openai.chat(&request(), "abc").await.unwrap_err();
            assert!(err.is_transport());
        }

        #[tokio::test]
        async fn error_status_is_mapped() {
            let (openai, transport) = client();
            transport.push_body(
                StatusCode::UNAUTHORIZED,
                r#"{"error":{"message":"Incorrect API key provided"}}"#,
            );

            let err = openai.chat(&request(), "bad").await.unwrap_err();
            assert_eq!(err.as_llm().unwrap().kind, LlmErrorKind::Auth);
        }
    }

    mod stream_chat {
        use super::*;

        #[tokio::test]
        async fn forces_stream_flag() {
            let (openai, transport) = client();
            transport.push_chunks([frame("a")]);

            let stream = openai
                .stream_chat(&request(), "abc", RuntimeEnvironment::Server)
                .await
                .unwrap();

            assert_eq!(stream.environment(), RuntimeEnvironment::Server);
            let body = transport.last_request().unwrap().json_body().unwrap();
            assert_eq!(body["stream"], true);
        }

        #[tokio::test]
        async fn browser_stream_is_tagged() {
            let (openai, transport) = client();
            transport.push_chunks([frame("a")]);

            let stream = openai
                .stream_chat(&request().stream(), "abc", RuntimeEnvironment::Browser)
                .await
                .unwrap();
            assert!(matches!(stream, ChatStream::Browser(_)));
        }

        #[tokio::test]
        async fn unknown_environment_sends_nothing() {
            let (openai, transport) = client();

            let stream = openai
                .stream_chat(&request().stream(), "abc", RuntimeEnvironment::Unknown)
                .await
                .unwrap();

            assert!(stream.is_unknown());
            assert_eq!(transport.calls(), 0);
        }

        #[tokio::test]
        async fn error_status_is_mapped() {
            let (openai, transport) = client();
            transport.push(MockResponse::Chunks {
                status: StatusCode::TOO_MANY_REQUESTS,
                chunks: vec![r#"{"error":{"message":"slow down"}}"#.into()],
                error: None,
            });

            let err = openai
                .stream_chat(&request(), "abc", RuntimeEnvironment::Server)
                .await
                .unwrap_err();
            assert_eq!(err.as_llm().unwrap().kind, LlmErrorKind::RateLimited);
        }
    }

    mod stream_chat_callback {
        use super::*;

        #[tokio::test]
        async fn requires_stream_flag() {
            let (openai, transport) = client();

            let err = openai
                .stream_chat_callback(&request(), "abc", RuntimeEnvironment::Server, |_| {})
                .await
                .unwrap_err();

            assert!(err.is_usage());
            assert_eq!(transport.calls(), 0);
        }

        #[tokio::test]
        async fn delivers_tokens_across_chunk_splits() {
            let (openai, transport) = client();
            let whole = format!("{}{}data: [DONE]\n\n", frame("Hel"), frame("lo"));
            let (head, tail) = whole.split_at(whole.len() / 2 + 3);
            transport.push_chunks([head.to_owned(), tail.to_owned()]);

            let mut tokens = Vec::new();
            openai
                .stream_chat_callback(&request().stream(), "abc", RuntimeEnvironment::Server, |t| {
                    tokens.push(t.to_owned());
                })
                .await
                .unwrap();

            assert_eq!(tokens, ["Hel", "lo"]);
        }

        #[tokio::test]
        async fn mid_stream_failure_keeps_delivered_tokens() {
            let (openai, transport) = client();
            transport.push(MockResponse::Chunks {
                status: StatusCode::OK,
                chunks: vec![frame("a").into()],
                error: Some("connection reset".to_owned()),
            });

            let mut tokens = Vec::new();
            let err = openai
                .stream_chat_callback(&request().stream(), "abc", RuntimeEnvironment::Server, |t| {
                    tokens.push(t.to_owned());
                })
                .await
                .unwrap_err();

            assert!(err.is_transport());
            assert_eq!(tokens, ["a"]);
        }

        #[tokio::test]
        async fn malformed_frame_fails() {
            let (openai, transport) = client();
            transport.push_chunks(["data: {oops\n\n"]);

            let err = openai
                .stream_chat_callback(&request().stream(), "abc", RuntimeEnvironment::Server, |_| {})
                .await
                .unwrap_err();
            assert!(err.is_malformed());
        }
    }
}
