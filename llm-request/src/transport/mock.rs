//! Scripted transport for testing.
//!
//! [`MockTransport`] replays queued responses in order and records every
//! request it receives, so tests can assert on outbound URLs, headers and
//! bodies without touching the network.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_request::prelude::*;
//!
//! let transport = Arc::new(MockTransport::new());
//! transport.push_json(serde_json::json!({
//!     "choices": [{"message": {"content": "hi"}, "finish_reason": "stop"}]
//! }));
//! let client = LlmRequest::builder().api_key("k").transport(transport.clone()).build()?;
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;

use super::{HttpRequest, HttpResponse, HttpTransport, StreamingResponse};
use crate::error::{Error, LlmError, Result};

/// One scripted reply.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// A buffered response.
    Body {
        /// Status code.
        status: StatusCode,
        /// Body bytes.
        body: Bytes,
    },
    /// A response delivered as separate body chunks.
    Chunks {
        /// Status code.
        status: StatusCode,
        /// Chunks, in delivery order.
        chunks: Vec<Bytes>,
        /// Error raised after the chunks, simulating a dropped connection.
        error: Option<String>,
    },
    /// Connection-level failure; no response at all.
    Failure(String),
}

/// Transport that replays [`MockResponse`]s and records requests.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Creates a transport with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply.
    pub fn push(&self, response: MockResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// Queues a `200 OK` JSON reply.
    pub fn push_json(&self, value: serde_json::Value) {
        self.push_body(StatusCode::OK, value.to_string());
    }

    /// Queues a buffered reply.
    pub fn push_body(&self, status: StatusCode, body: impl Into<Bytes>) {
        self.push(MockResponse::Body {
            status,
            body: body.into(),
        });
    }

    /// Queues a `200 OK` reply delivered as the given chunks.
    pub fn push_chunks<I, B>(&self, chunks: I)
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        self.push(MockResponse::Chunks {
            status: StatusCode::OK,
            chunks: chunks.into_iter().map(Into::into).collect(),
            error: None,
        });
    }

    /// Queues a connection failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.push(MockResponse::Failure(message.into()));
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Copies of all requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    fn next(&self, request: HttpRequest) -> Result<MockResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| LlmError::network("no scripted response left").into())
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        match self.next(request)? {
            MockResponse::Body { status, body } => Ok(HttpResponse { status, body }),
            MockResponse::Chunks {
                status,
                chunks,
                error,
            } => match error {
                Some(message) => Err(LlmError::network(message).into()),
                None => Ok(HttpResponse {
                    status,
                    body: Bytes::from(chunks.concat()),
                }),
            },
            MockResponse::Failure(message) => Err(LlmError::network(message).into()),
        }
    }

    async fn send_streaming(&self, request: HttpRequest) -> Result<StreamingResponse> {
        let (status, chunks, error) = match self.next(request)? {
            MockResponse::Body { status, body } => (status, vec![body], None),
            MockResponse::Chunks {
                status,
                chunks,
                error,
            } => (status, chunks, error),
            MockResponse::Failure(message) => return Err(LlmError::network(message).into()),
        };

        let items = chunks
            .into_iter()
            .map(Ok)
            .chain(error.map(|message| Err(Error::from(LlmError::stream(message)))));

        Ok(StreamingResponse {
            status,
            body: Box::pin(futures::stream::iter(items.collect::<Vec<_>>())),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futures::StreamExt;
    use http::HeaderMap;

    use super::*;

    fn request() -> HttpRequest {
        HttpRequest::json("https://example.test", HeaderMap::new(), &serde_json::json!({})).unwrap()
    }

    #[tokio::test]
    async fn replays_in_order_and_records() {
        let transport = MockTransport::new();
        transport.push_body(StatusCode::OK, "first");
        transport.push_body(StatusCode::CREATED, "second");

        let a = transport.send(request()).await.unwrap();
        let b = transport.send(request()).await.unwrap();

        assert_eq!(a.text(), "first");
        assert_eq!(b.status, StatusCode::CREATED);
        assert_eq!(transport.calls(), 2);
        assert_eq!(transport.requests().len(), 2);
    }

    #[tokio::test]
    async fn empty_queue_is_network_error() {
        let transport = MockTransport::new();
        let err = transport.send(request()).await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn streams_chunks_then_error() {
        let transport = MockTransport::new();
        transport.push(MockResponse::Chunks {
            status: StatusCode::OK,
            chunks: vec![Bytes::from("a"), Bytes::from("b")],
            error: Some("reset".to_owned()),
        });

        let response = transport.send_streaming(request()).await.unwrap();
        let items: Vec<_> = response.body.collect().await;

        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap(), &Bytes::from("a"));
        assert!(items[2].as_ref().unwrap_err().is_transport());
    }

    #[tokio::test]
    async fn buffered_send_concatenates_chunks() {
        let transport = MockTransport::new();
        transport.push_chunks(["ab", "cd"]);

        let response = transport.send(request()).await.unwrap();
        assert_eq!(response.text(), "abcd");
    }
}
