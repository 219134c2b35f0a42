//! `reqwest`-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;

use super::multipart::into_reqwest;
use super::{HttpRequest, HttpResponse, HttpTransport, RequestBody, StreamingResponse};
use crate::error::{Error, LlmError, Result};

/// Production transport over a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Builds a transport with an optional overall request timeout.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| LlmError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Wraps an existing client.
    #[must_use]
    pub const fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn build(&self, request: HttpRequest) -> Result<reqwest::RequestBuilder> {
        let builder = self.client.post(&request.url).headers(request.headers);
        Ok(match request.body {
            RequestBody::Json(bytes) => builder.body(bytes),
            RequestBody::Multipart(form) => builder.multipart(into_reqwest(form)?),
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self.build(request)?.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        Ok(HttpResponse { status, body })
    }

    async fn send_streaming(&self, request: HttpRequest) -> Result<StreamingResponse> {
        let response = self.build(request)?.send().await?;
        let status = response.status();
        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| Error::from(LlmError::stream(e.to_string()))));
        Ok(StreamingResponse {
            status,
            body: Box::pin(body),
        })
    }
}
