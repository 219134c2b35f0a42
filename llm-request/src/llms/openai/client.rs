//! OpenAI API client implementation.

use std::sync::Arc;

use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::Serialize;

use crate::audio::{DataUrlFactory, ObjectUrlFactory};
use crate::env::RuntimeEnvironment;
use crate::error::{Error, LlmError, Result};
use crate::transport::{
    HttpRequest, HttpResponse, HttpTransport, MultipartForm, ReqwestTransport, StreamingResponse,
    bearer_auth_header,
};

use super::config::OpenAIConfig;
use super::types::OpenAIErrorResponse;

/// Chat completions endpoint.
pub const CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Speech synthesis endpoint.
pub const SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";
/// Audio translation endpoint.
pub const TRANSLATIONS_URL: &str = "https://api.openai.com/v1/audio/translations";

/// OpenAI API client.
///
/// Holds no credentials of its own: every operation takes the API key to send,
/// so a caller can rotate keys between calls without rebuilding the client.
#[derive(Debug, Clone)]
pub struct OpenAI {
    pub(crate) config: Arc<OpenAIConfig>,
    pub(crate) transport: Arc<dyn HttpTransport>,
    pub(crate) object_urls: Arc<dyn ObjectUrlFactory>,
}

impl OpenAI {
    /// Create a new OpenAI client over a reqwest transport.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client over the given transport.
    #[must_use]
    pub fn with_transport(config: OpenAIConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            object_urls: Arc::new(DataUrlFactory),
        }
    }

    /// Replace the factory used to hand speech audio to browser callers.
    #[must_use]
    pub fn with_object_urls(mut self, factory: Arc<dyn ObjectUrlFactory>) -> Self {
        self.object_urls = factory;
        self
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    /// Build request headers: bearer auth plus the optional organization.
    pub(crate) fn headers(&self, api_key: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        bearer_auth_header(&mut headers, api_key)?;

        if let Some(org) = &self.config.organization {
            let value = HeaderValue::from_str(org)
                .map_err(|_| Error::usage("organization contains characters not allowed in a header"))?;
            headers.insert(HeaderName::from_static("openai-organization"), value);
        }

        Ok(headers)
    }

    /// Whether a request should be sent for `env`.
    ///
    /// `Ok(false)` means the caller should return its empty result.
    pub(crate) fn check_environment(&self, env: RuntimeEnvironment) -> Result<bool> {
        if env.is_known() {
            return Ok(true);
        }
        if self.config.strict_environment {
            return Err(Error::UnsupportedEnvironment);
        }
        tracing::warn!("runtime environment unknown, skipping request");
        Ok(false)
    }

    /// POST a JSON body and buffer the successful response.
    pub(crate) async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        api_key: &str,
        body: &T,
    ) -> Result<HttpResponse> {
        let request = HttpRequest::json(url, self.headers(api_key)?, body)?;
        let response = self.transport.send(request).await?;
        Self::ensure_success(response)
    }

    /// POST a JSON body and return the response body unread.
    pub(crate) async fn post_json_streaming<T: Serialize + ?Sized>(
        &self,
        url: &str,
        api_key: &str,
        body: &T,
    ) -> Result<StreamingResponse> {
        let request = HttpRequest::json(url, self.headers(api_key)?, body)?;
        let response = self.transport.send_streaming(request).await?;
        if response.status.is_success() {
            return Ok(response);
        }

        let status = response.status;
        let body = collect_text(response).await;
        Err(Self::parse_error(status, &body).into())
    }

    /// POST a multipart form and buffer the successful response.
    pub(crate) async fn post_multipart(
        &self,
        url: &str,
        api_key: &str,
        form: MultipartForm,
    ) -> Result<HttpResponse> {
        let request = HttpRequest::multipart(url, self.headers(api_key)?, form);
        let response = self.transport.send(request).await?;
        Self::ensure_success(response)
    }

    fn ensure_success(response: HttpResponse) -> Result<HttpResponse> {
        if response.is_success() {
            Ok(response)
        } else {
            Err(Self::parse_error(response.status, &response.text()).into())
        }
    }

    /// Parse an error response.
    pub(crate) fn parse_error(status: StatusCode, body: &str) -> LlmError {
        if let Ok(error_response) = serde_json::from_str::<OpenAIErrorResponse>(body) {
            let error = error_response.error;
            let code = error
                .code
                .or(error.error_type)
                .unwrap_or_else(|| status.as_u16().to_string());

            return match status {
                StatusCode::UNAUTHORIZED => LlmError::auth("openai", error.message),
                StatusCode::TOO_MANY_REQUESTS => LlmError::rate_limited("openai"),
                _ => LlmError::provider_code("openai", code, error.message),
            };
        }

        LlmError::http_status(status.as_u16(), body.to_owned())
    }
}

/// Reads an error body off a stream, stopping at the first failed chunk.
async fn collect_text(response: StreamingResponse) -> String {
    use futures::StreamExt;

    let mut body = response.body;
    let mut bytes = Vec::new();
    while let Some(Ok(chunk)) = body.next().await {
        bytes.extend_from_slice(&chunk);
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
