//! HTTP transport abstraction.
//!
//! Every OpenAI call goes through an [`HttpTransport`]. The production
//! implementation is [`ReqwestTransport`]; [`MockTransport`] records requests
//! and replays scripted responses.

use std::fmt;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::Serialize;

use crate::error::{Error, Result};

mod client;
pub mod mock;
pub mod multipart;
mod traits;

pub use client::ReqwestTransport;
pub use mock::{MockResponse, MockTransport};
pub use multipart::{FormPart, MultipartForm};
pub use traits::HttpTransport;

/// A stream of raw response body chunks, in transport delivery order.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Body of an outbound request.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Serialized JSON document.
    Json(Bytes),
    /// `multipart/form-data` payload.
    Multipart(MultipartForm),
}

/// An outbound POST request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// Absolute endpoint URL.
    pub url: String,
    /// Request headers, including authorization.
    pub headers: HeaderMap,
    /// Request body.
    pub body: RequestBody,
}

impl HttpRequest {
    /// Builds a JSON request, adding the JSON content type.
    pub fn json<T: Serialize + ?Sized>(
        url: impl Into<String>,
        mut headers: HeaderMap,
        body: &T,
    ) -> Result<Self> {
        let body = serde_json::to_vec(body)?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(Self {
            url: url.into(),
            headers,
            body: RequestBody::Json(Bytes::from(body)),
        })
    }

    /// Builds a multipart request. The transport sets the boundary header.
    #[must_use]
    pub fn multipart(url: impl Into<String>, headers: HeaderMap, form: MultipartForm) -> Self {
        Self {
            url: url.into(),
            headers,
            body: RequestBody::Multipart(form),
        }
    }

    /// Returns a header value as text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Decodes a JSON body. `None` for multipart bodies.
    #[must_use]
    pub fn json_body(&self) -> Option<serde_json::Value> {
        match &self.body {
            RequestBody::Json(bytes) => serde_json::from_slice(bytes).ok(),
            RequestBody::Multipart(_) => None,
        }
    }

    /// Returns the multipart form, if this is a multipart request.
    #[must_use]
    pub const fn form(&self) -> Option<&MultipartForm> {
        match &self.body {
            RequestBody::Multipart(form) => Some(form),
            RequestBody::Json(_) => None,
        }
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: StatusCode,
    /// Raw body bytes.
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The body as (lossily decoded) UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A response whose body is still arriving.
pub struct StreamingResponse {
    /// Status code.
    pub status: StatusCode,
    /// Body chunks.
    pub body: ByteStream,
}

impl fmt::Debug for StreamingResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingResponse")
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

/// Creates an Authorization header with a Bearer token.
pub fn make_auth_header(key: impl AsRef<str>) -> Result<(HeaderName, HeaderValue)> {
    let value = HeaderValue::from_str(&format!("Bearer {}", key.as_ref()))
        .map_err(|_| Error::usage("API key contains characters not allowed in a header"))?;
    Ok((AUTHORIZATION, value))
}

/// Inserts a Bearer auth header into the given header map.
#[inline]
pub fn bearer_auth_header(headers: &mut HeaderMap, key: impl AsRef<str>) -> Result<()> {
    let (name, value) = make_auth_header(key)?;
    headers.insert(name, value);
    Ok(())
}
