//! Core transport trait.

use std::fmt::Debug;

use async_trait::async_trait;

use super::{HttpRequest, HttpResponse, StreamingResponse};
use crate::error::Result;

/// Sends requests to the provider.
///
/// Implementations report connection-level failures as errors and return
/// every HTTP response, successful or not, as a value: status handling
/// belongs to the caller.
#[async_trait]
pub trait HttpTransport: Debug + Send + Sync {
    /// Send a request and buffer the whole response body.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;

    /// Send a request and hand back the body as it arrives.
    async fn send_streaming(&self, request: HttpRequest) -> Result<StreamingResponse>;
}
