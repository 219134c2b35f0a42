//! OpenAI wire types.
//!
//! Chat completions are read through `serde_json::Value` lookups so that any
//! missing field falls back to a default instead of failing the decode.

use serde::Deserialize;
use serde_json::Value;

use crate::chat::ChatResponse;

/// OpenAI error response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OpenAIErrorResponse {
    pub error: OpenAIError,
}

/// OpenAI error details.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OpenAIError {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// JSON body of `/v1/audio/translations`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct OpenAITranslationResponse {
    pub text: String,
}

impl ChatResponse {
    /// Reads `choices[0].message.content` and `choices[0].finish_reason`.
    pub(crate) fn from_completion(body: &Value) -> Self {
        let choice = body.pointer("/choices/0");
        Self {
            answer: choice
                .and_then(|c| c.pointer("/message/content"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            finish_reason: choice
                .and_then(|c| c.get("finish_reason"))
                .and_then(Value::as_str)
                .map(ToOwned::to_owned),
        }
    }
}

/// Reads `choices[0].delta.content` from a stream frame.
pub(crate) fn delta_content(frame: &Value) -> Option<&str> {
    frame.pointer("/choices/0/delta/content").and_then(Value::as_str)
}
