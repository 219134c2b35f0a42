//! OpenAI streaming token extraction.
//!
//! A streamed completion arrives as `data: <json>` frames separated by blank
//! lines and closed by `data: [DONE]`. [`parse_frames`] handles one chunk in
//! isolation. [`decode_frames`] reads a whole body as server-sent events, so a
//! frame or a UTF-8 sequence split by the transport is still decoded once its
//! tail arrives.

use std::pin::Pin;

use eventsource_stream::{EventStreamError, Eventsource};
use futures::{Stream, StreamExt};
use serde_json::Value;

use crate::error::{Error, LlmError, Result};
use crate::stream::{StreamFrame, StreamState};
use crate::transport::ByteStream;

use super::types::delta_content;

/// Prefix that starts every frame.
pub const DATA_DELIMITER: &str = "data:";

/// Payload of the frame that ends the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Parses one `data:`-delimited segment.
fn parse_segment(segment: &str) -> Result<Option<StreamFrame>> {
    let segment = segment.trim();
    if segment.is_empty() {
        return Ok(None);
    }
    if segment == DONE_SENTINEL {
        return Ok(Some(StreamFrame::Done));
    }

    let frame: Value = serde_json::from_str(segment).map_err(|e| {
        LlmError::response_format(
            "JSON stream frame",
            format!("parse error: {e}, data: {segment}"),
        )
    })?;

    Ok(delta_content(&frame).map(StreamFrame::token))
}

/// Parses every frame in `chunk`, in order.
///
/// Splits on `data:`, skips blank segments, maps `[DONE]` to
/// [`StreamFrame::Done`] and frames without `choices[0].delta.content` to
/// nothing.
///
/// # Errors
///
/// Fails with a response-format error on the first segment that is not JSON.
pub fn parse_frames(chunk: &str) -> Result<Vec<StreamFrame>> {
    chunk
        .split(DATA_DELIMITER)
        .filter_map(|segment| parse_segment(segment).transpose())
        .collect()
}

/// Parses the tokens in `chunk`, ignoring the `[DONE]` sentinel.
///
/// # Errors
///
/// Fails with a response-format error on the first segment that is not JSON.
pub fn parse_tokens(chunk: &str) -> Result<Vec<String>> {
    Ok(parse_frames(chunk)?
        .into_iter()
        .filter_map(StreamFrame::into_token)
        .collect())
}

/// Frames decoded from a raw completion body.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<StreamFrame>> + Send>>;

/// Decodes a raw completion body into frames.
///
/// Event framing is done by [`eventsource_stream`], which carries incomplete
/// lines and UTF-8 sequences across chunks. Each event's `data` is then read
/// as one segment, so a token that itself contains `data:` stays intact. An
/// event still open when the body ends is never dispatched.
pub fn decode_frames(body: ByteStream) -> FrameStream {
    Box::pin(body.eventsource().filter_map(|event| async move {
        match event {
            Ok(event) => parse_segment(&event.data).transpose(),
            Err(EventStreamError::Transport(e)) => Some(Err(e)),
            Err(e) => Some(Err(Error::from(LlmError::response_format(
                "server-sent events",
                e.to_string(),
            )))),
        }
    }))
}

/// Drives a raw completion stream, calling `on_token` for each token in
/// arrival order until `[DONE]` or the end of the transport stream.
///
/// Returns the number of tokens forwarded.
pub(crate) async fn pump_tokens<F>(body: ByteStream, on_token: &mut F) -> Result<usize>
where
    F: FnMut(&str) + ?Sized,
{
    let mut frames = decode_frames(body);
    let mut state = StreamState::Idle;
    let mut forwarded = 0;

    while let Some(frame) = frames.next().await {
        if state == StreamState::Idle {
            state = state.advance(StreamState::Streaming);
        }

        match frame? {
            StreamFrame::Token(token) => {
                on_token(&token);
                forwarded += 1;
            }
            StreamFrame::Done => {
                // the rest of the body is dropped unread
                state = state.advance(StreamState::Draining);
                drop(frames);
                state.advance(StreamState::Done);
                tracing::debug!(tokens = forwarded, "stream finished at [DONE]");
                return Ok(forwarded);
            }
        }
    }

    state.advance(StreamState::Done);
    tracing::debug!(tokens = forwarded, "stream finished at end of transport");

    Ok(forwarded)
}
