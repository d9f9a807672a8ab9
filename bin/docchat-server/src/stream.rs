//! Line-framed data-stream encoding for chat replies.
//!
//! Each frame is `<code>:<json>\n`:
//! - `0` text delta (JSON string)
//! - `3` error message (JSON string)
//! - `d` finish, `{"finishReason": "stop" | "error"}`
//!
//! This is the framing the browser chat hook consumes; it advertises itself
//! with the `x-vercel-ai-data-stream: v1` response header.

use std::convert::Infallible;

use axum::body::Body;
use axum::http::{header, HeaderValue};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use docchat_app_core::services::ReplyStream;
use docchat_app_core::AppCoreError;
use futures::{Stream, StreamExt};
use serde_json::json;
use tracing::warn;

pub const DATA_STREAM_HEADER: &str = "x-vercel-ai-data-stream";

fn frame(code: char, payload: serde_json::Value) -> Bytes {
    Bytes::from(format!("{code}:{payload}\n"))
}

pub fn text_frame(delta: &str) -> Bytes {
    frame('0', json!(delta))
}

pub fn error_frame(message: &str) -> Bytes {
    frame('3', json!(message))
}

pub fn finish_frame(reason: &str) -> Bytes {
    frame('d', json!({ "finishReason": reason }))
}

fn client_message(e: &AppCoreError) -> &'static str {
    match e {
        AppCoreError::Conflict(_) => "This chat belongs to another user.",
        _ => "An error occurred.",
    }
}

struct Encoder {
    inner: ReplyStream,
    failed: bool,
    finished: bool,
}

/// Encode a reply as data-stream frames, ending with a single finish frame.
pub fn encode(reply: ReplyStream) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    let encoder = Encoder {
        inner: reply,
        failed: false,
        finished: false,
    };
    futures::stream::unfold(encoder, |mut enc| async move {
        if enc.finished {
            return None;
        }
        let bytes = match enc.inner.next().await {
            Some(Ok(delta)) => text_frame(&delta),
            Some(Err(e)) => {
                warn!(error = %e, "reply stream failed");
                enc.failed = true;
                error_frame(client_message(&e))
            }
            None => {
                enc.finished = true;
                finish_frame(if enc.failed { "error" } else { "stop" })
            }
        };
        Some((Ok(bytes), enc))
    })
}

/// Wrap a reply into a streaming HTTP response.
pub fn into_response(reply: ReplyStream) -> Response {
    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8")),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
        ],
        [(DATA_STREAM_HEADER, "v1")],
        Body::from_stream(encode(reply)),
    )
        .into_response()
}
