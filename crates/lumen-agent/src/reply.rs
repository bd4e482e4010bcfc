// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User-facing boundary that turns model errors into fixed fallback text.
//!
//! Inside the crate graph model calls return `Result`; only the text shown
//! to the user is flattened into fallback strings here.

use futures::StreamExt;
use lumen_core::{CompletionRequest, LanguageModel, LumenError};
use tracing::warn;

/// Shown when the server answered with a non-success status.
pub const REQUEST_FAILED: &str = "Sorry, I couldn't process that request.";

/// Shown when the server cannot be reached or does not answer in time.
pub const NOT_RESPONDING: &str = "Error: LLM is not responding. Is Ollama running?";

/// Maps a request error to the text shown in place of a reply.
pub fn fallback_message(err: &LumenError) -> &'static str {
    if err.is_unavailable() {
        NOT_RESPONDING
    } else {
        REQUEST_FAILED
    }
}

/// Formats the final chunk emitted when a stream breaks part-way.
pub fn stream_error_chunk(err: &LumenError) -> String {
    format!("[Error streaming: {err}]")
}

/// Completes `request`, substituting a fallback string on failure.
pub async fn complete_with_fallback(model: &dyn LanguageModel, request: CompletionRequest) -> String {
    match model.complete(request).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, "completion failed");
            fallback_message(&e).to_string()
        }
    }
}

/// Streams `request`, passing every chunk to `sink` as it arrives, and
/// returns the full text the user saw (fallback and error chunks included).
pub async fn stream_with_fallback<F>(
    model: &dyn LanguageModel,
    request: CompletionRequest,
    mut sink: F,
) -> String
where
    F: FnMut(&str) + Send,
{
    let mut stream = match model.stream(request).await {
        Ok(stream) => stream,
        Err(e) => {
            warn!(error = %e, "stream request failed");
            let text = fallback_message(&e);
            sink(text);
            return text.to_string();
        }
    };

    let mut collected = String::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                sink(&chunk);
                collected.push_str(&chunk);
            }
            Err(e) => {
                warn!(error = %e, "stream broke mid-reply");
                let chunk = stream_error_chunk(&e);
                sink(&chunk);
                collected.push_str(&chunk);
                break;
            }
        }
    }
    collected
}
