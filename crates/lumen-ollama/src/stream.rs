// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Newline-delimited JSON parser for streamed `/api/generate` replies.
//!
//! Ollama streams one JSON object per line. Byte chunks from the HTTP body
//! do not respect line boundaries, so bytes are buffered until a newline
//! arrives. Lines that are not valid JSON (keep-alives, partial garbage)
//! are skipped.

use std::collections::VecDeque;
use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use lumen_core::{ChunkStream, LumenError};
use tracing::debug;

use crate::types::GenerateResponse;

type ByteStream<E> = Pin<Box<dyn Stream<Item = Result<Bytes, E>> + Send>>;

struct LineReader<E> {
    body: ByteStream<E>,
    buffer: Vec<u8>,
    ready: VecDeque<Result<String, LumenError>>,
    finished: bool,
}

impl<E: std::fmt::Display> LineReader<E> {
    fn drain_complete_lines(&mut self) {
        while !self.finished {
            let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') else {
                break;
            };
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            self.handle_line(&line);
        }
    }

    fn handle_line(&mut self, line: &[u8]) {
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            return;
        }
        let chunk = match serde_json::from_slice::<GenerateResponse>(trimmed) {
            Ok(chunk) => chunk,
            Err(e) => {
                debug!(error = %e, "skipping unparseable stream line");
                return;
            }
        };
        if let Some(message) = chunk.error {
            self.ready.push_back(Err(LumenError::Provider {
                message: format!("model error during stream: {message}"),
                source: None,
            }));
            self.finished = true;
            return;
        }
        if !chunk.response.is_empty() {
            self.ready.push_back(Ok(chunk.response));
        }
        if chunk.done {
            self.finished = true;
        }
    }
}

/// Turns an HTTP body into a stream of response text chunks.
///
/// Ends after the `done: true` line, at end of body, or after the first
/// transport or server error (which is yielded as the final item).
pub fn parse_ndjson_stream<S, E>(body: S) -> ChunkStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let reader = LineReader {
        body: Box::pin(body),
        buffer: Vec::new(),
        ready: VecDeque::new(),
        finished: false,
    };

    Box::pin(stream::unfold(reader, |mut reader| async move {
        loop {
            if let Some(item) = reader.ready.pop_front() {
                return Some((item, reader));
            }
            if reader.finished {
                return None;
            }
            match reader.body.next().await {
                Some(Ok(bytes)) => {
                    reader.buffer.extend_from_slice(&bytes);
                    reader.drain_complete_lines();
                }
                Some(Err(e)) => {
                    reader.finished = true;
                    reader.ready.push_back(Err(LumenError::Provider {
                        message: format!("stream read failed: {e}"),
                        source: None,
                    }));
                }
                None => {
                    // A final object without a trailing newline still counts.
                    let rest = std::mem::take(&mut reader.buffer);
                    reader.handle_line(&rest);
                    reader.finished = true;
                }
            }
        }
    }))
}
