// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language-model trait for local LLM servers (Ollama and friends).

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::LumenError;
use crate::traits::adapter::PluginAdapter;
use crate::types::CompletionRequest;

/// A finite, non-restartable stream of response text chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<String, LumenError>> + Send>>;

/// A text-in, text-out language model.
///
/// Both operations surface failures as `Err`. Converting those failures into
/// user-visible fallback text is the caller's job, so the memory pipeline
/// can still tell a failed call from a real reply.
#[async_trait]
pub trait LanguageModel: PluginAdapter {
    /// Sends a prompt and returns the full reply text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, LumenError>;

    /// Sends a prompt and returns the reply as a stream of text chunks.
    async fn stream(&self, request: CompletionRequest) -> Result<ChunkStream, LumenError>;
}
