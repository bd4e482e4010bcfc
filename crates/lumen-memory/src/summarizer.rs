// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compacts long exchanges into one or two sentences via the language model.

use std::sync::Arc;

use lumen_core::{CompletionRequest, LanguageModel};
use tracing::{debug, warn};

const SUMMARY_PROMPT: &str = "Please summarize the following conversation exchange into 1-2 concise sentences focusing on important personal facts, goals, or interests mentioned:\n\n{text}\n\nSummary:";

/// Summarizes text, falling back to the input whenever the model cannot help.
pub struct Summarizer {
    model: Arc<dyn LanguageModel>,
}

impl Summarizer {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Returns a trimmed summary of `text`, or `text` unchanged when the
    /// model fails or replies with only whitespace.
    pub async fn summarize(&self, text: &str) -> String {
        let request = CompletionRequest::new(SUMMARY_PROMPT.replace("{text}", text));
        match self.model.complete(request).await {
            Ok(reply) if !reply.trim().is_empty() => {
                let summary = reply.trim().to_string();
                debug!(input_len = text.len(), summary_len = summary.len(), "summarized text");
                summary
            }
            Ok(_) => {
                warn!("summarizer returned an empty reply, keeping original text");
                text.to_string()
            }
            Err(e) => {
                warn!(error = %e, "summarizer failed, keeping original text");
                text.to_string()
            }
        }
    }
}
