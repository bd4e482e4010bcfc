// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language-model inference of behavioral traits from recent turns.
//!
//! The analyzer asks the model for a JSON object restricted to the
//! [`BehaviorSnapshot`] vocabulary and parses whatever object it finds in
//! the reply. Failures never propagate: they are logged and reported as
//! `None`, which callers must keep distinct from an empty snapshot.

use std::sync::Arc;

use lumen_core::{ChatTurn, CompletionRequest, LanguageModel, LumenError, Role};
use tracing::{debug, warn};

use crate::types::BehaviorSnapshot;

/// Default number of exchanges (user + assistant pairs) sent for analysis.
pub const DEFAULT_WINDOW: usize = 10;

const BEHAVIOR_PROMPT: &str = r#"You are a system that analyzes user behavior and emotional context from conversation. Given the following recent conversation between the user and assistant, infer the user's:
  - mood or emotional state (e.g., happy, sad, anxious, neutral)
  - tone (e.g., polite, frustrated, curious)
  - goals or intentions (if any apparent)
  - habits or routine hints (e.g., mentions waking times, study habits, work styles)
  - preferences or interests mentioned (e.g., likes/dislikes)
Respond ONLY as a JSON object, with keys among: "mood", "tone", "goals", "habits", "preferences", "emotional_cues". For keys with multiple items, use a JSON array; for single values, use a string. If you cannot infer something, omit that key. Do NOT output any explanation, only the JSON.

Conversation:
{conversation}

JSON:"#;

/// Infers a [`BehaviorSnapshot`] from recent conversation.
pub struct BehaviorAnalyzer {
    model: Arc<dyn LanguageModel>,
    window: usize,
    temperature: f32,
}

impl BehaviorAnalyzer {
    /// Creates an analyzer looking at the last `window` exchanges.
    pub fn new(model: Arc<dyn LanguageModel>, window: usize, temperature: f32) -> Self {
        Self {
            model,
            window: window.max(1),
            temperature,
        }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Analyzes the last `2 * window` turns.
    ///
    /// Returns `Some(empty)` without calling the model when there is nothing
    /// to analyze, and `None` when the model call or its output fails.
    pub async fn analyze(&self, turns: &[ChatTurn]) -> Option<BehaviorSnapshot> {
        let start = turns.len().saturating_sub(self.window * 2);
        let transcript = render_transcript(&turns[start..]);
        if transcript.trim().is_empty() {
            return Some(BehaviorSnapshot::default());
        }

        let request = CompletionRequest::new(build_behavior_prompt(&transcript))
            .with_temperature(self.temperature);
        let raw = match self.model.complete(request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "behavior analysis request failed");
                return None;
            }
        };

        match parse_behavior_response(&raw) {
            Ok(snapshot) => {
                debug!(?snapshot, "inferred behavior");
                Some(snapshot)
            }
            Err(e) => {
                warn!(error = %e, "behavior analysis reply unusable");
                debug!(raw = %raw, "raw behavior reply");
                None
            }
        }
    }
}

/// Renders turns as `User: ...` / `Assistant: ...` lines, flattening
/// newlines inside each message.
pub fn render_transcript(turns: &[ChatTurn]) -> String {
    let mut out = String::new();
    for turn in turns {
        let content = turn.content.replace(['\r', '\n'], " ");
        let label = match turn.role {
            Role::User => "User",
            Role::Assistant => "Assistant",
        };
        out.push_str(&format!("{label}: {content}\n"));
    }
    out
}

fn build_behavior_prompt(transcript: &str) -> String {
    BEHAVIOR_PROMPT.replace("{conversation}", transcript.trim_end())
}

/// Parses the JSON object spanning the first `{` to the last `}` of a reply.
pub fn parse_behavior_response(raw: &str) -> Result<BehaviorSnapshot, LumenError> {
    let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
        return Err(LumenError::Parse {
            message: "no JSON object in reply".into(),
        });
    };
    if end < start {
        return Err(LumenError::Parse {
            message: "unbalanced braces in reply".into(),
        });
    }

    serde_json::from_str::<BehaviorSnapshot>(&raw[start..=end]).map_err(|e| LumenError::Parse {
        message: format!("invalid behavior JSON: {e}"),
    })
}
