// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly from profile facts, recent turns and the new input.

use lumen_core::{ChatTurn, ProfileMap};
use lumen_memory::BEHAVIOR_KEY;

/// Builds the completion prompt for one user turn.
///
/// Layout: a system line, the known profile facts (behavior last), the
/// recent conversation, then the new user line and an open assistant line.
pub fn build_prompt(
    assistant_name: &str,
    profile: &ProfileMap,
    history: &[ChatTurn],
    input: &str,
) -> String {
    let mut prompt = format!(
        "You are {assistant_name}, a helpful assistant running locally for one user. \
         Use what you know about the user when it is relevant.\n"
    );

    let facts: Vec<String> = profile
        .iter()
        .filter(|(key, value)| key.as_str() != BEHAVIOR_KEY && !value.is_null())
        .map(|(key, value)| format!("- {key}: {value}"))
        .collect();
    if !facts.is_empty() {
        prompt.push_str("\nKnown facts about the user:\n");
        prompt.push_str(&facts.join("\n"));
        prompt.push('\n');
    }
    if let Some(behavior) = profile.get(BEHAVIOR_KEY).and_then(|v| v.as_map())
        && !behavior.is_empty()
    {
        prompt.push_str("\nObserved behavior:\n");
        for (key, value) in behavior {
            prompt.push_str(&format!("- {key}: {value}\n"));
        }
    }

    if !history.is_empty() {
        prompt.push_str("\nConversation so far:\n");
        for turn in history {
            prompt.push_str(&format!("{}: {}\n", turn.role.label(), turn.content));
        }
    }

    prompt.push_str(&format!("\nUser: {input}\nAssistant:"));
    prompt
}
