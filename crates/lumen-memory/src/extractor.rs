// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pattern-based fact extraction from the latest user utterance.
//!
//! Each pattern contributes at most one fact (its first match), and the
//! patterns are independent of one another, so one sentence can yield
//! several facts. Nothing here calls the language model.

use std::sync::LazyLock;

use lumen_core::{ChatTurn, Role};
use regex::Regex;
use tracing::debug;

use crate::types::ExtractedFact;

/// Relations recognised in `my <relation>'s name is X`.
pub const RELATIONS: &[&str] = &[
    "friend", "brother", "sister", "mother", "mom", "father", "dad", "wife", "husband",
    "partner", "son", "daughter", "boss", "dog", "cat",
];

/// Words that end a captured value: everything after them belongs to
/// another clause ("Paris and I work as ...").
const CLAUSE_CONNECTORS: &[&str] = &[
    "and", "but", "or", "so", "because", "since", "while", "who", "which", "where", "when",
    "though", "although",
];

const ARTICLES: &[&str] = &["a", "an", "the"];

#[derive(Debug, Clone, Copy)]
enum Casing {
    Title,
    Lower,
}

struct FactPattern {
    /// Fixed key, or `None` when the key comes from the first capture group.
    key: Option<&'static str>,
    regex: Regex,
    casing: Casing,
}

static PATTERNS: LazyLock<Vec<FactPattern>> = LazyLock::new(|| {
    let relations = RELATIONS.join("|");
    vec![
        FactPattern {
            key: Some("name"),
            regex: Regex::new(r"(?i)\bmy name is ([a-z ]+)").unwrap(),
            casing: Casing::Title,
        },
        FactPattern {
            key: Some("preferred_name"),
            regex: Regex::new(r"(?i)\bjust call me ([a-z]+)").unwrap(),
            casing: Casing::Title,
        },
        FactPattern {
            key: None,
            regex: Regex::new(&format!(r"(?i)\bmy ({relations})(?:'s|’s)? name is ([a-z ]+)"))
                .unwrap(),
            casing: Casing::Title,
        },
        FactPattern {
            key: Some("fav_food"),
            regex: Regex::new(r"(?i)\b(?:i like|i love|i enjoy|my favorite food is) ([a-z ]+)")
                .unwrap(),
            casing: Casing::Lower,
        },
        FactPattern {
            key: Some("location"),
            regex: Regex::new(r"(?i)\bi live in ([a-z ]+)").unwrap(),
            casing: Casing::Title,
        },
        FactPattern {
            key: Some("job"),
            regex: Regex::new(r"(?i)\bi (?:work as|am an|am a) ([a-z ]+)").unwrap(),
            casing: Casing::Title,
        },
    ]
});

/// Stateless extractor of profile facts from user text.
#[derive(Debug, Clone, Copy, Default)]
pub struct FactExtractor;

impl FactExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts facts from the most recent user turn. Earlier turns and
    /// assistant turns are ignored.
    pub fn extract(&self, turns: &[ChatTurn]) -> Vec<ExtractedFact> {
        turns
            .iter()
            .rev()
            .find(|turn| turn.role == Role::User)
            .map(|turn| self.extract_text(&turn.content))
            .unwrap_or_default()
    }

    /// Extracts facts from a single user utterance.
    pub fn extract_text(&self, text: &str) -> Vec<ExtractedFact> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let mut facts = Vec::new();
        for pattern in PATTERNS.iter() {
            let Some(caps) = pattern.regex.captures(text) else {
                continue;
            };
            let (key, raw) = match pattern.key {
                Some(key) => (key.to_string(), caps.get(1)),
                None => (
                    format!("{}_name", caps[1].to_lowercase()),
                    caps.get(2),
                ),
            };
            let Some(value) = raw.and_then(|m| clean_capture(m.as_str())) else {
                continue;
            };
            let value = match pattern.casing {
                Casing::Title => title_case(&value),
                Casing::Lower => value.to_lowercase(),
            };
            debug!(key = %key, value = %value, "extracted fact");
            facts.push(ExtractedFact::new(key, value));
        }
        facts
    }
}

/// Clips a capture at the first clause connector and drops a leading
/// article. Returns `None` when nothing is left.
fn clean_capture(raw: &str) -> Option<String> {
    let mut words: Vec<&str> = raw
        .split_whitespace()
        .take_while(|w| !CLAUSE_CONNECTORS.contains(&w.to_lowercase().as_str()))
        .collect();
    if words
        .first()
        .is_some_and(|w| ARTICLES.contains(&w.to_lowercase().as_str()))
    {
        words.remove(0);
    }
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
