// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types for the memory pipeline.

use lumen_core::{ProfileMap, ProfileValue};
use serde::{Deserialize, Serialize};

/// A `(key, value)` fact pulled out of a user utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFact {
    pub key: String,
    pub value: String,
}

impl ExtractedFact {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// One inferred behavioral attribute: a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BehaviorAttribute {
    Text(String),
    List(Vec<String>),
}

impl From<&BehaviorAttribute> for ProfileValue {
    fn from(attr: &BehaviorAttribute) -> Self {
        match attr {
            BehaviorAttribute::Text(s) => ProfileValue::String(s.clone()),
            BehaviorAttribute::List(items) => ProfileValue::from(items.clone()),
        }
    }
}

/// Behavioral traits inferred from recent conversation.
///
/// An absent field means "not inferred". Snapshots replace each other
/// wholesale in the profile; they are never merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<BehaviorAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<BehaviorAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<BehaviorAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habits: Option<BehaviorAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<BehaviorAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_cues: Option<BehaviorAttribute>,
}

impl BehaviorSnapshot {
    /// The attribute names a snapshot can carry, in display order.
    pub const KEYS: [&'static str; 6] = [
        "mood",
        "tone",
        "goals",
        "habits",
        "preferences",
        "emotional_cues",
    ];

    /// True when nothing was inferred.
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, value)| value.is_none())
    }

    fn fields(&self) -> [(&'static str, &Option<BehaviorAttribute>); 6] {
        [
            ("mood", &self.mood),
            ("tone", &self.tone),
            ("goals", &self.goals),
            ("habits", &self.habits),
            ("preferences", &self.preferences),
            ("emotional_cues", &self.emotional_cues),
        ]
    }

    /// Converts the snapshot into the profile value stored under `"behavior"`.
    pub fn to_profile_value(&self) -> ProfileValue {
        let map: ProfileMap = self
            .fields()
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| (key.to_string(), v.into())))
            .collect();
        ProfileValue::Map(map)
    }
}

/// A piece of text held in vector memory.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    /// Unique identifier assigned on insert.
    pub id: String,
    pub text: String,
    /// Always carries `text`, and `timestamp` when added by the manager.
    pub metadata: ProfileMap,
    pub embedding: Vec<f32>,
}

/// What `process_turn` committed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnReport {
    /// Profile keys written from extracted facts, in extraction order.
    pub facts_written: Vec<String>,
    /// A new behavior snapshot replaced the stored one.
    pub behavior_updated: bool,
    /// The exchange (or its summary) was added to vector memory.
    pub memory_indexed: bool,
    /// The indexed text is a model-written summary rather than the raw snippet.
    pub summarized: bool,
    /// At least one profile write failed to reach disk. The in-memory
    /// profile still holds the new values.
    pub persist_failed: bool,
}

/// Cosine similarity of two vectors of equal length.
///
/// Returns `0.0` if either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a <= f32::EPSILON || norm_b <= f32::EPSILON {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Scales a vector to unit length; zero vectors are returned unchanged.
pub fn l2_normalize(vec: &[f32]) -> Vec<f32> {
    let norm: f32 = vec.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        vec.iter().map(|v| v / norm).collect()
    } else {
        vec.to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_decodes_string_and_list_values() {
        let snapshot: BehaviorSnapshot =
            serde_json::from_str(r#"{"mood":"happy","goals":["learn rust","ship"]}"#).unwrap();
        assert_eq!(
            snapshot.mood,
            Some(BehaviorAttribute::Text("happy".into()))
        );
        assert_eq!(
            snapshot.goals,
            Some(BehaviorAttribute::List(vec!["learn rust".into(), "ship".into()]))
        );
        assert!(snapshot.tone.is_none());
        assert!(!snapshot.is_empty());
    }

    #[test]
    fn snapshot_rejects_wrong_shapes() {
        assert!(serde_json::from_str::<BehaviorSnapshot>(r#"{"mood":3}"#).is_err());
        assert!(serde_json::from_str::<BehaviorSnapshot>(r#"{"goals":[1,2]}"#).is_err());
        assert!(serde_json::from_str::<BehaviorSnapshot>(r#"["mood"]"#).is_err());
    }

    #[test]
    fn empty_object_is_empty_snapshot() {
        let snapshot: BehaviorSnapshot = serde_json::from_str("{}").unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot, BehaviorSnapshot::default());
    }

    #[test]
    fn profile_value_omits_absent_attributes() {
        let snapshot = BehaviorSnapshot {
            tone: Some(BehaviorAttribute::Text("curious".into())),
            habits: Some(BehaviorAttribute::List(vec!["runs daily".into()])),
            ..Default::default()
        };
        let value = snapshot.to_profile_value();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["tone"].as_str(), Some("curious"));
        assert_eq!(map["habits"].as_list().unwrap().len(), 1);
    }

    #[test]
    fn cosine_similarity_orthogonal() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(sim.abs() < f32::EPSILON);
    }

    #[test]
    fn cosine_similarity_ignores_magnitude() {
        let sim = cosine_similarity(&[2.0, 0.0], &[5.0, 0.0]);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_similarity_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn l2_normalize_general_vector() {
        let n = l2_normalize(&[3.0, 4.0]);
        assert!((n[0] - 0.6).abs() < 0.001);
        assert!((n[1] - 0.8).abs() < 0.001);
    }

    #[test]
    fn l2_normalize_zero_vector() {
        assert_eq!(l2_normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
    }
}
