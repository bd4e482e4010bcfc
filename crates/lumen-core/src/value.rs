// SPDX-FileCopyrightText: 2026 Lumen Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dynamically shaped values stored in the user profile.
//!
//! Profile entries can hold any JSON-compatible shape, so the profile is a
//! map of [`ProfileValue`] rather than a fixed struct. The untagged serde
//! representation keeps the on-disk file plain JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The whole profile (and memory record metadata): string keys to values.
pub type ProfileMap = BTreeMap<String, ProfileValue>;

/// A JSON-compatible value held under a profile key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<ProfileValue>),
    Map(ProfileMap),
}

impl ProfileValue {
    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ProfileValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the nested map, if this is a map.
    pub fn as_map(&self) -> Option<&ProfileMap> {
        match self {
            ProfileValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Returns the list items, if this is a list.
    pub fn as_list(&self) -> Option<&[ProfileValue]> {
        match self {
            ProfileValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ProfileValue::Null)
    }
}

impl From<&str> for ProfileValue {
    fn from(s: &str) -> Self {
        ProfileValue::String(s.to_string())
    }
}

impl From<String> for ProfileValue {
    fn from(s: String) -> Self {
        ProfileValue::String(s)
    }
}

impl From<bool> for ProfileValue {
    fn from(b: bool) -> Self {
        ProfileValue::Bool(b)
    }
}

impl From<i64> for ProfileValue {
    fn from(n: i64) -> Self {
        ProfileValue::Number(n.into())
    }
}

impl From<f64> for ProfileValue {
    /// Non-finite floats have no JSON form and become `Null`.
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n)
            .map(ProfileValue::Number)
            .unwrap_or(ProfileValue::Null)
    }
}

impl<T: Into<ProfileValue>> From<Vec<T>> for ProfileValue {
    fn from(items: Vec<T>) -> Self {
        ProfileValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<ProfileMap> for ProfileValue {
    fn from(map: ProfileMap) -> Self {
        ProfileValue::Map(map)
    }
}

impl std::fmt::Display for ProfileValue {
    /// Strings print bare; every other shape prints as compact JSON.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileValue::String(s) => write!(f, "{s}"),
            other => match serde_json::to_string(other) {
                Ok(json) => write!(f, "{json}"),
                Err(_) => write!(f, "<unprintable>"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decodes_every_json_shape() {
        let json = r#"{
            "name": "John",
            "age": 42,
            "height": 1.8,
            "verified": true,
            "nickname": null,
            "tags": ["a", 1, false],
            "behavior": {"mood": "calm", "goals": ["ship it"]}
        }"#;
        let map: ProfileMap = serde_json::from_str(json).unwrap();
        assert_eq!(map["name"], ProfileValue::from("John"));
        assert_eq!(map["age"], ProfileValue::from(42_i64));
        assert_eq!(map["verified"], ProfileValue::Bool(true));
        assert!(map["nickname"].is_null());
        assert_eq!(map["tags"].as_list().unwrap().len(), 3);
        let behavior = map["behavior"].as_map().unwrap();
        assert_eq!(behavior["mood"].as_str(), Some("calm"));
    }

    #[test]
    fn integers_stay_integers() {
        let value: ProfileValue = serde_json::from_str("7").unwrap();
        assert_eq!(serde_json::to_string(&value).unwrap(), "7");
    }

    #[test]
    fn non_finite_float_becomes_null() {
        assert!(ProfileValue::from(f64::NAN).is_null());
    }

    #[test]
    fn display_prints_strings_bare() {
        assert_eq!(ProfileValue::from("Paris").to_string(), "Paris");
        assert_eq!(
            ProfileValue::from(vec!["a", "b"]).to_string(),
            r#"["a","b"]"#
        );
    }

    fn arb_value() -> impl Strategy<Value = ProfileValue> {
        let leaf = prop_oneof![
            Just(ProfileValue::Null),
            any::<bool>().prop_map(ProfileValue::Bool),
            any::<i64>().prop_map(ProfileValue::from),
            "[a-zA-Z0-9 ]{0,12}".prop_map(ProfileValue::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(ProfileValue::List),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(ProfileValue::Map),
            ]
        })
    }

    proptest! {
        #[test]
        fn arbitrary_profile_values_survive_json(value in arb_value()) {
            let json = serde_json::to_string(&value).unwrap();
            let back: ProfileValue = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back, value);
        }
    }
}
