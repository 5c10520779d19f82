//! Value types held in the shared trial state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Well-known state keys.
pub mod keys {
    /// The trial topic (scalar).
    pub const TOPIC: &str = "topic";
    /// Evidence gathered by the admirer.
    pub const POSITIVE_FINDINGS: &str = "positive_findings";
    /// Evidence gathered by the critic.
    pub const NEGATIVE_FINDINGS: &str = "negative_findings";
    /// Judge instructions for the next round.
    pub const REVIEW_FEEDBACK: &str = "review_feedback";
}

/// A value stored under a state key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    Scalar(String),
    List(Vec<String>),
}

impl StateValue {
    /// Sequence view: a scalar reads as a single-element list.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            Self::Scalar(s) => vec![s.clone()],
            Self::List(items) => items.clone(),
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// Append `content`, coercing a scalar into a one-element list first.
    /// Returns the new length.
    pub(crate) fn push(&mut self, content: String) -> usize {
        let items = match std::mem::replace(self, Self::List(Vec::new())) {
            Self::Scalar(existing) => vec![existing, content],
            Self::List(mut items) => {
                items.push(content);
                items
            }
        };
        let len = items.len();
        *self = Self::List(items);
        len
    }
}

impl From<&str> for StateValue {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<String> for StateValue {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<Vec<String>> for StateValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// Owned, point-in-time copy of the whole state map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    entries: BTreeMap<String, StateValue>,
}

impl StateSnapshot {
    pub(crate) fn new(entries: BTreeMap<String, StateValue>) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&StateValue> {
        self.entries.get(key)
    }

    /// The topic, or an empty string if unset.
    pub fn topic(&self) -> &str {
        self.entries
            .get(keys::TOPIC)
            .and_then(StateValue::as_scalar)
            .unwrap_or("")
    }

    /// Sequence view of `key`; absent keys read as empty.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.entries
            .get(key)
            .map(StateValue::to_list)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
