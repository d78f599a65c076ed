//! Recommendation domain types
//!
//! These are the request/response shapes shared between the
//! recommendation service and its callers. `EnrichedOption` is
//! serialized camelCase because it is the contract the web UI reads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level recommendation category chosen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Entertainment,
    Travel,
    Eat,
    Gift,
    Buy,
}

impl Category {
    /// Stable lowercase name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Entertainment => "entertainment",
            Category::Travel => "travel",
            Category::Eat => "eat",
            Category::Gift => "gift",
            Category::Buy => "buy",
        }
    }
}

/// Entertainment sub-route derived from the answer keyed "intent"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Watch,
    Play,
    Listen,
    Read,
}

impl Intent {
    /// Parse the "intent" answer; absent or unrecognized values mean Watch
    pub fn from_answers(answers: &Answers) -> Self {
        match answers.get("intent").map(|v| v.joined()).as_deref() {
            Some("watch") => Intent::Watch,
            Some("play") => Intent::Play,
            Some("listen") => Intent::Listen,
            Some("read") => Intent::Read,
            _ => Intent::Watch,
        }
    }
}

/// A single survey answer: free text or a multi-select list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    List(Vec<String>),
}

impl AnswerValue {
    /// Flatten to display form; lists are comma-joined
    pub fn joined(&self) -> String {
        match self {
            AnswerValue::Text(s) => s.clone(),
            AnswerValue::List(items) => items.join(", "),
        }
    }

    /// Flatten to a provider filter list. Category filter parameters
    /// take a strict comma-separated alias list, no spaces.
    pub fn csv(&self) -> String {
        match self {
            AnswerValue::Text(s) => s.clone(),
            AnswerValue::List(items) => items.join(","),
        }
    }
}

/// Answers keyed by question id, in stable key order
pub type Answers = BTreeMap<String, AnswerValue>;

/// One recommendation request, created when a survey completes
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub category: Category,
    #[serde(default)]
    pub answers: Answers,
}

/// A model-authored recommendation idea, unverified against any catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCandidate {
    pub title: String,
    pub description: String,
    pub reason: String,
    pub search_query: String,
}

/// A recommendation as returned to the presentation layer
///
/// Every option carries a non-empty title and an image (a real catalog
/// image URL or a generated gradient data URL). Category-specific
/// fields (rating, year, streaming services, price, ...) live in the
/// open `extra` map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedOption {
    pub id: String,
    pub title: String,
    pub snippet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl EnrichedOption {
    /// True when this option came from the model rather than a catalog
    pub fn is_ai_generated(&self) -> bool {
        self.extra
            .get("aiGenerated")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }
}
