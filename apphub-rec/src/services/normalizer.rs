//! Response normalizer
//!
//! Converts the chat model's raw text into typed candidates. The model
//! is instructed to return only a JSON array but will sometimes wrap it
//! in prose or use typographic punctuation, so the text is cleaned and
//! the bracketed span extracted before parsing. A response with no
//! parseable array is a terminal error for the orchestration call.

use crate::error::RecError;
use apphub_common::types::RawCandidate;
use serde_json::Value;

/// Parse model output into candidates
pub fn parse_candidates(content: &str) -> Result<Vec<RawCandidate>, RecError> {
    let cleaned = clean_model_text(content);

    let span = extract_array_span(&cleaned)
        .ok_or_else(|| RecError::parse("no JSON array found in response", content))?;

    let value: Value = serde_json::from_str(span)
        .map_err(|e| RecError::parse(format!("invalid JSON: {}", e), content))?;

    let items = value
        .as_array()
        .ok_or_else(|| RecError::parse("response is not an array", content))?;

    Ok(items.iter().map(coerce_candidate).collect())
}

/// Replace smart typographic punctuation with plain-ASCII equivalents
fn clean_model_text(content: &str) -> String {
    let mut cleaned = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '\u{201C}' | '\u{201D}' => cleaned.push('"'),
            '\u{2018}' | '\u{2019}' => cleaned.push('\''),
            '\u{2013}' | '\u{2014}' => cleaned.push('-'),
            '\u{2026}' => cleaned.push_str("..."),
            '\u{00A0}' => cleaned.push(' '),
            other => cleaned.push(other),
        }
    }
    cleaned.trim().to_string()
}

/// Locate the first `[` ... last `]` span (greedy, may span lines)
fn extract_array_span(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Coerce one array element into a candidate, filling defaults
///
/// Missing or empty title becomes "Unknown"; description and reason
/// default to empty; searchQuery falls back to the title.
fn coerce_candidate(value: &Value) -> RawCandidate {
    let field = |name: &str| -> Option<String> {
        value
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let title = field("title").unwrap_or_else(|| "Unknown".to_string());
    let search_query = field("searchQuery").unwrap_or_else(|| title.clone());

    RawCandidate {
        description: field("description").unwrap_or_default(),
        reason: field("reason").unwrap_or_default(),
        title,
        search_query,
    }
}
