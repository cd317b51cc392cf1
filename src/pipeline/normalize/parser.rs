use std::collections::HashSet;

use super::MatcherParseError;
use crate::vocabulary::LabelVocabulary;

/// Parse the matcher's reply into the list of strings it returned.
///
/// Only the reply shape is checked here; vocabulary membership is enforced by
/// [`retain_vocabulary_labels`].
pub fn parse_matcher_response(response: &str) -> Result<Vec<String>, MatcherParseError> {
    let trimmed = response.trim();
    if trimmed.is_empty() {
        return Err(MatcherParseError::EmptyResponse);
    }

    let json_str = strip_code_fence(trimmed);
    if json_str.is_empty() {
        return Err(MatcherParseError::EmptyResponse);
    }

    let value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| MatcherParseError::InvalidJson(e.to_string()))?;

    let items = value.as_array().ok_or(MatcherParseError::NotAnArray)?;

    // Non-string items can never be vocabulary labels.
    Ok(items
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect())
}

/// Keep only labels that are literally in the vocabulary, first occurrence wins.
pub fn retain_vocabulary_labels(labels: Vec<String>, vocabulary: &LabelVocabulary) -> Vec<String> {
    let mut seen = HashSet::new();
    labels
        .into_iter()
        .filter(|label| vocabulary.contains(label) && seen.insert(label.clone()))
        .collect()
}

/// Unwrap a ```json ... ``` fence if the whole reply is one.
fn strip_code_fence(response: &str) -> &str {
    let Some(rest) = response.strip_prefix("```") else {
        return response;
    };
    // Skip the info string ("json") on the opening fence line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}
