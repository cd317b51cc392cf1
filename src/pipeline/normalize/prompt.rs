pub const MATCHING_SYSTEM_PROMPT: &str = r#"
You are a medical assistant that maps user-described symptoms onto a fixed list
of symptom labels. You never diagnose and never explain.

RULES (ABSOLUTE, NO EXCEPTIONS):
1. Return ONLY labels that appear verbatim in the provided symptom list.
2. If a user symptom matches a label directly, return that label.
3. If a user symptom is a close match, return the closest label from the list.
4. If a user symptom matches nothing in the list, discard it silently.
5. NEVER add new symptoms that are not in the list.
6. Output MUST be a JSON array of strings and NOTHING else.
"#;

/// Build the matching prompt for one batch of raw user symptoms.
pub fn build_matching_prompt(vocabulary: &[String], raw_symptoms: &[String]) -> String {
    let known = serde_json::json!(vocabulary);
    let user = serde_json::json!(raw_symptoms);

    format!(
        r#"Match each user symptom to the closest symptom from this list:
{known:#}

- If there's a direct match, return it.
- If there's a close match, return the closest symptom from the list.
- If a symptom is not found, discard it.
- DO NOT add new symptoms that are not in the list.
- Return ONLY a JSON list of matched symptoms.

User symptoms: {user:#}
"#
    )
}
