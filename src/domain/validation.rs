use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};

pub const QUESTION_MIN_CHARS: usize = 10;
pub const QUESTION_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 10;
pub const OPTION_MAX_CHARS: usize = 100;

/// Raw poll-creation input, exactly as submitted by a client form.
#[derive(Debug, Clone, Deserialize)]
pub struct PollDraft {
    pub question: String,
    #[serde(default)]
    pub description: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// Field name -> user-facing message. Empty map means the draft is valid.
pub type ValidationErrors = BTreeMap<&'static str, String>;

/// Checks a draft against the poll creation rules. Each field is evaluated
/// independently so every offending field carries its own message; within
/// `options` the first violated rule wins.
pub fn validate(draft: &PollDraft, now: DateTime<Utc>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    let question = draft.question.trim();
    if question.is_empty() {
        errors.insert("question", "Question is required".to_string());
    } else {
        let len = question.chars().count();
        if !(QUESTION_MIN_CHARS..=QUESTION_MAX_CHARS).contains(&len) {
            errors.insert(
                "question",
                format!(
                    "Question must be between {QUESTION_MIN_CHARS} and {QUESTION_MAX_CHARS} characters"
                ),
            );
        }
    }

    if draft.description.trim().chars().count() > DESCRIPTION_MAX_CHARS {
        errors.insert(
            "description",
            format!("Description must be {DESCRIPTION_MAX_CHARS} characters or fewer"),
        );
    }

    if let Some(message) = option_rule_violation(&draft.options) {
        errors.insert("options", message);
    }

    if let Some(raw) = normalized_expiry(draft) {
        match DateTime::parse_from_rfc3339(raw) {
            Ok(expiry) if expiry.with_timezone(&Utc) > now => {}
            Ok(_) => {
                errors.insert("expires_at", "Expiry date must be in the future".to_string());
            }
            Err(_) => {
                errors.insert(
                    "expires_at",
                    "Expiry date must be a valid RFC 3339 timestamp".to_string(),
                );
            }
        }
    }

    errors
}

/// Trimmed, non-blank option texts in submitted order. Blank entries are
/// dropped rather than rejected, matching how the form pads with empty rows.
pub fn clean_options(options: &[String]) -> Vec<&str> {
    options
        .iter()
        .map(|text| text.trim())
        .filter(|text| !text.is_empty())
        .collect()
}

/// A blank expiry string counts as "no expiry".
pub fn normalized_expiry(draft: &PollDraft) -> Option<&str> {
    draft
        .expires_at
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
}

fn option_rule_violation(options: &[String]) -> Option<String> {
    let valid = clean_options(options);

    if valid.len() < MIN_OPTIONS {
        return Some(format!("At least {MIN_OPTIONS} options are required"));
    }
    if valid.len() > MAX_OPTIONS {
        return Some(format!("No more than {MAX_OPTIONS} options are allowed"));
    }

    let distinct: HashSet<String> = valid.iter().map(|text| text.to_lowercase()).collect();
    if distinct.len() < valid.len() {
        return Some("Options must be unique".to_string());
    }

    if valid
        .iter()
        .any(|text| text.chars().count() > OPTION_MAX_CHARS)
    {
        return Some(format!("Each option must be {OPTION_MAX_CHARS} characters or fewer"));
    }

    None
}
