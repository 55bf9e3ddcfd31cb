//! Best-effort post-processing of free-text model output.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::extract_json_object;

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;
pub const MAX_SUMMARY_CHARS: usize = 600;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewFeedback {
    pub score: Option<u8>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub summary: String,
    /// False when no JSON could be recovered and `summary` is the raw text.
    pub structured: bool,
}

impl InterviewFeedback {
    fn unstructured(raw: &str) -> Self {
        Self {
            score: None,
            strengths: Vec::new(),
            improvements: Vec::new(),
            summary: raw.trim().to_string(),
            structured: false,
        }
    }
}

/// Accepts `7`, `7.6`, `"7"` and `"7/10"`; anything else is `None`.
fn parse_score(value: Option<&Value>) -> Option<u8> {
    let raw = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.split('/').next()?.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !raw.is_finite() {
        return None;
    }
    Some(raw.round().clamp(MIN_SCORE as f64, MAX_SCORE as f64) as u8)
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
        _ => Vec::new(),
    }
}

pub fn parse_feedback(raw: &str) -> InterviewFeedback {
    let object = extract_json_object(raw)
        .and_then(|json| serde_json::from_str::<Value>(json).ok())
        .filter(Value::is_object);

    let Some(object) = object else {
        return InterviewFeedback::unstructured(raw);
    };

    let summary = object
        .get("summary")
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    InterviewFeedback {
        score: parse_score(object.get("score")),
        strengths: string_list(object.get("strengths")),
        improvements: string_list(object.get("improvements")),
        summary,
        structured: true,
    }
}

/// Trims, drops wrapping quotes and caps the length on a char boundary.
pub fn clean_summary(raw: &str) -> String {
    let mut text = raw.trim();
    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”')] {
        if let Some(inner) = text
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            text = inner.trim();
        }
    }
    text.chars().take(MAX_SUMMARY_CHARS).collect::<String>().trim_end().to_string()
}
