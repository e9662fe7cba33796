use std::{collections::HashSet, sync::LazyLock};

use regex::Regex;
use serde_json::Value;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9_.+\-]+@[a-zA-Z0-9\-]+\.[a-zA-Z0-9.\-]+").expect("valid email regex")
});

/// Distinct emails in first-seen order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExtractedEmails {
    pub emails: Vec<String>,
    /// Set when some nested value sat deeper than the allowed depth and was skipped.
    pub depth_limit_hit: bool,
}

#[cfg(test)]
pub(crate) fn is_email(candidate: &str) -> bool {
    EMAIL_RE
        .find(candidate)
        .is_some_and(|m| m.start() == 0 && m.end() == candidate.len())
}

/// Collects every email-looking substring from the string leaves of `value`.
///
/// Object values and array elements are visited in order, keys are ignored.
/// Containers nested deeper than `max_depth` levels below the root are not
/// descended into.
pub fn extract_emails(value: &Value, max_depth: usize) -> ExtractedEmails {
    let mut seen = HashSet::new();
    let mut result = ExtractedEmails::default();
    let mut stack: Vec<(&Value, usize)> = vec![(value, 0)];

    while let Some((current, depth)) = stack.pop() {
        match current {
            Value::String(text) => {
                for found in EMAIL_RE.find_iter(text) {
                    if seen.insert(found.as_str()) {
                        result.emails.push(found.as_str().to_string());
                    }
                }
            }
            Value::Array(items) if depth < max_depth => {
                stack.extend(items.iter().rev().map(|v| (v, depth + 1)));
            }
            Value::Object(map) if depth < max_depth => {
                stack.extend(map.values().rev().map(|v| (v, depth + 1)));
            }
            Value::Array(_) | Value::Object(_) => result.depth_limit_hit = true,
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    result
}
