use serde::Serialize;
use serde_json::{Map, Value};

use super::{email::extract_emails, log_entry::NO_EMAILS_MARKER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadSource {
    Linkedin,
    Other,
}

impl LeadSource {
    pub fn from_url(url: &str) -> Self {
        match url.to_lowercase().contains("linkedin.com") {
            true => LeadSource::Linkedin,
            false => LeadSource::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadSource::Linkedin => "linkedin",
            LeadSource::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadRecord {
    pub title: String,
    pub source: LeadSource,
    pub url: String,
    pub emails: Vec<String>,
    pub first_name: String,
    pub last_name: String,
}

impl LeadRecord {
    pub fn has_emails(&self) -> bool {
        !self.emails.is_empty()
    }
}

/// Turns one raw Custom Search hit into a lead.
///
/// Emails are collected from the whole item, metadata included.
pub fn parse_result(item: &Value, max_depth: usize) -> LeadRecord {
    let title = string_field(item.get("title"));
    let url = string_field(item.get("link"));
    let source = LeadSource::from_url(&url);

    let extracted = extract_emails(item, max_depth);
    if extracted.depth_limit_hit {
        log::warn!(
            "Email extraction stopped at depth {} for result: {}",
            max_depth,
            url
        );
    }

    let meta = merge_metatags(item);
    let first_name = string_field(meta.get("profile:first_name"));
    let last_name = string_field(meta.get("profile:last_name"));

    if extracted.emails.is_empty() {
        log::warn!("{}", no_emails_message(item));
    }

    LeadRecord {
        title,
        source,
        url,
        emails: extracted.emails,
        first_name,
        last_name,
    }
}

/// Warning logged for a result without emails. Kept on one line so the log
/// viewer can pull the JSON back out.
fn no_emails_message(item: &Value) -> String {
    format!(
        "{}: {}",
        NO_EMAILS_MARKER,
        serde_json::to_string(item).unwrap_or_default()
    )
}

/// Flattens `pagemap.metatags` into one map, later tags overwrite earlier ones.
fn merge_metatags(item: &Value) -> Map<String, Value> {
    let mut meta = Map::new();

    let tags = item
        .get("pagemap")
        .and_then(|p| p.get("metatags"))
        .and_then(Value::as_array);

    for tag in tags.into_iter().flatten() {
        if let Some(tag) = tag.as_object() {
            meta.extend(tag.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
    }

    meta
}

fn string_field(value: Option<&Value>) -> String {
    value.and_then(Value::as_str).unwrap_or_default().to_string()
}
