//! Reading back the service's own log output.
//!
//! Lines follow `2024-01-01 12:00:00,000 - LEVEL - message`. Lines that do not
//! start with a timestamp belong to the entry above them.

use std::{io::BufRead, sync::LazyLock};

use chrono::NaiveDateTime;
use regex::Regex;
use serde_json::Value;

use crate::telemetry::LOG_TIMESTAMP_FORMAT;

pub const NO_EMAILS_MARKER: &str = "No emails found in search result";

static LOG_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2},\d{3}) - (\w+) - (.+)$")
        .expect("valid log line regex")
});

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub timestamp: NaiveDateTime,
    pub level: String,
    pub message: String,
}

impl LogEntry {
    pub fn is_error(&self) -> bool {
        matches!(self.level.as_str(), "ERROR" | "CRITICAL")
    }

    pub fn is_missing_emails(&self) -> bool {
        self.message.contains(NO_EMAILS_MARKER)
    }
}

pub fn parse_log_line(line: &str) -> Option<LogEntry> {
    let caps = LOG_LINE_RE.captures(line.trim())?;
    let timestamp = NaiveDateTime::parse_from_str(&caps[1], LOG_TIMESTAMP_FORMAT).ok()?;

    Some(LogEntry {
        timestamp,
        level: caps[2].to_string(),
        message: caps[3].to_string(),
    })
}

/// Finds the first `{ ... }` span in `message` that parses as JSON.
///
/// Candidates start at each `{` and are tried from the widest closing `}`
/// inward.
pub fn extract_json(message: &str) -> Option<Value> {
    let closes: Vec<usize> = message.match_indices('}').map(|(i, _)| i).collect();

    for (start, _) in message.match_indices('{') {
        for &end in closes.iter().rev().filter(|&&end| end > start) {
            if let Ok(value) = serde_json::from_str::<Value>(&message[start..=end]) {
                if value.is_object() {
                    return Some(value);
                }
            }
        }
    }

    None
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogFilter {
    pub show_errors: bool,
    pub show_no_emails: bool,
    pub show_all: bool,
}

impl Default for LogFilter {
    fn default() -> Self {
        LogFilter {
            show_errors: true,
            show_no_emails: true,
            show_all: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Category {
    Error,
    NoEmails,
    Other,
}

impl LogFilter {
    /// Picks how an entry should be shown, `None` hides it.
    pub fn classify(&self, entry: &LogEntry) -> Option<Category> {
        if self.show_errors && entry.is_error() {
            Some(Category::Error)
        } else if self.show_no_emails && entry.is_missing_emails() {
            Some(Category::NoEmails)
        } else if self.show_all {
            Some(Category::Other)
        } else {
            None
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct LogSummary {
    pub total_lines: usize,
    pub errors: usize,
    pub items_without_emails: usize,
}

/// Walks a log, handing every entry the filter keeps to `emit`.
pub fn scan_log<R: BufRead>(
    reader: R,
    filter: LogFilter,
    mut emit: impl FnMut(Category, &LogEntry),
) -> std::io::Result<LogSummary> {
    let mut summary = LogSummary::default();
    let mut pending: Option<LogEntry> = None;

    let mut flush = |entry: LogEntry, summary: &mut LogSummary| {
        if let Some(category) = filter.classify(&entry) {
            match category {
                Category::Error => summary.errors += 1,
                Category::NoEmails => summary.items_without_emails += 1,
                Category::Other => {}
            }
            emit(category, &entry);
        }
    };

    for line in reader.lines() {
        let line = line?;
        summary.total_lines += 1;

        match parse_log_line(&line) {
            Some(entry) => {
                if let Some(previous) = pending.replace(entry) {
                    flush(previous, &mut summary);
                }
            }
            None => {
                if let Some(entry) = pending.as_mut() {
                    entry.message.push('\n');
                    entry.message.push_str(&line);
                }
            }
        }
    }

    if let Some(entry) = pending {
        flush(entry, &mut summary);
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{extract_json, parse_log_line, scan_log, Category, LogFilter};

    const LOG: &str = "\
2024-05-01 10:00:00,001 - INFO - Constructed search query: site:x.com \"Austin\"
2024-05-01 10:00:01,002 - WARNING - No emails found in search result: {\"title\": \"Nobody\", \"link\": \"https://x.com\"}
2024-05-01 10:00:02,003 - ERROR - API request failed with status 403: {\"error\": {\"code\": 403,
  \"message\": \"quota\"}}
request id 42 (continuation of the error above)
2024-05-01 10:00:03,004 - CRITICAL - out of memory
";

    #[test]
    fn parse_log_line_valid() {
        let entry = parse_log_line("2024-01-01 12:00:00,000 - INFO - Starting up").unwrap();

        assert_eq!(entry.level, "INFO");
        assert_eq!(entry.message, "Starting up");
        assert_eq!(entry.timestamp.to_string(), "2024-01-01 12:00:00");
    }

    #[test]
    fn parse_log_line_rejects_other_formats() {
        assert!(parse_log_line("[INFO] no timestamp").is_none());
        assert!(parse_log_line("2024-13-45 12:00:00,000 - INFO - bad date").is_none());
        assert!(parse_log_line("").is_none());
    }

    #[test]
    fn extract_json_finds_embedded_object() {
        let message = r#"No emails found in search result: {"title": "a {b}", "n": 1} trailing"#;

        assert_eq!(
            extract_json(message),
            Some(json!({"title": "a {b}", "n": 1}))
        );
    }

    #[test]
    fn extract_json_none_without_object() {
        assert_eq!(extract_json("status 500: {not json}"), None);
        assert_eq!(extract_json("plain text"), None);
    }

    #[test]
    fn default_filter_shows_errors_and_missing_emails() {
        let mut seen = vec![];
        let summary = scan_log(LOG.as_bytes(), LogFilter::default(), |cat, entry| {
            seen.push((cat, entry.level.clone()))
        })
        .unwrap();

        assert_eq!(summary.total_lines, 6);
        assert_eq!(summary.errors, 2);
        assert_eq!(summary.items_without_emails, 1);
        assert_eq!(
            seen,
            vec![
                (Category::NoEmails, "WARNING".to_string()),
                (Category::Error, "ERROR".to_string()),
                (Category::Error, "CRITICAL".to_string()),
            ]
        );
    }

    #[test]
    fn continuation_lines_join_previous_entry() {
        let mut payloads = vec![];
        scan_log(LOG.as_bytes(), LogFilter::default(), |cat, entry| {
            if cat == Category::Error {
                payloads.push(extract_json(&entry.message));
            }
        })
        .unwrap();

        assert_eq!(
            payloads[0],
            Some(json!({"error": {"code": 403, "message": "quota"}}))
        );
    }

    #[test]
    fn errors_only_filter() {
        let filter = LogFilter {
            show_errors: true,
            show_no_emails: false,
            show_all: false,
        };
        let summary = scan_log(LOG.as_bytes(), filter, |_, _| {}).unwrap();

        assert_eq!(summary.errors, 2);
        assert_eq!(summary.items_without_emails, 0);
    }

    #[test]
    fn show_all_includes_info() {
        let filter = LogFilter {
            show_errors: true,
            show_no_emails: true,
            show_all: true,
        };
        let mut count = 0;
        scan_log(LOG.as_bytes(), filter, |_, _| count += 1).unwrap();

        assert_eq!(count, 4);
    }
}
