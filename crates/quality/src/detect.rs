//! Pluggable detectors used by the accuracy scorer.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

static URL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^https?://",
        r"(?:(?:[A-Z0-9](?:[A-Z0-9-]{0,61}[A-Z0-9])?\.)+[A-Z]{2,6}\.?",
        r"|localhost",
        r"|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3})",
        r"(?::\d+)?",
        r"(?:/?|[/?]\S+)$",
    ))
    .expect("url shape pattern")
});

/// Detects the natural language of a body.
pub trait LanguageDetector: Send + Sync {
    /// Language tag (e.g. `en`), or `None` when undecidable.
    fn detect(&self, text: &str) -> Option<String>;
}

/// Validates the shape of a source URL.
pub trait UrlValidator: Send + Sync {
    /// Whether `url` looks like a fetchable web address.
    fn is_valid(&self, url: &str) -> bool;
}

/// Coarse detector: text is Japanese when kana and common CJK ideographs
/// make up more than `ratio` of its characters, English otherwise.
#[derive(Debug, Clone, Copy)]
pub struct ScriptRatioDetector {
    pub ratio: f64,
}

impl Default for ScriptRatioDetector {
    fn default() -> Self {
        Self { ratio: 0.1 }
    }
}

fn is_japanese_script(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309f}'   // hiragana
        | '\u{30a0}'..='\u{30ff}' // katakana
        | '\u{4e00}'..='\u{9faf}' // CJK unified ideographs
    )
}

impl LanguageDetector for ScriptRatioDetector {
    fn detect(&self, text: &str) -> Option<String> {
        let total = text.chars().count();
        let japanese = text.chars().filter(|c| is_japanese_script(*c)).count();

        if japanese as f64 > total as f64 * self.ratio {
            Some("ja".to_string())
        } else {
            Some("en".to_string())
        }
    }
}

/// `http(s)://` followed by a domain, `localhost` or an IPv4 address, an
/// optional port and an optional path.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternUrlValidator;

impl UrlValidator for PatternUrlValidator {
    fn is_valid(&self, url: &str) -> bool {
        URL_SHAPE.is_match(url)
    }
}

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Whether `value` is an ISO 8601 date or date-time, with or without offset.
pub fn is_iso_timestamp(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }

    let normalized = match value.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{}+00:00", rest),
        None => value.to_string(),
    };

    DateTime::parse_from_rfc3339(&normalized).is_ok()
        || DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f%:z").is_ok()
        || DateTime::parse_from_str(&normalized, "%Y-%m-%d %H:%M:%S%.f%:z").is_ok()
        || NAIVE_DATETIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(&normalized, f).is_ok())
        || NaiveDate::parse_from_str(&normalized, "%Y-%m-%d").is_ok()
}
