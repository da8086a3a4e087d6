// piiguard-core/src/detection.rs
//! Core data structures for detected spans, plus PII-safe debug logging
//! helpers shared by the producers and the redaction engine.

use serde::{Serialize, Deserialize};
use log::debug;
use std::fmt;

use lazy_static::lazy_static;

lazy_static! {
    /// A static boolean that is initialized once to determine if PII is allowed in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("PIIGUARD_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// Which producer emitted a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionMethod {
    Regex,
    Ner,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::Regex => "regex",
            DetectionMethod::Ner => "ner",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected piece of PII: half-open byte range `[start, end)` into the
/// source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub entity_type: String,
    #[serde(rename = "text")]
    pub matched_text: String,
    pub start: usize,
    pub end: usize,
    pub confidence: f64,
    #[serde(rename = "detection_method")]
    pub method: DetectionMethod,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True when the two half-open ranges share at least one byte.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.len())
    }
}

fn get_loggable_content(sensitive_content: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        sensitive_content.to_string()
    } else {
        redact_sensitive(sensitive_content)
    }
}

pub fn log_span_debug(module_path: &str, span: &Span) {
    debug!(
        "{} Found span: Type='{}', Text='{}', Range={}..{}, Confidence={:.2}, Method={}",
        module_path,
        span.entity_type,
        get_loggable_content(&span.matched_text),
        span.start,
        span.end,
        span.confidence,
        span.method
    );
}

pub fn log_rejected_match_debug(module_path: &str, pattern_name: &str, original_sensitive_content: &str) {
    debug!(
        "{} Validator rejected match for pattern '{}': '{}'",
        module_path,
        pattern_name,
        get_loggable_content(original_sensitive_content)
    );
}

pub fn log_redaction_action_debug(
    module_path: &str,
    original_sensitive_content: &str,
    redacted_value: &str,
    entity_type: &str,
) {
    debug!(
        "{} Redaction action: Original='{}', Redacted='{}' for type '{}'",
        module_path,
        get_loggable_content(original_sensitive_content),
        redacted_value,
        entity_type
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize) -> Span {
        Span {
            entity_type: "EMAIL".into(),
            matched_text: "x".repeat(end - start),
            start,
            end,
            confidence: 0.9,
            method: DetectionMethod::Regex,
        }
    }

    #[test]
    fn test_redact_sensitive_short_string() {
        assert_eq!(redact_sensitive("abc"), "[REDACTED]".to_string());
    }

    #[test]
    fn test_redact_sensitive_long_string() {
        assert_eq!(redact_sensitive("john@acme.com"), "[REDACTED: 13 chars]".to_string());
    }

    #[test]
    fn test_half_open_overlap() {
        assert!(!span(0, 5).overlaps(&span(5, 9)));
        assert!(span(0, 6).overlaps(&span(5, 9)));
        assert!(span(2, 3).overlaps(&span(0, 9)));
    }

    #[test]
    fn test_span_wire_format() {
        let json = serde_json::to_value(span(8, 21)).unwrap();
        assert_eq!(json["text"], "xxxxxxxxxxxxx");
        assert_eq!(json["detection_method"], "regex");
        assert_eq!(json["entity_type"], "EMAIL");
        assert!(json.get("matched_text").is_none());
    }
}
