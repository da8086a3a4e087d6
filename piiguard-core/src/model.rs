//! Request and response types exchanged with callers.
//!
//! Field names follow the JSON wire format consumed by existing clients.
//!
//! License: MIT OR APACHE 2.0

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::detection::{DetectionMethod, Span};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionRequest {
    pub text: String,
    /// Empty means the configured default locale.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub locale: String,
    /// Allowlist of entity types. Empty keeps every type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entity_types: Vec<String>,
    /// Zero means the configured default threshold.
    #[serde(default)]
    pub confidence_threshold: f64,
}

impl DetectionRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// How each span is replaced in the output text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum RedactionMode {
    Mask,
    #[default]
    Replace,
    Hash,
    Tokenize,
}

impl RedactionMode {
    /// Parses a mode name; unrecognized names fall back to `Replace`.
    pub fn parse_lenient(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            log::warn!("Unknown redaction mode '{}', falling back to replace", name);
            RedactionMode::Replace
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RedactionMode::Mask => "mask",
            RedactionMode::Replace => "replace",
            RedactionMode::Hash => "hash",
            RedactionMode::Tokenize => "tokenize",
        }
    }
}

impl FromStr for RedactionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mask" => Ok(RedactionMode::Mask),
            "replace" => Ok(RedactionMode::Replace),
            "hash" => Ok(RedactionMode::Hash),
            "tokenize" => Ok(RedactionMode::Tokenize),
            other => Err(format!("unknown redaction mode '{}'", other)),
        }
    }
}

impl From<String> for RedactionMode {
    fn from(s: String) -> Self {
        RedactionMode::parse_lenient(&s)
    }
}

impl fmt::Display for RedactionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedactionRequest {
    #[serde(flatten)]
    pub detection: DetectionRequest,
    #[serde(default)]
    pub mode: RedactionMode,
    /// Token lifetime in hours, tokenize mode only. Zero means the default.
    #[serde(default, alias = "ttl_hours")]
    pub ttl: u32,
}

/// Counts of findings per compliance regime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub hipaa_relevant: usize,
    pub gdpr_relevant: usize,
    pub pci_relevant: usize,
}

impl RiskSummary {
    pub fn record(&mut self, entity_type: &str) {
        match entity_type {
            "SSN" | "PHONE_US" | "PERSON" | "DATE" => {
                self.hipaa_relevant += 1;
                self.gdpr_relevant += 1;
            }
            "EMAIL" | "LOCATION" => self.gdpr_relevant += 1,
            "CREDIT_CARD" => self.pci_relevant += 1,
            _ => {}
        }
    }

    pub fn from_spans(spans: &[Span]) -> Self {
        let mut summary = RiskSummary::default();
        for span in spans {
            summary.record(&span.entity_type);
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResponse {
    pub entities_found: usize,
    pub detections: Vec<Span>,
    pub risk_summary: RiskSummary,
    pub processing_time_ms: u64,
    pub request_id: String,
}

/// Audit record for one substituted span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionDetail {
    pub entity_type: String,
    pub original_start: usize,
    pub original_end: usize,
    pub redacted_value: String,
    pub confidence: f64,
    #[serde(rename = "detection_method")]
    pub method: DetectionMethod,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionResponse {
    pub redacted_text: String,
    pub entities_found: usize,
    pub detections: Vec<RedactionDetail>,
    pub processing_time_ms: u64,
    pub request_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetokenizeRequest {
    pub text: String,
    #[serde(default)]
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetokenizeResponse {
    pub detokenized_text: String,
}
