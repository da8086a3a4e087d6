// piiguard-core/src/engines/ner_engine.rs
//! Adapts the heuristic recognizer from `piiguard-ner` to the
//! `DetectionEngine` contract, and provides the no-op producer used when
//! entity recognition is switched off.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{anyhow, Result};
use log::debug;
use piiguard_ner::{EntityLabel, Recognizer};

use crate::config::NerConfig;
use crate::detection::{log_span_debug, DetectionMethod, Span};
use crate::engine::DetectionEngine;
use crate::errors::PiiGuardError;

/// Maps a recognizer label to the reported entity type. Labels without a
/// PII meaning yield `None` and are dropped.
pub fn map_label(label: EntityLabel) -> Option<&'static str> {
    match label {
        EntityLabel::Gpe | EntityLabel::Loc => Some("LOCATION"),
        EntityLabel::Person => Some("PERSON"),
        EntityLabel::Org => Some("ORGANIZATION"),
        EntityLabel::Date => Some("DATE"),
        EntityLabel::Norp => None,
    }
}

pub struct NerEngine {
    recognizer: Recognizer,
    base_confidence: f64,
}

impl NerEngine {
    pub fn new(config: &NerConfig) -> Result<Self> {
        let recognizer = Recognizer::new(config.min_evidence())
            .map_err(|e| anyhow!("Failed to build entity recognizer: {}", e))?;
        Ok(Self {
            recognizer,
            base_confidence: config.base_confidence(),
        })
    }
}

impl DetectionEngine for NerEngine {
    fn name(&self) -> &'static str {
        "ner"
    }

    /// The recognizer reports entity text without offsets, so each entity is
    /// anchored at the first occurrence of its text in the input. Repeated
    /// entities therefore collapse onto the same range.
    fn detect_spans(&self, text: &str, _locale: &str) -> Result<Vec<Span>, PiiGuardError> {
        let mut spans = Vec::new();

        for entity in self.recognizer.recognize(text) {
            let Some(entity_type) = map_label(entity.label) else {
                continue;
            };
            let Some(start) = text.find(entity.text.as_str()) else {
                debug!("Recognized entity could not be located in input, dropping it");
                continue;
            };
            let span = Span {
                entity_type: entity_type.to_string(),
                start,
                end: start + entity.text.len(),
                matched_text: entity.text,
                confidence: self.base_confidence,
                method: DetectionMethod::Ner,
            };
            log_span_debug(module_path!(), &span);
            spans.push(span);
        }

        Ok(spans)
    }
}

/// Stand-in producer when recognition is disabled. Always returns no spans.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledRecognizer;

impl DetectionEngine for DisabledRecognizer {
    fn name(&self) -> &'static str {
        "ner"
    }

    fn detect_spans(&self, _text: &str, _locale: &str) -> Result<Vec<Span>, PiiGuardError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> NerEngine {
        NerEngine::new(&NerConfig { enabled: Some(true), ..Default::default() }).unwrap()
    }

    #[test]
    fn test_labels_map_to_entity_types() {
        let text = "Dr. Jane Doe met John Smith of Acme Corp in New York on March 3, 2024.";
        let spans = engine().detect_spans(text, "").unwrap();
        let found: Vec<(&str, &str)> = spans
            .iter()
            .map(|s| (s.entity_type.as_str(), s.matched_text.as_str()))
            .collect();
        assert!(found.contains(&("PERSON", "Jane Doe")));
        assert!(found.contains(&("PERSON", "John Smith")));
        assert!(found.contains(&("ORGANIZATION", "Acme Corp")));
        assert!(found.contains(&("LOCATION", "New York")));
        assert!(found.contains(&("DATE", "March 3, 2024")));
        for s in &spans {
            assert_eq!(&text[s.start..s.end], s.matched_text);
            assert_eq!(s.confidence, 0.85);
            assert_eq!(s.method, DetectionMethod::Ner);
        }
    }

    #[test]
    fn test_nationalities_are_dropped() {
        let spans = engine().detect_spans("Rafting with German guides.", "").unwrap();
        assert!(spans.iter().all(|s| s.matched_text != "German"));
    }

    #[test]
    fn test_repeated_entity_anchors_at_first_occurrence() {
        let text = "John Smith called. Later John Smith wrote.";
        let spans = engine().detect_spans(text, "").unwrap();
        assert!(!spans.is_empty());
        assert!(spans.iter().filter(|s| s.matched_text == "John Smith").all(|s| s.start == 0));
    }

    #[test]
    fn test_disabled_recognizer_is_empty() {
        let spans = DisabledRecognizer.detect_spans("Dr. Jane Doe lives in New York.", "en-US").unwrap();
        assert!(spans.is_empty());
    }
}
