// piiguard-core/tests/pipeline_integration_tests.rs
use std::sync::Arc;

use piiguard_core::{
    DetectionEngine, DetectionMethod, DetectionRequest, DisabledRecognizer, PatternConfig, PiiGuardError,
    Pipeline, RegexEngine, Span,
};
use test_log::test;

fn defaults() -> PatternConfig {
    PatternConfig::load_default_patterns().unwrap()
}

fn pipeline() -> Pipeline {
    Pipeline::new(&defaults()).unwrap()
}

fn pipeline_with_ner() -> Pipeline {
    let mut config = defaults();
    config.engines.ner.enabled = Some(true);
    Pipeline::new(&config).unwrap()
}

struct PanickingEngine;

impl DetectionEngine for PanickingEngine {
    fn name(&self) -> &'static str {
        "ner"
    }

    fn detect_spans(&self, _text: &str, _locale: &str) -> Result<Vec<Span>, PiiGuardError> {
        panic!("model weights missing")
    }
}

struct FailingEngine;

impl DetectionEngine for FailingEngine {
    fn name(&self) -> &'static str {
        "regex"
    }

    fn detect_spans(&self, _text: &str, _locale: &str) -> Result<Vec<Span>, PiiGuardError> {
        Err(PiiGuardError::Fatal("pattern library unavailable".to_string()))
    }
}

/// Emits a fixed set of spans regardless of input.
struct FixedEngine(Vec<Span>);

impl DetectionEngine for FixedEngine {
    fn name(&self) -> &'static str {
        "ner"
    }

    fn detect_spans(&self, _text: &str, _locale: &str) -> Result<Vec<Span>, PiiGuardError> {
        Ok(self.0.clone())
    }
}

fn regex_engine() -> Arc<dyn DetectionEngine> {
    Arc::new(RegexEngine::new(&defaults()).unwrap())
}

#[test(tokio::test)]
async fn test_email_and_phone_end_to_end() {
    let spans = pipeline()
        .detect(&DetectionRequest::new("Contact john@acme.com or call 555-123-4567."))
        .await
        .unwrap();

    assert_eq!(spans.len(), 2);
    assert_eq!((spans[0].entity_type.as_str(), spans[0].confidence), ("EMAIL", 0.99));
    assert_eq!((spans[1].entity_type.as_str(), spans[1].confidence), ("PHONE_US", 0.90));
    assert!(spans[0].end <= spans[1].start);
}

#[test(tokio::test)]
async fn test_ssn_keyword_boost_end_to_end() {
    let spans = pipeline().detect(&DetectionRequest::new("SSN: 123-45-6789")).await.unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].entity_type, "SSN");
    assert_eq!(spans[0].confidence, 1.0);
}

#[test(tokio::test)]
async fn test_threshold_is_inclusive_and_zero_means_default() {
    let text = "Contact john@acme.com or call 555-123-4567.";
    let mut req = DetectionRequest::new(text);

    req.confidence_threshold = 0.90;
    assert_eq!(pipeline().detect(&req).await.unwrap().len(), 2);

    req.confidence_threshold = 0.95;
    let spans = pipeline().detect(&req).await.unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].entity_type, "EMAIL");

    req.confidence_threshold = 0.0;
    assert_eq!(pipeline().detect(&req).await.unwrap().len(), 2);
}

#[test(tokio::test)]
async fn test_entity_type_allowlist() {
    let mut req = DetectionRequest::new("Contact john@acme.com or call 555-123-4567.");
    req.entity_types = vec!["PHONE_US".to_string()];
    let spans = pipeline().detect(&req).await.unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].entity_type, "PHONE_US");
}

#[test(tokio::test)]
async fn test_unknown_locale_falls_back() {
    let mut req = DetectionRequest::new("SSN: 123-45-6789");
    req.locale = "xx-XX".to_string();
    let spans = pipeline().detect(&req).await.unwrap();
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].entity_type, "SSN");
}

#[test(tokio::test)]
async fn test_output_never_overlaps_and_is_sorted() {
    let overlapping = vec![
        Span {
            entity_type: "PERSON".to_string(),
            matched_text: "john@acme".to_string(),
            start: 8,
            end: 17,
            confidence: 0.85,
            method: DetectionMethod::Ner,
        },
        Span {
            entity_type: "DATE".to_string(),
            matched_text: "555-123".to_string(),
            start: 30,
            end: 37,
            confidence: 0.995,
            method: DetectionMethod::Ner,
        },
    ];
    let p = Pipeline::with_engines(regex_engine(), Arc::new(FixedEngine(overlapping)), &defaults());
    let spans = p
        .detect(&DetectionRequest::new("Contact john@acme.com or call 555-123-4567."))
        .await
        .unwrap();

    let summary: Vec<(&str, DetectionMethod)> =
        spans.iter().map(|s| (s.entity_type.as_str(), s.method)).collect();
    assert_eq!(summary, vec![("EMAIL", DetectionMethod::Regex), ("DATE", DetectionMethod::Ner)]);
    for pair in spans.windows(2) {
        assert!(pair[0].end <= pair[1].start);
    }
}

#[test(tokio::test)]
async fn test_producer_panic_becomes_detection_failure() {
    let p = Pipeline::with_engines(regex_engine(), Arc::new(PanickingEngine), &defaults());
    let err = p.detect(&DetectionRequest::new("a@b.co")).await.unwrap_err();
    match err {
        PiiGuardError::DetectionFailure { producer, reason } => {
            assert_eq!(producer, "ner");
            assert!(reason.contains("model weights missing"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test(tokio::test)]
async fn test_producer_error_aborts_request() {
    let p = Pipeline::with_engines(Arc::new(FailingEngine), Arc::new(DisabledRecognizer), &defaults());
    let err = p.detect(&DetectionRequest::new("a@b.co")).await.unwrap_err();
    assert!(matches!(err, PiiGuardError::DetectionFailure { ref producer, .. } if producer == "regex"));
}

#[test(tokio::test)]
async fn test_detection_is_deterministic_with_recognizer() {
    let p = pipeline_with_ner();
    let req = DetectionRequest::new("John Smith's SSN is 123-45-6789. Email him at john@acme.com or call 555-867-5309.");
    let first = p.detect(&req).await.unwrap();
    for _ in 0..3 {
        assert_eq!(p.detect(&req).await.unwrap(), first);
    }

    let types: Vec<&str> = first.iter().map(|s| s.entity_type.as_str()).collect();
    assert_eq!(types, vec!["PERSON", "SSN", "EMAIL", "PHONE_US"]);
    assert_eq!(first[0].matched_text, "John Smith");
}

#[test(tokio::test)]
async fn test_recognizer_disambiguates_organization() {
    let spans = pipeline_with_ner()
        .detect(&DetectionRequest::new("Dear John, your John Deere order shipped."))
        .await
        .unwrap();
    let found: Vec<(&str, &str)> = spans
        .iter()
        .map(|s| (s.entity_type.as_str(), s.matched_text.as_str()))
        .collect();
    assert!(found.contains(&("PERSON", "John")));
    assert!(found.contains(&("ORGANIZATION", "John Deere")));
}
