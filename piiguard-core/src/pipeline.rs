//! The merge & refine pipeline.
//!
//! Both span producers run on their own blocking task against a shared,
//! immutable copy of the input. The pipeline waits for both, then merges,
//! refines, filters and orders the spans. Any producer error or panic fails
//! the whole request.
//!
//! License: MIT OR APACHE 2.0

use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use log::{debug, info};
use tokio::task::JoinError;

use crate::config::PatternConfig;
use crate::context::ContextRefiner;
use crate::detection::Span;
use crate::engine::DetectionEngine;
use crate::engines::ner_engine::{DisabledRecognizer, NerEngine};
use crate::engines::regex_engine::RegexEngine;
use crate::errors::PiiGuardError;
use crate::model::DetectionRequest;

pub struct Pipeline {
    regex: Arc<dyn DetectionEngine>,
    ner: Arc<dyn DetectionEngine>,
    refiner: ContextRefiner,
    default_threshold: f64,
    default_locale: String,
}

impl Pipeline {
    /// Builds the pipeline described by `config`. The recognizer is only
    /// constructed when `engines.ner.enabled` is set.
    pub fn new(config: &PatternConfig) -> Result<Self> {
        let regex: Arc<dyn DetectionEngine> = Arc::new(RegexEngine::new(config)?);
        let ner: Arc<dyn DetectionEngine> = if config.engines.ner.is_enabled() {
            info!("Entity recognition enabled");
            Arc::new(NerEngine::new(&config.engines.ner)?)
        } else {
            Arc::new(DisabledRecognizer)
        };
        Ok(Self::with_engines(regex, ner, config))
    }

    pub fn with_engines(
        regex: Arc<dyn DetectionEngine>,
        ner: Arc<dyn DetectionEngine>,
        config: &PatternConfig,
    ) -> Self {
        let pipeline = &config.engines.pipeline;
        Self {
            regex,
            ner,
            refiner: ContextRefiner::new(pipeline),
            default_threshold: pipeline.default_threshold(),
            default_locale: pipeline.default_locale().to_string(),
        }
    }

    /// Runs the full detection flow for one request.
    pub async fn detect(&self, req: &DetectionRequest) -> Result<Vec<Span>, PiiGuardError> {
        let text: Arc<str> = Arc::from(req.text.as_str());
        let locale = if req.locale.is_empty() {
            self.default_locale.clone()
        } else {
            req.locale.clone()
        };

        let (regex_result, ner_result) = tokio::join!(
            run_producer(Arc::clone(&self.regex), Arc::clone(&text), locale.clone()),
            run_producer(Arc::clone(&self.ner), Arc::clone(&text), locale),
        );
        let regex_spans = regex_result?;
        let ner_spans = ner_result?;
        debug!("Producers finished: {} regex spans, {} ner spans", regex_spans.len(), ner_spans.len());

        let merged = merge_spans(vec![regex_spans, ner_spans]);
        let mut refined = self.refiner.refine(&req.text, merged);

        if !req.entity_types.is_empty() {
            refined = filter_by_entity_types(refined, &req.entity_types);
        }

        let threshold = if req.confidence_threshold == 0.0 {
            self.default_threshold
        } else {
            req.confidence_threshold
        };
        let mut result = filter_by_confidence(refined, threshold);

        result.sort_by_key(|s| s.start);
        Ok(result)
    }
}

async fn run_producer(
    engine: Arc<dyn DetectionEngine>,
    text: Arc<str>,
    locale: String,
) -> Result<Vec<Span>, PiiGuardError> {
    let producer = engine.name();
    let joined = tokio::task::spawn_blocking(move || engine.detect_spans(&text, &locale)).await;

    match joined {
        Ok(Ok(spans)) => Ok(spans),
        Ok(Err(err @ PiiGuardError::DetectionFailure { .. })) => Err(err),
        Ok(Err(err)) => Err(PiiGuardError::DetectionFailure {
            producer: producer.to_string(),
            reason: err.to_string(),
        }),
        Err(join_err) => Err(PiiGuardError::DetectionFailure {
            producer: producer.to_string(),
            reason: describe_join_error(join_err),
        }),
    }
}

fn describe_join_error(err: JoinError) -> String {
    if !err.is_panic() {
        return err.to_string();
    }
    let payload: Box<dyn Any + Send> = err.into_panic();
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("producer panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("producer panicked: {}", msg)
    } else {
        "producer panicked".to_string()
    }
}

/// Merges span sets into a non-overlapping list.
///
/// Spans are ordered by start ascending, then end descending. A span that
/// starts at or after the end of the last selected span is selected; an
/// overlapping span replaces the last selected one only with strictly
/// higher confidence. The sort is stable, so on equal ranges and equal
/// confidence the span from the earlier set wins.
pub fn merge_spans(sets: Vec<Vec<Span>>) -> Vec<Span> {
    let mut all: Vec<Span> = sets.into_iter().flatten().collect();
    all.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut merged: Vec<Span> = Vec::with_capacity(all.len());
    for span in all {
        if let Some(last) = merged.last_mut() {
            if span.start < last.end {
                if span.confidence > last.confidence {
                    *last = span;
                }
                continue;
            }
        }
        merged.push(span);
    }
    merged
}

pub fn filter_by_entity_types(spans: Vec<Span>, types: &[String]) -> Vec<Span> {
    let allowed: HashSet<&str> = types.iter().map(String::as_str).collect();
    spans
        .into_iter()
        .filter(|s| allowed.contains(s.entity_type.as_str()))
        .collect()
}

/// Keeps spans whose confidence is at least `threshold`.
pub fn filter_by_confidence(spans: Vec<Span>, threshold: f64) -> Vec<Span> {
    spans.into_iter().filter(|s| s.confidence >= threshold).collect()
}
