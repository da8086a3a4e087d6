// piiguard-core/src/service.rs
//! Request handlers for detect, redact and detokenize.
//!
//! `PiiService` wraps the pipeline and the redactor with the bookkeeping
//! every response carries: timing, a fresh request id and, for detection,
//! the risk summary. Errors propagate unchanged and no partial response is
//! ever built.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use log::info;
use uuid::Uuid;

use crate::config::PatternConfig;
use crate::errors::PiiGuardError;
use crate::model::{
    DetectionRequest, DetectionResponse, DetokenizeRequest, DetokenizeResponse, RedactionRequest,
    RedactionResponse, RiskSummary,
};
use crate::pipeline::Pipeline;
use crate::redactor::Redactor;
use crate::vault::TokenStore;

pub struct PiiService {
    pipeline: Pipeline,
    redactor: Redactor,
}

impl PiiService {
    pub fn new(config: &PatternConfig, store: Arc<dyn TokenStore>) -> Result<Self> {
        let pipeline = Pipeline::new(config)?;
        let redactor = Redactor::new(store, &config.engines.redaction);
        Ok(Self::from_parts(pipeline, redactor))
    }

    pub fn from_parts(pipeline: Pipeline, redactor: Redactor) -> Self {
        Self { pipeline, redactor }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    pub async fn detect(&self, req: &DetectionRequest) -> Result<DetectionResponse, PiiGuardError> {
        let started = Instant::now();
        let detections = self.pipeline.detect(req).await?;
        let risk_summary = RiskSummary::from_spans(&detections);
        let response = DetectionResponse {
            entities_found: detections.len(),
            detections,
            risk_summary,
            processing_time_ms: elapsed_ms(started),
            request_id: new_request_id(),
        };
        info!(
            "detect {}: {} entities in {} ms",
            response.request_id, response.entities_found, response.processing_time_ms
        );
        Ok(response)
    }

    pub async fn redact(&self, req: &RedactionRequest) -> Result<RedactionResponse, PiiGuardError> {
        let started = Instant::now();
        let detections = self.pipeline.detect(&req.detection).await?;
        let outcome = self
            .redactor
            .redact(&req.detection.text, &detections, req.mode, req.ttl)
            .await?;
        let response = RedactionResponse {
            redacted_text: outcome.redacted_text,
            entities_found: detections.len(),
            detections: outcome.details,
            processing_time_ms: elapsed_ms(started),
            request_id: new_request_id(),
        };
        info!(
            "redact {} ({}): {} entities in {} ms",
            response.request_id, req.mode, response.entities_found, response.processing_time_ms
        );
        Ok(response)
    }

    pub async fn detokenize(&self, req: &DetokenizeRequest) -> DetokenizeResponse {
        let detokenized_text = self.redactor.detokenize(&req.text, &req.tokens).await;
        DetokenizeResponse { detokenized_text }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn new_request_id() -> String {
    Uuid::new_v4().simple().to_string()
}
