// piiguard-core/src/engine.rs
//! Defines the `DetectionEngine` trait implemented by every span producer.
//!
//! The pipeline runs each engine on its own blocking task and only ever
//! sees the spans (or the error) it returns. Engines hold no mutable state
//! and never see each other's output.
//!
//! License: MIT OR APACHE 2.0

use crate::detection::Span;
use crate::errors::PiiGuardError;

/// A producer of raw, unmerged spans.
pub trait DetectionEngine: Send + Sync {
    /// Short identifier used in logs and in `DetectionFailure`.
    fn name(&self) -> &'static str;

    /// Scans `text` and returns spans with byte offsets into it.
    ///
    /// `locale` is the caller's requested locale, possibly empty. Engines
    /// that are not locale-aware ignore it.
    fn detect_spans(&self, text: &str, locale: &str) -> Result<Vec<Span>, PiiGuardError>;
}
