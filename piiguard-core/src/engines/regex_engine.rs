// piiguard-core/src/engines/regex_engine.rs
//! A `DetectionEngine` implementation that applies the compiled pattern
//! library for the requested locale.
//! License: MIT OR APACHE 2.0

use std::sync::Arc;
use anyhow::{Context, Result};

use crate::config::PatternConfig;
use crate::detection::{log_rejected_match_debug, log_span_debug, DetectionMethod, Span};
use crate::engine::DetectionEngine;
use crate::errors::PiiGuardError;
use crate::patterns::compiler::{get_or_compile_library, CompiledLibrary};

#[derive(Debug, Clone)]
pub struct RegexEngine {
    library: Arc<CompiledLibrary>,
}

impl RegexEngine {
    pub fn new(config: &PatternConfig) -> Result<Self> {
        let library = get_or_compile_library(config)
            .context("Failed to compile pattern library for RegexEngine")?;
        Ok(Self { library })
    }

    pub fn with_library(library: Arc<CompiledLibrary>) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &CompiledLibrary {
        &self.library
    }
}

impl DetectionEngine for RegexEngine {
    fn name(&self) -> &'static str {
        "regex"
    }

    /// Spans come out grouped by pattern in declaration order, and in text
    /// order within a pattern.
    fn detect_spans(&self, text: &str, locale: &str) -> Result<Vec<Span>, PiiGuardError> {
        let mut spans = Vec::new();

        for pattern in self.library.patterns_for(locale) {
            for m in pattern.regex.find_iter(text) {
                if !pattern.accepts(m.as_str()) {
                    log_rejected_match_debug(module_path!(), &pattern.name, m.as_str());
                    continue;
                }
                let span = Span {
                    entity_type: pattern.name.clone(),
                    matched_text: m.as_str().to_string(),
                    start: m.start(),
                    end: m.end(),
                    confidence: pattern.confidence,
                    method: DetectionMethod::Regex,
                };
                log_span_debug(module_path!(), &span);
                spans.push(span);
            }
        }

        Ok(spans)
    }
}
