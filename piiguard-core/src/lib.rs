// piiguard-core/src/lib.rs
//! # PiiGuard Core Library
//!
//! `piiguard-core` finds personally identifiable information in free text
//! and replaces it with masked, templated, hashed or reversible token
//! values.
//!
//! ## Modules
//!
//! * `config`: The YAML pattern library (`PatternRule`, `PatternConfig`) and engine settings.
//! * `patterns`: Compilation and caching of the pattern library per locale.
//! * `validators`: Programmatic checks (SSN area, Luhn, IPv4 octets, UK NINO).
//! * `detection`: The `Span` type and PII-safe debug logging helpers.
//! * `engine`: The `DetectionEngine` trait implemented by every span producer.
//! * `engines`: The regex span detector and the entity recognizer adapter.
//! * `context`: Keyword boosts and reclassification applied after merging.
//! * `pipeline`: Concurrent production, merge by overlap precedence, filters.
//! * `redactor`: Substitution per redaction mode, and detokenization.
//! * `vault`: The `TokenStore` contract and an in-memory backend.
//! * `model`: Request and response types in their JSON wire format.
//! * `service`: `PiiService`, the detect / redact / detokenize handlers.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//! use piiguard_core::{DetectionRequest, MemoryTokenStore, PatternConfig, PiiService};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let config = PatternConfig::load_default_patterns()?;
//! let service = PiiService::new(&config, Arc::new(MemoryTokenStore::new()))?;
//!
//! let response = service
//!     .detect(&DetectionRequest::new("Contact john@acme.com or call 555-123-4567."))
//!     .await?;
//! assert_eq!(response.entities_found, 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Detection, redaction and store operations return [`PiiGuardError`].
//! Loading configuration returns `anyhow::Result` with context attached.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod config;
pub mod context;
pub mod detection;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod model;
pub mod patterns;
pub mod pipeline;
pub mod redactor;
pub mod service;
pub mod validators;
pub mod vault;

/// Re-exports the public configuration types and functions for managing the pattern library.
pub use config::{
    merge_patterns,
    validate_patterns,
    EngineConfig,
    NerConfig,
    PatternConfig,
    PatternRule,
    PipelineConfig,
    RedactionSettings,
    MAX_PATTERN_LENGTH,
};

pub use errors::PiiGuardError;

pub use detection::{redact_sensitive, DetectionMethod, Span};

pub use engine::DetectionEngine;
pub use engines::ner_engine::{DisabledRecognizer, NerEngine};
pub use engines::regex_engine::RegexEngine;

pub use patterns::compiler::{compile_library, get_or_compile_library, CompiledLibrary, CompiledPattern};

pub use pipeline::{merge_spans, Pipeline};
pub use context::ContextRefiner;
pub use redactor::{RedactionOutcome, Redactor};

pub use model::{
    DetectionRequest,
    DetectionResponse,
    DetokenizeRequest,
    DetokenizeResponse,
    RedactionDetail,
    RedactionMode,
    RedactionRequest,
    RedactionResponse,
    RiskSummary,
};

pub use service::PiiService;
pub use validators::ValidatorKind;
pub use vault::{MemoryTokenStore, TokenMapping, TokenStore};
