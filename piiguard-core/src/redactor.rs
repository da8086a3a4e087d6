//! The redaction engine and its inverse, detokenization.
//!
//! Spans are substituted from last to first so that the offsets of earlier
//! spans stay valid. Offsets are never recomputed.
//!
//! License: MIT OR APACHE 2.0

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use log::{debug, warn};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::RedactionSettings;
use crate::detection::{log_redaction_action_debug, Span};
use crate::errors::PiiGuardError;
use crate::model::{RedactionDetail, RedactionMode};
use crate::vault::{TokenMapping, TokenStore};

/// Redacted text plus one audit record per span, in substitution order
/// (last span first).
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionOutcome {
    pub redacted_text: String,
    pub details: Vec<RedactionDetail>,
}

pub struct Redactor {
    store: Arc<dyn TokenStore>,
    default_ttl_hours: u32,
    token_prefix: String,
}

impl Redactor {
    pub fn new(store: Arc<dyn TokenStore>, settings: &RedactionSettings) -> Self {
        Self {
            store,
            default_ttl_hours: settings.default_ttl_hours(),
            token_prefix: settings.token_prefix().to_string(),
        }
    }

    /// Replaces every span of `text` according to `mode`.
    ///
    /// `spans` must be ascending by start and non-overlapping, as produced
    /// by the pipeline. A `ttl_hours` of zero means the configured default.
    /// Any token store failure aborts the whole call; no partial text is
    /// returned.
    pub async fn redact(
        &self,
        text: &str,
        spans: &[Span],
        mode: RedactionMode,
        ttl_hours: u32,
    ) -> Result<RedactionOutcome, PiiGuardError> {
        check_spans(text, spans)?;
        let ttl_hours = if ttl_hours == 0 { self.default_ttl_hours } else { ttl_hours };

        let mut redacted = text.to_string();
        let mut details = Vec::with_capacity(spans.len());

        for span in spans.iter().rev() {
            let value = self.apply_mode(span, mode, ttl_hours).await?;
            log_redaction_action_debug(module_path!(), &span.matched_text, &value, &span.entity_type);

            redacted.replace_range(span.start..span.end, &value);
            details.push(RedactionDetail {
                entity_type: span.entity_type.clone(),
                original_start: span.start,
                original_end: span.end,
                redacted_value: value,
                confidence: span.confidence,
                method: span.method,
            });
        }

        Ok(RedactionOutcome { redacted_text: redacted, details })
    }

    async fn apply_mode(&self, span: &Span, mode: RedactionMode, ttl_hours: u32) -> Result<String, PiiGuardError> {
        match mode {
            RedactionMode::Mask => Ok("*".repeat(span.matched_text.len())),
            RedactionMode::Replace => Ok(format!("[{}]", span.entity_type)),
            RedactionMode::Hash => Ok(short_hash(&span.matched_text)),
            RedactionMode::Tokenize => {
                let token = format!("{}{}", self.token_prefix, Uuid::new_v4().simple());
                let mapping = TokenMapping {
                    token: token.clone(),
                    entity_type: span.entity_type.clone(),
                    original_value: span.matched_text.clone(),
                    expires_at: token_expiry(Utc::now(), ttl_hours)?,
                };
                self.store
                    .put(mapping)
                    .await
                    .map_err(|e| PiiGuardError::RedactionFailure(format!("failed to store token: {}", e)))?;
                Ok(token)
            }
        }
    }

    /// Replaces every occurrence of each resolvable token with its original
    /// value, in the order the tokens are given. Tokens that cannot be
    /// resolved are skipped.
    pub async fn detokenize(&self, text: &str, tokens: &[String]) -> String {
        let mut restored = text.to_string();
        for token in tokens {
            match self.store.get(token).await {
                Ok(mapping) => restored = restored.replace(token.as_str(), &mapping.original_value),
                Err(e) if e.is_missing_token() => debug!("Skipping token: {}", e),
                Err(e) => warn!("Skipping token after store error: {}", e),
            }
        }
        restored
    }
}

/// Expiry for a token issued at `now`. Lifetimes past the last
/// representable timestamp are rejected instead of wrapping.
fn token_expiry(now: DateTime<Utc>, ttl_hours: u32) -> Result<DateTime<Utc>, PiiGuardError> {
    TimeDelta::try_hours(i64::from(ttl_hours))
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| PiiGuardError::InvalidInput(format!("token ttl of {} hours is out of range", ttl_hours)))
}

/// First 8 bytes of the SHA-256 digest, hex encoded.
pub fn short_hash(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(&digest[..8])
}

fn check_spans(text: &str, spans: &[Span]) -> Result<(), PiiGuardError> {
    let mut previous_end = 0;
    for span in spans {
        let in_bounds = span.start < span.end
            && span.end <= text.len()
            && text.is_char_boundary(span.start)
            && text.is_char_boundary(span.end);
        if !in_bounds {
            return Err(PiiGuardError::InvalidInput(format!(
                "span {}..{} is not a valid range of the input",
                span.start, span.end
            )));
        }
        if span.start < previous_end {
            return Err(PiiGuardError::InvalidInput(format!(
                "span {}..{} overlaps or precedes the previous span",
                span.start, span.end
            )));
        }
        previous_end = span.end;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::DetectionMethod;
    use crate::vault::MemoryTokenStore;
    use async_trait::async_trait;

    struct BrokenStore;

    #[async_trait]
    impl TokenStore for BrokenStore {
        async fn put(&self, _mapping: TokenMapping) -> Result<(), PiiGuardError> {
            Err(PiiGuardError::StoreError("connection reset".to_string()))
        }

        async fn get(&self, _token: &str) -> Result<TokenMapping, PiiGuardError> {
            Err(PiiGuardError::StoreError("connection reset".to_string()))
        }
    }

    fn span_of(text: &str, needle: &str, entity_type: &str) -> Span {
        let start = text.find(needle).unwrap();
        Span {
            entity_type: entity_type.to_string(),
            matched_text: needle.to_string(),
            start,
            end: start + needle.len(),
            confidence: 0.9,
            method: DetectionMethod::Regex,
        }
    }

    fn redactor() -> Redactor {
        Redactor::new(Arc::new(MemoryTokenStore::new()), &RedactionSettings::default())
    }

    const TEXT: &str = "Contact john@acme.com or call 555-123-4567.";

    fn spans() -> Vec<Span> {
        vec![span_of(TEXT, "john@acme.com", "EMAIL"), span_of(TEXT, "555-123-4567", "PHONE_US")]
    }

    #[tokio::test]
    async fn test_replace_mode_and_audit_order() {
        let out = redactor().redact(TEXT, &spans(), RedactionMode::Replace, 0).await.unwrap();
        assert_eq!(out.redacted_text, "Contact [EMAIL] or call [PHONE_US].");
        let order: Vec<&str> = out.details.iter().map(|d| d.entity_type.as_str()).collect();
        assert_eq!(order, vec!["PHONE_US", "EMAIL"]);
        assert_eq!((out.details[1].original_start, out.details[1].original_end), (8, 21));
    }

    #[tokio::test]
    async fn test_mask_preserves_length() {
        let out = redactor().redact(TEXT, &spans(), RedactionMode::Mask, 0).await.unwrap();
        assert_eq!(out.redacted_text.len(), TEXT.len());
        assert_eq!(out.redacted_text, "Contact ************* or call ************.");
    }

    #[tokio::test]
    async fn test_hash_mode_is_sixteen_hex_chars() {
        let text = "Card 4111111111111111";
        let card = span_of(text, "4111111111111111", "CREDIT_CARD");
        let out = redactor().redact(text, &[card], RedactionMode::Hash, 0).await.unwrap();
        let value = &out.details[0].redacted_value;
        assert_eq!(value.len(), 16);
        assert!(value.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(out.redacted_text, format!("Card {}", value));
        assert_eq!(value, &short_hash("4111111111111111"));
    }

    #[tokio::test]
    async fn test_tokenize_round_trip() {
        let r = redactor();
        let out = r.redact(TEXT, &spans(), RedactionMode::Tokenize, 0).await.unwrap();
        let tokens: Vec<String> = out.details.iter().map(|d| d.redacted_value.clone()).collect();
        assert!(tokens.iter().all(|t| t.starts_with("tok_")));
        assert_ne!(tokens[0], tokens[1]);
        assert_eq!(r.detokenize(&out.redacted_text, &tokens).await, TEXT);
    }

    #[tokio::test]
    async fn test_default_ttl_applies_when_zero() {
        let store = Arc::new(MemoryTokenStore::new());
        let r = Redactor::new(store.clone(), &RedactionSettings::default());
        let out = r.redact(TEXT, &spans()[..1], RedactionMode::Tokenize, 0).await.unwrap();
        let mapping = store.get(&out.details[0].redacted_value).await.unwrap();
        let minutes = (mapping.expires_at - Utc::now()).num_minutes();
        assert!((23 * 60..=24 * 60).contains(&minutes));
        assert_eq!(mapping.original_value, "john@acme.com");
        assert_eq!(mapping.entity_type, "EMAIL");
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_is_rejected() {
        let store = Arc::new(MemoryTokenStore::new());
        let r = Redactor::new(store.clone(), &RedactionSettings::default());
        let err = r.redact(TEXT, &spans(), RedactionMode::Tokenize, u32::MAX).await.unwrap_err();
        assert!(matches!(err, PiiGuardError::InvalidInput(_)));
        assert!(store.is_empty().await);

        // Other modes never look at the ttl.
        let out = r.redact(TEXT, &spans(), RedactionMode::Replace, u32::MAX).await.unwrap();
        assert_eq!(out.redacted_text, "Contact [EMAIL] or call [PHONE_US].");
    }

    #[test]
    fn test_token_expiry_bounds() {
        let now = Utc::now();
        assert_eq!(token_expiry(now, 1).unwrap(), now + TimeDelta::hours(1));
        assert!(token_expiry(now, 3_000_000_000).is_err());
        assert!(token_expiry(DateTime::<Utc>::MAX_UTC, 1).is_err());
    }

    #[tokio::test]
    async fn test_store_failure_aborts_redaction() {
        let r = Redactor::new(Arc::new(BrokenStore), &RedactionSettings::default());
        let err = r.redact(TEXT, &spans(), RedactionMode::Tokenize, 1).await.unwrap_err();
        assert!(matches!(err, PiiGuardError::RedactionFailure(_)));

        let out = r.redact(TEXT, &spans(), RedactionMode::Mask, 1).await.unwrap();
        assert_eq!(out.details.len(), 2);
    }

    #[tokio::test]
    async fn test_detokenize_skips_unknown_tokens() {
        let r = redactor();
        let out = r.redact(TEXT, &spans()[..1], RedactionMode::Tokenize, 0).await.unwrap();
        let token = out.details[0].redacted_value.clone();
        let doubled = format!("{} and again {}", token, token);
        let restored = r.detokenize(&doubled, &["tok_missing".to_string(), token]).await;
        assert_eq!(restored, "john@acme.com and again john@acme.com");

        let broken = Redactor::new(Arc::new(BrokenStore), &RedactionSettings::default());
        assert_eq!(broken.detokenize("tok_x", &["tok_x".to_string()]).await, "tok_x");
    }

    #[tokio::test]
    async fn test_overlapping_spans_are_rejected() {
        let mut bad = spans();
        bad[1].start = 10;
        let err = redactor().redact(TEXT, &bad, RedactionMode::Replace, 0).await.unwrap_err();
        assert!(matches!(err, PiiGuardError::InvalidInput(_)));
    }
}
