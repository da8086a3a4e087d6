//! Configuration management for `piiguard-core`.
//!
//! This module defines the pattern library data structures and the engine
//! settings. It handles deserialization of YAML pattern files and provides
//! utilities for loading, merging, and validating them.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use log::{debug, info, warn};
use regex::Regex;
use std::hash::{Hash, Hasher};

use crate::validators::ValidatorKind;

/// Maximum allowed length for a regex pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// Locale used when a request names none or names one without patterns.
pub const DEFAULT_LOCALE: &str = "en-US";
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.60;
pub const DEFAULT_REFINEMENT_FLOOR: f64 = 0.60;
pub const DEFAULT_CONTEXT_WINDOW: usize = 30;
pub const DEFAULT_NER_CONFIDENCE: f64 = 0.85;
pub const DEFAULT_NER_MIN_EVIDENCE: f64 = 0.5;
pub const DEFAULT_TTL_HOURS: u32 = 24;
pub const DEFAULT_TOKEN_PREFIX: &str = "tok_";

/// A single named detector in the pattern library.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PatternRule {
    /// Entity type reported for matches (e.g., "EMAIL").
    pub name: String,
    /// Human-readable description of what the rule targets.
    pub description: Option<String>,
    /// The regex pattern string.
    pub pattern: String,
    /// Name of a programmatic validator run on each match.
    pub validator: Option<String>,
    /// Static confidence assigned to every surviving match.
    pub confidence: f64,
    /// Explicit override for enabling/disabling the rule.
    pub enabled: Option<bool>,
    /// Metadata tags for categorization.
    pub tags: Option<Vec<String>>,
}

impl Hash for PatternRule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.pattern.hash(state);
        self.validator.hash(state);
        self.confidence.to_bits().hash(state);
        self.enabled.hash(state);
    }
}

impl Default for PatternRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            pattern: String::new(),
            validator: None,
            confidence: 0.5,
            enabled: None,
            tags: None,
        }
    }
}

impl PatternRule {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// Settings for the optional entity recognizer.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct NerConfig {
    /// Runs the recognizer alongside the pattern detector (default: false).
    pub enabled: Option<bool>,
    /// Confidence given to every recognized entity (default: 0.85).
    pub base_confidence: Option<f64>,
    /// Minimum heuristic evidence for the recognizer to report a candidate.
    pub min_evidence: Option<f64>,
}

impl NerConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    pub fn base_confidence(&self) -> f64 {
        self.base_confidence.unwrap_or(DEFAULT_NER_CONFIDENCE)
    }

    pub fn min_evidence(&self) -> f64 {
        self.min_evidence.unwrap_or(DEFAULT_NER_MIN_EVIDENCE)
    }
}

/// Settings for the merge & refine pipeline.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Threshold used when a request supplies zero or none (default: 0.60).
    pub default_threshold: Option<f64>,
    /// Spans below this after context refinement are always dropped.
    pub refinement_floor: Option<f64>,
    /// Bytes inspected on either side of a span start for keywords.
    pub context_window: Option<usize>,
    pub default_locale: Option<String>,
}

impl PipelineConfig {
    pub fn default_threshold(&self) -> f64 {
        self.default_threshold.unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD)
    }

    pub fn refinement_floor(&self) -> f64 {
        self.refinement_floor.unwrap_or(DEFAULT_REFINEMENT_FLOOR)
    }

    pub fn context_window(&self) -> usize {
        self.context_window.unwrap_or(DEFAULT_CONTEXT_WINDOW)
    }

    pub fn default_locale(&self) -> &str {
        self.default_locale.as_deref().unwrap_or(DEFAULT_LOCALE)
    }
}

/// Settings for the redaction engine.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct RedactionSettings {
    /// Token lifetime used when a request supplies zero (default: 24).
    pub default_ttl_hours: Option<u32>,
    pub token_prefix: Option<String>,
}

impl RedactionSettings {
    pub fn default_ttl_hours(&self) -> u32 {
        self.default_ttl_hours.unwrap_or(DEFAULT_TTL_HOURS)
    }

    pub fn token_prefix(&self) -> &str {
        self.token_prefix.as_deref().unwrap_or(DEFAULT_TOKEN_PREFIX)
    }
}

/// Container for all engine-specific configurations.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub ner: NerConfig,
    pub pipeline: PipelineConfig,
    pub redaction: RedactionSettings,
}

/// Represents the top-level pattern library file.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct PatternConfig {
    /// Ordered rules per locale.
    #[serde(default)]
    pub locales: BTreeMap<String, Vec<PatternRule>>,
    /// Engine-specific settings.
    #[serde(default)]
    pub engines: EngineConfig,
}

impl PatternConfig {
    /// Loads a pattern library from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading custom patterns from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pattern file {}", path.display()))?;
        let config: PatternConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse pattern file {}", path.display()))?;

        validate_patterns(&config)?;
        info!(
            "Loaded {} rules across {} locales from file {}.",
            config.rule_count(),
            config.locales.len(),
            path.display()
        );

        Ok(config)
    }

    /// Loads the built-in pattern library from the embedded configuration.
    pub fn load_default_patterns() -> Result<Self> {
        debug!("Loading default patterns from embedded string...");
        let default_yaml = include_str!("../config/default_patterns.yaml");
        let config: PatternConfig = serde_yml::from_str(default_yaml)
            .context("Failed to parse default patterns")?;

        debug!("Loaded {} default rules.", config.rule_count());
        Ok(config)
    }

    pub fn rule_count(&self) -> usize {
        self.locales.values().map(Vec::len).sum()
    }

    /// Disables the named rules in every locale.
    pub fn disable_rules(&mut self, names: &[String]) {
        let disable_set: HashSet<&str> = names.iter().map(String::as_str).collect();
        let known: HashSet<&str> = self.locales.values().flatten().map(|r| r.name.as_str()).collect();

        for name in disable_set.difference(&known) {
            warn!("Rule '{}' in disable list does not exist.", name);
        }

        for rule in self.locales.values_mut().flatten() {
            if disable_set.contains(rule.name.as_str()) {
                rule.enabled = Some(false);
            }
        }
    }
}

/// Merges user-defined patterns and engine settings with defaults.
///
/// User rules replace default rules with the same `(locale, name)` in place;
/// new rules are appended after the defaults of their locale.
pub fn merge_patterns(default_config: PatternConfig, user_config: Option<PatternConfig>) -> PatternConfig {
    debug!("merge_patterns called. Initial default rules count: {}", default_config.rule_count());

    let mut locales = default_config.locales;
    let mut engines = default_config.engines;

    if let Some(user_cfg) = user_config {
        debug!("User config provided. Merging {} user rules.", user_cfg.rule_count());
        for (locale, user_rules) in user_cfg.locales {
            let rules = locales.entry(locale).or_default();
            for user_rule in user_rules {
                match rules.iter_mut().find(|r| r.name == user_rule.name) {
                    Some(existing) => *existing = user_rule,
                    None => rules.push(user_rule),
                }
            }
        }

        let user_engines = user_cfg.engines;
        if let Some(v) = user_engines.ner.enabled {
            engines.ner.enabled = Some(v);
        }
        if let Some(v) = user_engines.ner.base_confidence {
            engines.ner.base_confidence = Some(v);
        }
        if let Some(v) = user_engines.ner.min_evidence {
            engines.ner.min_evidence = Some(v);
        }
        if let Some(v) = user_engines.pipeline.default_threshold {
            debug!("Overriding default threshold with user value: {}", v);
            engines.pipeline.default_threshold = Some(v);
        }
        if let Some(v) = user_engines.pipeline.refinement_floor {
            engines.pipeline.refinement_floor = Some(v);
        }
        if let Some(v) = user_engines.pipeline.context_window {
            engines.pipeline.context_window = Some(v);
        }
        if let Some(v) = user_engines.pipeline.default_locale {
            engines.pipeline.default_locale = Some(v);
        }
        if let Some(v) = user_engines.redaction.default_ttl_hours {
            engines.redaction.default_ttl_hours = Some(v);
        }
        if let Some(v) = user_engines.redaction.token_prefix {
            engines.redaction.token_prefix = Some(v);
        }
    }

    let merged = PatternConfig { locales, engines };
    debug!("Final total rules after merge: {}", merged.rule_count());
    merged
}

/// Validates rule integrity (names, regex compilation, validators, scores).
pub fn validate_patterns(config: &PatternConfig) -> Result<()> {
    let mut errors = Vec::new();

    for (locale, rules) in &config.locales {
        let mut rule_names: HashMap<&str, usize> = HashMap::new();

        for rule in rules {
            if rule.name.is_empty() {
                errors.push(format!("[{}] A rule has an empty `name` field.", locale));
            } else {
                let count = rule_names.entry(rule.name.as_str()).or_insert(0);
                *count += 1;
                if *count == 2 {
                    errors.push(format!("[{}] Duplicate rule name found: '{}'.", locale, rule.name));
                }
            }

            if rule.pattern.is_empty() {
                errors.push(format!("[{}] Rule '{}' has an empty `pattern` field.", locale, rule.name));
                continue;
            }

            if rule.pattern.len() > MAX_PATTERN_LENGTH {
                errors.push(format!(
                    "[{}] Rule '{}': pattern length ({}) exceeds maximum allowed ({}).",
                    locale, rule.name, rule.pattern.len(), MAX_PATTERN_LENGTH
                ));
            } else if let Err(e) = Regex::new(&rule.pattern) {
                errors.push(format!("[{}] Rule '{}' has an invalid regex pattern: {}", locale, rule.name, e));
            }

            if let Some(name) = &rule.validator {
                if ValidatorKind::from_name(name).is_none() {
                    errors.push(format!("[{}] Rule '{}' references unknown validator '{}'.", locale, rule.name, name));
                }
            }

            if !(0.0..=1.0).contains(&rule.confidence) {
                errors.push(format!(
                    "[{}] Rule '{}' has confidence {} outside [0, 1].",
                    locale, rule.name, rule.confidence
                ));
            }
        }
    }

    if !errors.is_empty() {
        let full_error_message = format!("Pattern validation failed:\n{}", errors.join("\n"));
        Err(anyhow!(full_error_message))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_patterns_are_valid() {
        let config = PatternConfig::load_default_patterns().unwrap();
        validate_patterns(&config).unwrap();
        let names: Vec<&str> = config.locales[DEFAULT_LOCALE].iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["EMAIL", "SSN", "CREDIT_CARD", "PHONE_US", "IP_ADDRESS"]);
        assert!(!config.engines.ner.is_enabled());
        assert_eq!(config.engines.redaction.token_prefix(), "tok_");
    }

    #[test]
    fn test_engine_defaults_without_settings() {
        let engines = EngineConfig::default();
        assert_eq!(engines.pipeline.default_threshold(), 0.60);
        assert_eq!(engines.pipeline.context_window(), 30);
        assert_eq!(engines.redaction.default_ttl_hours(), 24);
        assert_eq!(engines.ner.base_confidence(), 0.85);
    }

    #[test]
    fn test_validate_rejects_unknown_validator_and_bad_confidence() {
        let mut config = PatternConfig::default();
        config.locales.insert(
            "en-US".to_string(),
            vec![PatternRule {
                name: "ZIP".to_string(),
                pattern: r"\b[0-9]{5}\b".to_string(),
                validator: Some("zipcheck".to_string()),
                confidence: 1.5,
                ..Default::default()
            }],
        );
        let err = validate_patterns(&config).unwrap_err().to_string();
        assert!(err.contains("unknown validator 'zipcheck'"));
        assert!(err.contains("outside [0, 1]"));
    }

    #[test]
    fn test_disable_rules_marks_every_locale() {
        let mut config = PatternConfig::load_default_patterns().unwrap();
        config.disable_rules(&["EMAIL".to_string()]);
        for rules in config.locales.values() {
            let email = rules.iter().find(|r| r.name == "EMAIL").unwrap();
            assert!(!email.is_enabled());
        }
    }
}
