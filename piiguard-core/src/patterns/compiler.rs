//! compiler.rs - Manages the compilation and caching of the pattern library.
//!
//! This module provides a thread-safe, cached mechanism to convert a
//! `PatternConfig` into a `CompiledLibrary`: one ordered list of compiled
//! detectors per locale. Compiled libraries live in a global, shared cache
//! keyed by a hash of the configuration.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use regex::{Regex, RegexBuilder};
use lazy_static::lazy_static;
use std::sync::{Arc, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};
use std::collections::hash_map::DefaultHasher;

use crate::config::{PatternConfig, PatternRule, DEFAULT_LOCALE, MAX_PATTERN_LENGTH};
use crate::errors::PiiGuardError;
use crate::validators::ValidatorKind;

/// A single compiled detector.
#[derive(Debug)]
pub struct CompiledPattern {
    pub regex: Regex,
    /// Entity type reported for every match.
    pub name: String,
    pub validator: Option<ValidatorKind>,
    pub confidence: f64,
}

impl CompiledPattern {
    /// Returns true if the matched text passes the rule's validator (or it has none).
    pub fn accepts(&self, matched: &str) -> bool {
        self.validator.map_or(true, |v| v.validate(matched))
    }
}

/// All compiled detectors, grouped by locale in declaration order.
#[derive(Debug, Default)]
pub struct CompiledLibrary {
    locales: BTreeMap<String, Vec<CompiledPattern>>,
}

impl CompiledLibrary {
    /// Resolves the patterns for a locale, falling back to `en-US` when the
    /// locale is empty or unknown.
    pub fn patterns_for(&self, locale: &str) -> &[CompiledPattern] {
        if !locale.is_empty() {
            if let Some(patterns) = self.locales.get(locale) {
                return patterns;
            }
            debug!("Locale '{}' has no patterns, falling back to {}", locale, DEFAULT_LOCALE);
        }
        self.locales
            .get(DEFAULT_LOCALE)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Locale names known to the library.
    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.locales.keys().map(String::as_str)
    }

    pub fn pattern_count(&self) -> usize {
        self.locales.values().map(Vec::len).sum()
    }
}

lazy_static! {
    /// A thread-safe, global cache for compiled libraries.
    static ref COMPILED_LIBRARY_CACHE: RwLock<HashMap<u64, Arc<CompiledLibrary>>> = RwLock::new(HashMap::new());
}

/// Hashes the pattern library to create a stable cache key.
///
/// Locales are already ordered by the `BTreeMap`; rule order within a
/// locale is significant and hashed as-is.
fn hash_config(config: &PatternConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    for (locale, rules) in &config.locales {
        locale.hash(&mut hasher);
        rules.hash(&mut hasher);
    }
    hasher.finish()
}

fn compile_pattern(rule: &PatternRule) -> Result<CompiledPattern, PiiGuardError> {
    debug!("Attempting to compile pattern: '{}' with pattern '{:?}'", &rule.name, &rule.pattern);

    if rule.pattern.len() > MAX_PATTERN_LENGTH {
        return Err(PiiGuardError::PatternLengthExceeded(
            rule.name.clone(),
            rule.pattern.len(),
            MAX_PATTERN_LENGTH,
        ));
    }

    let validator = match rule.validator.as_deref() {
        Some(name) => Some(
            ValidatorKind::from_name(name)
                .ok_or_else(|| PiiGuardError::UnknownValidator(rule.name.clone(), name.to_string()))?,
        ),
        None => None,
    };

    let regex = RegexBuilder::new(&rule.pattern)
        .size_limit(10 * (1 << 20)) // 10 MB limit for compiled regex
        .build()
        .map_err(|e| PiiGuardError::PatternCompilation(rule.name.clone(), e))?;

    Ok(CompiledPattern {
        regex,
        name: rule.name.clone(),
        validator,
        confidence: rule.confidence,
    })
}

/// Compiles every enabled rule of every locale. All failures are collected
/// and reported together.
pub fn compile_library(config: &PatternConfig) -> Result<CompiledLibrary, PiiGuardError> {
    debug!("Starting compilation of {} patterns.", config.rule_count());

    let mut locales = BTreeMap::new();
    let mut compilation_errors = Vec::new();

    for (locale, rules) in &config.locales {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules.iter().filter(|r| r.is_enabled()) {
            match compile_pattern(rule) {
                Ok(pattern) => compiled.push(pattern),
                Err(e) => compilation_errors.push(format!("[{}] {}", locale, e)),
            }
        }
        locales.insert(locale.clone(), compiled);
    }

    if !compilation_errors.is_empty() {
        return Err(PiiGuardError::Fatal(format!(
            "Failed to compile {} pattern(s):\n{}",
            compilation_errors.len(),
            compilation_errors.join("\n")
        )));
    }

    let library = CompiledLibrary { locales };
    debug!("Finished compiling patterns. Total compiled: {}.", library.pattern_count());
    Ok(library)
}

/// Gets a `CompiledLibrary` from the cache or compiles it if not found.
pub fn get_or_compile_library(config: &PatternConfig) -> Result<Arc<CompiledLibrary>, PiiGuardError> {
    let cache_key = hash_config(config);

    {
        let cache = COMPILED_LIBRARY_CACHE
            .read()
            .map_err(|_| PiiGuardError::Fatal("pattern cache lock poisoned".to_string()))?;
        if let Some(library) = cache.get(&cache_key) {
            debug!("Serving compiled patterns from cache for key: {}", &cache_key);
            return Ok(Arc::clone(library));
        }
    }

    debug!("Compiled patterns not found in cache. Compiling now.");
    let compiled = Arc::new(compile_library(config)?);

    COMPILED_LIBRARY_CACHE
        .write()
        .map_err(|_| PiiGuardError::Fatal("pattern cache lock poisoned".to_string()))?
        .insert(cache_key, Arc::clone(&compiled));

    debug!("Successfully compiled and cached patterns for key: {}", &cache_key);
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, pattern: &str) -> PatternRule {
        PatternRule {
            name: name.to_string(),
            pattern: pattern.to_string(),
            confidence: 0.8,
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_locale_falls_back_to_default() {
        let config = PatternConfig::load_default_patterns().unwrap();
        let library = compile_library(&config).unwrap();
        let us: Vec<&str> = library.patterns_for("en-US").iter().map(|p| p.name.as_str()).collect();
        let fallback: Vec<&str> = library.patterns_for("fr-FR").iter().map(|p| p.name.as_str()).collect();
        let empty: Vec<&str> = library.patterns_for("").iter().map(|p| p.name.as_str()).collect();
        assert_eq!(us, fallback);
        assert_eq!(us, empty);
        assert!(library.patterns_for("en-GB").iter().any(|p| p.name == "UK_NINO"));
    }

    #[test]
    fn test_disabled_rules_are_not_compiled() {
        let mut config = PatternConfig::default();
        let mut disabled = rule("OFF", "x+");
        disabled.enabled = Some(false);
        config.locales.insert("en-US".into(), vec![rule("ON", "y+"), disabled]);
        let library = compile_library(&config).unwrap();
        assert_eq!(library.pattern_count(), 1);
    }

    #[test]
    fn test_compile_errors_are_collected() {
        let mut config = PatternConfig::default();
        let mut bad_validator = rule("B", "b");
        bad_validator.validator = Some("nope".into());
        config.locales.insert(
            "en-US".into(),
            vec![rule("A", "(unclosed"), bad_validator, rule("C", &"c".repeat(MAX_PATTERN_LENGTH + 1))],
        );
        match compile_library(&config) {
            Err(PiiGuardError::Fatal(msg)) => {
                assert!(msg.starts_with("Failed to compile 3 pattern(s)"));
                assert!(msg.contains("unknown validator 'nope'"));
            }
            other => panic!("expected fatal error, got {:?}", other),
        }
    }

    #[test]
    fn test_cache_returns_shared_instance() {
        let config = PatternConfig::load_default_patterns().unwrap();
        let a = get_or_compile_library(&config).unwrap();
        let b = get_or_compile_library(&config).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
