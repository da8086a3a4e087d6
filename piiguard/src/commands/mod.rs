// piiguard/src/commands/mod.rs
//! Subcommand implementations and the plumbing they share.

pub mod detect;
pub mod detokenize;
pub mod patterns;
pub mod purge;
pub mod redact;

use std::fs;
use std::future::Future;
use std::io::{self, Read, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use piiguard_core::{config, DetectionRequest, PatternConfig};

use crate::cli::{DetectionArgs, InputArgs, StoreArgs};
use crate::utils::token_file::JsonFileTokenStore;

/// Returns the text to process from `--text`, `--input-file` or stdin.
pub fn read_input(input: &InputArgs) -> Result<String> {
    if let Some(text) = &input.text {
        return Ok(text.clone());
    }
    if let Some(path) = &input.input_file {
        info!("Reading input from file: {}", path.display());
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display()));
    }
    debug!("Reading input from stdin");
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read input from stdin")?;
    Ok(buffer)
}

/// Built-in patterns, overlaid with the user's file when one is given,
/// minus the rules named in `disable`.
pub fn load_pattern_config(patterns: Option<&Path>, enable_ner: bool, disable: &[String]) -> Result<PatternConfig> {
    let defaults = PatternConfig::load_default_patterns()?;
    let user = patterns.map(PatternConfig::load_from_file).transpose()?;
    let mut merged = config::merge_patterns(defaults, user);
    if enable_ner {
        merged.engines.ner.enabled = Some(true);
    }
    if !disable.is_empty() {
        info!("Disabling rules: {}", disable.join(", "));
        merged.disable_rules(disable);
    }
    Ok(merged)
}

pub fn build_request(text: String, args: &DetectionArgs) -> DetectionRequest {
    DetectionRequest {
        text,
        locale: args.locale.clone().unwrap_or_default(),
        entity_types: args.entity_types.clone(),
        confidence_threshold: args.threshold.unwrap_or(0.0),
    }
}

pub fn open_token_store(args: &StoreArgs) -> JsonFileTokenStore {
    let path = args
        .token_store
        .clone()
        .unwrap_or_else(JsonFileTokenStore::default_path);
    debug!("Using token store at {}", path.display());
    JsonFileTokenStore::new(path)
}

/// Runs an operation that talks to the token store, bounded by the
/// configured timeout.
pub async fn with_store_timeout<T, F>(args: &StoreArgs, fut: F) -> Result<T>
where
    F: Future<Output = T>,
{
    let limit = Duration::from_secs(args.store_timeout_secs);
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| anyhow!("Token store did not respond within {}s", args.store_timeout_secs))
}

/// Writes `text` to stdout, adding a newline only if it lacks one.
pub fn write_text<W: Write>(writer: &mut W, text: &str) -> io::Result<()> {
    if text.ends_with('\n') {
        write!(writer, "{}", text)
    } else {
        writeln!(writer, "{}", text)
    }
}

pub fn write_json<W: Write, T: serde::Serialize>(writer: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value).context("Failed to encode JSON output")?;
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_flag_wins() {
        let input = InputArgs { text: Some("hello".into()), input_file: None };
        assert_eq!(read_input(&input).unwrap(), "hello");
    }

    #[test]
    fn missing_input_file_has_context() {
        let input = InputArgs { text: None, input_file: Some("/no/such/file.txt".into()) };
        let err = read_input(&input).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to read input file"));
    }

    #[test]
    fn enable_ner_flag_overrides_config() {
        let config = load_pattern_config(None, true, &[]).unwrap();
        assert!(config.engines.ner.is_enabled());
        let config = load_pattern_config(None, false, &[]).unwrap();
        assert!(!config.engines.ner.is_enabled());
    }

    #[test]
    fn disable_list_turns_rules_off_in_every_locale() {
        let config = load_pattern_config(None, false, &["EMAIL".to_string()]).unwrap();
        for rules in config.locales.values() {
            let email = rules.iter().find(|r| r.name == "EMAIL").unwrap();
            assert!(!email.is_enabled());
            assert!(rules.iter().filter(|r| r.name != "EMAIL").all(|r| r.is_enabled()));
        }
    }

    #[test]
    fn write_text_adds_single_newline() {
        let mut out = Vec::new();
        write_text(&mut out, "a\n").unwrap();
        write_text(&mut out, "b").unwrap();
        assert_eq!(out, b"a\nb\n");
    }
}
