// piiguard/src/commands/detokenize.rs
//! `piiguard detokenize`: restore original values for issued tokens.

use std::io;
use std::sync::Arc;

use anyhow::Result;
use piiguard_core::{DetokenizeRequest, PatternConfig, PiiService};

use crate::cli::DetokenizeCommand;
use crate::commands::{open_token_store, read_input, with_store_timeout, write_json, write_text};
use crate::ui::output::warn_msg;
use crate::ui::theme::ThemeMap;

pub async fn run_detokenize(cmd: &DetokenizeCommand, config: &PatternConfig, theme: &ThemeMap, quiet: bool) -> Result<()> {
    let request = DetokenizeRequest {
        text: read_input(&cmd.input)?,
        tokens: cmd.tokens.clone(),
    };

    let service = PiiService::new(config, Arc::new(open_token_store(&cmd.store)))?;
    let response = with_store_timeout(&cmd.store, service.detokenize(&request)).await?;

    let unresolved = unresolved_tokens(&response.detokenized_text, &request.tokens);
    if !quiet && !unresolved.is_empty() {
        warn_msg(
            format!("{} token(s) could not be resolved: {}", unresolved.len(), unresolved.join(", ")),
            theme,
        );
    }

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    if cmd.text_only {
        write_text(&mut writer, &response.detokenized_text)?;
    } else {
        write_json(&mut writer, &response)?;
    }
    Ok(())
}

/// Requested tokens that are still present after restoration.
fn unresolved_tokens<'a>(restored: &str, tokens: &'a [String]) -> Vec<&'a str> {
    tokens
        .iter()
        .map(String::as_str)
        .filter(|t| !t.is_empty() && restored.contains(t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_only_tokens_left_in_text() {
        let tokens = vec!["tok_a".to_string(), "tok_b".to_string(), String::new()];
        assert_eq!(unresolved_tokens("alice and tok_b", &tokens), vec!["tok_b"]);
        assert!(unresolved_tokens("alice and bob", &tokens).is_empty());
    }
}
