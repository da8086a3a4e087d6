// piiguard/src/commands/redact.rs
//! `piiguard redact`: replace findings according to a mode.

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use piiguard_core::{PatternConfig, PiiService, RedactionMode, RedactionRequest};

use crate::cli::RedactCommand;
use crate::commands::{build_request, open_token_store, read_input, with_store_timeout, write_json, write_text};
use crate::ui::output::info_msg;
use crate::ui::theme::ThemeMap;

pub async fn run_redact(cmd: &RedactCommand, config: &PatternConfig, theme: &ThemeMap, quiet: bool) -> Result<()> {
    let text = read_input(&cmd.input)?;
    let request = RedactionRequest {
        detection: build_request(text, &cmd.detection),
        mode: RedactionMode::from(cmd.mode),
        ttl: cmd.ttl_hours,
    };

    let store = open_token_store(&cmd.store);
    let store_path = store.path().to_path_buf();
    let service = PiiService::new(config, Arc::new(store))?;

    let response = with_store_timeout(&cmd.store, service.redact(&request))
        .await?
        .context("Redaction failed")?;

    if request.mode == RedactionMode::Tokenize && !quiet && response.entities_found > 0 {
        info_msg(
            format!("Stored {} token(s) in {}", response.entities_found, store_path.display()),
            theme,
        );
    }

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    if cmd.text_only {
        write_text(&mut writer, &response.redacted_text)?;
    } else {
        write_json(&mut writer, &response)?;
    }
    Ok(())
}
