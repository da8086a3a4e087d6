// piiguard/src/commands/detect.rs
//! `piiguard detect`: report findings without changing the text.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::info;
use piiguard_core::{MemoryTokenStore, PatternConfig, PiiService};

use crate::cli::DetectCommand;
use crate::commands::{build_request, read_input, write_json};
use crate::ui::output;
use crate::ui::theme::ThemeMap;

pub async fn run_detect(cmd: &DetectCommand, config: &PatternConfig, theme: &ThemeMap) -> Result<()> {
    let text = read_input(&cmd.input)?;
    let request = build_request(text, &cmd.detection);

    // Detection never touches the token store.
    let service = PiiService::new(config, Arc::new(MemoryTokenStore::new()))?;
    let response = service.detect(&request).await.context("Detection failed")?;
    info!("Detected {} entities", response.entities_found);

    let stdout = io::stdout();
    let colors = stdout.is_terminal();
    let mut writer = stdout.lock();
    if cmd.table {
        writeln!(writer, "{}", output::detections_table(&response.detections, theme, colors))?;
        writeln!(writer, "{}", output::risk_summary_line(&response.risk_summary, theme, colors))?;
    } else {
        write_json(&mut writer, &response)?;
    }
    Ok(())
}
