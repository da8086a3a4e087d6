// piiguard/src/commands/patterns.rs
//! `piiguard patterns`: list the compiled detectors for a locale.

use std::io::{self, Write};

use anyhow::Result;
use is_terminal::IsTerminal;
use serde::Serialize;
use piiguard_core::{get_or_compile_library, PatternConfig};

use crate::cli::PatternsCommand;
use crate::commands::write_json;
use crate::ui::output;
use crate::ui::theme::ThemeMap;

#[derive(Debug, Serialize)]
struct PatternListing<'a> {
    name: &'a str,
    validator: Option<&'static str>,
    confidence: f64,
    pattern: &'a str,
}

pub fn run_patterns(cmd: &PatternsCommand, config: &PatternConfig, theme: &ThemeMap) -> Result<()> {
    let library = get_or_compile_library(config)?;
    let locale = cmd
        .locale
        .as_deref()
        .unwrap_or_else(|| config.engines.pipeline.default_locale());
    let patterns = library.patterns_for(locale);

    let stdout = io::stdout();
    let colors = stdout.is_terminal();
    let mut writer = stdout.lock();
    if cmd.json {
        let listing: Vec<PatternListing<'_>> = patterns
            .iter()
            .map(|p| PatternListing {
                name: &p.name,
                validator: p.validator.map(|v| v.name()),
                confidence: p.confidence,
                pattern: p.regex.as_str(),
            })
            .collect();
        write_json(&mut writer, &listing)?;
    } else {
        writeln!(writer, "{}", output::patterns_table(patterns, theme, colors))?;
    }
    Ok(())
}
