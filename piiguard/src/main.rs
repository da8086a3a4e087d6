// piiguard/src/main.rs
//! piiguard entry point.
//!
//! Parses arguments, sets up logging and the theme, loads the pattern
//! library and dispatches to the selected subcommand.
//! License: MIT OR APACHE 2.0

use std::process;

use anyhow::Result;
use clap::Parser;
use log::debug;

use piiguard::cli::{Cli, Commands};
use piiguard::commands::{self, detect, detokenize, patterns, purge, redact};
use piiguard::logger;
use piiguard::ui::output::error_msg;
use piiguard::ui::theme::{build_theme_map, ThemeMap, ThemeStyle};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logger::init_logger(logger::level_for_flags(cli.quiet, cli.debug));

    let theme = match build_theme_map(cli.theme.as_deref()) {
        Ok(theme) => theme,
        Err(e) => {
            let fallback = ThemeStyle::default_theme_map();
            error_msg(format!("{:#}", e), &fallback);
            fallback
        }
    };

    if let Err(e) = run(&cli, &theme).await {
        error_msg(format!("{:#}", e), &theme);
        process::exit(1);
    }
}

async fn run(cli: &Cli, theme: &ThemeMap) -> Result<()> {
    let config = commands::load_pattern_config(cli.patterns.as_deref(), cli.enable_ner, &cli.disable)?;
    debug!(
        "Pattern library ready: {} rule(s), NER {}",
        config.rule_count(),
        if config.engines.ner.is_enabled() { "on" } else { "off" }
    );

    match &cli.command {
        Commands::Detect(cmd) => detect::run_detect(cmd, &config, theme).await,
        Commands::Redact(cmd) => redact::run_redact(cmd, &config, theme, cli.quiet).await,
        Commands::Detokenize(cmd) => detokenize::run_detokenize(cmd, &config, theme, cli.quiet).await,
        Commands::Purge(cmd) => purge::run_purge(cmd, theme, cli.quiet).await,
        Commands::Patterns(cmd) => patterns::run_patterns(cmd, &config, theme),
    }
}
