// piiguard/src/commands/purge.rs
//! `piiguard purge`: drop expired mappings from the token store file.

use anyhow::{Context, Result};

use crate::cli::PurgeCommand;
use crate::commands::{open_token_store, with_store_timeout};
use crate::ui::output::success_msg;
use crate::ui::theme::ThemeMap;

pub async fn run_purge(cmd: &PurgeCommand, theme: &ThemeMap, quiet: bool) -> Result<()> {
    let store = open_token_store(&cmd.store);
    let removed = with_store_timeout(&cmd.store, store.purge_expired())
        .await?
        .context("Failed to purge token store")?;

    if !quiet {
        success_msg(
            format!("Removed {} expired token(s) from {}", removed, store.path().display()),
            theme,
        );
    }
    Ok(())
}
