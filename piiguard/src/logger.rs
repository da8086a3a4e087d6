// piiguard/src/logger.rs
//! Logging setup for the CLI.
//!
//! `RUST_LOG` is honoured by default; an explicit level from `--debug` or
//! `--quiet` replaces it. Calling `init_logger` more than once is harmless,
//! which lets tests initialise logging freely.

use env_logger::Builder;
use log::LevelFilter;

pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_default_env();
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).target(env_logger::Target::Stderr);

    // A logger may already be installed by an earlier test.
    let _ = builder.try_init();
}

/// Chooses the level override for the given flags. `None` leaves `RUST_LOG` in charge.
pub fn level_for_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_wins_over_debug() {
        assert_eq!(level_for_flags(true, true), Some(LevelFilter::Off));
        assert_eq!(level_for_flags(false, true), Some(LevelFilter::Debug));
        assert_eq!(level_for_flags(false, false), None);
    }
}
