// piiguard/src/lib.rs
//! # piiguard command-line application
//!
//! Terminal front end for `piiguard-core`: argument parsing, the
//! subcommands, themed output and the on-disk token store.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
pub mod utils;
