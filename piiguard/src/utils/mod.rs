// piiguard/src/utils/mod.rs
//! Filesystem helpers for the CLI.

pub mod token_file;
