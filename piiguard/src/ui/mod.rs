// piiguard/src/ui/mod.rs
//! Terminal presentation: colour themes, status messages and tables.

pub mod output;
pub mod theme;
