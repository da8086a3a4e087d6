// piiguard-core/src/engines/mod.rs
//! Span producer implementations.
//!
//! Each engine is a separate file within this directory and implements the
//! `DetectionEngine` trait.
//!
//! License: MIT OR APACHE 2.0

pub mod regex_engine;
pub mod ner_engine;
