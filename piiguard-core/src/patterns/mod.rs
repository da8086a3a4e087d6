//! Pattern library compilation.
//!
//! Turns the YAML-backed `PatternConfig` into per-locale lists of compiled
//! detectors that the regex span producer iterates over.
//!
//! License: MIT OR APACHE 2.0

pub mod compiler;
