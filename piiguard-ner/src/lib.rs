// piiguard-ner/src/lib.rs
#![no_std]

extern crate alloc; 

#[cfg(feature = "std")]
extern crate std;

pub mod tokenizer;
pub mod lexicon;
pub mod scoring;
pub mod engine;

pub use engine::{Entity, EntityLabel, Recognizer, RecognizerError};

/// Common type definitions
pub type EvidenceScore = f64;
