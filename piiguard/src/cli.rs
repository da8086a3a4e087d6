// piiguard/src/cli.rs
//! This file defines the command-line interface (CLI) for the piiguard application,
//! including all available commands and their arguments.
//! License: MIT OR APACHE 2.0

use clap::{Args, Parser, Subcommand, ValueEnum};
use piiguard_core::RedactionMode;
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "piiguard",
    author = "Obscura Team (Relay)",
    version = env!("CARGO_PKG_VERSION"),
    about = "Detect, redact and tokenize PII in text",
    long_about = "piiguard scans natural-language text for personally identifiable information (emails, phone numbers, SSNs, card numbers, IP addresses and, optionally, names, organizations, places and dates) and replaces each finding with a masked, templated, hashed or reversible token value.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Disable informational messages
    #[arg(long, short = 'q', global = true, help = "Suppress all informational and debug messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// Specify the path to a custom YAML theme file.
    #[arg(long = "theme", value_name = "FILE", global = true, help = "Specify the path to a custom YAML theme file.")]
    pub theme: Option<PathBuf>,

    /// Custom pattern library merged over the built-in one.
    #[arg(long = "patterns", value_name = "FILE", env = "PIIGUARD_PATTERNS", global = true, help = "Path to a custom pattern library (YAML).")]
    pub patterns: Option<PathBuf>,

    /// Turn on the heuristic entity recognizer.
    #[arg(long = "enable-ner", env = "PIIGUARD_ENABLE_NER", global = true, help = "Enable person/organization/location/date recognition.")]
    pub enable_ner: bool,

    /// Rules to switch off for this run.
    #[arg(long = "disable", value_name = "RULES", value_delimiter = ',', global = true, help = "Comma-separated pattern names to disable (e.g. EMAIL,IP_ADDRESS).")]
    pub disable: Vec<String>,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `piiguard` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scans an input for PII and prints the findings.
    #[command(about = "Scan text for PII and print the findings as JSON or a table.")]
    Detect(DetectCommand),

    /// Replaces every finding according to the chosen mode.
    #[command(about = "Redact PII from text by masking, templating, hashing or tokenizing it.")]
    Redact(RedactCommand),

    /// Restores tokenized values.
    #[command(about = "Replace tokens issued by `redact --mode tokenize` with their original values.")]
    Detokenize(DetokenizeCommand),

    /// Drops expired tokens from the store file.
    #[command(about = "Remove expired mappings from the token store.")]
    Purge(PurgeCommand),

    /// Lists the compiled pattern library.
    #[command(about = "List the detectors available for a locale.")]
    Patterns(PatternsCommand),
}

/// Where the text to process comes from. Stdin is read when neither flag is given.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    #[arg(long, short = 't', value_name = "TEXT", conflicts_with = "input_file", help = "Process this text instead of stdin.")]
    pub text: Option<String>,

    #[arg(long, short = 'i', value_name = "FILE", help = "Read input from a specified file instead of stdin.")]
    pub input_file: Option<PathBuf>,
}

/// Request options shared by `detect` and `redact`.
#[derive(Args, Debug, Clone, Default)]
pub struct DetectionArgs {
    #[arg(long, short = 'l', value_name = "LOCALE", help = "Pattern locale, e.g. en-US or en-GB (defaults to en-US).")]
    pub locale: Option<String>,

    #[arg(long = "entity-types", short = 'e', value_delimiter = ',', help = "Only report these entity types (comma-separated).")]
    pub entity_types: Vec<String>,

    #[arg(long, value_name = "SCORE", help = "Minimum confidence, inclusive (defaults to 0.60).")]
    pub threshold: Option<f64>,
}

/// Token store location and call timeout.
#[derive(Args, Debug, Clone, Default)]
pub struct StoreArgs {
    #[arg(long = "token-store", value_name = "FILE", env = "PIIGUARD_TOKEN_STORE", help = "Token store file (defaults to <config dir>/piiguard/tokens.json).")]
    pub token_store: Option<PathBuf>,

    #[arg(long = "store-timeout-secs", value_name = "SECS", env = "PIIGUARD_STORE_TIMEOUT_SECS", default_value_t = 10, help = "Give up on token store calls after this many seconds.")]
    pub store_timeout_secs: u64,
}

#[derive(Parser, Debug)]
pub struct DetectCommand {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub detection: DetectionArgs,

    #[arg(long, help = "Print a table instead of JSON.")]
    pub table: bool,
}

/// Redaction mode as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ModeArg {
    Mask,
    #[default]
    Replace,
    Hash,
    Tokenize,
}

impl From<ModeArg> for RedactionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Mask => RedactionMode::Mask,
            ModeArg::Replace => RedactionMode::Replace,
            ModeArg::Hash => RedactionMode::Hash,
            ModeArg::Tokenize => RedactionMode::Tokenize,
        }
    }
}

#[derive(Parser, Debug)]
pub struct RedactCommand {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub detection: DetectionArgs,

    #[arg(long, short = 'm', value_enum, default_value_t = ModeArg::Replace, help = "How to replace each finding.")]
    pub mode: ModeArg,

    #[arg(long = "ttl-hours", value_name = "HOURS", default_value_t = 0, help = "Token lifetime for tokenize mode (0 means 24).")]
    pub ttl_hours: u32,

    #[arg(long = "text-only", help = "Print only the redacted text instead of the JSON response.")]
    pub text_only: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Parser, Debug)]
pub struct DetokenizeCommand {
    #[command(flatten)]
    pub input: InputArgs,

    #[arg(long, value_delimiter = ',', required = true, help = "Tokens to resolve, in order (comma-separated).")]
    pub tokens: Vec<String>,

    #[arg(long = "text-only", help = "Print only the restored text instead of the JSON response.")]
    pub text_only: bool,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Parser, Debug)]
pub struct PurgeCommand {
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Parser, Debug)]
pub struct PatternsCommand {
    #[arg(long, short = 'l', value_name = "LOCALE", help = "Locale to list (defaults to en-US).")]
    pub locale: Option<String>,

    #[arg(long, help = "Print JSON instead of a table.")]
    pub json: bool,
}
