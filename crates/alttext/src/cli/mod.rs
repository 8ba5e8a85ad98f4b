//! Command implementations.

pub mod config;
pub mod prime;
pub mod prompt;
pub mod settings;
pub mod setup;
pub mod suggest;

use clap::ValueEnum;

/// How per-subject results are printed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Styled text for terminals (default)
    #[default]
    Human,
    /// One JSON array of all records
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl OutputFormat {
    /// Machine format, or `None` for human output.
    pub fn machine(self) -> Option<alttext_core::OutputFormat> {
        match self {
            OutputFormat::Human => None,
            OutputFormat::Json => Some(alttext_core::OutputFormat::Json),
            OutputFormat::Jsonl => Some(alttext_core::OutputFormat::JsonLines),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Human => write!(f, "human"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}
