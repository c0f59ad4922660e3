pub mod json;
pub mod table;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// Output format for CLI commands
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    /// Print `value` as JSON, or hand it to `text` for the human-readable form.
    pub fn emit<T, F>(self, value: &T, text: F) -> Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&T) -> Result<()>,
    {
        match self {
            OutputFormat::Json => json::print_json(value),
            OutputFormat::Text => text(value),
        }
    }
}
