//! Output format options.

use clap::ValueEnum;

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables and colored summaries.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
    /// Compact JSON (single line).
    #[value(name = "json-compact", alias = "jsonl")]
    JsonCompact,
    /// YAML.
    #[value(alias = "yml")]
    Yaml,
    /// Tab-separated fields or bare text, for scripting.
    #[value(alias = "text")]
    Plain,
}

impl OutputFormat {
    /// Returns true for the serde-rendered formats.
    pub fn is_structured(self) -> bool {
        matches!(self, Self::Json | Self::JsonCompact | Self::Yaml)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => Ok(()),
        }
    }
}
