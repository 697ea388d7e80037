//! Anonymization reports and report export.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{AnonymizeError, AnonymizeResult};
use protector_core::PiiCategory;

/// One substituted span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replacement {
    /// Category of the original value.
    #[serde(rename = "type")]
    pub category: PiiCategory,
    /// Original text.
    pub original: String,
    /// Synthetic replacement.
    pub replacement: String,
    /// Byte offset of the original in the input text.
    pub position: usize,
    /// Detection confidence.
    pub confidence: f64,
}

/// Result of anonymizing one text.
#[derive(Debug, Clone, PartialEq)]
pub struct AnonymizationReport {
    /// Input text.
    pub original_text: String,
    /// Output text.
    pub anonymized_text: String,
    /// Replacements in ascending position order.
    pub replacements: Vec<Replacement>,
    /// Number of matches found.
    pub count_found: usize,
    /// Wall-clock processing time.
    pub elapsed: Duration,
}

impl AnonymizationReport {
    /// Creates a report for text with no PII.
    #[must_use]
    pub fn unchanged(text: &str, elapsed: Duration) -> Self {
        Self {
            original_text: text.to_string(),
            anonymized_text: text.to_string(),
            replacements: Vec::new(),
            count_found: 0,
            elapsed,
        }
    }

    /// Returns the processing time in milliseconds.
    #[must_use]
    pub fn processing_time_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }

    /// Returns true if any PII was found.
    #[must_use]
    pub fn has_pii(&self) -> bool {
        self.count_found > 0
    }

    /// Returns the export summary.
    #[must_use]
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            pii_found: self.count_found,
            processing_time_ms: (self.processing_time_ms() * 100.0).round() / 100.0,
        }
    }

    /// Renders the report in the given format.
    pub fn export(&self, format: ReportFormat) -> AnonymizeResult<String> {
        let export = ReportExport {
            summary: self.summary(),
            replacements: &self.replacements,
        };

        match format {
            ReportFormat::Json => Ok(serde_json::to_string_pretty(&export)?),
            ReportFormat::Yaml => Ok(serde_yaml::to_string(&export)?),
            ReportFormat::Text => Ok(self.to_text()),
        }
    }

    /// Renders the report and writes it to `path`.
    pub fn export_to(&self, path: impl AsRef<Path>, format: ReportFormat) -> AnonymizeResult<String> {
        let rendered = self.export(format)?;
        std::fs::write(path, &rendered)?;
        Ok(rendered)
    }

    fn to_text(&self) -> String {
        let rule = "=".repeat(40);
        let thin = "-".repeat(40);
        let mut lines = vec![
            "Privacy Protection Report".to_string(),
            rule,
            format!("PII Found: {}", self.count_found),
            format!("Processing Time: {:.2}ms", self.processing_time_ms()),
            String::new(),
            "Replacements:".to_string(),
            thin,
        ];
        lines.extend(
            self.replacements
                .iter()
                .map(|r| format!("  [{}] {} -> {}", r.category, r.original, r.replacement)),
        );
        lines.join("\n")
    }
}

/// Report summary block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Number of matches found.
    pub pii_found: usize,
    /// Processing time, rounded to two decimals.
    pub processing_time_ms: f64,
}

#[derive(Serialize)]
struct ReportExport<'a> {
    summary: ReportSummary,
    replacements: &'a [Replacement],
}

/// Report export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
    /// Line-oriented text.
    Text,
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Text => "text",
        };
        f.write_str(name)
    }
}

impl FromStr for ReportFormat {
    type Err = AnonymizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "text" | "txt" => Ok(Self::Text),
            other => Err(AnonymizeError::InvalidConfig(format!(
                "unknown report format '{other}'"
            ))),
        }
    }
}
