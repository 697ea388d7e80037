//! Table formatting utilities.

use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use crate::commands::{AnonymizeOutput, BatchEntry, CategoryInfo, DetectionOutput};
use crate::output::truncate;

/// Trait for types that can be displayed as a table.
pub trait TableDisplay: serde::Serialize {
    /// Prints as a formatted table.
    fn print_table(&self);

    /// Prints a single row (for list iteration).
    fn print_table_row(&self) {
        self.print_plain();
    }

    /// Prints the table header (for list iteration).
    fn print_table_header() {}

    /// Prints as plain text.
    fn print_plain(&self);
}

/// Renders rows with the rounded table style.
pub fn render_rows<R: Tabled>(rows: Vec<R>) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct MatchRow {
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "VALUE")]
    value: String,
    #[tabled(rename = "START")]
    start: usize,
    #[tabled(rename = "END")]
    end: usize,
    #[tabled(rename = "CONFIDENCE")]
    confidence: String,
}

#[derive(Tabled)]
struct ReplacementRow {
    #[tabled(rename = "CATEGORY")]
    category: String,
    #[tabled(rename = "POSITION")]
    position: usize,
    #[tabled(rename = "ORIGINAL")]
    original: String,
    #[tabled(rename = "REPLACEMENT")]
    replacement: String,
}

impl TableDisplay for DetectionOutput {
    fn print_table(&self) {
        println!("{}: {}", "PII Found".bold(), self.pii_found);
        if self.matches.is_empty() {
            return;
        }

        let rows = self
            .matches
            .iter()
            .map(|m| MatchRow {
                category: m.category.to_string(),
                value: truncate(&m.value, 40),
                start: m.start,
                end: m.end,
                confidence: format!("{:.2}", m.confidence),
            })
            .collect();
        println!("{}", render_rows(rows));
    }

    fn print_plain(&self) {
        for m in &self.matches {
            println!("{}\t{}\t{}\t{}", m.category, m.start, m.end, m.value);
        }
    }
}

impl TableDisplay for AnonymizeOutput {
    fn print_table(&self) {
        println!("{}", "Anonymized Text:".bold().underline());
        println!("{}", self.anonymized_text);
        println!();
        println!("{}: {}", "PII Found".bold(), self.summary.pii_found);
        println!("{}: {}ms", "Processing Time".bold(), self.summary.processing_time_ms);

        if !self.replacements.is_empty() {
            let rows = self
                .replacements
                .iter()
                .map(|r| ReplacementRow {
                    category: r.category.to_string(),
                    position: r.position,
                    original: truncate(&r.original, 30),
                    replacement: truncate(&r.replacement, 30),
                })
                .collect();
            println!("\n{}", "Replacements:".bold().underline());
            println!("{}", render_rows(rows));
        }
    }

    fn print_plain(&self) {
        print!("{}", self.anonymized_text);
        if !self.anonymized_text.ends_with('\n') {
            println!();
        }
    }
}

impl TableDisplay for CategoryInfo {
    fn print_table(&self) {
        println!("{}", self.category.green().bold());
        println!("  {}", self.description);
        for rule in &self.rules {
            println!("  {} {}", "rule:".dimmed(), rule);
        }
    }

    fn print_table_row(&self) {
        println!(
            "{}\t{}\t{}",
            self.category.green(),
            self.rules.len(),
            self.description,
        );
    }

    fn print_table_header() {
        println!("{}", "CATEGORY\tRULES\tDESCRIPTION".bold());
        println!("{}", "-".repeat(60));
    }

    fn print_plain(&self) {
        println!("{}", self.category);
    }
}

impl TableDisplay for BatchEntry {
    fn print_table(&self) {
        println!("{}: {}", "Input".bold(), self.input);
        match (&self.output, &self.error) {
            (_, Some(error)) => println!("{}: {}", "Error".bold(), error.red()),
            (Some(output), None) => {
                println!("{}: {}", "Output".bold(), output);
                println!("{}: {}", "PII Found".bold(), self.pii_found);
            }
            (None, None) => {}
        }
    }

    fn print_table_row(&self) {
        let status = if self.error.is_some() {
            "failed".red()
        } else if self.pii_found > 0 {
            "anonymized".yellow()
        } else {
            "clean".green()
        };
        println!(
            "{}\t{}\t{}\t{}",
            truncate(&self.input, 40),
            status,
            self.pii_found,
            self.output.as_deref().or(self.error.as_deref()).unwrap_or("-"),
        );
    }

    fn print_table_header() {
        println!("{}", "INPUT\tSTATUS\tPII\tOUTPUT".bold());
        println!("{}", "-".repeat(80));
    }

    fn print_plain(&self) {
        if let Some(ref output) = self.output {
            println!("{output}");
        }
    }
}
