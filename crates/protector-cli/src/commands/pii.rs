//! PII detection and anonymization commands.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use protector_anonymize::{
    AnonymizationReport, Match, ReportFormat, ReportSummary, Replacement,
};
use serde::Serialize;

use crate::output::{print_list, print_output, render_structured, success, CliError, ErrorKind, OutputFormat};

use super::Context;

/// Input selection shared by the text commands.
#[derive(Args, Debug, Default)]
pub struct InputArgs {
    /// Text to analyze
    #[arg(long, short, conflicts_with = "file")]
    pub text: Option<String>,

    /// Read from file
    #[arg(long, short = 'i', conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Read from stdin
    #[arg(long, conflicts_with_all = ["text", "file"])]
    pub stdin: bool,
}

impl InputArgs {
    /// Reads the selected input.
    pub fn read(self) -> Result<String, CliError> {
        if let Some(t) = self.text {
            Ok(t)
        } else if let Some(path) = self.file {
            std::fs::read_to_string(&path).map_err(|e| {
                CliError::with_cause(
                    ErrorKind::Io,
                    format!("Failed to read file: {}", path.display()),
                    e,
                )
            })
        } else if self.stdin {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| CliError::with_cause(ErrorKind::Io, "Failed to read stdin", e))?;
            Ok(buffer)
        } else {
            Err(CliError::validation(
                "Provide input with --text, --file, or --stdin",
            ))
        }
    }
}

/// Detected spans.
#[derive(Debug, Serialize)]
pub struct DetectionOutput {
    /// Number of matches.
    pub pii_found: usize,
    /// Matches in ascending start order.
    pub matches: Vec<Match>,
}

impl From<Vec<Match>> for DetectionOutput {
    fn from(matches: Vec<Match>) -> Self {
        Self {
            pii_found: matches.len(),
            matches,
        }
    }
}

/// Anonymized text with its replacements.
#[derive(Debug, Serialize)]
pub struct AnonymizeOutput {
    /// Output text.
    pub anonymized_text: String,
    /// Count and timing.
    pub summary: ReportSummary,
    /// Replacements in ascending position order.
    pub replacements: Vec<Replacement>,
}

impl From<AnonymizationReport> for AnonymizeOutput {
    fn from(report: AnonymizationReport) -> Self {
        Self {
            summary: report.summary(),
            anonymized_text: report.anonymized_text,
            replacements: report.replacements,
        }
    }
}

/// A detectable category and its rules.
#[derive(Debug, Serialize)]
pub struct CategoryInfo {
    /// Canonical category name.
    pub category: String,
    /// Human-readable description.
    pub description: String,
    /// Rule summaries in scan order.
    pub rules: Vec<String>,
}

/// Detect PII in text.
#[derive(Args, Debug)]
pub struct DetectCommand {
    #[command(flatten)]
    pub input: InputArgs,
}

impl DetectCommand {
    /// Runs the command.
    pub fn run(self, ctx: &Context) -> Result<(), CliError> {
        let text = self.input.read()?;
        let engine = ctx.engine()?;
        let output = DetectionOutput::from(engine.detect(&text)?);

        if output.matches.is_empty() && ctx.format == OutputFormat::Table {
            if !ctx.quiet {
                success("No PII detected");
            }
            return Ok(());
        }

        print_output(&output, ctx.format)
    }
}

/// Replace PII with synthetic values.
#[derive(Args, Debug)]
pub struct AnonymizeCommand {
    #[command(flatten)]
    pub input: InputArgs,

    /// Write the anonymized text to this file
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Print a report in this format (json, yaml, text) instead of the text
    #[arg(long, short = 'r')]
    pub report: Option<ReportFormat>,

    /// Write the report to this file
    #[arg(long)]
    pub report_file: Option<PathBuf>,
}

impl AnonymizeCommand {
    /// Runs the command.
    pub fn run(self, ctx: &Context) -> Result<(), CliError> {
        let text = self.input.read()?;
        let mut engine = ctx.engine()?;
        let report = engine.anonymize_with_report(&text)?;

        if let Some(ref path) = self.output {
            std::fs::write(path, &report.anonymized_text).map_err(|e| {
                CliError::with_cause(
                    ErrorKind::Io,
                    format!("Failed to write file: {}", path.display()),
                    e,
                )
            })?;
        }

        if let Some(ref path) = self.report_file {
            report.export_to(path, self.report.unwrap_or_default())?;
        }

        if ctx.quiet {
            if self.output.is_none() {
                print!("{}", report.anonymized_text);
            }
            return Ok(());
        }

        match (self.report, &self.report_file) {
            (Some(format), None) => println!("{}", report.export(format)?.trim_end()),
            _ if self.output.is_some() => {}
            _ => {
                let found = report.count_found;
                print_output(&AnonymizeOutput::from(report), ctx.format)?;
                if ctx.format == OutputFormat::Table && found == 0 {
                    success("No PII found");
                }
                return Ok(());
            }
        }

        if let Some(ref path) = self.output {
            success(&format!(
                "Anonymized {} PII value(s) into {}",
                report.count_found,
                path.display()
            ));
        }
        if let Some(ref path) = self.report_file {
            success(&format!("Report written to {}", path.display()));
        }

        Ok(())
    }
}

/// Fails with the validation exit code when the input contains PII.
pub fn check(input: InputArgs, ctx: &Context) -> Result<(), CliError> {
    let text = input.read()?;
    let engine = ctx.engine()?;
    let output = DetectionOutput::from(engine.detect(&text)?);

    if output.matches.is_empty() {
        if !ctx.quiet {
            success("Text is clean - no PII detected");
        }
        return Ok(());
    }

    if !ctx.quiet {
        if let Some(rendered) = render_structured(&output, ctx.format)? {
            println!("{}", rendered.trim_end());
        } else {
            println!(
                "{} {} PII entities detected:",
                "Warning:".yellow().bold(),
                output.pii_found
            );
            for m in &output.matches {
                println!(
                    "  {} at position {}-{} (confidence: {:.2})",
                    m.category.to_string().yellow(),
                    m.start,
                    m.end,
                    m.confidence,
                );
            }
        }
    }

    Err(CliError::validation("PII detected in text"))
}

/// Lists the enabled categories with their rules.
pub fn types(ctx: &Context) -> Result<(), CliError> {
    let engine = ctx.engine()?;
    let catalog = engine.catalog();

    let infos: Vec<CategoryInfo> = catalog
        .categories()
        .into_iter()
        .map(|category| CategoryInfo {
            description: category.description().to_string(),
            rules: catalog
                .rules_for(&category)
                .iter()
                .map(|rule| {
                    let flags = if rule.spec().case_insensitive { ", i" } else { "" };
                    format!("{} ({:.2}{flags})", rule.name(), rule.confidence())
                })
                .collect(),
            category: category.to_string(),
        })
        .collect();

    if ctx.format != OutputFormat::Table {
        return print_list(&infos, ctx.format);
    }

    println!("{}", "Supported PII Types:".bold().underline());
    println!();
    for info in &infos {
        crate::output::TableDisplay::print_table(info);
        println!();
    }
    if let Some(backend) = engine.backend_name() {
        crate::output::info(&format!("Detection backend: {backend}"));
    }

    Ok(())
}
