//! Batch file anonymization.

use std::path::{Path, PathBuf};

use clap::Args;
use serde::Serialize;
use tracing::debug;

use crate::output::{info, print_list, warn, CliError, OutputFormat};

use super::Context;

/// Anonymize several files with one engine.
#[derive(Args, Debug)]
pub struct BatchCommand {
    /// Files to anonymize
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Suffix inserted before the file extension of each output
    #[arg(long, short, default_value = "anonymized")]
    pub suffix: String,

    /// Write outputs to this directory instead of next to each input
    #[arg(long, short = 'd')]
    pub output_dir: Option<PathBuf>,
}

/// Outcome for one input file.
#[derive(Debug, Serialize)]
pub struct BatchEntry {
    /// Input path.
    pub input: String,
    /// Output path, when written.
    pub output: Option<String>,
    /// Number of replaced values.
    pub pii_found: usize,
    /// Failure description.
    pub error: Option<String>,
}

/// Returns `<dir>/<stem>.<suffix>[.<ext>]` for an input path.
pub fn output_path(input: &Path, suffix: &str, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let name = match input.extension() {
        Some(ext) => format!("{stem}.{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}.{suffix}"),
    };

    match output_dir.or_else(|| input.parent()) {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

impl BatchCommand {
    /// Runs the command.
    pub fn run(self, ctx: &Context) -> Result<(), CliError> {
        if let Some(ref dir) = self.output_dir {
            std::fs::create_dir_all(dir).map_err(|e| {
                CliError::with_cause(
                    crate::output::ErrorKind::Io,
                    format!("Failed to create directory: {}", dir.display()),
                    e,
                )
            })?;
        }

        let mut engine = ctx.engine()?;
        let mut entries = Vec::with_capacity(self.files.len());
        let mut first_error: Option<CliError> = None;

        for input in &self.files {
            let output = output_path(input, &self.suffix, self.output_dir.as_deref());
            let entry = match engine.process_file(input, Some(output.as_path())) {
                Ok(report) => {
                    debug!(input = %input.display(), pii_found = report.count_found, "Anonymized file");
                    BatchEntry {
                        input: input.display().to_string(),
                        output: Some(output.display().to_string()),
                        pii_found: report.count_found,
                        error: None,
                    }
                }
                Err(e) => {
                    if !ctx.quiet {
                        warn(&format!("Skipping {}: {e}", input.display()));
                    }
                    let entry = BatchEntry {
                        input: input.display().to_string(),
                        output: None,
                        pii_found: 0,
                        error: Some(e.to_string()),
                    };
                    first_error.get_or_insert_with(|| CliError::from(e));
                    entry
                }
            };
            entries.push(entry);
        }

        if !ctx.quiet {
            print_list(&entries, ctx.format)?;
            if ctx.format == OutputFormat::Table {
                let replaced: usize = entries.iter().map(|e| e.pii_found).sum();
                println!();
                info(&format!(
                    "Processed {} file(s), replaced {} value(s), {} distinct replacement(s) cached",
                    entries.len(),
                    replaced,
                    engine.generator().cache_len()
                ));
            }
        }

        match first_error {
            Some(first) => {
                let failed = entries.iter().filter(|e| e.error.is_some()).count();
                Err(CliError::with_cause(
                    first.kind,
                    format!("{failed} of {} file(s) failed", entries.len()),
                    first,
                ))
            }
            None => Ok(()),
        }
    }
}
