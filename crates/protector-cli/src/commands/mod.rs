//! CLI command definitions and handlers.

mod batch;
mod config_cmd;
mod pii;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use protector_anonymize::{AnonymizationEngine, PiiCategory, ProtectorConfig};
use tracing::debug;

use crate::config::Settings;
use crate::output::{CliError, OutputFormat};

pub use batch::{BatchCommand, BatchEntry};
pub use config_cmd::ConfigCommands;
pub use pii::{AnonymizeCommand, AnonymizeOutput, CategoryInfo, DetectCommand, DetectionOutput, InputArgs};

/// Privacy Protector CLI
///
/// Detects personally identifiable information in text and replaces it with
/// realistic synthetic values.
#[derive(Parser)]
#[command(name = "protector")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Configuration profile to use
    #[arg(long, short = 'P', global = true, default_value = "default")]
    pub profile: String,

    /// Read engine settings from this TOML file instead of the profile
    #[arg(long, short = 'c', global = true, env = "PROTECTOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors and results
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub engine: EngineArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Detect PII in text
    #[command(alias = "scan")]
    Detect(DetectCommand),

    /// Replace PII with synthetic values
    #[command(alias = "anon")]
    Anonymize(AnonymizeCommand),

    /// Check that text is clean (exits non-zero when PII is found)
    Check(InputArgs),

    /// Anonymize several files with one engine
    Batch(BatchCommand),

    /// List supported PII categories and built-in rules
    Types,

    /// Manage configuration profiles
    #[command(alias = "cfg")]
    Config(ConfigCommands),
}

/// Engine overrides applied on top of the loaded configuration.
#[derive(Args, Debug, Default)]
pub struct EngineArgs {
    /// Locale for synthetic names and addresses (en_US, en_GB, de_DE, fr_FR)
    #[arg(long, global = true)]
    pub locale: Option<String>,

    /// Seed for reproducible replacements
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Only detect these categories (repeatable or comma-separated)
    #[arg(long = "type", global = true, value_delimiter = ',')]
    pub types: Vec<PiiCategory>,

    /// Draw a fresh replacement for every occurrence
    #[arg(long, global = true)]
    pub no_consistent: bool,

    /// Attach a registered detection backend (e.g. lexicon)
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Backend options as a JSON object
    #[arg(long, global = true, requires = "backend")]
    pub backend_options: Option<String>,

    /// Add a custom pattern as LABEL=REGEX
    #[arg(long = "pattern", global = true)]
    pub patterns: Vec<String>,
}

impl EngineArgs {
    /// Applies the overrides to `config`.
    pub fn apply(&self, config: &mut ProtectorConfig) -> Result<(), CliError> {
        if let Some(ref locale) = self.locale {
            config.locale = locale.clone();
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if !self.types.is_empty() {
            config.enabled_categories = self.types.clone();
        }
        if self.no_consistent {
            config.consistent_replacements = false;
        }
        if let Some(ref backend) = self.backend {
            let options = match self.backend_options {
                Some(ref raw) => serde_json::from_str(raw).map_err(|e| {
                    CliError::with_cause(
                        crate::output::ErrorKind::Validation,
                        "--backend-options is not valid JSON",
                        e,
                    )
                })?,
                None => config.backend_options.take(),
            };
            config.use_external_backend = true;
            config.backend_selector = Some(backend.clone());
            config.backend_options = options;
        }
        for raw in &self.patterns {
            let (label, pattern) = raw.split_once('=').ok_or_else(|| {
                CliError::validation(format!("Invalid pattern '{raw}', expected LABEL=REGEX"))
            })?;
            config.custom_patterns.push(protector_anonymize::CustomPattern {
                label: label.trim().to_string(),
                pattern: pattern.to_string(),
                confidence: 0.8,
            });
        }
        Ok(())
    }
}

/// Shared state for command handlers.
#[derive(Debug)]
pub struct Context {
    /// Effective engine configuration.
    pub settings: ProtectorConfig,
    /// Selected output format.
    pub format: OutputFormat,
    /// Suppress informational output.
    pub quiet: bool,
}

impl Context {
    /// Builds an engine from the effective configuration.
    pub fn engine(&self) -> Result<AnonymizationEngine, CliError> {
        Ok(AnonymizationEngine::new(self.settings.clone())?)
    }
}

impl Cli {
    /// Runs the CLI command.
    pub fn run(self) -> Result<(), CliError> {
        if self.no_color {
            colored::control::set_override(false);
        }

        let Cli {
            format,
            profile,
            config,
            quiet,
            engine,
            command,
            ..
        } = self;

        let source = Settings::new(&profile, config)?;
        let context = || -> Result<Context, CliError> {
            let mut settings = source.load()?;
            engine.apply(&mut settings)?;
            debug!(%profile, locale = %settings.locale, seed = ?settings.seed, "Resolved configuration");
            Ok(Context {
                settings,
                format,
                quiet,
            })
        };

        match command {
            Commands::Detect(cmd) => cmd.run(&context()?),
            Commands::Anonymize(cmd) => cmd.run(&context()?),
            Commands::Check(input) => pii::check(input, &context()?),
            Commands::Batch(cmd) => cmd.run(&context()?),
            Commands::Types => pii::types(&context()?),
            Commands::Config(cmd) => cmd.run(&source, &engine, format),
        }
    }
}
