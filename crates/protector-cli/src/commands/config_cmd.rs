//! Configuration management commands.

use clap::{Args, Subcommand};
use colored::Colorize;

use crate::config::{render_toml, Settings};
use crate::output::{info, render_structured, success, CliError, OutputFormat};

use super::EngineArgs;

/// Configuration management commands.
#[derive(Args, Debug)]
pub struct ConfigCommands {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Show the effective configuration (file, environment and flags)
    Show,

    /// Print the configuration file path
    Path,

    /// Write a configuration file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl ConfigCommands {
    /// Runs the config command.
    pub fn run(
        self,
        source: &Settings,
        overrides: &EngineArgs,
        format: OutputFormat,
    ) -> Result<(), CliError> {
        match self.command {
            ConfigSubcommand::Show => {
                let mut config = source.load()?;
                overrides.apply(&mut config)?;
                config.validate()?;

                if let Some(rendered) = render_structured(&config, format)? {
                    println!("{}", rendered.trim_end());
                    return Ok(());
                }

                let state = if source.exists() { "" } else { " (not created)" };
                println!(
                    "{}: {}{}",
                    format!("Profile '{}'", source.profile()).bold(),
                    source.path().display(),
                    state.dimmed()
                );
                println!();
                print!("{}", render_toml(&config)?);
            }

            ConfigSubcommand::Path => {
                println!("{}", source.path().display());
            }

            ConfigSubcommand::Init { force } => {
                let path = source.init(force)?;
                success(&format!("Configuration written to {}", path.display()));
                info("Edit the file or override settings with PROTECTOR_* variables");
            }
        }

        Ok(())
    }
}
