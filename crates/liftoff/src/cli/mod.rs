//! CLI definition and command handling

pub mod commands;
pub mod context;
pub mod output;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use liftoff_core::config::{resolve_config, Config};
use liftoff_core::LiftoffError;

use commands::{CompletionsCommand, ReleaseCommand, RenderCommand, TagCommand};

/// liftoff - Publish a GitHub release when a build is tagged
#[derive(Debug, Parser)]
#[command(name = "liftoff")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,

    /// Configuration file (default: search upward for liftoff.toml/.yaml)
    #[arg(long, global = true, env = "LIFTOFF_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output
    Json,
    /// GitHub Actions workflow commands
    Github,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a release for the tagged commit and upload its assets
    Release(ReleaseCommand),

    /// Render a release body template to stdout
    Render(RenderCommand),

    /// Print the tag of the current commit
    Tag(TagCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}

impl Cli {
    /// Console log level implied by the verbosity flags
    pub fn console_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    /// Load the configuration file, if any
    pub fn load_config(&self, cwd: &Path) -> Result<(Config, Option<PathBuf>), LiftoffError> {
        resolve_config(self.config.as_deref(), cwd)
    }

    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        // Change to specified directory if provided
        if let Some(dir) = &self.directory {
            std::env::set_current_dir(dir)?;
        }

        match self.command {
            Commands::Release(ref cmd) => cmd.execute(&self),
            Commands::Render(ref cmd) => cmd.execute(&self),
            Commands::Tag(ref cmd) => cmd.execute(&self),
            Commands::Completions(ref cmd) => cmd.execute(&self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_console_level() {
        let cli = Cli::parse_from(["liftoff", "-v", "tag"]);
        assert_eq!(cli.console_level(), "debug");
        let cli = Cli::parse_from(["liftoff", "tag", "--quiet"]);
        assert_eq!(cli.console_level(), "error");
        let cli = Cli::parse_from(["liftoff", "--format", "github", "tag"]);
        assert_eq!(cli.console_level(), "info");
        assert_eq!(cli.format, OutputFormat::Github);
    }
}
