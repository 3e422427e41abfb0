//! Render command

use std::path::PathBuf;

use clap::Args;
use tracing::info;

use liftoff_core::template::render_file;

use crate::cli::Cli;

use super::args::VariablesArgs;

/// Render a release body template to stdout
#[derive(Debug, Args)]
pub struct RenderCommand {
    /// Mustache template file
    #[arg(long, env = "INPUT_TEMPLATE")]
    pub template: Option<PathBuf>,

    #[command(flatten)]
    pub variables: VariablesArgs,

    /// Write the body to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl RenderCommand {
    /// Execute the render command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let cwd = std::env::current_dir()?;
        let (config, _) = cli.load_config(&cwd)?;

        let template = self
            .template
            .clone()
            .filter(|p| !p.as_os_str().is_empty())
            .or(config.release.template)
            .ok_or_else(|| {
                anyhow::anyhow!("a template is required (--template or release.template)")
            })?;
        info!(template = %template.display(), "executing render command");

        let variables = self.variables.load()?;
        let body = render_file(&template, &variables)?;

        if let Some(ref output_path) = self.output {
            std::fs::write(output_path, &body)?;
            if !cli.quiet {
                println!("Body written to {}", output_path.display());
            }
        } else {
            print!("{}", body);
        }

        Ok(())
    }
}
