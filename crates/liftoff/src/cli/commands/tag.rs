//! Tag command

use clap::Args;
use tracing::info;

use liftoff_core::outputs::GithubOutputFile;
use liftoff_core::traits::OutputSink;

use crate::cli::context::RunContext;
use crate::cli::{Cli, OutputFormat};

use super::args::TagArgs;

/// Print the tag of the current commit
#[derive(Debug, Args)]
pub struct TagCommand {
    #[command(flatten)]
    pub tag: TagArgs,
}

impl TagCommand {
    /// Execute the tag command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(strategy = ?self.tag.tag_strategy, "executing tag command");
        let cwd = std::env::current_dir()?;
        let (config, _) = cli.load_config(&cwd)?;
        let ctx = RunContext::from_env();

        let resolver = self.tag.resolver(&config, &ctx, &cwd);
        let tag = resolver.resolve()?;

        match cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "tag": tag }));
            }
            OutputFormat::Github => {
                if let (Some(tag), Some(sink)) = (&tag, GithubOutputFile::from_env()) {
                    sink.set_output("tag", tag)?;
                }
                if let Some(tag) = &tag {
                    println!("{}", tag);
                }
            }
            OutputFormat::Text => {
                if let Some(tag) = &tag {
                    println!("{}", tag);
                }
            }
        }

        Ok(())
    }
}
