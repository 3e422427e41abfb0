//! CLI commands

mod args;
mod completions;
mod release;
mod render;
mod tag;

pub use completions::CompletionsCommand;
pub use release::ReleaseCommand;
pub use render::RenderCommand;
pub use tag::TagCommand;
