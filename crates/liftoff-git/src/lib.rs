//! liftoff Git - Tag resolution for release publishing
//!
//! This crate answers "is the current commit a release tag?", either from
//! the ref the pipeline checked out or by asking the repository directly.

mod remote;
mod repository;
mod resolver;
mod tags;
pub mod types;

pub use remote::git_fetch_tags;
pub use repository::{GitRepo, Result};
pub use resolver::{QueryTagResolver, RefTagResolver};
pub use tags::pick_release_tag;
pub use types::TagInfo;
