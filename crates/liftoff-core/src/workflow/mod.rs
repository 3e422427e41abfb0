//! Workflow orchestration for liftoff

mod release;
mod upload;

pub use release::*;
pub use upload::*;
