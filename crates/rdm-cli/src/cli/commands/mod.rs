//! CLI command handlers, one file per command.

mod run;
mod status;

pub use run::run_pipeline;
pub use status::run_status;
