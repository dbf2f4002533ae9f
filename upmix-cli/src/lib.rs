// upmix-cli/src/lib.rs
//
// Library portion of the upmix CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, ConvertArgs, OptionArgs, PlanArgs};
pub use commands::convert::run_convert;
pub use commands::plan::run_plan;
