//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// `upmix convert`: probe, plan and run ffmpeg.
pub mod convert;

/// `upmix plan`: print the decision only.
pub mod plan;
