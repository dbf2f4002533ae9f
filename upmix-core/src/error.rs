//! Error types for the upmix-core library.
//!
//! The decision engine itself never fails: malformed option values and probe
//! fields degrade to documented defaults. Errors only arise at the edges,
//! when parsing probe documents or options files, and when running the
//! external ffprobe/ffmpeg tools.

use std::process::ExitStatus;
use thiserror::Error;

/// Errors produced by upmix-core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path error: {0}")]
    PathError(String),

    #[error("Failed to parse probe output: {0}")]
    ProbeParse(String),

    #[error("Invalid probe document: {0}")]
    InvalidProbe(String),

    #[error("Failed to parse options file: {0}")]
    OptionsParse(String),

    #[error("Required external command not found: {0}")]
    DependencyNotFound(String),

    #[error("Failed to start {0}: {1}")]
    CommandStart(String, std::io::Error),

    #[error("Failed while waiting for {0}: {1}")]
    CommandWait(String, std::io::Error),

    #[error("{tool} exited with {status}: {stderr}")]
    CommandFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{0}")]
    OperationFailed(String),
}

/// Result alias used throughout upmix-core.
pub type CoreResult<T> = Result<T, CoreError>;

/// Builds a [`CoreError::CommandStart`] for a tool that could not be spawned.
pub fn command_start_error(tool: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandStart(tool.into(), err)
}

/// Builds a [`CoreError::CommandWait`] for a tool whose exit status could not be collected.
pub fn command_wait_error(tool: impl Into<String>, err: std::io::Error) -> CoreError {
    CoreError::CommandWait(tool.into(), err)
}

/// Builds a [`CoreError::CommandFailed`] for a tool that exited unsuccessfully.
pub fn command_failed_error(
    tool: impl Into<String>,
    status: ExitStatus,
    stderr: impl Into<String>,
) -> CoreError {
    CoreError::CommandFailed {
        tool: tool.into(),
        status,
        stderr: stderr.into(),
    }
}
