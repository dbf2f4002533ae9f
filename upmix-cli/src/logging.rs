// ============================================================================
// upmix-cli/src/logging.rs
// ============================================================================
//
// LOGGING: fern-based logger setup for the upmix CLI
//
// Console output goes to stderr at info (debug with --verbose) so stdout
// stays clean for plans and JSON. An optional log file receives debug and
// above with timestamps.

use crate::error::{CliErrorContext, CliResult};
use log::LevelFilter;
use std::path::Path;
use upmix_core::CoreError;

/// Console level for the given verbosity.
#[must_use]
pub fn console_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> CliResult<()> {
    let console = fern::Dispatch::new()
        .level(console_level(verbose))
        .format(|out, message, record| {
            if record.level() <= log::Level::Warn {
                out.finish(format_args!("{}: {}", record.level(), message));
            } else {
                out.finish(format_args!("{message}"));
            }
        })
        .chain(std::io::stderr());

    let mut dispatch = fern::Dispatch::new()
        .level(LevelFilter::Debug)
        .chain(console);

    if let Some(path) = log_file {
        let file = fern::log_file(path)
            .cli_with_context(|| format!("Failed to open log file {}", path.display()))?;
        dispatch = dispatch.chain(
            fern::Dispatch::new()
                .level(LevelFilter::Debug)
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{} [{}] {}: {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                        record.level(),
                        record.target(),
                        message
                    ));
                })
                .chain(file),
        );
    }

    dispatch
        .apply()
        .map_err(|e| CoreError::OperationFailed(format!("Failed to initialize logging: {e}")))
}
