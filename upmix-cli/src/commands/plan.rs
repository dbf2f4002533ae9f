// upmix-cli/src/commands/plan.rs
//
// `upmix plan`: print the decision for one file without touching it.

use crate::cli::PlanArgs;
use crate::config::resolve_config;
use crate::error::{CliErrorContext, CliResult};
use crate::output;
use std::fs;
use upmix_core::{CoreError, MediaFile, plan_upmix, probe_media};

/// Container assumed for `--probe-json` input without `--container`.
pub const DEFAULT_PROBE_CONTAINER: &str = "mkv";

/// Loads the media description from a saved probe or by running ffprobe.
pub fn load_media(args: &PlanArgs) -> CliResult<(String, MediaFile)> {
    if let Some(probe_path) = &args.probe_json {
        let json = fs::read_to_string(probe_path)
            .cli_with_context(|| format!("Failed to read probe file {}", probe_path.display()))?;
        let container = args.container.as_deref().unwrap_or(DEFAULT_PROBE_CONTAINER);
        let media = MediaFile::from_ffprobe_json(&json, container)
            .cli_with_context(|| format!("Invalid probe file {}", probe_path.display()))?;
        return Ok((probe_path.display().to_string(), media));
    }

    let input = args
        .input_path
        .as_ref()
        .cli_context("Either --input or --probe-json is required")?;
    if !input.is_file() {
        return Err(CoreError::PathError(format!(
            "Invalid input path '{}'",
            input.display()
        )));
    }
    let media =
        probe_media(input).cli_with_context(|| format!("Failed to probe {}", input.display()))?;
    Ok((input.display().to_string(), media))
}

pub fn run_plan(args: PlanArgs) -> CliResult<()> {
    let config = resolve_config(&args.options)?;
    let (source, media) = load_media(&args)?;
    let decision = plan_upmix(&media, &config);

    if args.json {
        let json = serde_json::to_string_pretty(&decision).map_err(|e| {
            CoreError::OperationFailed(format!("Failed to serialize decision: {e}"))
        })?;
        println!("{json}");
    } else {
        output::print_decision(&source, &decision);
    }
    Ok(())
}
