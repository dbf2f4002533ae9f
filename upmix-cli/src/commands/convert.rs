// upmix-cli/src/commands/convert.rs
//
// `upmix convert`: probe, plan and run the upmix through ffmpeg.

use crate::cli::ConvertArgs;
use crate::config::resolve_config;
use crate::error::{CliErrorContext, CliResult};
use crate::output;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::time::{Duration, Instant};
use upmix_core::external::{SidecarSpawner, check_dependency};
use upmix_core::{CoreError, format_duration, plan_upmix, probe_media, run_upmix};

fn upmix_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner} Upmixing: {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

pub fn run_convert(args: ConvertArgs) -> CliResult<()> {
    let start_time = Instant::now();

    if !args.input_path.is_file() {
        return Err(CoreError::PathError(format!(
            "Invalid input path '{}'",
            args.input_path.display()
        )));
    }
    if args.input_path == args.output_path {
        return Err(CoreError::PathError(
            "Output path must differ from the input path".to_string(),
        ));
    }

    let config = resolve_config(&args.options)?;
    check_dependency("ffprobe")?;
    let media = probe_media(&args.input_path)
        .cli_with_context(|| format!("Failed to probe {}", args.input_path.display()))?;

    let decision = plan_upmix(&media, &config);
    output::print_decision(&args.input_path.display().to_string(), &decision);

    if !decision.should_process {
        info!("Nothing to do for {}", args.input_path.display());
        return Ok(());
    }

    if args.dry_run {
        println!(
            "{}",
            output::dry_run_invocation(&args.input_path, &args.output_path, &decision)
        );
        return Ok(());
    }

    check_dependency("ffmpeg")?;

    let spinner = upmix_spinner();
    let result = run_upmix(
        &SidecarSpawner,
        &args.input_path,
        &args.output_path,
        &decision.command_args,
        media.duration_secs,
        |progress| {
            spinner.set_message(format!(
                "{:.1}% ({} / {}, {:.2}x)",
                progress.percent,
                format_duration(progress.elapsed_secs),
                media.duration_secs.map_or_else(|| "??:??:??".to_string(), format_duration),
                progress.speed
            ));
        },
    );
    spinner.finish_and_clear();
    result?;

    info!(
        "Wrote {} in {}",
        args.output_path.display(),
        format_duration(start_time.elapsed().as_secs_f64())
    );
    Ok(())
}
