// ============================================================================
// upmix-core/src/external/ffmpeg_executor.rs
// ============================================================================
//
// FFMPEG EXECUTOR: Running a planned upmix
//
// Spawning goes through the FfmpegSpawner/FfmpegProcess traits so the run
// loop can be driven by a scripted process in tests. The concrete spawner
// uses ffmpeg-sidecar.

use crate::error::{
    CoreError, CoreResult, command_failed_error, command_start_error, command_wait_error,
};
use crate::utils::parse_ffmpeg_time;
use ffmpeg_sidecar::child::FfmpegChild as SidecarChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel as FfmpegLogLevel};
use std::path::Path;
use std::process::ExitStatus;

// --- FFmpeg Execution Abstraction ---

/// An active ffmpeg process.
pub trait FfmpegProcess {
    /// Feeds every event of the running command to `handler`.
    fn handle_events<F>(&mut self, handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>;

    fn wait(&mut self) -> CoreResult<ExitStatus>;
}

/// Something that can spawn an [`FfmpegProcess`].
pub trait FfmpegSpawner {
    type Process: FfmpegProcess;
    fn spawn(&self, cmd: FfmpegCommand) -> CoreResult<Self::Process>;
}

// --- Concrete Implementation using ffmpeg-sidecar ---

pub struct SidecarProcess(SidecarChild);

impl FfmpegProcess for SidecarProcess {
    fn handle_events<F>(&mut self, mut handler: F) -> CoreResult<()>
    where
        F: FnMut(FfmpegEvent) -> CoreResult<()>,
    {
        let iterator = self.0.iter().map_err(|e| {
            log::error!("Failed to get ffmpeg event iterator: {e}");
            events_unavailable(e)
        })?;
        for event in iterator {
            handler(event)?;
        }
        Ok(())
    }

    fn wait(&mut self) -> CoreResult<ExitStatus> {
        self.0.wait().map_err(|e| command_wait_error("ffmpeg", e))
    }
}

/// The child started but its output could not be read; there is no exit
/// status to report yet.
fn events_unavailable(err: impl std::fmt::Display) -> CoreError {
    CoreError::OperationFailed(format!("Failed to read ffmpeg events: {err}"))
}

#[derive(Debug, Clone, Default)]
pub struct SidecarSpawner;

impl FfmpegSpawner for SidecarSpawner {
    type Process = SidecarProcess;

    fn spawn(&self, mut cmd: FfmpegCommand) -> CoreResult<Self::Process> {
        cmd.spawn()
            .map(SidecarProcess)
            .map_err(|e| command_start_error("ffmpeg", e))
    }
}

// --- Upmix run ---

/// Progress snapshot reported while an upmix runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpmixProgress {
    /// 0-100, or 0 when the input duration is unknown.
    pub percent: f64,
    pub elapsed_secs: f64,
    pub speed: f32,
}

/// Percentage of `duration_secs` covered by the ffmpeg time stamp `time`.
#[must_use]
pub fn progress_percent(time: &str, duration_secs: Option<f64>) -> f64 {
    let current = parse_ffmpeg_time(time).unwrap_or(0.0);
    duration_secs
        .filter(|&d| d > 0.0)
        .map_or(0.0, |d| (current / d * 100.0).min(100.0))
}

/// Builds the ffmpeg invocation applying `output_args` to `input`.
#[must_use]
pub fn build_upmix_command(input: &Path, output: &Path, output_args: &[String]) -> FfmpegCommand {
    let mut cmd = FfmpegCommand::new();
    cmd.arg("-y");
    cmd.input(input.to_string_lossy().as_ref());
    cmd.args(output_args);
    cmd.output(output.to_string_lossy().as_ref());
    cmd
}

/// Runs the upmix and waits for ffmpeg to finish.
///
/// Error output is collected and returned in [`crate::CoreError::CommandFailed`]
/// when ffmpeg exits unsuccessfully.
pub fn run_upmix<S, F>(
    spawner: &S,
    input: &Path,
    output: &Path,
    output_args: &[String],
    duration_secs: Option<f64>,
    mut on_progress: F,
) -> CoreResult<()>
where
    S: FfmpegSpawner,
    F: FnMut(UpmixProgress),
{
    let cmd = build_upmix_command(input, output, output_args);
    log::debug!("Running upmix command: {cmd:?}");

    let mut process = spawner.spawn(cmd)?;
    let mut stderr_buffer = String::new();

    process.handle_events(|event| {
        match event {
            FfmpegEvent::Progress(progress) => {
                on_progress(UpmixProgress {
                    percent: progress_percent(&progress.time, duration_secs),
                    elapsed_secs: parse_ffmpeg_time(&progress.time).unwrap_or(0.0),
                    speed: progress.speed,
                });
            }
            FfmpegEvent::Log(FfmpegLogLevel::Fatal | FfmpegLogLevel::Error, message) => {
                log::debug!(target: "ffmpeg_log", "{message}");
                stderr_buffer.push_str(&message);
                stderr_buffer.push('\n');
            }
            FfmpegEvent::Log(_, message) => log::trace!(target: "ffmpeg_log", "{message}"),
            FfmpegEvent::Error(error) => {
                log::debug!("ffmpeg error: {error}");
                stderr_buffer.push_str(&error);
                stderr_buffer.push('\n');
            }
            _ => {}
        }
        Ok(())
    })?;

    let status = process.wait()?;
    if !status.success() {
        log::error!("ffmpeg upmix of {} failed: {status}", input.display());
        return Err(command_failed_error(
            "ffmpeg",
            status,
            stderr_buffer.trim_end().to_string(),
        ));
    }

    log::info!("Upmixed {} -> {}", input.display(), output.display());
    Ok(())
}
