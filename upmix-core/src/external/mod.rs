// ============================================================================
// upmix-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: ffprobe and ffmpeg
//
// The decision engine is pure; everything that touches a process lives here.
// ffprobe produces the stream inventory and ffmpeg executes a planned upmix.

use crate::error::{CoreError, CoreResult};

use std::io;
use std::process::{Command, Stdio};

/// Running planned upmixes through ffmpeg
pub mod ffmpeg_executor;

/// Stream inventory extraction through ffprobe
pub mod ffprobe_executor;

pub use ffmpeg_executor::{
    FfmpegProcess, FfmpegSpawner, SidecarProcess, SidecarSpawner, UpmixProgress,
    build_upmix_command, run_upmix,
};
pub use ffprobe_executor::{CommandFfprobeExecutor, FfprobeExecutor, probe_media};

/// Checks that `cmd_name` can be executed by running it with `-version`.
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{cmd_name}': {e}");
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}
