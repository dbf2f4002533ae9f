//! ffprobe integration for stream inventory extraction.
//!
//! The probe document is requested as JSON (`-show_format -show_streams`) and
//! parsed by [`MediaFile::from_ffprobe_json`], which keeps every stream tag
//! and disposition flag.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{CoreResult, command_failed_error, command_start_error};
use crate::media::MediaFile;
use crate::utils::container_from_path;

/// Trait for producing a [`MediaFile`] from a path on disk.
pub trait FfprobeExecutor {
    fn probe(&self, input_path: &Path) -> CoreResult<MediaFile>;
}

/// [`FfprobeExecutor`] that runs the ffprobe binary.
#[derive(Debug, Clone)]
pub struct CommandFfprobeExecutor {
    binary: PathBuf,
}

impl Default for CommandFfprobeExecutor {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ffprobe"),
        }
    }
}

impl CommandFfprobeExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `binary` instead of the `ffprobe` found on `PATH`.
    #[must_use]
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn tool_name(&self) -> String {
        self.binary.display().to_string()
    }
}

impl FfprobeExecutor for CommandFfprobeExecutor {
    fn probe(&self, input_path: &Path) -> CoreResult<MediaFile> {
        let container = container_from_path(input_path)?;
        log::debug!(
            "Running {} for stream inventory on: {}",
            self.tool_name(),
            input_path.display()
        );

        let output = Command::new(&self.binary)
            .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
            .arg(input_path)
            .output()
            .map_err(|e| command_start_error(self.tool_name(), e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            log::error!(
                "ffprobe failed on {}: {} {}",
                input_path.display(),
                output.status,
                stderr
            );
            return Err(command_failed_error(self.tool_name(), output.status, stderr));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        let media = MediaFile::from_ffprobe_json(&json, &container)?;
        log::debug!(
            "Probed {}: {:?}, {} streams ({} audio)",
            input_path.display(),
            media.file_medium,
            media.streams.len(),
            media.audio_stream_count()
        );
        Ok(media)
    }
}

/// Probes `input_path` with the ffprobe found on `PATH`.
pub fn probe_media(input_path: &Path) -> CoreResult<MediaFile> {
    CommandFfprobeExecutor::new().probe(input_path)
}
