//! Upmix decision entry point.
//!
//! [`plan_upmix`] is a pure function of the probed media file and the
//! normalized configuration. Calling it twice with the same inputs yields
//! identical results; it performs no I/O.

use serde::Serialize;

use crate::config::{AlgorithmMode, BitratePolicy, ConversionConfig};
use crate::media::{FileMedium, MediaFile};
use crate::processing::audio::{SkipReason, StreamClassification, classify_streams};
use crate::processing::command::{CommandFragment, assemble_command};
use crate::processing::filter_graph::build_filter_graph;
use crate::processing::output_plan::compose_output_plan;

/// Diagnostic emitted when no audio stream qualifies.
pub const NOTHING_TO_CONVERT: &str = "Nothing to convert: no qualifying mono tracks";

/// Execution flags handed through to the transcoding host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutionMode {
    /// The fragment is an ffmpeg filter-based transcode.
    pub ffmpeg_mode: bool,
    pub handbrake_mode: bool,
    /// Whether the host should queue the file again afterwards.
    pub requeue_after: bool,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        Self {
            ffmpeg_mode: true,
            handbrake_mode: false,
            requeue_after: false,
        }
    }
}

/// Outcome of planning one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionResult {
    pub should_process: bool,
    /// Output arguments to append to the transcode preset; empty when nothing is processed.
    pub command_fragment: String,
    /// The same command as an unquoted argument vector.
    pub command_args: Vec<String>,
    /// Human-readable decision log, in order.
    pub diagnostics: Vec<String>,
    /// Input container extension with a leading dot.
    pub container: String,
    pub execution: ExecutionMode,
}

impl DecisionResult {
    fn nothing_to_do(media: &MediaFile, diagnostics: Vec<String>) -> Self {
        Self {
            should_process: false,
            command_fragment: String::new(),
            command_args: Vec::new(),
            diagnostics,
            container: format!(".{}", media.container),
            execution: ExecutionMode::default(),
        }
    }

    /// Host preset form: `", <fragment>"`, or empty when nothing is processed.
    #[must_use]
    pub fn preset(&self) -> String {
        if self.command_fragment.is_empty() {
            String::new()
        } else {
            format!(", {}", self.command_fragment)
        }
    }
}

/// Decides which mono tracks of `media` to upmix and derives the command.
#[must_use]
pub fn plan_upmix(media: &MediaFile, config: &ConversionConfig) -> DecisionResult {
    if media.file_medium != FileMedium::Video {
        log::info!("Skipping upmix: file is not video ({:?})", media.file_medium);
        return DecisionResult::nothing_to_do(media, vec!["File is not video".to_string()]);
    }

    let mut diagnostics = vec![config.summary()];

    let classification = classify_streams(&media.streams, config);
    diagnostics.extend(stream_diagnostics(&classification));

    let qualifying_count = classification.qualifying_count();
    if qualifying_count == 0 {
        log::info!("No mono audio tracks qualify for upmix");
        diagnostics.push(NOTHING_TO_CONVERT.to_string());
        return DecisionResult::nothing_to_do(media, diagnostics);
    }

    let segments = build_filter_graph(classification.qualifying(), config);
    let plan = compose_output_plan(&classification, config);
    let fragment: CommandFragment = assemble_command(&segments, &plan);

    diagnostics.extend(summary_diagnostics(qualifying_count, config));

    log::info!(
        "Upmixing {} mono track(s) to stereo ({} mode, originals {})",
        qualifying_count,
        config.algorithm_mode,
        if config.remove_original { "removed" } else { "kept" }
    );
    log::debug!("Command fragment: {fragment}");

    DecisionResult {
        should_process: true,
        command_fragment: fragment.to_string(),
        command_args: fragment.to_args(),
        diagnostics,
        container: format!(".{}", media.container),
        execution: ExecutionMode::default(),
    }
}

fn stream_diagnostics(classification: &StreamClassification) -> Vec<String> {
    classification
        .audio_streams
        .iter()
        .map(|stream| match stream.skip_reason {
            None => {
                let mut line = format!(
                    "Will convert: audio track {} ({}, {} language",
                    stream.absolute_index,
                    stream.codec,
                    if stream.language.is_empty() {
                        "unknown"
                    } else {
                        &stream.language
                    }
                );
                if stream.bitrate_kbps > 0 {
                    line.push_str(&format!(", {}k", stream.bitrate_kbps));
                }
                if !stream.title.is_empty() {
                    line.push_str(&format!(", \"{}\"", stream.title));
                }
                line.push(')');
                line
            }
            Some(reason @ SkipReason::NotMono { .. }) => {
                format!("Skipping: audio track {} - {}", stream.absolute_index, reason)
            }
            Some(reason) => {
                format!("Skipping: mono track {} - {}", stream.absolute_index, reason)
            }
        })
        .collect()
}

fn summary_diagnostics(qualifying_count: usize, config: &ConversionConfig) -> Vec<String> {
    let mut lines = vec![format!(
        "Will convert {qualifying_count} mono track(s) to stereo"
    )];
    lines.push(if config.remove_original {
        "Original mono tracks will be removed".to_string()
    } else {
        "Original mono tracks will be kept".to_string()
    });
    if config.algorithm_mode == AlgorithmMode::Quality {
        lines.push(format!(
            "Using enhancement level: {}",
            config.enhancement_amount
        ));
    }
    lines.push(match config.bitrate_policy {
        BitratePolicy::KeepOriginal => "Using original bitrates where available".to_string(),
        BitratePolicy::Fixed(kbps) => format!("Using bitrate: {kbps}k"),
    });
    lines.push(match config.algorithm_mode {
        AlgorithmMode::Quality => "Using quality-optimized upmixing algorithm".to_string(),
        AlgorithmMode::Speed => "Using speed-optimized upmixing algorithm".to_string(),
    });
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfigBuilder;
    use crate::media::StreamProbe;

    fn media(streams: Vec<StreamProbe>) -> MediaFile {
        MediaFile::new("mkv", streams)
    }

    #[test]
    fn test_non_video_short_circuits() {
        let file = media(vec![StreamProbe::audio("aac", 1)]);
        let result = plan_upmix(&file, &ConversionConfig::default());
        assert!(!result.should_process);
        assert!(result.command_fragment.is_empty());
        assert_eq!(result.diagnostics, ["File is not video"]);
        assert_eq!(result.container, ".mkv");
    }

    #[test]
    fn test_nothing_to_convert() {
        let file = media(vec![StreamProbe::video("h264"), StreamProbe::audio("aac", 2)]);
        let result = plan_upmix(&file, &ConversionConfig::default());
        assert!(!result.should_process);
        assert_eq!(result.command_fragment, "");
        assert_eq!(result.preset(), "");
        assert!(result.command_args.is_empty());
        assert!(
            result
                .diagnostics
                .iter()
                .any(|line| line.to_lowercase().contains("nothing to convert"))
        );
        assert!(
            result
                .diagnostics
                .iter()
                .any(|line| line == "Skipping: audio track 1 - already has 2 channels")
        );
    }

    #[test]
    fn test_diagnostics_for_selected_and_filtered_streams() {
        let file = media(vec![
            StreamProbe::video("h264"),
            StreamProbe::audio("aac", 1)
                .with_bit_rate(64_000)
                .with_tag("language", "eng")
                .with_tag("title", "Commentary"),
            StreamProbe::audio("ac3", 1),
        ]);
        let config = ConversionConfigBuilder::new().codecs(["aac"]).build();
        let result = plan_upmix(&file, &config);
        assert!(result.should_process);
        assert_eq!(
            result.diagnostics[0],
            "Parameters: Codecs=aac, Enhancement=1.7, Bitrate=Keep Original, Remove Original=true, Languages=all, Upmix Mode=Quality"
        );
        assert_eq!(
            result.diagnostics[1],
            "Will convert: audio track 1 (aac, eng language, 64k, \"Commentary\")"
        );
        assert_eq!(
            result.diagnostics[2],
            "Skipping: mono track 2 - doesn't match filters (codec)"
        );
        assert!(result.diagnostics.contains(&"Will convert 1 mono track(s) to stereo".to_string()));
        assert!(result.diagnostics.contains(&"Using enhancement level: 1.7".to_string()));
    }

    #[test]
    fn test_speed_mode_diagnostics_omit_enhancement() {
        let file = media(vec![StreamProbe::video("h264"), StreamProbe::audio("aac", 1)]);
        let config = ConversionConfigBuilder::new()
            .algorithm_mode(AlgorithmMode::Speed)
            .bitrate_policy(BitratePolicy::fixed(160))
            .build();
        let result = plan_upmix(&file, &config);
        assert!(result.diagnostics.iter().all(|l| !l.starts_with("Using enhancement")));
        assert!(result.diagnostics.contains(&"Using bitrate: 160k".to_string()));
        assert!(
            result
                .diagnostics
                .contains(&"Using speed-optimized upmixing algorithm".to_string())
        );
    }

    #[test]
    fn test_preset_and_execution_flags() {
        let file = media(vec![StreamProbe::video("h264"), StreamProbe::audio("aac", 1)]);
        let result = plan_upmix(&file, &ConversionConfig::default());
        assert!(result.preset().starts_with(", -filter_complex \""));
        assert!(result.execution.ffmpeg_mode);
        assert!(!result.execution.handbrake_mode);
        assert!(!result.execution.requeue_after);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let file = media(vec![
            StreamProbe::video("h264"),
            StreamProbe::audio("aac", 1)
                .with_tag("b_tag", "2")
                .with_tag("a_tag", "1")
                .with_disposition("forced", true)
                .with_disposition("comment", true),
            StreamProbe::audio("mp3", 1),
        ]);
        let config = ConversionConfig::default();
        let first = plan_upmix(&file, &config);
        let second = plan_upmix(&file, &config);
        assert_eq!(first, second);
        assert_eq!(first.command_fragment, second.command_fragment);
    }
}
