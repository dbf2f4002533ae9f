//! Output stream planning.
//!
//! Every original stream is mapped and stream-copied; with `remove_original`
//! the qualifying mono streams are excluded again. New stereo streams follow
//! the surviving audio streams, so the k-th new stream lands at output audio
//! index `audio_count - excluded + k`.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::{BitratePolicy, ConversionConfig, DispositionPolicy, FALLBACK_BITRATE_KBPS, TagPolicy};
use crate::processing::audio::{AudioStreamDescriptor, StreamClassification};
use crate::processing::filter_graph::output_label;

/// Encoder used for every new stereo stream.
pub const STEREO_CODEC: &str = "aac";

/// Marker appended to (or used as) the title of new streams.
pub const STEREO_TITLE_MARKER: &str = "Stereo";

/// Title for the stereo version of a stream titled `source`.
///
/// Empty titles become `Stereo`; titles already mentioning `Stereo` are kept;
/// anything else gets ` (Stereo)` appended. Applying it twice changes nothing.
#[must_use]
pub fn stereo_title(source: &str) -> String {
    if source.is_empty() {
        STEREO_TITLE_MARKER.to_string()
    } else if source.contains(STEREO_TITLE_MARKER) {
        source.to_string()
    } else {
        format!("{source} ({STEREO_TITLE_MARKER})")
    }
}

/// Encoding and metadata directives for one new stereo stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewStreamDirective {
    /// Output audio stream index (`a:<n>`) of the new stream.
    pub output_index: usize,
    /// Absolute index of the mono source.
    pub source_index: usize,
    /// Filter graph output feeding this stream.
    pub filter_label: String,
    pub codec: String,
    pub bitrate_kbps: u32,
    /// Omitted when the source has no language.
    pub language: Option<String>,
    pub title: String,
    pub default: bool,
    /// Additional disposition flags, sorted by name.
    pub extra_dispositions: Vec<String>,
    /// Additional metadata tags, sorted by key.
    pub extra_tags: Vec<(String, String)>,
}

impl NewStreamDirective {
    /// Every disposition flag for the stream, `default` first.
    #[must_use]
    pub fn disposition_flags(&self) -> Vec<&str> {
        let mut flags = Vec::with_capacity(self.extra_dispositions.len() + 1);
        if self.default {
            flags.push("default");
        }
        flags.extend(self.extra_dispositions.iter().map(String::as_str));
        flags
    }
}

/// Stream mapping and per-stream directives for the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputPlan {
    /// All original streams are mapped before exclusions. Always true.
    pub map_all_original: bool,
    /// Absolute indices removed from the mapping; empty unless `remove_original`.
    pub excluded_absolute_indices: BTreeSet<usize>,
    /// One bundle per qualifying stream, in qualifying-list order.
    pub new_stream_directives: Vec<NewStreamDirective>,
}

impl OutputPlan {
    /// Output audio index of the first new stream.
    #[must_use]
    pub fn base_new_index(&self) -> Option<usize> {
        self.new_stream_directives.first().map(|d| d.output_index)
    }
}

/// Bitrate (kbps) of the new stream derived from `source`.
#[must_use]
pub fn new_stream_bitrate(source: &AudioStreamDescriptor, policy: BitratePolicy) -> u32 {
    match policy {
        BitratePolicy::KeepOriginal if source.bitrate_kbps > 0 => source.bitrate_kbps,
        BitratePolicy::KeepOriginal => FALLBACK_BITRATE_KBPS,
        BitratePolicy::Fixed(kbps) => kbps,
    }
}

/// Composes the output plan from a classification pass.
#[must_use]
pub fn compose_output_plan(
    classification: &StreamClassification,
    config: &ConversionConfig,
) -> OutputPlan {
    let qualifying: Vec<&AudioStreamDescriptor> = classification.qualifying().collect();

    let excluded_absolute_indices: BTreeSet<usize> = if config.remove_original {
        qualifying.iter().map(|s| s.absolute_index).collect()
    } else {
        BTreeSet::new()
    };

    let base_new_index = classification.audio_stream_count() - excluded_absolute_indices.len();

    let new_stream_directives = qualifying
        .iter()
        .enumerate()
        .map(|(position, source)| NewStreamDirective {
            output_index: base_new_index + position,
            source_index: source.absolute_index,
            filter_label: output_label(position),
            codec: STEREO_CODEC.to_string(),
            bitrate_kbps: new_stream_bitrate(source, config.bitrate_policy),
            language: (!source.language.is_empty()).then(|| source.language.clone()),
            title: stereo_title(&source.title),
            default: source.is_default,
            extra_dispositions: match config.disposition_policy {
                DispositionPolicy::DefaultOnly => Vec::new(),
                DispositionPolicy::All => source.extra_dispositions.iter().cloned().collect(),
            },
            extra_tags: match config.tag_policy {
                TagPolicy::LanguageTitle => Vec::new(),
                TagPolicy::All => source
                    .extra_tags
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            },
        })
        .collect();

    OutputPlan {
        map_all_original: true,
        excluded_absolute_indices,
        new_stream_directives,
    }
}
