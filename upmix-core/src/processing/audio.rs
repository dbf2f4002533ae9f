//! Audio stream classification.
//!
//! Scans the probed stream list once, in container order, builds an
//! [`AudioStreamDescriptor`] for every audio stream and decides which mono
//! streams qualify for upmixing under the configured codec and language
//! filters.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::config::ConversionConfig;
use crate::media::StreamProbe;

/// Why an audio stream was not selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    /// The stream is not mono (channel count 0 means unknown).
    NotMono { channels: u32 },
    /// Mono, but its codec is not in the codec filter.
    CodecFiltered,
    /// Mono, but its language is missing or not in the language filter.
    LanguageFiltered,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMono { channels } => write!(f, "already has {channels} channels"),
            Self::CodecFiltered => f.write_str("doesn't match filters (codec)"),
            Self::LanguageFiltered => f.write_str("doesn't match filters (language)"),
        }
    }
}

/// Derived view of one audio stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioStreamDescriptor {
    /// Position in the full container stream list.
    pub absolute_index: usize,
    /// 0-based rank among audio streams only.
    pub audio_ordinal: usize,
    /// Lower-cased codec name.
    pub codec: String,
    pub channels: u32,
    /// Source bitrate in kbps, rounded down; 0 when unknown.
    pub bitrate_kbps: u32,
    /// Lower-cased language tag, empty when absent.
    pub language: String,
    /// Raw title tag, empty when absent.
    pub title: String,
    pub is_default: bool,
    /// Source tags other than `language` and `title`.
    pub extra_tags: BTreeMap<String, String>,
    /// Set disposition flags other than `default`.
    pub extra_dispositions: BTreeSet<String>,
    /// `None` when the stream qualifies for conversion.
    pub skip_reason: Option<SkipReason>,
}

impl AudioStreamDescriptor {
    /// Builds the descriptor for the probe at `absolute_index`. Selection is
    /// decided separately by [`AudioStreamDescriptor::evaluate`].
    #[must_use]
    pub fn from_probe(absolute_index: usize, audio_ordinal: usize, probe: &StreamProbe) -> Self {
        let bitrate_kbps = probe
            .bit_rate_bits
            .map(|bits| u32::try_from(bits / 1000).unwrap_or(u32::MAX))
            .unwrap_or(0);

        let extra_tags = probe
            .tags
            .iter()
            .filter(|(key, _)| key.as_str() != "language" && key.as_str() != "title")
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        let extra_dispositions = probe
            .disposition_flags
            .iter()
            .filter(|(flag, set)| **set && flag.as_str() != "default")
            .map(|(flag, _)| flag.clone())
            .collect();

        Self {
            absolute_index,
            audio_ordinal,
            codec: probe.codec_name.to_lowercase(),
            channels: probe.channel_count,
            bitrate_kbps,
            language: probe
                .tags
                .get("language")
                .map(|l| l.to_lowercase())
                .unwrap_or_default(),
            title: probe.tags.get("title").cloned().unwrap_or_default(),
            is_default: probe.has_disposition("default"),
            extra_tags,
            extra_dispositions,
            skip_reason: None,
        }
    }

    /// Applies the selection predicate:
    /// mono, and codec in the codec filter (if any), and language in the
    /// language filter (if any).
    #[must_use]
    pub fn evaluate(&self, config: &ConversionConfig) -> Option<SkipReason> {
        if self.channels != 1 {
            return Some(SkipReason::NotMono {
                channels: self.channels,
            });
        }
        if !config.codec_filter.is_empty() && !config.codec_filter.contains(&self.codec) {
            return Some(SkipReason::CodecFiltered);
        }
        if !config.language_filter.is_empty()
            && (self.language.is_empty() || !config.language_filter.contains(&self.language))
        {
            return Some(SkipReason::LanguageFiltered);
        }
        None
    }

    /// Whether this stream qualifies for conversion.
    #[must_use]
    pub fn selected(&self) -> bool {
        self.skip_reason.is_none()
    }
}

/// Result of one classification pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StreamClassification {
    /// Every audio stream, in container order.
    pub audio_streams: Vec<AudioStreamDescriptor>,
}

impl StreamClassification {
    /// Qualifying streams, in container order.
    pub fn qualifying(&self) -> impl Iterator<Item = &AudioStreamDescriptor> {
        self.audio_streams.iter().filter(|s| s.selected())
    }

    #[must_use]
    pub fn qualifying_count(&self) -> usize {
        self.qualifying().count()
    }

    #[must_use]
    pub fn audio_stream_count(&self) -> usize {
        self.audio_streams.len()
    }
}

/// Classifies every audio stream of `streams` against `config`.
#[must_use]
pub fn classify_streams(streams: &[StreamProbe], config: &ConversionConfig) -> StreamClassification {
    let mut audio_streams = Vec::new();

    for (absolute_index, probe) in streams.iter().enumerate() {
        if !probe.is_codec_type("audio") {
            continue;
        }

        let mut descriptor =
            AudioStreamDescriptor::from_probe(absolute_index, audio_streams.len(), probe);
        descriptor.skip_reason = descriptor.evaluate(config);

        match descriptor.skip_reason {
            None => log::debug!(
                "Audio stream {} ({}, {}ch) selected for upmix",
                absolute_index,
                descriptor.codec,
                descriptor.channels
            ),
            Some(reason) => log::debug!("Audio stream {absolute_index} skipped: {reason}"),
        }

        audio_streams.push(descriptor);
    }

    StreamClassification { audio_streams }
}
