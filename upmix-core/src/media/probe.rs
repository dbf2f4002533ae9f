//! Probed stream metadata.
//!
//! [`StreamProbe`] deserializes directly from the entries of ffprobe's
//! `-show_streams -of json` output. Field encodings in real probe documents
//! are inconsistent (bitrates as strings, dispositions as integers, missing
//! tags), so every field degrades to an empty/zero value instead of failing.
//! Only a document without a `streams` array is rejected.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult};

/// Broad classification of a media file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileMedium {
    Video,
    Audio,
    #[default]
    Other,
}

impl FileMedium {
    /// Derives the medium from the stream list: `Video` if any real video
    /// stream exists (cover art excluded), `Audio` if any audio stream
    /// exists, `Other` otherwise.
    #[must_use]
    pub fn detect(streams: &[StreamProbe]) -> Self {
        if streams
            .iter()
            .any(|s| s.is_codec_type("video") && !s.has_disposition("attached_pic"))
        {
            Self::Video
        } else if streams.iter().any(|s| s.is_codec_type("audio")) {
            Self::Audio
        } else {
            Self::Other
        }
    }
}

/// One container stream as reported by the prober.
///
/// The position of a probe within [`MediaFile::streams`] is its absolute
/// index, which addresses the stream in the downstream ffmpeg command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamProbe {
    /// `audio`, `video`, `subtitle`, ... (case as reported).
    #[serde(default, deserialize_with = "de_string")]
    pub codec_type: String,

    #[serde(default, deserialize_with = "de_string")]
    pub codec_name: String,

    /// Channel count; 0 when unknown.
    #[serde(rename = "channels", default, deserialize_with = "de_channels")]
    pub channel_count: u32,

    /// Bitrate in bits per second, when reported.
    #[serde(rename = "bit_rate", default, deserialize_with = "de_bit_rate")]
    pub bit_rate_bits: Option<u64>,

    #[serde(default, deserialize_with = "de_tags")]
    pub tags: BTreeMap<String, String>,

    /// Disposition flags keyed by name (`default`, `comment`, `forced`, ...).
    #[serde(rename = "disposition", default, deserialize_with = "de_disposition")]
    pub disposition_flags: BTreeMap<String, bool>,
}

impl StreamProbe {
    /// Case-insensitive codec type check.
    #[must_use]
    pub fn is_codec_type(&self, codec_type: &str) -> bool {
        self.codec_type.eq_ignore_ascii_case(codec_type)
    }

    /// Whether the named disposition flag is set.
    #[must_use]
    pub fn has_disposition(&self, flag: &str) -> bool {
        self.disposition_flags.get(flag).copied().unwrap_or(false)
    }

    /// Convenience constructor for an audio stream.
    #[must_use]
    pub fn audio(codec_name: &str, channel_count: u32) -> Self {
        Self {
            codec_type: "audio".to_string(),
            codec_name: codec_name.to_string(),
            channel_count,
            ..Default::default()
        }
    }

    /// Convenience constructor for a video stream.
    #[must_use]
    pub fn video(codec_name: &str) -> Self {
        Self {
            codec_type: "video".to_string(),
            codec_name: codec_name.to_string(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_bit_rate(mut self, bits: u64) -> Self {
        self.bit_rate_bits = Some(bits);
        self
    }

    #[must_use]
    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_disposition(mut self, flag: &str, set: bool) -> Self {
        self.disposition_flags.insert(flag.to_string(), set);
        self
    }
}

/// The probed media file handed to the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    /// Container extension without the leading dot (`mkv`, `mp4`).
    pub container: String,

    pub file_medium: FileMedium,

    /// Every container stream, in container order.
    pub streams: Vec<StreamProbe>,

    /// Container duration, when reported. Only used for progress reporting.
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

#[derive(Deserialize)]
struct FfprobeDocument {
    streams: Option<Vec<StreamProbe>>,
    #[serde(default)]
    format: Option<FfprobeFormat>,
}

#[derive(Deserialize)]
struct FfprobeFormat {
    #[serde(default, deserialize_with = "de_string")]
    duration: String,
}

impl MediaFile {
    /// Creates a media file with the medium detected from its streams.
    #[must_use]
    pub fn new(container: impl Into<String>, streams: Vec<StreamProbe>) -> Self {
        let file_medium = FileMedium::detect(&streams);
        Self {
            container: normalize_container(&container.into()),
            file_medium,
            streams,
            duration_secs: None,
        }
    }

    /// Parses ffprobe JSON output (`-show_streams`, optionally `-show_format`).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ProbeParse`] for malformed JSON and
    /// [`CoreError::InvalidProbe`] when the document has no `streams` array.
    pub fn from_ffprobe_json(json: &str, container: &str) -> CoreResult<Self> {
        let document: FfprobeDocument =
            serde_json::from_str(json).map_err(|e| CoreError::ProbeParse(e.to_string()))?;

        let streams = document.streams.ok_or_else(|| {
            CoreError::InvalidProbe("probe document has no streams array".to_string())
        })?;

        let mut media = Self::new(container, streams);
        media.duration_secs = document
            .format
            .and_then(|f| f.duration.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0);

        log::debug!(
            "Parsed probe: container={}, medium={:?}, {} stream(s)",
            media.container,
            media.file_medium,
            media.streams.len()
        );
        Ok(media)
    }

    /// Number of audio streams in the container.
    #[must_use]
    pub fn audio_stream_count(&self) -> usize {
        self.streams.iter().filter(|s| s.is_codec_type("audio")).count()
    }
}

fn normalize_container(container: &str) -> String {
    container.trim().trim_start_matches('.').to_lowercase()
}

// --- Lenient field decoders ---

fn de_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    })
}

fn de_channels<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let channels = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(match channels {
        Some(c) if c < 0 => {
            log::warn!("Negative channel count ({c}) in probe, treating as 0");
            0
        }
        Some(c) => u32::try_from(c).unwrap_or(0),
        None => 0,
    })
}

fn de_bit_rate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    })
}

fn de_tags<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, String>, D::Error> {
    let value = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(value
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            Value::Null => None,
            other => Some((key, other.to_string())),
        })
        .collect())
}

fn de_disposition<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<BTreeMap<String, bool>, D::Error> {
    let value = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    Ok(value
        .unwrap_or_default()
        .into_iter()
        .map(|(flag, value)| {
            let set = match value {
                Value::Bool(b) => b,
                Value::Number(n) => n.as_i64().is_some_and(|v| v != 0),
                Value::String(s) => s.trim() == "1" || s.trim() == "true",
                _ => false,
            };
            (flag, set)
        })
        .collect())
}
