//! Conversion configuration for the upmix planner.
//!
//! Raw host options ([`RawOptions`]) are normalized exactly once into a
//! [`ConversionConfig`]; every downstream stage reads the typed values and
//! never re-parses option strings.

mod builder;
mod options;

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use builder::ConversionConfigBuilder;
pub use options::{OptionValue, RawOptions};

// Default constants

/// Default stereo enhancement amount for Quality mode.
pub const DEFAULT_ENHANCEMENT_AMOUNT: f64 = 1.7;

/// Lowest accepted enhancement amount (1.0 = no widening).
pub const MIN_ENHANCEMENT_AMOUNT: f64 = 1.0;

/// Highest accepted enhancement amount.
pub const MAX_ENHANCEMENT_AMOUNT: f64 = 2.5;

/// Bitrates (kbps) accepted for a fixed output bitrate.
pub const ALLOWED_BITRATES_KBPS: [u32; 6] = [128, 160, 192, 224, 256, 320];

/// Bitrate used when a requested bitrate is not allowed, or when the source
/// bitrate is unknown under [`BitratePolicy::KeepOriginal`].
pub const FALLBACK_BITRATE_KBPS: u32 = 192;

/// Option value selecting [`BitratePolicy::KeepOriginal`]. Matched case-sensitively.
pub const KEEP_ORIGINAL_SENTINEL: &str = "Keep Original";

/// How the bitrate of each new stereo stream is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BitratePolicy {
    /// Reuse the source stream's bitrate, falling back to 192k when unknown.
    KeepOriginal,
    /// Encode every new stream at this bitrate (kbps).
    Fixed(u32),
}

impl BitratePolicy {
    /// Fixed bitrate policy; kbps values outside [`ALLOWED_BITRATES_KBPS`]
    /// are replaced by [`FALLBACK_BITRATE_KBPS`].
    #[must_use]
    pub fn fixed(kbps: u32) -> Self {
        if ALLOWED_BITRATES_KBPS.contains(&kbps) {
            Self::Fixed(kbps)
        } else {
            Self::Fixed(FALLBACK_BITRATE_KBPS)
        }
    }
}

impl fmt::Display for BitratePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeepOriginal => f.write_str(KEEP_ORIGINAL_SENTINEL),
            Self::Fixed(kbps) => write!(f, "{kbps}k"),
        }
    }
}

/// Upmix algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlgorithmMode {
    /// Channel duplication followed by stereo widening.
    #[default]
    Quality,
    /// Channel duplication only.
    Speed,
}

impl fmt::Display for AlgorithmMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quality => f.write_str("Quality"),
            Self::Speed => f.write_str("Speed"),
        }
    }
}

/// Which source disposition flags are carried onto a new stereo stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispositionPolicy {
    /// Only the `default` flag.
    DefaultOnly,
    /// Every flag set on the source (`default`, `comment`, `forced`, ...).
    #[default]
    All,
}

/// Which source tags besides `language` and `title` are carried onto a new stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagPolicy {
    /// Only `language` and the derived `title`.
    LanguageTitle,
    /// `language`, derived `title`, and every other source tag verbatim.
    #[default]
    All,
}

/// Fully normalized conversion configuration.
///
/// Produced by [`RawOptions::normalize`] or [`ConversionConfigBuilder`] and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionConfig {
    /// Lower-case codec names to convert; empty matches every codec.
    pub codec_filter: BTreeSet<String>,

    /// Lower-case ISO-639-2 language tags to convert; empty matches every language.
    pub language_filter: BTreeSet<String>,

    /// Stereo widening amount, always within [1.0, 2.5].
    pub enhancement_amount: f64,

    /// Bitrate selection for new streams.
    pub bitrate_policy: BitratePolicy,

    /// Drop the original mono streams from the output.
    pub remove_original: bool,

    /// Upmix algorithm.
    pub algorithm_mode: AlgorithmMode,

    /// Quality mode only: insert an explicit 48 kHz float-planar stereo
    /// `aformat` stage before the widening filter.
    pub normalize_format: bool,

    /// Disposition flags carried onto new streams.
    pub disposition_policy: DispositionPolicy,

    /// Extra tags carried onto new streams.
    pub tag_policy: TagPolicy,
}

impl Default for ConversionConfig {
    /// The host's declared defaults.
    fn default() -> Self {
        RawOptions::default().normalize()
    }
}

impl ConversionConfig {
    /// Clamps an enhancement amount into the accepted range.
    #[must_use]
    pub fn clamp_enhancement(amount: f64) -> f64 {
        amount.clamp(MIN_ENHANCEMENT_AMOUNT, MAX_ENHANCEMENT_AMOUNT)
    }

    /// One-line parameter summary used as the first decision diagnostic.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Parameters: Codecs={}, Enhancement={}, Bitrate={}, Remove Original={}, Languages={}, Upmix Mode={}",
            join_or_all(&self.codec_filter),
            self.enhancement_amount,
            self.bitrate_policy,
            self.remove_original,
            join_or_all(&self.language_filter),
            self.algorithm_mode,
        )
    }
}

fn join_or_all(set: &BTreeSet<String>) -> String {
    if set.is_empty() {
        "all".to_string()
    } else {
        set.iter().cloned().collect::<Vec<_>>().join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_bitrate_fallback() {
        assert_eq!(BitratePolicy::fixed(320), BitratePolicy::Fixed(320));
        assert_eq!(BitratePolicy::fixed(128), BitratePolicy::Fixed(128));
        assert_eq!(BitratePolicy::fixed(100), BitratePolicy::Fixed(192));
        assert_eq!(BitratePolicy::fixed(0), BitratePolicy::Fixed(192));
    }

    #[test]
    fn test_clamp_enhancement() {
        assert_eq!(ConversionConfig::clamp_enhancement(0.5), 1.0);
        assert_eq!(ConversionConfig::clamp_enhancement(9.0), 2.5);
        assert_eq!(ConversionConfig::clamp_enhancement(1.7), 1.7);
        assert_eq!(ConversionConfig::clamp_enhancement(1.0), 1.0);
        assert_eq!(ConversionConfig::clamp_enhancement(2.5), 2.5);
    }

    #[test]
    fn test_default_config_matches_host_defaults() {
        let config = ConversionConfig::default();
        assert!(config.codec_filter.is_empty());
        assert!(config.language_filter.is_empty());
        assert_eq!(config.enhancement_amount, 1.7);
        assert_eq!(config.bitrate_policy, BitratePolicy::KeepOriginal);
        assert!(config.remove_original);
        assert_eq!(config.algorithm_mode, AlgorithmMode::Quality);
        assert!(!config.normalize_format);
        assert_eq!(config.disposition_policy, DispositionPolicy::All);
        assert_eq!(config.tag_policy, TagPolicy::All);
    }

    #[test]
    fn test_summary() {
        let config = ConversionConfigBuilder::new()
            .codecs(["aac", "ac3"])
            .bitrate_policy(BitratePolicy::fixed(256))
            .remove_original(false)
            .algorithm_mode(AlgorithmMode::Speed)
            .build();
        assert_eq!(
            config.summary(),
            "Parameters: Codecs=aac,ac3, Enhancement=1.7, Bitrate=256k, Remove Original=false, Languages=all, Upmix Mode=Speed"
        );
    }
}
