//! Builder for [`ConversionConfig`].
//!
//! Library callers that already hold typed values use the builder instead of
//! going through [`RawOptions`](super::RawOptions). The builder applies the
//! same normalization rules: filters are lower-cased, the enhancement amount
//! is clamped and fixed bitrates fall back to 192k.

use std::collections::BTreeSet;

use super::{AlgorithmMode, BitratePolicy, ConversionConfig, DispositionPolicy, TagPolicy};

/// Fluent builder for [`ConversionConfig`], starting from the host defaults.
///
/// # Examples
///
/// ```rust
/// use upmix_core::config::{AlgorithmMode, BitratePolicy, ConversionConfigBuilder};
///
/// let config = ConversionConfigBuilder::new()
///     .codecs(["aac", "ac3"])
///     .languages(["eng"])
///     .enhancement_amount(2.0)
///     .bitrate_policy(BitratePolicy::fixed(256))
///     .remove_original(false)
///     .algorithm_mode(AlgorithmMode::Quality)
///     .build();
/// assert_eq!(config.enhancement_amount, 2.0);
/// ```
#[derive(Debug, Clone)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl Default for ConversionConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversionConfigBuilder {
    /// Creates a builder holding the host defaults.
    pub fn new() -> Self {
        Self {
            config: ConversionConfig::default(),
        }
    }

    /// Restricts conversion to these codecs. An empty list matches every codec.
    pub fn codecs<I, S>(mut self, codecs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.codec_filter = normalize_set(codecs);
        self
    }

    /// Restricts conversion to these languages. An empty list matches every language.
    pub fn languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.language_filter = normalize_set(languages);
        self
    }

    /// Sets the stereo widening amount, clamped to [1.0, 2.5].
    pub fn enhancement_amount(mut self, amount: f64) -> Self {
        if !amount.is_nan() {
            self.config.enhancement_amount = ConversionConfig::clamp_enhancement(amount);
        }
        self
    }

    pub fn bitrate_policy(mut self, policy: BitratePolicy) -> Self {
        self.config.bitrate_policy = match policy {
            BitratePolicy::Fixed(kbps) => BitratePolicy::fixed(kbps),
            keep => keep,
        };
        self
    }

    pub fn remove_original(mut self, remove: bool) -> Self {
        self.config.remove_original = remove;
        self
    }

    pub fn algorithm_mode(mut self, mode: AlgorithmMode) -> Self {
        self.config.algorithm_mode = mode;
        self
    }

    pub fn normalize_format(mut self, enabled: bool) -> Self {
        self.config.normalize_format = enabled;
        self
    }

    pub fn disposition_policy(mut self, policy: DispositionPolicy) -> Self {
        self.config.disposition_policy = policy;
        self
    }

    pub fn tag_policy(mut self, policy: TagPolicy) -> Self {
        self.config.tag_policy = policy;
        self
    }

    /// Finishes the builder.
    pub fn build(self) -> ConversionConfig {
        self.config
    }
}

fn normalize_set<I, S>(values: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|v| v.as_ref().trim().to_lowercase())
        .filter(|v| !v.is_empty() && v != "all")
        .collect()
}
