//! Raw host options and their normalization.
//!
//! Hosts hand options over as a flat set of named values whose encodings are
//! loose: booleans may arrive as `true` or `"true"`, numbers as `1.7` or
//! `"1.7"`. Normalization never fails; anything unrecognized degrades to a
//! documented default.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    AlgorithmMode, BitratePolicy, ConversionConfig, DEFAULT_ENHANCEMENT_AMOUNT, DispositionPolicy,
    FALLBACK_BITRATE_KBPS, KEEP_ORIGINAL_SENTINEL, TagPolicy,
};
use crate::error::{CoreError, CoreResult};

/// A single option value as supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl OptionValue {
    /// Textual form of the value.
    #[must_use]
    pub fn as_text(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// `true` for a boolean `true` or the literal string `"true"`.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => s == "true",
            Self::Number(_) => false,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Flat named options, as declared by the host plugin.
///
/// Absent options take the host's declared defaults during
/// [`normalize`](RawOptions::normalize).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawOptions {
    /// Comma-separated codec names, empty or `all` for every codec.
    pub codecs: Option<OptionValue>,
    /// Stereo enhancement amount, default `"1.7"`.
    pub extrastereo_amount: Option<OptionValue>,
    /// `"Keep Original"` or one of 128/160/192/224/256/320.
    pub audio_bitrate: Option<OptionValue>,
    /// Remove the original mono tracks, default `true`.
    pub remove_original: Option<OptionValue>,
    /// Comma-separated ISO-639-2 language tags, empty for every language.
    pub languages: Option<OptionValue>,
    /// `"Quality"` or `"Speed"`.
    pub upmix_mode: Option<OptionValue>,
    /// Quality mode format normalization before widening, default `false`.
    pub normalize_format: Option<OptionValue>,
    /// `"default-only"` or `"all"`, default `"all"`.
    pub disposition_policy: Option<OptionValue>,
    /// `"language-title"` or `"all"`, default `"all"`.
    pub tag_policy: Option<OptionValue>,
}

impl RawOptions {
    /// Parses options from a TOML document.
    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        toml::from_str(content).map_err(|e| CoreError::OptionsParse(e.to_string()))
    }

    /// Parses options from a JSON object.
    pub fn from_json_str(content: &str) -> CoreResult<Self> {
        serde_json::from_str(content).map_err(|e| CoreError::OptionsParse(e.to_string()))
    }

    /// Loads options from a file; `.json` files are read as JSON, anything else as TOML.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::PathError(format!(
                "Failed to read options file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Returns a copy where every option set in `overrides` replaces the value in `self`.
    #[must_use]
    pub fn merged_with(self, overrides: RawOptions) -> RawOptions {
        RawOptions {
            codecs: overrides.codecs.or(self.codecs),
            extrastereo_amount: overrides.extrastereo_amount.or(self.extrastereo_amount),
            audio_bitrate: overrides.audio_bitrate.or(self.audio_bitrate),
            remove_original: overrides.remove_original.or(self.remove_original),
            languages: overrides.languages.or(self.languages),
            upmix_mode: overrides.upmix_mode.or(self.upmix_mode),
            normalize_format: overrides.normalize_format.or(self.normalize_format),
            disposition_policy: overrides.disposition_policy.or(self.disposition_policy),
            tag_policy: overrides.tag_policy.or(self.tag_policy),
        }
    }

    /// Normalizes the raw options into a [`ConversionConfig`]. Never fails.
    #[must_use]
    pub fn normalize(&self) -> ConversionConfig {
        ConversionConfig {
            codec_filter: parse_filter(self.codecs.as_ref()),
            language_filter: parse_filter(self.languages.as_ref()),
            enhancement_amount: parse_enhancement(self.extrastereo_amount.as_ref()),
            bitrate_policy: parse_bitrate(self.audio_bitrate.as_ref()),
            remove_original: self.remove_original.as_ref().is_none_or(OptionValue::is_truthy),
            algorithm_mode: match &self.upmix_mode {
                Some(OptionValue::Text(mode)) if mode == "Speed" => AlgorithmMode::Speed,
                _ => AlgorithmMode::Quality,
            },
            normalize_format: self
                .normalize_format
                .as_ref()
                .is_some_and(OptionValue::is_truthy),
            disposition_policy: parse_disposition_policy(self.disposition_policy.as_ref()),
            tag_policy: parse_tag_policy(self.tag_policy.as_ref()),
        }
    }
}

/// Comma-separated list into a lower-case set. `""` and `"all"` mean no filter.
fn parse_filter(value: Option<&OptionValue>) -> BTreeSet<String> {
    let Some(value) = value else {
        return BTreeSet::new();
    };
    let text = value.as_text().trim().to_lowercase();
    if text.is_empty() || text == "all" {
        return BTreeSet::new();
    }
    text.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_enhancement(value: Option<&OptionValue>) -> f64 {
    let parsed = match value {
        Some(OptionValue::Number(n)) => Some(*n),
        Some(other) => other.as_text().trim().parse::<f64>().ok(),
        None => None,
    };
    let amount = parsed
        .filter(|amount| !amount.is_nan())
        .unwrap_or(DEFAULT_ENHANCEMENT_AMOUNT);
    ConversionConfig::clamp_enhancement(amount)
}

fn parse_bitrate(value: Option<&OptionValue>) -> BitratePolicy {
    match value {
        None => BitratePolicy::KeepOriginal,
        Some(OptionValue::Text(text)) if text == KEEP_ORIGINAL_SENTINEL => {
            BitratePolicy::KeepOriginal
        }
        Some(other) => match other.as_text().trim().parse::<u32>() {
            Ok(kbps) => BitratePolicy::fixed(kbps),
            Err(_) => {
                log::debug!(
                    "Unrecognized audio bitrate '{}', using {}k",
                    other.as_text(),
                    FALLBACK_BITRATE_KBPS
                );
                BitratePolicy::Fixed(FALLBACK_BITRATE_KBPS)
            }
        },
    }
}

fn parse_disposition_policy(value: Option<&OptionValue>) -> DispositionPolicy {
    match value.map(|v| v.as_text().trim().to_lowercase()).as_deref() {
        Some("default-only" | "default_only" | "default") => DispositionPolicy::DefaultOnly,
        _ => DispositionPolicy::All,
    }
}

fn parse_tag_policy(value: Option<&OptionValue>) -> TagPolicy {
    match value.map(|v| v.as_text().trim().to_lowercase()).as_deref() {
        Some("language-title" | "language_title" | "none") => TagPolicy::LanguageTitle,
        _ => TagPolicy::All,
    }
}
