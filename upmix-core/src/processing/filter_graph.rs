//! Filter graph synthesis for mono-to-stereo upmixing.
//!
//! Each qualifying stream gets one labeled filter chain. Chains read their
//! source by absolute stream index and write to a label derived only from the
//! stream's position in the qualifying list, so the output plan can address
//! the result without re-deriving selection.

use std::fmt;

use serde::Serialize;

use crate::config::{AlgorithmMode, ConversionConfig};
use crate::processing::audio::AudioStreamDescriptor;

/// Duplicates the single input channel onto both stereo channels.
pub const CHANNEL_DUPLICATION_FILTER: &str = "pan=stereo|c0=c0|c1=c0";

/// Explicit sample format/rate normalization ahead of widening.
pub const FORMAT_NORMALIZATION_FILTER: &str =
    "aformat=sample_fmts=fltp:sample_rates=48000:channel_layouts=stereo";

/// Prefix of every filter output label.
pub const OUTPUT_LABEL_PREFIX: &str = "stereo";

/// Label of the filter output for the `position`-th qualifying stream.
#[must_use]
pub fn output_label(position: usize) -> String {
    format!("{OUTPUT_LABEL_PREFIX}{position}")
}

/// Builder for a comma-joined audio filter chain.
#[derive(Default)]
pub struct AudioFilterChain {
    filters: Vec<String>,
}

impl AudioFilterChain {
    /// Creates a new empty filter chain
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a filter to the chain; empty filters are ignored.
    #[must_use]
    pub fn add_filter(mut self, filter: impl Into<String>) -> Self {
        let filter = filter.into();
        if !filter.is_empty() {
            self.filters.push(filter);
        }
        self
    }

    /// Adds the `extrastereo` widening filter.
    #[must_use]
    pub fn add_extrastereo(self, amount: f64) -> Self {
        self.add_filter(format!("extrastereo=m={amount}"))
    }

    /// Builds the filter chain into a single filter string
    #[must_use]
    pub fn build(self) -> Option<String> {
        if self.filters.is_empty() {
            None
        } else {
            Some(self.filters.join(","))
        }
    }
}

/// One labeled filter chain: `[0:<input>]<expression>[<output_label>]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterSegment {
    /// Absolute index of the source stream in input 0.
    pub input_index: usize,
    pub expression: String,
    pub output_label: String,
}

impl FilterSegment {
    /// Input pad reference, e.g. `0:3`.
    #[must_use]
    pub fn input_label(&self) -> String {
        format!("0:{}", self.input_index)
    }
}

impl fmt::Display for FilterSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]{}[{}]",
            self.input_label(),
            self.expression,
            self.output_label
        )
    }
}

/// Filter expression applied to every qualifying stream under `config`.
#[must_use]
pub fn upmix_expression(config: &ConversionConfig) -> String {
    let chain = AudioFilterChain::new().add_filter(CHANNEL_DUPLICATION_FILTER);
    let chain = match config.algorithm_mode {
        AlgorithmMode::Speed => chain,
        AlgorithmMode::Quality => {
            let chain = if config.normalize_format {
                chain.add_filter(FORMAT_NORMALIZATION_FILTER)
            } else {
                chain
            };
            chain.add_extrastereo(config.enhancement_amount)
        }
    };
    chain.build().unwrap_or_default()
}

/// Builds one segment per qualifying stream, in qualifying-list order.
#[must_use]
pub fn build_filter_graph<'a, I>(qualifying: I, config: &ConversionConfig) -> Vec<FilterSegment>
where
    I: IntoIterator<Item = &'a AudioStreamDescriptor>,
{
    let expression = upmix_expression(config);
    qualifying
        .into_iter()
        .enumerate()
        .map(|(position, stream)| {
            let segment = FilterSegment {
                input_index: stream.absolute_index,
                expression: expression.clone(),
                output_label: output_label(position),
            };
            log::debug!("Filter segment: {segment}");
            segment
        })
        .collect()
}

/// Joins segments into a `-filter_complex` graph description.
#[must_use]
pub fn join_segments(segments: &[FilterSegment]) -> String {
    segments
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfigBuilder;
    use crate::media::StreamProbe;

    fn descriptor(absolute_index: usize) -> AudioStreamDescriptor {
        AudioStreamDescriptor::from_probe(absolute_index, 0, &StreamProbe::audio("aac", 1))
    }

    #[test]
    fn test_audio_filter_chain_empty() {
        assert_eq!(AudioFilterChain::new().build(), None);
        assert_eq!(AudioFilterChain::new().add_filter("").build(), None);
    }

    #[test]
    fn test_speed_expression_is_duplication_only() {
        let config = ConversionConfigBuilder::new()
            .algorithm_mode(AlgorithmMode::Speed)
            .normalize_format(true)
            .build();
        assert_eq!(upmix_expression(&config), "pan=stereo|c0=c0|c1=c0");
    }

    #[test]
    fn test_quality_expression() {
        let config = ConversionConfig::default();
        assert_eq!(
            upmix_expression(&config),
            "pan=stereo|c0=c0|c1=c0,extrastereo=m=1.7"
        );

        let config = ConversionConfigBuilder::new().enhancement_amount(1.0).build();
        assert_eq!(
            upmix_expression(&config),
            "pan=stereo|c0=c0|c1=c0,extrastereo=m=1"
        );
    }

    #[test]
    fn test_quality_expression_with_format_normalization() {
        let config = ConversionConfigBuilder::new()
            .normalize_format(true)
            .enhancement_amount(2.5)
            .build();
        assert_eq!(
            upmix_expression(&config),
            "pan=stereo|c0=c0|c1=c0,aformat=sample_fmts=fltp:sample_rates=48000:channel_layouts=stereo,extrastereo=m=2.5"
        );
    }

    #[test]
    fn test_segments_use_absolute_index_and_dense_labels() {
        let streams = [descriptor(2), descriptor(4), descriptor(7)];
        let segments = build_filter_graph(&streams, &ConversionConfig::default());
        assert_eq!(segments.len(), 3);
        let inputs: Vec<_> = segments.iter().map(|s| s.input_index).collect();
        assert_eq!(inputs, [2, 4, 7]);
        let labels: Vec<_> = segments.iter().map(|s| s.output_label.as_str()).collect();
        assert_eq!(labels, ["stereo0", "stereo1", "stereo2"]);
        assert_eq!(
            segments[1].to_string(),
            "[0:4]pan=stereo|c0=c0|c1=c0,extrastereo=m=1.7[stereo1]"
        );
    }

    #[test]
    fn test_join_segments() {
        let streams = [descriptor(1), descriptor(3)];
        let config = ConversionConfigBuilder::new()
            .algorithm_mode(AlgorithmMode::Speed)
            .build();
        let graph = join_segments(&build_filter_graph(&streams, &config));
        assert_eq!(
            graph,
            "[0:1]pan=stereo|c0=c0|c1=c0[stereo0];[0:3]pan=stereo|c0=c0|c1=c0[stereo1]"
        );
        assert_eq!(join_segments(&[]), "");
    }
}
