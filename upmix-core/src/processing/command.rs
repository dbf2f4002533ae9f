//! Command assembly.
//!
//! The filter graph and output plan are turned into an ordered list of typed
//! [`Directive`]s, each carrying its resolved output index, and serialized
//! once at the end. Two renderings exist: a quoted string fragment to append
//! to a host transcode preset, and an unquoted argument vector for spawning
//! ffmpeg directly.

use std::fmt;

use serde::Serialize;

use crate::processing::filter_graph::{FilterSegment, join_segments};
use crate::processing::output_plan::OutputPlan;

/// One ffmpeg output directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Directive {
    /// `-filter_complex "<graph>"`
    FilterComplex(String),
    /// `-map 0`
    MapAllOriginal,
    /// `-map -0:<index>`
    ExcludeStream(usize),
    /// `-map "[<label>]"`
    MapFilterOutput(String),
    /// `-c copy`
    CopyAll,
    /// `-c:a:<n> <codec>`
    Codec { output_index: usize, codec: String },
    /// `-b:a:<n> <kbps>k`
    Bitrate { output_index: usize, kbps: u32 },
    /// `-metadata:s:a:<n> <key>=<value>`. `quoted` forces a quoted value;
    /// keys or values that would split on whitespace are quoted regardless.
    Metadata {
        output_index: usize,
        key: String,
        value: String,
        quoted: bool,
    },
    /// `-disposition:a:<n> <flag>+<flag>...`
    Disposition { output_index: usize, flags: Vec<String> },
}

impl Directive {
    /// Argument vector form, without shell quoting.
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::FilterComplex(graph) => vec!["-filter_complex".to_string(), graph.clone()],
            Self::MapAllOriginal => vec!["-map".to_string(), "0".to_string()],
            Self::ExcludeStream(index) => vec!["-map".to_string(), format!("-0:{index}")],
            Self::MapFilterOutput(label) => vec!["-map".to_string(), format!("[{label}]")],
            Self::CopyAll => vec!["-c".to_string(), "copy".to_string()],
            Self::Codec {
                output_index,
                codec,
            } => vec![format!("-c:a:{output_index}"), codec.clone()],
            Self::Bitrate { output_index, kbps } => {
                vec![format!("-b:a:{output_index}"), format!("{kbps}k")]
            }
            Self::Metadata {
                output_index,
                key,
                value,
                ..
            } => vec![format!("-metadata:s:a:{output_index}"), format!("{key}={value}")],
            Self::Disposition {
                output_index,
                flags,
            } => vec![format!("-disposition:a:{output_index}"), flags.join("+")],
        }
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FilterComplex(graph) => write!(f, "-filter_complex {}", quote(graph)),
            Self::MapFilterOutput(label) => write!(f, "-map {}", quote(&format!("[{label}]"))),
            Self::Metadata {
                output_index,
                key,
                value,
                quoted,
            } => {
                if needs_quoting(key) {
                    write!(f, "-metadata:s:a:{output_index} {}", quote(&format!("{key}={value}")))
                } else if *quoted || needs_quoting(value) {
                    write!(f, "-metadata:s:a:{output_index} {key}={}", quote(value))
                } else {
                    write!(f, "-metadata:s:a:{output_index} {key}={value}")
                }
            }
            other => f.write_str(&other.args().join(" ")),
        }
    }
}

/// True when `token` would not survive whitespace tokenization as-is.
fn needs_quoting(token: &str) -> bool {
    token.is_empty()
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\'))
}

/// Wraps a value in double quotes, escaping embedded quotes and backslashes.
/// Newlines stay inside the quotes so the value remains one token.
fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// Ordered directive list for one upmix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandFragment {
    pub directives: Vec<Directive>,
}

impl CommandFragment {
    /// Flattened argument vector.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        self.directives.iter().flat_map(Directive::args).collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }
}

impl fmt::Display for CommandFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.directives.iter().map(ToString::to_string).collect();
        f.write_str(&rendered.join(" "))
    }
}

/// Assembles the directives in fixed order: filter graph, `-map 0`,
/// exclusions, filter outputs, `-c copy`, then codec, bitrate, metadata and
/// disposition for each new stream.
///
/// An empty `segments` list yields an empty fragment.
#[must_use]
pub fn assemble_command(segments: &[FilterSegment], plan: &OutputPlan) -> CommandFragment {
    if segments.is_empty() {
        return CommandFragment::default();
    }

    let mut directives = vec![Directive::FilterComplex(join_segments(segments))];

    if plan.map_all_original {
        directives.push(Directive::MapAllOriginal);
    }
    directives.extend(
        plan.excluded_absolute_indices
            .iter()
            .map(|&index| Directive::ExcludeStream(index)),
    );
    directives.extend(
        segments
            .iter()
            .map(|segment| Directive::MapFilterOutput(segment.output_label.clone())),
    );
    directives.push(Directive::CopyAll);

    for stream in &plan.new_stream_directives {
        let output_index = stream.output_index;
        directives.push(Directive::Codec {
            output_index,
            codec: stream.codec.clone(),
        });
        directives.push(Directive::Bitrate {
            output_index,
            kbps: stream.bitrate_kbps,
        });
        if let Some(language) = &stream.language {
            directives.push(Directive::Metadata {
                output_index,
                key: "language".to_string(),
                value: language.clone(),
                quoted: false,
            });
        }
        directives.push(Directive::Metadata {
            output_index,
            key: "title".to_string(),
            value: stream.title.clone(),
            quoted: true,
        });
        for (key, value) in &stream.extra_tags {
            directives.push(Directive::Metadata {
                output_index,
                key: key.clone(),
                value: value.clone(),
                quoted: true,
            });
        }
        let flags = stream.disposition_flags();
        if !flags.is_empty() {
            directives.push(Directive::Disposition {
                output_index,
                flags: flags.into_iter().map(str::to_string).collect(),
            });
        }
    }

    CommandFragment { directives }
}
