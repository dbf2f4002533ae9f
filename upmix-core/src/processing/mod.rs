//! Upmix decision pipeline.
//!
//! Each stage is a pure function over the output of the previous one:
//! classification, filter graph, output plan, command assembly. The
//! [`decision`] module wires them together.

/// Audio stream classification and selection
pub mod audio;

/// Labeled filter chains for each qualifying stream
pub mod filter_graph;

/// Output stream mapping and per-stream directives
pub mod output_plan;

/// Ordered ffmpeg directive assembly
pub mod command;

/// Top-level planning entry point
pub mod decision;

pub use audio::{AudioStreamDescriptor, SkipReason, StreamClassification, classify_streams};
pub use command::{CommandFragment, Directive, assemble_command};
pub use decision::{DecisionResult, ExecutionMode, NOTHING_TO_CONVERT, plan_upmix};
pub use filter_graph::{FilterSegment, build_filter_graph};
pub use output_plan::{NewStreamDirective, OutputPlan, compose_output_plan};
