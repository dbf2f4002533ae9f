//! Media input contract.
//!
//! This module defines the probed view of a media file that the planner
//! consumes: the container extension, the file medium and the ordered list of
//! container streams as reported by ffprobe.

pub mod probe;

// Re-export commonly used types
pub use probe::{FileMedium, MediaFile, StreamProbe};
