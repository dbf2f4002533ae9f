//! Core library for planning mono-to-stereo audio upmixes with ffmpeg.
//!
//! Given the stream inventory of a media file and a set of user options, the
//! planner decides which mono audio tracks to upmix and produces the ffmpeg
//! output arguments that do it: a `-filter_complex` graph duplicating the
//! mono channel (optionally widened with `extrastereo`), stream mapping that
//! keeps or drops the originals, and per-stream codec, bitrate, metadata and
//! disposition directives.
//!
//! ## Usage Example
//!
//! ```rust
//! use upmix_core::{MediaFile, RawOptions, plan_upmix};
//!
//! let probe = r#"{"streams": [
//!     {"codec_type": "video", "codec_name": "h264"},
//!     {"codec_type": "audio", "codec_name": "aac", "channels": 1,
//!      "tags": {"language": "eng"}}
//! ]}"#;
//! let media = MediaFile::from_ffprobe_json(probe, "mkv").unwrap();
//! let config = RawOptions::from_toml_str("upmix_mode = \"Speed\"").unwrap().normalize();
//!
//! let decision = plan_upmix(&media, &config);
//! assert!(decision.should_process);
//! assert!(decision.command_fragment.starts_with("-filter_complex \"[0:1]pan=stereo|c0=c0|c1=c0[stereo0]\""));
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod media;
pub mod processing;
pub mod utils;

// Re-exports for public API
pub use config::{
    AlgorithmMode, BitratePolicy, ConversionConfig, ConversionConfigBuilder, DispositionPolicy,
    OptionValue, RawOptions, TagPolicy,
};
pub use error::{CoreError, CoreResult};
pub use external::{probe_media, run_upmix};
pub use media::{FileMedium, MediaFile, StreamProbe};
pub use processing::{DecisionResult, ExecutionMode, plan_upmix};
pub use utils::{format_duration, parse_ffmpeg_time};
