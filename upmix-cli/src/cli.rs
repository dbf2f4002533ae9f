// upmix-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "Upmix: mono-to-stereo audio track upmixing",
    long_about = "Decides which mono audio tracks of a media file to upmix to stereo and \
                  derives the ffmpeg command that does it."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug output on the console
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Optional: Also write debug logs to this file
    #[arg(long, global = true, value_name = "LOG_FILE", env = "UPMIX_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prints the upmix decision for a media file or an ffprobe JSON document
    Plan(PlanArgs),
    /// Probes, plans and runs the upmix with ffmpeg
    Convert(ConvertArgs),
}

/// Upmix options. Values use the same encodings as an options file and
/// override it option by option.
#[derive(Args, Debug, Default, Clone)]
pub struct OptionArgs {
    /// Optional: TOML (or .json) file with upmix options
    #[arg(long = "options", value_name = "OPTIONS_FILE", env = "UPMIX_OPTIONS")]
    pub options_file: Option<PathBuf>,

    /// Comma-separated codecs to convert (empty or "all" for every codec)
    #[arg(long, value_name = "CODECS", env = "UPMIX_CODECS")]
    pub codecs: Option<String>,

    /// Comma-separated ISO-639-2 languages to convert (empty for every language)
    #[arg(long, value_name = "LANGS", env = "UPMIX_LANGUAGES")]
    pub languages: Option<String>,

    /// Stereo enhancement amount, 1.0 to 2.5 (Quality mode)
    #[arg(long, value_name = "AMOUNT")]
    pub extrastereo_amount: Option<String>,

    /// "Keep Original" or one of 128, 160, 192, 224, 256, 320
    #[arg(long, value_name = "KBPS")]
    pub audio_bitrate: Option<String>,

    /// Remove the original mono tracks ("true" or "false")
    #[arg(long, value_name = "BOOL")]
    pub remove_original: Option<String>,

    /// "Quality" or "Speed"
    #[arg(long, value_name = "MODE", env = "UPMIX_MODE")]
    pub upmix_mode: Option<String>,

    /// Normalize sample format and rate before widening ("true" or "false")
    #[arg(long, value_name = "BOOL")]
    pub normalize_format: Option<String>,

    /// Disposition flags copied to new tracks: "all" or "default-only"
    #[arg(long = "dispositions", value_name = "POLICY")]
    pub disposition_policy: Option<String>,

    /// Source tags copied to new tracks: "all" or "language-title"
    #[arg(long = "extra-tags", value_name = "POLICY")]
    pub tag_policy: Option<String>,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Media file to probe with ffprobe
    #[arg(
        short = 'i',
        long = "input",
        value_name = "INPUT_PATH",
        required_unless_present = "probe_json",
        conflicts_with = "probe_json"
    )]
    pub input_path: Option<PathBuf>,

    /// Saved ffprobe JSON output (-show_streams -print_format json) to plan from
    #[arg(long = "probe-json", value_name = "PROBE_JSON")]
    pub probe_json: Option<PathBuf>,

    /// Container of the probed file when using --probe-json (defaults to mkv)
    #[arg(long, value_name = "EXT", requires = "probe_json")]
    pub container: Option<String>,

    /// Print the full decision as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[command(flatten)]
    pub options: OptionArgs,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Media file to upmix
    #[arg(short = 'i', long = "input", required = true, value_name = "INPUT_PATH")]
    pub input_path: PathBuf,

    /// Output file
    #[arg(short = 'o', long = "output", required = true, value_name = "OUTPUT_PATH")]
    pub output_path: PathBuf,

    /// Print the ffmpeg invocation instead of running it
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    #[command(flatten)]
    pub options: OptionArgs,
}
