// upmix-cli/src/config.rs
//
// Resolves the effective upmix configuration: options file first, then
// individual flags (or their UPMIX_* environment variables) on top.

use crate::cli::OptionArgs;
use crate::error::{CliErrorContext, CliResult};
use upmix_core::{ConversionConfig, OptionValue, RawOptions};

/// Options given directly on the command line.
#[must_use]
pub fn flag_overrides(args: &OptionArgs) -> RawOptions {
    let text = |value: &Option<String>| value.as_deref().map(OptionValue::from);
    RawOptions {
        codecs: text(&args.codecs),
        extrastereo_amount: text(&args.extrastereo_amount),
        audio_bitrate: text(&args.audio_bitrate),
        remove_original: text(&args.remove_original),
        languages: text(&args.languages),
        upmix_mode: text(&args.upmix_mode),
        normalize_format: text(&args.normalize_format),
        disposition_policy: text(&args.disposition_policy),
        tag_policy: text(&args.tag_policy),
    }
}

/// Builds the normalized configuration for a command.
pub fn resolve_config(args: &OptionArgs) -> CliResult<ConversionConfig> {
    let base = match &args.options_file {
        Some(path) => RawOptions::from_file(path)
            .cli_with_context(|| format!("Invalid options file {}", path.display()))?,
        None => RawOptions::default(),
    };
    let config = base.merged_with(flag_overrides(args)).normalize();
    log::debug!("Effective configuration: {config:?}");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;
    use upmix_core::{AlgorithmMode, BitratePolicy};

    #[test]
    fn test_defaults_without_file_or_flags() {
        let config = resolve_config(&OptionArgs::default()).unwrap();
        assert_eq!(config, ConversionConfig::default());
    }

    #[test]
    fn test_flags_override_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("options.toml");
        fs::write(&path, "upmix_mode = \"Speed\"\naudio_bitrate = \"128\"\ncodecs = \"aac\"\n")?;

        let args = OptionArgs {
            options_file: Some(path),
            audio_bitrate: Some("256".to_string()),
            ..Default::default()
        };
        let config = resolve_config(&args)?;
        assert_eq!(config.algorithm_mode, AlgorithmMode::Speed);
        assert_eq!(config.bitrate_policy, BitratePolicy::Fixed(256));
        assert!(config.codec_filter.contains("aac"));
        Ok(())
    }

    #[test]
    fn test_bad_options_file_has_context() {
        let args = OptionArgs {
            options_file: Some("/nonexistent/upmix-options.toml".into()),
            ..Default::default()
        };
        let err = resolve_config(&args).unwrap_err();
        assert!(err.to_string().starts_with("Invalid options file /nonexistent/upmix-options.toml"));
    }
}
