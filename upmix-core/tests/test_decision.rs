// upmix-core/tests/test_decision.rs
//
// End-to-end planning tests: ffprobe JSON in, decision out.

use upmix_core::{ConversionConfig, MediaFile, OptionValue, RawOptions, plan_upmix};

const SINGLE_MONO_PROBE: &str = r#"{
  "streams": [
    {"index": 0, "codec_type": "video", "codec_name": "h264"},
    {"index": 1, "codec_type": "audio", "codec_name": "aac", "channels": 1,
     "bit_rate": "128000", "tags": {"language": "eng"}, "disposition": {"default": 1}}
  ],
  "format": {"duration": "5400.120000"}
}"#;

const MIXED_PROBE: &str = r#"{
  "streams": [
    {"codec_type": "video", "codec_name": "hevc"},
    {"codec_type": "audio", "codec_name": "eac3", "channels": 6, "tags": {"language": "eng"}},
    {"codec_type": "audio", "codec_name": "aac", "channels": 1, "bit_rate": "96000",
     "tags": {"language": "eng", "title": "Commentary", "handler_name": "SoundHandler"},
     "disposition": {"default": 0, "comment": 1}},
    {"codec_type": "subtitle", "codec_name": "subrip", "tags": {"language": "eng"}},
    {"codec_type": "audio", "codec_name": "ac3", "channels": 1, "bit_rate": 192000,
     "tags": {"language": "fre", "title": "Stereo Track"}}
  ]
}"#;

fn options(pairs: &[(&str, &str)]) -> ConversionConfig {
    let mut raw = RawOptions::default();
    for (key, value) in pairs {
        let value = Some(OptionValue::from(*value));
        match *key {
            "codecs" => raw.codecs = value,
            "extrastereo_amount" => raw.extrastereo_amount = value,
            "audio_bitrate" => raw.audio_bitrate = value,
            "remove_original" => raw.remove_original = value,
            "languages" => raw.languages = value,
            "upmix_mode" => raw.upmix_mode = value,
            "normalize_format" => raw.normalize_format = value,
            "disposition_policy" => raw.disposition_policy = value,
            "tag_policy" => raw.tag_policy = value,
            other => panic!("unknown option {other}"),
        }
    }
    raw.normalize()
}

fn host_defaults() -> ConversionConfig {
    options(&[
        ("codecs", ""),
        ("audio_bitrate", "Keep Original"),
        ("remove_original", "true"),
        ("languages", ""),
        ("upmix_mode", "Quality"),
        ("extrastereo_amount", "1.7"),
    ])
}

#[test]
fn test_single_mono_quality_end_to_end() {
    let media = MediaFile::from_ffprobe_json(SINGLE_MONO_PROBE, "mkv").unwrap();
    let result = plan_upmix(&media, &host_defaults());

    assert!(result.should_process);
    assert_eq!(
        result.command_fragment,
        "-filter_complex \"[0:1]pan=stereo|c0=c0|c1=c0,extrastereo=m=1.7[stereo0]\" \
         -map 0 -map -0:1 -map \"[stereo0]\" -c copy \
         -c:a:0 aac -b:a:0 128k -metadata:s:a:0 language=eng \
         -metadata:s:a:0 title=\"Stereo\" -disposition:a:0 default"
    );
    assert_eq!(result.preset(), format!(", {}", result.command_fragment));
    assert_eq!(result.container, ".mkv");
    assert!(result.execution.ffmpeg_mode);
    assert!(!result.execution.requeue_after);
}

#[test]
fn test_single_mono_speed_mode() {
    let media = MediaFile::from_ffprobe_json(SINGLE_MONO_PROBE, "mkv").unwrap();
    let config = options(&[("upmix_mode", "Speed"), ("extrastereo_amount", "2.2")]);
    let result = plan_upmix(&media, &config);
    assert!(
        result
            .command_fragment
            .starts_with("-filter_complex \"[0:1]pan=stereo|c0=c0|c1=c0[stereo0]\"")
    );
    assert!(!result.command_fragment.contains("extrastereo"));
}

#[test]
fn test_quality_with_format_normalization() {
    let media = MediaFile::from_ffprobe_json(SINGLE_MONO_PROBE, "mkv").unwrap();
    let config = options(&[("normalize_format", "true")]);
    let result = plan_upmix(&media, &config);
    assert!(result.command_fragment.contains(
        "[0:1]pan=stereo|c0=c0|c1=c0,aformat=sample_fmts=fltp:sample_rates=48000:channel_layouts=stereo,extrastereo=m=1.7[stereo0]"
    ));
}

#[test]
fn test_keep_originals_shifts_new_indices() {
    let media = MediaFile::from_ffprobe_json(MIXED_PROBE, "mkv").unwrap();
    let config = options(&[("remove_original", "false")]);
    let result = plan_upmix(&media, &config);

    assert!(result.should_process);
    assert!(!result.command_fragment.contains("-map -0:"));
    // three audio streams kept, new ones at a:3 and a:4
    assert!(result.command_fragment.contains("-c:a:3 aac"));
    assert!(result.command_fragment.contains("-c:a:4 aac"));
    assert!(!result.command_fragment.contains("-c:a:2 "));
}

#[test]
fn test_remove_originals_with_two_qualifying_streams() {
    let media = MediaFile::from_ffprobe_json(MIXED_PROBE, "mkv").unwrap();
    let result = plan_upmix(&media, &host_defaults());

    assert!(
        result
            .command_fragment
            .contains("-map 0 -map -0:2 -map -0:4 -map \"[stereo0]\" -map \"[stereo1]\" -c copy")
    );
    assert!(result.command_fragment.contains(
        "\"[0:2]pan=stereo|c0=c0|c1=c0,extrastereo=m=1.7[stereo0];[0:4]pan=stereo|c0=c0|c1=c0,extrastereo=m=1.7[stereo1]\""
    ));
    // 3 audio streams - 2 removed
    assert!(result.command_fragment.contains("-c:a:1 aac -b:a:1 96k"));
    assert!(result.command_fragment.contains("-c:a:2 aac -b:a:2 192k"));
}

#[test]
fn test_metadata_preservation() {
    let media = MediaFile::from_ffprobe_json(MIXED_PROBE, "mkv").unwrap();
    let result = plan_upmix(&media, &host_defaults());
    let fragment = &result.command_fragment;

    assert!(fragment.contains("-metadata:s:a:1 language=eng"));
    assert!(fragment.contains("-metadata:s:a:1 title=\"Commentary (Stereo)\""));
    assert!(fragment.contains("-metadata:s:a:1 handler_name=\"SoundHandler\""));
    assert!(fragment.contains("-disposition:a:1 comment"));
    assert!(fragment.contains("-metadata:s:a:2 language=fre"));
    assert!(fragment.contains("-metadata:s:a:2 title=\"Stereo Track\""));
    assert!(!fragment.contains("-disposition:a:2"));
}

#[test]
fn test_restrictive_metadata_policies() {
    let media = MediaFile::from_ffprobe_json(MIXED_PROBE, "mkv").unwrap();
    let config = options(&[
        ("disposition_policy", "default-only"),
        ("tag_policy", "language-title"),
    ]);
    let result = plan_upmix(&media, &config);
    assert!(!result.command_fragment.contains("handler_name"));
    assert!(!result.command_fragment.contains("-disposition"));
}

#[test]
fn test_fixed_bitrate_overrides_source() {
    let media = MediaFile::from_ffprobe_json(MIXED_PROBE, "mkv").unwrap();
    let result = plan_upmix(&media, &options(&[("audio_bitrate", "320")]));
    assert!(result.command_fragment.contains("-b:a:1 320k"));
    assert!(result.command_fragment.contains("-b:a:2 320k"));

    let result = plan_upmix(&media, &options(&[("audio_bitrate", "999")]));
    assert!(result.command_fragment.contains("-b:a:1 192k"));
}

#[test]
fn test_codec_filter() {
    let media = MediaFile::from_ffprobe_json(MIXED_PROBE, "mkv").unwrap();
    let result = plan_upmix(&media, &options(&[("codecs", "AC3, dts")]));
    assert!(result.command_fragment.contains("[0:4]"));
    assert!(!result.command_fragment.contains("[0:2]"));
    assert!(
        result
            .diagnostics
            .contains(&"Skipping: mono track 2 - doesn't match filters (codec)".to_string())
    );
}

#[test]
fn test_language_filter() {
    let media = MediaFile::from_ffprobe_json(MIXED_PROBE, "mkv").unwrap();
    let result = plan_upmix(&media, &options(&[("languages", "fre")]));
    assert!(result.command_fragment.contains("[0:4]"));
    assert!(!result.command_fragment.contains("[0:2]"));

    let result = plan_upmix(&media, &options(&[("languages", "jpn")]));
    assert!(!result.should_process);
    assert!(result.command_fragment.is_empty());
}

#[test]
fn test_no_mono_streams() {
    let probe = r#"{"streams": [
        {"codec_type": "video", "codec_name": "h264"},
        {"codec_type": "audio", "codec_name": "aac", "channels": 2},
        {"codec_type": "audio", "codec_name": "dts", "channels": 6}
    ]}"#;
    let media = MediaFile::from_ffprobe_json(probe, "mp4").unwrap();
    let result = plan_upmix(&media, &host_defaults());

    assert!(!result.should_process);
    assert_eq!(result.command_fragment, "");
    assert_eq!(result.container, ".mp4");
    assert!(
        result
            .diagnostics
            .iter()
            .any(|line| line.to_lowercase().contains("nothing to convert"))
    );
}

#[test]
fn test_audio_only_file_is_not_processed() {
    let probe = r#"{"streams": [
        {"codec_type": "audio", "codec_name": "mp3", "channels": 1},
        {"codec_type": "video", "codec_name": "mjpeg", "disposition": {"attached_pic": 1}}
    ]}"#;
    let media = MediaFile::from_ffprobe_json(probe, "mp3").unwrap();
    let result = plan_upmix(&media, &host_defaults());
    assert!(!result.should_process);
    assert_eq!(result.diagnostics, ["File is not video"]);
}

#[test]
fn test_enhancement_clamping_reaches_filter() {
    let media = MediaFile::from_ffprobe_json(SINGLE_MONO_PROBE, "mkv").unwrap();
    for (input, expected) in [("0.5", "m=1[stereo0]"), ("9.0", "m=2.5[stereo0]"), ("oops", "m=1.7[stereo0]")] {
        let result = plan_upmix(&media, &options(&[("extrastereo_amount", input)]));
        assert!(
            result.command_fragment.contains(expected),
            "{input}: {}",
            result.command_fragment
        );
    }
}

#[test]
fn test_planning_is_idempotent() {
    let media = MediaFile::from_ffprobe_json(MIXED_PROBE, "mkv").unwrap();
    let config = host_defaults();
    let first = plan_upmix(&media, &config);
    let second = plan_upmix(&media, &config);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_decision_serializes_to_json() {
    let media = MediaFile::from_ffprobe_json(SINGLE_MONO_PROBE, "mkv").unwrap();
    let result = plan_upmix(&media, &host_defaults());
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["should_process"], true);
    assert_eq!(value["container"], ".mkv");
    assert_eq!(value["execution"]["handbrake_mode"], false);
    assert_eq!(value["command_args"][0], "-filter_complex");
}

#[test]
fn test_missing_streams_array_is_an_error() {
    assert!(MediaFile::from_ffprobe_json(r#"{"format": {}}"#, "mkv").is_err());
    assert!(MediaFile::from_ffprobe_json(r#"{"streams": null}"#, "mkv").is_err());
    assert!(MediaFile::from_ffprobe_json("not json", "mkv").is_err());
}
