use super::*;

const CLIP_JSON: &str = r#"{
    "streams": [
        { "codec_type": "audio", "duration": "11.977000" },
        { "codec_type": "video", "width": 1080, "height": 1920,
          "r_frame_rate": "30000/1001", "duration": "11.978633" }
    ],
    "format": { "duration": "12.000000" }
}"#;

#[test]
fn video_info_reads_geometry_rate_and_container_duration() {
    let parsed = ProbeOut::parse(CLIP_JSON.as_bytes()).unwrap();
    let info = video_info_from_probe(Path::new("bg.mp4"), &parsed).unwrap();
    assert_eq!(info.canvas, Canvas::new(1080, 1920));
    assert_eq!(info.fps, Fps::new(30000, 1001).unwrap());
    assert!((info.duration_secs - 12.0).abs() < 1e-9);
}

#[test]
fn stream_durations_are_per_codec_type() {
    let parsed = ProbeOut::parse(CLIP_JSON.as_bytes()).unwrap();
    assert_eq!(parsed.stream_duration("audio"), Some(11.977));
    assert_eq!(parsed.stream_duration("video"), Some(11.978633));
    assert_eq!(parsed.stream_duration("subtitle"), None);
}

#[test]
fn video_info_without_video_stream_is_media_read_error() {
    let parsed =
        ProbeOut::parse(br#"{"streams":[{"codec_type":"audio"}],"format":{"duration":"3"}}"#)
            .unwrap();
    let err = video_info_from_probe(Path::new("voice.mp3"), &parsed).unwrap_err();
    assert!(matches!(err, ReelError::MediaRead { .. }));
    assert_eq!(err.path(), Some(Path::new("voice.mp3")));
}

#[test]
fn non_positive_durations_are_ignored() {
    let parsed = ProbeOut::parse(br#"{"streams":[],"format":{"duration":"N/A"}}"#).unwrap();
    assert_eq!(parsed.format_duration(), None);
    let parsed = ProbeOut::parse(br#"{"format":{"duration":"0.000"}}"#).unwrap();
    assert_eq!(parsed.format_duration(), None);
}

#[test]
fn missing_and_empty_files_fail_before_ffprobe() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.mp3");
    let err = probe_audio_duration(&missing).unwrap_err();
    assert!(matches!(err, ReelError::MediaRead { .. }));

    let empty = dir.path().join("empty.mp3");
    std::fs::write(&empty, b"").unwrap();
    let err = probe_audio_duration(&empty).unwrap_err();
    assert!(err.to_string().contains("file is empty"));
}
