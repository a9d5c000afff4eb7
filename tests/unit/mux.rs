use super::*;
use crate::config::RenderConfig;
use crate::foundation::core::Canvas;
use crate::workdir::WorkDir;

fn fps60() -> Fps {
    Fps::integer(60).unwrap()
}

fn durations(video: Option<f64>, audio: Option<f64>) -> StreamDurations {
    StreamDurations {
        video_secs: video,
        audio_secs: audio,
    }
}

#[test]
fn streams_within_one_frame_pass() {
    let path = Path::new("final.mp4");
    let d = check_drift(path, durations(Some(21.0), Some(21.01)), fps60()).unwrap();
    assert_eq!(d, 21.0);
    assert!(check_drift(path, durations(Some(21.0), Some(21.0 + 1.0 / 60.0)), fps60()).is_ok());
}

#[test]
fn drift_beyond_a_frame_is_a_mux_error() {
    let err = check_drift(
        Path::new("final.mp4"),
        durations(Some(21.0), Some(21.5)),
        fps60(),
    )
    .unwrap_err();
    assert!(matches!(err, ReelError::Mux { .. }));
    assert_eq!(err.path(), Some(Path::new("final.mp4")));
}

#[test]
fn missing_streams_are_mux_errors() {
    let path = Path::new("final.mp4");
    assert!(matches!(
        check_drift(path, durations(None, Some(1.0)), fps60()),
        Err(ReelError::Mux { .. })
    ));
    assert!(matches!(
        check_drift(path, durations(Some(1.0), None), fps60()),
        Err(ReelError::Mux { .. })
    ));
}

fn composite(path: PathBuf, frames: u64) -> CompositeVideo {
    let fps = fps60();
    CompositeVideo {
        path,
        duration_secs: fps.frames_to_secs(frames),
        canvas: Canvas::new(1080, 1920),
        fps,
        frames,
    }
}

fn narration(path: PathBuf, duration_secs: f64) -> AudioTrack {
    AudioTrack {
        path,
        duration_secs,
        sample_rate: 48_000,
        channels: 2,
        segment_offsets: vec![0],
    }
}

fn args_of(cmd: &std::process::Command) -> Vec<PathBuf> {
    cmd.get_args().map(PathBuf::from).collect()
}

#[test]
fn staged_file_never_reuses_an_input_artifact_name() {
    let root = tempfile::tempdir().unwrap();
    for name in ["composite.mp4", "background.mp4", "narration.f32le", "overlay_00.png"] {
        let config = RenderConfig {
            output_path: root.path().join("out").join(name),
            ..RenderConfig::default()
        };
        let workdir = WorkDir::create_in(&root.path().join("temp")).unwrap();
        let ctx = PipelineContext::new(config, workdir);

        let staged = staged_output_path(&ctx);
        assert_eq!(staged, ctx.workdir.artifact("final.mp4"));

        let video = composite(ctx.workdir.artifact("composite.mp4"), 60);
        let audio = narration(ctx.workdir.artifact("narration.f32le"), 1.0);
        let cmd = mux_command(&video, &audio, "aac", "mp4", &staged);
        let args = args_of(&cmd);
        assert_eq!(args.last(), Some(&staged));
        assert_eq!(args.iter().filter(|a| **a == staged).count(), 1);
    }
}

#[test]
fn tracks_more_than_a_frame_apart_are_refused_before_muxing() {
    // 1260 frames at 60 fps is exactly 21 s.
    let video = composite(PathBuf::from("w/composite.mp4"), 1260);
    assert!(check_track_lengths(&video, &narration(PathBuf::from("a"), 21.0)).is_ok());
    assert!(check_track_lengths(&video, &narration(PathBuf::from("a"), 21.0 + 0.5 / 60.0)).is_ok());

    let err = check_track_lengths(&video, &narration(PathBuf::from("a"), 21.0 + 2.0 / 60.0))
        .unwrap_err();
    assert!(matches!(err, ReelError::Mux { .. }));
    assert_eq!(err.path(), Some(Path::new("w/composite.mp4")));
}

#[test]
fn command_copies_video_and_encodes_raw_audio() {
    let video = composite(PathBuf::from("w/composite.mp4"), 1260);
    let audio = narration(PathBuf::from("w/narration.f32le"), 21.0);
    let cmd = mux_command(&video, &audio, "aac", "mp4", Path::new("w/final_video.mp4"));
    let args: Vec<String> = cmd
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    let joined = args.join(" ");

    assert!(joined.contains("-i w/composite.mp4"));
    assert!(joined.contains("-f f32le -ar 48000 -ac 2 -i w/narration.f32le"));
    assert!(joined.contains("-map 0:v:0 -map 1:a:0 -c:v copy -c:a aac"));
    assert!(joined.contains("-movflags +faststart"));
    assert!(joined.ends_with("-f mp4 w/final_video.mp4"));

    let mkv = mux_command(&video, &audio, "libopus", "matroska", Path::new("out.mkv"));
    let mkv_args: Vec<String> = mkv
        .get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    assert!(!mkv_args.iter().any(|a| a == "-movflags"));
}
