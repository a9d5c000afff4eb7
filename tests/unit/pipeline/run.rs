use super::*;
use crate::foundation::error::ReelError;
use crate::timeline::SegmentKind;
use std::collections::HashMap;
use std::path::Path;

struct TableDurations(HashMap<PathBuf, f64>);

impl DurationResolver for TableDurations {
    fn duration_secs(&self, audio_path: &Path) -> ReelResult<f64> {
        self.0
            .get(audio_path)
            .copied()
            .ok_or_else(|| ReelError::media_read(audio_path, "no such file"))
    }
}

fn source(id: &str, kind: SegmentKind) -> SegmentSource {
    SegmentSource {
        id: id.to_string(),
        kind,
        audio: PathBuf::from(format!("{id}.mp3")),
        image: PathBuf::from(format!("{id}.png")),
    }
}

fn config_in(dir: &Path) -> RenderConfig {
    RenderConfig {
        background_path: Some(dir.join("background.mp4")),
        output_path: dir.join("out").join("final_video.mp4"),
        work_root: dir.join("temp"),
        seed: Some(7),
        ..RenderConfig::default()
    }
}

#[test]
fn empty_segment_list_aborts_before_anything_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let resolver = TableDurations(HashMap::new());

    let err = run_pipeline_with(config.clone(), &[], &resolver).unwrap_err();
    assert_eq!(err.stage, Stage::ResolveDurations);
    assert!(err.workdir.is_none());
    assert!(matches!(err.error, ReelError::Validation(_)));
    assert!(!config.output_path.exists());
    assert!(!config.work_root.exists());
}

#[test]
fn unreadable_audio_fails_in_duration_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let sources = vec![
        source("title", SegmentKind::Title),
        source("c1", SegmentKind::Comment),
    ];
    let resolver = TableDurations(HashMap::from([(PathBuf::from("title.mp3"), 3.0)]));

    let err = run_pipeline_with(config.clone(), &sources, &resolver).unwrap_err();
    assert_eq!(err.stage, Stage::ResolveDurations);
    assert_eq!(err.error.path(), Some(Path::new("c1.mp3")));
    assert!(!config.work_root.exists());
}

#[test]
fn missing_background_is_reported_up_front() {
    let dir = tempfile::tempdir().unwrap();
    let config = RenderConfig {
        background_path: None,
        ..config_in(dir.path())
    };
    let sources = vec![source("title", SegmentKind::Title)];
    let resolver = TableDurations(HashMap::from([(PathBuf::from("title.mp3"), 3.0)]));

    let err = run_pipeline_with(config, &sources, &resolver).unwrap_err();
    assert_eq!(err.stage, Stage::ResolveDurations);
    assert!(matches!(err.error, ReelError::Validation(_)));
}

#[test]
fn unreadable_background_keeps_workdir_and_names_sampling_stage() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let sources = vec![source("title", SegmentKind::Title)];
    let resolver = TableDurations(HashMap::from([(PathBuf::from("title.mp3"), 3.0)]));

    let err = run_pipeline_with(config.clone(), &sources, &resolver).unwrap_err();
    assert_eq!(err.stage, Stage::SampleBackground);
    assert!(matches!(err.error, ReelError::MediaRead { .. }));
    let workdir = err.workdir.expect("workdir is reported");
    assert!(workdir.is_dir());
    assert!(workdir.starts_with(&config.work_root));
    assert!(!config.output_path.exists());
}

#[test]
fn plan_applies_the_duration_cap() {
    let config = RenderConfig {
        max_total_secs: 15.0,
        ..RenderConfig::default()
    };
    let sources = vec![
        source("title", SegmentKind::Title),
        source("c1", SegmentKind::Comment),
        source("c2", SegmentKind::Comment),
    ];
    let resolver = TableDurations(HashMap::from([
        (PathBuf::from("title.mp3"), 3.0),
        (PathBuf::from("c1.mp3"), 10.0),
        (PathBuf::from("c2.mp3"), 8.0),
    ]));

    let resolved = plan(&config, &sources, &resolver).unwrap();
    assert_eq!(resolved.timeline.len(), 2);
    assert!((resolved.timeline.total_secs() - 13.0).abs() < 1e-9);
    assert_eq!(resolved.dropped, vec!["c2".to_string()]);
}
