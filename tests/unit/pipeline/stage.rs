use super::*;

#[test]
fn stages_advance_in_pipeline_order() {
    let mut tracker = StageTracker::new();
    let mut seen = vec![tracker.current()];
    while !tracker.current().is_terminal() {
        tracker.advance();
        seen.push(tracker.current());
    }
    assert_eq!(
        seen,
        vec![
            Stage::ResolveDurations,
            Stage::SampleBackground,
            Stage::BuildOverlayTrack,
            Stage::CompositeVideo,
            Stage::BuildAudioTrack,
            Stage::Mux,
            Stage::Done,
        ]
    );
}

#[test]
fn failure_is_terminal_and_reports_failing_stage() {
    let mut tracker = StageTracker::new();
    tracker.advance();
    assert_eq!(tracker.fail(), Stage::SampleBackground);
    assert_eq!(tracker.current(), Stage::Failed);
    tracker.advance();
    assert_eq!(tracker.current(), Stage::Failed);
}

#[test]
fn pipeline_error_display_names_stage_and_cause() {
    let err = PipelineError {
        stage: Stage::Mux,
        workdir: Some(PathBuf::from("temp/reelcast-x")),
        error: ReelError::validation("boom"),
    };
    assert_eq!(
        err.to_string(),
        "pipeline failed in stage mux: validation error: boom"
    );
    assert!(std::error::Error::source(&err).is_some());
}
