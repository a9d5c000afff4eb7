//! Sequential run of every stage, from segment list to final video.

use std::path::PathBuf;

use crate::audio::concat::build_audio_track;
use crate::background::{BackgroundSelection, sample_background};
use crate::config::RenderConfig;
use crate::foundation::error::ReelResult;
use crate::mux::{FinalOutput, mux};
use crate::overlay::composite::{build_overlay_track, composite_video};
use crate::timeline::resolve::{
    DurationResolver, FfprobeDurations, ResolvedTimeline, resolve_timeline, validate_sources,
};
use crate::timeline::{SegmentSource, Timeline};
use crate::workdir::WorkDir;

pub mod context;
pub mod job;
pub mod stage;

use context::PipelineContext;
use stage::{PipelineError, Stage, StageTracker};

/// What a successful run produced.
#[derive(Clone, Debug, serde::Serialize)]
pub struct RunReport {
    pub output: FinalOutput,
    /// Timeline actually rendered (after the cap and any clamping).
    pub timeline: Timeline,
    pub background: BackgroundSelection,
    /// Segment ids left out by the duration cap or by clamping.
    pub dropped: Vec<String>,
    /// Working directory left on disk when `keep_workdir` is set.
    pub kept_workdir: Option<PathBuf>,
}

/// Resolve durations and apply the cap without touching the background or writing anything.
pub fn plan(
    config: &RenderConfig,
    sources: &[SegmentSource],
    resolver: &dyn DurationResolver,
) -> ReelResult<ResolvedTimeline> {
    config.validate()?;
    resolve_timeline(sources, resolver, config.max_total_secs)
}

/// Run the whole pipeline with `ffprobe`-backed duration resolution.
pub fn run_pipeline(
    config: RenderConfig,
    sources: &[SegmentSource],
) -> Result<RunReport, PipelineError> {
    run_pipeline_with(config, sources, &FfprobeDurations)
}

/// Run the whole pipeline.
///
/// Input problems (bad config, empty or malformed segment list, unreadable audio) are reported
/// before the working directory is created. After that, a failure leaves the working directory in
/// place and its path is part of the error.
#[tracing::instrument(skip_all, fields(segments = sources.len()))]
pub fn run_pipeline_with(
    config: RenderConfig,
    sources: &[SegmentSource],
    resolver: &dyn DurationResolver,
) -> Result<RunReport, PipelineError> {
    let mut tracker = StageTracker::new();

    let resolved = match resolve_inputs(&config, sources, resolver) {
        Ok(resolved) => resolved,
        Err(error) => {
            let stage = tracker.fail();
            tracing::error!(%stage, error = %error, "pipeline aborted before start");
            return Err(PipelineError {
                stage,
                workdir: None,
                error,
            });
        }
    };
    tracker.advance();

    let workdir = match WorkDir::create_in(&config.work_root) {
        Ok(workdir) => workdir,
        Err(error) => {
            return Err(PipelineError {
                stage: tracker.fail(),
                workdir: None,
                error,
            });
        }
    };
    tracing::info!(workdir = %workdir.path().display(), "working directory created");

    let mut ctx = PipelineContext::new(config, workdir);
    match run_stages(&mut ctx, resolved, &mut tracker) {
        Ok(mut report) => {
            tracker.advance();
            debug_assert_eq!(tracker.current(), Stage::Done);
            let workdir_path = ctx.workdir.path().to_path_buf();
            if ctx.config.keep_workdir {
                report.kept_workdir = Some(workdir_path);
            } else if let Err(e) = ctx.workdir.remove() {
                tracing::warn!(error = %e, "could not remove working directory");
                report.kept_workdir = Some(workdir_path);
            }
            Ok(report)
        }
        Err(error) => {
            let stage = tracker.fail();
            let workdir = ctx.workdir.path().to_path_buf();
            tracing::error!(
                %stage,
                workdir = %workdir.display(),
                error = %error,
                "pipeline failed; working directory kept"
            );
            Err(PipelineError {
                stage,
                workdir: Some(workdir),
                error,
            })
        }
    }
}

fn resolve_inputs(
    config: &RenderConfig,
    sources: &[SegmentSource],
    resolver: &dyn DurationResolver,
) -> ReelResult<ResolvedTimeline> {
    config.validate()?;
    validate_sources(sources)?;
    config.background_path()?;
    resolve_timeline(sources, resolver, config.max_total_secs)
}

fn run_stages(
    ctx: &mut PipelineContext,
    resolved: ResolvedTimeline,
    tracker: &mut StageTracker,
) -> ReelResult<RunReport> {
    let ResolvedTimeline {
        mut timeline,
        mut dropped,
    } = resolved;

    let required = timeline.total_secs();
    let background = sample_background(ctx, required)?;
    if background.selection.is_clamped(required) {
        let clamped = timeline.clamp_to(background.selection.duration_secs)?;
        dropped.extend(
            timeline.segments()[clamped.len()..]
                .iter()
                .map(|s| s.id.clone()),
        );
        timeline = clamped;
    }
    tracker.advance();

    let track = build_overlay_track(ctx, &timeline, background.canvas)?;
    tracker.advance();

    let video = composite_video(ctx, &background, &track)?;
    tracker.advance();

    let audio = build_audio_track(ctx, &timeline)?;
    tracker.advance();

    let output = mux(ctx, &video, &audio)?;

    Ok(RunReport {
        output,
        timeline,
        background: background.selection,
        dropped,
        kept_workdir: None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/run.rs"]
mod tests;
