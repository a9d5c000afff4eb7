//! Random sub-interval selection and extraction from the background source.

use std::path::{Path, PathBuf};

use rand::Rng;

use crate::config::ShortSourcePolicy;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};
use crate::media::ffmpeg::{ff_secs, ffmpeg_command, run_captured};
use crate::media::probe::{VideoSourceInfo, probe_video};
use crate::pipeline::context::PipelineContext;

/// Which part of the background source the video uses.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BackgroundSelection {
    pub source_path: PathBuf,
    pub start_offset_secs: f64,
    pub duration_secs: f64,
}

impl BackgroundSelection {
    pub fn end_secs(&self) -> f64 {
        self.start_offset_secs + self.duration_secs
    }

    /// Whether the interval had to be shortened to fit the source.
    pub fn is_clamped(&self, required_secs: f64) -> bool {
        self.duration_secs < required_secs
    }
}

/// The extracted background interval, ready for compositing.
#[derive(Clone, Debug)]
pub struct BackgroundClip {
    pub path: PathBuf,
    pub canvas: Canvas,
    pub fps: Fps,
    pub duration_secs: f64,
    pub selection: BackgroundSelection,
}

/// Choose `[start, start + required)` uniformly inside a source of `source_secs`.
///
/// Under [`ShortSourcePolicy::Clamp`] a short source yields its whole length starting at zero.
pub fn plan_selection<R: Rng>(
    rng: &mut R,
    source_path: &Path,
    source_secs: f64,
    required_secs: f64,
    policy: ShortSourcePolicy,
) -> ReelResult<BackgroundSelection> {
    if !required_secs.is_finite() || required_secs <= 0.0 {
        return Err(ReelError::validation(format!(
            "required background duration must be positive, got {required_secs}"
        )));
    }
    if !source_secs.is_finite() || source_secs <= 0.0 {
        return Err(ReelError::media_read(
            source_path,
            format!("background duration must be positive, got {source_secs}"),
        ));
    }

    if source_secs < required_secs {
        return match policy {
            ShortSourcePolicy::Fail => Err(ReelError::InsufficientSourceDuration {
                path: source_path.to_path_buf(),
                source_secs,
                required_secs,
            }),
            ShortSourcePolicy::Clamp => Ok(BackgroundSelection {
                source_path: source_path.to_path_buf(),
                start_offset_secs: 0.0,
                duration_secs: source_secs,
            }),
        };
    }

    let max_start = source_secs - required_secs;
    let start = rng.gen_range(0.0..=max_start).clamp(0.0, max_start);
    Ok(BackgroundSelection {
        source_path: source_path.to_path_buf(),
        start_offset_secs: start,
        duration_secs: required_secs,
    })
}

/// Re-encode the selected interval as a silent clip, keeping resolution and frame rate.
pub fn extract_interval(
    selection: &BackgroundSelection,
    out_path: &Path,
    video_codec: &str,
) -> ReelResult<()> {
    let mut cmd = ffmpeg_command();
    cmd.args(["-ss", &ff_secs(selection.start_offset_secs)])
        .arg("-i")
        .arg(&selection.source_path)
        .args([
            "-t",
            &ff_secs(selection.duration_secs),
            "-map",
            "0:v:0",
            "-an",
            "-c:v",
            video_codec,
            "-pix_fmt",
            "yuv420p",
        ])
        .arg(out_path);
    run_captured(cmd, |msg| ReelError::media_read(&selection.source_path, msg))?;
    Ok(())
}

/// SampleBackground stage: probe the source, pick an interval, extract it into the workdir.
#[tracing::instrument(skip(ctx))]
pub fn sample_background(
    ctx: &mut PipelineContext,
    required_secs: f64,
) -> ReelResult<BackgroundClip> {
    let source_path = ctx.config.background_path()?.to_path_buf();
    let source = probe_video(&source_path)?;
    check_expected_canvas(&source, ctx.config.expected_canvas)?;

    let selection = plan_selection(
        &mut ctx.rng,
        &source_path,
        source.duration_secs,
        required_secs,
        ctx.config.short_source_policy,
    )?;
    if selection.is_clamped(required_secs) {
        tracing::warn!(
            source_secs = source.duration_secs,
            required_secs,
            "background shorter than timeline; clamping"
        );
    }
    tracing::info!(
        start_offset_secs = selection.start_offset_secs,
        duration_secs = selection.duration_secs,
        source = %source_path.display(),
        "background interval selected"
    );

    let out_path = ctx.workdir.artifact("background.mp4");
    extract_interval(&selection, &out_path, &ctx.config.video_codec)?;

    let extracted = probe_video(&out_path)?;
    if extracted.canvas != source.canvas {
        return Err(ReelError::composition(format!(
            "extracted background is {}, source is {}",
            extracted.canvas, source.canvas
        )));
    }

    Ok(BackgroundClip {
        path: out_path,
        canvas: extracted.canvas,
        fps: extracted.fps,
        duration_secs: extracted.duration_secs,
        selection,
    })
}

fn check_expected_canvas(source: &VideoSourceInfo, expected: Option<Canvas>) -> ReelResult<()> {
    match expected {
        Some(expected) if expected != source.canvas => Err(ReelError::validation(format!(
            "background '{}' is {}, expected {}",
            source.source_path.display(),
            source.canvas,
            expected
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "../tests/unit/background.rs"]
mod tests;
