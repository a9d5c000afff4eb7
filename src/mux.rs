//! Final mux of the composite video with the narration track.

use std::path::{Path, PathBuf};

use crate::audio::concat::AudioTrack;
use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};
use crate::media::ffmpeg::{ensure_parent_dir, ffmpeg_command, run_captured};
use crate::media::probe::{StreamDurations, probe_stream_durations};
use crate::overlay::composite::CompositeVideo;
use crate::pipeline::context::PipelineContext;

/// Slack on top of one frame interval for container/codec padding (e.g. AAC frame granularity).
///
/// Only applied to durations read back from the muxed file; the tracks handed to the muxer are
/// held to a single frame by [`check_track_lengths`].
pub const PROBE_TOLERANCE_SECS: f64 = 0.05;

/// Base name of the muxed file inside the working directory, before it is moved into place.
/// No other stage writes an artifact under this name.
const STAGED_OUTPUT_STEM: &str = "final";

/// The finished video.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FinalOutput {
    pub path: PathBuf,
    pub duration_secs: f64,
}

/// Build the ffmpeg invocation that copies the video stream and encodes the raw audio.
pub(crate) fn mux_command(
    video: &CompositeVideo,
    audio: &AudioTrack,
    audio_codec: &str,
    container: &str,
    out_path: &Path,
) -> std::process::Command {
    let mut cmd = ffmpeg_command();
    cmd.arg("-i").arg(&video.path);
    cmd.args([
        "-f",
        "f32le",
        "-ar",
        &audio.sample_rate.to_string(),
        "-ac",
        &audio.channels.to_string(),
    ]);
    cmd.arg("-i").arg(&audio.path);
    cmd.args([
        "-map", "0:v:0", "-map", "1:a:0", "-c:v", "copy", "-c:a", audio_codec,
    ]);
    if matches!(container, "mp4" | "mov") {
        cmd.args(["-movflags", "+faststart"]);
    }
    cmd.args(["-f", container]);
    cmd.arg(out_path);
    cmd
}

/// Where the muxed file is written before it is moved to `output_path`.
pub(crate) fn staged_output_path(ctx: &PipelineContext) -> PathBuf {
    ctx.workdir
        .artifact(&format!("{STAGED_OUTPUT_STEM}.{}", ctx.config.container))
}

/// The composite and the narration must already agree to within one frame interval.
pub fn check_track_lengths(video: &CompositeVideo, audio: &AudioTrack) -> ReelResult<()> {
    let drift = (video.duration_secs - audio.duration_secs).abs();
    let allowed = video.fps.frame_duration_secs();
    if drift > allowed {
        return Err(ReelError::mux(
            &video.path,
            format!(
                "composite is {:.3}s and narration is {:.3}s, more than one frame ({allowed:.4}s) apart",
                video.duration_secs, audio.duration_secs
            ),
        ));
    }
    Ok(())
}

/// Both streams must be present and end within one frame interval of each other.
pub fn check_drift(path: &Path, durations: StreamDurations, fps: Fps) -> ReelResult<f64> {
    let video = durations
        .video_secs
        .ok_or_else(|| ReelError::mux(path, "muxed file has no video stream duration"))?;
    let audio = durations
        .audio_secs
        .ok_or_else(|| ReelError::mux(path, "muxed file has no audio stream duration"))?;
    let drift = (video - audio).abs();
    let allowed = fps.frame_duration_secs() + PROBE_TOLERANCE_SECS;
    if drift > allowed {
        return Err(ReelError::mux(
            path,
            format!(
                "video {video:.3}s and audio {audio:.3}s drift by {drift:.3}s (max {allowed:.3}s)"
            ),
        ));
    }
    Ok(video)
}

/// Move `from` to `to`, copying when a rename is not possible (e.g. across filesystems).
fn move_file(from: &Path, to: &Path) -> ReelResult<()> {
    ensure_parent_dir(to)?;
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)
        .map_err(|e| ReelError::mux(to, format!("failed to move muxed file into place: {e}")))?;
    let _ = std::fs::remove_file(from);
    Ok(())
}

/// Mux stage: combine video and audio, verify sync, then publish to the output path.
#[tracing::instrument(skip_all, fields(output = %ctx.config.output_path.display()))]
pub fn mux(
    ctx: &PipelineContext,
    video: &CompositeVideo,
    audio: &AudioTrack,
) -> ReelResult<FinalOutput> {
    check_track_lengths(video, audio)?;

    let output_path = ctx.config.output_path.clone();
    let staged = staged_output_path(ctx);

    let cmd = mux_command(
        video,
        audio,
        &ctx.config.audio_codec,
        &ctx.config.container,
        &staged,
    );
    run_captured(cmd, |msg| ReelError::mux(&staged, msg))?;

    let durations =
        probe_stream_durations(&staged).map_err(|e| ReelError::mux(&staged, e.to_string()))?;
    let duration_secs = check_drift(&staged, durations, video.fps)?;

    move_file(&staged, &output_path)?;
    tracing::info!(duration_secs, path = %output_path.display(), "final video written");
    Ok(FinalOutput {
        path: output_path,
        duration_secs,
    })
}

#[cfg(test)]
#[path = "../tests/unit/mux.rs"]
mod tests;
