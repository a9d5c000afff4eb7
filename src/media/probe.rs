use std::path::{Path, PathBuf};
use std::process::Command;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};
use crate::media::ffmpeg::{parse_ff_ratio, run_captured};

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ProbeStream {
    pub codec_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub r_frame_rate: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ProbeFormat {
    pub duration: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub(crate) struct ProbeOut {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
    pub format: Option<ProbeFormat>,
}

impl ProbeOut {
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn format_duration(&self) -> Option<f64> {
        self.format
            .as_ref()
            .and_then(|f| f.duration.as_deref())
            .and_then(parse_secs)
    }

    pub fn first_stream(&self, codec_type: &str) -> Option<&ProbeStream> {
        self.streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(codec_type))
    }

    pub fn stream_duration(&self, codec_type: &str) -> Option<f64> {
        self.first_stream(codec_type)
            .and_then(|s| s.duration.as_deref())
            .and_then(parse_secs)
    }
}

fn parse_secs(s: &str) -> Option<f64> {
    s.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Probed properties of a video file.
#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    pub source_path: PathBuf,
    pub canvas: Canvas,
    pub fps: Fps,
    pub duration_secs: f64,
}

/// Per-stream durations of a muxed file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamDurations {
    pub video_secs: Option<f64>,
    pub audio_secs: Option<f64>,
}

/// Reject missing and empty files before handing them to ffprobe.
pub(crate) fn check_readable_file(path: &Path) -> ReelResult<()> {
    let meta = std::fs::metadata(path)
        .map_err(|e| ReelError::media_read(path, format!("cannot stat file: {e}")))?;
    if !meta.is_file() {
        return Err(ReelError::media_read(path, "not a regular file"));
    }
    if meta.len() == 0 {
        return Err(ReelError::media_read(path, "file is empty"));
    }
    Ok(())
}

pub(crate) fn run_ffprobe(path: &Path) -> ReelResult<ProbeOut> {
    check_readable_file(path)?;

    let mut cmd = Command::new("ffprobe");
    cmd.args([
        "-v",
        "error",
        "-print_format",
        "json",
        "-show_streams",
        "-show_format",
    ])
    .arg(path);
    let out = run_captured(cmd, |msg| ReelError::media_read(path, msg))?;

    ProbeOut::parse(&out.stdout)
        .map_err(|e| ReelError::media_read(path, format!("ffprobe json parse failed: {e}")))
}

/// Container-reported play length of an audio file, in seconds.
///
/// Reads metadata only; the audio is not decoded.
pub fn probe_audio_duration(path: &Path) -> ReelResult<f64> {
    let parsed = run_ffprobe(path)?;
    if parsed.first_stream("audio").is_none() {
        return Err(ReelError::media_read(path, "no audio stream found"));
    }
    parsed
        .format_duration()
        .or_else(|| parsed.stream_duration("audio"))
        .ok_or_else(|| ReelError::media_read(path, "no positive duration in metadata"))
}

pub fn probe_video(path: &Path) -> ReelResult<VideoSourceInfo> {
    let parsed = run_ffprobe(path)?;
    video_info_from_probe(path, &parsed)
}

pub(crate) fn video_info_from_probe(path: &Path, parsed: &ProbeOut) -> ReelResult<VideoSourceInfo> {
    let stream = parsed
        .first_stream("video")
        .ok_or_else(|| ReelError::media_read(path, "no video stream found"))?;
    let width = stream
        .width
        .filter(|w| *w > 0)
        .ok_or_else(|| ReelError::media_read(path, "missing video width from ffprobe"))?;
    let height = stream
        .height
        .filter(|h| *h > 0)
        .ok_or_else(|| ReelError::media_read(path, "missing video height from ffprobe"))?;
    let (num, den) = parse_ff_ratio(stream.r_frame_rate.as_deref().unwrap_or("0/1"))
        .filter(|(num, _)| *num > 0)
        .ok_or_else(|| ReelError::media_read(path, "invalid video r_frame_rate"))?;
    let duration_secs = parsed
        .format_duration()
        .or_else(|| parsed.stream_duration("video"))
        .ok_or_else(|| ReelError::media_read(path, "no positive duration in metadata"))?;

    Ok(VideoSourceInfo {
        source_path: path.to_path_buf(),
        canvas: Canvas::new(width, height),
        fps: Fps::new(num, den)?,
        duration_secs,
    })
}

pub fn probe_stream_durations(path: &Path) -> ReelResult<StreamDurations> {
    let parsed = run_ffprobe(path)?;
    Ok(StreamDurations {
        video_secs: parsed.stream_duration("video"),
        audio_secs: parsed.stream_duration("audio"),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
