use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, ChildStdin, Stdio};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{FrameIndex, FrameRGBA, Fps};
use crate::foundation::error::{ReelError, ReelResult};
use crate::media::ffmpeg::{ensure_parent_dir, ffmpeg_command, is_ffmpeg_on_path};

/// Options for [`FfmpegSink`] output.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    /// Output video file path.
    pub out_path: PathBuf,
    /// ffmpeg video encoder name.
    pub video_codec: String,
}

impl FfmpegSinkOpts {
    pub fn new(out_path: impl Into<PathBuf>, video_codec: impl Into<String>) -> Self {
        Self {
            out_path: out_path.into(),
            video_codec: video_codec.into(),
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw frames to its stdin.
///
/// Produces a silent video stream; audio is attached later by the muxer.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,

    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            cfg: None,
            last_idx: None,
        }
    }

    fn encode_err(&self, msg: impl Into<String>) -> ReelError {
        ReelError::composition(format!(
            "encoding '{}': {}",
            self.opts.out_path.display(),
            msg.into()
        ))
    }
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> ReelResult<()> {
        if cfg.canvas.width == 0 || cfg.canvas.height == 0 {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !cfg.canvas.is_even() {
            return Err(ReelError::validation(
                "ffmpeg sink width/height must be even (required for yuv420p output)",
            ));
        }

        ensure_parent_dir(&self.opts.out_path)?;

        if !is_ffmpeg_on_path() {
            return Err(self.encode_err("ffmpeg is required for encoding, but was not found on PATH"));
        }

        let mut cmd = ffmpeg_command();
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        // Input: raw opaque RGBA8 frames.
        cmd.args([
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &cfg.canvas.to_string(),
        ]);
        push_input_fps(&mut cmd, cfg.fps);
        cmd.args(["-i", "pipe:0"]);
        cmd.args([
            "-an",
            "-c:v",
            &self.opts.video_codec,
            "-pix_fmt",
            "yuv420p",
            "-r",
            &format!("{}/{}", cfg.fps.num, cfg.fps.den),
        ]);
        cmd.arg(&self.opts.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            self.encode_err(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.encode_err("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| self.encode_err("failed to open ffmpeg stderr (unexpected)"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> ReelResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| ReelError::composition("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(ReelError::composition(
                "ffmpeg sink received out-of-order frame index",
            ));
        }

        if frame.canvas() != cfg.canvas {
            return Err(ReelError::composition(format!(
                "frame size mismatch: got {}, expected {}",
                frame.canvas(),
                cfg.canvas
            )));
        }
        if frame.data.len() != cfg.canvas.rgba_len() {
            return Err(ReelError::composition(
                "frame.data size mismatch with width*height*4",
            ));
        }
        ensure_opaque_rgba8(&frame.data)?;
        self.last_idx = Some(idx);

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(ReelError::composition("ffmpeg sink is already finalized"));
        };

        use std::io::Write as _;
        if let Err(e) = stdin.write_all(&frame.data) {
            return Err(self.encode_err(format!("failed to write frame to ffmpeg stdin: {e}")));
        }
        Ok(())
    }

    fn end(&mut self) -> ReelResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| ReelError::composition("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| self.encode_err(format!("failed to wait for ffmpeg to finish: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| self.encode_err("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| self.encode_err(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(self.encode_err(format!(
                "ffmpeg exited with status {}: {}",
                status,
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

fn push_input_fps(cmd: &mut std::process::Command, fps: Fps) {
    // For rawvideo input, `-r` before `-i` sets the input framerate.
    cmd.args(["-r", &format!("{}/{}", fps.num, fps.den)]);
}

/// The encoder drops alpha, so every pixel must already be composited onto something opaque.
fn ensure_opaque_rgba8(rgba: &[u8]) -> ReelResult<()> {
    if !rgba.len().is_multiple_of(4) {
        return Err(ReelError::composition("rgba8 buffer length is not a multiple of 4"));
    }
    if let Some(px) = rgba.chunks_exact(4).position(|px| px[3] != 255) {
        return Err(ReelError::composition(format!(
            "pixel {px} is not opaque; frames must be composited before encoding"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
