use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Stdio};

use crate::foundation::core::{Canvas, FrameRGBA, Fps};
use crate::foundation::error::{ReelError, ReelResult};
use crate::media::ffmpeg::{ffmpeg_command, run_captured};
use crate::media::probe::check_readable_file;

pub const MIX_SAMPLE_RATE: u32 = 48_000;
pub const MIX_CHANNELS: u16 = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    pub sample_rate: u32,
    pub channels: u16,
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.interleaved_f32.len() / usize::from(self.channels)
        }
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frames() as f64 / f64::from(self.sample_rate)
        }
    }
}

/// Decode any ffmpeg-readable audio file to interleaved stereo `f32` at `sample_rate`.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> ReelResult<AudioPcm> {
    check_readable_file(path)?;

    let mut cmd = ffmpeg_command();
    cmd.arg("-i").arg(path).args([
        "-vn",
        "-f",
        "f32le",
        "-acodec",
        "pcm_f32le",
        "-ac",
        &MIX_CHANNELS.to_string(),
        "-ar",
        &sample_rate.to_string(),
        "pipe:1",
    ]);
    let out = run_captured(cmd, |msg| ReelError::media_read(path, msg))?;

    if !out.stdout.len().is_multiple_of(4) {
        return Err(ReelError::media_read(
            path,
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let mut pcm = Vec::<f32>::with_capacity(out.stdout.len() / 4);
    for chunk in out.stdout.chunks_exact(4) {
        pcm.push(f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
    }
    if pcm.is_empty() {
        return Err(ReelError::media_read(path, "decoded audio is empty"));
    }

    Ok(AudioPcm {
        sample_rate,
        channels: MIX_CHANNELS,
        interleaved_f32: pcm,
    })
}

/// Pull-based source of video frames in presentation order.
pub trait FrameSource {
    /// Frame geometry every yielded frame has.
    fn canvas(&self) -> Canvas;
    /// Next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> ReelResult<Option<FrameRGBA>>;
}

/// Streams straight-alpha RGBA8 frames out of an `ffmpeg` decoder, resampled to a fixed rate.
pub struct FfmpegFrameSource {
    path: PathBuf,
    canvas: Canvas,
    child: Option<Child>,
    stdout: Option<ChildStdout>,
    stderr_drain: Option<std::thread::JoinHandle<std::io::Result<Vec<u8>>>>,
    exhausted: bool,
}

impl FfmpegFrameSource {
    pub fn open(path: &Path, canvas: Canvas, fps: Fps) -> ReelResult<Self> {
        check_readable_file(path)?;
        if canvas.width == 0 || canvas.height == 0 {
            return Err(ReelError::media_read(path, "video canvas must be non-zero"));
        }

        let mut cmd = ffmpeg_command();
        cmd.arg("-i")
            .arg(path)
            .args([
                "-an",
                "-vf",
                &format!("fps={}/{}", fps.num, fps.den),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgba",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| {
            ReelError::media_read(
                path,
                format!("failed to spawn ffmpeg (is it installed and on PATH?): {e}"),
            )
        })?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ReelError::media_read(path, "failed to open ffmpeg stdout"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| ReelError::media_read(path, "failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut stderr_bytes = Vec::new();
            stderr.read_to_end(&mut stderr_bytes)?;
            Ok(stderr_bytes)
        });

        Ok(Self {
            path: path.to_path_buf(),
            canvas,
            child: Some(child),
            stdout: Some(stdout),
            stderr_drain: Some(stderr_drain),
            exhausted: false,
        })
    }

    /// Stop decoding and reap the child process.
    ///
    /// A decoder closed before end of stream is killed and its exit status ignored; one that ran
    /// to completion must have exited cleanly.
    pub fn close(&mut self) -> ReelResult<()> {
        drop(self.stdout.take());
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        if !self.exhausted {
            let _ = child.kill();
        }
        let status = child
            .wait()
            .map_err(|e| ReelError::media_read(&self.path, format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| ReelError::media_read(&self.path, "ffmpeg stderr drain thread panicked"))?
                .unwrap_or_default(),
            None => Vec::new(),
        };
        if self.exhausted && !status.success() {
            return Err(ReelError::media_read(
                &self.path,
                format!(
                    "ffmpeg decode exited with status {status}: {}",
                    String::from_utf8_lossy(&stderr_bytes).trim()
                ),
            ));
        }
        Ok(())
    }
}

impl FrameSource for FfmpegFrameSource {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn next_frame(&mut self) -> ReelResult<Option<FrameRGBA>> {
        if self.exhausted {
            return Ok(None);
        }
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };

        let mut data = vec![0u8; self.canvas.rgba_len()];
        let mut filled = 0usize;
        while filled < data.len() {
            match stdout.read(&mut data[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(ReelError::media_read(
                        &self.path,
                        format!("failed to read decoded frame: {e}"),
                    ));
                }
            }
        }

        if filled == 0 {
            self.exhausted = true;
            return Ok(None);
        }
        if filled < data.len() {
            self.exhausted = true;
            return Err(ReelError::media_read(
                &self.path,
                format!(
                    "truncated frame from decoder: got {filled} bytes, expected {}",
                    data.len()
                ),
            ));
        }

        Ok(Some(FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data,
            premultiplied: false,
        }))
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        if self.child.is_some() {
            let _ = self.close();
        }
    }
}

/// Frame source over pre-built frames, for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemoryFrameSource {
    canvas: Option<Canvas>,
    frames: std::collections::VecDeque<FrameRGBA>,
}

impl InMemoryFrameSource {
    pub fn new(canvas: Canvas, frames: Vec<FrameRGBA>) -> Self {
        Self {
            canvas: Some(canvas),
            frames: frames.into(),
        }
    }

    /// `count` identical opaque frames filled with `rgba`.
    pub fn solid(canvas: Canvas, rgba: [u8; 4], count: usize) -> Self {
        let mut data = Vec::with_capacity(canvas.rgba_len());
        for _ in 0..(canvas.width as usize * canvas.height as usize) {
            data.extend_from_slice(&rgba);
        }
        let frame = FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data,
            premultiplied: false,
        };
        Self::new(canvas, vec![frame; count])
    }
}

impl FrameSource for InMemoryFrameSource {
    fn canvas(&self) -> Canvas {
        self.canvas.unwrap_or(Canvas::new(0, 0))
    }

    fn next_frame(&mut self) -> ReelResult<Option<FrameRGBA>> {
        Ok(self.frames.pop_front())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/decode.rs"]
mod tests;
