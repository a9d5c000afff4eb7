use std::path::{Path, PathBuf};

use crate::foundation::error::{ReelError, ReelResult};
use crate::media::decode::{AudioPcm, MIX_CHANNELS, MIX_SAMPLE_RATE, decode_audio_f32_stereo};
use crate::media::ffmpeg::ensure_parent_dir;
use crate::pipeline::context::PipelineContext;
use crate::timeline::Timeline;

/// Concatenated narration as raw interleaved `f32le` PCM.
#[derive(Clone, Debug)]
pub struct AudioTrack {
    pub path: PathBuf,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: u16,
    /// Start of each segment on the track, in sample frames.
    pub segment_offsets: Vec<u64>,
}

impl AudioTrack {
    pub fn offset_secs(&self, idx: usize) -> Option<f64> {
        let offset = *self.segment_offsets.get(idx)?;
        Some(offset as f64 / f64::from(self.sample_rate))
    }
}

/// Sample-frame boundaries of segments laid end to end.
///
/// Boundaries are rounded from the cumulative start times, so rounding never accumulates: the
/// returned vector has one more entry than `durations`, the last one being the track length.
pub fn segment_boundaries(durations: &[f64], sample_rate: u32) -> Vec<u64> {
    let rate = f64::from(sample_rate);
    let mut bounds = Vec::with_capacity(durations.len() + 1);
    bounds.push(0);
    let mut t = 0.0f64;
    for d in durations {
        t += d;
        bounds.push((t * rate).round().max(0.0) as u64);
    }
    bounds
}

/// Lay decoded segments back to back, each padded with silence or truncated to its slot.
///
/// Returns the interleaved samples and each segment's start in sample frames.
pub fn place_segments(
    pcms: &[AudioPcm],
    durations: &[f64],
    sample_rate: u32,
    channels: u16,
) -> ReelResult<(Vec<f32>, Vec<u64>)> {
    if pcms.len() != durations.len() {
        return Err(ReelError::validation(format!(
            "{} decoded segments for {} durations",
            pcms.len(),
            durations.len()
        )));
    }
    let ch = usize::from(channels);
    if ch == 0 {
        return Err(ReelError::validation("audio track needs at least one channel"));
    }
    if let Some(d) = durations.iter().find(|d| !d.is_finite() || **d <= 0.0) {
        return Err(ReelError::validation(format!(
            "segment duration must be positive, got {d}"
        )));
    }
    for pcm in pcms {
        if pcm.sample_rate != sample_rate || pcm.channels != channels {
            return Err(ReelError::validation(format!(
                "segment audio is {} Hz x{}, track is {sample_rate} Hz x{channels}",
                pcm.sample_rate, pcm.channels
            )));
        }
    }

    let mut bounds = segment_boundaries(durations, sample_rate);
    let total_frames = bounds.last().copied().unwrap_or(0) as usize;
    let mut out = vec![0.0f32; total_frames * ch];

    for (k, pcm) in pcms.iter().enumerate() {
        let start = bounds[k] as usize;
        let slot = bounds[k + 1] as usize - start;
        let take = slot.min(pcm.frames());
        let dst = &mut out[start * ch..(start + take) * ch];
        dst.copy_from_slice(&pcm.interleaved_f32[..take * ch]);
        if pcm.frames() != slot {
            tracing::debug!(
                segment = k,
                decoded_frames = pcm.frames(),
                slot_frames = slot,
                "segment audio fitted to its slot"
            );
        }
    }

    bounds.pop();
    Ok((out, bounds))
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub fn write_f32le(samples_interleaved: &[f32], out_path: &Path) -> ReelResult<()> {
    ensure_parent_dir(out_path)?;
    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        ReelError::composition(format!(
            "failed to write audio track '{}': {e}",
            out_path.display()
        ))
    })
}

/// BuildAudioTrack stage: decode every segment's narration and concatenate in timeline order.
#[tracing::instrument(skip_all, fields(segments = timeline.len()))]
pub fn build_audio_track(ctx: &PipelineContext, timeline: &Timeline) -> ReelResult<AudioTrack> {
    let mut pcms = Vec::with_capacity(timeline.len());
    for segment in timeline.segments() {
        pcms.push(decode_audio_f32_stereo(&segment.audio_path, MIX_SAMPLE_RATE)?);
    }
    let durations: Vec<f64> = timeline.segments().iter().map(|s| s.duration_secs).collect();
    let (samples, segment_offsets) =
        place_segments(&pcms, &durations, MIX_SAMPLE_RATE, MIX_CHANNELS)?;

    let path = ctx.workdir.artifact("narration.f32le");
    write_f32le(&samples, &path)?;

    let frames = samples.len() / usize::from(MIX_CHANNELS);
    let duration_secs = frames as f64 / f64::from(MIX_SAMPLE_RATE);
    tracing::info!(duration_secs, "audio track written");
    Ok(AudioTrack {
        path,
        duration_secs,
        sample_rate: MIX_SAMPLE_RATE,
        channels: MIX_CHANNELS,
        segment_offsets,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/concat.rs"]
mod tests;
