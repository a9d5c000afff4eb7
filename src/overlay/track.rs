use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};
use crate::overlay::clip::OverlayClip;

/// Overlay clips laid back-to-back: no gap, no overlap, in segment order.
#[derive(Clone, Debug)]
pub struct OverlayTrack {
    clips: Vec<OverlayClip>,
    /// Exclusive end time of each clip on the track.
    ends: Vec<f64>,
}

impl OverlayTrack {
    pub fn new(clips: Vec<OverlayClip>) -> ReelResult<Self> {
        if clips.is_empty() {
            return Err(ReelError::composition("overlay track has no clips"));
        }
        let mut ends = Vec::with_capacity(clips.len());
        let mut t = 0.0f64;
        for clip in &clips {
            if !clip.duration_secs.is_finite() || clip.duration_secs <= 0.0 {
                return Err(ReelError::composition(format!(
                    "overlay clip '{}' has non-positive duration {}",
                    clip.segment_id, clip.duration_secs
                )));
            }
            t += clip.duration_secs;
            ends.push(t);
        }
        Ok(Self { clips, ends })
    }

    pub fn clips(&self) -> &[OverlayClip] {
        &self.clips
    }

    pub fn total_secs(&self) -> f64 {
        self.ends.last().copied().unwrap_or(0.0)
    }

    /// `[start, end)` of clip `idx` on the track.
    pub fn span(&self, idx: usize) -> Option<(f64, f64)> {
        let end = *self.ends.get(idx)?;
        let start = if idx == 0 { 0.0 } else { self.ends[idx - 1] };
        Some((start, end))
    }

    /// Index of the clip showing at `t`. Times past the end resolve to the last clip.
    pub fn clip_index_at(&self, t_secs: f64) -> usize {
        let idx = self.ends.partition_point(|end| *end <= t_secs);
        idx.min(self.clips.len() - 1)
    }

    /// Number of output frames covering the whole track.
    pub fn frame_count(&self, fps: Fps) -> u64 {
        fps.secs_to_frames_round(self.total_secs())
    }

    /// Clip index for every output frame, sampled at `t = i / fps`.
    pub fn frame_schedule(&self, fps: Fps) -> Vec<usize> {
        (0..self.frame_count(fps))
            .map(|i| self.clip_index_at(fps.frames_to_secs(i)))
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/track.rs"]
mod tests;
