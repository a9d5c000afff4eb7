//! Segments and the ordered, duration-bearing timeline they form.

use std::path::PathBuf;

use crate::foundation::error::{ReelError, ReelResult};

/// Duration resolution for segment audio.
pub mod resolve;

/// Role a segment plays in the video.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Title,
    Comment,
}

/// Collaborator-produced files for one narrated unit, before its duration is known.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SegmentSource {
    pub id: String,
    pub kind: SegmentKind,
    /// Synthesized speech for this segment.
    pub audio: PathBuf,
    /// Screenshot shown while the speech plays.
    pub image: PathBuf,
}

/// A narrated unit with its resolved play length. Immutable once built.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Segment {
    pub id: String,
    pub kind: SegmentKind,
    pub audio_path: PathBuf,
    pub image_path: PathBuf,
    pub duration_secs: f64,
    pub order: usize,
}

impl Segment {
    pub fn from_source(src: &SegmentSource, duration_secs: f64, order: usize) -> Self {
        Self {
            id: src.id.clone(),
            kind: src.kind,
            audio_path: src.audio.clone(),
            image_path: src.image.clone(),
            duration_secs,
            order,
        }
    }

    pub fn is_title(&self) -> bool {
        self.kind == SegmentKind::Title
    }
}

/// Ordered sequence of segments; `total_secs` is the length of every downstream artifact.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Timeline {
    segments: Vec<Segment>,
}

impl Timeline {
    /// Build a timeline, enforcing ordering and duration invariants.
    pub fn new(segments: Vec<Segment>) -> ReelResult<Self> {
        if segments.is_empty() {
            return Err(ReelError::validation("timeline has no segments"));
        }
        for (idx, seg) in segments.iter().enumerate() {
            if seg.order != idx {
                return Err(ReelError::validation(format!(
                    "segment '{}' has order {} at position {idx}",
                    seg.id, seg.order
                )));
            }
            if !seg.duration_secs.is_finite() || seg.duration_secs <= 0.0 {
                return Err(ReelError::validation(format!(
                    "segment '{}' has non-positive duration {}",
                    seg.id, seg.duration_secs
                )));
            }
            if seg.is_title() && idx != 0 {
                return Err(ReelError::validation(format!(
                    "title segment '{}' must come first",
                    seg.id
                )));
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn total_secs(&self) -> f64 {
        self.segments.iter().map(|s| s.duration_secs).sum()
    }

    /// Start time of every segment: the running sum of the durations before it.
    pub fn start_offsets(&self) -> Vec<f64> {
        let mut t = 0.0;
        self.segments
            .iter()
            .map(|s| {
                let start = t;
                t += s.duration_secs;
                start
            })
            .collect()
    }

    /// Fails when the total runs past `cap_secs`.
    pub fn ensure_within(&self, cap_secs: f64) -> ReelResult<()> {
        let total = self.total_secs();
        if total > cap_secs {
            return Err(ReelError::validation(format!(
                "timeline is {total:.3}s, cap is {cap_secs:.3}s"
            )));
        }
        Ok(())
    }

    /// Cut the timeline at `limit_secs`.
    ///
    /// The segment straddling the limit is shortened; segments after it are dropped.
    pub fn clamp_to(&self, limit_secs: f64) -> ReelResult<Self> {
        if !limit_secs.is_finite() || limit_secs <= 0.0 {
            return Err(ReelError::validation(format!(
                "cannot clamp timeline to {limit_secs}s"
            )));
        }
        let mut out = Vec::with_capacity(self.segments.len());
        let mut t = 0.0;
        for seg in &self.segments {
            let remaining = limit_secs - t;
            if remaining <= 0.0 {
                break;
            }
            let mut seg = seg.clone();
            if seg.duration_secs > remaining {
                seg.duration_secs = remaining;
            }
            t += seg.duration_secs;
            out.push(seg);
        }
        Self::new(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/timeline.rs"]
mod tests;
