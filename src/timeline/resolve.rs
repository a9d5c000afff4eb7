use std::collections::HashSet;
use std::path::Path;

use crate::foundation::error::{ReelError, ReelResult};
use crate::media::probe::probe_audio_duration;
use crate::timeline::{Segment, SegmentKind, SegmentSource, Timeline};

/// Reads an audio file's play length from its metadata.
pub trait DurationResolver {
    fn duration_secs(&self, audio_path: &Path) -> ReelResult<f64>;
}

/// [`DurationResolver`] backed by `ffprobe` container metadata.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfprobeDurations;

impl DurationResolver for FfprobeDurations {
    fn duration_secs(&self, audio_path: &Path) -> ReelResult<f64> {
        probe_audio_duration(audio_path)
    }
}

/// A timeline plus the segments the duration cap pushed out.
#[derive(Clone, Debug)]
pub struct ResolvedTimeline {
    pub timeline: Timeline,
    pub dropped: Vec<String>,
}

/// Check the raw segment list before any media is touched.
pub fn validate_sources(sources: &[SegmentSource]) -> ReelResult<()> {
    if sources.is_empty() {
        return Err(ReelError::validation("segment list is empty"));
    }
    let mut seen = HashSet::new();
    for (idx, src) in sources.iter().enumerate() {
        if src.id.trim().is_empty() {
            return Err(ReelError::validation(format!(
                "segment at position {idx} has an empty id"
            )));
        }
        if !seen.insert(src.id.as_str()) {
            return Err(ReelError::validation(format!(
                "duplicate segment id '{}'",
                src.id
            )));
        }
        if src.kind == SegmentKind::Title && idx != 0 {
            return Err(ReelError::validation(format!(
                "title segment '{}' must come first",
                src.id
            )));
        }
    }
    Ok(())
}

/// Resolve every segment's duration in order and fit the result under `cap_secs`.
///
/// Resolution stops at the first segment that would push the total past the cap; it and every
/// later segment are dropped. The first segment is never dropped: if it alone exceeds the cap the
/// run is invalid.
#[tracing::instrument(skip(sources, resolver), fields(segments = sources.len()))]
pub fn resolve_timeline(
    sources: &[SegmentSource],
    resolver: &dyn DurationResolver,
    cap_secs: f64,
) -> ReelResult<ResolvedTimeline> {
    validate_sources(sources)?;

    let mut segments = Vec::with_capacity(sources.len());
    let mut dropped = Vec::new();
    let mut total = 0.0f64;

    for (idx, src) in sources.iter().enumerate() {
        let d = resolver.duration_secs(&src.audio)?;
        if !d.is_finite() || d <= 0.0 {
            return Err(ReelError::media_read(
                &src.audio,
                format!("resolved non-positive duration {d}"),
            ));
        }
        tracing::debug!(id = %src.id, duration_secs = d, "resolved segment duration");

        if total + d > cap_secs {
            if idx == 0 {
                return Err(ReelError::validation(format!(
                    "first segment '{}' is {d:.3}s, longer than the {cap_secs:.3}s cap",
                    src.id
                )));
            }
            dropped.extend(sources[idx..].iter().map(|s| s.id.clone()));
            break;
        }
        total += d;
        segments.push(Segment::from_source(src, d, idx));
    }

    if !dropped.is_empty() {
        tracing::warn!(
            dropped = dropped.len(),
            cap_secs,
            "segments past the duration cap were dropped"
        );
    }

    let timeline = Timeline::new(segments)?;
    timeline.ensure_within(cap_secs)?;
    tracing::info!(
        segments = timeline.len(),
        total_secs = timeline.total_secs(),
        "timeline resolved"
    );
    Ok(ResolvedTimeline { timeline, dropped })
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/resolve.rs"]
mod tests;
