use std::path::PathBuf;

use crate::foundation::error::ReelError;

/// Pipeline states, in execution order. `Done` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ResolveDurations,
    SampleBackground,
    BuildOverlayTrack,
    CompositeVideo,
    BuildAudioTrack,
    Mux,
    Done,
    Failed,
}

impl Stage {
    /// The stage that follows a successful `self`. Terminal states map to themselves.
    pub fn next(self) -> Self {
        match self {
            Self::ResolveDurations => Self::SampleBackground,
            Self::SampleBackground => Self::BuildOverlayTrack,
            Self::BuildOverlayTrack => Self::CompositeVideo,
            Self::CompositeVideo => Self::BuildAudioTrack,
            Self::BuildAudioTrack => Self::Mux,
            Self::Mux | Self::Done => Self::Done,
            Self::Failed => Self::Failed,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ResolveDurations => "resolve_durations",
            Self::SampleBackground => "sample_background",
            Self::BuildOverlayTrack => "build_overlay_track",
            Self::CompositeVideo => "composite_video",
            Self::BuildAudioTrack => "build_audio_track",
            Self::Mux => "mux",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// First failure of a run, with where it happened and what was left behind.
#[derive(thiserror::Error, Debug)]
#[error("pipeline failed in stage {stage}: {error}")]
pub struct PipelineError {
    pub stage: Stage,
    /// Working directory preserved for inspection; `None` when the run failed before creating it.
    pub workdir: Option<PathBuf>,
    #[source]
    pub error: ReelError,
}

/// Tracks the current state and logs each transition.
#[derive(Debug)]
pub(crate) struct StageTracker {
    current: Stage,
}

impl StageTracker {
    pub fn new() -> Self {
        Self {
            current: Stage::ResolveDurations,
        }
    }

    pub fn current(&self) -> Stage {
        self.current
    }

    /// Move to the next stage after the current one succeeded.
    pub fn advance(&mut self) {
        let next = self.current.next();
        tracing::debug!(from = %self.current, to = %next, "stage complete");
        self.current = next;
    }

    /// Enter `Failed`, returning the stage that failed.
    pub fn fail(&mut self) -> Stage {
        let failed = self.current;
        self.current = Stage::Failed;
        failed
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/stage.rs"]
mod tests;
