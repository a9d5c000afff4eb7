//! Run configuration loaded from JSON.

use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{ReelError, ReelResult};

/// What to do when the background source is shorter than the timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortSourcePolicy {
    /// Abort with [`ReelError::InsufficientSourceDuration`].
    #[default]
    Fail,
    /// Shorten the timeline to the source length.
    Clamp,
}

/// Numeric and path configuration for one pipeline run.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Background video source of arbitrary length.
    pub background_path: Option<PathBuf>,
    /// Final output file.
    pub output_path: PathBuf,
    /// Parent directory for the per-run working directory.
    pub work_root: PathBuf,
    /// Corner radius (px) of comment overlays.
    pub corner_radius: u32,
    /// Extra radius added for the title overlay.
    pub title_radius_boost: u32,
    /// Horizontal margin (px, each side) of the title overlay.
    pub title_margin: u32,
    /// Horizontal margin (px, each side) of comment overlays.
    pub comment_margin: u32,
    /// Opacity the background is rendered at, over black.
    pub background_opacity: f32,
    /// Output frame rate.
    pub fps: u32,
    /// Upper bound on the timeline length.
    pub max_total_secs: f64,
    /// When set, the background must have exactly this resolution.
    pub expected_canvas: Option<Canvas>,
    /// Video codec for intermediate clips.
    pub video_codec: String,
    /// Audio codec used when muxing the final file.
    pub audio_codec: String,
    /// ffmpeg container format of the final file.
    pub container: String,
    pub short_source_policy: ShortSourcePolicy,
    /// Fixed seed for background sampling; random when absent.
    pub seed: Option<u64>,
    /// Keep the working directory even after a successful run.
    pub keep_workdir: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background_path: None,
            output_path: PathBuf::from("final_video.mp4"),
            work_root: PathBuf::from("temp"),
            corner_radius: 12,
            title_radius_boost: 6,
            title_margin: 16,
            comment_margin: 24,
            background_opacity: 0.6,
            fps: 60,
            max_total_secs: 59.5,
            expected_canvas: None,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            container: "mp4".to_string(),
            short_source_policy: ShortSourcePolicy::Fail,
            seed: None,
            keep_workdir: false,
        }
    }
}

impl RenderConfig {
    pub fn from_json_file(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> ReelResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .map_err(|e| ReelError::serde(format!("config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.fps == 0 {
            return Err(ReelError::validation("fps must be non-zero"));
        }
        if !(0.0..=1.0).contains(&self.background_opacity) {
            return Err(ReelError::validation(
                "background_opacity must be within [0, 1]",
            ));
        }
        if !self.max_total_secs.is_finite() || self.max_total_secs <= 0.0 {
            return Err(ReelError::validation(
                "max_total_secs must be positive and finite",
            ));
        }
        if let Some(canvas) = self.expected_canvas
            && (canvas.width == 0 || canvas.height == 0)
        {
            return Err(ReelError::validation(
                "expected_canvas width/height must be non-zero",
            ));
        }
        for (name, value) in [
            ("video_codec", &self.video_codec),
            ("audio_codec", &self.audio_codec),
            ("container", &self.container),
        ] {
            if value.trim().is_empty() {
                return Err(ReelError::validation(format!("{name} must not be empty")));
            }
        }
        if !self
            .container
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ReelError::validation(format!(
                "container '{}' is not an ffmpeg muxer name",
                self.container
            )));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ReelError::validation("output_path must not be empty"));
        }
        Ok(())
    }

    pub fn output_fps(&self) -> ReelResult<Fps> {
        Fps::integer(self.fps)
    }

    /// Corner radius for an overlay of the given kind.
    pub fn radius_for(&self, is_title: bool) -> u32 {
        if is_title {
            self.corner_radius + self.title_radius_boost
        } else {
            self.corner_radius
        }
    }

    /// Horizontal margin for an overlay of the given kind.
    pub fn margin_for(&self, is_title: bool) -> u32 {
        if is_title {
            self.title_margin
        } else {
            self.comment_margin
        }
    }

    pub fn background_path(&self) -> ReelResult<&Path> {
        self.background_path
            .as_deref()
            .ok_or_else(|| ReelError::validation("background_path is not configured"))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
