use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{ReelError, ReelResult};
use crate::timeline::SegmentSource;

/// The ordered segment list for one video, as produced by the upstream collaborators.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobManifest {
    pub segments: Vec<SegmentSource>,
}

impl JobManifest {
    /// Load a manifest; relative media paths are resolved against the manifest's directory.
    pub fn from_json_file(path: &Path) -> ReelResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read job manifest '{}'", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_json_str(&text, base)
    }

    pub fn from_json_str(text: &str, base_dir: &Path) -> ReelResult<Self> {
        let mut job: Self = serde_json::from_str(text)
            .map_err(|e| ReelError::serde(format!("job manifest json: {e}")))?;
        for seg in &mut job.segments {
            if seg.audio.is_relative() {
                seg.audio = base_dir.join(&seg.audio);
            }
            if seg.image.is_relative() {
                seg.image = base_dir.join(&seg.image);
            }
        }
        Ok(job)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/job.rs"]
mod tests;
