use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::ReelResult;

/// Per-run scratch directory holding every intermediate artifact.
///
/// Never removed on drop: [`WorkDir::remove`] is called only after a successful run, so a failed
/// run leaves its artifacts behind for inspection.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    /// Create a uniquely named directory under `root` (created if missing).
    pub fn create_in(root: &Path) -> ReelResult<Self> {
        std::fs::create_dir_all(root)
            .with_context(|| format!("create work root '{}'", root.display()))?;
        let dir = tempfile::Builder::new()
            .prefix("reelcast-")
            .tempdir_in(root)
            .with_context(|| format!("create working directory in '{}'", root.display()))?;
        Ok(Self { path: dir.keep() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of a named artifact inside the directory.
    pub fn artifact(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    pub fn remove(self) -> ReelResult<()> {
        std::fs::remove_dir_all(&self.path)
            .with_context(|| format!("remove working directory '{}'", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/workdir.rs"]
mod tests;
