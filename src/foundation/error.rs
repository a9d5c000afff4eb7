use std::path::{Path, PathBuf};

/// Convenience result type used across reelcast.
pub type ReelResult<T> = Result<T, ReelError>;

/// Error taxonomy shared by every pipeline stage.
#[derive(thiserror::Error, Debug)]
pub enum ReelError {
    /// Invalid user-provided configuration or segment data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unreadable, empty or corrupt audio, image or video input.
    #[error("media read error: '{}': {message}", path.display())]
    MediaRead {
        /// Offending input file.
        path: PathBuf,
        /// What went wrong while reading it.
        message: String,
    },

    /// Background source is shorter than the timeline under the `fail` policy.
    #[error(
        "insufficient source duration: '{}' is {source_secs:.3}s long, {required_secs:.3}s required",
        path.display()
    )]
    InsufficientSourceDuration {
        /// Background source file.
        path: PathBuf,
        /// Probed duration of the source.
        source_secs: f64,
        /// Duration the timeline needs.
        required_secs: f64,
    },

    /// Invalid overlay geometry or clip duration.
    #[error("composition error: {0}")]
    Composition(String),

    /// Container/codec failure while writing the final file.
    #[error("mux error: '{}': {message}", path.display())]
    Mux {
        /// Output being written.
        path: PathBuf,
        /// Failure detail (usually ffmpeg stderr).
        message: String,
    },

    /// Errors when serializing or deserializing configuration and manifests.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReelError {
    /// Build a [`ReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ReelError::MediaRead`] value.
    pub fn media_read(path: impl AsRef<Path>, msg: impl Into<String>) -> Self {
        Self::MediaRead {
            path: path.as_ref().to_path_buf(),
            message: msg.into(),
        }
    }

    /// Build a [`ReelError::Composition`] value.
    pub fn composition(msg: impl Into<String>) -> Self {
        Self::Composition(msg.into())
    }

    /// Build a [`ReelError::Mux`] value.
    pub fn mux(path: impl AsRef<Path>, msg: impl Into<String>) -> Self {
        Self::Mux {
            path: path.as_ref().to_path_buf(),
            message: msg.into(),
        }
    }

    /// Build a [`ReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// The file this error is about, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::MediaRead { path, .. }
            | Self::InsufficientSourceDuration { path, .. }
            | Self::Mux { path, .. } => Some(path),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
