use std::path::{Path, PathBuf};

use super::light::Light;

/// Errors raised while building or using the cache and the DAG
#[derive(Debug, thiserror::Error)]
pub enum EthashError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Failed to allocate {bytes} bytes")]
    Allocation { bytes: u64 },

    #[error("{context}: \"{}\": {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not determine the default DAG directory")]
    DefaultDirUnavailable,

    #[error("DAG generation cancelled by progress callback")]
    Cancelled,
}

pub type EthashResult<T> = Result<T, EthashError>;

impl EthashError {
    /// Critical persistence failure. Logged at the point of failure.
    pub(crate) fn io(context: &'static str, path: &Path, source: std::io::Error) -> Self {
        tracing::error!(path = %path.display(), error = %source, "{}", context);
        Self::Io {
            context,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    /// True when the caller stopped generation through the progress callback
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Failed full handle construction.
///
/// The cache is only taken over by a [`super::Full`] that was built
/// successfully; on failure the light handle comes back with the error.
#[derive(Debug, thiserror::Error)]
#[error("Could not build full DAG handle: {source}")]
pub struct FullNewError {
    light: Light,
    #[source]
    source: EthashError,
}

impl FullNewError {
    pub(crate) fn new(light: Light, source: EthashError) -> Self {
        Self { light, source }
    }

    pub fn error(&self) -> &EthashError {
        &self.source
    }

    pub fn into_light(self) -> Light {
        self.light
    }

    pub fn into_parts(self) -> (Light, EthashError) {
        (self.light, self.source)
    }
}
