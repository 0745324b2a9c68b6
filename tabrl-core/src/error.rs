//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug)]
pub enum TabularError {
    /// Malformed configuration, detected before any episode runs.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure of the environment while running an episode.
    #[error("Environment error in episode {episode}: {cause}")]
    Environment {
        /// Index of the episode in which the environment failed.
        episode: usize,

        /// Error raised by the environment.
        cause: anyhow::Error,
    },

    /// Return of a truncated episode requested with [`TruncationPolicy::Reject`].
    ///
    /// [`TruncationPolicy::Reject`]: crate::TruncationPolicy::Reject
    #[error("Returns of a truncated episode of length {0} were rejected")]
    TruncatedReturn(usize),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}

impl TabularError {
    pub(crate) fn config(msg: impl Into<String>) -> anyhow::Error {
        TabularError::Config(msg.into()).into()
    }
}
