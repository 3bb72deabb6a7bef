/// Convenience result type used across scenereel.
pub type ScenereelResult<T> = Result<T, ScenereelError>;

/// Top-level error taxonomy used by pipeline APIs.
///
/// Malformed scene metadata is deliberately absent: the resolver repairs it
/// locally and never surfaces an error for it.
#[derive(thiserror::Error, Debug)]
pub enum ScenereelError {
    /// An asset location could not be fetched after exhausting all retries.
    #[error("fetch failed for '{url}' after {attempts} attempts: {source}")]
    Fetch {
        /// The location that failed.
        url: String,
        /// Number of attempts made before giving up.
        attempts: u32,
        /// The last underlying cause.
        #[source]
        source: anyhow::Error,
    },

    /// Invalid caller-provided request or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Corrupt or unreadable image/audio bytes. Fatal for the run: skipping a
    /// scene would desynchronize timing against the narration.
    #[error("decode error: {0}")]
    Decode(String),

    /// Encoding-engine configuration or invocation failure. The message
    /// carries the engine's own diagnostics (a resolution/profile mismatch is
    /// the canonical cause).
    #[error("engine error: {0}")]
    Engine(String),

    /// The muxer could not produce the final container. No partial output is
    /// exposed.
    #[error("finalization error: {0}")]
    Finalize(String),

    /// The run was cancelled through its cancellation token.
    #[error("run cancelled")]
    Cancelled,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ScenereelError {
    /// Build a [`ScenereelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`ScenereelError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`ScenereelError::Engine`] value.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Build a [`ScenereelError::Finalize`] value.
    pub fn finalize(msg: impl Into<String>) -> Self {
        Self::Finalize(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
