//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and the session run.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Orbwalker configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: orbwalk_core::config::ConfigError,
    },

    /// The session runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: crate::runner::RunnerError,
    },

    /// The `session` section or its environment overrides are invalid.
    #[error("session config error: {message}")]
    Session {
        /// Description of the problem.
        message: String,
    },
}
