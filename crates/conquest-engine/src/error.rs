//! Error types for the engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and simulation execution.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: conquest_core::ConfigError,
    },

    /// The starting grid could not be built.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: conquest_world::WorldError,
    },

    /// The store could not be reached or written.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: conquest_db::DbError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: conquest_core::RunnerError,
    },

    /// Observer API server failed to start.
    #[error("observer error: {message}")]
    Observer {
        /// Description of the observer failure.
        message: String,
    },
}
