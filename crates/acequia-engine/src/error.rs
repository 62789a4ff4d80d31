//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup, the run
//! itself, and report output.

/// Top-level error for the engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration or scenario loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: acequia_core::config::ConfigError,
    },

    /// Clock initialization failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: acequia_core::clock::ClockError,
    },

    /// Simulation runner failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: acequia_core::runner::RunnerError,
    },

    /// The report file could not be written.
    #[error("report write error: {source}")]
    ReportIo {
        /// The underlying IO error.
        #[from]
        source: std::io::Error,
    },

    /// The report could not be serialized.
    #[error("report serialization error: {source}")]
    ReportJson {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
