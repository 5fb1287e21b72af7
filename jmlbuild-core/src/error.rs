//! Error types for the build tooling

use thiserror::Error;

/// Result type for build tooling operations
pub type BuildResult<T> = Result<T, BuildError>;

/// Main error type shared by the scanner and the synthesizer
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("cannot read source file '{path}': {source}")]
    FileAccess {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start toolchain shell '{shell}': {source}")]
    ToolchainUnavailable {
        shell: String,
        #[source]
        source: std::io::Error,
    },

    #[error("toolchain session produced no output within {secs}s")]
    ToolchainTimeout { secs: u64 },

    #[error("marker '{marker}' not found in symbol dump; an earlier compile, archive or dump step likely failed")]
    ToolchainOutput { marker: String },

    #[error("failed to delete temporary archive '{path}': {source}")]
    ArchiveCleanup {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
