//! Error types for platform and artefact naming.

use thiserror::Error;

/// Errors arising from invalid artefact-related values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtefactError {
    /// No Go release is published for this operating system and architecture.
    #[error("unsupported platform {os}/{arch}; Go publishes no release archive for it")]
    UnsupportedPlatform {
        /// The operating system, in Rust or Go vocabulary.
        os: String,
        /// The architecture, in Rust or Go vocabulary.
        arch: String,
    },
}

/// Result type alias using [`ArtefactError`].
pub type Result<T> = std::result::Result<T, ArtefactError>;
