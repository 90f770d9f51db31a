//! Error types for the gosdk version manager.
//!
//! This module defines the semantic error variants surfaced by the SDK
//! lifecycle. Messages name the offending version, path, or URL, and carry a
//! recovery hint where one exists.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::artefact::download::DownloadError;
use crate::artefact::error::ArtefactError;
use crate::artefact::extraction::ExtractionError;
use crate::version::{Version, VersionError};

/// Errors that can occur while managing Go SDK installations.
#[derive(Debug, Error)]
pub enum SdkError {
    /// The user-supplied or link-recorded version is malformed.
    #[error(transparent)]
    InvalidVersion(#[from] VersionError),

    /// Fetching the release archive failed.
    #[error("failed to download Go {version}: {source}")]
    DownloadFailed {
        /// The version being installed.
        version: Version,
        /// The underlying download failure, carrying the URL.
        #[source]
        source: DownloadError,
    },

    /// Unpacking the release archive failed.
    #[error("failed to extract archive into {target}: {source}")]
    ExtractFailed {
        /// The install directory being populated.
        target: Utf8PathBuf,
        /// The underlying extraction failure.
        #[source]
        source: ExtractionError,
    },

    /// The requested version has no install directory.
    #[error("Go {version} is not installed in {root}; run: gosdk install {version}")]
    VersionNotInstalled {
        /// The requested version.
        version: Version,
        /// The install root that was searched.
        root: Utf8PathBuf,
    },

    /// No `current` link exists, or it cannot be read.
    #[error("no current Go version is set at {link}; run: gosdk use <version>")]
    NoCurrentVersion {
        /// Path of the `current` link.
        link: Utf8PathBuf,
    },

    /// The filesystem backend cannot create or read symbolic links.
    #[error("the {backend} filesystem does not support symbolic links")]
    SymlinkUnsupported {
        /// Name of the filesystem backend.
        backend: &'static str,
    },

    /// The install root could not be listed.
    #[error("failed to list installed versions in {root}")]
    ListFailed {
        /// The install root.
        root: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Replacing the `current` link failed after its preconditions held.
    #[error("failed to update {link}: {source}")]
    LinkFailed {
        /// Path of the `current` link.
        link: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The host platform has no Go release.
    #[error(transparent)]
    Platform(#[from] ArtefactError),

    /// The configuration file is unreadable or invalid.
    #[error("invalid configuration at {path}: {reason}")]
    Config {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Description of the problem.
        reason: String,
    },

    /// No SDK root could be determined.
    #[error("cannot determine the SDK root: {reason}; pass --root or set GOSDK_ROOT")]
    ConfigUnavailable {
        /// Why the default could not be derived.
        reason: String,
    },

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias using [`SdkError`].
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_version_is_transparent() {
        let err = SdkError::from(
            Version::parse("not-a-version").expect_err("malformed version"),
        );
        assert!(matches!(err, SdkError::InvalidVersion(_)));
        assert!(err.to_string().contains("not-a-version"));
    }

    #[test]
    fn version_not_installed_suggests_install_command() {
        let err = SdkError::VersionNotInstalled {
            version: Version::from_canonical("1.16"),
            root: Utf8PathBuf::from("/home/gopher/.gosdk/sdks/go"),
        };
        let msg = err.to_string();
        assert!(msg.contains("gosdk install 1.16"));
        assert!(msg.contains("/home/gopher/.gosdk/sdks/go"));
    }

    #[test]
    fn download_failed_names_the_url() {
        let err = SdkError::DownloadFailed {
            version: Version::from_canonical("1.17.1"),
            source: DownloadError::NotFound {
                url: "https://go.dev/dl/go1.17.1.linux-amd64.tar.gz".to_owned(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("1.17.1"));
        assert!(msg.contains("https://go.dev/dl/go1.17.1.linux-amd64.tar.gz"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn list_failed_preserves_source() {
        let err = SdkError::ListFailed {
            root: Utf8PathBuf::from("/sdk"),
            source: std::io::Error::other("permission denied"),
        };
        assert!(err.to_string().contains("/sdk"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn config_unavailable_suggests_override() {
        let err = SdkError::ConfigUnavailable {
            reason: "no home directory".to_owned(),
        };
        assert!(err.to_string().contains("--root"));
    }

    #[test]
    fn write_failed_includes_reason() {
        let source = std::io::Error::other("broken pipe");
        let err = SdkError::WriteFailed { source };
        assert!(err.to_string().contains("write"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
