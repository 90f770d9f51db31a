//! Go release archives: platform naming, download, and extraction.
//!
//! # Sub-modules
//!
//! - [`error`] - Error types for unsupported platforms.
//! - [`platform`] - Host platform in Go's `GOOS`/`GOARCH` vocabulary.
//! - [`naming`] - Archive filenames and download URLs (`ArtefactName`).
//! - [`download`] - Archive download trait, HTTP implementation, and fetch
//!   deadlines.
//! - [`extraction`] - Archive extraction with wrapper stripping and path
//!   traversal protection.

pub mod download;
pub mod error;
pub mod extraction;
pub mod naming;
pub mod platform;
