//! gosdk library.
//!
//! This crate installs Go SDK releases side by side under one install root
//! and switches the active version through a `current` symbolic link. It is
//! used by the `gosdk` CLI binary and can be consumed programmatically for
//! testing or custom workflows.
//!
//! # Modules
//!
//! - [`artefact`] - Platform naming, archive download, and extraction
//! - [`cli`] - Command-line argument definitions
//! - [`commands`] - Subcommand handlers writing to stdout and stderr
//! - [`config`] - Layered settings from flags, environment, and file
//! - [`current`] - Reading and replacing the `current` link
//! - [`dirs`] - Directory resolution abstraction for platform-specific paths
//! - [`error`] - Semantic error types with recovery hints
//! - [`fs`] - Filesystem abstraction with an optional symlink capability
//! - [`inventory`] - Discovery of installed versions
//! - [`output`] - Output formatting for version lists and summaries
//! - [`root`] - Install root layout
//! - [`sdk`] - Lifecycle orchestration for one install root
//! - [`version`] - Go release version parsing and ordering

pub mod artefact;
pub mod cli;
pub mod commands;
pub mod config;
pub mod current;
pub mod dirs;
pub mod error;
pub mod fs;
pub mod inventory;
pub mod output;
pub mod root;
pub mod sdk;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod version;
