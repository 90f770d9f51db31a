//! Subcommand handlers.
//!
//! Each handler takes the [`SdkManager`] for the resolved install root and
//! the output streams, so the binary stays a thin dispatcher. Progress goes
//! to stderr unless `quiet` is set; results go to stdout.

use std::io::Write;

use log::trace;

use crate::artefact::download::{ArchiveDownloader, FetchContext};
use crate::artefact::extraction::ArchiveInstaller;
use crate::artefact::platform::Platform;
use crate::error::{Result, SdkError};
use crate::output::{format_version_list, install_summary, write_stderr_line};
use crate::sdk::{InstallReport, SdkManager};
use crate::version::Version;

/// Arguments to [`run_install`] and [`run_install_with`].
#[derive(Debug, Clone, Copy)]
pub struct InstallRequest<'a> {
    /// Version as typed by the user.
    pub input: &'a str,
    /// Platform whose archive is installed.
    pub platform: &'a Platform,
    /// Deadline and cancellation for the download.
    pub ctx: &'a FetchContext,
    /// When true, suppress progress output.
    pub quiet: bool,
}

/// Install the version named by `request.input` over HTTP.
///
/// # Errors
///
/// Returns [`SdkError::InvalidVersion`] for malformed input, or any error
/// from [`SdkManager::install`].
pub fn run_install(
    manager: &SdkManager<'_>,
    request: InstallRequest<'_>,
    stderr: &mut dyn Write,
) -> Result<()> {
    install_reporting(manager, request, stderr, |version| {
        manager.install(version, request.platform, request.ctx)
    })
}

/// Testable inner install with injected downloader and installer.
///
/// # Errors
///
/// Returns [`SdkError::InvalidVersion`] for malformed input, or any error
/// from [`SdkManager::install_with`].
pub fn run_install_with(
    manager: &SdkManager<'_>,
    request: InstallRequest<'_>,
    downloader: &dyn ArchiveDownloader,
    installer: &dyn ArchiveInstaller,
    stderr: &mut dyn Write,
) -> Result<()> {
    install_reporting(manager, request, stderr, |version| {
        manager.install_with(version, request.platform, request.ctx, downloader, installer)
    })
}

fn install_reporting(
    manager: &SdkManager<'_>,
    request: InstallRequest<'_>,
    stderr: &mut dyn Write,
    install: impl FnOnce(&Version) -> Result<InstallReport>,
) -> Result<()> {
    let version = Version::parse(request.input)?;

    if !request.quiet {
        write_stderr_line(
            stderr,
            format!(
                "Downloading {}...",
                manager.archive_url(&version, request.platform)
            ),
        );
    }

    let report = install(&version)?;

    if !request.quiet {
        write_stderr_line(stderr, install_summary(&report));
    }
    Ok(())
}

/// Make the version named by `input` the active one.
///
/// # Errors
///
/// Returns [`SdkError::InvalidVersion`] for malformed input, or any error
/// from [`SdkManager::use_version`].
pub fn run_use(
    manager: &SdkManager<'_>,
    input: &str,
    quiet: bool,
    stderr: &mut dyn Write,
) -> Result<()> {
    let version = Version::parse(input)?;
    manager.use_version(&version)?;
    if !quiet {
        write_stderr_line(stderr, format!("Now using Go {version}"));
    }
    Ok(())
}

/// List installed versions by precedence, marking the active one.
///
/// An unset or unreadable `current` link only drops the marker.
///
/// # Errors
///
/// Returns [`SdkError::ListFailed`] if the install root cannot be read, or
/// [`SdkError::WriteFailed`] if writing to stdout fails.
pub fn run_list(manager: &SdkManager<'_>, stdout: &mut dyn Write) -> Result<()> {
    let mut versions = manager.installed()?;
    versions.sort_by(Version::cmp_precedence);

    let current = match manager.current() {
        Ok(version) => Some(version),
        Err(e) => {
            trace!("run_list: no current marker: {e}");
            None
        }
    };

    let output = format_version_list(&versions, current.as_ref());
    writeln!(stdout, "{output}").map_err(|e| SdkError::WriteFailed { source: e })?;
    Ok(())
}

/// Print the active version.
///
/// # Errors
///
/// Returns any error from [`SdkManager::current`], or
/// [`SdkError::WriteFailed`] if writing to stdout fails.
pub fn run_current(manager: &SdkManager<'_>, stdout: &mut dyn Write) -> Result<()> {
    let version = manager.current()?;
    writeln!(stdout, "{version}").map_err(|e| SdkError::WriteFailed { source: e })?;
    Ok(())
}
