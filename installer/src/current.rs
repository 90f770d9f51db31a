//! The `current` link recording the active SDK version.
//!
//! Switching replaces `<root>/current` with a link to the sibling
//! `<version>` directory. The link text is relative to the root, so it
//! resolves however the root was spelled and survives moving the root. Once
//! set, the link is only ever re-pointed, never removed.

use std::io;

use camino::Utf8Path;
use log::debug;

use crate::error::{Result, SdkError};
use crate::fs::{Filesystem, Symlinker};
use crate::root::InstallRoot;
use crate::version::Version;

/// Make `version` the active version under `root`.
///
/// Nothing changes unless the backend supports symbolic links and `version`
/// is installed. An existing link is removed before the new one is created.
///
/// # Errors
///
/// Returns [`SdkError::SymlinkUnsupported`] if the filesystem has no symlink
/// capability, [`SdkError::VersionNotInstalled`] if `<root>/<version>` is not
/// a directory, and [`SdkError::LinkFailed`] if replacing the link fails.
pub fn set_current(fs: &dyn Filesystem, root: &InstallRoot, version: &Version) -> Result<()> {
    let symlinker = require_symlinks(fs)?;

    let target = root.version_dir(version);
    if !fs.is_dir(&target) {
        return Err(SdkError::VersionNotInstalled {
            version: version.clone(),
            root: root.path().to_owned(),
        });
    }

    let link = root.current_link();
    let link_failed = |source: io::Error| SdkError::LinkFailed {
        link: link.clone(),
        source,
    };
    match symlinker.remove_link(&link) {
        Err(source) if source.kind() != io::ErrorKind::NotFound => {
            return Err(link_failed(source));
        }
        _ => {}
    }
    symlinker
        .symlink(Utf8Path::new(version.as_str()), &link)
        .map_err(link_failed)?;

    debug!("{link} now points at {target}");
    Ok(())
}

/// Return the active version under `root`.
///
/// The final segment of the link target is re-parsed, so a link pointing at
/// a directory with a malformed name is reported rather than trusted.
///
/// # Errors
///
/// Returns [`SdkError::SymlinkUnsupported`] if the filesystem has no symlink
/// capability, [`SdkError::NoCurrentVersion`] if the link is missing or
/// unreadable, and [`SdkError::InvalidVersion`] if its target is not named
/// after a version.
pub fn get_current(fs: &dyn Filesystem, root: &InstallRoot) -> Result<Version> {
    let symlinker = require_symlinks(fs)?;

    let link = root.current_link();
    let target = symlinker.read_link(&link).map_err(|err| {
        debug!("cannot read {link}: {err}");
        SdkError::NoCurrentVersion { link: link.clone() }
    })?;

    let name = target.file_name().unwrap_or(target.as_str());
    Ok(Version::parse(name)?)
}

fn require_symlinks(fs: &dyn Filesystem) -> Result<&dyn Symlinker> {
    fs.symlinker().ok_or_else(|| SdkError::SymlinkUnsupported {
        backend: fs.name(),
    })
}
