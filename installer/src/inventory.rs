//! Installed version inventory.

use log::trace;

use crate::error::{Result, SdkError};
use crate::fs::Filesystem;
use crate::root::{CURRENT_LINK, InstallRoot};
use crate::version::Version;

/// List the versions installed under `root`.
///
/// Every immediate child directory except `current` is a version; names are
/// taken verbatim without re-parsing. Symbolic links are not followed, and
/// the order is whatever the filesystem lists.
///
/// # Errors
///
/// Returns [`SdkError::ListFailed`] if `root` cannot be read.
pub fn list_installed(fs: &dyn Filesystem, root: &InstallRoot) -> Result<Vec<Version>> {
    let entries = fs
        .read_dir(root.path())
        .map_err(|source| SdkError::ListFailed {
            root: root.path().to_owned(),
            source,
        })?;

    let versions: Vec<Version> = entries
        .into_iter()
        .filter(|entry| entry.is_dir && entry.name != CURRENT_LINK)
        .map(|entry| Version::from_canonical(entry.name))
        .collect();

    trace!("found {} installed versions in {}", versions.len(), root.path());
    Ok(versions)
}
