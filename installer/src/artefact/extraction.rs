//! Release archive extraction.
//!
//! Unpacks a gzip-compressed tar stream into an install directory through
//! the [`Filesystem`] capability. Go release archives wrap everything in a
//! single top-level `go/` directory; that first segment is stripped from
//! every entry so `go/bin/go` lands at `<target>/bin/go`. Entry paths are
//! validated to prevent zip-slip attacks.

use std::io::{self, Write};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use flate2::read::GzDecoder;
use log::{debug, trace, warn};
use tar::EntryType;

use crate::fs::{DEFAULT_DIR_MODE, Filesystem};

/// Permission bits honoured from archive headers.
const MODE_MASK: u32 = 0o7777;

/// Trait for installing archives, enabling test mocking.
///
/// # Examples
///
/// ```
/// use gosdk::artefact::extraction::TarGzInstaller;
/// use gosdk::fs::OsFs;
///
/// let installer = TarGzInstaller::new(&OsFs);
/// // Use installer.install(&bytes, target_dir) in production
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ArchiveInstaller {
    /// Unpack `archive` into `target_dir`, creating it first.
    ///
    /// Returns the rewritten relative paths that were materialised, in
    /// stream order.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::PathTraversal`] if any entry attempts to
    /// escape the destination directory, [`ExtractionError::Archive`] if the
    /// stream is not a valid gzip-compressed tar archive, and
    /// [`ExtractionError::Write`] on filesystem failures. The first error
    /// aborts extraction; entries already written are left in place.
    fn install(
        &self,
        archive: &[u8],
        target_dir: &Utf8Path,
    ) -> Result<Vec<Utf8PathBuf>, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// The gzip or tar stream could not be decoded.
    #[error("failed to read archive: {source}")]
    Archive {
        /// Underlying decoding error.
        #[source]
        source: io::Error,
    },

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// An entry path is not valid UTF-8.
    #[error("archive entry path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },

    /// Writing an entry to the filesystem failed.
    #[error("failed to write {path}: {source}")]
    Write {
        /// Destination that could not be written.
        path: Utf8PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
}

/// Installer for `.tar.gz` archives writing through a [`Filesystem`].
///
/// Symbolic-link entries are materialised only when the filesystem exposes
/// the symlink capability; otherwise they are skipped with a warning.
pub struct TarGzInstaller<'a> {
    fs: &'a dyn Filesystem,
}

impl<'a> TarGzInstaller<'a> {
    /// Create an installer writing through `fs`.
    #[must_use]
    pub fn new(fs: &'a dyn Filesystem) -> Self {
        Self { fs }
    }

    fn write_file(
        &self,
        entry: &mut impl io::Read,
        dest: &Utf8Path,
        mode: u32,
    ) -> Result<(), ExtractionError> {
        if let Some(parent) = dest.parent() {
            self.fs
                .create_dir_all(parent, DEFAULT_DIR_MODE)
                .map_err(|source| write_error(parent, source))?;
        }
        let mut writer = self
            .fs
            .create_file(dest, mode)
            .map_err(|source| write_error(dest, source))?;
        io::copy(entry, &mut writer).map_err(|source| write_error(dest, source))?;
        writer.flush().map_err(|source| write_error(dest, source))?;
        Ok(())
    }

    /// Returns `false` when the entry was skipped.
    fn write_symlink(
        &self,
        relative: &Utf8Path,
        link_target: &Utf8Path,
        dest: &Utf8Path,
    ) -> Result<bool, ExtractionError> {
        let Some(symlinker) = self.fs.symlinker() else {
            warn!(
                "skipping symbolic link {relative}: the {} filesystem cannot create links",
                self.fs.name()
            );
            return Ok(false);
        };
        if link_escapes(relative, link_target) {
            return Err(ExtractionError::PathTraversal {
                path: format!("{relative} -> {link_target}"),
            });
        }
        if let Some(parent) = dest.parent() {
            self.fs
                .create_dir_all(parent, DEFAULT_DIR_MODE)
                .map_err(|source| write_error(parent, source))?;
        }
        match symlinker.remove_link(dest) {
            Err(source) if source.kind() != io::ErrorKind::NotFound => {
                return Err(write_error(dest, source));
            }
            _ => {}
        }
        symlinker
            .symlink(link_target, dest)
            .map_err(|source| write_error(dest, source))?;
        Ok(true)
    }
}

impl ArchiveInstaller for TarGzInstaller<'_> {
    fn install(
        &self,
        archive: &[u8],
        target_dir: &Utf8Path,
    ) -> Result<Vec<Utf8PathBuf>, ExtractionError> {
        self.fs
            .create_dir_all(target_dir, DEFAULT_DIR_MODE)
            .map_err(|source| write_error(target_dir, source))?;

        let mut tar = tar::Archive::new(GzDecoder::new(archive));
        let mut materialised = Vec::new();

        for entry_result in tar.entries().map_err(archive_error)? {
            let mut entry = entry_result.map_err(archive_error)?;
            let raw_path = utf8_path(entry.path().map_err(archive_error)?.into_owned())?;

            validate_entry_path(&raw_path)?;
            let Some(relative) = strip_wrapper(&raw_path) else {
                trace!("skipping wrapper entry {raw_path}");
                continue;
            };

            let dest = target_dir.join(&relative);
            let mode = entry.header().mode().map_err(archive_error)? & MODE_MASK;
            let written = match entry.header().entry_type() {
                EntryType::Directory => {
                    self.fs
                        .create_dir_all(&dest, mode)
                        .map_err(|source| write_error(&dest, source))?;
                    true
                }
                EntryType::Regular | EntryType::Continuous => {
                    self.write_file(&mut entry, &dest, mode)?;
                    true
                }
                EntryType::Symlink => {
                    let link_target = entry
                        .link_name()
                        .map_err(archive_error)?
                        .map(|target| utf8_path(target.into_owned()))
                        .transpose()?
                        .unwrap_or_default();
                    self.write_symlink(&relative, &link_target, &dest)?
                }
                other => {
                    debug!("skipping {other:?} entry {raw_path}");
                    false
                }
            };

            if written {
                trace!("extracted {relative}");
                materialised.push(relative);
            }
        }

        debug!("extracted {} entries into {target_dir}", materialised.len());
        Ok(materialised)
    }
}

/// Drop leading `.` segments and the wrapper directory from an entry path.
///
/// Returns `None` when nothing remains, i.e. for the wrapper itself.
fn strip_wrapper(path: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut components = path
        .components()
        .skip_while(|component| matches!(component, Utf8Component::CurDir));
    components.next()?;
    let rest: Utf8PathBuf = components.collect();
    (!rest.as_str().is_empty()).then_some(rest)
}

/// Validate that a tar entry path does not escape the destination
/// directory via `..` components, a root, or a drive prefix.
fn validate_entry_path(path: &Utf8Path) -> Result<(), ExtractionError> {
    let escapes = path.components().any(|component| {
        matches!(
            component,
            Utf8Component::ParentDir | Utf8Component::RootDir | Utf8Component::Prefix(_)
        )
    });
    if escapes {
        return Err(ExtractionError::PathTraversal {
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Report whether a link at `relative` pointing to `target` resolves outside
/// the install directory.
fn link_escapes(relative: &Utf8Path, target: &Utf8Path) -> bool {
    let mut depth = relative
        .parent()
        .map_or(0, |parent| parent.components().count());
    for component in target.components() {
        match component {
            Utf8Component::Normal(_) => depth += 1,
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if depth == 0 {
                    return true;
                }
                depth -= 1;
            }
            Utf8Component::RootDir | Utf8Component::Prefix(_) => return true,
        }
    }
    false
}

fn utf8_path(path: std::path::PathBuf) -> Result<Utf8PathBuf, ExtractionError> {
    Utf8PathBuf::from_path_buf(path).map_err(|path| ExtractionError::NonUtf8Path {
        path: path.display().to_string(),
    })
}

fn archive_error(source: io::Error) -> ExtractionError {
    ExtractionError::Archive { source }
}

fn write_error(path: &Utf8Path, source: io::Error) -> ExtractionError {
    ExtractionError::Write {
        path: path.to_owned(),
        source,
    }
}
