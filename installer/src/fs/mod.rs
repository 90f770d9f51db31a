//! Filesystem capability consumed by the SDK lifecycle.
//!
//! Every component that touches storage goes through [`Filesystem`] so the
//! same logic runs against the real operating system ([`OsFs`]) or an
//! in-memory tree in tests (`MemoryFs`, behind the `test-support` feature).
//! Symbolic links are a separate capability: only backends that can provide
//! real links return a [`Symlinker`] from [`Filesystem::symlinker`].

use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};

#[cfg(any(test, feature = "test-support"))]
mod memory;
mod os;

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryFs;
pub use os::OsFs;

/// Permission bits used for directories created implicitly.
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// One immediate child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// File name of the child.
    pub name: String,
    /// Whether the child itself is a directory. Symbolic links are never
    /// reported as directories, whatever they point at.
    pub is_dir: bool,
}

/// Storage operations needed to install, list, and switch SDK versions.
pub trait Filesystem {
    /// Short backend name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Create `path` and any missing parents with the given permission bits.
    ///
    /// # Errors
    ///
    /// Returns an error if a component exists as a non-directory or cannot be
    /// created.
    fn create_dir_all(&self, path: &Utf8Path, mode: u32) -> io::Result<()>;

    /// Create or truncate the file at `path` with the given permission bits and
    /// return a writer for its contents. The file is closed when the writer is
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory is missing or the file cannot
    /// be opened for writing.
    fn create_file(&self, path: &Utf8Path, mode: u32) -> io::Result<Box<dyn Write + '_>>;

    /// Read the whole file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or unreadable.
    fn read_file(&self, path: &Utf8Path) -> io::Result<Vec<u8>>;

    /// List the immediate children of `path` in backend order.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is missing or not a readable directory.
    fn read_dir(&self, path: &Utf8Path) -> io::Result<Vec<DirEntry>>;

    /// Report whether `path` resolves to a directory, following links.
    fn is_dir(&self, path: &Utf8Path) -> bool;

    /// Return the symbolic-link capability when the backend supports it.
    fn symlinker(&self) -> Option<&dyn Symlinker>;
}

/// Symbolic-link operations, available only on backends with real links.
pub trait Symlinker {
    /// Create a symbolic link at `link` pointing to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if `link` already exists or cannot be created.
    fn symlink(&self, target: &Utf8Path, link: &Utf8Path) -> io::Result<()>;

    /// Return the target recorded in the link at `link`.
    ///
    /// # Errors
    ///
    /// Returns an error if `link` is missing or not a symbolic link.
    fn read_link(&self, link: &Utf8Path) -> io::Result<Utf8PathBuf>;

    /// Remove the entry at `link` without following it.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::NotFound`] if nothing exists at `link`, or
    /// another error if removal fails.
    fn remove_link(&self, link: &Utf8Path) -> io::Result<()>;
}
