//! Filesystem backend for the host operating system.

use std::fs;
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};

use super::{DirEntry, Filesystem, Symlinker};

/// [`Filesystem`] backed by `std::fs`, with real symbolic links.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl Filesystem for OsFs {
    fn name(&self) -> &'static str {
        "os"
    }

    #[cfg_attr(
        not(unix),
        expect(unused_variables, reason = "permission bits only apply on Unix")
    )]
    fn create_dir_all(&self, path: &Utf8Path, mode: u32) -> io::Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        builder.create(path)
    }

    #[cfg_attr(
        not(unix),
        expect(unused_variables, reason = "permission bits only apply on Unix")
    )]
    fn create_file(&self, path: &Utf8Path, mode: u32) -> io::Result<Box<dyn Write + '_>> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        let file = options.open(path)?;
        Ok(Box::new(file))
    }

    fn read_file(&self, path: &Utf8Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn read_dir(&self, path: &Utf8Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in path.read_dir_utf8()? {
            let entry = entry?;
            let is_dir = entry.file_type()?.is_dir();
            entries.push(DirEntry {
                name: entry.file_name().to_owned(),
                is_dir,
            });
        }
        Ok(entries)
    }

    fn is_dir(&self, path: &Utf8Path) -> bool {
        path.is_dir()
    }

    fn symlinker(&self) -> Option<&dyn Symlinker> {
        Some(self)
    }
}

impl Symlinker for OsFs {
    #[cfg_attr(
        not(any(unix, windows)),
        expect(unused_variables, reason = "no symlink primitive on this platform")
    )]
    fn symlink(&self, target: &Utf8Path, link: &Utf8Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link)
        }
        #[cfg(windows)]
        {
            // Relative targets resolve against the link's directory.
            let resolved = link
                .parent()
                .map_or_else(|| target.to_owned(), |dir| dir.join(target));
            if resolved.is_dir() {
                std::os::windows::fs::symlink_dir(target, link)
            } else {
                std::os::windows::fs::symlink_file(target, link)
            }
        }
        #[cfg(not(any(unix, windows)))]
        {
            Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "symbolic links are not supported on this platform",
            ))
        }
    }

    fn read_link(&self, link: &Utf8Path) -> io::Result<Utf8PathBuf> {
        let target = link.read_link_utf8()?;
        Ok(target)
    }

    fn remove_link(&self, link: &Utf8Path) -> io::Result<()> {
        let metadata = link.symlink_metadata()?;
        if metadata.is_dir() {
            return fs::remove_dir(link);
        }
        match fs::remove_file(link) {
            // Directory symlinks on Windows are removed as directories.
            Err(err) if cfg!(windows) && metadata.file_type().is_symlink() => {
                fs::remove_dir(link).map_err(|_| err)
            }
            other => other,
        }
    }
}
