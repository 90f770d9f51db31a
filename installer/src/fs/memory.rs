//! In-memory filesystem for tests.
//!
//! Paths are treated lexically: no normalisation beyond what
//! [`Utf8Path::components`] does, and no symbolic links.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use super::{DirEntry, Filesystem, Symlinker};

#[derive(Debug, Clone)]
enum Node {
    Dir { mode: u32 },
    File { mode: u32, contents: Vec<u8> },
}

type Tree = BTreeMap<Utf8PathBuf, Node>;

/// [`Filesystem`] held entirely in memory. It has no symlink capability.
///
/// Clones share the same tree, so a test can keep a handle for inspection
/// while another is lent to the code under test.
///
/// # Examples
///
/// ```
/// use camino::Utf8Path;
/// use gosdk::fs::{Filesystem, MemoryFs};
///
/// let fs = MemoryFs::new();
/// fs.create_dir_all(Utf8Path::new("/sdk/go/1.17.1"), 0o755)
///     .expect("mkdir");
/// assert!(fs.is_dir(Utf8Path::new("/sdk/go")));
/// assert!(fs.symlinker().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    tree: Arc<Mutex<Tree>>,
}

impl MemoryFs {
    /// Create an empty filesystem.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the permission bits recorded for `path`, if it exists.
    #[must_use]
    pub fn mode(&self, path: &Utf8Path) -> Option<u32> {
        self.lock().get(&normalise(path)).map(|node| match node {
            Node::Dir { mode } | Node::File { mode, .. } => *mode,
        })
    }

    /// Return every file path in the tree, sorted.
    #[must_use]
    pub fn files(&self) -> Vec<Utf8PathBuf> {
        self.lock()
            .iter()
            .filter(|(_, node)| matches!(node, Node::File { .. }))
            .map(|(path, _)| path.clone())
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Tree> {
        // A poisoned tree still holds consistent nodes; each mutation is a
        // single map operation.
        self.tree
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Filesystem for MemoryFs {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn create_dir_all(&self, path: &Utf8Path, mode: u32) -> io::Result<()> {
        let path = normalise(path);
        let mut tree = self.lock();
        let mut current = Utf8PathBuf::new();
        for component in path.components() {
            current.push(component);
            match tree.get(&current) {
                Some(Node::Dir { .. }) => {}
                Some(Node::File { .. }) => {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("{current} exists and is not a directory"),
                    ));
                }
                None => {
                    tree.insert(current.clone(), Node::Dir { mode });
                }
            }
        }
        Ok(())
    }

    fn create_file(&self, path: &Utf8Path, mode: u32) -> io::Result<Box<dyn Write + '_>> {
        let path = normalise(path);
        let mut tree = self.lock();
        if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
            if !matches!(tree.get(parent), Some(Node::Dir { .. })) {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("parent directory {parent} does not exist"),
                ));
            }
        }
        if matches!(tree.get(&path), Some(Node::Dir { .. })) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{path} is a directory"),
            ));
        }
        let mode = match tree.get(&path) {
            Some(Node::File { mode, .. }) => *mode,
            _ => mode,
        };
        tree.insert(
            path.clone(),
            Node::File {
                mode,
                contents: Vec::new(),
            },
        );
        drop(tree);
        Ok(Box::new(MemoryFile { fs: self, path }))
    }

    fn read_file(&self, path: &Utf8Path) -> io::Result<Vec<u8>> {
        match self.lock().get(&normalise(path)) {
            Some(Node::File { contents, .. }) => Ok(contents.clone()),
            Some(Node::Dir { .. }) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{path} is a directory"),
            )),
            None => Err(not_found(path)),
        }
    }

    fn read_dir(&self, path: &Utf8Path) -> io::Result<Vec<DirEntry>> {
        let path = normalise(path);
        let tree = self.lock();
        if !matches!(tree.get(&path), Some(Node::Dir { .. })) {
            return Err(not_found(&path));
        }
        let entries = tree
            .iter()
            .filter(|(candidate, _)| candidate.parent() == Some(path.as_path()))
            .filter_map(|(candidate, node)| {
                candidate.file_name().map(|name| DirEntry {
                    name: name.to_owned(),
                    is_dir: matches!(node, Node::Dir { .. }),
                })
            })
            .collect();
        Ok(entries)
    }

    fn is_dir(&self, path: &Utf8Path) -> bool {
        matches!(self.lock().get(&normalise(path)), Some(Node::Dir { .. }))
    }

    fn symlinker(&self) -> Option<&dyn Symlinker> {
        None
    }
}

/// Writer appending to one in-memory file.
struct MemoryFile<'a> {
    fs: &'a MemoryFs,
    path: Utf8PathBuf,
}

impl Write for MemoryFile<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.fs.lock().get_mut(&self.path) {
            Some(Node::File { contents, .. }) => {
                contents.extend_from_slice(buf);
                Ok(buf.len())
            }
            _ => Err(not_found(&self.path)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn normalise(path: &Utf8Path) -> Utf8PathBuf {
    path.components()
        .filter(|component| !matches!(component, Utf8Component::CurDir))
        .collect()
}

fn not_found(path: &Utf8Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{path} does not exist"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_file_requires_parent() {
        let fs = MemoryFs::new();
        let err = fs
            .create_file(Utf8Path::new("/missing/VERSION"), 0o644)
            .err()
            .expect("missing parent");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn written_bytes_read_back() {
        let fs = MemoryFs::new();
        fs.create_dir_all(Utf8Path::new("/root"), 0o755).expect("mkdir");
        let mut file = fs
            .create_file(Utf8Path::new("/root/VERSION"), 0o644)
            .expect("create");
        file.write_all(b"go1.17.1\n").expect("write");
        drop(file);

        let contents = fs.read_file(Utf8Path::new("/root/VERSION")).expect("read");
        assert_eq!(contents, b"go1.17.1\n");
        assert_eq!(fs.mode(Utf8Path::new("/root/VERSION")), Some(0o644));
    }

    #[test]
    fn read_dir_lists_immediate_children_only() {
        let fs = MemoryFs::new();
        fs.create_dir_all(Utf8Path::new("/root/1.16/bin"), 0o755)
            .expect("mkdir");
        fs.create_dir_all(Utf8Path::new("/root/1.17"), 0o755)
            .expect("mkdir");

        let names: Vec<String> = fs
            .read_dir(Utf8Path::new("/root"))
            .expect("read_dir")
            .into_iter()
            .map(|entry| entry.name)
            .collect();
        assert_eq!(names, vec!["1.16".to_owned(), "1.17".to_owned()]);
    }

    #[test]
    fn create_dir_all_rejects_file_component() {
        let fs = MemoryFs::new();
        fs.create_dir_all(Utf8Path::new("/root"), 0o755).expect("mkdir");
        drop(
            fs.create_file(Utf8Path::new("/root/bin"), 0o644)
                .expect("create"),
        );

        let err = fs
            .create_dir_all(Utf8Path::new("/root/bin/go"), 0o755)
            .expect_err("file in the way");
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn clones_share_state() {
        let fs = MemoryFs::new();
        let handle = fs.clone();
        fs.create_dir_all(Utf8Path::new("/shared"), 0o755)
            .expect("mkdir");
        assert!(handle.is_dir(Utf8Path::new("/shared")));
    }
}
