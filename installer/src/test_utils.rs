//! Shared test utilities for the gosdk crate.
//!
//! Only compiled for tests or with the `test-support` feature.

use std::collections::HashMap;
use std::sync::Mutex;

use flate2::Compression;
use flate2::write::GzEncoder;
use tar::{EntryType, Header};

use crate::artefact::download::{ArchiveDownloader, DownloadError, FetchContext};

/// Builds gzip-compressed tar archives in memory.
///
/// Entry names are written into the header verbatim, so archives with
/// hostile paths (`../escape`, `/etc/passwd`) can be produced to exercise the
/// traversal guard.
///
/// # Examples
///
/// ```
/// use gosdk::test_utils::TarGzBuilder;
///
/// let archive = TarGzBuilder::new()
///     .dir("go", 0o755)
///     .file("go/VERSION", 0o644, b"go1.17.1\n")
///     .build();
/// assert!(!archive.is_empty());
/// ```
pub struct TarGzBuilder {
    builder: tar::Builder<GzEncoder<Vec<u8>>>,
}

impl Default for TarGzBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TarGzBuilder {
    /// Start an empty archive.
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default())),
        }
    }

    /// Append a directory entry.
    ///
    /// # Panics
    ///
    /// Panics if the entry cannot be appended.
    #[must_use]
    pub fn dir(self, path: &str, mode: u32) -> Self {
        self.append(path, EntryType::Directory, mode, None, b"")
    }

    /// Append a regular file entry.
    ///
    /// # Panics
    ///
    /// Panics if the entry cannot be appended.
    #[must_use]
    pub fn file(self, path: &str, mode: u32, contents: &[u8]) -> Self {
        self.append(path, EntryType::Regular, mode, None, contents)
    }

    /// Append a regular file entry; identical to [`Self::file`], named for
    /// call sites that deliberately use unusual paths.
    ///
    /// # Panics
    ///
    /// Panics if the entry cannot be appended.
    #[must_use]
    pub fn raw_file(self, path: &str, mode: u32, contents: &[u8]) -> Self {
        self.file(path, mode, contents)
    }

    /// Append a symbolic-link entry pointing at `target`.
    ///
    /// # Panics
    ///
    /// Panics if the entry cannot be appended.
    #[must_use]
    pub fn symlink(self, path: &str, target: &str) -> Self {
        self.append(path, EntryType::Symlink, 0o777, Some(target), b"")
    }

    /// Finish the archive and return its compressed bytes.
    ///
    /// # Panics
    ///
    /// Panics if the tar or gzip stream cannot be finalised.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        let encoder = self.builder.into_inner().expect("finish tar stream");
        encoder.finish().expect("finish gzip stream")
    }

    fn append(
        mut self,
        path: &str,
        entry_type: EntryType,
        mode: u32,
        link_target: Option<&str>,
        contents: &[u8],
    ) -> Self {
        let mut header = Header::new_old();
        write_field(&mut header.as_old_mut().name, path);
        if let Some(target) = link_target {
            write_field(&mut header.as_old_mut().linkname, target);
        }
        header.set_entry_type(entry_type);
        header.set_mode(mode);
        header.set_size(contents.len() as u64);
        header.set_mtime(0);
        header.set_cksum();
        self.builder
            .append(&header, contents)
            .expect("append archive entry");
        self
    }
}

/// Copy `value` into a fixed-width, NUL-padded header field.
fn write_field(field: &mut [u8], value: &str) {
    assert!(
        value.len() < field.len(),
        "archive field too long: {value}"
    );
    field.fill(0);
    for (slot, byte) in field.iter_mut().zip(value.bytes()) {
        *slot = byte;
    }
}

/// How a [`StubDownloader`] answers a request.
#[derive(Debug, Clone)]
pub enum StubResponse {
    /// Serve these bytes.
    Body(Vec<u8>),
    /// Answer as if the server returned HTTP 404.
    NotFound,
    /// Answer as if the transfer failed with this reason.
    Failure(String),
}

/// An [`ArchiveDownloader`] serving canned responses without network access.
///
/// Responses can be keyed by URL; any other URL gets the fallback response.
/// Every requested URL is recorded.
#[derive(Debug)]
pub struct StubDownloader {
    fallback: StubResponse,
    by_url: HashMap<String, StubResponse>,
    requests: Mutex<Vec<String>>,
}

impl StubDownloader {
    /// Serve `bytes` for every URL.
    #[must_use]
    pub fn serving(bytes: Vec<u8>) -> Self {
        Self::with_fallback(StubResponse::Body(bytes))
    }

    /// Answer every URL with HTTP 404.
    #[must_use]
    pub fn not_found() -> Self {
        Self::with_fallback(StubResponse::NotFound)
    }

    /// Answer every URL with `fallback`.
    #[must_use]
    pub fn with_fallback(fallback: StubResponse) -> Self {
        Self {
            fallback,
            by_url: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer `url` with `response`.
    #[must_use]
    pub fn route(mut self, url: impl Into<String>, response: StubResponse) -> Self {
        self.by_url.insert(url.into(), response);
        self
    }

    /// Return every URL requested so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the request log mutex is poisoned.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("request log lock").clone()
    }
}

impl ArchiveDownloader for StubDownloader {
    fn fetch(&self, ctx: &FetchContext, url: &str) -> Result<Vec<u8>, DownloadError> {
        self.requests
            .lock()
            .expect("request log lock")
            .push(url.to_owned());
        ctx.check(url)?;
        match self.by_url.get(url).unwrap_or(&self.fallback) {
            StubResponse::Body(bytes) => Ok(bytes.clone()),
            StubResponse::NotFound => Err(DownloadError::NotFound {
                url: url.to_owned(),
            }),
            StubResponse::Failure(reason) => Err(DownloadError::HttpError {
                url: url.to_owned(),
                reason: reason.clone(),
            }),
        }
    }
}
