//! SDK lifecycle orchestrator.
//!
//! [`SdkManager`] wires the pieces together for one install root: an
//! install runs name → download → extract, while listing and switching
//! delegate to the inventory and the `current` link.

use camino::Utf8PathBuf;
use log::{debug, info};

use crate::artefact::download::{ArchiveDownloader, FetchContext, HttpDownloader};
use crate::artefact::extraction::{ArchiveInstaller, TarGzInstaller};
use crate::artefact::naming::{ArtefactName, download_url};
use crate::artefact::platform::Platform;
use crate::config::Settings;
use crate::current::{get_current, set_current};
use crate::error::{Result, SdkError};
use crate::fs::Filesystem;
use crate::inventory::list_installed;
use crate::root::InstallRoot;
use crate::version::Version;

/// Summary of a completed install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// The installed version.
    pub version: Version,
    /// URL the archive was fetched from.
    pub url: String,
    /// Directory the archive was unpacked into.
    pub target: Utf8PathBuf,
    /// Number of archive entries written.
    pub entries: usize,
}

/// Manages the Go SDKs installed under one root.
///
/// # Examples
///
/// ```
/// use gosdk::artefact::platform::Platform;
/// use gosdk::fs::OsFs;
/// use gosdk::root::InstallRoot;
/// use gosdk::sdk::SdkManager;
/// use gosdk::version::Version;
///
/// let platform = Platform::new("linux", "amd64").expect("known platform");
/// let manager = SdkManager::new(&OsFs, InstallRoot::new("/opt/go"), "https://go.dev");
/// let version = Version::parse("1.17.1").expect("valid version");
/// assert_eq!(
///     manager.archive_url(&version, &platform),
///     "https://go.dev/dl/go1.17.1.linux-amd64.tar.gz"
/// );
/// ```
pub struct SdkManager<'a> {
    fs: &'a dyn Filesystem,
    root: InstallRoot,
    base_url: String,
}

impl<'a> SdkManager<'a> {
    /// Create a manager for `root`, fetching archives from `base_url`.
    #[must_use]
    pub fn new(fs: &'a dyn Filesystem, root: InstallRoot, base_url: impl Into<String>) -> Self {
        Self {
            fs,
            root,
            base_url: base_url.into(),
        }
    }

    /// Create a manager from resolved settings.
    #[must_use]
    pub fn from_settings(fs: &'a dyn Filesystem, settings: &Settings) -> Self {
        Self::new(
            fs,
            InstallRoot::new(settings.install_root.clone()),
            settings.download_url.clone(),
        )
    }

    /// Return the install root.
    #[must_use]
    pub fn root(&self) -> &InstallRoot {
        &self.root
    }

    /// Return the download URL of the `platform` archive for `version`.
    #[must_use]
    pub fn archive_url(&self, version: &Version, platform: &Platform) -> String {
        let name = ArtefactName::new(platform.clone(), version.clone());
        download_url(&self.base_url, &name.filename())
    }

    /// Download and unpack the `platform` archive for `version` using
    /// production HTTP and extraction implementations.
    ///
    /// # Errors
    ///
    /// See [`Self::install_with`].
    pub fn install(
        &self,
        version: &Version,
        platform: &Platform,
        ctx: &FetchContext,
    ) -> Result<InstallReport> {
        let installer = TarGzInstaller::new(self.fs);
        self.install_with(version, platform, ctx, &HttpDownloader::new(), &installer)
    }

    /// Testable inner install with injected downloader and installer.
    ///
    /// Installing a version that is already present overwrites its files in
    /// place. A failed install leaves whatever was written so far.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::DownloadFailed`] if the archive cannot be fetched
    /// and [`SdkError::ExtractFailed`] if it cannot be unpacked.
    pub fn install_with(
        &self,
        version: &Version,
        platform: &Platform,
        ctx: &FetchContext,
        downloader: &dyn ArchiveDownloader,
        installer: &dyn ArchiveInstaller,
    ) -> Result<InstallReport> {
        let url = self.archive_url(version, platform);
        info!("downloading Go {version} from {url}");
        let archive = downloader
            .fetch(ctx, &url)
            .map_err(|source| SdkError::DownloadFailed {
                version: version.clone(),
                source,
            })?;

        let target = self.root.version_dir(version);
        debug!("unpacking {} bytes into {target}", archive.len());
        let written = installer
            .install(&archive, &target)
            .map_err(|source| SdkError::ExtractFailed {
                target: target.clone(),
                source,
            })?;

        info!("installed Go {version} into {target}");
        Ok(InstallReport {
            version: version.clone(),
            url,
            target,
            entries: written.len(),
        })
    }

    /// Make `version` the active version.
    ///
    /// # Errors
    ///
    /// See [`set_current`].
    pub fn use_version(&self, version: &Version) -> Result<()> {
        set_current(self.fs, &self.root, version)
    }

    /// List installed versions in directory order.
    ///
    /// # Errors
    ///
    /// See [`list_installed`].
    pub fn installed(&self) -> Result<Vec<Version>> {
        list_installed(self.fs, &self.root)
    }

    /// Return the active version.
    ///
    /// # Errors
    ///
    /// See [`get_current`].
    pub fn current(&self) -> Result<Version> {
        get_current(self.fs, &self.root)
    }
}
