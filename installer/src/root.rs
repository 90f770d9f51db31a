//! Install root layout.
//!
//! ```text
//! <root>/<version>/...          one directory per installed version
//! <root>/current -> <root>/<v>  the active version
//! ```

use camino::{Utf8Path, Utf8PathBuf};

use crate::version::Version;

/// Name of the link recording the active version.
pub const CURRENT_LINK: &str = "current";

/// The directory holding every installed SDK version.
///
/// # Examples
///
/// ```
/// use gosdk::root::InstallRoot;
/// use gosdk::version::Version;
///
/// let root = InstallRoot::new("/home/gopher/.gosdk/sdks/go");
/// let version = Version::parse("v1.17.1").expect("valid version");
/// assert_eq!(
///     root.version_dir(&version).as_str(),
///     "/home/gopher/.gosdk/sdks/go/1.17.1"
/// );
/// assert_eq!(root.current_link().as_str(), "/home/gopher/.gosdk/sdks/go/current");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRoot(Utf8PathBuf);

impl InstallRoot {
    /// Wrap the install root directory.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self(path.into())
    }

    /// Return the root directory.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.0
    }

    /// Return the install directory for `version`.
    #[must_use]
    pub fn version_dir(&self, version: &Version) -> Utf8PathBuf {
        self.0.join(version.as_str())
    }

    /// Return the path of the `current` link.
    #[must_use]
    pub fn current_link(&self) -> Utf8PathBuf {
        self.0.join(CURRENT_LINK)
    }
}

impl AsRef<Utf8Path> for InstallRoot {
    fn as_ref(&self) -> &Utf8Path {
        &self.0
    }
}
