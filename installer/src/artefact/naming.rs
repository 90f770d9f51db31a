//! Release archive naming and download URLs.
//!
//! Go publishes each release as `go<version>.<os>-<arch>.tar.gz` under
//! `<base>/dl/`.

use std::fmt;

use super::platform::Platform;
use crate::version::Version;

/// The fixed product prefix for all archive names.
const ARTEFACT_PREFIX: &str = "go";

/// The fixed file extension for release archives.
const ARTEFACT_EXTENSION: &str = ".tar.gz";

/// Path segment under which the download host serves archives.
const DOWNLOAD_PATH: &str = "dl";

/// A release archive filename for one version and platform.
///
/// # Examples
///
/// ```
/// use gosdk::artefact::naming::ArtefactName;
/// use gosdk::artefact::platform::Platform;
/// use gosdk::version::Version;
///
/// let platform = Platform::new("linux", "amd64").expect("known platform");
/// let version = Version::parse("v1.17.1").expect("valid version");
///
/// let name = ArtefactName::new(platform, version);
/// assert_eq!(name.to_string(), "go1.17.1.linux-amd64.tar.gz");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtefactName {
    platform: Platform,
    version: Version,
}

impl ArtefactName {
    /// Create an archive name from a platform and version.
    #[must_use]
    pub fn new(platform: Platform, version: Version) -> Self {
        Self { platform, version }
    }

    /// Return the platform component.
    #[must_use]
    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Return the version component.
    #[must_use]
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Return the filename as a string without consuming the value.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ArtefactName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{ARTEFACT_PREFIX}{}.{}{ARTEFACT_EXTENSION}",
            self.version.number(),
            self.platform
        )
    }
}

/// Join a download host base URL and an archive name.
///
/// A trailing `/` on `base` is tolerated.
///
/// ```
/// use gosdk::artefact::naming::download_url;
///
/// assert_eq!(
///     download_url("https://go.dev/", "go1.16.linux-amd64.tar.gz"),
///     "https://go.dev/dl/go1.16.linux-amd64.tar.gz"
/// );
/// ```
#[must_use]
pub fn download_url(base: &str, name: &str) -> String {
    format!("{}/{DOWNLOAD_PATH}/{name}", base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn linux_amd64() -> Platform {
        Platform::new("linux", "amd64").expect("valid platform")
    }

    #[rstest]
    #[case::full("v1.17.1", "go1.17.1.linux-amd64.tar.gz")]
    #[case::short("1.16", "go1.16.linux-amd64.tar.gz")]
    #[case::pre_release("1.21.0-rc.2", "go1.21.0-rc.2.linux-amd64.tar.gz")]
    fn filename_uses_bare_version(
        linux_amd64: Platform,
        #[case] input: &str,
        #[case] expected: &str,
    ) {
        let version = Version::parse(input).expect("valid version");
        let name = ArtefactName::new(linux_amd64, version);
        assert_eq!(name.filename(), expected);
    }

    #[test]
    fn filename_strips_v_from_stored_names() {
        let platform = Platform::new("darwin", "arm64").expect("valid platform");
        let name = ArtefactName::new(platform, Version::from_canonical("v1.16"));
        assert_eq!(name.filename(), "go1.16.darwin-arm64.tar.gz");
    }

    #[rstest]
    #[case::plain("https://go.dev")]
    #[case::trailing_slash("https://go.dev/")]
    fn download_url_joins_under_dl(#[case] base: &str) {
        assert_eq!(
            download_url(base, "go1.17.1.linux-amd64.tar.gz"),
            "https://go.dev/dl/go1.17.1.linux-amd64.tar.gz"
        );
    }

    #[test]
    fn download_url_keeps_mirror_path() {
        assert_eq!(
            download_url("https://mirror.example/golang", "go1.16.linux-386.tar.gz"),
            "https://mirror.example/golang/dl/go1.16.linux-386.tar.gz"
        );
    }

    #[rstest]
    fn accessors_return_components(linux_amd64: Platform) {
        let version = Version::parse("1.18").expect("valid");
        let name = ArtefactName::new(linux_amd64.clone(), version.clone());
        assert_eq!(name.platform(), &linux_amd64);
        assert_eq!(name.version(), &version);
    }
}
