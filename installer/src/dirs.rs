//! Directory resolution abstraction for platform-specific paths.

use std::path::PathBuf;

/// Source of the per-user directories the configuration defaults derive
/// from.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// The user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;

    /// The platform configuration directory (e.g. `~/.config` on Linux).
    fn config_dir(&self) -> Option<PathBuf>;
}

/// [`BaseDirs`] backed by `directories-next`.
///
/// Every method returns `None` when the platform reports no home directory.
///
/// # Examples
///
/// ```
/// use gosdk::dirs::{BaseDirs, SystemBaseDirs};
///
/// let dirs = SystemBaseDirs::new();
/// if let Some(home) = dirs.home_dir() {
///     assert!(home.is_absolute());
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SystemBaseDirs {
    dirs: Option<directories_next::BaseDirs>,
}

impl SystemBaseDirs {
    /// Query the platform for the current user's directories.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dirs: directories_next::BaseDirs::new(),
        }
    }
}

impl Default for SystemBaseDirs {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseDirs for SystemBaseDirs {
    fn home_dir(&self) -> Option<PathBuf> {
        self.dirs.as_ref().map(|dirs| dirs.home_dir().to_path_buf())
    }

    fn config_dir(&self) -> Option<PathBuf> {
        self.dirs.as_ref().map(|dirs| dirs.config_dir().to_path_buf())
    }
}
