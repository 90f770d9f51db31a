//! Layered configuration.
//!
//! Settings are resolved once at startup, each layer overriding the one
//! before it:
//!
//! 1. built-in defaults (`~/.gosdk/sdks`, `https://go.dev`, 300 seconds);
//! 2. the TOML file at `$GOSDK_CONFIG`, or `<config dir>/gosdk/config.toml`;
//! 3. the `GOSDK_ROOT` and `GOSDK_DOWNLOAD_URL` environment variables;
//! 4. command-line overrides.
//!
//! The SDK root holds one directory per product; Go SDKs live under
//! `<sdk root>/go`. The `--root` override names that install root directly.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, trace};
use serde::Deserialize;

use crate::dirs::BaseDirs;
use crate::error::{Result, SdkError};

/// Default download host.
pub const DEFAULT_DOWNLOAD_URL: &str = "https://go.dev";

/// Default limit on a single archive download.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "GOSDK_CONFIG";

/// Environment variable overriding the SDK root.
pub const ROOT_ENV: &str = "GOSDK_ROOT";

/// Environment variable overriding the download host.
pub const DOWNLOAD_URL_ENV: &str = "GOSDK_DOWNLOAD_URL";

/// Product directory beneath the SDK root.
const PRODUCT_DIR: &str = "go";

/// SDK root beneath the home directory.
const DEFAULT_SDK_ROOT: &str = ".gosdk/sdks";

/// Contents of the optional configuration file.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Directory holding per-product SDK roots.
    pub sdk_root: Option<Utf8PathBuf>,
    /// Download host base URL.
    pub download_url: Option<String>,
    /// Download timeout in seconds; `0` disables the limit.
    pub timeout_secs: Option<u64>,
}

impl ConfigFile {
    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Config`] naming `path` if the text is not valid
    /// TOML or contains unknown keys.
    pub fn parse(text: &str, path: &Utf8Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| SdkError::Config {
            path: path.to_owned(),
            reason: e.to_string().trim_end().to_owned(),
        })
    }
}

/// Values supplied on the command line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Install root, used as-is.
    pub root: Option<Utf8PathBuf>,
    /// Download host base URL.
    pub download_url: Option<String>,
    /// Download timeout in seconds; `0` disables the limit.
    pub timeout_secs: Option<u64>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory holding one subdirectory per installed version.
    pub install_root: Utf8PathBuf,
    /// Download host base URL.
    pub download_url: String,
    /// Limit on a single archive download, if any.
    pub timeout: Option<Duration>,
}

/// Resolve settings from every layer, reading the process environment.
///
/// # Errors
///
/// Returns [`SdkError::Config`] if a configuration file exists but cannot be
/// read or parsed, or if `GOSDK_CONFIG` names a missing file. Returns
/// [`SdkError::ConfigUnavailable`] if no layer provides a root and the home
/// directory is unknown.
pub fn resolve_settings(dirs: &dyn BaseDirs, overrides: &ConfigOverrides) -> Result<Settings> {
    let file = load_config_file(dirs)?;
    let env_root = env_var(ROOT_ENV);
    let env_url = env_var(DOWNLOAD_URL_ENV);

    let install_root = match (&overrides.root, env_root, &file.sdk_root) {
        (Some(root), _, _) => root.clone(),
        (None, Some(sdk_root), _) => Utf8PathBuf::from(sdk_root).join(PRODUCT_DIR),
        (None, None, Some(sdk_root)) => sdk_root.join(PRODUCT_DIR),
        (None, None, None) => default_sdk_root(dirs)?.join(PRODUCT_DIR),
    };

    let download_url = overrides
        .download_url
        .clone()
        .or(env_url)
        .or(file.download_url)
        .unwrap_or_else(|| DEFAULT_DOWNLOAD_URL.to_owned());

    let timeout = match overrides.timeout_secs.or(file.timeout_secs) {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => Some(DEFAULT_TIMEOUT),
    };

    let settings = Settings {
        install_root,
        download_url,
        timeout,
    };
    debug!("resolved settings: {settings:?}");
    Ok(settings)
}

/// Read the configuration file, treating an absent default file as empty.
fn load_config_file(dirs: &dyn BaseDirs) -> Result<ConfigFile> {
    let (path, explicit) = match env_var(CONFIG_ENV) {
        Some(path) => (Utf8PathBuf::from(path), true),
        None => match dirs.config_dir() {
            Some(dir) => (
                utf8(dir, "configuration directory")?
                    .join("gosdk")
                    .join("config.toml"),
                false,
            ),
            None => return Ok(ConfigFile::default()),
        },
    };

    match std::fs::read_to_string(&path) {
        Ok(text) => {
            trace!("loading configuration from {path}");
            ConfigFile::parse(&text, &path)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound && !explicit => {
            trace!("no configuration file at {path}");
            Ok(ConfigFile::default())
        }
        Err(e) => Err(SdkError::Config {
            path,
            reason: e.to_string(),
        }),
    }
}

fn default_sdk_root(dirs: &dyn BaseDirs) -> Result<Utf8PathBuf> {
    let home = dirs
        .home_dir()
        .ok_or_else(|| SdkError::ConfigUnavailable {
            reason: "no home directory".to_owned(),
        })?;
    Ok(utf8(home, "home directory")?.join(DEFAULT_SDK_ROOT))
}

fn utf8(path: PathBuf, what: &str) -> Result<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).map_err(|path| SdkError::ConfigUnavailable {
        reason: format!("{what} {} is not valid UTF-8", path.display()),
    })
}

/// Read a non-empty environment variable.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}
