//! CLI argument definitions for gosdk.
//!
//! This module defines the command-line interface using clap. It is separated
//! from the main entrypoint to keep the binary small and focused on
//! orchestration.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

use crate::config::ConfigOverrides;

/// Install Go SDK releases side by side and switch the active one.
#[derive(Parser, Debug)]
#[command(name = "gosdk")]
#[command(version, about)]
#[command(long_about = concat!(
    "Install Go SDK releases side by side and switch the active one.\n\n",
    "Each version is unpacked into its own directory under the install root. ",
    "A `current` symbolic link in the root points at the active version, so ",
    "adding <root>/current/bin to PATH always selects it.",
))]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Install a release:\n",
    "    $ gosdk install 1.17.1\n\n",
    "  Make it the active version:\n",
    "    $ gosdk use 1.17.1\n\n",
    "  List installed versions:\n",
    "    $ gosdk list\n\n",
    "  Print the active version:\n",
    "    $ gosdk current\n\n",
    "ENVIRONMENT:\n",
    "  GOSDK_ROOT          SDK root (versions live under <root>/go)\n",
    "  GOSDK_DOWNLOAD_URL  Download host base URL\n",
    "  GOSDK_CONFIG        Configuration file path\n",
    "  GOSDK_LOG           Log filter (e.g. debug, gosdk=trace)",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Download and unpack a Go release.
    Install(VersionArgs),

    /// Make an installed version the active one.
    Use(VersionArgs),

    /// List installed versions.
    List,

    /// Print the active version.
    Current,
}

/// Positional version argument.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct VersionArgs {
    /// Go version, with or without a leading `v` (e.g. 1.17.1, v1.16).
    #[arg(value_name = "VERSION")]
    pub version: String,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Install root holding one directory per version [default: ~/.gosdk/sdks/go].
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<Utf8PathBuf>,

    /// Download host base URL [default: `https://go.dev`].
    #[arg(long, global = true, value_name = "URL")]
    pub download_url: Option<String>,

    /// Download timeout in seconds; 0 disables the limit [default: 300].
    #[arg(long, global = true, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Install archives for this GOOS instead of the host's.
    #[arg(long, global = true, value_name = "GOOS")]
    pub os: Option<String>,

    /// Install archives for this GOARCH instead of the host's.
    #[arg(long, global = true, value_name = "GOARCH")]
    pub arch: Option<String>,

    /// Increase log verbosity (repeatable: -v, -vv, -vvv).
    #[arg(
        short,
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Suppress progress output (errors still shown).
    #[arg(short, long, global = true, conflicts_with = "verbosity")]
    pub quiet: bool,
}

impl GlobalArgs {
    /// Return the configuration layer these flags supply.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root: self.root.clone(),
            download_url: self.download_url.clone(),
            timeout_secs: self.timeout,
        }
    }

    /// Return the log filter implied by `-q` and `-v`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gosdk::cli::GlobalArgs;
    ///
    /// let args = GlobalArgs { verbosity: 2, ..GlobalArgs::default() };
    /// assert_eq!(args.log_level(), "debug");
    /// ```
    #[must_use]
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
