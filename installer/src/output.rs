//! Output formatting for the gosdk CLI.
//!
//! Command results go to stdout; progress and diagnostics go to stderr.

use std::fmt::Display;
use std::io::Write;

use crate::sdk::InstallReport;
use crate::version::Version;

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Format installed versions for display, marking the current one.
///
/// Versions are listed in the order given.
///
/// # Examples
///
/// ```
/// use gosdk::output::format_version_list;
/// use gosdk::version::Version;
///
/// let installed = [Version::from_canonical("1.16"), Version::from_canonical("1.17.1")];
/// let current = Version::from_canonical("1.17.1");
/// let text = format_version_list(&installed, Some(&current));
/// assert_eq!(text, "  1.16\n* 1.17.1 (current)");
/// ```
#[must_use]
pub fn format_version_list(versions: &[Version], current: Option<&Version>) -> String {
    if versions.is_empty() {
        return concat!(
            "No Go versions installed.\n\n",
            "Install one with: gosdk install <version>"
        )
        .to_owned();
    }

    versions
        .iter()
        .map(|version| {
            let is_current = current.is_some_and(|active| active.number() == version.number());
            if is_current {
                format!("* {version} (current)")
            } else {
                format!("  {version}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Generate the success message shown after an install.
#[must_use]
pub fn install_summary(report: &InstallReport) -> String {
    format!(
        "Installed Go {} into {} ({} entries).\n\nActivate it with: gosdk use {}",
        report.version, report.target, report.entries, report.version
    )
}
