//! gosdk CLI entrypoint.
//!
//! Resolves settings from flags, environment, and the configuration file,
//! then dispatches to the subcommand handlers. Command results go to stdout;
//! progress, logs, and errors go to stderr.

use std::io::Write;

use clap::Parser;
use gosdk::artefact::download::FetchContext;
use gosdk::artefact::platform::Platform;
use gosdk::cli::{Cli, Command, GlobalArgs};
use gosdk::commands::{InstallRequest, run_current, run_install, run_list, run_use};
use gosdk::config::{Settings, resolve_settings};
use gosdk::dirs::SystemBaseDirs;
use gosdk::error::Result;
use gosdk::fs::OsFs;
use gosdk::output::write_stderr_line;
use gosdk::sdk::SdkManager;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding a log filter directive.
const LOG_ENV: &str = "GOSDK_LOG";

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.global);

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

/// Route `log` records to stderr, filtered by `GOSDK_LOG` or `-q`/`-v`.
fn init_logging(global: &GlobalArgs) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(global.log_level()));
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
    if installed.is_err() {
        // A subscriber is already set; keep it.
    }
}

fn run(cli: &Cli, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
    let dirs = SystemBaseDirs::new();
    let settings = resolve_settings(&dirs, &cli.global.overrides())?;
    let manager = SdkManager::from_settings(&OsFs, &settings);
    let quiet = cli.global.quiet;

    match &cli.command {
        Command::Install(args) => {
            let platform = Platform::resolve(cli.global.os.as_deref(), cli.global.arch.as_deref())?;
            let ctx = fetch_context(&settings);
            let request = InstallRequest {
                input: &args.version,
                platform: &platform,
                ctx: &ctx,
                quiet,
            };
            run_install(&manager, request, stderr)
        }
        Command::Use(args) => run_use(&manager, &args.version, quiet, stderr),
        Command::List => run_list(&manager, stdout),
        Command::Current => run_current(&manager, stdout),
    }
}

fn fetch_context(settings: &Settings) -> FetchContext {
    match settings.timeout {
        Some(timeout) => FetchContext::new().with_timeout(timeout),
        None => FetchContext::new(),
    }
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use gosdk::error::SdkError;
    use gosdk::version::Version;
    use std::time::Duration;

    #[test]
    fn exit_code_for_run_result_returns_zero_on_success() {
        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Ok(()), &mut stderr);
        assert_eq!(exit_code, 0);
        assert!(stderr.is_empty());
    }

    #[test]
    fn exit_code_for_run_result_prints_error_and_returns_one() {
        let err = SdkError::VersionNotInstalled {
            version: Version::from_canonical("1.16"),
            root: Utf8PathBuf::from("/sdk/go"),
        };

        let mut stderr = Vec::new();
        let exit_code = exit_code_for_run_result(Err(err), &mut stderr);
        assert_eq!(exit_code, 1);

        let stderr_text = String::from_utf8(stderr).expect("stderr was not UTF-8");
        assert!(stderr_text.starts_with("error: Go 1.16 is not installed"));
    }

    #[test]
    fn fetch_context_without_timeout_has_no_deadline() {
        let settings = Settings {
            install_root: Utf8PathBuf::from("/sdk/go"),
            download_url: "https://go.dev".to_owned(),
            timeout: None,
        };
        assert!(fetch_context(&settings).deadline().is_none());
    }

    #[test]
    fn fetch_context_with_timeout_sets_deadline() {
        let settings = Settings {
            install_root: Utf8PathBuf::from("/sdk/go"),
            download_url: "https://go.dev".to_owned(),
            timeout: Some(Duration::from_secs(60)),
        };
        assert!(fetch_context(&settings).deadline().is_some());
    }
}
