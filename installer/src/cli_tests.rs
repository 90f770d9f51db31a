//! Tests for gosdk CLI parsing and default behaviours.

use super::*;
use clap::error::ErrorKind;
use rstest::rstest;

#[test]
fn cli_parses_install_with_version() {
    let cli = Cli::parse_from(["gosdk", "install", "v1.17.1"]);
    assert_eq!(
        cli.command,
        Command::Install(VersionArgs {
            version: "v1.17.1".to_owned()
        })
    );
    assert_eq!(cli.global, GlobalArgs::default());
}

#[test]
fn cli_parses_use_with_version() {
    let cli = Cli::parse_from(["gosdk", "use", "1.16"]);
    assert!(matches!(cli.command, Command::Use(args) if args.version == "1.16"));
}

#[rstest]
#[case::list("list", Command::List)]
#[case::current("current", Command::Current)]
fn cli_parses_argumentless_subcommands(#[case] name: &str, #[case] expected: Command) {
    let cli = Cli::parse_from(["gosdk", name]);
    assert_eq!(cli.command, expected);
}

#[rstest]
#[case::install_without_version(&["gosdk", "install"][..])]
#[case::install_with_two_versions(&["gosdk", "install", "1.16", "1.17"][..])]
#[case::use_without_version(&["gosdk", "use"][..])]
#[case::list_with_argument(&["gosdk", "list", "1.16"][..])]
#[case::current_with_argument(&["gosdk", "current", "1.16"][..])]
fn cli_rejects_wrong_argument_count(#[case] argv: &[&str]) {
    let err = Cli::try_parse_from(argv).expect_err("argument count error");
    assert!(
        matches!(
            err.kind(),
            ErrorKind::MissingRequiredArgument | ErrorKind::UnknownArgument
        ),
        "unexpected error kind {:?}",
        err.kind()
    );
}

#[test]
fn cli_requires_a_subcommand() {
    assert!(Cli::try_parse_from(["gosdk"]).is_err());
}

#[test]
fn global_flags_are_accepted_after_the_subcommand() {
    let cli = Cli::parse_from([
        "gosdk",
        "install",
        "1.16",
        "--root",
        "/opt/go",
        "--download-url",
        "https://mirror.example",
        "--timeout",
        "60",
        "--os",
        "darwin",
        "--arch",
        "arm64",
    ]);

    assert_eq!(cli.global.root, Some(Utf8PathBuf::from("/opt/go")));
    assert_eq!(cli.global.os.as_deref(), Some("darwin"));
    assert_eq!(cli.global.arch.as_deref(), Some("arm64"));
    assert_eq!(
        cli.global.overrides(),
        ConfigOverrides {
            root: Some(Utf8PathBuf::from("/opt/go")),
            download_url: Some("https://mirror.example".to_owned()),
            timeout_secs: Some(60),
        }
    );
}

#[rstest]
#[case::default(&["gosdk", "list"][..], "warn")]
#[case::verbose(&["gosdk", "-v", "list"][..], "info")]
#[case::very_verbose(&["gosdk", "list", "-vvv"][..], "trace")]
#[case::quiet(&["gosdk", "-q", "list"][..], "error")]
fn log_level_follows_flags(#[case] argv: &[&str], #[case] expected: &str) {
    let cli = Cli::parse_from(argv);
    assert_eq!(cli.global.log_level(), expected);
}

#[test]
fn quiet_conflicts_with_verbose() {
    let err = Cli::try_parse_from(["gosdk", "-q", "-v", "list"]).expect_err("conflict");
    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
}
