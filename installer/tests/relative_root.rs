//! Switching versions under an install root given as a relative path.
//!
//! Changing the working directory affects the whole process, so this file
//! holds a single test and runs as its own test binary.
#![cfg(unix)]

use camino::Utf8PathBuf;
use gosdk::current::{get_current, set_current};
use gosdk::fs::{DEFAULT_DIR_MODE, Filesystem, OsFs, Symlinker};
use gosdk::root::InstallRoot;
use gosdk::version::Version;

#[test]
fn current_link_resolves_under_a_relative_root() {
    let temp = tempfile::tempdir().expect("temp dir");
    std::env::set_current_dir(temp.path()).expect("enter temp dir");

    let root = InstallRoot::new("sdks/go");
    OsFs.create_dir_all(&root.path().join("1.16"), DEFAULT_DIR_MODE)
        .expect("mkdir");
    let version = Version::parse("1.16").expect("valid version");

    set_current(&OsFs, &root, &version).expect("set current");

    let resolved = root
        .current_link()
        .canonicalize_utf8()
        .expect("current link resolves");
    let expected = Utf8PathBuf::try_from(temp.path().join("sdks/go/1.16"))
        .expect("UTF-8 path")
        .canonicalize_utf8()
        .expect("version dir resolves");
    assert_eq!(resolved, expected);
    assert_eq!(
        OsFs.read_link(&root.current_link()).expect("read link"),
        Utf8PathBuf::from("1.16")
    );
    assert_eq!(get_current(&OsFs, &root).expect("get current"), version);
}
