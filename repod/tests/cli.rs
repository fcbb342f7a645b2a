//! Black-box tests of the `repod` executable.

mod common;

use std::{fs::File, io::Write, path::Path};

use assert_cmd::Command;
use common::{build_package, dir_entries, write_config};
use rstest::rstest;
use tempfile::TempDir;
use testresult::TestResult;

/// Returns a command invoking the compiled `repod` binary.
fn repod_command() -> TestResult<Command> {
    Ok(Command::cargo_bin("repod")?)
}

#[rstest]
fn cli_help() -> TestResult {
    repod_command()?.arg("--help").assert().success();
    Ok(())
}

#[rstest]
fn cli_add_and_write_sync_dbs() -> TestResult {
    let tmp = TempDir::new()?;
    let config = write_config(tmp.path())?;
    let package = build_package(tmp.path(), "foo", "foo", "1:1.0.0-1", "pkg")?;

    repod_command()?
        .arg("--config")
        .arg(&config)
        .arg("add")
        .arg("test")
        .arg(&package)
        .arg("--with-signature")
        .assert()
        .success();

    // the repository holds the package symlink, its signature and the
    // sync databases
    let repo_dir = tmp.path().join("repo/test/any");
    assert!(repo_dir.join("foo-1:1.0.0-1-any.pkg.tar.zst").exists());
    assert!(repo_dir.join("foo-1:1.0.0-1-any.pkg.tar.zst.sig").exists());
    assert!(repo_dir.join("test.db.tar.gz").exists());
    assert!(repo_dir.join("test.files.tar.gz").exists());
    assert!(tmp
        .path()
        .join("management/any/test/foo.json")
        .exists());

    // republishing the databases from the management records succeeds
    std::fs::remove_file(repo_dir.join("test.db.tar.gz"))?;
    std::fs::remove_file(repo_dir.join("test.files.tar.gz"))?;

    repod_command()?
        .arg("--config")
        .arg(&config)
        .arg("write-sync-dbs")
        .arg("test")
        .assert()
        .success();

    assert!(repo_dir.join("test.db.tar.gz").exists());
    assert!(repo_dir.join("test.files.tar.gz").exists());
    Ok(())
}

#[rstest]
fn cli_add_dry_run_prints_records() -> TestResult {
    let tmp = TempDir::new()?;
    let config = write_config(tmp.path())?;
    let package = build_package(tmp.path(), "foo", "foo", "1:1.0.0-1", "pkg")?;

    let output = repod_command()?
        .arg("--config")
        .arg(&config)
        .arg("add")
        .arg("test")
        .arg(&package)
        .arg("--with-signature")
        .arg("--dry-run")
        .output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("\"base\": \"foo\""));
    assert!(stdout.contains("\"version\": \"1:1.0.0-1\""));

    // a dry run does not touch the repository
    assert!(dir_entries(&tmp.path().join("management"))?.is_empty());
    assert!(dir_entries(&tmp.path().join("repo"))?.is_empty());
    Ok(())
}

#[rstest]
fn cli_add_downgrade_fails() -> TestResult {
    let tmp = TempDir::new()?;
    let config = write_config(tmp.path())?;

    let first = build_package(tmp.path(), "foo", "foo", "1:1.0.1-1", "pkg")?;
    repod_command()?
        .arg("--config")
        .arg(&config)
        .arg("add")
        .arg("test")
        .arg(&first)
        .arg("--with-signature")
        .assert()
        .success();

    let downgrade = build_package(tmp.path(), "foo", "foo", "1:1.0.0-1", "pkg")?;
    let output = repod_command()?
        .arg("--config")
        .arg(&config)
        .arg("add")
        .arg("test")
        .arg(&downgrade)
        .arg("--with-signature")
        .output()?;

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("An error occurred while trying to add packages"));

    // the repository still holds only the first version
    let repo_dir = tmp.path().join("repo/test/any");
    assert!(repo_dir.join("foo-1:1.0.1-1-any.pkg.tar.zst").exists());
    assert!(!repo_dir.join("foo-1:1.0.0-1-any.pkg.tar.zst").exists());
    Ok(())
}

#[rstest]
fn cli_add_without_configuration_fails() -> TestResult {
    let tmp = TempDir::new()?;
    let package = build_package(tmp.path(), "foo", "foo", "1:1.0.0-1", "pkg")?;

    let output = repod_command()?
        .arg("--config")
        .arg(tmp.path().join("missing.conf"))
        .arg("add")
        .arg("test")
        .arg(&package)
        .output()?;

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    Ok(())
}

/// Writes a `.BUILDINFO` file below `directory`.
fn write_build_info(directory: &Path) -> TestResult<std::path::PathBuf> {
    let data = r#"format = 2
pkgname = foo
pkgbase = foo
pkgver = 1:1.0.0-1
pkgarch = any
pkgbuild_sha256sum = b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c
packager = Foobar McFooface <foobar@mcfooface.org>
builddate = 1
builddir = /build
startdir = /startdir
buildtool = devtools
buildtoolver = 1:1.2.1-1-any
"#;
    let path = directory.join(".BUILDINFO");
    let mut file = File::create(&path)?;
    file.write_all(data.as_bytes())?;
    Ok(path)
}

#[rstest]
fn cli_inspect_build_info() -> TestResult {
    let tmp = TempDir::new()?;
    let path = write_build_info(tmp.path())?;

    let output = repod_command()?.arg("inspect").arg(&path).output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("format = 2\n"));
    assert!(stdout.contains("buildtool = devtools\n"));
    Ok(())
}

#[rstest]
fn cli_inspect_srcinfo() -> TestResult {
    let tmp = TempDir::new()?;
    let path = tmp.path().join(".SRCINFO");
    let mut file = File::create(&path)?;
    file.write_all(
        b"pkgbase = foo\n\tpkgver = 1.0.0\n\tpkgrel = 1\n\tarch = any\n\npkgname = foo\n",
    )?;

    let output = repod_command()?.arg("inspect").arg(&path).output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("pkgbase: foo 1.0.0-1"));
    assert!(stdout.contains("pkgname: foo"));
    Ok(())
}

#[rstest]
fn cli_inspect_unknown_file_fails() -> TestResult {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("notes.txt");
    File::create(&path)?;

    let output = repod_command()?.arg("inspect").arg(&path).output()?;

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("does not denote a known metadata file"));
    Ok(())
}
