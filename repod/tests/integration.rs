//! End-to-end scenarios over a repository in a temporary directory.

mod common;

use std::{collections::BTreeMap, path::Path};

use common::{build_package, create_repo_dirs, dir_entries};
use repod::{
    config::{ManagementRepo, PackageRepo, RepoFlavor, Settings},
    workflow::{add_packages, write_sync_databases, RepoTarget},
};
use repod_management::OutputPackageBase;
use repod_repo_db::db::read_database;
use repod_types::{Architecture, CompressionType};
use rstest::rstest;
use tempfile::TempDir;
use testresult::TestResult;

/// Returns validated settings over directories below `base`.
fn settings_below(base: &Path) -> TestResult<Settings> {
    create_repo_dirs(base)?;
    let settings = Settings {
        architecture: Some(Architecture::Any),
        management_repo: Some(ManagementRepo {
            directory: base.join("management"),
            url: None,
        }),
        package_pool: Some(base.join("pool/package")),
        source_pool: Some(base.join("pool/source")),
        package_repo_base: base.join("repo"),
        source_repo_base: base.join("source"),
        database_compression: CompressionType::Gzip,
        package_verification: None,
        repositories: vec![PackageRepo {
            name: "test".to_string(),
            architecture: None,
            debug: Some("test-debug".to_string()),
            staging: Some("test-staging".to_string()),
            testing: Some("test-testing".to_string()),
            management_repo: None,
            package_pool: None,
            source_pool: None,
            database_compression: None,
            package_url_validation: None,
        }],
    };
    settings.validate()?;
    Ok(settings)
}

/// Returns the stable flavor target of the test repository.
fn stable_target() -> RepoTarget {
    RepoTarget {
        name: "test".to_string(),
        architecture: None,
        flavor: RepoFlavor::Stable,
    }
}

#[rstest]
fn fresh_add() -> TestResult {
    let tmp = TempDir::new()?;
    let settings = settings_below(tmp.path())?;
    let package = build_package(tmp.path(), "foo", "foo", "1:1.0.0-1", "pkg")?;

    add_packages(
        &settings,
        vec![package],
        &stable_target(),
        true,
        BTreeMap::new(),
    )?;

    // the pool holds the package file and its signature
    let pool_dir = tmp.path().join("pool/package/test");
    assert!(pool_dir.join("foo-1:1.0.0-1-any.pkg.tar.zst").exists());
    assert!(pool_dir.join("foo-1:1.0.0-1-any.pkg.tar.zst.sig").exists());

    // the repository directory holds relative symlinks of the same name
    let repo_dir = tmp.path().join("repo/test/any");
    let symlink = repo_dir.join("foo-1:1.0.0-1-any.pkg.tar.zst");
    assert!(symlink.exists());
    assert!(std::fs::read_link(&symlink)?.is_relative());

    // the management record exists and holds a single package
    let record = OutputPackageBase::from_file(
        tmp.path().join("management/any/test/foo.json"),
    )?;
    assert_eq!(record.base().inner(), "foo");
    assert_eq!(record.packages().len(), 1);

    // the sync database holds the package entry
    let entries = read_database(repo_dir.join("test.db.tar.gz"))?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "foo");
    assert_eq!(entries[0].desc.get_version().to_string(), "1:1.0.0-1");

    // no temporary or backup files are left behind
    assert!(!dir_entries(&tmp.path().join("management/any/test"))?
        .iter()
        .any(|name| name.ends_with(".tmp") || name.ends_with(".bkp")));
    Ok(())
}

#[rstest]
fn upgrade() -> TestResult {
    let tmp = TempDir::new()?;
    let settings = settings_below(tmp.path())?;

    let old = build_package(tmp.path(), "foo", "foo", "1:1.0.0-1", "pkg")?;
    add_packages(&settings, vec![old], &stable_target(), true, BTreeMap::new())?;

    let new = build_package(tmp.path(), "foo", "foo", "1:1.0.1-1", "pkg")?;
    add_packages(&settings, vec![new], &stable_target(), true, BTreeMap::new())?;

    let repo_dir = tmp.path().join("repo/test/any");
    assert!(repo_dir.join("foo-1:1.0.1-1-any.pkg.tar.zst").exists());
    // the outdated symlinks are gone from the repository directory
    assert!(repo_dir
        .join("foo-1:1.0.0-1-any.pkg.tar.zst")
        .symlink_metadata()
        .is_err());
    // pool retention: the previous version stays in the pool
    assert!(tmp
        .path()
        .join("pool/package/test/foo-1:1.0.0-1-any.pkg.tar.zst")
        .exists());

    let record = OutputPackageBase::from_file(
        tmp.path().join("management/any/test/foo.json"),
    )?;
    assert_eq!(record.version().to_string(), "1:1.0.1-1");

    let entries = read_database(repo_dir.join("test.db.tar.gz"))?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].desc.get_version().to_string(), "1:1.0.1-1");
    Ok(())
}

#[rstest]
fn downgrade_is_rejected() -> TestResult {
    let tmp = TempDir::new()?;
    let settings = settings_below(tmp.path())?;

    let first = build_package(tmp.path(), "foo", "foo", "1:1.0.1-1", "pkg")?;
    add_packages(&settings, vec![first], &stable_target(), true, BTreeMap::new())?;

    let repo_dir = tmp.path().join("repo/test/any");
    let management_dir = tmp.path().join("management/any/test");
    let repo_before = dir_entries(&repo_dir)?;
    let management_before = dir_entries(&management_dir)?;
    let record_before = std::fs::read_to_string(management_dir.join("foo.json"))?;

    let downgrade = build_package(tmp.path(), "foo", "foo", "1:1.0.0-1", "pkg")?;
    assert!(add_packages(
        &settings,
        vec![downgrade],
        &stable_target(),
        true,
        BTreeMap::new()
    )
    .is_err());

    // nothing is mutated: no file, symlink, record or database changed
    assert_eq!(dir_entries(&repo_dir)?, repo_before);
    assert_eq!(dir_entries(&management_dir)?, management_before);
    assert_eq!(
        std::fs::read_to_string(management_dir.join("foo.json"))?,
        record_before
    );
    assert!(!tmp
        .path()
        .join("pool/package/test/foo-1:1.0.0-1-any.pkg.tar.zst")
        .exists());
    Ok(())
}

#[rstest]
fn debug_mix_is_rejected() -> TestResult {
    let tmp = TempDir::new()?;
    let settings = settings_below(tmp.path())?;

    let default_package = build_package(tmp.path(), "foo", "foo", "1.0.0-1", "pkg")?;
    let debug_package = build_package(tmp.path(), "bar-debug", "bar", "1.0.0-1", "debug")?;

    assert!(add_packages(
        &settings,
        vec![default_package, debug_package],
        &stable_target(),
        true,
        BTreeMap::new()
    )
    .is_err());

    // no artifacts changed
    assert_eq!(dir_entries(&tmp.path().join("repo"))?, vec!["test".to_string()]);
    assert!(dir_entries(&tmp.path().join("repo/test/any"))?.is_empty());
    assert!(dir_entries(&tmp.path().join("pool/package/test"))?.is_empty());
    Ok(())
}

#[rstest]
fn publish_only_regenerates_databases() -> TestResult {
    let tmp = TempDir::new()?;
    let settings = settings_below(tmp.path())?;

    let package = build_package(tmp.path(), "foo", "foo", "1:1.0.0-1", "pkg")?;
    add_packages(&settings, vec![package], &stable_target(), true, BTreeMap::new())?;

    // remove the published databases and regenerate them from the records
    let repo_dir = tmp.path().join("repo/test/any");
    std::fs::remove_file(repo_dir.join("test.db.tar.gz"))?;
    std::fs::remove_file(repo_dir.join("test.files.tar.gz"))?;

    write_sync_databases(&settings, &stable_target())?;

    // the database content is equivalent to the management records
    let record = OutputPackageBase::from_file(
        tmp.path().join("management/any/test/foo.json"),
    )?;
    let pkgbases =
        repod_management::outputpackagebases_from_database(repo_dir.join("test.files.tar.gz"))?;
    assert_eq!(pkgbases.len(), 1);
    assert_eq!(pkgbases[0].base(), record.base());
    assert_eq!(pkgbases[0].version(), record.version());
    assert_eq!(
        pkgbases[0].packages()[0].files,
        record.packages()[0].files
    );
    Ok(())
}
