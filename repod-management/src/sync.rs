//! Bridging between management repositories and sync databases.

use std::path::Path;

use log::debug;
use repod_repo_db::{
    db::{read_database, DatabaseKind, DatabaseWriter},
    desc::{RepoDesc, RepoDescSchema},
};
use repod_types::CompressionType;

use crate::{Error, OutputPackage, OutputPackageBase, OutputPackageBaseV1, PACKAGE_INDEX_FILE_NAME};

/// Streams the records of a management repository into a sync database.
///
/// All `*.json` files of `management_dir` (except the package name index)
/// are read in sorted order and their packages are streamed into a fresh
/// database at `database_path`. Members are never buffered as a whole
/// archive in memory.
///
/// # Errors
///
/// Returns an error if
///
/// - `management_dir` contains no JSON files,
/// - any record can not be read,
/// - or writing the database fails.
pub fn stream_management_dir_to_database(
    management_dir: impl AsRef<Path>,
    database_path: impl AsRef<Path>,
    kind: DatabaseKind,
    compression: CompressionType,
    desc_schema: RepoDescSchema,
) -> Result<(), Error> {
    let management_dir = management_dir.as_ref();
    let database_path = database_path.as_ref();
    debug!("Streaming management repository {management_dir:?} to database {database_path:?}...");

    let mut json_files: Vec<_> = std::fs::read_dir(management_dir)
        .map_err(|source| Error::IoPath {
            path: management_dir.to_path_buf(),
            context: "listing a management repository directory",
            source,
        })?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension().is_some_and(|extension| extension == "json")
                && path
                    .file_name()
                    .is_some_and(|name| name != PACKAGE_INDEX_FILE_NAME)
        })
        .collect();
    json_files.sort();

    if json_files.is_empty() {
        return Err(Error::NoJsonFiles(management_dir.to_path_buf()));
    }

    let mut writer = DatabaseWriter::create(database_path, compression, kind)?;
    for json_file in json_files {
        let pkgbase = OutputPackageBase::from_file(&json_file)?;
        let version = pkgbase.version().to_string();
        for (desc, files) in pkgbase.packages_as_models(desc_schema)? {
            writer.append(
                desc.get_name().inner(),
                &version,
                &desc,
                files.as_ref(),
            )?;
        }
    }
    writer.finish()?;

    Ok(())
}

/// Reads a sync database and folds its entries into [`OutputPackageBase`]
/// values, keyed by the pkgbase of each `desc` member.
///
/// # Errors
///
/// Returns an error if the database can not be read or parsed.
pub fn outputpackagebases_from_database(
    database_path: impl AsRef<Path>,
) -> Result<Vec<OutputPackageBase>, Error> {
    let mut pkgbases: Vec<OutputPackageBase> = Vec::new();

    for entry in read_database(database_path)? {
        let desc = match entry.desc {
            RepoDesc::V1(desc) => desc.into(),
            RepoDesc::V2(desc) => desc,
        };
        let base = desc.base.clone();
        let version = desc.version.clone();
        let packager = desc.packager.clone();
        let makedepends = desc.makedepends.clone();
        let package = OutputPackage::from_desc(desc, entry.files.as_ref());

        match pkgbases
            .iter_mut()
            .find(|pkgbase| pkgbase.base() == &base)
        {
            Some(pkgbase) => pkgbase.add_packages(vec![package]),
            None => pkgbases.push(OutputPackageBase::V1(OutputPackageBaseV1 {
                base,
                buildinfo: None,
                makedepends,
                packager,
                packages: vec![package],
                schema_version: 1,
                source_url: None,
                version,
            })),
        }
    }

    Ok(pkgbases)
}

#[cfg(test)]
mod tests {
    use std::{fs::File, io::Write};

    use rstest::rstest;
    use tempfile::TempDir;
    use testresult::TestResult;

    use super::*;
    use crate::output_package_base::tests::output_package_base;

    #[rstest]
    #[case::default_db(DatabaseKind::Default)]
    #[case::files_db(DatabaseKind::Files)]
    fn management_dir_database_round_trip(#[case] kind: DatabaseKind) -> TestResult {
        let management_dir = TempDir::new()?;
        let repo_dir = TempDir::new()?;

        let record = output_package_base();
        let mut file = File::create(management_dir.path().join(record.file_name()))?;
        file.write_all(record.to_json()?.as_bytes())?;

        let database_path = repo_dir
            .path()
            .join(kind.db_file_name("test", CompressionType::Gzip));
        stream_management_dir_to_database(
            management_dir.path(),
            &database_path,
            kind,
            CompressionType::Gzip,
            RepoDescSchema::V2,
        )?;

        let pkgbases = outputpackagebases_from_database(&database_path)?;
        assert_eq!(pkgbases.len(), 1);
        assert_eq!(pkgbases[0].base().inner(), "foo");
        assert_eq!(pkgbases[0].version().to_string(), "1:1.0.0-1");

        // a files database preserves the files lists of the packages
        assert_eq!(
            pkgbases[0].packages()[0].files.is_some(),
            matches!(kind, DatabaseKind::Files)
        );
        Ok(())
    }

    #[rstest]
    fn management_dir_without_records() -> TestResult {
        let management_dir = TempDir::new()?;
        let repo_dir = TempDir::new()?;

        assert!(matches!(
            stream_management_dir_to_database(
                management_dir.path(),
                repo_dir.path().join("test.db.tar.gz"),
                DatabaseKind::Default,
                CompressionType::Gzip,
                RepoDescSchema::V2,
            ),
            Err(Error::NoJsonFiles(_))
        ));
        Ok(())
    }
}
