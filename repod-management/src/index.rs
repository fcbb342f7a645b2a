//! The package name index of a management repository.

use std::{collections::BTreeMap, fs::File, io::Read, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Error, OutputPackageBase};

/// The file name of the package name index in a management repository.
pub const PACKAGE_INDEX_FILE_NAME: &str = "pkgnames.json";

/// An index mapping package names to the pkgbase providing them.
///
/// The index is kept as a JSON document next to the per-pkgbase records of
/// a management repository and answers which pkgbase currently provides a
/// given package name, without resorting to file system state.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PackageIndex {
    entries: BTreeMap<String, String>,
}

impl PackageIndex {
    /// Loads the index from the management repository at `directory`.
    ///
    /// A missing index file yields an empty index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index file exists but can not be read or
    /// parsed.
    pub fn from_dir(directory: impl AsRef<Path>) -> Result<Self, Error> {
        let path = directory.as_ref().join(PACKAGE_INDEX_FILE_NAME);
        if !path.exists() {
            return Ok(PackageIndex::default());
        }

        debug!("Reading package name index {path:?}...");
        let mut data = String::new();
        File::open(&path)
            .and_then(|mut file| file.read_to_string(&mut data))
            .map_err(|source| Error::IoPath {
                path: path.clone(),
                context: "reading a package name index",
                source,
            })?;
        serde_json::from_str(&data).map_err(|source| Error::JsonParse { path, source })
    }

    /// Returns the pkgbase currently providing `name`.
    pub fn pkgbase_of(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Returns whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records all packages of `pkgbase`, replacing its previous entries.
    ///
    /// Package names that were previously provided by the pkgbase but no
    /// longer are, are removed from the index.
    pub fn update_pkgbase(&mut self, pkgbase: &OutputPackageBase) {
        let base = pkgbase.base().to_string();
        self.entries.retain(|_, value| *value != base);
        for name in pkgbase.package_names() {
            self.entries.insert(name.to_string(), base.clone());
        }
    }

    /// Returns the canonical JSON representation of the index.
    pub fn to_json(&self) -> Result<String, Error> {
        let mut json = serde_json::to_string_pretty(self).map_err(Error::JsonSerialize)?;
        json.push('\n');
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;
    use tempfile::TempDir;
    use testresult::TestResult;

    use super::*;
    use crate::output_package_base::tests::output_package_base;

    #[rstest]
    fn index_missing_file_is_empty() -> TestResult {
        let dir = TempDir::new()?;
        assert!(PackageIndex::from_dir(dir.path())?.is_empty());
        Ok(())
    }

    #[rstest]
    fn index_round_trip() -> TestResult {
        let dir = TempDir::new()?;
        let mut index = PackageIndex::default();
        index.update_pkgbase(&output_package_base());
        assert_eq!(index.pkgbase_of("foo"), Some("foo"));

        let path = dir.path().join(PACKAGE_INDEX_FILE_NAME);
        let mut file = File::create(&path)?;
        file.write_all(index.to_json()?.as_bytes())?;

        assert_eq!(PackageIndex::from_dir(dir.path())?, index);
        Ok(())
    }

    #[rstest]
    fn index_update_replaces_previous_entries() -> TestResult {
        let mut index = PackageIndex::default();
        index.update_pkgbase(&output_package_base());

        // an update of the same pkgbase without the package drops the entry
        let mut record = output_package_base();
        if let OutputPackageBase::V1(inner) = &mut record {
            inner.packages.clear();
        }
        index.update_pkgbase(&record);
        assert_eq!(index.pkgbase_of("foo"), None);
        Ok(())
    }
}
