//! Schema detection for `.BUILDINFO` files.

use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use repod_common::FileFormatSchema;
use repod_parsers::key_value::{self, Item};
use repod_types::{semver_version::Version, SchemaVersion};

use crate::Error;

/// An enum describing all valid `.BUILDINFO` schemas.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BuildInfoSchema {
    /// The first revision of the BUILDINFO file format.
    V1(SchemaVersion),
    /// The second revision of the BUILDINFO file format.
    V2(SchemaVersion),
}

impl FileFormatSchema for BuildInfoSchema {
    type Err = Error;

    /// Returns the schema version.
    fn inner(&self) -> &SchemaVersion {
        match self {
            BuildInfoSchema::V1(version) | BuildInfoSchema::V2(version) => version,
        }
    }

    /// Derives a [`BuildInfoSchema`] from a `.BUILDINFO` file.
    fn derive_from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        Self::derive_from_reader(File::open(path).map_err(|source| Error::IoPath {
            path: PathBuf::from(path),
            context: "deriving the schema version of a BUILDINFO file",
            source,
        })?)
    }

    /// Derives a [`BuildInfoSchema`] from BUILDINFO data in a reader.
    fn derive_from_reader(mut reader: impl Read) -> Result<Self, Error> {
        let mut buf = String::new();
        reader
            .read_to_string(&mut buf)
            .map_err(|source| Error::IoRead {
                context: "deriving the schema version of BUILDINFO data",
                source,
            })?;
        Self::derive_from_str(&buf)
    }

    /// Derives a [`BuildInfoSchema`] from a string slice.
    ///
    /// Relies on the `format` keyword to derive the corresponding schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the `format` field is missing or does not denote
    /// a known schema version.
    fn derive_from_str(s: &str) -> Result<Self, Error> {
        let raw: BTreeMap<String, Item> = key_value::parse_items(s)?;
        match raw.get("format") {
            Some(Item::Value(version)) => Self::from_str(version),
            _ => Err(Error::MissingFormatField),
        }
    }
}

impl Default for BuildInfoSchema {
    /// Returns the default variant ([`BuildInfoSchema::V2`]).
    fn default() -> Self {
        Self::V2(SchemaVersion::new(Version::new(2, 0, 0)))
    }
}

impl FromStr for BuildInfoSchema {
    type Err = Error;

    fn from_str(s: &str) -> Result<BuildInfoSchema, Self::Err> {
        match SchemaVersion::from_str(s) {
            Ok(version) => Self::try_from(version),
            Err(_) => Err(Error::UnsupportedSchemaVersion(s.to_string())),
        }
    }
}

impl TryFrom<SchemaVersion> for BuildInfoSchema {
    type Error = Error;

    fn try_from(value: SchemaVersion) -> Result<Self, Self::Error> {
        match value.inner().major {
            1 => Ok(BuildInfoSchema::V1(value)),
            2 => Ok(BuildInfoSchema::V2(value)),
            _ => Err(Error::UnsupportedSchemaVersion(value.to_string())),
        }
    }
}

impl Display for BuildInfoSchema {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner().inner().major)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    #[rstest]
    #[case("format = 1\npkgname = foo", 1)]
    #[case("format = 2\npkgname = foo", 2)]
    fn derive_from_str(#[case] data: &str, #[case] major: u64) -> TestResult {
        let schema = BuildInfoSchema::derive_from_str(data)?;
        assert_eq!(schema.inner().inner().major, major);
        Ok(())
    }

    #[rstest]
    fn derive_from_str_missing_format() {
        assert!(matches!(
            BuildInfoSchema::derive_from_str("pkgname = foo"),
            Err(Error::MissingFormatField)
        ));
    }

    #[rstest]
    fn unsupported_schema_version() {
        assert!(matches!(
            BuildInfoSchema::from_str("3"),
            Err(Error::UnsupportedSchemaVersion(_))
        ));
    }
}
