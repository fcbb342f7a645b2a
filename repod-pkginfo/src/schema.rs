//! Schema detection for `.PKGINFO` files.

use std::{
    fmt::{Display, Formatter},
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use repod_common::FileFormatSchema;
use repod_parsers::key_value;
use repod_types::{semver_version::Version, SchemaVersion};

use crate::Error;

/// An enum describing all valid `.PKGINFO` schemas.
///
/// Unlike `.BUILDINFO` files, `.PKGINFO` files do not carry an explicit
/// format marker. The second revision of the format is recognized by the
/// presence of the `pkgtype` keyword.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PackageInfoSchema {
    /// The first revision of the PKGINFO file format.
    V1(SchemaVersion),
    /// The second revision of the PKGINFO file format.
    V2(SchemaVersion),
}

impl FileFormatSchema for PackageInfoSchema {
    type Err = Error;

    /// Returns the schema version.
    fn inner(&self) -> &SchemaVersion {
        match self {
            PackageInfoSchema::V1(version) | PackageInfoSchema::V2(version) => version,
        }
    }

    /// Derives a [`PackageInfoSchema`] from a `.PKGINFO` file.
    fn derive_from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        Self::derive_from_reader(File::open(path).map_err(|source| Error::IoPath {
            path: PathBuf::from(path),
            context: "deriving the schema version of a PKGINFO file",
            source,
        })?)
    }

    /// Derives a [`PackageInfoSchema`] from PKGINFO data in a reader.
    fn derive_from_reader(mut reader: impl Read) -> Result<Self, Error> {
        let mut buf = String::new();
        reader
            .read_to_string(&mut buf)
            .map_err(|source| Error::IoRead {
                context: "deriving the schema version of PKGINFO data",
                source,
            })?;
        Self::derive_from_str(&buf)
    }

    /// Derives a [`PackageInfoSchema`] from a string slice.
    ///
    /// The presence of the `pkgtype` keyword selects
    /// [`PackageInfoSchema::V2`], its absence [`PackageInfoSchema::V1`].
    fn derive_from_str(s: &str) -> Result<Self, Error> {
        let raw = key_value::parse_items(s)?;
        if raw.contains_key("pkgtype") {
            Ok(PackageInfoSchema::V2(SchemaVersion::new(Version::new(
                2, 0, 0,
            ))))
        } else {
            Ok(PackageInfoSchema::V1(SchemaVersion::new(Version::new(
                1, 0, 0,
            ))))
        }
    }
}

impl Default for PackageInfoSchema {
    /// Returns the default variant ([`PackageInfoSchema::V2`]).
    fn default() -> Self {
        Self::V2(SchemaVersion::new(Version::new(2, 0, 0)))
    }
}

impl FromStr for PackageInfoSchema {
    type Err = Error;

    fn from_str(s: &str) -> Result<PackageInfoSchema, Self::Err> {
        match SchemaVersion::from_str(s) {
            Ok(version) => Self::try_from(version),
            Err(_) => Err(Error::UnsupportedSchemaVersion(s.to_string())),
        }
    }
}

impl TryFrom<SchemaVersion> for PackageInfoSchema {
    type Error = Error;

    fn try_from(value: SchemaVersion) -> Result<Self, Self::Error> {
        match value.inner().major {
            1 => Ok(PackageInfoSchema::V1(value)),
            2 => Ok(PackageInfoSchema::V2(value)),
            _ => Err(Error::UnsupportedSchemaVersion(value.to_string())),
        }
    }
}

impl Display for PackageInfoSchema {
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
    #[case("pkgname = foo\npkgtype = pkg", 2)]
    #[case("pkgname = foo", 1)]
    fn derive_from_str(#[case] data: &str, #[case] major: u64) -> TestResult {
        let schema = PackageInfoSchema::derive_from_str(data)?;
        assert_eq!(schema.inner().inner().major, major);
        Ok(())
    }
}
