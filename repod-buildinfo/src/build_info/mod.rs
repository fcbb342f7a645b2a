//! Handling of `.BUILDINFO` versions.

pub mod v1;
pub mod v2;

use std::{
    fmt::Display,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use repod_common::{FileFormatSchema, MetadataFile};
use repod_types::{Architecture, Name, Packager, Version};
pub use v1::BuildInfoV1;
pub use v2::BuildInfoV2;

use crate::{BuildInfoSchema, Error};

/// A representation of the `.BUILDINFO` file format.
///
/// Tracks all available variants of the file format.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_buildinfo::BuildInfo;
///
/// # fn main() -> Result<(), repod_buildinfo::Error> {
/// let data = r#"format = 1
/// pkgname = foo
/// pkgbase = foo
/// pkgver = 1:1.0.0-1
/// pkgarch = any
/// pkgbuild_sha256sum = b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c
/// packager = Foobar McFooface <foobar@mcfooface.org>
/// builddate = 1
/// builddir = /build
/// buildenv = ccache
/// options = lto
/// installed = bar-1.2.3-1-any
/// "#;
///
/// let build_info = BuildInfo::from_str(data)?;
/// assert_eq!(build_info.to_string(), data);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum BuildInfo {
    /// The BUILDINFO version 1 file format.
    V1(BuildInfoV1),
    /// The BUILDINFO version 2 file format.
    V2(BuildInfoV2),
}

impl BuildInfo {
    /// Returns the pkgbase.
    pub fn pkgbase(&self) -> &Name {
        match self {
            BuildInfo::V1(build_info) => build_info.pkgbase(),
            BuildInfo::V2(build_info) => build_info.pkgbase(),
        }
    }

    /// Returns the package name.
    pub fn pkgname(&self) -> &Name {
        match self {
            BuildInfo::V1(build_info) => build_info.pkgname(),
            BuildInfo::V2(build_info) => build_info.pkgname(),
        }
    }

    /// Returns the package version.
    pub fn pkgver(&self) -> &Version {
        match self {
            BuildInfo::V1(build_info) => build_info.pkgver(),
            BuildInfo::V2(build_info) => build_info.pkgver(),
        }
    }

    /// Returns the package architecture.
    pub fn pkgarch(&self) -> Architecture {
        match self {
            BuildInfo::V1(build_info) => build_info.pkgarch(),
            BuildInfo::V2(build_info) => build_info.pkgarch(),
        }
    }

    /// Returns the packager.
    pub fn packager(&self) -> &Packager {
        match self {
            BuildInfo::V1(build_info) => build_info.packager(),
            BuildInfo::V2(build_info) => build_info.packager(),
        }
    }
}

impl MetadataFile<BuildInfoSchema> for BuildInfo {
    type Err = Error;

    /// Creates a [`BuildInfo`] from `path`, optionally validated using a
    /// [`BuildInfoSchema`].
    fn from_file_with_schema(
        path: impl AsRef<Path>,
        schema: Option<BuildInfoSchema>,
    ) -> Result<Self, Error> {
        let path = path.as_ref();
        Self::from_reader_with_schema(
            File::open(path).map_err(|source| Error::IoPath {
                path: PathBuf::from(path),
                context: "opening a BUILDINFO file",
                source,
            })?,
            schema,
        )
    }

    /// Creates a [`BuildInfo`] from a reader, optionally validated using a
    /// [`BuildInfoSchema`].
    fn from_reader_with_schema(
        mut reader: impl Read,
        schema: Option<BuildInfoSchema>,
    ) -> Result<Self, Error> {
        let mut buf = String::new();
        reader
            .read_to_string(&mut buf)
            .map_err(|source| Error::IoRead {
                context: "reading BUILDINFO data",
                source,
            })?;
        Self::from_str_with_schema(&buf, schema)
    }

    /// Creates a [`BuildInfo`] from a string slice, optionally validated
    /// using a [`BuildInfoSchema`].
    ///
    /// If `schema` is [`None`], the schema is derived from `s`.
    fn from_str_with_schema(s: &str, schema: Option<BuildInfoSchema>) -> Result<Self, Error> {
        let schema = match schema {
            Some(schema) => schema,
            None => BuildInfoSchema::derive_from_str(s)?,
        };

        match schema {
            BuildInfoSchema::V1(_) => Ok(BuildInfo::V1(BuildInfoV1::from_str(s)?)),
            BuildInfoSchema::V2(_) => Ok(BuildInfo::V2(BuildInfoV2::from_str(s)?)),
        }
    }
}

impl FromStr for BuildInfo {
    type Err = Error;

    /// Creates a [`BuildInfo`] from a string slice, deriving the schema from
    /// the `format` keyword.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_with_schema(s, None)
    }
}

impl Display for BuildInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V1(build_info) => build_info.fmt(f),
            Self::V2(build_info) => build_info.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    const BUILDINFO_V1: &str = r#"format = 1
pkgname = foo
pkgbase = foo
pkgver = 1:1.0.0-1
pkgarch = x86_64
pkgbuild_sha256sum = b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c
packager = Foobar McFooface <foobar@mcfooface.org>
builddate = 1
builddir = /build
buildenv = ccache
options = lto
installed = bar-1.2.3-1-any
installed = beh-2.2.3-4-any
"#;

    const BUILDINFO_V2: &str = r#"format = 2
pkgname = foo
pkgbase = foo
pkgver = 1:1.0.0-1
pkgarch = x86_64
pkgbuild_sha256sum = b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c
packager = Foobar McFooface <foobar@mcfooface.org>
builddate = 1
builddir = /build
startdir = /startdir
buildtool = devtools
buildtoolver = 1:1.2.1-1-any
buildenv = ccache
options = lto
installed = bar-1.2.3-1-any
"#;

    #[rstest]
    #[case::v1(BUILDINFO_V1)]
    #[case::v2(BUILDINFO_V2)]
    fn build_info_round_trip(#[case] data: &str) -> TestResult {
        let build_info = BuildInfo::from_str(data)?;
        assert_eq!(build_info.to_string(), data);
        Ok(())
    }

    #[rstest]
    fn build_info_from_file() -> TestResult {
        let mut file = tempfile::NamedTempFile::new()?;
        write!(file, "{BUILDINFO_V2}")?;
        let build_info = BuildInfo::from_file(file.path())?;
        assert!(matches!(build_info, BuildInfo::V2(_)));
        assert_eq!(build_info.pkgbase().inner(), "foo");
        Ok(())
    }

    #[rstest]
    fn build_info_wrong_schema() {
        assert!(BuildInfo::from_str_with_schema(
            BUILDINFO_V1,
            Some(BuildInfoSchema::default())
        )
        .is_err());
    }
}
