//! Handling of `.PKGINFO` versions.

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
use repod_types::{Architecture, InstalledSize, Name, PackageType, Packager, Version};
pub use v1::PackageInfoV1;
pub use v2::PackageInfoV2;

use crate::{Error, PackageInfoSchema};

/// A representation of the `.PKGINFO` file format.
///
/// Tracks all available variants of the file format.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_pkginfo::PackageInfo;
///
/// # fn main() -> Result<(), repod_pkginfo::Error> {
/// let data = r#"pkgname = foo
/// pkgbase = foo
/// pkgver = 1:1.0.0-1
/// pkgdesc = An example package
/// url = https://example.org/
/// builddate = 1
/// packager = Foobar McFooface <foobar@mcfooface.org>
/// size = 181849963
/// arch = any
/// license = GPL-3.0-or-later
/// pkgtype = pkg
/// "#;
///
/// let package_info = PackageInfo::from_str(data)?;
/// assert!(matches!(package_info, PackageInfo::V2(_)));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum PackageInfo {
    /// The PKGINFO version 1 file format.
    V1(PackageInfoV1),
    /// The PKGINFO version 2 file format.
    V2(PackageInfoV2),
}

impl PackageInfo {
    /// Returns the package name.
    pub fn name(&self) -> &Name {
        match self {
            PackageInfo::V1(package_info) => package_info.name(),
            PackageInfo::V2(package_info) => package_info.name(),
        }
    }

    /// Returns the pkgbase.
    pub fn base(&self) -> &Name {
        match self {
            PackageInfo::V1(package_info) => package_info.base(),
            PackageInfo::V2(package_info) => package_info.base(),
        }
    }

    /// Returns the package version.
    pub fn version(&self) -> &Version {
        match self {
            PackageInfo::V1(package_info) => package_info.version(),
            PackageInfo::V2(package_info) => package_info.version(),
        }
    }

    /// Returns the package architecture.
    pub fn architecture(&self) -> Architecture {
        match self {
            PackageInfo::V1(package_info) => package_info.architecture(),
            PackageInfo::V2(package_info) => package_info.architecture(),
        }
    }

    /// Returns the packager.
    pub fn packager(&self) -> &Packager {
        match self {
            PackageInfo::V1(package_info) => package_info.packager(),
            PackageInfo::V2(package_info) => package_info.packager(),
        }
    }

    /// Returns the installed size.
    pub fn installed_size(&self) -> InstalledSize {
        match self {
            PackageInfo::V1(package_info) => package_info.installed_size(),
            PackageInfo::V2(package_info) => package_info.installed_size(),
        }
    }

    /// Returns the package type, if the underlying format tracks one.
    ///
    /// Version 1 of the file format does not track a package type, hence
    /// [`None`] is returned for it.
    pub fn package_type(&self) -> Option<PackageType> {
        match self {
            PackageInfo::V1(_) => None,
            PackageInfo::V2(package_info) => Some(package_info.package_type()),
        }
    }

    /// Returns the package description.
    pub fn description(&self) -> &str {
        match self {
            PackageInfo::V1(package_info) => package_info.description(),
            PackageInfo::V2(package_info) => package_info.description(),
        }
    }

    /// Returns the upstream URL of the package.
    pub fn url(&self) -> &url::Url {
        match self {
            PackageInfo::V1(package_info) => package_info.url(),
            PackageInfo::V2(package_info) => package_info.url(),
        }
    }

    /// Returns the build date of the package.
    pub fn builddate(&self) -> repod_types::BuildDate {
        match self {
            PackageInfo::V1(package_info) => package_info.builddate(),
            PackageInfo::V2(package_info) => package_info.builddate(),
        }
    }

    /// Returns the licenses of the package.
    pub fn licenses(&self) -> &[String] {
        match self {
            PackageInfo::V1(package_info) => package_info.licenses(),
            PackageInfo::V2(package_info) => package_info.licenses(),
        }
    }

    /// Returns the packages this package replaces.
    pub fn replaces(&self) -> &[String] {
        match self {
            PackageInfo::V1(package_info) => package_info.replaces(),
            PackageInfo::V2(package_info) => package_info.replaces(),
        }
    }

    /// Returns the groups this package belongs to.
    pub fn groups(&self) -> &[String] {
        match self {
            PackageInfo::V1(package_info) => package_info.groups(),
            PackageInfo::V2(package_info) => package_info.groups(),
        }
    }

    /// Returns the packages this package conflicts with.
    pub fn conflicts(&self) -> &[String] {
        match self {
            PackageInfo::V1(package_info) => package_info.conflicts(),
            PackageInfo::V2(package_info) => package_info.conflicts(),
        }
    }

    /// Returns the components this package provides.
    pub fn provides(&self) -> &[String] {
        match self {
            PackageInfo::V1(package_info) => package_info.provides(),
            PackageInfo::V2(package_info) => package_info.provides(),
        }
    }

    /// Returns the files pacman creates backups for.
    pub fn backup(&self) -> &[String] {
        match self {
            PackageInfo::V1(package_info) => package_info.backup(),
            PackageInfo::V2(package_info) => package_info.backup(),
        }
    }

    /// Returns the run-time dependencies.
    pub fn depends(&self) -> &[String] {
        match self {
            PackageInfo::V1(package_info) => package_info.depends(),
            PackageInfo::V2(package_info) => package_info.depends(),
        }
    }

    /// Returns the optional dependencies.
    pub fn optdepends(&self) -> &[String] {
        match self {
            PackageInfo::V1(package_info) => package_info.optdepends(),
            PackageInfo::V2(package_info) => package_info.optdepends(),
        }
    }

    /// Returns the build-time dependencies.
    pub fn makedepends(&self) -> &[String] {
        match self {
            PackageInfo::V1(package_info) => package_info.makedepends(),
            PackageInfo::V2(package_info) => package_info.makedepends(),
        }
    }

    /// Returns the check-time dependencies.
    pub fn checkdepends(&self) -> &[String] {
        match self {
            PackageInfo::V1(package_info) => package_info.checkdepends(),
            PackageInfo::V2(package_info) => package_info.checkdepends(),
        }
    }
}

impl MetadataFile<PackageInfoSchema> for PackageInfo {
    type Err = Error;

    /// Creates a [`PackageInfo`] from `path`, optionally validated using a
    /// [`PackageInfoSchema`].
    fn from_file_with_schema(
        path: impl AsRef<Path>,
        schema: Option<PackageInfoSchema>,
    ) -> Result<Self, Error> {
        let path = path.as_ref();
        Self::from_reader_with_schema(
            File::open(path).map_err(|source| Error::IoPath {
                path: PathBuf::from(path),
                context: "opening a PKGINFO file",
                source,
            })?,
            schema,
        )
    }

    /// Creates a [`PackageInfo`] from a reader, optionally validated using
    /// a [`PackageInfoSchema`].
    fn from_reader_with_schema(
        mut reader: impl Read,
        schema: Option<PackageInfoSchema>,
    ) -> Result<Self, Error> {
        let mut buf = String::new();
        reader
            .read_to_string(&mut buf)
            .map_err(|source| Error::IoRead {
                context: "reading PKGINFO data",
                source,
            })?;
        Self::from_str_with_schema(&buf, schema)
    }

    /// Creates a [`PackageInfo`] from a string slice, optionally validated
    /// using a [`PackageInfoSchema`].
    ///
    /// If `schema` is [`None`], the schema is derived from `s`.
    fn from_str_with_schema(
        s: &str,
        schema: Option<PackageInfoSchema>,
    ) -> Result<Self, Error> {
        let schema = match schema {
            Some(schema) => schema,
            None => PackageInfoSchema::derive_from_str(s)?,
        };

        match schema {
            PackageInfoSchema::V1(_) => Ok(PackageInfo::V1(PackageInfoV1::from_str(s)?)),
            PackageInfoSchema::V2(_) => Ok(PackageInfo::V2(PackageInfoV2::from_str(s)?)),
        }
    }
}

impl FromStr for PackageInfo {
    type Err = Error;

    /// Creates a [`PackageInfo`] from a string slice, deriving the schema
    /// from the presence of the `pkgtype` keyword.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_with_schema(s, None)
    }
}

impl Display for PackageInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::V1(package_info) => package_info.fmt(f),
            Self::V2(package_info) => package_info.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    const PKGINFO_V1: &str = r#"# Generated by makepkg 6.0.2
# using fakeroot version 1.31
pkgname = foo
pkgbase = foo
pkgver = 1:1.0.0-1
pkgdesc = An example package
url = https://example.org/
builddate = 1
packager = Foobar McFooface <foobar@mcfooface.org>
size = 181849963
arch = any
license = GPL-3.0-or-later
depend = bar
depend = baz
"#;

    const PKGINFO_V2: &str = r#"pkgname = foo-debug
pkgbase = foo
pkgver = 1:1.0.0-1
pkgdesc = Debug symbols for foo
url = https://example.org/
builddate = 1
packager = Foobar McFooface <foobar@mcfooface.org>
size = 181849963
arch = any
license = GPL-3.0-or-later
pkgtype = debug
"#;

    #[rstest]
    fn package_info_versions() -> TestResult {
        assert!(matches!(
            PackageInfo::from_str(PKGINFO_V1)?,
            PackageInfo::V1(_)
        ));
        assert!(matches!(
            PackageInfo::from_str(PKGINFO_V2)?,
            PackageInfo::V2(_)
        ));
        Ok(())
    }

    #[rstest]
    fn package_info_package_type() -> TestResult {
        assert_eq!(PackageInfo::from_str(PKGINFO_V1)?.package_type(), None);
        assert_eq!(
            PackageInfo::from_str(PKGINFO_V2)?.package_type(),
            Some(PackageType::Debug)
        );
        Ok(())
    }
}
