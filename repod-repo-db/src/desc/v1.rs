//! The `desc` version 1 file format.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use repod_types::{
    Architecture, BuildDate, CompressedSize, InstalledSize, Md5Checksum, Name, PackageFileName,
    Packager, Sha256Checksum, Version,
};
use url::Url;

use crate::{
    desc::{
        parse_sections,
        v2::{section, single},
        RepoDescV2, Section,
    },
    Error,
};

/// A representation of the `desc` version 1 file format.
///
/// The first revision of the format requires the `%PGPSIG%` section, which
/// [`RepoDescV2`] makes optional. All other fields are shared between the
/// two revisions.
#[derive(Clone, Debug, PartialEq)]
pub struct RepoDescV1 {
    /// The file name of the package.
    pub filename: PackageFileName,

    /// The name of the package.
    pub name: Name,

    /// The pkgbase the package was built from.
    pub base: Name,

    /// The full version of the package.
    pub version: Version,

    /// The description of the package (may be empty).
    pub description: String,

    /// The groups the package belongs to.
    pub groups: Vec<String>,

    /// The compressed size of the package file in bytes.
    pub compressed_size: CompressedSize,

    /// The size of the installed package contents in bytes.
    pub installed_size: InstalledSize,

    /// The MD5 checksum of the package file.
    pub md5sum: Md5Checksum,

    /// The SHA-256 checksum of the package file.
    pub sha256sum: Sha256Checksum,

    /// The base64 encoded detached signature of the package file.
    pub pgpsig: String,

    /// The optional upstream URL of the package.
    pub url: Option<Url>,

    /// The licenses of the package.
    pub license: Vec<String>,

    /// The architecture of the package.
    pub arch: Architecture,

    /// The build date of the package.
    pub builddate: BuildDate,

    /// The packager of the package.
    pub packager: Packager,

    /// The components the package replaces.
    pub replaces: Vec<String>,

    /// The components the package conflicts with.
    pub conflicts: Vec<String>,

    /// The components the package provides.
    pub provides: Vec<String>,

    /// The run-time dependencies of the package.
    pub depends: Vec<String>,

    /// The optional dependencies of the package.
    pub optdepends: Vec<String>,

    /// The files pacman creates backups for.
    pub backup: Vec<String>,

    /// The build-time dependencies of the pkgbase.
    pub makedepends: Vec<String>,

    /// The check-time dependencies of the pkgbase.
    pub checkdepends: Vec<String>,
}

impl TryFrom<Vec<Section>> for RepoDescV1 {
    type Error = Error;

    /// Creates a [`RepoDescV1`] from a list of parsed [`Section`]s.
    ///
    /// Defers to the [`RepoDescV2`] conversion and additionally requires
    /// the `%PGPSIG%` section.
    fn try_from(sections: Vec<Section>) -> Result<Self, Self::Error> {
        RepoDescV2::try_from(sections)?.try_into()
    }
}

impl TryFrom<RepoDescV2> for RepoDescV1 {
    type Error = Error;

    /// Converts a [`RepoDescV2`] into a [`RepoDescV1`].
    ///
    /// # Errors
    ///
    /// Returns an error if the PGP signature is absent.
    fn try_from(desc: RepoDescV2) -> Result<Self, Self::Error> {
        let pgpsig = desc.pgpsig.ok_or(Error::MissingSection("PGPSIG"))?;
        Ok(RepoDescV1 {
            filename: desc.filename,
            name: desc.name,
            base: desc.base,
            version: desc.version,
            description: desc.description,
            groups: desc.groups,
            compressed_size: desc.compressed_size,
            installed_size: desc.installed_size,
            md5sum: desc.md5sum,
            sha256sum: desc.sha256sum,
            pgpsig,
            url: desc.url,
            license: desc.license,
            arch: desc.arch,
            builddate: desc.builddate,
            packager: desc.packager,
            replaces: desc.replaces,
            conflicts: desc.conflicts,
            provides: desc.provides,
            depends: desc.depends,
            optdepends: desc.optdepends,
            backup: desc.backup,
            makedepends: desc.makedepends,
            checkdepends: desc.checkdepends,
        })
    }
}

impl From<RepoDescV1> for RepoDescV2 {
    /// Converts a [`RepoDescV1`] into a [`RepoDescV2`].
    fn from(desc: RepoDescV1) -> Self {
        RepoDescV2 {
            filename: desc.filename,
            name: desc.name,
            base: desc.base,
            version: desc.version,
            description: desc.description,
            groups: desc.groups,
            compressed_size: desc.compressed_size,
            installed_size: desc.installed_size,
            md5sum: desc.md5sum,
            sha256sum: desc.sha256sum,
            pgpsig: Some(desc.pgpsig),
            url: desc.url,
            license: desc.license,
            arch: desc.arch,
            builddate: desc.builddate,
            packager: desc.packager,
            replaces: desc.replaces,
            conflicts: desc.conflicts,
            provides: desc.provides,
            depends: desc.depends,
            optdepends: desc.optdepends,
            backup: desc.backup,
            makedepends: desc.makedepends,
            checkdepends: desc.checkdepends,
        }
    }
}

impl FromStr for RepoDescV1 {
    type Err = Error;

    /// Creates a [`RepoDescV1`] from a string slice.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(parse_sections(s)?)
    }
}

impl Display for RepoDescV1 {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        single(f, "FILENAME", &self.filename)?;
        single(f, "NAME", &self.name)?;
        single(f, "BASE", &self.base)?;
        single(f, "VERSION", &self.version)?;
        if !self.description.is_empty() {
            single(f, "DESC", &self.description)?;
        }
        section(f, "GROUPS", &self.groups)?;
        single(f, "CSIZE", &self.compressed_size)?;
        single(f, "ISIZE", &self.installed_size)?;
        single(f, "MD5SUM", &self.md5sum)?;
        single(f, "SHA256SUM", &self.sha256sum)?;
        single(f, "PGPSIG", &self.pgpsig)?;
        if let Some(url) = &self.url {
            single(f, "URL", url)?;
        }
        section(f, "LICENSE", &self.license)?;
        single(f, "ARCH", &self.arch)?;
        single(f, "BUILDDATE", &self.builddate)?;
        single(f, "PACKAGER", &self.packager)?;
        section(f, "REPLACES", &self.replaces)?;
        section(f, "CONFLICTS", &self.conflicts)?;
        section(f, "PROVIDES", &self.provides)?;
        section(f, "DEPENDS", &self.depends)?;
        section(f, "OPTDEPENDS", &self.optdepends)?;
        section(f, "BACKUP", &self.backup)?;
        section(f, "MAKEDEPENDS", &self.makedepends)?;
        section(f, "CHECKDEPENDS", &self.checkdepends)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    fn valid_desc() -> String {
        [
            "%FILENAME%\nfoo-1:1.0.0-1-any.pkg.tar.zst\n",
            "%NAME%\nfoo\n",
            "%BASE%\nfoo\n",
            "%VERSION%\n1:1.0.0-1\n",
            "%CSIZE%\n4634\n",
            "%ISIZE%\n181849963\n",
            "%MD5SUM%\nd3b07384d113edec49eaa6238ad5ff00\n",
            "%SHA256SUM%\nb5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c\n",
            "%PGPSIG%\niHUEABYKAB0WIQRizHP4hOUpV7L92IObeih9mi7GCAUCaBZuVAAKCRCbeih9mi7GCIlMAP9=\n",
            "%ARCH%\nany\n",
            "%BUILDDATE%\n1\n",
            "%PACKAGER%\nFoobar McFooface <foobar@mcfooface.org>\n",
        ]
        .join("\n")
            + "\n"
    }

    #[rstest]
    fn desc_v1_round_trip() -> TestResult {
        let data = valid_desc();
        let desc = RepoDescV1::from_str(&data)?;
        assert_eq!(desc.to_string(), data);
        Ok(())
    }

    #[rstest]
    fn desc_v1_requires_pgpsig() {
        let data = valid_desc().replace(
            "%PGPSIG%\niHUEABYKAB0WIQRizHP4hOUpV7L92IObeih9mi7GCAUCaBZuVAAKCRCbeih9mi7GCIlMAP9=\n\n",
            "",
        );
        assert!(matches!(
            RepoDescV1::from_str(&data),
            Err(Error::MissingSection("PGPSIG"))
        ));
    }

    #[rstest]
    fn desc_v1_v2_conversion() -> TestResult {
        let desc_v1 = RepoDescV1::from_str(&valid_desc())?;
        let desc_v2: RepoDescV2 = desc_v1.clone().into();
        assert_eq!(desc_v2.pgpsig.as_deref(), Some(desc_v1.pgpsig.as_str()));
        assert_eq!(RepoDescV1::try_from(desc_v2)?, desc_v1);
        Ok(())
    }
}
