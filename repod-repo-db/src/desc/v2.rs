//! The `desc` version 2 file format.

use std::{
    fmt::{Display, Formatter, Result as FmtResult, Write},
    str::FromStr,
};

use repod_types::{
    Architecture, BuildDate, CompressedSize, InstalledSize, Md5Checksum, Name, PackageFileName,
    Packager, Sha256Checksum, Version,
};
use url::Url;

use crate::{
    desc::{parse_sections, Section},
    Error,
};

/// Writes a single value section.
pub(crate) fn single<T: Display, W: Write>(f: &mut W, key: &str, value: &T) -> FmtResult {
    writeln!(f, "%{key}%\n{value}\n")
}

/// Writes a multi value section, omitting it if `values` is empty.
pub(crate) fn section<T: Display, W: Write>(f: &mut W, key: &str, values: &[T]) -> FmtResult {
    if values.is_empty() {
        return Ok(());
    }
    writeln!(f, "%{key}%")?;
    for value in values {
        writeln!(f, "{value}")?;
    }
    writeln!(f)
}

/// A representation of the `desc` version 2 file format.
///
/// This file format describes a single package entry of a sync database.
/// Unlike [`crate::desc::RepoDescV1`], the PGP signature of the package is
/// optional.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_repo_db::desc::RepoDescV2;
///
/// # fn main() -> Result<(), repod_repo_db::Error> {
/// let data = r#"%FILENAME%
/// foo-1:1.0.0-1-any.pkg.tar.zst
///
/// %NAME%
/// foo
///
/// %BASE%
/// foo
///
/// %VERSION%
/// 1:1.0.0-1
///
/// %DESC%
/// An example package
///
/// %CSIZE%
/// 4634
///
/// %ISIZE%
/// 181849963
///
/// %MD5SUM%
/// d3b07384d113edec49eaa6238ad5ff00
///
/// %SHA256SUM%
/// b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c
///
/// %URL%
/// https://example.org/
///
/// %LICENSE%
/// GPL-3.0-or-later
///
/// %ARCH%
/// any
///
/// %BUILDDATE%
/// 1
///
/// %PACKAGER%
/// Foobar McFooface <foobar@mcfooface.org>
///
/// "#;
///
/// let desc = RepoDescV2::from_str(data)?;
/// assert_eq!(desc.to_string(), data);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct RepoDescV2 {
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

    /// The optional base64 encoded detached signature of the package file.
    pub pgpsig: Option<String>,

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

impl TryFrom<Vec<Section>> for RepoDescV2 {
    type Error = Error;

    /// Creates a [`RepoDescV2`] from a list of parsed [`Section`]s.
    ///
    /// # Errors
    ///
    /// Returns an error if a mandatory section is missing or any section
    /// occurs more than once.
    fn try_from(sections: Vec<Section>) -> Result<Self, Self::Error> {
        let mut filename = None;
        let mut name = None;
        let mut base = None;
        let mut version = None;
        let mut description = None;
        let mut groups = None;
        let mut compressed_size = None;
        let mut installed_size = None;
        let mut md5sum = None;
        let mut sha256sum = None;
        let mut pgpsig = None;
        let mut url = None;
        let mut license = None;
        let mut arch = None;
        let mut builddate = None;
        let mut packager = None;
        let mut replaces = None;
        let mut conflicts = None;
        let mut provides = None;
        let mut depends = None;
        let mut optdepends = None;
        let mut backup = None;
        let mut makedepends = None;
        let mut checkdepends = None;

        for section in sections {
            let duplicate = Error::DuplicateSection(section.keyword().to_string());
            let duplicated = match section {
                Section::Filename(value) => filename.replace(value).is_some(),
                Section::Name(value) => name.replace(value).is_some(),
                Section::Base(value) => base.replace(value).is_some(),
                Section::Version(value) => version.replace(value).is_some(),
                Section::Desc(value) => description.replace(value).is_some(),
                Section::Groups(value) => groups.replace(value).is_some(),
                Section::CSize(value) => compressed_size.replace(value).is_some(),
                Section::ISize(value) => installed_size.replace(value).is_some(),
                Section::Md5Sum(value) => md5sum.replace(value).is_some(),
                Section::Sha256Sum(value) => sha256sum.replace(value).is_some(),
                Section::PgpSig(value) => pgpsig.replace(value).is_some(),
                Section::Url(value) => url.replace(value).is_some(),
                Section::License(value) => license.replace(value).is_some(),
                Section::Arch(value) => arch.replace(value).is_some(),
                Section::BuildDate(value) => builddate.replace(value).is_some(),
                Section::Packager(value) => packager.replace(value).is_some(),
                Section::Replaces(value) => replaces.replace(value).is_some(),
                Section::Conflicts(value) => conflicts.replace(value).is_some(),
                Section::Provides(value) => provides.replace(value).is_some(),
                Section::Depends(value) => depends.replace(value).is_some(),
                Section::OptDepends(value) => optdepends.replace(value).is_some(),
                Section::Backup(value) => backup.replace(value).is_some(),
                Section::MakeDepends(value) => makedepends.replace(value).is_some(),
                Section::CheckDepends(value) => checkdepends.replace(value).is_some(),
            };
            if duplicated {
                return Err(duplicate);
            }
        }

        Ok(RepoDescV2 {
            filename: filename.ok_or(Error::MissingSection("FILENAME"))?,
            name: name.ok_or(Error::MissingSection("NAME"))?,
            base: base.ok_or(Error::MissingSection("BASE"))?,
            version: version.ok_or(Error::MissingSection("VERSION"))?,
            description: description.unwrap_or_default(),
            groups: groups.unwrap_or_default(),
            compressed_size: compressed_size.ok_or(Error::MissingSection("CSIZE"))?,
            installed_size: installed_size.ok_or(Error::MissingSection("ISIZE"))?,
            md5sum: md5sum.ok_or(Error::MissingSection("MD5SUM"))?,
            sha256sum: sha256sum.ok_or(Error::MissingSection("SHA256SUM"))?,
            pgpsig,
            url: url.flatten(),
            license: license.unwrap_or_default(),
            arch: arch.ok_or(Error::MissingSection("ARCH"))?,
            builddate: builddate.ok_or(Error::MissingSection("BUILDDATE"))?,
            packager: packager.ok_or(Error::MissingSection("PACKAGER"))?,
            replaces: replaces.unwrap_or_default(),
            conflicts: conflicts.unwrap_or_default(),
            provides: provides.unwrap_or_default(),
            depends: depends.unwrap_or_default(),
            optdepends: optdepends.unwrap_or_default(),
            backup: backup.unwrap_or_default(),
            makedepends: makedepends.unwrap_or_default(),
            checkdepends: checkdepends.unwrap_or_default(),
        })
    }
}

impl FromStr for RepoDescV2 {
    type Err = Error;

    /// Creates a [`RepoDescV2`] from a string slice.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(parse_sections(s)?)
    }
}

impl Display for RepoDescV2 {
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
        if let Some(pgpsig) = &self.pgpsig {
            single(f, "PGPSIG", pgpsig)?;
        }
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
