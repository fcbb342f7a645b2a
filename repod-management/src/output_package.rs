//! The per-package entry of a management record.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use repod_mtree::EntryKind;
use repod_package::Package;
use repod_repo_db::{
    desc::{RepoDesc, RepoDescSchema, RepoDescV2},
    files::FilesV1,
};
use repod_types::{
    Architecture, Md5Checksum, Name, PackageFileName, Sha256Checksum,
};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use url::Url;

use crate::Error;

/// The files of a package, as tracked in a management record.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PackageFiles {
    /// The relative paths of the files of the package.
    pub files: Vec<String>,
}

impl From<&FilesV1> for PackageFiles {
    fn from(files: &FilesV1) -> Self {
        PackageFiles {
            files: files.files().to_vec(),
        }
    }
}

impl TryFrom<&PackageFiles> for FilesV1 {
    type Error = Error;

    fn try_from(files: &PackageFiles) -> Result<Self, Self::Error> {
        Ok(FilesV1::new(files.files.clone())?)
    }
}

/// A package entry of a management record.
///
/// An [`OutputPackage`] is the union of the per-package `desc` fields (all
/// fields except those scoped to the pkgbase) plus an optional files list.
/// Fields are kept in alphabetical order, which yields sorted keys in the
/// JSON representation.
#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputPackage {
    /// The architecture of the package.
    pub arch: Architecture,

    /// The files pacman creates backups for.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backup: Vec<String>,

    /// The build date in seconds since the epoch.
    pub builddate: i64,

    /// The check-time dependencies of the package.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checkdepends: Vec<String>,

    /// The components the package conflicts with.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<String>,

    /// The compressed size of the package file in bytes.
    pub csize: u64,

    /// The run-time dependencies of the package.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,

    /// The description of the package.
    pub desc: String,

    /// The file name of the package.
    #[serde_as(as = "DisplayFromStr")]
    pub filename: PackageFileName,

    /// The optional files list of the package.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<PackageFiles>,

    /// The groups the package belongs to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,

    /// The size of the installed package contents in bytes.
    pub isize: u64,

    /// The licenses of the package.
    pub license: Vec<String>,

    /// The MD5 checksum of the package file.
    #[serde_as(as = "DisplayFromStr")]
    pub md5sum: Md5Checksum,

    /// The name of the package.
    #[serde_as(as = "DisplayFromStr")]
    pub name: Name,

    /// The optional dependencies of the package.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optdepends: Vec<String>,

    /// The optional base64 encoded detached signature of the package file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pgpsig: Option<String>,

    /// The components the package provides.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provides: Vec<String>,

    /// The components the package replaces.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replaces: Vec<String>,

    /// The schema version of the object.
    pub schema_version: u64,

    /// The SHA-256 checksum of the package file.
    #[serde_as(as = "DisplayFromStr")]
    pub sha256sum: Sha256Checksum,

    /// The upstream URL of the package.
    pub url: Url,
}

impl OutputPackage {
    /// Creates an [`OutputPackage`] from a [`Package`].
    ///
    /// The files list is derived from the MTREE entries of the package
    /// (skipping the metadata members). If the package tracks a detached
    /// signature, its content is lifted into the `pgpsig` field as base64.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature file can not be read.
    pub fn from_package(package: &Package) -> Result<Self, Error> {
        let package_info = package.package_info();

        let pgpsig = package
            .signature_path()
            .map(|signature| {
                std::fs::read(signature)
                    .map(|data| BASE64.encode(data))
                    .map_err(|source| Error::IoPath {
                        path: signature.to_path_buf(),
                        context: "reading a package signature file",
                        source,
                    })
            })
            .transpose()?;

        let files = package
            .mtree()
            .entries()
            .iter()
            .filter_map(|entry| {
                let path = entry
                    .path
                    .strip_prefix("./")
                    .unwrap_or(&entry.path)
                    .to_string_lossy()
                    .to_string();
                // the metadata members are not part of the package contents
                if path.starts_with('.') {
                    return None;
                }
                Some(match entry.kind {
                    EntryKind::Dir => format!("{path}/"),
                    _ => path,
                })
            })
            .collect();

        Ok(OutputPackage {
            arch: package_info.architecture(),
            backup: package_info.backup().to_vec(),
            builddate: package_info.builddate().inner(),
            checkdepends: package_info.checkdepends().to_vec(),
            conflicts: package_info.conflicts().to_vec(),
            csize: package.compressed_size().inner(),
            depends: package_info.depends().to_vec(),
            desc: package_info.description().to_string(),
            filename: package.file_name().clone(),
            files: Some(PackageFiles { files }),
            groups: package_info.groups().to_vec(),
            isize: package_info.installed_size().inner(),
            license: package_info.licenses().to_vec(),
            md5sum: package.md5sum().clone(),
            name: package_info.name().clone(),
            optdepends: package_info.optdepends().to_vec(),
            pgpsig,
            provides: package_info.provides().to_vec(),
            replaces: package_info.replaces().to_vec(),
            schema_version: 1,
            sha256sum: package.sha256sum().clone(),
            url: package_info.url().clone(),
        })
    }

    /// Creates an [`OutputPackage`] from a `desc` and optional `files`
    /// member of a sync database.
    pub fn from_desc(desc: RepoDescV2, files: Option<&FilesV1>) -> Self {
        OutputPackage {
            arch: desc.arch,
            backup: desc.backup,
            builddate: desc.builddate.inner(),
            checkdepends: desc.checkdepends,
            conflicts: desc.conflicts,
            csize: desc.compressed_size.inner(),
            depends: desc.depends,
            desc: desc.description,
            filename: desc.filename,
            files: files.map(PackageFiles::from),
            groups: desc.groups,
            isize: desc.installed_size.inner(),
            license: desc.license,
            md5sum: desc.md5sum,
            name: desc.name,
            optdepends: desc.optdepends,
            pgpsig: desc.pgpsig,
            provides: desc.provides,
            replaces: desc.replaces,
            schema_version: 1,
            sha256sum: desc.sha256sum,
            url: desc.url.unwrap_or_else(fallback_url),
        }
    }

    /// Renders the [`OutputPackage`] as a `desc` member of the requested
    /// schema version, together with its optional `files` member.
    ///
    /// The pkgbase scoped fields (`base`, `version`, `packager`,
    /// `makedepends`) are supplied by the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if [`RepoDescSchema::V1`] is requested but the
    /// package does not carry a signature, or if the files list is invalid.
    pub fn to_models(
        &self,
        base: &Name,
        version: &repod_types::Version,
        packager: &repod_types::Packager,
        makedepends: &[String],
        desc_schema: RepoDescSchema,
    ) -> Result<(RepoDesc, Option<FilesV1>), Error> {
        let desc = RepoDescV2 {
            filename: self.filename.clone(),
            name: self.name.clone(),
            base: base.clone(),
            version: version.clone(),
            description: self.desc.clone(),
            groups: self.groups.clone(),
            compressed_size: repod_types::CompressedSize::new(self.csize),
            installed_size: repod_types::InstalledSize::new(self.isize),
            md5sum: self.md5sum.clone(),
            sha256sum: self.sha256sum.clone(),
            pgpsig: self.pgpsig.clone(),
            url: Some(self.url.clone()),
            arch: self.arch,
            builddate: repod_types::BuildDate::new(self.builddate),
            packager: packager.clone(),
            replaces: self.replaces.clone(),
            conflicts: self.conflicts.clone(),
            provides: self.provides.clone(),
            depends: self.depends.clone(),
            optdepends: self.optdepends.clone(),
            backup: self.backup.clone(),
            makedepends: makedepends.to_vec(),
            checkdepends: self.checkdepends.clone(),
            license: self.license.clone(),
        };

        let files = self
            .files
            .as_ref()
            .map(FilesV1::try_from)
            .transpose()?;

        let desc = match desc_schema {
            RepoDescSchema::V1 => RepoDesc::V1(desc.try_into()?),
            RepoDescSchema::V2 => RepoDesc::V2(desc),
        };

        Ok((desc, files))
    }
}

/// The URL used when a read `desc` member carries none.
///
/// Management records require a URL for every package, while the `%URL%`
/// section of a sync database is optional.
fn fallback_url() -> Url {
    Url::parse("https://localhost/").expect("static URL is valid")
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    fn desc() -> RepoDescV2 {
        RepoDescV2::from_str(
            "%FILENAME%\nfoo-1:1.0.0-1-any.pkg.tar.zst\n\n\
            %NAME%\nfoo\n\n\
            %BASE%\nfoo\n\n\
            %VERSION%\n1:1.0.0-1\n\n\
            %DESC%\nAn example package\n\n\
            %CSIZE%\n1\n\n\
            %ISIZE%\n2\n\n\
            %MD5SUM%\nd3b07384d113edec49eaa6238ad5ff00\n\n\
            %SHA256SUM%\nb5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c\n\n\
            %URL%\nhttps://example.org/\n\n\
            %ARCH%\nany\n\n\
            %BUILDDATE%\n1\n\n\
            %PACKAGER%\nFoobar McFooface <foobar@mcfooface.org>\n\n",
        )
        .unwrap()
    }

    #[rstest]
    fn output_package_desc_round_trip() -> TestResult {
        let files = FilesV1::new(vec!["usr/".to_string(), "usr/bin/foo".to_string()])?;
        let output = OutputPackage::from_desc(desc(), Some(&files));

        let (rendered, rendered_files) = output.to_models(
            &Name::new("foo")?,
            &repod_types::Version::new("1:1.0.0-1")?,
            &repod_types::Packager::new("Foobar McFooface <foobar@mcfooface.org>")?,
            &[],
            RepoDescSchema::V2,
        )?;

        let RepoDesc::V2(rendered) = rendered else {
            panic!("expected a desc version 2 value");
        };
        assert_eq!(rendered, desc());
        assert_eq!(rendered_files.as_ref(), Some(&files));
        Ok(())
    }

    #[rstest]
    fn output_package_v1_requires_pgpsig() -> TestResult {
        let output = OutputPackage::from_desc(desc(), None);
        assert!(output
            .to_models(
                &Name::new("foo")?,
                &repod_types::Version::new("1:1.0.0-1")?,
                &repod_types::Packager::new("Foobar McFooface <foobar@mcfooface.org>")?,
                &[],
                RepoDescSchema::V1,
            )
            .is_err());
        Ok(())
    }

    #[rstest]
    fn output_package_json_round_trip() -> TestResult {
        let output = OutputPackage::from_desc(desc(), None);
        let json = serde_json::to_string(&output)?;
        let parsed: OutputPackage = serde_json::from_str(&json)?;
        assert_eq!(parsed, output);
        Ok(())
    }
}
