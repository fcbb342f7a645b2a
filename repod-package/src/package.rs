//! The representation of a package file.

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use digest::Digest;
use log::debug;
use repod_buildinfo::BuildInfo;
use repod_mtree::Mtree;
use repod_pkginfo::PackageInfo;
use repod_types::{
    digests::{Md5, Sha256},
    Checksum, CompressedSize, Md5Checksum, PackageFileName, Sha256Checksum,
};
use tar::Archive;

use crate::{CompressionDecoder, Error};

/// The name of the BUILDINFO member of a package file.
const BUILDINFO_MEMBER: &str = ".BUILDINFO";

/// The name of the PKGINFO member of a package file.
const PKGINFO_MEMBER: &str = ".PKGINFO";

/// The name of the MTREE member of a package file.
const MTREE_MEMBER: &str = ".MTREE";

/// A package file together with its parsed metadata.
///
/// A [`Package`] combines the location and digests of a package file with
/// the three metadata members extracted from it.
#[derive(Clone, Debug)]
pub struct Package {
    path: PathBuf,
    file_name: PackageFileName,
    signature_path: Option<PathBuf>,
    compressed_size: CompressedSize,
    md5sum: Md5Checksum,
    sha256sum: Sha256Checksum,
    build_info: BuildInfo,
    package_info: PackageInfo,
    mtree: Mtree,
}

impl Package {
    /// Creates a [`Package`] from the package file at `path`.
    ///
    /// The compression of the package file is derived from its suffix. The
    /// three metadata members are extracted from the archive in one pass,
    /// while the digests and size are computed over the archive file
    /// itself. Directories, symlinks and payload files inside the archive
    /// are tolerated.
    ///
    /// # Errors
    ///
    /// Returns an error if
    ///
    /// - the file name of `path` is not a valid package file name,
    /// - `signature` is provided but does not exist,
    /// - the archive can not be opened or read,
    /// - any of the metadata members is missing or can not be parsed.
    pub fn from_file(
        path: impl AsRef<Path>,
        signature: Option<PathBuf>,
    ) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("Reading package file {path:?}...");

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| Error::NoFileName(path.to_path_buf()))
            .and_then(|name| PackageFileName::from_str(name).map_err(Error::Types))?;

        if let Some(signature) = &signature {
            if !signature.exists() {
                return Err(Error::SignatureMissing(signature.clone()));
            }
        }

        let (build_info, package_info, mtree) = Self::read_metadata(path, &file_name)?;
        let (compressed_size, md5sum, sha256sum) = Self::digest_file(path)?;

        Ok(Package {
            path: path.to_path_buf(),
            file_name,
            signature_path: signature,
            compressed_size,
            md5sum,
            sha256sum,
            build_info,
            package_info,
            mtree,
        })
    }

    /// Extracts and parses the three metadata members of the archive.
    fn read_metadata(
        path: &Path,
        file_name: &PackageFileName,
    ) -> Result<(BuildInfo, PackageInfo, Mtree), Error> {
        let file = File::open(path).map_err(|source| Error::IoPath {
            path: path.to_path_buf(),
            context: "opening a package file",
            source,
        })?;
        let decoder = CompressionDecoder::new(file, file_name.compression())?;
        let mut archive = Archive::new(decoder);

        let mut build_info_data: Option<String> = None;
        let mut package_info_data: Option<String> = None;
        let mut mtree_data: Option<Vec<u8>> = None;

        let entries = archive.entries().map_err(|source| Error::IoPath {
            path: path.to_path_buf(),
            context: "reading a package archive",
            source,
        })?;

        for entry in entries {
            let mut entry = entry.map_err(|source| Error::IoPath {
                path: path.to_path_buf(),
                context: "reading a package archive entry",
                source,
            })?;

            let (member, nested) = {
                let entry_path = entry.path().map_err(|source| Error::IoPath {
                    path: path.to_path_buf(),
                    context: "reading the path of a package archive entry",
                    source,
                })?;
                (
                    entry_path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .map(str::to_string),
                    entry_path.parent().is_some_and(|parent| {
                        !parent.as_os_str().is_empty() && parent != Path::new(".")
                    }),
                )
            };
            let Some(member) = member else {
                continue;
            };
            // only the metadata members at the archive root are of interest
            if nested {
                continue;
            }

            match member.as_str() {
                BUILDINFO_MEMBER | PKGINFO_MEMBER => {
                    let mut data = String::new();
                    entry
                        .read_to_string(&mut data)
                        .map_err(|source| Error::IoPath {
                            path: path.to_path_buf(),
                            context: "reading a metadata member of a package archive",
                            source,
                        })?;
                    if member == BUILDINFO_MEMBER {
                        build_info_data = Some(data);
                    } else {
                        package_info_data = Some(data);
                    }
                }
                MTREE_MEMBER => {
                    let mut data = Vec::new();
                    entry
                        .read_to_end(&mut data)
                        .map_err(|source| Error::IoPath {
                            path: path.to_path_buf(),
                            context: "reading the MTREE member of a package archive",
                            source,
                        })?;
                    mtree_data = Some(data);
                }
                _ => {}
            }
        }

        let build_info_data = build_info_data.ok_or(Error::MissingMember {
            path: path.to_path_buf(),
            member: BUILDINFO_MEMBER,
        })?;
        let package_info_data = package_info_data.ok_or(Error::MissingMember {
            path: path.to_path_buf(),
            member: PKGINFO_MEMBER,
        })?;
        let mtree_data = mtree_data.ok_or(Error::MissingMember {
            path: path.to_path_buf(),
            member: MTREE_MEMBER,
        })?;

        let build_info = BuildInfo::from_str(&build_info_data).map_err(|source| {
            Error::BuildInfo {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let package_info = PackageInfo::from_str(&package_info_data).map_err(|source| {
            Error::PackageInfo {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let mtree =
            Mtree::from_gzip_reader(mtree_data.as_slice()).map_err(|source| Error::Mtree {
                path: path.to_path_buf(),
                source,
            })?;

        Ok((build_info, package_info, mtree))
    }

    /// Computes the size and digests of the archive file at `path`.
    fn digest_file(path: &Path) -> Result<(CompressedSize, Md5Checksum, Sha256Checksum), Error> {
        let mut file = File::open(path).map_err(|source| Error::IoPath {
            path: path.to_path_buf(),
            context: "opening a package file for digest computation",
            source,
        })?;

        let mut md5 = Md5::new();
        let mut sha256 = Sha256::new();
        let mut size: u64 = 0;
        let mut buffer = [0; 8192];

        loop {
            let count = file.read(&mut buffer).map_err(|source| Error::IoPath {
                path: path.to_path_buf(),
                context: "reading a package file for digest computation",
                source,
            })?;
            if count == 0 {
                break;
            }
            md5.update(&buffer[..count]);
            sha256.update(&buffer[..count]);
            size += count as u64;
        }

        Ok((
            CompressedSize::new(size),
            Checksum::from_digest(md5.finalize().to_vec())?,
            Checksum::from_digest(sha256.finalize().to_vec())?,
        ))
    }

    /// Returns the path of the package file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the parsed file name of the package file.
    pub fn file_name(&self) -> &PackageFileName {
        &self.file_name
    }

    /// Returns the path of the detached signature, if one is tracked.
    pub fn signature_path(&self) -> Option<&Path> {
        self.signature_path.as_deref()
    }

    /// Returns the compressed size of the package file.
    pub fn compressed_size(&self) -> CompressedSize {
        self.compressed_size
    }

    /// Returns the MD5 checksum of the package file.
    pub fn md5sum(&self) -> &Md5Checksum {
        &self.md5sum
    }

    /// Returns the SHA-256 checksum of the package file.
    pub fn sha256sum(&self) -> &Sha256Checksum {
        &self.sha256sum
    }

    /// Returns the parsed `.BUILDINFO` member.
    pub fn build_info(&self) -> &BuildInfo {
        &self.build_info
    }

    /// Returns the parsed `.PKGINFO` member.
    pub fn package_info(&self) -> &PackageInfo {
        &self.package_info
    }

    /// Returns the parsed `.MTREE` member.
    pub fn mtree(&self) -> &Mtree {
        &self.mtree
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::{write::GzEncoder, Compression};
    use rstest::rstest;
    use tempfile::TempDir;
    use testresult::TestResult;

    use super::*;

    const BUILDINFO_DATA: &str = r#"format = 2
pkgname = foo
pkgbase = foo
pkgver = 1:1.0.0-1
pkgarch = any
pkgbuild_sha256sum = b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c
packager = Foobar McFooface <foobar@mcfooface.org>
builddate = 1
builddir = /build
startdir = /startdir
buildtool = devtools
buildtoolver = 1:1.2.1-1-any
"#;

    const PKGINFO_DATA: &str = r#"pkgname = foo
pkgbase = foo
pkgver = 1:1.0.0-1
pkgdesc = An example package
url = https://example.org/
builddate = 1
packager = Foobar McFooface <foobar@mcfooface.org>
size = 1
arch = any
license = GPL-3.0-or-later
pkgtype = pkg
"#;

    const MTREE_DATA: &str = r#"#mtree
/set uid=0 gid=0 mode=644 type=file
./.BUILDINFO time=1.0 size=100 md5digest=d3b07384d113edec49eaa6238ad5ff00 sha256digest=b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c
"#;

    /// Writes a zstd-compressed package file with all metadata members.
    pub(crate) fn write_package(directory: &Path, file_name: &str) -> TestResult<PathBuf> {
        let package_path = directory.join(file_name);
        let file = File::create(&package_path)?;
        let encoder = zstd::Encoder::new(file, 0)?.auto_finish();
        let mut builder = tar::Builder::new(encoder);

        let mut mtree_gz = Vec::new();
        {
            let mut encoder = GzEncoder::new(&mut mtree_gz, Compression::default());
            encoder.write_all(MTREE_DATA.as_bytes())?;
            encoder.finish()?;
        }

        for (name, data) in [
            (BUILDINFO_MEMBER, BUILDINFO_DATA.as_bytes()),
            (PKGINFO_MEMBER, PKGINFO_DATA.as_bytes()),
            (MTREE_MEMBER, mtree_gz.as_slice()),
        ] {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, data)?;
        }
        builder.into_inner()?;

        Ok(package_path)
    }

    #[rstest]
    fn package_from_file() -> TestResult {
        let dir = TempDir::new()?;
        let package_path = write_package(dir.path(), "foo-1:1.0.0-1-any.pkg.tar.zst")?;

        let package = Package::from_file(&package_path, None)?;
        assert_eq!(package.file_name().name().inner(), "foo");
        assert_eq!(package.package_info().base().inner(), "foo");
        assert_eq!(package.build_info().pkgver().to_string(), "1:1.0.0-1");
        assert_eq!(package.mtree().entries().len(), 1);
        assert_eq!(
            package.compressed_size().inner(),
            package_path.metadata()?.len()
        );
        Ok(())
    }

    #[rstest]
    fn package_from_file_missing_signature() -> TestResult {
        let dir = TempDir::new()?;
        let package_path = write_package(dir.path(), "foo-1:1.0.0-1-any.pkg.tar.zst")?;

        assert!(matches!(
            Package::from_file(&package_path, Some(dir.path().join("missing.sig"))),
            Err(Error::SignatureMissing(_))
        ));
        Ok(())
    }

    #[rstest]
    fn package_from_file_unknown_compression() -> TestResult {
        let dir = TempDir::new()?;
        let package_path = dir.path().join("foo-1:1.0.0-1-any.pkg.tar.lz4");
        File::create(&package_path)?;

        assert!(Package::from_file(&package_path, None).is_err());
        Ok(())
    }

    #[rstest]
    fn package_from_file_missing_member() -> TestResult {
        let dir = TempDir::new()?;
        let package_path = dir.path().join("foo-1:1.0.0-1-any.pkg.tar.zst");
        let file = File::create(&package_path)?;
        let encoder = zstd::Encoder::new(file, 0)?.auto_finish();
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_size(0);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, ".PKGINFO", &b""[..])?;
        builder.into_inner()?;

        assert!(matches!(
            Package::from_file(&package_path, None),
            Err(Error::MissingMember { .. })
        ));
        Ok(())
    }
}
