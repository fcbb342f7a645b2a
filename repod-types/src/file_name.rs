//! Package file names.

use std::{
    fmt::{Display, Formatter},
    path::PathBuf,
    str::FromStr,
};

use crate::{Architecture, CompressionType, Error, Name, Version};

/// The suffix marking a file as a package file.
const PACKAGE_SUFFIX: &str = ".pkg.tar";

/// The suffix marking a file as a detached package signature.
const SIGNATURE_SUFFIX: &str = ".sig";

/// The file name of a package.
///
/// A package file name is of the form
/// `{name}-{version}-{architecture}.pkg.tar[.{compression}]`, where
/// `{version}` is a full version (including pkgrel) and `{compression}` is
/// one of the suffixes of [`CompressionType`].
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::PackageFileName;
///
/// let file_name = PackageFileName::from_str("foo-1:1.0.0-1-any.pkg.tar.zst").unwrap();
/// assert_eq!(file_name.name().inner(), "foo");
/// assert_eq!(file_name.to_string(), "foo-1:1.0.0-1-any.pkg.tar.zst");
/// assert_eq!(file_name.signature_file_name(), "foo-1:1.0.0-1-any.pkg.tar.zst.sig");
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PackageFileName {
    name: Name,
    version: Version,
    architecture: Architecture,
    compression: CompressionType,
}

impl PackageFileName {
    /// Creates a new [`PackageFileName`] from its components.
    ///
    /// # Errors
    ///
    /// Returns an error if `version` does not carry a pkgrel.
    pub fn new(
        name: Name,
        version: Version,
        architecture: Architecture,
        compression: CompressionType,
    ) -> Result<Self, Error> {
        if version.pkgrel().is_none() {
            return Err(Error::InvalidPackageFileName(format!(
                "{name}-{version}-{architecture}"
            )));
        }
        Ok(PackageFileName {
            name,
            version,
            architecture,
            compression,
        })
    }

    /// Returns the [`Name`] component.
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Returns the [`Version`] component.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Returns the [`Architecture`] component.
    pub fn architecture(&self) -> Architecture {
        self.architecture
    }

    /// Returns the [`CompressionType`] component.
    pub fn compression(&self) -> CompressionType {
        self.compression
    }

    /// Returns the file name of the accompanying detached signature.
    pub fn signature_file_name(&self) -> String {
        format!("{self}{SIGNATURE_SUFFIX}")
    }

    /// Returns the file name as a [`PathBuf`].
    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(self.to_string())
    }
}

impl FromStr for PackageFileName {
    type Err = Error;

    /// Creates a [`PackageFileName`] from a string slice.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` does not follow the package file name
    /// format, or any of its components can not be validated.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let error = || Error::InvalidPackageFileName(input.to_string());

        let (stem, compression) = match input.find(PACKAGE_SUFFIX) {
            Some(position) => {
                let stem = &input[..position];
                let trailer = &input[position + PACKAGE_SUFFIX.len()..];
                let compression = match trailer {
                    "" => CompressionType::None,
                    _ => {
                        let suffix = trailer.strip_prefix('.').ok_or_else(error)?;
                        CompressionType::from_str(suffix)
                            .map_err(|_| Error::UnknownCompressionType(suffix.to_string()))?
                    }
                };
                (stem, compression)
            }
            None => return Err(error()),
        };

        // {name}-{pkgver}-{pkgrel}-{architecture}
        let (rest, architecture) = stem.rsplit_once('-').ok_or_else(error)?;
        let architecture = Architecture::from_str(architecture)
            .map_err(|_| Error::UnknownArchitecture(architecture.to_string()))?;
        let (rest, pkgrel) = rest.rsplit_once('-').ok_or_else(error)?;
        let (name, pkgver) = rest.rsplit_once('-').unwrap_or(("", rest));
        if name.is_empty() {
            return Err(error());
        }

        PackageFileName::new(
            Name::new(name)?,
            Version::with_pkgrel(&format!("{pkgver}-{pkgrel}"))?,
            architecture,
            compression,
        )
    }
}

impl Display for PackageFileName {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(
            fmt,
            "{}-{}-{}{}{}",
            self.name,
            self.version,
            self.architecture,
            PACKAGE_SUFFIX,
            self.compression.tar_suffix(),
        )
    }
}
