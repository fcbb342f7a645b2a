//! File compression related types.

use std::{path::Path, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

use crate::Error;

/// The compression type of a package or sync database file.
///
/// Each variant maps to a distinct file name suffix (the empty string for
/// uncompressed tar archives).
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::CompressionType;
///
/// assert_eq!(
///     CompressionType::from_str("zst"),
///     Ok(CompressionType::Zstandard)
/// );
/// assert_eq!(CompressionType::Gzip.suffix(), "gz");
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    EnumString,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    VariantNames,
)]
#[serde(rename_all = "lowercase")]
pub enum CompressionType {
    /// No compression (a plain tar archive).
    #[strum(to_string = "none", serialize = "")]
    None,
    /// bzip2 compression.
    #[strum(to_string = "bzip2", serialize = "bz2")]
    Bzip2,
    /// gzip compression.
    #[default]
    #[strum(to_string = "gzip", serialize = "gz")]
    Gzip,
    /// lzma (xz) compression.
    #[strum(to_string = "lzma", serialize = "xz")]
    Lzma,
    /// zstandard compression.
    #[strum(to_string = "zstandard", serialize = "zst")]
    Zstandard,
}

impl CompressionType {
    /// Returns the file name suffix of the compression type.
    ///
    /// The suffix does not contain a leading dot and is empty for
    /// [`CompressionType::None`].
    pub fn suffix(&self) -> &'static str {
        match self {
            CompressionType::None => "",
            CompressionType::Bzip2 => "bz2",
            CompressionType::Gzip => "gz",
            CompressionType::Lzma => "xz",
            CompressionType::Zstandard => "zst",
        }
    }

    /// Returns the suffix of a database file using the compression type.
    ///
    /// This is the suffix appended to `.tar` (e.g. `.gz`), or the empty
    /// string for uncompressed databases.
    pub fn tar_suffix(&self) -> String {
        match self {
            CompressionType::None => String::new(),
            _ => format!(".{}", self.suffix()),
        }
    }

    /// Derives a [`CompressionType`] from the suffix of a file path.
    ///
    /// A path ending in `.tar` denotes an uncompressed archive.
    ///
    /// # Errors
    ///
    /// Returns an error if the path carries an unknown suffix.
    pub fn from_file_suffix(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        match path.extension().and_then(|suffix| suffix.to_str()) {
            Some("tar") => Ok(CompressionType::None),
            Some(suffix) => CompressionType::from_str(suffix)
                .map_err(|_| Error::UnknownCompressionType(suffix.to_string())),
            None => Err(Error::UnknownCompressionType(
                path.display().to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("foo.pkg.tar.zst", Ok(CompressionType::Zstandard))]
    #[case("foo.pkg.tar.bz2", Ok(CompressionType::Bzip2))]
    #[case("foo.pkg.tar.gz", Ok(CompressionType::Gzip))]
    #[case("foo.pkg.tar.xz", Ok(CompressionType::Lzma))]
    #[case("foo.pkg.tar", Ok(CompressionType::None))]
    #[case(
        "foo.pkg.tar.lz4",
        Err(Error::UnknownCompressionType("lz4".to_string()))
    )]
    fn compression_type_from_file_suffix(
        #[case] path: &str,
        #[case] result: Result<CompressionType, Error>,
    ) {
        assert_eq!(CompressionType::from_file_suffix(path), result);
    }

    #[rstest]
    #[case(CompressionType::None, "")]
    #[case(CompressionType::Gzip, ".gz")]
    #[case(CompressionType::Zstandard, ".zst")]
    fn compression_type_tar_suffix(#[case] compression: CompressionType, #[case] suffix: &str) {
        assert_eq!(compression.tar_suffix(), suffix);
    }
}
