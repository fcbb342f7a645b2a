//! The error type of this crate.

use thiserror::Error;

/// The error that can occur when validating or converting types.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// An invalid absolute path.
    #[error("The path is not absolute: {0}")]
    PathNotAbsolute(String),

    /// An invalid build date (in seconds since the epoch).
    #[error("Invalid build date: {0}")]
    InvalidBuildDate(String),

    /// An invalid build tool version.
    #[error("Invalid build tool version: {0}")]
    InvalidBuildToolVersion(String),

    /// An invalid checksum.
    #[error("Invalid {digest} checksum: {input}")]
    InvalidChecksum {
        /// The name of the digest the checksum is based on.
        digest: &'static str,
        /// The input that could not be validated.
        input: String,
    },

    /// An invalid compressed file size (in bytes).
    #[error("Invalid compressed size: {0}")]
    InvalidCompressedSize(String),

    /// An invalid epoch.
    #[error("Invalid epoch: {0}")]
    InvalidEpoch(String),

    /// An invalid installed package size (in bytes).
    #[error("Invalid installed size: {0}")]
    InvalidInstalledSize(String),

    /// An invalid description of an installed package.
    #[error("Invalid installed package: {0}")]
    InvalidInstalledPackage(String),

    /// An invalid package or build tool name.
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// An invalid build environment or package option.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// An invalid package file name.
    #[error("Invalid package file name: {0}")]
    InvalidPackageFileName(String),

    /// An invalid packager (must be `Name <valid@email>`).
    #[error("Invalid packager: {0}")]
    InvalidPackager(String),

    /// An invalid package type.
    #[error("Invalid package type: {0}")]
    InvalidPackageType(String),

    /// An invalid pkgrel.
    #[error("Invalid pkgrel: {0}")]
    InvalidPkgrel(String),

    /// An invalid pkgver.
    #[error("Invalid pkgver: {0}")]
    InvalidPkgver(String),

    /// An invalid composite version.
    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    /// An unknown compression type.
    #[error("Unknown compression type: {0}")]
    UnknownCompressionType(String),

    /// An unknown CPU architecture.
    #[error("Unknown CPU architecture: {0}")]
    UnknownArchitecture(String),
}
