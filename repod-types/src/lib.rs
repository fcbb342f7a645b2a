//! Strongly typed building blocks for managing pacman-style binary package
//! repositories.
//!
//! This crate provides the scalar value types that all other `repod` crates
//! build upon: the distribution version algebra, CPU architectures,
//! compression kinds, checksums, names and the various constrained strings
//! found in package metadata files.
#![forbid(unsafe_code)]

mod checksum;
pub use checksum::{Checksum, Md5Checksum, Sha256Checksum};

mod compression;
pub use compression::CompressionType;

mod date;
pub use date::BuildDate;

mod env;
pub use env::{BuildEnvironmentOption, InstalledPackage, PackageOption};

mod error;
pub use error::Error;

mod file_name;
pub use file_name::PackageFileName;

mod name;
pub use name::{BuildTool, Name};

mod path;
pub use path::{AbsolutePath, BuildDirectory, StartDirectory};

mod pkg;
pub use pkg::{Packager, PackageType};

mod size;
pub use size::{CompressedSize, InstalledSize};

mod system;
pub use system::Architecture;

mod version;
pub use version::{
    pkg_vercmp, vercmp, BuildToolVersion, Epoch, Pkgrel, Pkgver, SchemaVersion, Version,
};

/// Public re-export of the semver version type backing [`SchemaVersion`].
pub mod semver_version {
    pub use semver::Version;
}

/// Public re-exports of the hash functions usable with [`Checksum`].
pub mod digests {
    pub use md5::Md5;
    pub use sha2::Sha256;
}
