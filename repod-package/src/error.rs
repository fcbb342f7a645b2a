//! The error type of this crate.

use std::path::PathBuf;

use thiserror::Error;

/// The error that can occur when reading package files.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error at a specific path.
    #[error("I/O error at path {path} while {context}:\n{source}")]
    IoPath {
        /// The path the error occurred at.
        path: PathBuf,
        /// What was attempted when the error occurred.
        context: &'static str,
        /// The source error.
        source: std::io::Error,
    },

    /// A mandatory metadata member is missing from a package file.
    #[error("The package file {path} is missing the mandatory member {member}")]
    MissingMember {
        /// The path of the package file.
        path: PathBuf,
        /// The name of the missing member.
        member: &'static str,
    },

    /// A file path does not carry a file name.
    #[error("The path {0} does not point at a file")]
    NoFileName(PathBuf),

    /// A signature file does not exist.
    #[error("The signature file {0} does not exist")]
    SignatureMissing(PathBuf),

    /// An error while handling `.BUILDINFO` data.
    #[error("Failed reading the BUILDINFO member of {path}:\n{source}")]
    BuildInfo {
        /// The path of the package file.
        path: PathBuf,
        /// The source error.
        source: repod_buildinfo::Error,
    },

    /// An error while handling `.PKGINFO` data.
    #[error("Failed reading the PKGINFO member of {path}:\n{source}")]
    PackageInfo {
        /// The path of the package file.
        path: PathBuf,
        /// The source error.
        source: repod_pkginfo::Error,
    },

    /// An error while handling `.MTREE` data.
    #[error("Failed reading the MTREE member of {path}:\n{source}")]
    Mtree {
        /// The path of the package file.
        path: PathBuf,
        /// The source error.
        source: repod_mtree::Error,
    },

    /// A type validation error.
    #[error(transparent)]
    Types(#[from] repod_types::Error),
}
