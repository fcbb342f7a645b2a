//! The error type of this crate.

use std::path::PathBuf;

use thiserror::Error;

/// The error that can occur when handling `.PKGINFO` files.
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

    /// A generic I/O error while reading.
    #[error("I/O error while {context}:\n{source}")]
    IoRead {
        /// What was attempted when the error occurred.
        context: &'static str,
        /// The source error.
        source: std::io::Error,
    },

    /// A deserialization error.
    #[error("Failed deserializing PKGINFO data:\n{0}")]
    Deserialize(#[from] repod_parsers::key_value::Error),

    /// A type validation error.
    #[error(transparent)]
    Types(#[from] repod_types::Error),

    /// The data does not match the expected schema version.
    #[error("The PKGINFO data does not match schema version {0}")]
    WrongSchemaVersion(String),

    /// The schema version is not supported.
    #[error("Unsupported PKGINFO schema version: {0}")]
    UnsupportedSchemaVersion(String),
}
