//! The error type of this crate.

use std::path::PathBuf;

use repod_types::SchemaVersion;
use thiserror::Error;

/// The error that can occur when handling `.BUILDINFO` files.
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
    #[error("Failed deserializing BUILDINFO data:\n{0}")]
    Deserialize(#[from] repod_parsers::key_value::Error),

    /// A type validation error.
    #[error(transparent)]
    Types(#[from] repod_types::Error),

    /// The `format` field is missing from the data.
    #[error("The BUILDINFO data is missing the mandatory format field")]
    MissingFormatField,

    /// The schema version is not supported.
    #[error("Unsupported BUILDINFO schema version: {0}")]
    UnsupportedSchemaVersion(String),

    /// A `SchemaVersion` with the wrong version is used to create a
    /// `BuildInfo`.
    #[error("Wrong schema version used to create a BUILDINFO: {0}")]
    WrongSchemaVersion(SchemaVersion),

    /// The build tool version is not valid for the used build tool.
    #[error("The build tool {buildtool} requires a full build tool version, but {buildtoolver} is not")]
    WrongBuildToolVersion {
        /// The name of the build tool.
        buildtool: String,
        /// The invalid build tool version.
        buildtoolver: String,
    },
}
