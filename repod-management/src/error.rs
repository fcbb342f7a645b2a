//! The error type of this crate.

use std::path::PathBuf;

use thiserror::Error;

/// The error that can occur when handling management repository data.
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

    /// No JSON files are present in a management repository directory.
    #[error("There are no JSON files in {0}")]
    NoJsonFiles(PathBuf),

    /// A JSON document is syntactically broken.
    #[error("Failed parsing the JSON document {path}:\n{source}")]
    JsonParse {
        /// The path of the JSON document.
        path: PathBuf,
        /// The source error.
        source: serde_json::Error,
    },

    /// A JSON document does not have the expected shape.
    #[error("Failed validating the JSON document {path}:\n{source}")]
    JsonValidation {
        /// The path of the JSON document.
        path: PathBuf,
        /// The source error.
        source: serde_json::Error,
    },

    /// Serializing a value as JSON failed.
    #[error("Failed serializing a value as JSON:\n{0}")]
    JsonSerialize(#[source] serde_json::Error),

    /// The schema version of a document is newer than the supported one.
    #[error("The schema version {found} of {path} is newer than the supported version {supported}")]
    SchemaVersionTooNew {
        /// The path of the document.
        path: PathBuf,
        /// The schema version found in the document.
        found: u64,
        /// The highest supported schema version.
        supported: u64,
    },

    /// No packages are provided to create a record from.
    #[error("Can not create a management record from an empty list of packages")]
    NoPackages,

    /// Packages of multiple pkgbases are provided.
    #[error("The packages belong to multiple pkgbases: {0:?}")]
    MultiplePkgbases(Vec<String>),

    /// Multiple packages of the same name are provided.
    #[error("The package name {0} occurs more than once")]
    DuplicatePackageName(String),

    /// A package diverges from the pkgbase version.
    #[error("The package {name} has version {version}, which diverges from the pkgbase version {base_version}")]
    DivergentVersion {
        /// The name of the offending package.
        name: String,
        /// The version of the offending package.
        version: String,
        /// The version of the pkgbase.
        base_version: String,
    },

    /// Debug and non-debug packages are mixed.
    #[error("The packages of pkgbase {0} mix debug and non-debug package types")]
    MixedDebugPackages(String),

    /// An error while handling sync database data.
    #[error(transparent)]
    RepoDb(#[from] repod_repo_db::Error),

    /// An error while reading a package file.
    #[error(transparent)]
    Package(#[from] repod_package::Error),

    /// A type validation error.
    #[error(transparent)]
    Types(#[from] repod_types::Error),
}
