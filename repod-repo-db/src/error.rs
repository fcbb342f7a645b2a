//! The error type of this crate.

use std::path::PathBuf;

use thiserror::Error;

/// The error that can occur when handling sync databases.
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

    /// A generic I/O error while writing.
    #[error("I/O error while {context}:\n{source}")]
    IoWrite {
        /// What was attempted when the error occurred.
        context: &'static str,
        /// The source error.
        source: std::io::Error,
    },

    /// A syntactic error in desc or files data.
    #[error("Failed parsing sync database data:\n{0}")]
    Parse(String),

    /// A mandatory section is missing.
    #[error("The mandatory section %{0}% is missing")]
    MissingSection(&'static str),

    /// A section occurs more than once.
    #[error("The section %{0}% occurs more than once")]
    DuplicateSection(String),

    /// The data does not match any known schema version.
    #[error("The data does not match any known {0} schema version")]
    NoMatchingSchema(&'static str),

    /// A path in a files list is not relative.
    #[error("The files list entry {0} is not a relative path")]
    FilesEntryNotRelative(String),

    /// A database member name can not be interpreted.
    #[error("Invalid database member name: {0}")]
    InvalidMemberName(String),

    /// A type validation error.
    #[error(transparent)]
    Types(#[from] repod_types::Error),

    /// An error while decompressing a database file.
    #[error(transparent)]
    Decompression(#[from] repod_package::Error),
}
