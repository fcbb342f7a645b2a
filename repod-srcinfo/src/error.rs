//! The error type of this crate.

use std::path::PathBuf;

use thiserror::Error;

/// The error that can occur when handling `.SRCINFO` files.
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

    /// A line is not in the `key = value` format.
    #[error("Invalid line {number}: {line}")]
    InvalidLine {
        /// The line number of the offending line.
        number: usize,
        /// The offending line.
        line: String,
    },

    /// A key is not known in its section.
    #[error("Unknown key '{key}' in line {number}")]
    UnknownKey {
        /// The offending key.
        key: String,
        /// The line number of the offending line.
        number: usize,
    },

    /// A singular key occurs more than once in a section.
    #[error("The singular key '{key}' occurs more than once in the section of {section}")]
    DuplicateKey {
        /// The offending key.
        key: String,
        /// The name of the section the key occurs in.
        section: String,
    },

    /// A key occurs before the initial `pkgbase` section.
    #[error("The key '{key}' occurs before a pkgbase section is established")]
    KeyBeforePkgbase {
        /// The offending key.
        key: String,
    },

    /// A second `pkgbase` section is declared.
    #[error("A second pkgbase section ({name}) is declared")]
    DuplicatePkgbase {
        /// The name of the second pkgbase section.
        name: String,
    },

    /// A mandatory key is missing.
    #[error("The mandatory key '{key}' is missing in the section of {section}")]
    MissingKey {
        /// The missing key.
        key: &'static str,
        /// The name of the section the key is missing in.
        section: String,
    },

    /// A type validation error.
    #[error(transparent)]
    Types(#[from] repod_types::Error),

    /// An invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}
