//! The error type of this crate.

use std::path::PathBuf;

use thiserror::Error;

/// The error that can occur when handling `.MTREE` files.
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

    /// A syntactic error in the MTREE data.
    #[error("Failed parsing MTREE data:\n{0}")]
    Parse(String),

    /// A mandatory property is missing for a path.
    #[error("The path {path} is missing the mandatory property '{property}'")]
    MissingProperty {
        /// The path the property is missing for.
        path: PathBuf,
        /// The name of the missing property.
        property: &'static str,
    },

    /// A system id is outside of the allowed range.
    #[error("The path {path} carries the {kind} {id}, which is outside of the range 0..1000")]
    SystemIdOutOfRange {
        /// The path the id belongs to.
        path: PathBuf,
        /// Whether the id is a `uid` or a `gid`.
        kind: &'static str,
        /// The offending id.
        id: u32,
    },

    /// A modification time is negative.
    #[error("The path {path} carries the negative modification time {time}")]
    NegativeTime {
        /// The path the time belongs to.
        path: PathBuf,
        /// The offending modification time.
        time: f64,
    },
}
