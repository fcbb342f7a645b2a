//! The error type of the repository manager.

use std::path::PathBuf;

use thiserror::Error;

/// The error that can occur when managing a repository.
///
/// The variants follow the kinds of failures in the system: I/O failures
/// ([`Error::File`], [`Error::FileNotFound`]), syntactic failures
/// ([`Error::FileParse`]), semantic failures on constructed values
/// ([`Error::Validation`]) and failures raised by tasks outside of their
/// state machine ([`Error::Task`]).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O failure at a specific path.
    #[error("File error at {path} while {context}:\n{source}")]
    File {
        /// The path the error occurred at.
        path: PathBuf,
        /// What was attempted when the error occurred.
        context: &'static str,
        /// The source error.
        source: std::io::Error,
    },

    /// A file does not exist.
    #[error("The file {0} does not exist")]
    FileNotFound(PathBuf),

    /// A syntactic failure while parsing a file.
    #[error("File parse error: {0}")]
    FileParse(String),

    /// A semantic failure on a constructed value.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A failure raised by a task outside of its state machine.
    #[error("Task error: {0}")]
    Task(String),

    /// A type validation error.
    #[error(transparent)]
    Types(#[from] repod_types::Error),

    /// An error while reading a package file.
    #[error(transparent)]
    Package(#[from] repod_package::Error),

    /// An error while handling management repository data.
    #[error(transparent)]
    Management(#[from] repod_management::Error),

    /// An error while handling sync database data.
    #[error(transparent)]
    RepoDb(#[from] repod_repo_db::Error),

    /// An error while handling `.BUILDINFO` data.
    #[error(transparent)]
    BuildInfo(#[from] repod_buildinfo::Error),

    /// An error while handling `.PKGINFO` data.
    #[error(transparent)]
    PackageInfo(#[from] repod_pkginfo::Error),

    /// An error while handling `.MTREE` data.
    #[error(transparent)]
    Mtree(#[from] repod_mtree::Error),

    /// An error while handling `.SRCINFO` data.
    #[error(transparent)]
    SourceInfo(#[from] repod_srcinfo::Error),
}
