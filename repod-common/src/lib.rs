//! Common traits shared by the versioned file formats of the repod crates.
#![forbid(unsafe_code)]

use std::{
    fs::File,
    io::Read,
    path::Path,
    str::FromStr,
};

use repod_types::SchemaVersion;

/// A trait for file format schemas.
///
/// File formats such as `.BUILDINFO` exist in multiple numbered variants. A
/// type implementing [`FileFormatSchema`] represents the set of known
/// variants of one format and can derive the variant matching a given input.
pub trait FileFormatSchema: Sized + FromStr {
    /// The error type returned by the schema derivation methods.
    type Err;

    /// Returns the [`SchemaVersion`] of the schema.
    fn inner(&self) -> &SchemaVersion;

    /// Derives a schema from the file at `path`.
    fn derive_from_file(path: impl AsRef<Path>) -> Result<Self, <Self as FileFormatSchema>::Err>;

    /// Derives a schema from the data in `reader`.
    fn derive_from_reader(reader: impl Read) -> Result<Self, <Self as FileFormatSchema>::Err>;

    /// Derives a schema from a string slice.
    fn derive_from_str(s: &str) -> Result<Self, <Self as FileFormatSchema>::Err>;
}

/// A trait for metadata files that exist in multiple schema versions.
///
/// Provides a uniform construction interface: from a file, a reader or a
/// string slice, optionally validated against a specific schema. Without an
/// explicit schema, the schema is derived from the input.
pub trait MetadataFile<S: FileFormatSchema>: Sized {
    /// The error type returned by the construction methods.
    type Err;

    /// Creates the metadata representation from the file at `path`.
    ///
    /// The schema is derived from the file contents.
    fn from_file(path: impl AsRef<Path>) -> Result<Self, Self::Err> {
        Self::from_file_with_schema(path, None)
    }

    /// Creates the metadata representation from the file at `path`,
    /// optionally validated against `schema`.
    fn from_file_with_schema(
        path: impl AsRef<Path>,
        schema: Option<S>,
    ) -> Result<Self, Self::Err>;

    /// Creates the metadata representation from `reader`.
    ///
    /// The schema is derived from the reader contents.
    fn from_reader(reader: File) -> Result<Self, Self::Err> {
        Self::from_reader_with_schema(reader, None)
    }

    /// Creates the metadata representation from `reader`, optionally
    /// validated against `schema`.
    fn from_reader_with_schema(reader: impl Read, schema: Option<S>)
        -> Result<Self, Self::Err>;

    /// Creates the metadata representation from a string slice, optionally
    /// validated against `schema`.
    fn from_str_with_schema(s: &str, schema: Option<S>) -> Result<Self, Self::Err>;
}
