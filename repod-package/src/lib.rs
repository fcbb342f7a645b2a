//! Reading of package files and their embedded metadata.
//!
//! A package file is a (possibly compressed) tar archive carrying the three
//! metadata members `.BUILDINFO`, `.PKGINFO` and `.MTREE` next to the
//! payload of the package. This crate assembles a [`Package`] value from
//! such an archive.
#![forbid(unsafe_code)]

mod decompression;
pub use decompression::CompressionDecoder;

mod error;
pub use error::Error;

mod package;
pub use package::Package;
