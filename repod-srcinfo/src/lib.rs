//! Parsing of `.SRCINFO` files.
//!
//! `.SRCINFO` files describe the sources of a pkgbase and the binary
//! packages built from it. The file consists of a single `pkgbase` section
//! followed by one or more `pkgname` sections, each holding `key = value`
//! assignments. Package sections may override a subset of the pkgbase
//! attributes.
#![forbid(unsafe_code)]

mod error;
pub use error::Error;

mod source_info;
pub use source_info::{MergedPackage, PackageBaseSection, PackageSection, SourceInfo};
