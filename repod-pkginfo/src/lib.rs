//! Parsing, validating and writing of `.PKGINFO` files.
//!
//! `.PKGINFO` files describe the contents of a package. Two schema versions
//! exist, distinguished by the presence of the `pkgtype` keyword.
#![forbid(unsafe_code)]

mod error;
pub use error::Error;

mod package_info;
pub use package_info::{PackageInfo, PackageInfoV1, PackageInfoV2};

mod schema;
pub use schema::PackageInfoSchema;
