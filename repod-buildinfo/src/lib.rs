//! Parsing, validating and writing of `.BUILDINFO` files.
//!
//! `.BUILDINFO` files describe the build environment of a package. Two
//! schema versions exist, selected by the `format` keyword.
#![forbid(unsafe_code)]

mod build_info;
pub use build_info::{BuildInfo, BuildInfoV1, BuildInfoV2};

mod error;
pub use error::Error;

mod schema;
pub use schema::BuildInfoSchema;
