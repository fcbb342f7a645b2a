//! The management repository model of repod.
//!
//! The management repository is a directory of JSON files, one per pkgbase,
//! which is the canonical source of truth of a binary package repository.
//! Sync databases are regenerated from it on every publish.
#![forbid(unsafe_code)]

mod build_info;
pub use build_info::{OutputBuildInfo, OutputBuildInfoV1, OutputBuildInfoV2};

mod error;
pub use error::Error;

mod index;
pub use index::{PackageIndex, PACKAGE_INDEX_FILE_NAME};

mod output_package;
pub use output_package::{OutputPackage, PackageFiles};

mod output_package_base;
pub use output_package_base::{OutputPackageBase, OutputPackageBaseV1};

mod sync;
pub use sync::{outputpackagebases_from_database, stream_management_dir_to_database};
