//! Parsing and validating of `.MTREE` files.
//!
//! `.MTREE` files describe the file system layout of a package as a
//! gzip-compressed text file in the BSD mtree format. Lines either declare
//! defaults for subsequent entries (`/set`, `/unset`) or describe a path.
#![forbid(unsafe_code)]

mod error;
pub use error::Error;

mod mtree;
pub use mtree::{EntryKind, Mtree, MtreeEntry};

mod parser;
mod path_decoder;
