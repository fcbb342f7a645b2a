//! Parsers for the line oriented file formats found in pacman-style
//! repositories.
//!
//! Currently this provides [`key_value`], a serde based deserializer for
//! `key = value` files such as `.BUILDINFO` and `.PKGINFO`.
#![forbid(unsafe_code)]

pub mod key_value;
