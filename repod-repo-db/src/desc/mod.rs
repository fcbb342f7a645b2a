//! The `desc` member format of sync databases.

mod parser;
pub mod v1;
pub mod v2;

use std::{collections::HashSet, fmt::Display, str::FromStr};

use log::warn;
pub use parser::{Section, SectionKeyword};
use repod_types::{Name, Version};
pub use v1::RepoDescV1;
pub use v2::RepoDescV2;
use winnow::Parser;

use crate::Error;

/// The schema versions of the `desc` file format.
///
/// The two versions differ in the optionality of the `%PGPSIG%` section:
/// version 1 requires it, version 2 allows omitting it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RepoDescSchema {
    /// The first revision of the desc file format.
    V1,
    /// The second revision of the desc file format.
    #[default]
    V2,
}

impl RepoDescSchema {
    /// Derives a [`RepoDescSchema`] from a set of observed
    /// [`SectionKeyword`]s.
    ///
    /// Versions are tried from the highest to the lowest: the first version
    /// whose required sections are all present and whose allowed sections
    /// cover all observed ones wins. If the observed data only matches a
    /// version lower than the default, a warning is emitted and the lower
    /// version is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if no known schema version matches the observed
    /// sections.
    pub fn derive_from_keywords(keywords: &HashSet<SectionKeyword>) -> Result<Self, Error> {
        for schema in [RepoDescSchema::V2, RepoDescSchema::V1] {
            if schema.required().is_subset(keywords) && keywords.is_subset(&schema.allowed()) {
                if schema != RepoDescSchema::default() {
                    warn!(
                        "The desc data only matches schema version {schema:?}, \
                        while the default is {:?}",
                        RepoDescSchema::default()
                    );
                }
                return Ok(schema);
            }
        }
        Err(Error::NoMatchingSchema("desc"))
    }

    /// Returns the sections that must be present in this schema version.
    fn required(&self) -> HashSet<SectionKeyword> {
        let mut required: HashSet<SectionKeyword> = [
            SectionKeyword::Filename,
            SectionKeyword::Name,
            SectionKeyword::Base,
            SectionKeyword::Version,
            SectionKeyword::CSize,
            SectionKeyword::ISize,
            SectionKeyword::Md5Sum,
            SectionKeyword::Sha256Sum,
            SectionKeyword::Arch,
            SectionKeyword::BuildDate,
            SectionKeyword::Packager,
        ]
        .into_iter()
        .collect();
        if matches!(self, RepoDescSchema::V1) {
            required.insert(SectionKeyword::PgpSig);
        }
        required
    }

    /// Returns all sections allowed in this schema version.
    fn allowed(&self) -> HashSet<SectionKeyword> {
        let mut allowed = self.required();
        allowed.extend([
            SectionKeyword::Desc,
            SectionKeyword::Groups,
            SectionKeyword::PgpSig,
            SectionKeyword::Url,
            SectionKeyword::License,
            SectionKeyword::Replaces,
            SectionKeyword::Conflicts,
            SectionKeyword::Provides,
            SectionKeyword::Depends,
            SectionKeyword::OptDepends,
            SectionKeyword::Backup,
            SectionKeyword::MakeDepends,
            SectionKeyword::CheckDepends,
        ]);
        allowed
    }
}

/// A representation of the `desc` file format.
///
/// Tracks all available variants of the file format.
#[derive(Clone, Debug, PartialEq)]
pub enum RepoDesc {
    /// The desc version 1 file format.
    V1(RepoDescV1),
    /// The desc version 2 file format.
    V2(RepoDescV2),
}

impl RepoDesc {
    /// Returns the package name.
    pub fn get_name(&self) -> &Name {
        match self {
            RepoDesc::V1(desc) => &desc.name,
            RepoDesc::V2(desc) => &desc.name,
        }
    }

    /// Returns the pkgbase.
    pub fn get_base(&self) -> &Name {
        match self {
            RepoDesc::V1(desc) => &desc.base,
            RepoDesc::V2(desc) => &desc.base,
        }
    }

    /// Returns the package version.
    pub fn get_version(&self) -> &Version {
        match self {
            RepoDesc::V1(desc) => &desc.version,
            RepoDesc::V2(desc) => &desc.version,
        }
    }

    /// Returns the schema version of the value.
    pub fn get_schema_version(&self) -> u64 {
        match self {
            RepoDesc::V1(_) => 1,
            RepoDesc::V2(_) => 2,
        }
    }
}

impl FromStr for RepoDesc {
    type Err = Error;

    /// Creates a [`RepoDesc`] from a string slice.
    ///
    /// The schema version is derived from the set of present sections (see
    /// [`RepoDescSchema::derive_from_keywords`]).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let sections = parser::sections
            .parse(s)
            .map_err(|error| Error::Parse(error.to_string()))?;
        let keywords: HashSet<SectionKeyword> =
            sections.iter().map(|section| section.keyword()).collect();

        match RepoDescSchema::derive_from_keywords(&keywords)? {
            RepoDescSchema::V1 => Ok(RepoDesc::V1(RepoDescV1::try_from(sections)?)),
            RepoDescSchema::V2 => Ok(RepoDesc::V2(RepoDescV2::try_from(sections)?)),
        }
    }
}

impl Display for RepoDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepoDesc::V1(desc) => desc.fmt(f),
            RepoDesc::V2(desc) => desc.fmt(f),
        }
    }
}

/// Parses a string slice into a list of [`Section`]s.
pub(crate) fn parse_sections(s: &str) -> Result<Vec<Section>, Error> {
    parser::sections
        .parse(s)
        .map_err(|error| Error::Parse(error.to_string()))
}
