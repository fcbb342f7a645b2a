//! The per-pkgbase management record.

use std::{
    fs::File,
    io::Read,
    path::Path,
    str::FromStr,
};

use log::debug;
use repod_package::Package;
use repod_repo_db::{
    desc::{RepoDesc, RepoDescSchema},
    files::FilesV1,
};
use repod_types::{Name, PackageType, Packager, Version};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::{Error, OutputBuildInfo, OutputPackage};

/// The highest supported schema version of management records.
const SUPPORTED_SCHEMA_VERSION: u64 = 1;

/// A management record in schema version 1.
///
/// One record describes all packages built from a single pkgbase. Fields
/// are kept in alphabetical order, which yields sorted keys in the JSON
/// representation.
#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OutputPackageBaseV1 {
    /// The name of the pkgbase.
    #[serde_as(as = "DisplayFromStr")]
    pub base: Name,

    /// The optional build metadata of the pkgbase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buildinfo: Option<OutputBuildInfo>,

    /// The build-time dependencies of the pkgbase.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub makedepends: Vec<String>,

    /// The packager of the pkgbase.
    #[serde_as(as = "DisplayFromStr")]
    pub packager: Packager,

    /// The packages built from the pkgbase.
    pub packages: Vec<OutputPackage>,

    /// The schema version of the object.
    pub schema_version: u64,

    /// The optional upstream source URL of the pkgbase.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<url::Url>,

    /// The version of the pkgbase.
    #[serde_as(as = "DisplayFromStr")]
    pub version: Version,
}

/// A representation of the management record file format.
///
/// Tracks all available schema versions of the management record.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputPackageBase {
    /// The management record in schema version 1.
    V1(OutputPackageBaseV1),
}

impl OutputPackageBase {
    /// Creates an [`OutputPackageBase`] from a list of [`Package`]s of the
    /// same pkgbase.
    ///
    /// # Errors
    ///
    /// Returns an error if
    ///
    /// - `packages` is empty,
    /// - the packages belong to multiple pkgbases,
    /// - a package name occurs more than once,
    /// - any package diverges from the version of the pkgbase,
    /// - or debug and non-debug packages are mixed.
    pub fn from_packages(packages: &[Package]) -> Result<Self, Error> {
        let Some(first) = packages.first() else {
            return Err(Error::NoPackages);
        };

        let base = first.package_info().base().clone();
        let version = first.package_info().version().clone();

        debug!("Creating management record for pkgbase {base}...");

        let mut bases: Vec<String> = packages
            .iter()
            .map(|package| package.package_info().base().to_string())
            .collect();
        bases.sort();
        bases.dedup();
        if bases.len() > 1 {
            return Err(Error::MultiplePkgbases(bases));
        }

        let mut names: Vec<&Name> = Vec::new();
        for package in packages {
            let name = package.package_info().name();
            if names.contains(&name) {
                return Err(Error::DuplicatePackageName(name.to_string()));
            }
            names.push(name);

            if package.package_info().version() != &version {
                return Err(Error::DivergentVersion {
                    name: name.to_string(),
                    version: package.package_info().version().to_string(),
                    base_version: version.to_string(),
                });
            }
        }

        let debug_states: Vec<bool> = packages
            .iter()
            .map(|package| {
                package.package_info().package_type() == Some(PackageType::Debug)
            })
            .collect();
        if debug_states.iter().any(|debug| *debug) && !debug_states.iter().all(|debug| *debug) {
            return Err(Error::MixedDebugPackages(base.to_string()));
        }

        Ok(OutputPackageBase::V1(OutputPackageBaseV1 {
            base,
            buildinfo: Some(first.build_info().into()),
            makedepends: first.package_info().makedepends().to_vec(),
            packager: first.package_info().packager().clone(),
            packages: packages
                .iter()
                .map(OutputPackage::from_package)
                .collect::<Result<Vec<_>, Error>>()?,
            schema_version: 1,
            source_url: None,
            version,
        }))
    }

    /// Creates an [`OutputPackageBase`] from the JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if
    ///
    /// - the file can not be read,
    /// - the JSON payload is syntactically broken,
    /// - the `schema_version` of the document is newer than the supported
    ///   one,
    /// - or the payload does not match the expected shape.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("Reading management record {path:?}...");

        let mut data = String::new();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut data))
            .map_err(|source| Error::IoPath {
                path: path.to_path_buf(),
                context: "reading a management record",
                source,
            })?;

        let value: serde_json::Value =
            serde_json::from_str(&data).map_err(|source| Error::JsonParse {
                path: path.to_path_buf(),
                source,
            })?;

        let found = value
            .get("schema_version")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(SUPPORTED_SCHEMA_VERSION);
        if found > SUPPORTED_SCHEMA_VERSION {
            return Err(Error::SchemaVersionTooNew {
                path: path.to_path_buf(),
                found,
                supported: SUPPORTED_SCHEMA_VERSION,
            });
        }

        serde_json::from_value(value).map_err(|source| Error::JsonValidation {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns the name of the pkgbase.
    pub fn base(&self) -> &Name {
        match self {
            OutputPackageBase::V1(record) => &record.base,
        }
    }

    /// Returns the version of the pkgbase.
    pub fn version(&self) -> &Version {
        match self {
            OutputPackageBase::V1(record) => &record.version,
        }
    }

    /// Returns the packager of the pkgbase.
    pub fn packager(&self) -> &Packager {
        match self {
            OutputPackageBase::V1(record) => &record.packager,
        }
    }

    /// Returns the packages of the record.
    pub fn packages(&self) -> &[OutputPackage] {
        match self {
            OutputPackageBase::V1(record) => &record.packages,
        }
    }

    /// Returns the optional upstream source URL of the pkgbase.
    pub fn source_url(&self) -> Option<&url::Url> {
        match self {
            OutputPackageBase::V1(record) => record.source_url.as_ref(),
        }
    }

    /// Sets the upstream source URL of the pkgbase.
    pub fn set_source_url(&mut self, source_url: Option<url::Url>) {
        match self {
            OutputPackageBase::V1(record) => record.source_url = source_url,
        }
    }

    /// Returns the names of the packages of the record.
    pub fn package_names(&self) -> Vec<&Name> {
        self.packages().iter().map(|package| &package.name).collect()
    }

    /// Adds packages to the record.
    pub fn add_packages(&mut self, packages: Vec<OutputPackage>) {
        match self {
            OutputPackageBase::V1(record) => record.packages.extend(packages),
        }
    }

    /// Returns the `desc` and optional `files` members of all packages of
    /// the record, in the requested schema versions.
    ///
    /// # Errors
    ///
    /// Returns an error if any package can not be rendered in the requested
    /// `desc` schema version.
    pub fn packages_as_models(
        &self,
        desc_schema: RepoDescSchema,
    ) -> Result<Vec<(RepoDesc, Option<FilesV1>)>, Error> {
        let OutputPackageBase::V1(record) = self;
        record
            .packages
            .iter()
            .map(|package| {
                package.to_models(
                    &record.base,
                    &record.version,
                    &record.packager,
                    &record.makedepends,
                    desc_schema,
                )
            })
            .collect()
    }

    /// Returns the canonical JSON representation of the record.
    ///
    /// The representation uses two-space indentation, sorted keys and a
    /// trailing newline.
    pub fn to_json(&self) -> Result<String, Error> {
        let mut json = serde_json::to_string_pretty(self).map_err(Error::JsonSerialize)?;
        json.push('\n');
        Ok(json)
    }

    /// Returns the file name of the record in a management repository.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.base())
    }
}

impl FromStr for OutputPackageBase {
    type Err = Error;

    /// Creates an [`OutputPackageBase`] from a JSON string slice.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(|source| Error::JsonParse {
            path: Default::default(),
            source,
        })
    }
}
