//! Configuration and repository layout resolution.
//!
//! Settings form a tree: the top-level [`Settings`] provides defaults that
//! each [`PackageRepo`] may override. Validation is performed on load and
//! enforces the non-overlap invariants between all distinguished
//! directories.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    str::FromStr,
};

use log::debug;
use repod_types::{Architecture, CompressionType};
use serde::Deserialize;
use url::Url;

use crate::{verification::VerificationType, Error};

/// The default configuration file location of the system-wide mode.
pub const SYSTEM_SETTINGS_LOCATION: &str = "/etc/repod.conf";

/// The default package repository base of the system-wide mode.
const SYSTEM_PACKAGE_REPO_BASE: &str = "/var/lib/repod/repo";

/// The default source repository base of the system-wide mode.
const SYSTEM_SOURCE_REPO_BASE: &str = "/var/lib/repod/source";

/// The default management repository directory of the system-wide mode.
const SYSTEM_MANAGEMENT_REPO: &str = "/var/lib/repod/management/default";

/// The default package pool of the system-wide mode.
const SYSTEM_PACKAGE_POOL: &str = "/var/lib/repod/pool/package";

/// The default source pool of the system-wide mode.
const SYSTEM_SOURCE_POOL: &str = "/var/lib/repod/pool/source";

/// Returns the per-user configuration file location.
pub fn user_settings_location() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("repod/repod.conf"))
}

/// The kind of directory resolved by [`Settings::get_repo_path`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RepoDirKind {
    /// The management repository directory of a repository.
    Management,
    /// The package repository directory of a repository.
    Package,
    /// The source repository directory of a repository.
    Source,
    /// The package pool directory of a repository.
    PackagePool,
    /// The source pool directory of a repository.
    SourcePool,
}

/// The flavor of a repository.
///
/// Each repository may be published in up to four flavors, each a
/// separately published view.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RepoFlavor {
    /// The stable view of a repository.
    #[default]
    Stable,
    /// The debug view of a repository.
    Debug,
    /// The staging view of a repository.
    Staging,
    /// The testing view of a repository.
    Testing,
}

impl RepoFlavor {
    /// Creates a [`RepoFlavor`] from the three selector flags.
    ///
    /// # Errors
    ///
    /// Returns an error if more than one flag is set.
    pub fn from_flags(debug: bool, staging: bool, testing: bool) -> Result<Self, Error> {
        match (debug, staging, testing) {
            (false, false, false) => Ok(RepoFlavor::Stable),
            (true, false, false) => Ok(RepoFlavor::Debug),
            (false, true, false) => Ok(RepoFlavor::Staging),
            (false, false, true) => Ok(RepoFlavor::Testing),
            _ => Err(Error::Validation(
                "only one of the debug, staging and testing flavors may be selected".to_string(),
            )),
        }
    }
}

/// Settings for the validation of pkgbase source URLs.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct UrlValidationSettings {
    /// The URL schemes accepted for source URLs.
    #[serde(default = "default_schemes")]
    pub schemes: Vec<String>,

    /// URL prefixes, one of which source URLs must start with.
    ///
    /// An empty list accepts any URL of an allowed scheme.
    #[serde(default)]
    pub prefixes: Vec<String>,
}

/// Returns the default URL schemes.
fn default_schemes() -> Vec<String> {
    vec!["https".to_string()]
}

impl UrlValidationSettings {
    /// Returns whether `url` passes the validation settings.
    pub fn validate_url(&self, url: &Url) -> bool {
        if !self.schemes.iter().any(|scheme| scheme == url.scheme()) {
            return false;
        }
        self.prefixes.is_empty()
            || self
                .prefixes
                .iter()
                .any(|prefix| url.as_str().starts_with(prefix.as_str()))
    }
}

/// The description of a management repository.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ManagementRepo {
    /// The directory of the management repository.
    pub directory: PathBuf,

    /// The optional upstream VCS URL of the management repository.
    #[serde(default)]
    pub url: Option<Url>,
}

/// The description of a single package repository.
///
/// All optional attributes fall back to the corresponding attribute of the
/// surrounding [`Settings`].
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PackageRepo {
    /// The name of the repository.
    pub name: String,

    /// The optional CPU architecture override.
    #[serde(default)]
    pub architecture: Option<Architecture>,

    /// The optional name of the debug flavor of the repository.
    #[serde(default)]
    pub debug: Option<String>,

    /// The optional name of the staging flavor of the repository.
    #[serde(default)]
    pub staging: Option<String>,

    /// The optional name of the testing flavor of the repository.
    #[serde(default)]
    pub testing: Option<String>,

    /// The optional management repository override.
    #[serde(default)]
    pub management_repo: Option<ManagementRepo>,

    /// The optional package pool override.
    #[serde(default)]
    pub package_pool: Option<PathBuf>,

    /// The optional source pool override.
    #[serde(default)]
    pub source_pool: Option<PathBuf>,

    /// The optional sync database compression override.
    #[serde(default)]
    pub database_compression: Option<CompressionType>,

    /// The optional source URL validation settings of the repository.
    #[serde(default)]
    pub package_url_validation: Option<UrlValidationSettings>,
}

/// The settings of the repository manager.
///
/// ## Examples
/// ```
/// use repod::config::Settings;
///
/// # fn main() -> testresult::TestResult {
/// # let tmp = tempfile::TempDir::new()?;
/// # let base = tmp.path().display();
/// let settings = Settings::from_str_unvalidated(&format!(
///     r#"
/// architecture = "x86_64"
/// package_repo_base = "{base}/repo"
/// source_repo_base = "{base}/source"
/// package_pool = "{base}/pool/package"
/// source_pool = "{base}/pool/source"
///
/// [management_repo]
/// directory = "{base}/management"
///
/// [[repositories]]
/// name = "default"
/// debug = "default-debug"
/// staging = "default-staging"
/// testing = "default-testing"
/// "#
/// ))?;
/// assert_eq!(settings.repositories.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// The default CPU architecture of all repositories.
    #[serde(default)]
    pub architecture: Option<Architecture>,

    /// The default management repository of all repositories.
    #[serde(default)]
    pub management_repo: Option<ManagementRepo>,

    /// The default package pool of all repositories.
    #[serde(default)]
    pub package_pool: Option<PathBuf>,

    /// The default source pool of all repositories.
    #[serde(default)]
    pub source_pool: Option<PathBuf>,

    /// The base directory below which package repository directories are
    /// created.
    pub package_repo_base: PathBuf,

    /// The base directory below which source repository directories are
    /// created.
    pub source_repo_base: PathBuf,

    /// The default compression of sync databases.
    #[serde(default)]
    pub database_compression: CompressionType,

    /// The optional type of package verification to run on added packages.
    #[serde(default)]
    pub package_verification: Option<VerificationType>,

    /// The configured package repositories.
    pub repositories: Vec<PackageRepo>,
}

/// Validates that `directory` is usable as a writable directory.
///
/// The directory must be absolute. It must either exist as a writable
/// directory, or its parent must exist as a writable directory.
fn validate_directory(directory: &Path) -> Result<(), Error> {
    if !directory.is_absolute() {
        return Err(Error::Validation(format!(
            "The directory '{}' is not an absolute path",
            directory.display()
        )));
    }
    let checked = if directory.exists() {
        directory
    } else {
        let parent = directory.parent().ok_or_else(|| {
            Error::Validation(format!(
                "The directory '{}' does not have a parent directory",
                directory.display()
            ))
        })?;
        if !parent.exists() {
            return Err(Error::Validation(format!(
                "The parent directory of '{}' does not exist",
                directory.display()
            )));
        }
        parent
    };

    let metadata = checked.metadata().map_err(|source| Error::File {
        path: checked.to_path_buf(),
        context: "reading directory metadata",
        source,
    })?;
    if !metadata.is_dir() {
        return Err(Error::Validation(format!(
            "Not a directory: '{}'",
            checked.display()
        )));
    }
    if metadata.permissions().readonly() {
        return Err(Error::Validation(format!(
            "The directory '{}' is not writable",
            checked.display()
        )));
    }

    Ok(())
}

/// Validates a repository (flavor) name.
///
/// Names must be non-empty single path components consisting of lowercase
/// alphanumerics, `_` and `-`, and must not start with `.` or `-`.
fn validate_repo_name(name: &str) -> Result<(), Error> {
    let valid = !name.is_empty()
        && !name.starts_with(['.', '-'])
        && name
            .bytes()
            .all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || matches!(byte, b'_' | b'-'));
    if !valid {
        return Err(Error::Validation(format!(
            "The repository name '{name}' is not a valid single path component"
        )));
    }
    Ok(())
}

/// Returns an error if `path` equals `other` or either is an ancestor of
/// the other.
fn ensure_no_overlap(
    path: &Path,
    path_name: &str,
    other: &Path,
    other_name: &str,
) -> Result<(), Error> {
    if path == other {
        return Err(Error::Validation(format!(
            "The {path_name} '{}' and the {other_name} '{}' are equal",
            path.display(),
            other.display()
        )));
    }
    if path.starts_with(other) || other.starts_with(path) {
        return Err(Error::Validation(format!(
            "The {path_name} '{}' and the {other_name} '{}' overlap",
            path.display(),
            other.display()
        )));
    }
    Ok(())
}

impl Settings {
    /// Creates [`Settings`] from the TOML file at `path` and validates
    /// them.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can not be read or parsed, or if
    /// validation fails (see [`Settings::validate`]).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("Reading settings from {path:?}...");
        let data = std::fs::read_to_string(path).map_err(|source| Error::File {
            path: path.to_path_buf(),
            context: "reading a configuration file",
            source,
        })?;
        let settings = Self::from_str_unvalidated(&data)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Creates [`Settings`] from a TOML string slice without validating
    /// them.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid TOML or does not match
    /// the settings shape.
    pub fn from_str_unvalidated(data: &str) -> Result<Self, Error> {
        toml::from_str(data).map_err(|error| Error::FileParse(error.to_string()))
    }

    /// Validates the settings.
    ///
    /// Enforces that
    ///
    /// - at least one repository is configured,
    /// - all distinguished directories are absolute and writable (or their
    ///   parents are),
    /// - every repository resolves an architecture, a management
    ///   repository, a package pool and a source pool,
    /// - repository, staging, testing and debug names are valid and
    ///   distinct path components,
    /// - the (name, architecture) tuples of all repositories are unique,
    /// - and none of the distinguished directories are equal or in an
    ///   ancestor relation.
    pub fn validate(&self) -> Result<(), Error> {
        if self.repositories.is_empty() {
            return Err(Error::Validation(
                "There are no repositories defined".to_string(),
            ));
        }

        validate_directory(&self.package_repo_base)?;
        validate_directory(&self.source_repo_base)?;

        let mut management_dirs: Vec<PathBuf> = Vec::new();
        let mut package_pools: Vec<PathBuf> = Vec::new();
        let mut source_pools: Vec<PathBuf> = Vec::new();
        let mut names_architectures: HashSet<(String, Architecture)> = HashSet::new();

        for repo in &self.repositories {
            validate_repo_name(&repo.name)?;

            let architecture = repo.architecture.or(self.architecture).ok_or_else(|| {
                Error::Validation(format!(
                    "The repository '{}' does not have a CPU architecture associated with it",
                    repo.name
                ))
            })?;
            let management_repo = repo
                .management_repo
                .as_ref()
                .or(self.management_repo.as_ref())
                .ok_or_else(|| {
                    Error::Validation(format!(
                        "The repository '{}' does not have a management repository associated with it",
                        repo.name
                    ))
                })?;
            let package_pool = repo
                .package_pool
                .as_ref()
                .or(self.package_pool.as_ref())
                .ok_or_else(|| {
                    Error::Validation(format!(
                        "The repository '{}' does not have a package pool associated with it",
                        repo.name
                    ))
                })?;
            let source_pool = repo
                .source_pool
                .as_ref()
                .or(self.source_pool.as_ref())
                .ok_or_else(|| {
                    Error::Validation(format!(
                        "The repository '{}' does not have a source pool associated with it",
                        repo.name
                    ))
                })?;

            validate_directory(&management_repo.directory)?;
            validate_directory(package_pool)?;
            validate_directory(source_pool)?;

            // flavor names must be valid and distinct path components
            let mut flavor_names = vec![repo.name.as_str()];
            for flavor in [&repo.debug, &repo.staging, &repo.testing]
                .into_iter()
                .flatten()
            {
                validate_repo_name(flavor)?;
                flavor_names.push(flavor.as_str());
            }
            let unique_flavors: HashSet<&str> = flavor_names.iter().copied().collect();
            if unique_flavors.len() != flavor_names.len() {
                return Err(Error::Validation(format!(
                    "The repository '{}' uses duplicate names for its flavors",
                    repo.name
                )));
            }

            if !names_architectures.insert((repo.name.clone(), architecture)) {
                return Err(Error::Validation(format!(
                    "The combination of repository name '{}' and architecture '{architecture}' \
                    is not unique",
                    repo.name
                )));
            }

            management_dirs.push(management_repo.directory.clone());
            package_pools.push(package_pool.clone());
            source_pools.push(source_pool.clone());
        }

        management_dirs.dedup();
        package_pools.dedup();
        source_pools.dedup();

        // no two of the distinguished directories may be equal or an
        // ancestor of another
        let categories: [(&str, Vec<&Path>); 5] = [
            ("package repository base", vec![self.package_repo_base.as_path()]),
            ("source repository base", vec![self.source_repo_base.as_path()]),
            (
                "management repository",
                management_dirs.iter().map(PathBuf::as_path).collect(),
            ),
            (
                "package pool",
                package_pools.iter().map(PathBuf::as_path).collect(),
            ),
            (
                "source pool",
                source_pools.iter().map(PathBuf::as_path).collect(),
            ),
        ];
        for (index, (path_name, paths)) in categories.iter().enumerate() {
            for (other_name, others) in categories.iter().skip(index + 1) {
                for path in paths {
                    for other in others {
                        ensure_no_overlap(path, path_name, other, other_name)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Returns the repository matching `name` and `architecture`.
    ///
    /// If `architecture` is [`None`], the settings-wide architecture is
    /// used for comparison.
    ///
    /// # Errors
    ///
    /// Returns an error if no matching repository is configured.
    pub fn get_repo(
        &self,
        name: &str,
        architecture: Option<Architecture>,
    ) -> Result<&PackageRepo, Error> {
        self.repositories
            .iter()
            .find(|repo| {
                repo.name == name
                    && match architecture {
                        Some(architecture) => {
                            repo.architecture.or(self.architecture) == Some(architecture)
                        }
                        None => true,
                    }
            })
            .ok_or_else(|| {
                Error::Validation(format!(
                    "No repository matching name '{name}' and architecture {architecture:?} \
                    is configured"
                ))
            })
    }

    /// Returns the architecture of the repository matching `name`.
    pub fn get_repo_architecture(
        &self,
        name: &str,
        architecture: Option<Architecture>,
    ) -> Result<Architecture, Error> {
        let repo = self.get_repo(name, architecture)?;
        repo.architecture.or(self.architecture).ok_or_else(|| {
            Error::Validation(format!(
                "The repository '{name}' does not have a CPU architecture associated with it"
            ))
        })
    }

    /// Returns the sync database compression of the repository matching
    /// `name`.
    pub fn get_repo_database_compression(
        &self,
        name: &str,
        architecture: Option<Architecture>,
    ) -> Result<CompressionType, Error> {
        let repo = self.get_repo(name, architecture)?;
        Ok(repo.database_compression.unwrap_or(self.database_compression))
    }

    /// Resolves a directory of the repository matching `name`.
    ///
    /// The combination of `kind` and [`RepoFlavor`] deterministically maps
    /// to one concrete directory:
    ///
    /// - management directory: `{management_repo}/{architecture}/{flavor}`
    /// - package directory: `{package_repo_base}/{flavor}/{architecture}`
    /// - source directory: `{source_repo_base}/{flavor}/{architecture}`
    /// - package pool: `{package_pool}/{name}`
    /// - source pool: `{source_pool}/{name}`
    ///
    /// # Errors
    ///
    /// Returns an error if no matching repository is configured, or if the
    /// requested flavor is not configured for the repository.
    pub fn get_repo_path(
        &self,
        kind: RepoDirKind,
        name: &str,
        architecture: Option<Architecture>,
        flavor: RepoFlavor,
    ) -> Result<PathBuf, Error> {
        let repo = self.get_repo(name, architecture)?;
        let architecture = self.get_repo_architecture(name, architecture)?;

        let flavor_name = match flavor {
            RepoFlavor::Stable => repo.name.as_str(),
            RepoFlavor::Debug => repo.debug.as_deref().ok_or_else(|| {
                Error::Validation(format!(
                    "The repository '{name}' does not define a debug flavor"
                ))
            })?,
            RepoFlavor::Staging => repo.staging.as_deref().ok_or_else(|| {
                Error::Validation(format!(
                    "The repository '{name}' does not define a staging flavor"
                ))
            })?,
            RepoFlavor::Testing => repo.testing.as_deref().ok_or_else(|| {
                Error::Validation(format!(
                    "The repository '{name}' does not define a testing flavor"
                ))
            })?,
        };

        let path = match kind {
            RepoDirKind::Management => {
                let management_repo = repo
                    .management_repo
                    .as_ref()
                    .or(self.management_repo.as_ref())
                    .ok_or_else(|| {
                        Error::Validation(format!(
                            "The repository '{name}' does not have a management repository \
                            associated with it"
                        ))
                    })?;
                management_repo
                    .directory
                    .join(architecture.to_string())
                    .join(flavor_name)
            }
            RepoDirKind::Package => self
                .package_repo_base
                .join(flavor_name)
                .join(architecture.to_string()),
            RepoDirKind::Source => self
                .source_repo_base
                .join(flavor_name)
                .join(architecture.to_string()),
            RepoDirKind::PackagePool => {
                let package_pool = repo
                    .package_pool
                    .as_ref()
                    .or(self.package_pool.as_ref())
                    .ok_or_else(|| {
                        Error::Validation(format!(
                            "The repository '{name}' does not have a package pool associated \
                            with it"
                        ))
                    })?;
                package_pool.join(&repo.name)
            }
            RepoDirKind::SourcePool => {
                let source_pool = repo
                    .source_pool
                    .as_ref()
                    .or(self.source_pool.as_ref())
                    .ok_or_else(|| {
                        Error::Validation(format!(
                            "The repository '{name}' does not have a source pool associated \
                            with it"
                        ))
                    })?;
                source_pool.join(&repo.name)
            }
        };

        Ok(path)
    }

    /// Returns the default settings of the system-wide mode.
    ///
    /// Used when no configuration file is present.
    pub fn system_defaults() -> Self {
        Settings {
            architecture: None,
            management_repo: Some(ManagementRepo {
                directory: PathBuf::from(SYSTEM_MANAGEMENT_REPO),
                url: None,
            }),
            package_pool: Some(PathBuf::from(SYSTEM_PACKAGE_POOL)),
            source_pool: Some(PathBuf::from(SYSTEM_SOURCE_POOL)),
            package_repo_base: PathBuf::from(SYSTEM_PACKAGE_REPO_BASE),
            source_repo_base: PathBuf::from(SYSTEM_SOURCE_REPO_BASE),
            database_compression: CompressionType::default(),
            package_verification: None,
            repositories: Vec::new(),
        }
    }
}

impl FromStr for Settings {
    type Err = Error;

    /// Creates validated [`Settings`] from a TOML string slice.
    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let settings = Self::from_str_unvalidated(data)?;
        settings.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use rstest::rstest;
    use tempfile::TempDir;
    use testresult::TestResult;

    use super::*;

    /// Returns validated settings over directories below `base`.
    pub(crate) fn settings_below(base: &Path) -> Settings {
        for dir in ["repo", "source", "management", "pool/package", "pool/source"] {
            std::fs::create_dir_all(base.join(dir)).expect("directory creation works");
        }
        Settings {
            architecture: Some(Architecture::Any),
            management_repo: Some(ManagementRepo {
                directory: base.join("management"),
                url: None,
            }),
            package_pool: Some(base.join("pool/package")),
            source_pool: Some(base.join("pool/source")),
            package_repo_base: base.join("repo"),
            source_repo_base: base.join("source"),
            database_compression: CompressionType::Gzip,
            package_verification: None,
            repositories: vec![PackageRepo {
                name: "test".to_string(),
                architecture: None,
                debug: Some("test-debug".to_string()),
                staging: Some("test-staging".to_string()),
                testing: Some("test-testing".to_string()),
                management_repo: None,
                package_pool: None,
                source_pool: None,
                database_compression: None,
                package_url_validation: None,
            }],
        }
    }

    #[rstest]
    fn settings_validate() -> TestResult {
        let dir = TempDir::new()?;
        settings_below(dir.path()).validate()?;
        Ok(())
    }

    #[rstest]
    fn settings_no_repositories() -> TestResult {
        let dir = TempDir::new()?;
        let mut settings = settings_below(dir.path());
        settings.repositories.clear();
        assert!(settings.validate().is_err());
        Ok(())
    }

    #[rstest]
    fn settings_pool_in_repo_base() -> TestResult {
        let dir = TempDir::new()?;
        let mut settings = settings_below(dir.path());
        settings.package_pool = Some(dir.path().join("repo/pool"));
        assert!(settings.validate().is_err());
        Ok(())
    }

    #[rstest]
    fn settings_equal_bases() -> TestResult {
        let dir = TempDir::new()?;
        let mut settings = settings_below(dir.path());
        settings.source_repo_base = settings.package_repo_base.clone();
        assert!(settings.validate().is_err());
        Ok(())
    }

    #[rstest]
    fn settings_management_in_pool() -> TestResult {
        let dir = TempDir::new()?;
        let mut settings = settings_below(dir.path());
        settings.management_repo = Some(ManagementRepo {
            directory: dir.path().join("pool/package/management"),
            url: None,
        });
        assert!(settings.validate().is_err());
        Ok(())
    }

    #[rstest]
    fn settings_duplicate_name_architecture() -> TestResult {
        let dir = TempDir::new()?;
        let mut settings = settings_below(dir.path());
        let duplicate = settings.repositories[0].clone();
        settings.repositories.push(duplicate);
        assert!(settings.validate().is_err());
        Ok(())
    }

    #[rstest]
    fn settings_duplicate_flavor_names() -> TestResult {
        let dir = TempDir::new()?;
        let mut settings = settings_below(dir.path());
        settings.repositories[0].staging = Some("test".to_string());
        assert!(settings.validate().is_err());
        Ok(())
    }

    #[rstest]
    fn settings_missing_architecture() -> TestResult {
        let dir = TempDir::new()?;
        let mut settings = settings_below(dir.path());
        settings.architecture = None;
        assert!(settings.validate().is_err());
        Ok(())
    }

    #[rstest]
    #[case(RepoDirKind::Package, RepoFlavor::Stable, "repo/test/any")]
    #[case(RepoDirKind::Package, RepoFlavor::Debug, "repo/test-debug/any")]
    #[case(RepoDirKind::Package, RepoFlavor::Staging, "repo/test-staging/any")]
    #[case(RepoDirKind::Package, RepoFlavor::Testing, "repo/test-testing/any")]
    #[case(RepoDirKind::Source, RepoFlavor::Stable, "source/test/any")]
    #[case(RepoDirKind::Management, RepoFlavor::Stable, "management/any/test")]
    #[case(RepoDirKind::Management, RepoFlavor::Testing, "management/any/test-testing")]
    #[case(RepoDirKind::PackagePool, RepoFlavor::Stable, "pool/package/test")]
    #[case(RepoDirKind::SourcePool, RepoFlavor::Stable, "pool/source/test")]
    fn settings_get_repo_path(
        #[case] kind: RepoDirKind,
        #[case] flavor: RepoFlavor,
        #[case] expected: &str,
    ) -> TestResult {
        let dir = TempDir::new()?;
        let settings = settings_below(dir.path());
        assert_eq!(
            settings.get_repo_path(kind, "test", None, flavor)?,
            dir.path().join(expected)
        );
        Ok(())
    }

    #[rstest]
    fn settings_get_repo_path_unknown_repo() -> TestResult {
        let dir = TempDir::new()?;
        let settings = settings_below(dir.path());
        assert!(settings
            .get_repo_path(RepoDirKind::Package, "missing", None, RepoFlavor::Stable)
            .is_err());
        Ok(())
    }

    #[rstest]
    fn repo_flavor_from_flags() -> TestResult {
        assert_eq!(RepoFlavor::from_flags(false, false, false)?, RepoFlavor::Stable);
        assert_eq!(RepoFlavor::from_flags(true, false, false)?, RepoFlavor::Debug);
        assert!(RepoFlavor::from_flags(true, true, false).is_err());
        Ok(())
    }

    #[rstest]
    #[case("https://example.org/project", true)]
    #[case("http://example.org/project", false)]
    fn url_validation_scheme(#[case] url: &str, #[case] valid: bool) -> TestResult {
        let settings = UrlValidationSettings {
            schemes: vec!["https".to_string()],
            prefixes: Vec::new(),
        };
        assert_eq!(settings.validate_url(&Url::parse(url)?), valid);
        Ok(())
    }

    #[rstest]
    fn url_validation_prefix() -> TestResult {
        let settings = UrlValidationSettings {
            schemes: vec!["https".to_string()],
            prefixes: vec!["https://example.org/".to_string()],
        };
        assert!(settings.validate_url(&Url::parse("https://example.org/project")?));
        assert!(!settings.validate_url(&Url::parse("https://other.org/project")?));
        Ok(())
    }
}
