//! Pure predicates over inputs of the task engine.
//!
//! Checks are run before or after a task's operation and must not mutate
//! their inputs. All inputs are snapshots taken at construction time.

use std::{
    collections::BTreeMap,
    path::PathBuf,
};

use log::{debug, info};
use repod_management::OutputPackageBase;
use repod_types::{pkg_vercmp, Architecture, PackageType};
use url::Url;

use crate::{config::UrlValidationSettings, verification::SignatureVerifier};

/// The state of a check.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum CheckState {
    /// The check has not been run yet.
    #[default]
    NotStarted,
    /// The check has been started.
    Started,
    /// The check ran successfully.
    Success,
    /// The check failed.
    Failed,
}

/// An interface for checks.
///
/// A check runs a predicate over its inputs and tracks its own state. It
/// must not mutate its inputs.
pub trait Check {
    /// Runs the check and returns the resulting state.
    fn run(&mut self) -> CheckState;

    /// Returns the current state of the check.
    fn state(&self) -> CheckState;
}

/// Verifies a list of package signatures through an external verifier.
///
/// The check fails if any package does not provide a signature, or if any
/// `(package, signature)` pair does not verify.
#[derive(Debug)]
pub struct PacmanKeyPackagesSignatureVerificationCheck {
    packages: Vec<(PathBuf, Option<PathBuf>)>,
    verifier: Box<dyn SignatureVerifier>,
    state: CheckState,
}

impl PacmanKeyPackagesSignatureVerificationCheck {
    /// Creates a new check over `packages` using `verifier`.
    pub fn new(
        packages: Vec<(PathBuf, Option<PathBuf>)>,
        verifier: Box<dyn SignatureVerifier>,
    ) -> Self {
        Self {
            packages,
            verifier,
            state: CheckState::default(),
        }
    }
}

impl Check for PacmanKeyPackagesSignatureVerificationCheck {
    fn run(&mut self) -> CheckState {
        self.state = CheckState::Started;

        for (package, signature) in &self.packages {
            let Some(signature) = signature else {
                info!(
                    "Verification is requested, but the package {package:?} does not provide \
                    a signature!"
                );
                self.state = CheckState::Failed;
                return self.state;
            };

            match self.verifier.verify(package, signature) {
                Ok(true) => {
                    debug!("Package {package:?} successfully verified using {signature:?}")
                }
                Ok(false) => {
                    info!(
                        "Verification of package {package:?} with signature {signature:?} failed!"
                    );
                    self.state = CheckState::Failed;
                    return self.state;
                }
                Err(error) => {
                    info!("{error}");
                    self.state = CheckState::Failed;
                    return self.state;
                }
            }
        }

        self.state = CheckState::Success;
        self.state
    }

    fn state(&self) -> CheckState {
        self.state
    }
}

/// Ensures that a list of packages is homogeneously debug or non-debug.
///
/// Packages that do not track a package type (PKGINFO version 1) are
/// silently accepted, as their debug-ness can not be determined.
#[derive(Debug)]
pub struct DebugPackagesCheck {
    packages: Vec<(String, Option<PackageType>)>,
    debug: bool,
    state: CheckState,
}

impl DebugPackagesCheck {
    /// Creates a new check over `packages`.
    ///
    /// With `debug`, all packages with a known package type must be debug
    /// packages; without, none may be.
    pub fn new(packages: Vec<(String, Option<PackageType>)>, debug: bool) -> Self {
        Self {
            packages,
            debug,
            state: CheckState::default(),
        }
    }
}

impl Check for DebugPackagesCheck {
    fn run(&mut self) -> CheckState {
        self.state = CheckState::Started;

        debug!("Checking whether all packages are either default or debug packages...");
        let mismatch = self.packages.iter().any(|(_, package_type)| match package_type {
            Some(package_type) => {
                let is_debug = *package_type == PackageType::Debug;
                is_debug != self.debug
            }
            None => false,
        });

        if mismatch {
            info!(
                "A {} repository is targeted, but not all provided packages match it!",
                if self.debug { "debug" } else { "non-debug" }
            );
            self.state = CheckState::Failed;
        } else {
            self.state = CheckState::Success;
        }

        self.state
    }

    fn state(&self) -> CheckState {
        self.state
    }
}

/// Ensures that all packages match the target CPU architecture.
///
/// A package of architecture `any` matches every target architecture.
#[derive(Debug)]
pub struct MatchingArchitectureCheck {
    architecture: Architecture,
    packages: Vec<(String, Architecture)>,
    state: CheckState,
}

impl MatchingArchitectureCheck {
    /// Creates a new check of `packages` against `architecture`.
    pub fn new(architecture: Architecture, packages: Vec<(String, Architecture)>) -> Self {
        Self {
            architecture,
            packages,
            state: CheckState::default(),
        }
    }
}

impl Check for MatchingArchitectureCheck {
    fn run(&mut self) -> CheckState {
        self.state = CheckState::Started;

        debug!("Checking whether all packages match the target architecture...");
        let non_matching: Vec<String> = self
            .packages
            .iter()
            .filter(|(_, architecture)| {
                *architecture != self.architecture && *architecture != Architecture::Any
            })
            .map(|(name, architecture)| format!("{name}/{architecture}"))
            .collect();

        if non_matching.is_empty() {
            self.state = CheckState::Success;
        } else {
            info!(
                "The following packages are not compatible with the CPU architecture {}: \
                {non_matching:?}",
                self.architecture
            );
            self.state = CheckState::Failed;
        }

        self.state
    }

    fn state(&self) -> CheckState {
        self.state
    }
}

/// Ensures that pkgbases are updated, never downgraded.
///
/// For each new pkgbase that is also present in the current set, the new
/// version must order strictly newer than the current one.
#[derive(Debug)]
pub struct PkgbasesVersionUpdateCheck {
    new_pkgbases: Vec<(String, String)>,
    current_pkgbases: Vec<(String, String)>,
    state: CheckState,
}

impl PkgbasesVersionUpdateCheck {
    /// Creates a new check from `(name, version)` pairs of the new and
    /// current pkgbases.
    pub fn new(
        new_pkgbases: Vec<(String, String)>,
        current_pkgbases: Vec<(String, String)>,
    ) -> Self {
        Self {
            new_pkgbases,
            current_pkgbases,
            state: CheckState::default(),
        }
    }

    /// Creates a new check from lists of management records.
    pub fn from_pkgbases(
        new_pkgbases: &[OutputPackageBase],
        current_pkgbases: &[OutputPackageBase],
    ) -> Self {
        let extract = |pkgbases: &[OutputPackageBase]| {
            pkgbases
                .iter()
                .map(|pkgbase| (pkgbase.base().to_string(), pkgbase.version().to_string()))
                .collect()
        };
        Self::new(extract(new_pkgbases), extract(current_pkgbases))
    }
}

impl Check for PkgbasesVersionUpdateCheck {
    fn run(&mut self) -> CheckState {
        self.state = CheckState::Started;

        debug!("Checking that all pkgbases are being upgraded, not downgraded...");
        for (name, version) in &self.new_pkgbases {
            let Some((_, current_version)) = self
                .current_pkgbases
                .iter()
                .find(|(current_name, _)| current_name == name)
            else {
                continue;
            };

            if pkg_vercmp(current_version, version) >= 0 {
                info!(
                    "The version of {name} currently in the repository is not older than the \
                    provided one: {current_version} vs. {version}"
                );
                self.state = CheckState::Failed;
                return self.state;
            }
        }

        self.state = CheckState::Success;
        self.state
    }

    fn state(&self) -> CheckState {
        self.state
    }
}

/// A snapshot of a pkgbase for the [`PackagesNewOrUpdatedCheck`].
#[derive(Clone, Debug)]
pub struct PkgbaseSnapshot {
    /// The name of the pkgbase.
    pub base: String,
    /// The version of the pkgbase.
    pub version: String,
    /// The package names the pkgbase provides.
    pub packages: Vec<String>,
}

impl From<&OutputPackageBase> for PkgbaseSnapshot {
    fn from(pkgbase: &OutputPackageBase) -> Self {
        PkgbaseSnapshot {
            base: pkgbase.base().to_string(),
            version: pkgbase.version().to_string(),
            packages: pkgbase
                .package_names()
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Ensures that all added packages are new or updated.
///
/// For each package of a new pkgbase that is currently provided by another
/// pkgbase (according to the package name index of the management
/// repository), the addition is only valid if either the other pkgbase is
/// concurrently updated to no longer provide the package, or the new
/// version strictly exceeds the version of the providing pkgbase.
#[derive(Debug)]
pub struct PackagesNewOrUpdatedCheck {
    new_pkgbases: Vec<PkgbaseSnapshot>,
    current_versions: BTreeMap<String, String>,
    index: BTreeMap<String, String>,
    state: CheckState,
}

impl PackagesNewOrUpdatedCheck {
    /// Creates a new check.
    ///
    /// `index` maps package names to the pkgbase currently providing them.
    /// `current_versions` maps currently known pkgbases to their versions.
    pub fn new(
        new_pkgbases: Vec<PkgbaseSnapshot>,
        current_versions: BTreeMap<String, String>,
        index: BTreeMap<String, String>,
    ) -> Self {
        Self {
            new_pkgbases,
            current_versions,
            index,
            state: CheckState::default(),
        }
    }
}

impl Check for PackagesNewOrUpdatedCheck {
    fn run(&mut self) -> CheckState {
        self.state = CheckState::Started;

        debug!("Checking that all packages are either new or updated...");
        for pkgbase in &self.new_pkgbases {
            for package in &pkgbase.packages {
                let Some(owner) = self.index.get(package) else {
                    continue;
                };
                if owner == &pkgbase.base {
                    continue;
                }

                // the owning pkgbase may concurrently drop the package
                let updated_owner = self
                    .new_pkgbases
                    .iter()
                    .find(|other| &other.base == owner);
                if let Some(updated_owner) = updated_owner {
                    if !updated_owner.packages.contains(package) {
                        continue;
                    }
                    info!(
                        "The package {package} is provided by pkgbase {owner}, but pkgbase \
                        {} now tries to provide it without it being removed from {owner}.",
                        pkgbase.base
                    );
                    self.state = CheckState::Failed;
                    return self.state;
                }

                // otherwise the new version must strictly exceed the old one
                let Some(owner_version) = self.current_versions.get(owner) else {
                    continue;
                };
                if pkg_vercmp(owner_version, &pkgbase.version) >= 0 {
                    info!(
                        "The version of the added {package} (provided by pkgbase {}) does not \
                        exceed the one in the repository (provided by pkgbase {owner}): \
                        {owner_version} (old) vs. {} (new)",
                        pkgbase.base, pkgbase.version
                    );
                    self.state = CheckState::Failed;
                    return self.state;
                }
            }
        }

        self.state = CheckState::Success;
        self.state
    }

    fn state(&self) -> CheckState {
        self.state
    }
}

/// Ensures that pkgbases have a source URL if the repository requires one.
///
/// A new pkgbase may inherit the URL of its current record. Without
/// configured [`UrlValidationSettings`], the check always passes.
#[derive(Debug)]
pub struct SourceUrlCheck {
    new_pkgbase_urls: Vec<(String, Option<Url>)>,
    current_pkgbase_urls: BTreeMap<String, Option<Url>>,
    settings: Option<UrlValidationSettings>,
    state: CheckState,
}

impl SourceUrlCheck {
    /// Creates a new check.
    pub fn new(
        new_pkgbase_urls: Vec<(String, Option<Url>)>,
        current_pkgbase_urls: BTreeMap<String, Option<Url>>,
        settings: Option<UrlValidationSettings>,
    ) -> Self {
        Self {
            new_pkgbase_urls,
            current_pkgbase_urls,
            settings,
            state: CheckState::default(),
        }
    }
}

impl Check for SourceUrlCheck {
    fn run(&mut self) -> CheckState {
        self.state = CheckState::Started;

        let Some(settings) = &self.settings else {
            debug!("No URL validation required, skipping check...");
            self.state = CheckState::Success;
            return self.state;
        };

        debug!("Checking the source URLs of pkgbases...");
        for (pkgbase, url) in &self.new_pkgbase_urls {
            let url = url
                .as_ref()
                .or_else(|| {
                    self.current_pkgbase_urls
                        .get(pkgbase)
                        .and_then(Option::as_ref)
                });

            let Some(url) = url else {
                info!(
                    "The pkgbase {pkgbase} neither has a source URL set nor is one provided \
                    for it!"
                );
                self.state = CheckState::Failed;
                return self.state;
            };

            if !settings.validate_url(url) {
                info!(
                    "The source URL of the pkgbase {pkgbase} ({url}) does not validate against \
                    the repository's settings!"
                );
                self.state = CheckState::Failed;
                return self.state;
            }
        }

        self.state = CheckState::Success;
        self.state
    }

    fn state(&self) -> CheckState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;
    use crate::verification::tests::StaticVerifier;

    #[rstest]
    #[case(true, CheckState::Success)]
    #[case(false, CheckState::Failed)]
    fn signature_verification(#[case] verifies: bool, #[case] expected: CheckState) {
        let mut check = PacmanKeyPackagesSignatureVerificationCheck::new(
            vec![(
                PathBuf::from("/packages/foo-1.0.0-1-any.pkg.tar.zst"),
                Some(PathBuf::from("/packages/foo-1.0.0-1-any.pkg.tar.zst.sig")),
            )],
            Box::new(StaticVerifier(verifies)),
        );
        assert_eq!(check.run(), expected);
        assert_eq!(check.state(), expected);
    }

    #[rstest]
    fn signature_verification_missing_signature() {
        let mut check = PacmanKeyPackagesSignatureVerificationCheck::new(
            vec![(PathBuf::from("/packages/foo-1.0.0-1-any.pkg.tar.zst"), None)],
            Box::new(StaticVerifier(true)),
        );
        assert_eq!(check.run(), CheckState::Failed);
    }

    #[rstest]
    // a mix of debug and non-debug packages targeting a non-debug repo
    #[case(
        vec![
            ("foo".to_string(), Some(PackageType::Package)),
            ("foo-debug".to_string(), Some(PackageType::Debug)),
        ],
        false,
        CheckState::Failed
    )]
    // all non-debug packages targeting a non-debug repo
    #[case(
        vec![("foo".to_string(), Some(PackageType::Package))],
        false,
        CheckState::Success
    )]
    // all debug packages targeting a debug repo
    #[case(
        vec![("foo-debug".to_string(), Some(PackageType::Debug))],
        true,
        CheckState::Success
    )]
    // packages without a package type are silently accepted
    #[case(vec![("foo".to_string(), None)], true, CheckState::Success)]
    fn debug_packages(
        #[case] packages: Vec<(String, Option<PackageType>)>,
        #[case] debug: bool,
        #[case] expected: CheckState,
    ) {
        let mut check = DebugPackagesCheck::new(packages, debug);
        assert_eq!(check.run(), expected);
    }

    #[rstest]
    #[case(Architecture::X86_64, Architecture::X86_64, CheckState::Success)]
    #[case(Architecture::X86_64, Architecture::Any, CheckState::Success)]
    #[case(Architecture::X86_64, Architecture::Aarch64, CheckState::Failed)]
    fn matching_architecture(
        #[case] target: Architecture,
        #[case] package: Architecture,
        #[case] expected: CheckState,
    ) {
        let mut check = MatchingArchitectureCheck::new(target, vec![("foo".to_string(), package)]);
        assert_eq!(check.run(), expected);
    }

    #[rstest]
    // a downgrade of the epoch fails
    #[case("1:9.9.9-9", "2:1.0.0-1", CheckState::Failed)]
    // an equal version fails
    #[case("1.0.0-1", "1.0.0-1", CheckState::Failed)]
    // an upgrade passes
    #[case("1.0.1-1", "1.0.0-1", CheckState::Success)]
    fn pkgbases_version_update(
        #[case] new_version: &str,
        #[case] current_version: &str,
        #[case] expected: CheckState,
    ) {
        let mut check = PkgbasesVersionUpdateCheck::new(
            vec![("foo".to_string(), new_version.to_string())],
            vec![("foo".to_string(), current_version.to_string())],
        );
        assert_eq!(check.run(), expected);
    }

    #[rstest]
    fn pkgbases_version_update_new_pkgbase_passes() {
        let mut check = PkgbasesVersionUpdateCheck::new(
            vec![("foo".to_string(), "1.0.0-1".to_string())],
            Vec::new(),
        );
        assert_eq!(check.run(), CheckState::Success);
    }

    fn snapshot(base: &str, version: &str, packages: &[&str]) -> PkgbaseSnapshot {
        PkgbaseSnapshot {
            base: base.to_string(),
            version: version.to_string(),
            packages: packages.iter().map(ToString::to_string).collect(),
        }
    }

    #[rstest]
    fn packages_new_or_updated_new_package_passes() {
        let mut check = PackagesNewOrUpdatedCheck::new(
            vec![snapshot("foo", "1.0.0-1", &["foo"])],
            BTreeMap::new(),
            BTreeMap::new(),
        );
        assert_eq!(check.run(), CheckState::Success);
    }

    #[rstest]
    fn packages_new_or_updated_takeover_requires_removal() {
        // bar tries to provide foo, while foo's pkgbase keeps providing it
        let index = BTreeMap::from([("foo".to_string(), "foo".to_string())]);
        let mut check = PackagesNewOrUpdatedCheck::new(
            vec![
                snapshot("bar", "1.0.0-1", &["foo"]),
                snapshot("foo", "1.0.0-2", &["foo"]),
            ],
            BTreeMap::from([("foo".to_string(), "1.0.0-1".to_string())]),
            index,
        );
        assert_eq!(check.run(), CheckState::Failed);
    }

    #[rstest]
    fn packages_new_or_updated_takeover_with_removal_passes() {
        // bar takes over foo, while foo's pkgbase drops it concurrently
        let index = BTreeMap::from([("foo".to_string(), "foo".to_string())]);
        let mut check = PackagesNewOrUpdatedCheck::new(
            vec![
                snapshot("bar", "1.0.0-1", &["foo"]),
                snapshot("foo", "1.0.0-2", &["foo-other"]),
            ],
            BTreeMap::from([("foo".to_string(), "1.0.0-1".to_string())]),
            index,
        );
        assert_eq!(check.run(), CheckState::Success);
    }

    #[rstest]
    #[case("2.0.0-1", CheckState::Success)]
    #[case("0.9.0-1", CheckState::Failed)]
    fn packages_new_or_updated_version_rule(
        #[case] new_version: &str,
        #[case] expected: CheckState,
    ) {
        // bar takes over foo from an untouched pkgbase
        let index = BTreeMap::from([("foo".to_string(), "foo".to_string())]);
        let mut check = PackagesNewOrUpdatedCheck::new(
            vec![snapshot("bar", new_version, &["foo"])],
            BTreeMap::from([("foo".to_string(), "1.0.0-1".to_string())]),
            index,
        );
        assert_eq!(check.run(), expected);
    }

    #[rstest]
    fn source_url_without_settings_passes() {
        let mut check = SourceUrlCheck::new(
            vec![("foo".to_string(), None)],
            BTreeMap::new(),
            None,
        );
        assert_eq!(check.run(), CheckState::Success);
    }

    #[rstest]
    fn source_url_missing_url_fails() {
        let mut check = SourceUrlCheck::new(
            vec![("foo".to_string(), None)],
            BTreeMap::new(),
            Some(UrlValidationSettings::default()),
        );
        assert_eq!(check.run(), CheckState::Failed);
    }

    #[rstest]
    fn source_url_inherited_url_passes() -> TestResult {
        let mut check = SourceUrlCheck::new(
            vec![("foo".to_string(), None)],
            BTreeMap::from([(
                "foo".to_string(),
                Some(Url::parse("https://example.org/")?),
            )]),
            Some(UrlValidationSettings {
                schemes: vec!["https".to_string()],
                prefixes: Vec::new(),
            }),
        );
        assert_eq!(check.run(), CheckState::Success);
        Ok(())
    }
}
