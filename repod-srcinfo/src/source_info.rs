//! The in-memory representation of `.SRCINFO` data.

use std::{collections::HashSet, fs::File, io::Read, path::Path, str::FromStr};

use repod_types::{Architecture, Epoch, Name, Pkgrel, Pkgver, Version};
use url::Url;

use crate::Error;

/// The keys of a `pkgbase` section that hold a single value.
const BASE_SINGULAR_KEYS: &[&str] = &["pkgdesc", "pkgver", "pkgrel", "epoch", "url"];

/// The keys of a `pkgbase` section that hold lists of values.
const BASE_LIST_KEYS: &[&str] = &[
    "arch",
    "backup",
    "b2sums",
    "checkdepends",
    "conflicts",
    "depends",
    "groups",
    "license",
    "makedepends",
    "md5sums",
    "noextract",
    "optdepends",
    "options",
    "provides",
    "replaces",
    "sha1sums",
    "sha256sums",
    "sha512sums",
    "source",
    "validpgpkeys",
];

/// The keys of a `pkgname` section that hold a single value.
const PACKAGE_SINGULAR_KEYS: &[&str] = &["pkgdesc", "url"];

/// The keys of a `pkgname` section that hold lists of values.
const PACKAGE_LIST_KEYS: &[&str] = &[
    "arch",
    "backup",
    "checkdepends",
    "conflicts",
    "depends",
    "groups",
    "license",
    "optdepends",
    "options",
    "provides",
    "replaces",
];

/// The `pkgbase` section of a `.SRCINFO` file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PackageBaseSection {
    /// The name of the pkgbase.
    pub name: Option<Name>,
    /// The description of the pkgbase.
    pub description: Option<String>,
    /// The upstream version.
    pub pkgver: Option<Pkgver>,
    /// The release number.
    pub pkgrel: Option<Pkgrel>,
    /// The epoch.
    pub epoch: Option<Epoch>,
    /// The upstream URL.
    pub url: Option<Url>,
    /// The architectures the pkgbase is built for.
    pub architectures: Vec<Architecture>,
    /// The licenses of the pkgbase.
    pub licenses: Vec<String>,
    /// The run-time dependencies.
    pub depends: Vec<String>,
    /// The build-time dependencies.
    pub makedepends: Vec<String>,
    /// The check-time dependencies.
    pub checkdepends: Vec<String>,
    /// The optional dependencies.
    pub optdepends: Vec<String>,
    /// The provided components.
    pub provides: Vec<String>,
    /// The conflicting components.
    pub conflicts: Vec<String>,
    /// The replaced components.
    pub replaces: Vec<String>,
    /// The groups of the pkgbase.
    pub groups: Vec<String>,
    /// The files to back up.
    pub backup: Vec<String>,
    /// The sources of the pkgbase.
    pub sources: Vec<String>,
    /// Other list valued attributes, kept verbatim.
    pub other: Vec<(String, String)>,
}

/// A `pkgname` section of a `.SRCINFO` file.
///
/// All attributes are optional, as package sections only override the
/// pkgbase attributes.
#[derive(Clone, Debug, PartialEq)]
pub struct PackageSection {
    /// The name of the package.
    pub name: Name,
    /// The description override.
    pub description: Option<String>,
    /// The URL override.
    pub url: Option<Url>,
    /// The architecture override.
    pub architectures: Option<Vec<Architecture>>,
    /// The license override.
    pub licenses: Option<Vec<String>>,
    /// The dependency override.
    pub depends: Option<Vec<String>>,
    /// The check dependency override.
    pub checkdepends: Option<Vec<String>>,
    /// The optional dependency override.
    pub optdepends: Option<Vec<String>>,
    /// The provides override.
    pub provides: Option<Vec<String>>,
    /// The conflicts override.
    pub conflicts: Option<Vec<String>>,
    /// The replaces override.
    pub replaces: Option<Vec<String>>,
    /// The groups override.
    pub groups: Option<Vec<String>>,
    /// The backup override.
    pub backup: Option<Vec<String>>,
    /// Other list valued attributes, kept verbatim.
    pub other: Vec<(String, String)>,
}

impl PackageSection {
    /// Creates an empty section for the package `name`.
    fn new(name: Name) -> Self {
        PackageSection {
            name,
            description: None,
            url: None,
            architectures: None,
            licenses: None,
            depends: None,
            checkdepends: None,
            optdepends: None,
            provides: None,
            conflicts: None,
            replaces: None,
            groups: None,
            backup: None,
            other: Vec::new(),
        }
    }
}

/// The per-package view of a `.SRCINFO` file, with pkgbase attributes
/// merged in.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedPackage {
    /// The name of the package.
    pub name: Name,
    /// The name of the pkgbase the package belongs to.
    pub base: Name,
    /// The full version of the package.
    pub version: Version,
    /// The description of the package.
    pub description: Option<String>,
    /// The upstream URL of the package.
    pub url: Option<Url>,
    /// The architectures of the package.
    pub architectures: Vec<Architecture>,
    /// The licenses of the package.
    pub licenses: Vec<String>,
    /// The run-time dependencies of the package.
    pub depends: Vec<String>,
    /// The build-time dependencies of the package (always those of the
    /// pkgbase).
    pub makedepends: Vec<String>,
    /// The check-time dependencies of the package.
    pub checkdepends: Vec<String>,
    /// The optional dependencies of the package.
    pub optdepends: Vec<String>,
}

/// A representation of the contents of a `.SRCINFO` file.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_srcinfo::SourceInfo;
///
/// # fn main() -> Result<(), repod_srcinfo::Error> {
/// let data = r#"pkgbase = foo
///     pkgdesc = An example package
///     pkgver = 1.0.0
///     pkgrel = 1
///     epoch = 1
///     url = https://example.org/
///     arch = any
///     license = GPL-3.0-or-later
///     makedepends = cmake
///
/// pkgname = foo
/// "#;
///
/// let source_info = SourceInfo::from_str(data)?;
/// assert_eq!(source_info.base().name.as_ref().unwrap().inner(), "foo");
/// assert_eq!(source_info.version()?.to_string(), "1:1.0.0-1");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SourceInfo {
    base: PackageBaseSection,
    packages: Vec<PackageSection>,
}

/// The two kinds of sections of a `.SRCINFO` file.
enum Section {
    None,
    Base,
    Package(usize),
}

impl SourceInfo {
    /// Returns the `pkgbase` section.
    pub fn base(&self) -> &PackageBaseSection {
        &self.base
    }

    /// Returns the `pkgname` sections.
    pub fn packages(&self) -> &[PackageSection] {
        &self.packages
    }

    /// Returns the full version of the pkgbase.
    ///
    /// # Errors
    ///
    /// Returns an error if the pkgver or pkgrel key is missing.
    pub fn version(&self) -> Result<Version, Error> {
        let section = || {
            self.base
                .name
                .as_ref()
                .map(|name| name.to_string())
                .unwrap_or_else(|| "pkgbase".to_string())
        };
        let pkgver = self.base.pkgver.as_ref().ok_or_else(|| Error::MissingKey {
            key: "pkgver",
            section: section(),
        })?;
        let pkgrel = self.base.pkgrel.as_ref().ok_or_else(|| Error::MissingKey {
            key: "pkgrel",
            section: section(),
        })?;

        let version = match &self.base.epoch {
            Some(epoch) => format!("{epoch}:{pkgver}-{pkgrel}"),
            None => format!("{pkgver}-{pkgrel}"),
        };
        Ok(Version::new(&version)?)
    }

    /// Returns the per-package views with pkgbase attributes merged in.
    ///
    /// # Errors
    ///
    /// Returns an error if the pkgbase attributes are incomplete.
    pub fn merged_packages(&self) -> Result<Vec<MergedPackage>, Error> {
        let base_name = self.base.name.clone().ok_or_else(|| Error::MissingKey {
            key: "pkgbase",
            section: "pkgbase".to_string(),
        })?;
        let version = self.version()?;

        Ok(self
            .packages
            .iter()
            .map(|package| MergedPackage {
                name: package.name.clone(),
                base: base_name.clone(),
                version: version.clone(),
                description: package
                    .description
                    .clone()
                    .or_else(|| self.base.description.clone()),
                url: package.url.clone().or_else(|| self.base.url.clone()),
                architectures: package
                    .architectures
                    .clone()
                    .unwrap_or_else(|| self.base.architectures.clone()),
                licenses: package
                    .licenses
                    .clone()
                    .unwrap_or_else(|| self.base.licenses.clone()),
                depends: package
                    .depends
                    .clone()
                    .unwrap_or_else(|| self.base.depends.clone()),
                makedepends: self.base.makedepends.clone(),
                checkdepends: package
                    .checkdepends
                    .clone()
                    .unwrap_or_else(|| self.base.checkdepends.clone()),
                optdepends: package
                    .optdepends
                    .clone()
                    .unwrap_or_else(|| self.base.optdepends.clone()),
            })
            .collect())
    }

    /// Creates a [`SourceInfo`] from the file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let mut buf = String::new();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut buf))
            .map_err(|source| Error::IoPath {
                path: path.to_path_buf(),
                context: "reading a SRCINFO file",
                source,
            })?;
        Self::from_str(&buf)
    }
}

/// Records `value` under the singular attribute selected by `key`.
fn apply_base_singular(
    base: &mut PackageBaseSection,
    key: &str,
    value: &str,
) -> Result<(), Error> {
    let duplicate = |key: &str| Error::DuplicateKey {
        key: key.to_string(),
        section: base
            .name
            .as_ref()
            .map(|name| name.to_string())
            .unwrap_or_else(|| "pkgbase".to_string()),
    };

    match key {
        "pkgdesc" => {
            if base.description.replace(value.to_string()).is_some() {
                return Err(duplicate(key));
            }
        }
        "pkgver" => {
            if base.pkgver.replace(Pkgver::new(value)?).is_some() {
                return Err(duplicate(key));
            }
        }
        "pkgrel" => {
            if base.pkgrel.replace(Pkgrel::new(value)?).is_some() {
                return Err(duplicate(key));
            }
        }
        "epoch" => {
            if base.epoch.replace(Epoch::new(value)?).is_some() {
                return Err(duplicate(key));
            }
        }
        "url" => {
            let url = Url::parse(value).map_err(|_| Error::InvalidUrl(value.to_string()))?;
            if base.url.replace(url).is_some() {
                return Err(duplicate(key));
            }
        }
        _ => unreachable!(),
    }
    Ok(())
}

/// Records `value` under the list attribute selected by `key`.
fn apply_base_list(base: &mut PackageBaseSection, key: &str, value: &str) -> Result<(), Error> {
    match key {
        "arch" => base
            .architectures
            .push(Architecture::from_str(value).map_err(|_| {
                Error::Types(repod_types::Error::UnknownArchitecture(value.to_string()))
            })?),
        "license" => base.licenses.push(value.to_string()),
        "depends" => base.depends.push(value.to_string()),
        "makedepends" => base.makedepends.push(value.to_string()),
        "checkdepends" => base.checkdepends.push(value.to_string()),
        "optdepends" => base.optdepends.push(value.to_string()),
        "provides" => base.provides.push(value.to_string()),
        "conflicts" => base.conflicts.push(value.to_string()),
        "replaces" => base.replaces.push(value.to_string()),
        "groups" => base.groups.push(value.to_string()),
        "backup" => base.backup.push(value.to_string()),
        "source" => base.sources.push(value.to_string()),
        _ => base.other.push((key.to_string(), value.to_string())),
    }
    Ok(())
}

/// Records `value` under the attribute of `package` selected by `key`.
fn apply_package_key(
    package: &mut PackageSection,
    key: &str,
    value: &str,
) -> Result<(), Error> {
    let duplicate = |key: &str| Error::DuplicateKey {
        key: key.to_string(),
        section: package.name.to_string(),
    };

    match key {
        "pkgdesc" => {
            if package.description.replace(value.to_string()).is_some() {
                return Err(duplicate(key));
            }
        }
        "url" => {
            let url = Url::parse(value).map_err(|_| Error::InvalidUrl(value.to_string()))?;
            if package.url.replace(url).is_some() {
                return Err(duplicate(key));
            }
        }
        "arch" => package
            .architectures
            .get_or_insert_with(Vec::new)
            .push(Architecture::from_str(value).map_err(|_| {
                Error::Types(repod_types::Error::UnknownArchitecture(value.to_string()))
            })?),
        "license" => package
            .licenses
            .get_or_insert_with(Vec::new)
            .push(value.to_string()),
        "depends" => package
            .depends
            .get_or_insert_with(Vec::new)
            .push(value.to_string()),
        "checkdepends" => package
            .checkdepends
            .get_or_insert_with(Vec::new)
            .push(value.to_string()),
        "optdepends" => package
            .optdepends
            .get_or_insert_with(Vec::new)
            .push(value.to_string()),
        "provides" => package
            .provides
            .get_or_insert_with(Vec::new)
            .push(value.to_string()),
        "conflicts" => package
            .conflicts
            .get_or_insert_with(Vec::new)
            .push(value.to_string()),
        "replaces" => package
            .replaces
            .get_or_insert_with(Vec::new)
            .push(value.to_string()),
        "groups" => package
            .groups
            .get_or_insert_with(Vec::new)
            .push(value.to_string()),
        "backup" => package
            .backup
            .get_or_insert_with(Vec::new)
            .push(value.to_string()),
        _ => package.other.push((key.to_string(), value.to_string())),
    }
    Ok(())
}

impl FromStr for SourceInfo {
    type Err = Error;

    /// Creates a [`SourceInfo`] from a string slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is syntactically invalid, contains
    /// unknown keys, keys outside of a section, a second `pkgbase` section,
    /// or duplicate singular keys.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let base_singular: HashSet<&str> = BASE_SINGULAR_KEYS.iter().copied().collect();
        let base_list: HashSet<&str> = BASE_LIST_KEYS.iter().copied().collect();
        let package_singular: HashSet<&str> = PACKAGE_SINGULAR_KEYS.iter().copied().collect();
        let package_list: HashSet<&str> = PACKAGE_LIST_KEYS.iter().copied().collect();

        let mut base = PackageBaseSection::default();
        let mut packages: Vec<PackageSection> = Vec::new();
        let mut section = Section::None;

        for (number, line) in s.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(Error::InvalidLine {
                    number: number + 1,
                    line: line.to_string(),
                });
            };
            let key = key.trim();
            let value = value.trim();

            match key {
                "pkgbase" => {
                    if base.name.is_some() {
                        return Err(Error::DuplicatePkgbase {
                            name: value.to_string(),
                        });
                    }
                    base.name = Some(Name::new(value)?);
                    section = Section::Base;
                }
                "pkgname" => {
                    if base.name.is_none() {
                        return Err(Error::KeyBeforePkgbase {
                            key: key.to_string(),
                        });
                    }
                    packages.push(PackageSection::new(Name::new(value)?));
                    section = Section::Package(packages.len() - 1);
                }
                key => match section {
                    Section::None => {
                        return Err(Error::KeyBeforePkgbase {
                            key: key.to_string(),
                        })
                    }
                    Section::Base => {
                        if base_singular.contains(key) {
                            apply_base_singular(&mut base, key, value)?;
                        } else if base_list.contains(key) {
                            apply_base_list(&mut base, key, value)?;
                        } else {
                            return Err(Error::UnknownKey {
                                key: key.to_string(),
                                number: number + 1,
                            });
                        }
                    }
                    Section::Package(index) => {
                        if package_singular.contains(key) || package_list.contains(key) {
                            apply_package_key(&mut packages[index], key, value)?;
                        } else {
                            return Err(Error::UnknownKey {
                                key: key.to_string(),
                                number: number + 1,
                            });
                        }
                    }
                },
            }
        }

        if base.name.is_none() {
            return Err(Error::MissingKey {
                key: "pkgbase",
                section: "pkgbase".to_string(),
            });
        }

        Ok(SourceInfo { base, packages })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    const SRCINFO_DATA: &str = r#"pkgbase = foo
	pkgdesc = An example package
	pkgver = 1.0.0
	pkgrel = 1
	url = https://example.org/
	arch = any
	license = GPL-3.0-or-later
	makedepends = cmake
	depends = bar
	source = https://example.org/foo-1.0.0.tar.gz
	sha256sums = b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c

pkgname = foo

pkgname = foo-extra
	pkgdesc = An example package (extras)
	depends = foo
"#;

    #[rstest]
    fn source_info_from_str() -> TestResult {
        let source_info = SourceInfo::from_str(SRCINFO_DATA)?;
        assert_eq!(source_info.base().name.as_ref().unwrap().inner(), "foo");
        assert_eq!(source_info.packages().len(), 2);
        assert_eq!(source_info.version()?.to_string(), "1.0.0-1");
        Ok(())
    }

    #[rstest]
    fn source_info_merged_packages() -> TestResult {
        let source_info = SourceInfo::from_str(SRCINFO_DATA)?;
        let merged = source_info.merged_packages()?;

        assert_eq!(merged[0].name.inner(), "foo");
        assert_eq!(merged[0].description.as_deref(), Some("An example package"));
        assert_eq!(merged[0].depends, vec!["bar".to_string()]);

        assert_eq!(merged[1].name.inner(), "foo-extra");
        assert_eq!(
            merged[1].description.as_deref(),
            Some("An example package (extras)")
        );
        assert_eq!(merged[1].depends, vec!["foo".to_string()]);
        assert_eq!(merged[1].makedepends, vec!["cmake".to_string()]);
        Ok(())
    }

    #[rstest]
    #[case("pkgdesc = foo\n")]
    #[case("pkgname = foo\n")]
    fn source_info_key_before_pkgbase(#[case] data: &str) {
        assert!(SourceInfo::from_str(data).is_err());
    }

    #[rstest]
    fn source_info_unknown_key() {
        assert!(matches!(
            SourceInfo::from_str("pkgbase = foo\n\tfrobnicate = yes\n"),
            Err(Error::UnknownKey { .. })
        ));
    }

    #[rstest]
    fn source_info_duplicate_pkgver() {
        assert!(matches!(
            SourceInfo::from_str("pkgbase = foo\n\tpkgver = 1\n\tpkgver = 2\n"),
            Err(Error::DuplicateKey { .. })
        ));
    }

    #[rstest]
    fn source_info_missing_pkgrel() {
        let source_info = SourceInfo::from_str("pkgbase = foo\n\tpkgver = 1\n").unwrap();
        assert!(source_info.version().is_err());
    }
}
