//! Build environment related types.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::{Architecture, Error, Version};

/// Returns whether `word` is a valid option word (alphanumerics, `_` and
/// `.`, at least one character).
fn option_word_valid(word: &str) -> bool {
    !word.is_empty()
        && word
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'.'))
}

/// An option used in a build environment (e.g. `color` or `!ccache`).
///
/// An option consists of a word, optionally prefixed with `!` to indicate
/// that it is disabled.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::BuildEnvironmentOption;
///
/// let option = BuildEnvironmentOption::from_str("!ccache").unwrap();
/// assert_eq!(option.name(), "ccache");
/// assert!(!option.on());
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BuildEnvironmentOption {
    name: String,
    on: bool,
}

impl BuildEnvironmentOption {
    /// Creates a new [`BuildEnvironmentOption`] from a string slice.
    pub fn new(option: &str) -> Result<Self, Error> {
        let (name, on) = match option.strip_prefix('!') {
            Some(name) => (name, false),
            None => (option, true),
        };
        if option_word_valid(name) {
            Ok(BuildEnvironmentOption {
                name: name.to_string(),
                on,
            })
        } else {
            Err(Error::InvalidOption(option.to_string()))
        }
    }

    /// Returns the name of the option.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns whether the option is enabled.
    pub fn on(&self) -> bool {
        self.on
    }
}

impl FromStr for BuildEnvironmentOption {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        BuildEnvironmentOption::new(input)
    }
}

impl Display for BuildEnvironmentOption {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}{}", if self.on { "" } else { "!" }, self.name)
    }
}

/// An option used for packaging (e.g. `lto` or `!strip`).
///
/// Package options follow the same syntax as [`BuildEnvironmentOption`]s.
pub type PackageOption = BuildEnvironmentOption;

/// A package installed during the build of another package.
///
/// Tracked in the form `{name}-{epoch:pkgver-pkgrel}-{architecture}` (e.g.
/// `bar-1:1.0.0-2-any`).
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::InstalledPackage;
///
/// let installed = InstalledPackage::from_str("bar-1:1.0.0-2-any").unwrap();
/// assert_eq!(installed.name().inner(), "bar");
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct InstalledPackage {
    name: crate::Name,
    version: Version,
    architecture: Architecture,
}

impl InstalledPackage {
    /// Creates a new [`InstalledPackage`] from a string slice.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` does not consist of a name, a full
    /// version (with pkgrel) and an architecture.
    pub fn new(input: &str) -> Result<Self, Error> {
        let error = || Error::InvalidInstalledPackage(input.to_string());

        let (rest, architecture) = input.rsplit_once('-').ok_or_else(error)?;
        let architecture = Architecture::from_str(architecture)
            .map_err(|_| Error::UnknownArchitecture(architecture.to_string()))?;

        // the version spans the last two '-' delimited fields of the rest
        let (rest, pkgrel) = rest.rsplit_once('-').ok_or_else(error)?;
        let (name, pkgver) = rest.rsplit_once('-').unwrap_or(("", rest));
        let (name, version) = if name.is_empty() {
            return Err(error());
        } else {
            (
                crate::Name::new(name)?,
                Version::with_pkgrel(&format!("{pkgver}-{pkgrel}"))?,
            )
        };

        Ok(InstalledPackage {
            name,
            version,
            architecture,
        })
    }

    /// Returns the name of the installed package.
    pub fn name(&self) -> &crate::Name {
        &self.name
    }

    /// Returns the version of the installed package.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Returns the architecture of the installed package.
    pub fn architecture(&self) -> Architecture {
        self.architecture
    }
}

impl FromStr for InstalledPackage {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        InstalledPackage::new(input)
    }
}

impl Display for InstalledPackage {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}-{}-{}", self.name, self.version, self.architecture)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    #[rstest]
    #[case("!ccache", "ccache", false)]
    #[case("color", "color", true)]
    #[case("lto", "lto", true)]
    fn build_environment_option(
        #[case] input: &str,
        #[case] name: &str,
        #[case] on: bool,
    ) -> TestResult {
        let option = BuildEnvironmentOption::from_str(input)?;
        assert_eq!(option.name(), name);
        assert_eq!(option.on(), on);
        assert_eq!(option.to_string(), input);
        Ok(())
    }

    #[rstest]
    #[case("!")]
    #[case("")]
    #[case("foo bar")]
    fn build_environment_option_invalid(#[case] input: &str) {
        assert!(BuildEnvironmentOption::from_str(input).is_err());
    }

    #[rstest]
    #[case("bar-1:1.0.0-2-any", "bar", "1:1.0.0-2")]
    #[case("foo-bar-1.2.3-1-x86_64", "foo-bar", "1.2.3-1")]
    fn installed_package(
        #[case] input: &str,
        #[case] name: &str,
        #[case] version: &str,
    ) -> TestResult {
        let installed = InstalledPackage::from_str(input)?;
        assert_eq!(installed.name().inner(), name);
        assert_eq!(installed.version().to_string(), version);
        assert_eq!(installed.to_string(), input);
        Ok(())
    }

    #[rstest]
    #[case("bar")]
    #[case("bar-1.0.0-any")]
    #[case("bar-1.0.0-2-foo")]
    fn installed_package_invalid(#[case] input: &str) {
        assert!(InstalledPackage::from_str(input).is_err());
    }
}
