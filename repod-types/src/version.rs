//! The version algebra of pacman-style packages.
//!
//! The total order implemented here follows the behavior of libalpm's
//! `vercmp`, which all update decisions in a repository are based on.

use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    num::NonZeroUsize,
    str::FromStr,
};

use semver::Version as SemverVersion;

use crate::{Architecture, Error};

/// Returns whether `byte` is part of a version segment (ASCII alphanumeric).
fn is_alnum(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
}

/// Compares two pkgver strings the way libalpm's `vercmp` does.
///
/// Returns [`Ordering::Less`] if `a` is older than `b`, [`Ordering::Equal`]
/// if both represent the same version and [`Ordering::Greater`] if `a` is
/// newer than `b`.
fn pkgver_cmp(a: &str, b: &str) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }

    let one = a.as_bytes();
    let two = b.as_bytes();

    // left hand pointers for the current segment of each side
    let mut i = 0;
    let mut j = 0;

    while i < one.len() && j < two.len() {
        let sep_start_one = i;
        let sep_start_two = j;

        // skip over any run of separator bytes
        while i < one.len() && !is_alnum(one[i]) {
            i += 1;
        }
        while j < two.len() && !is_alnum(two[j]) {
            j += 1;
        }

        if i >= one.len() || j >= two.len() {
            break;
        }

        // a difference in separator run length decides the comparison
        let sep_one = i - sep_start_one;
        let sep_two = j - sep_start_two;
        if sep_one != sep_two {
            return if sep_one < sep_two {
                Ordering::Less
            } else {
                Ordering::Greater
            };
        }

        // take the maximal run of digits or letters from each side, the kind
        // being determined by the left hand side
        let seg_start_one = i;
        let seg_start_two = j;
        let isnum = one[i].is_ascii_digit();
        if isnum {
            while i < one.len() && one[i].is_ascii_digit() {
                i += 1;
            }
            while j < two.len() && two[j].is_ascii_digit() {
                j += 1;
            }
        } else {
            while i < one.len() && one[i].is_ascii_alphabetic() {
                i += 1;
            }
            while j < two.len() && two[j].is_ascii_alphabetic() {
                j += 1;
            }
        }

        let mut seg_one = &a[seg_start_one..i];
        let mut seg_two = &b[seg_start_two..j];

        // a numeric segment is always newer than an alpha (i.e. empty) one
        if seg_two.is_empty() {
            return if isnum {
                Ordering::Greater
            } else {
                Ordering::Less
            };
        }

        if isnum {
            seg_one = seg_one.trim_start_matches('0');
            seg_two = seg_two.trim_start_matches('0');

            // whichever number has more digits wins
            match seg_one.len().cmp(&seg_two.len()) {
                Ordering::Equal => {}
                ordering => return ordering,
            }
        }

        match seg_one.cmp(seg_two) {
            Ordering::Equal => {}
            ordering => return ordering,
        }
    }

    let leftover_one = &a[i.min(one.len())..];
    let leftover_two = &b[j.min(two.len())..];

    // all segments compared equal, only separators or one-sided leftovers
    // remain
    if leftover_one.is_empty() && leftover_two.is_empty() {
        return Ordering::Equal;
    }

    // a remaining alpha string never beats an empty string
    if (leftover_one.is_empty() && !leftover_two.as_bytes()[0].is_ascii_alphabetic())
        || (!leftover_one.is_empty() && leftover_one.as_bytes()[0].is_ascii_alphabetic())
    {
        return Ordering::Less;
    }

    Ordering::Greater
}

/// Compares two pkgver strings.
///
/// * `1` if `a` is newer than `b`
/// * `0` if `a` and `b` are the same version
/// * `-1` if `a` is older than `b`
///
/// ## Examples
/// ```
/// use repod_types::vercmp;
///
/// assert_eq!(vercmp("1.0.0", "0.1.0"), 1);
/// assert_eq!(vercmp("01", "1"), 0);
/// assert_eq!(vercmp("1.1a1", "1.111"), -1);
/// ```
pub fn vercmp(a: &str, b: &str) -> i8 {
    match pkgver_cmp(a, b) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }
}

/// Compares two full versions of the form `[epoch:]pkgver[-pkgrel]`.
///
/// The epochs (defaulting to `0`), the pkgvers and (if both are present) the
/// pkgrels are compared with [`vercmp`] in that order and the first non-zero
/// comparison is returned.
///
/// ## Examples
/// ```
/// use repod_types::pkg_vercmp;
///
/// assert_eq!(pkg_vercmp("1:1.0.0-1", "9.9.9-9"), 1);
/// assert_eq!(pkg_vercmp("1.0.0-1", "1.0.0-2"), -1);
/// assert_eq!(pkg_vercmp("1.0.0", "1.0.0-2"), 0);
/// ```
pub fn pkg_vercmp(a: &str, b: &str) -> i8 {
    fn split(version: &str) -> (&str, &str, Option<&str>) {
        let (epoch, rest) = match version.split_once(':') {
            Some((epoch, rest)) => (epoch, rest),
            None => ("0", version),
        };
        match rest.rsplit_once('-') {
            Some((pkgver, pkgrel)) => (epoch, pkgver, Some(pkgrel)),
            None => (epoch, rest, None),
        }
    }

    let (epoch_a, pkgver_a, pkgrel_a) = split(a);
    let (epoch_b, pkgver_b, pkgrel_b) = split(b);

    let epoch_cmp = vercmp(epoch_a, epoch_b);
    if epoch_cmp != 0 {
        return epoch_cmp;
    }

    let pkgver_cmp = vercmp(pkgver_a, pkgver_b);
    if pkgver_cmp != 0 {
        return pkgver_cmp;
    }

    match (pkgrel_a, pkgrel_b) {
        (Some(rel_a), Some(rel_b)) => vercmp(rel_a, rel_b),
        _ => 0,
    }
}

/// An epoch of a package.
///
/// An epoch is used to force the ordering of a package over one with an
/// otherwise newer pkgver. It is prepended to a version, delimited by a `:`
/// (e.g. `1:` is added to `0.10.0-1` to form `1:0.10.0-1`, which then orders
/// newer than `1.0.0-1`).
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::Epoch;
///
/// assert!(Epoch::from_str("1").is_ok());
/// assert!(Epoch::from_str("0").is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Epoch(NonZeroUsize);

impl Epoch {
    /// Creates a new [`Epoch`] from a string slice.
    pub fn new(epoch: &str) -> Result<Self, Error> {
        epoch
            .parse()
            .map(Epoch)
            .map_err(|_| Error::InvalidEpoch(epoch.to_string()))
    }

    /// Returns the inner non-zero integer.
    pub fn inner(&self) -> NonZeroUsize {
        self.0
    }
}

impl FromStr for Epoch {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Epoch::new(input)
    }
}

impl Display for Epoch {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

/// A pkgrel of a package.
///
/// The pkgrel counts the builds of a package at the same pkgver and must
/// start at `1` for a new release. It wraps a string that contains only
/// digits, optionally delimited by a single `.`, where neither component may
/// carry a leading zero.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::Pkgrel;
///
/// assert!(Pkgrel::from_str("1").is_ok());
/// assert!(Pkgrel::from_str("1.1").is_ok());
/// assert!(Pkgrel::from_str("0").is_err());
/// assert!(Pkgrel::from_str("1.0").is_err());
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Pkgrel(String);

impl Pkgrel {
    /// Creates a new [`Pkgrel`] from a string slice.
    pub fn new(pkgrel: &str) -> Result<Self, Error> {
        fn component_valid(component: &str) -> bool {
            !component.is_empty()
                && component.bytes().all(|byte| byte.is_ascii_digit())
                && !component.starts_with('0')
        }

        let valid = match pkgrel.split_once('.') {
            Some((major, minor)) => component_valid(major) && component_valid(minor),
            None => component_valid(pkgrel),
        };

        if valid {
            Ok(Pkgrel(pkgrel.to_string()))
        } else {
            Err(Error::InvalidPkgrel(pkgrel.to_string()))
        }
    }

    /// Returns the inner string slice.
    pub fn inner(&self) -> &str {
        &self.0
    }
}

impl FromStr for Pkgrel {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Pkgrel::new(input)
    }
}

impl Display for Pkgrel {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

impl Ord for Pkgrel {
    fn cmp(&self, other: &Self) -> Ordering {
        pkgver_cmp(self.inner(), other.inner())
    }
}

impl PartialOrd for Pkgrel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A pkgver of a package.
///
/// The pkgver denotes the upstream version of a package. It wraps a string
/// that contains only alphanumerics and the characters `.`, `+`, `_`, but
/// does not start with any of them, and is at least one character long.
///
/// The [`Ord`] implementation follows [`vercmp`].
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::Pkgver;
///
/// assert!(Pkgver::from_str("1.0.0").is_ok());
/// assert!(Pkgver::from_str(".0.1").is_err());
/// assert!(Pkgver::from_str("").is_err());
/// ```
#[derive(Clone, Debug, Eq, Hash)]
pub struct Pkgver(String);

impl Pkgver {
    /// Creates a new [`Pkgver`] from a string slice.
    pub fn new(pkgver: &str) -> Result<Self, Error> {
        let mut bytes = pkgver.bytes();
        let first_valid = bytes
            .next()
            .map(|byte| byte.is_ascii_alphanumeric())
            .unwrap_or(false);
        let rest_valid =
            bytes.all(|byte| byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'+' | b'_'));

        if first_valid && rest_valid {
            Ok(Pkgver(pkgver.to_string()))
        } else {
            Err(Error::InvalidPkgver(pkgver.to_string()))
        }
    }

    /// Returns the inner string slice.
    pub fn inner(&self) -> &str {
        &self.0
    }
}

impl FromStr for Pkgver {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Pkgver::new(input)
    }
}

impl Display for Pkgver {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

impl Ord for Pkgver {
    fn cmp(&self, other: &Self) -> Ordering {
        pkgver_cmp(self.inner(), other.inner())
    }
}

impl PartialOrd for Pkgver {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Pkgver {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

/// A version of a package.
///
/// A [`Version`] tracks an optional [`Epoch`], a [`Pkgver`] and an optional
/// [`Pkgrel`]. Its [`Ord`] implementation provides the total order used for
/// all update decisions.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::Version;
///
/// let version = Version::from_str("1:1.0.0-1").unwrap();
/// assert_eq!(version.to_string(), "1:1.0.0-1");
/// assert!(version > Version::from_str("1.0.0-1").unwrap());
/// ```
#[derive(Clone, Debug, Eq, Hash)]
pub struct Version {
    epoch: Option<Epoch>,
    pkgver: Pkgver,
    pkgrel: Option<Pkgrel>,
}

impl Version {
    /// Creates a new [`Version`] from a string slice.
    ///
    /// # Errors
    ///
    /// Returns an error if more than one `:` or trailing `-` delimiter is
    /// present, or if any of the components can not be validated.
    pub fn new(version: &str) -> Result<Self, Error> {
        let (epoch, rest) = match version.split_once(':') {
            Some((epoch, rest)) => {
                if rest.contains(':') {
                    return Err(Error::InvalidVersion(version.to_string()));
                }
                (Some(Epoch::new(epoch)?), rest)
            }
            None => (None, version),
        };

        let (pkgver, pkgrel) = match rest.split_once('-') {
            Some((pkgver, pkgrel)) => {
                if pkgrel.contains('-') {
                    return Err(Error::InvalidVersion(version.to_string()));
                }
                (Pkgver::new(pkgver)?, Some(Pkgrel::new(pkgrel)?))
            }
            None => (Pkgver::new(rest)?, None),
        };

        Ok(Version {
            epoch,
            pkgver,
            pkgrel,
        })
    }

    /// Creates a new [`Version`], which is guaranteed to have a [`Pkgrel`].
    pub fn with_pkgrel(version: &str) -> Result<Self, Error> {
        match Version::new(version) {
            Ok(version) if version.pkgrel().is_some() => Ok(version),
            _ => Err(Error::InvalidVersion(version.to_string())),
        }
    }

    /// Returns the optional [`Epoch`] of the version.
    pub fn epoch(&self) -> Option<&Epoch> {
        self.epoch.as_ref()
    }

    /// Returns the [`Pkgver`] of the version.
    pub fn pkgver(&self) -> &Pkgver {
        &self.pkgver
    }

    /// Returns the optional [`Pkgrel`] of the version.
    pub fn pkgrel(&self) -> Option<&Pkgrel> {
        self.pkgrel.as_ref()
    }

    /// Compares two [`Version`]s and returns a number.
    ///
    /// * `1` if `a` is newer than `b`
    /// * `0` if `a` and `b` are the same version
    /// * `-1` if `a` is older than `b`
    pub fn vercmp(a: &Version, b: &Version) -> i8 {
        match a.cmp(b) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Version::new(input)
    }
}

impl Display for Version {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        if let Some(epoch) = self.epoch() {
            write!(fmt, "{epoch}:")?;
        }
        write!(fmt, "{}", self.pkgver())?;
        if let Some(pkgrel) = self.pkgrel() {
            write!(fmt, "-{pkgrel}")?;
        }
        Ok(())
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let epoch_one = self.epoch.map(|epoch| epoch.inner().get()).unwrap_or(0);
        let epoch_two = other.epoch.map(|epoch| epoch.inner().get()).unwrap_or(0);
        match epoch_one.cmp(&epoch_two) {
            Ordering::Equal => {}
            ordering => return ordering,
        }

        match self.pkgver.cmp(&other.pkgver) {
            Ordering::Equal => {}
            ordering => return ordering,
        }

        match (&self.pkgrel, &other.pkgrel) {
            (Some(rel_one), Some(rel_two)) => rel_one.cmp(rel_two),
            _ => Ordering::Equal,
        }
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other).is_eq()
    }
}

/// The schema version of a versioned file format.
///
/// A [`SchemaVersion`] wraps a [`semver::Version`]. For backwards
/// compatibility it can be created from a plain positive integer (e.g. `"2"`
/// is treated as `"2.0.0"`).
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::SchemaVersion;
///
/// assert_eq!(
///     SchemaVersion::from_str("1").unwrap(),
///     SchemaVersion::from_str("1.0.0").unwrap()
/// );
/// ```
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct SchemaVersion(SemverVersion);

impl SchemaVersion {
    /// Creates a new [`SchemaVersion`] from a [`semver::Version`].
    pub fn new(version: SemverVersion) -> Self {
        SchemaVersion(version)
    }

    /// Returns the inner [`semver::Version`].
    pub fn inner(&self) -> &SemverVersion {
        &self.0
    }
}

impl FromStr for SchemaVersion {
    type Err = Error;

    fn from_str(version: &str) -> Result<Self, Self::Err> {
        if !version.contains('.') {
            match version.parse() {
                Ok(major) => Ok(SchemaVersion(SemverVersion::new(major, 0, 0))),
                Err(_) => Err(Error::InvalidVersion(version.to_string())),
            }
        } else {
            SemverVersion::parse(version)
                .map(SchemaVersion)
                .map_err(|_| Error::InvalidVersion(version.to_string()))
        }
    }
}

impl Display for SchemaVersion {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

/// The version of a build tool.
///
/// A build tool version is either a plain version string or a full version
/// combined with an [`Architecture`] (e.g. `1:1.2.1-1-any`), the latter being
/// required for packages built with `devtools`.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::BuildToolVersion;
///
/// assert!(BuildToolVersion::from_str("1.2.1-1-any").unwrap().architecture().is_some());
/// assert!(BuildToolVersion::from_str("20210216").unwrap().architecture().is_none());
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BuildToolVersion {
    version: Version,
    architecture: Option<Architecture>,
}

impl BuildToolVersion {
    /// Creates a new [`BuildToolVersion`] from a string slice.
    pub fn new(version: &str) -> Result<Self, Error> {
        match version.rsplit_once('-') {
            Some((version_part, architecture))
                if Architecture::from_str(architecture).is_ok() =>
            {
                Ok(BuildToolVersion {
                    version: Version::with_pkgrel(version_part)?,
                    architecture: Some(
                        Architecture::from_str(architecture)
                            .map_err(|_| Error::UnknownArchitecture(architecture.to_string()))?,
                    ),
                })
            }
            _ => Ok(BuildToolVersion {
                version: Version::new(version)?,
                architecture: None,
            }),
        }
    }

    /// Returns the [`Version`] of the build tool.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Returns the optional [`Architecture`] of the build tool.
    pub fn architecture(&self) -> Option<&Architecture> {
        self.architecture.as_ref()
    }
}

impl FromStr for BuildToolVersion {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        BuildToolVersion::new(input)
    }
}

impl Display for BuildToolVersion {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        match self.architecture {
            Some(architecture) => write!(fmt, "{}-{}", self.version, architecture),
            None => write!(fmt, "{}", self.version),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    #[rstest]
    #[case("1", "1", 0)]
    #[case("2", "1", 1)]
    #[case("1", "2", -1)]
    #[case("1.1", "1", 1)]
    #[case("1.2", "1.1", 1)]
    #[case("1+2", "1+1", 1)]
    #[case("1.1", "1.1a", 1)]
    #[case("1.1a1", "1.1", -1)]
    #[case("1.1", "1.11a", -1)]
    #[case("1.1_a", "1.1", 1)]
    #[case("1.a", "1.1", -1)]
    #[case("a.1", "1.1", -1)]
    #[case("a1a", "a1b", -1)]
    #[case("20220102", "20220202", -1)]
    #[case("1.0..", "1.0.", 0)]
    #[case("1.0.", "1.0", 1)]
    #[case("1..0", "1.0", 1)]
    #[case("1..1", "1..0", 1)]
    #[case("1+0", "1.0", 0)]
    #[case("1.111", "1.1a1", 1)]
    #[case("1.1a1", "1.111", -1)]
    #[case("01", "1", 0)]
    #[case("001a", "1a", 0)]
    #[case("1.a001a.1", "1.a1a.1", 0)]
    #[case("", "1", -1)]
    #[case("", "a", 1)]
    #[case("a", "", -1)]
    #[case("1", "", 1)]
    fn vercmp_cases(#[case] version_a: &str, #[case] version_b: &str, #[case] expected: i8) {
        assert_eq!(vercmp(version_a, version_b), expected);
        assert_eq!(vercmp(version_b, version_a), -expected);
    }

    #[rstest]
    #[case("2:1.0.0-1", "1:9.9.9-9", 1)]
    #[case("1:1.0.0-1", "1:1.0.0-2", -1)]
    #[case("1.0.0-1", "1.0.0-1", 0)]
    #[case("1.0.0", "1.0.0-5", 0)]
    #[case("1.0.1-1", "1.0.0-1", 1)]
    fn pkg_vercmp_cases(#[case] version_a: &str, #[case] version_b: &str, #[case] expected: i8) {
        assert_eq!(pkg_vercmp(version_a, version_b), expected);
    }

    #[rstest]
    #[case("1.0.0-1", true, false)]
    #[case("1:1.0.0-1", true, true)]
    #[case("1:1.0.0", false, true)]
    #[case("1.0.0", false, false)]
    fn version_round_trip(
        #[case] version: &str,
        #[case] has_pkgrel: bool,
        #[case] has_epoch: bool,
    ) -> TestResult {
        let parsed = Version::new(version)?;
        assert_eq!(parsed.to_string(), version);
        assert_eq!(parsed.pkgrel().is_some(), has_pkgrel);
        assert_eq!(parsed.epoch().is_some(), has_epoch);
        Ok(())
    }

    #[rstest]
    #[case("1:1:1.0.0-1")]
    #[case("1.0.0-1-1")]
    #[case("-1")]
    #[case("")]
    #[case(":")]
    #[case(".")]
    fn version_invalid(#[case] version: &str) {
        assert!(Version::new(version).is_err());
    }

    #[rstest]
    fn version_with_pkgrel() -> TestResult {
        assert!(Version::with_pkgrel("1.0.0-1").is_ok());
        assert!(Version::with_pkgrel("1.0.0").is_err());
        Ok(())
    }

    #[rstest]
    #[case("0")]
    #[case("0.1")]
    #[case("1.0")]
    #[case("1.")]
    #[case("z")]
    fn pkgrel_invalid(#[case] pkgrel: &str) {
        assert!(Pkgrel::new(pkgrel).is_err());
    }

    #[rstest]
    #[case("1")]
    #[case("1.1")]
    #[case("10")]
    fn pkgrel_valid(#[case] pkgrel: &str) {
        assert!(Pkgrel::new(pkgrel).is_ok());
    }

    #[rstest]
    fn epoch() {
        assert!(Epoch::new("1").is_ok());
        assert!(Epoch::new("0").is_err());
        assert!(Epoch::new("-0").is_err());
        assert!(Epoch::new("z").is_err());
    }

    #[rstest]
    fn schema_version() -> TestResult {
        assert_eq!(
            SchemaVersion::from_str("1")?,
            SchemaVersion::new(SemverVersion::new(1, 0, 0))
        );
        assert!(SchemaVersion::from_str("-1.0.0").is_err());
        Ok(())
    }

    #[rstest]
    fn version_total_order_transitivity() -> TestResult {
        let versions = ["0.9", "1.0.0a", "1.0.0", "1.0.1", "1:0.1.0", "2:0.0.1"];
        for window in versions.windows(2) {
            assert!(Version::new(window[0])? < Version::new(window[1])?);
        }
        assert!(Version::new(versions[0])? < Version::new(versions[versions.len() - 1])?);
        Ok(())
    }

    proptest::proptest! {
        #[test]
        fn vercmp_antisymmetric(a in "[a-z0-9.+_]{0,10}", b in "[a-z0-9.+_]{0,10}") {
            proptest::prop_assert_eq!(vercmp(&a, &b), -vercmp(&b, &a));
        }

        #[test]
        fn vercmp_reflexive(a in "[a-z0-9.+_]{0,10}") {
            proptest::prop_assert_eq!(vercmp(&a, &a), 0);
        }
    }
}
