//! Names of packages and build tools.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// Returns whether `input` is a valid package or build tool name.
///
/// Names consist of lowercase alphanumerics and the characters `@`, `_`,
/// `+`, `.` and `-`, but may not start with `-` or `.`.
fn name_valid(input: &str) -> bool {
    let mut bytes = input.bytes();
    let first_valid = bytes
        .next()
        .map(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || matches!(byte, b'@' | b'_' | b'+'))
        .unwrap_or(false);
    first_valid
        && input.bytes().all(|byte| {
            byte.is_ascii_lowercase()
                || byte.is_ascii_digit()
                || matches!(byte, b'@' | b'_' | b'+' | b'.' | b'-')
        })
}

/// The name of a package.
///
/// This type is also used for the pkgbase of a package, as both follow the
/// same naming rules.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::Name;
///
/// assert!(Name::from_str("foo-bar").is_ok());
/// assert!(Name::from_str("-foo").is_err());
/// assert!(Name::from_str("").is_err());
/// ```
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] from a string slice.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name_valid(name) {
            Ok(Name(name.to_string()))
        } else {
            Err(Error::InvalidName(name.to_string()))
        }
    }

    /// Returns the inner string slice.
    pub fn inner(&self) -> &str {
        &self.0
    }
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Name::new(input)
    }
}

impl Display for Name {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

impl Serialize for Name {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.inner())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let input = String::deserialize(deserializer)?;
        Name::new(&input).map_err(de::Error::custom)
    }
}

/// The name of a build tool.
///
/// Build tool names follow the same rules as package names.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::BuildTool;
///
/// assert!(BuildTool::from_str("devtools").is_ok());
/// assert!(BuildTool::from_str(".devtools").is_err());
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BuildTool(Name);

impl BuildTool {
    /// Creates a new [`BuildTool`] from a string slice.
    pub fn new(name: &str) -> Result<Self, Error> {
        Name::new(name).map(BuildTool)
    }

    /// Returns the inner [`Name`].
    pub fn inner(&self) -> &Name {
        &self.0
    }
}

impl FromStr for BuildTool {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        BuildTool::new(input)
    }
}

impl Display for BuildTool {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("foo", true)]
    #[case("foo-bar", true)]
    #[case("foo.bar", true)]
    #[case("@foo", true)]
    #[case("_foo", true)]
    #[case("+foo", true)]
    #[case("foo123", true)]
    #[case("-foo", false)]
    #[case(".foo", false)]
    #[case("Foo", false)]
    #[case("foo bar", false)]
    #[case("", false)]
    fn name_from_string(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(Name::from_str(input).is_ok(), valid);
    }

    #[rstest]
    fn name_round_trip() {
        let name = Name::new("foo-bar").unwrap();
        assert_eq!(name.to_string(), "foo-bar");
    }
}
