//! Package related types.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use strum::{Display as StrumDisplay, EnumString, VariantNames};

use crate::Error;

/// The type of a package.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::PackageType;
///
/// assert_eq!(PackageType::from_str("debug"), Ok(PackageType::Debug));
/// assert_eq!("pkg", format!("{}", PackageType::Package));
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    EnumString,
    Eq,
    Hash,
    PartialEq,
    Serialize,
    StrumDisplay,
    VariantNames,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    /// A default package.
    #[strum(to_string = "pkg")]
    #[serde(rename = "pkg")]
    Package,
    /// A debug package.
    Debug,
    /// A source-only package.
    #[strum(to_string = "src")]
    #[serde(rename = "src")]
    Source,
    /// One package out of a split package setup.
    Split,
}

/// The User ID of an entity that builds a package.
///
/// A packager is of the form `Name <email>`, where `Name` is free-form (but
/// may not contain `<` or `>`) and `email` is a valid e-mail address.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::Packager;
///
/// let packager = Packager::from_str("Foobar McFooface <foobar@mcfooface.org>").unwrap();
/// assert_eq!(packager.name(), "Foobar McFooface");
/// assert_eq!(packager.email().to_string(), "foobar@mcfooface.org");
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Packager {
    name: String,
    email: EmailAddress,
}

impl Packager {
    /// Creates a new [`Packager`] from a string slice.
    ///
    /// # Errors
    ///
    /// Returns an error if `packager` is not of the form `Name <email>`.
    pub fn new(packager: &str) -> Result<Self, Error> {
        let error = || Error::InvalidPackager(packager.to_string());

        let rest = packager.strip_suffix('>').ok_or_else(error)?;
        let (name, email) = rest.split_once('<').ok_or_else(error)?;
        let name = name.strip_suffix(' ').ok_or_else(error)?;

        if name.is_empty() || name.contains('<') || name.contains('>') || email.contains('<') {
            return Err(error());
        }

        let email = EmailAddress::from_str(email).map_err(|_| error())?;

        Ok(Packager {
            name: name.to_string(),
            email,
        })
    }

    /// Returns the name of the packager.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the e-mail address of the packager.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}

impl FromStr for Packager {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        Packager::new(input)
    }
}

impl Display for Packager {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{} <{}>", self.name, self.email)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    #[rstest]
    fn packager_round_trip() -> TestResult {
        let input = "Foobar McFooface <foobar@mcfooface.org>";
        assert_eq!(Packager::from_str(input)?.to_string(), input);
        Ok(())
    }

    #[rstest]
    #[case("Foobar McFooface")]
    #[case("<foobar@mcfooface.org>")]
    #[case("Foobar McFooface <foobar@mcfooface.org")]
    #[case("Foobar McFooface <foobar>")]
    #[case("Foobar <McFooface <foobar@mcfooface.org>")]
    fn packager_invalid(#[case] input: &str) {
        assert!(Packager::from_str(input).is_err());
    }

    #[rstest]
    #[case("pkg", Ok(PackageType::Package))]
    #[case("debug", Ok(PackageType::Debug))]
    #[case("src", Ok(PackageType::Source))]
    #[case("split", Ok(PackageType::Split))]
    fn package_type_from_string(
        #[case] input: &str,
        #[case] result: Result<PackageType, strum::ParseError>,
    ) {
        assert_eq!(PackageType::from_str(input), result);
    }
}
