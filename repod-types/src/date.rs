//! Dates in package metadata.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::Error;

/// A build date in seconds since the epoch.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::BuildDate;
///
/// assert_eq!(BuildDate::from_str("1"), Ok(BuildDate::new(1)));
/// assert!(BuildDate::from_str("-1").is_err());
/// assert!(BuildDate::from_str("foo").is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct BuildDate(i64);

impl BuildDate {
    /// Creates a new [`BuildDate`].
    pub fn new(builddate: i64) -> BuildDate {
        BuildDate(builddate)
    }

    /// Returns the inner timestamp.
    pub fn inner(&self) -> i64 {
        self.0
    }
}

impl FromStr for BuildDate {
    type Err = Error;

    /// Creates a [`BuildDate`] from a string slice.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` is not a non-negative integer.
    fn from_str(input: &str) -> Result<BuildDate, Self::Err> {
        match input.parse::<i64>() {
            Ok(builddate) if builddate >= 0 => Ok(BuildDate(builddate)),
            _ => Err(Error::InvalidBuildDate(input.to_string())),
        }
    }
}

impl Display for BuildDate {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}
