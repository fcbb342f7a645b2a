//! Absolute paths in package metadata.

use std::{
    fmt::{Display, Formatter},
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::Error;

/// An absolute path, as used in package build metadata.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::AbsolutePath;
///
/// assert!(AbsolutePath::from_str("/build").is_ok());
/// assert!(AbsolutePath::from_str("build").is_err());
/// ```
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct AbsolutePath(PathBuf);

impl AbsolutePath {
    /// Creates a new [`AbsolutePath`] from a string slice.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not absolute.
    pub fn new(path: &str) -> Result<Self, Error> {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            Ok(AbsolutePath(path))
        } else {
            Err(Error::PathNotAbsolute(path.display().to_string()))
        }
    }

    /// Returns the inner [`Path`].
    pub fn inner(&self) -> &Path {
        &self.0
    }
}

impl FromStr for AbsolutePath {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        AbsolutePath::new(input)
    }
}

impl Display for AbsolutePath {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.0.display())
    }
}

/// The directory a package is built in.
pub type BuildDirectory = AbsolutePath;

/// The directory a package build is started from.
pub type StartDirectory = AbsolutePath;

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("/build", true)]
    #[case("/build/nested", true)]
    #[case("build", false)]
    #[case("./build", false)]
    fn absolute_path(#[case] path: &str, #[case] valid: bool) {
        assert_eq!(AbsolutePath::from_str(path).is_ok(), valid);
    }
}
