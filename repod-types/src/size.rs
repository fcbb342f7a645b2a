//! File and package sizes.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::Error;

/// Compressed size of a file (in bytes).
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::CompressedSize;
///
/// assert_eq!(CompressedSize::from_str("1"), Ok(CompressedSize::new(1)));
/// assert!(CompressedSize::from_str("-1").is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CompressedSize(u64);

impl CompressedSize {
    /// Creates a new [`CompressedSize`].
    pub fn new(size: u64) -> CompressedSize {
        CompressedSize(size)
    }

    /// Returns the inner size.
    pub fn inner(&self) -> u64 {
        self.0
    }
}

impl FromStr for CompressedSize {
    type Err = Error;

    fn from_str(input: &str) -> Result<CompressedSize, Self::Err> {
        input
            .parse::<u64>()
            .map(CompressedSize)
            .map_err(|_| Error::InvalidCompressedSize(input.to_string()))
    }
}

impl Display for CompressedSize {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

/// Installed size of a package (in bytes).
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::InstalledSize;
///
/// assert_eq!(InstalledSize::from_str("1"), Ok(InstalledSize::new(1)));
/// assert!(InstalledSize::from_str("-1").is_err());
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct InstalledSize(u64);

impl InstalledSize {
    /// Creates a new [`InstalledSize`].
    pub fn new(size: u64) -> InstalledSize {
        InstalledSize(size)
    }

    /// Returns the inner size.
    pub fn inner(&self) -> u64 {
        self.0
    }
}

impl FromStr for InstalledSize {
    type Err = Error;

    fn from_str(input: &str) -> Result<InstalledSize, Self::Err> {
        input
            .parse::<u64>()
            .map(InstalledSize)
            .map_err(|_| Error::InvalidInstalledSize(input.to_string()))
    }
}

impl Display for InstalledSize {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.inner())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("1", Ok(CompressedSize::new(1)))]
    #[case("-1", Err(Error::InvalidCompressedSize(String::from("-1"))))]
    fn compressedsize_from_string(
        #[case] input: &str,
        #[case] result: Result<CompressedSize, Error>,
    ) {
        assert_eq!(CompressedSize::from_str(input), result);
    }

    #[rstest]
    #[case("1", Ok(InstalledSize::new(1)))]
    #[case("-1", Err(Error::InvalidInstalledSize(String::from("-1"))))]
    fn installedsize_from_string(#[case] input: &str, #[case] result: Result<InstalledSize, Error>) {
        assert_eq!(InstalledSize::from_str(input), result);
    }
}
