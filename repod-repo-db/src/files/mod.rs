//! The `files` member format of sync databases.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::Error;

/// The header of the files list.
const FILES_SECTION: &str = "%FILES%";

/// A representation of the `files` version 1 file format.
///
/// The file consists of a single `%FILES%` section, followed by one
/// relative path per line.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_repo_db::files::FilesV1;
///
/// # fn main() -> Result<(), repod_repo_db::Error> {
/// let data = "%FILES%\nusr/\nusr/bin/\nusr/bin/foo\n";
/// let files = FilesV1::from_str(data)?;
/// assert_eq!(files.files().len(), 3);
/// assert_eq!(files.to_string(), data);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FilesV1 {
    files: Vec<String>,
}

impl FilesV1 {
    /// Creates a new [`FilesV1`] from a list of relative paths.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the paths starts with a `/`.
    pub fn new(files: Vec<String>) -> Result<Self, Error> {
        for file in &files {
            if file.starts_with('/') {
                return Err(Error::FilesEntryNotRelative(file.clone()));
            }
        }
        Ok(FilesV1 { files })
    }

    /// Returns the relative paths of the files list.
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Returns the schema version of the value.
    pub fn get_schema_version(&self) -> u64 {
        1
    }
}

impl FromStr for FilesV1 {
    type Err = Error;

    /// Creates a [`FilesV1`] from a string slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the `%FILES%` header is missing, another section
    /// header is encountered, or any path is not relative.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines();
        match lines.next() {
            Some(line) if line.trim() == FILES_SECTION => {}
            _ => return Err(Error::MissingSection("FILES")),
        }

        let mut files = Vec::new();
        for line in lines {
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('%') {
                return Err(Error::Parse(format!(
                    "unexpected section header in files data: {line}"
                )));
            }
            files.push(line.to_string());
        }

        FilesV1::new(files)
    }
}

impl Display for FilesV1 {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        writeln!(fmt, "{FILES_SECTION}")?;
        for file in &self.files {
            writeln!(fmt, "{file}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    #[rstest]
    fn files_round_trip() -> TestResult {
        let data = "%FILES%\nusr/\nusr/bin/\nusr/bin/foo\n";
        let files = FilesV1::from_str(data)?;
        assert_eq!(files.to_string(), data);
        Ok(())
    }

    #[rstest]
    fn files_empty_list() -> TestResult {
        let files = FilesV1::from_str("%FILES%\n")?;
        assert!(files.files().is_empty());
        Ok(())
    }

    #[rstest]
    fn files_missing_header() {
        assert!(matches!(
            FilesV1::from_str("usr/bin/foo\n"),
            Err(Error::MissingSection("FILES"))
        ));
    }

    #[rstest]
    fn files_absolute_path() {
        assert!(matches!(
            FilesV1::from_str("%FILES%\n/usr/bin/foo\n"),
            Err(Error::FilesEntryNotRelative(_))
        ));
    }
}
