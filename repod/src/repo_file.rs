//! Files in a repository: pool files and their repository symlinks.

use std::{
    path::{Component, Path, PathBuf},
    str::FromStr,
};

use log::{debug, info};
use repod_types::PackageFileName;

use crate::Error;

/// The suffix of detached package signatures.
const SIGNATURE_SUFFIX: &str = ".sig";

/// The kind of a file in a repository.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RepoFileKind {
    /// A package file.
    Package,
    /// A detached package signature.
    PackageSignature,
}

impl RepoFileKind {
    /// Validates that the file name of `path` matches the shape of the
    /// kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the file name does not match the package file
    /// name format (with a `.sig` suffix for
    /// [`RepoFileKind::PackageSignature`]).
    pub fn validate_path(&self, path: &Path) -> Result<(), Error> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                Error::Validation(format!(
                    "The path '{}' does not point at a file",
                    path.display()
                ))
            })?;

        let package_name = match self {
            RepoFileKind::Package => file_name,
            RepoFileKind::PackageSignature => {
                file_name.strip_suffix(SIGNATURE_SUFFIX).ok_or_else(|| {
                    Error::Validation(format!(
                        "The path '{}' does not carry the '{SIGNATURE_SUFFIX}' suffix",
                        path.display()
                    ))
                })?
            }
        };

        PackageFileName::from_str(package_name)
            .map(|_| ())
            .map_err(|error| {
                Error::Validation(format!(
                    "The path '{}' does not match the shape of a {self:?} file: {error}",
                    path.display()
                ))
            })
    }
}

/// Returns the shared base path of two absolute paths.
///
/// # Errors
///
/// Returns an error if either path is not absolute.
///
/// ## Examples
/// ```
/// use std::path::{Path, PathBuf};
///
/// use repod::repo_file::shared_base_path;
///
/// # fn main() -> Result<(), repod::Error> {
/// assert_eq!(
///     shared_base_path(Path::new("/foo/bar/baz"), Path::new("/foo/bar/beh"))?,
///     PathBuf::from("/foo/bar")
/// );
/// # Ok(())
/// # }
/// ```
pub fn shared_base_path(path_a: &Path, path_b: &Path) -> Result<PathBuf, Error> {
    debug!("Calculating the shared base path of {path_a:?} and {path_b:?}...");
    for path in [path_a, path_b] {
        if !path.is_absolute() {
            return Err(Error::Validation(format!(
                "The path '{}' is not absolute",
                path.display()
            )));
        }
    }

    let mut shared_base = PathBuf::new();
    for (component_a, component_b) in path_a.components().zip(path_b.components()) {
        if component_a != component_b {
            break;
        }
        shared_base.push(component_a);
    }

    Ok(shared_base)
}

/// Returns a path to `path_a`, relative to the shared base path of `path_a`
/// and `path_b`.
///
/// The parent distance of `path_b` to the shared base determines the number
/// of leading `..` components.
///
/// # Errors
///
/// Returns an error if either path is not absolute.
///
/// ## Examples
/// ```
/// use std::path::{Path, PathBuf};
///
/// use repod::repo_file::relative_to_shared_base;
///
/// # fn main() -> Result<(), repod::Error> {
/// assert_eq!(
///     relative_to_shared_base(
///         Path::new("/foo/bar/baz/file"),
///         Path::new("/foo/bar/beh/file")
///     )?,
///     PathBuf::from("../baz/file")
/// );
/// # Ok(())
/// # }
/// ```
pub fn relative_to_shared_base(path_a: &Path, path_b: &Path) -> Result<PathBuf, Error> {
    let shared_base = shared_base_path(path_a, path_b)?;
    let parent_distance = path_b
        .parent()
        .map(|parent| parent.components().count())
        .unwrap_or(0)
        .saturating_sub(shared_base.components().count());

    let relative = path_a
        .strip_prefix(&shared_base)
        .map_err(|_| {
            Error::Validation(format!(
                "The path '{}' is not below the shared base '{}'",
                path_a.display(),
                shared_base.display()
            ))
        })?
        .to_path_buf();

    let mut result = PathBuf::new();
    for _ in 0..parent_distance {
        result.push(Component::ParentDir);
    }
    result.push(relative);

    Ok(result)
}

/// A pair of a content-addressed pool path and a repository symlink path.
///
/// The `file_path` is the location of the actual file in a pool directory,
/// while the `symlink_path` is the repository-visible path pointing at it
/// through a relative symlink.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RepoFile {
    kind: RepoFileKind,
    file_path: PathBuf,
    symlink_path: PathBuf,
}

impl RepoFile {
    /// Creates a new [`RepoFile`].
    ///
    /// # Errors
    ///
    /// Returns an error if
    ///
    /// - either path is not absolute,
    /// - either path does not match the shape of `kind`,
    /// - or both paths are equal.
    pub fn new(kind: RepoFileKind, file_path: PathBuf, symlink_path: PathBuf) -> Result<Self, Error> {
        for path in [&file_path, &symlink_path] {
            if !path.is_absolute() {
                return Err(Error::Validation(format!(
                    "The path '{}' is not absolute",
                    path.display()
                )));
            }
            kind.validate_path(path)?;
        }
        if file_path == symlink_path {
            return Err(Error::Validation(format!(
                "The file path and the symlink path must not be equal: '{}'",
                file_path.display()
            )));
        }

        Ok(RepoFile {
            kind,
            file_path,
            symlink_path,
        })
    }

    /// Returns the pool path of the file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Returns the repository symlink path of the file.
    pub fn symlink_path(&self) -> &Path {
        &self.symlink_path
    }

    /// Ensures the existence (or absence) of the pool file.
    fn check_file_path_exists(&self, exists: bool) -> Result<(), Error> {
        if exists && !self.file_path.exists() {
            return Err(Error::FileNotFound(self.file_path.clone()));
        }
        if !exists && self.file_path.exists() {
            return Err(Error::Validation(format!(
                "The file '{}' exists already",
                self.file_path.display()
            )));
        }
        Ok(())
    }

    /// Ensures the existence (or absence) of the symlink.
    fn check_symlink_path_exists(&self, exists: bool) -> Result<(), Error> {
        let symlink_exists = self.symlink_path.symlink_metadata().is_ok();
        if exists && !symlink_exists {
            return Err(Error::FileNotFound(self.symlink_path.clone()));
        }
        if !exists && symlink_exists {
            return Err(Error::Validation(format!(
                "The symlink '{}' exists already",
                self.symlink_path.display()
            )));
        }
        Ok(())
    }

    /// Copies the file at `path` to the pool path.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist or does not match the
    /// shape of the file kind, or if the pool path exists already.
    pub fn copy_from(&self, path: &Path) -> Result<(), Error> {
        info!("Copying {path:?} to {:?}...", self.file_path);
        self.kind.validate_path(path)?;
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        self.check_file_path_exists(false)?;

        std::fs::copy(path, &self.file_path)
            .map(|_| ())
            .map_err(|source| Error::File {
                path: self.file_path.clone(),
                context: "copying a file into a pool directory",
                source,
            })
    }

    /// Moves the file at `path` to the pool path.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist or does not match the
    /// shape of the file kind, or if the pool path exists already.
    pub fn move_from(&self, path: &Path) -> Result<(), Error> {
        info!("Moving {path:?} to {:?}...", self.file_path);
        self.kind.validate_path(path)?;
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        self.check_file_path_exists(false)?;

        std::fs::rename(path, &self.file_path).map_err(|source| Error::File {
            path: self.file_path.clone(),
            context: "moving a file into a pool directory",
            source,
        })
    }

    /// Creates the repository symlink as a relative symlink to the pool
    /// path.
    ///
    /// The symlink target is computed relative to the deepest common
    /// ancestor of the two paths (see [`relative_to_shared_base`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the symlink exists already (unless `check` is
    /// disabled) or can not be created.
    pub fn link(&self, check: bool) -> Result<(), Error> {
        info!("Linking {:?} to {:?}...", self.symlink_path, self.file_path);
        if check {
            self.check_symlink_path_exists(false)?;
        }

        let target = relative_to_shared_base(&self.file_path, &self.symlink_path)?;
        std::os::unix::fs::symlink(&target, &self.symlink_path).map_err(|source| Error::File {
            path: self.symlink_path.clone(),
            context: "creating a repository symlink",
            source,
        })
    }

    /// Removes the repository symlink.
    ///
    /// # Errors
    ///
    /// Returns an error if the symlink does not exist (unless `check` is
    /// disabled) or can not be removed.
    pub fn unlink(&self, check: bool) -> Result<(), Error> {
        info!("Unlinking {:?} from {:?}...", self.symlink_path, self.file_path);
        if check {
            self.check_symlink_path_exists(true)?;
        }

        match std::fs::remove_file(&self.symlink_path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound && !check => Ok(()),
            Err(source) => Err(Error::File {
                path: self.symlink_path.clone(),
                context: "removing a repository symlink",
                source,
            }),
        }
    }

    /// Removes the pool file and optionally the repository symlink.
    ///
    /// With `force`, missing files are ignored and no existence checks are
    /// performed.
    ///
    /// # Errors
    ///
    /// Returns an error if a file can not be removed, or (without `force`)
    /// does not exist.
    pub fn remove(&self, force: bool, unlink: bool) -> Result<(), Error> {
        info!("Removing {:?}...", self.file_path);
        if !force {
            self.check_file_path_exists(true)?;
        }

        match std::fs::remove_file(&self.file_path) {
            Ok(()) => {}
            Err(error) if error.kind() == std::io::ErrorKind::NotFound && force => {}
            Err(source) => {
                return Err(Error::File {
                    path: self.file_path.clone(),
                    context: "removing a pool file",
                    source,
                })
            }
        }

        if unlink {
            self.unlink(!force)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use rstest::rstest;
    use tempfile::TempDir;
    use testresult::TestResult;

    use super::*;

    const PACKAGE: &str = "foo-1:1.0.0-1-any.pkg.tar.zst";

    #[rstest]
    #[case("/foo/bar/baz", "/foo/bar/beh", "/foo/bar")]
    #[case("/foo/bar", "/foo/bar", "/foo/bar")]
    #[case("/foo", "/beh", "/")]
    fn shared_base(#[case] path_a: &str, #[case] path_b: &str, #[case] expected: &str) -> TestResult {
        assert_eq!(
            shared_base_path(Path::new(path_a), Path::new(path_b))?,
            PathBuf::from(expected)
        );
        Ok(())
    }

    #[rstest]
    fn shared_base_requires_absolute_paths() {
        assert!(shared_base_path(Path::new("foo"), Path::new("/bar")).is_err());
        assert!(shared_base_path(Path::new("/foo"), Path::new("bar")).is_err());
    }

    #[rstest]
    #[case("/foo/bar/baz/file", "/foo/bar/beh/file", "../baz/file")]
    #[case("/foo/bar/file", "/foo/bar/other", "file")]
    #[case("/pool/repo/file", "/repo/arch/file", "../../pool/repo/file")]
    fn relative_base(#[case] path_a: &str, #[case] path_b: &str, #[case] expected: &str) -> TestResult {
        assert_eq!(
            relative_to_shared_base(Path::new(path_a), Path::new(path_b))?,
            PathBuf::from(expected)
        );
        Ok(())
    }

    #[rstest]
    fn repo_file_rejects_equal_paths() {
        let path = PathBuf::from(format!("/pool/{PACKAGE}"));
        assert!(RepoFile::new(RepoFileKind::Package, path.clone(), path).is_err());
    }

    #[rstest]
    fn repo_file_rejects_wrong_shape() {
        assert!(RepoFile::new(
            RepoFileKind::Package,
            PathBuf::from("/pool/foo.txt"),
            PathBuf::from(format!("/repo/{PACKAGE}")),
        )
        .is_err());
        assert!(RepoFile::new(
            RepoFileKind::PackageSignature,
            PathBuf::from(format!("/pool/{PACKAGE}")),
            PathBuf::from(format!("/repo/{PACKAGE}.sig")),
        )
        .is_err());
    }

    #[rstest]
    fn repo_file_copy_link_unlink_remove() -> TestResult {
        let dir = TempDir::new()?;
        let pool_dir = dir.path().join("pool/test");
        let repo_dir = dir.path().join("repo/test/any");
        std::fs::create_dir_all(&pool_dir)?;
        std::fs::create_dir_all(&repo_dir)?;

        let input = dir.path().join(PACKAGE);
        File::create(&input)?;

        let repo_file = RepoFile::new(
            RepoFileKind::Package,
            pool_dir.join(PACKAGE),
            repo_dir.join(PACKAGE),
        )?;

        repo_file.copy_from(&input)?;
        assert!(repo_file.file_path().exists());

        repo_file.link(true)?;
        let target = std::fs::read_link(repo_file.symlink_path())?;
        assert_eq!(target, PathBuf::from(format!("../../../pool/test/{PACKAGE}")));
        assert!(repo_file.symlink_path().exists());

        // linking again fails, the symlink exists
        assert!(repo_file.link(true).is_err());

        repo_file.remove(false, true)?;
        assert!(!repo_file.file_path().exists());
        assert!(repo_file.symlink_path().symlink_metadata().is_err());
        Ok(())
    }

    #[rstest]
    fn repo_file_copy_missing_input() -> TestResult {
        let dir = TempDir::new()?;
        let pool_dir = dir.path().join("pool");
        let repo_dir = dir.path().join("repo");
        std::fs::create_dir_all(&pool_dir)?;
        std::fs::create_dir_all(&repo_dir)?;

        let repo_file = RepoFile::new(
            RepoFileKind::Package,
            pool_dir.join(PACKAGE),
            repo_dir.join(PACKAGE),
        )?;
        assert!(matches!(
            repo_file.copy_from(&dir.path().join(PACKAGE)),
            Err(Error::FileNotFound(_))
        ));
        Ok(())
    }
}
