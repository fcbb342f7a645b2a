//! The PKGINFO version 1 file format.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use repod_types::{Architecture, BuildDate, InstalledSize, Name, Packager, Version};
use serde_with::{serde_as, DisplayFromStr};
use url::Url;

use crate::Error;

/// Extracts the makepkg and fakeroot versions from the comment lines of
/// PKGINFO data.
///
/// The comments are of the form `# Generated by makepkg <version>` and
/// `# using fakeroot version <version>`.
pub(crate) fn tool_versions_from_comments(input: &str) -> (Option<String>, Option<String>) {
    let mut makepkg_version = None;
    let mut fakeroot_version = None;
    for line in input.lines() {
        let Some(comment) = line.trim().strip_prefix('#') else {
            continue;
        };
        let comment = comment.trim();
        if let Some(version) = comment.strip_prefix("Generated by makepkg ") {
            makepkg_version = Some(version.trim().to_string());
        } else if let Some(version) = comment.strip_prefix("using fakeroot version ") {
            fakeroot_version = Some(version.trim().to_string());
        }
    }
    (makepkg_version, fakeroot_version)
}

/// Generates a struct holding the fields shared by all PKGINFO versions,
/// with additional per-version fields.
macro_rules! generate_package_info {
    ($(#[$meta:meta])* $name:ident { $($extra_fields:tt)* }) => {
        $(#[$meta])*
        #[serde_as]
        #[derive(Clone, Debug, serde::Deserialize, PartialEq, serde::Serialize)]
        #[serde(deny_unknown_fields)]
        pub struct $name {
            #[serde_as(as = "DisplayFromStr")]
            pkgname: Name,

            #[serde_as(as = "DisplayFromStr")]
            pkgbase: Name,

            #[serde_as(as = "DisplayFromStr")]
            pkgver: Version,

            pkgdesc: String,

            #[serde_as(as = "DisplayFromStr")]
            url: Url,

            #[serde_as(as = "DisplayFromStr")]
            builddate: BuildDate,

            #[serde_as(as = "DisplayFromStr")]
            packager: Packager,

            #[serde_as(as = "DisplayFromStr")]
            size: InstalledSize,

            #[serde_as(as = "DisplayFromStr")]
            arch: Architecture,

            #[serde(default)]
            license: Vec<String>,

            #[serde(default)]
            replaces: Vec<String>,

            #[serde(default)]
            group: Vec<String>,

            #[serde(default)]
            conflict: Vec<String>,

            #[serde(default)]
            provides: Vec<String>,

            #[serde(default)]
            backup: Vec<String>,

            #[serde(default)]
            depend: Vec<String>,

            #[serde(default)]
            optdepend: Vec<String>,

            #[serde(default)]
            makedepend: Vec<String>,

            #[serde(default)]
            checkdepend: Vec<String>,

            #[serde(skip)]
            makepkg_version: Option<String>,

            #[serde(skip)]
            fakeroot_version: Option<String>,

            $($extra_fields)*
        }

        impl $name {
            /// Returns the package name.
            pub fn name(&self) -> &Name {
                &self.pkgname
            }

            /// Returns the pkgbase.
            pub fn base(&self) -> &Name {
                &self.pkgbase
            }

            /// Returns the package version.
            pub fn version(&self) -> &Version {
                &self.pkgver
            }

            /// Returns the package description.
            pub fn description(&self) -> &str {
                &self.pkgdesc
            }

            /// Returns the upstream URL of the package.
            pub fn url(&self) -> &Url {
                &self.url
            }

            /// Returns the build date.
            pub fn builddate(&self) -> BuildDate {
                self.builddate
            }

            /// Returns the packager.
            pub fn packager(&self) -> &Packager {
                &self.packager
            }

            /// Returns the installed size.
            pub fn installed_size(&self) -> InstalledSize {
                self.size
            }

            /// Returns the package architecture.
            pub fn architecture(&self) -> Architecture {
                self.arch
            }

            /// Returns the licenses of the package.
            pub fn licenses(&self) -> &[String] {
                &self.license
            }

            /// Returns the packages this package replaces.
            pub fn replaces(&self) -> &[String] {
                &self.replaces
            }

            /// Returns the groups this package belongs to.
            pub fn groups(&self) -> &[String] {
                &self.group
            }

            /// Returns the packages this package conflicts with.
            pub fn conflicts(&self) -> &[String] {
                &self.conflict
            }

            /// Returns the components this package provides.
            pub fn provides(&self) -> &[String] {
                &self.provides
            }

            /// Returns the files pacman creates backups for.
            pub fn backup(&self) -> &[String] {
                &self.backup
            }

            /// Returns the run-time dependencies.
            pub fn depends(&self) -> &[String] {
                &self.depend
            }

            /// Returns the optional dependencies.
            pub fn optdepends(&self) -> &[String] {
                &self.optdepend
            }

            /// Returns the build-time dependencies.
            pub fn makedepends(&self) -> &[String] {
                &self.makedepend
            }

            /// Returns the check-time dependencies.
            pub fn checkdepends(&self) -> &[String] {
                &self.checkdepend
            }

            /// Returns the version of makepkg the file was generated with,
            /// if tracked in a comment.
            pub fn makepkg_version(&self) -> Option<&str> {
                self.makepkg_version.as_deref()
            }

            /// Returns the version of fakeroot the package was built with,
            /// if tracked in a comment.
            pub fn fakeroot_version(&self) -> Option<&str> {
                self.fakeroot_version.as_deref()
            }

            /// Writes the comment header and common fields in file order.
            fn fmt_common(&self, fmt: &mut Formatter) -> std::fmt::Result {
                if let Some(makepkg_version) = &self.makepkg_version {
                    writeln!(fmt, "# Generated by makepkg {makepkg_version}")?;
                }
                if let Some(fakeroot_version) = &self.fakeroot_version {
                    writeln!(fmt, "# using fakeroot version {fakeroot_version}")?;
                }
                write!(
                    fmt,
                    "pkgname = {}\n\
                    pkgbase = {}\n\
                    pkgver = {}\n\
                    pkgdesc = {}\n\
                    url = {}\n\
                    builddate = {}\n\
                    packager = {}\n\
                    size = {}\n\
                    arch = {}\n",
                    self.pkgname,
                    self.pkgbase,
                    self.pkgver,
                    self.pkgdesc,
                    self.url,
                    self.builddate,
                    self.packager,
                    self.size,
                    self.arch,
                )?;
                for (keyword, values) in [
                    ("license", &self.license),
                    ("replaces", &self.replaces),
                    ("group", &self.group),
                    ("conflict", &self.conflict),
                    ("provides", &self.provides),
                    ("backup", &self.backup),
                    ("depend", &self.depend),
                    ("optdepend", &self.optdepend),
                    ("makedepend", &self.makedepend),
                    ("checkdepend", &self.checkdepend),
                ] {
                    for value in values {
                        writeln!(fmt, "{keyword} = {value}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

pub(crate) use generate_package_info;

generate_package_info! {
    /// PKGINFO version 1.
    ///
    /// `PackageInfoV1` is (exclusively) compatible with data following the
    /// first revision of the PKGINFO format, which does not carry a
    /// `pkgtype` keyword.
    ///
    /// ## Examples
    /// ```
    /// use std::str::FromStr;
    ///
    /// use repod_pkginfo::PackageInfoV1;
    ///
    /// # fn main() -> Result<(), repod_pkginfo::Error> {
    /// let data = r#"pkgname = foo
    /// pkgbase = foo
    /// pkgver = 1:1.0.0-1
    /// pkgdesc = An example package
    /// url = https://example.org/
    /// builddate = 1
    /// packager = Foobar McFooface <foobar@mcfooface.org>
    /// size = 181849963
    /// arch = any
    /// license = GPL-3.0-or-later
    /// "#;
    ///
    /// let package_info = PackageInfoV1::from_str(data)?;
    /// assert_eq!(package_info.to_string(), data);
    /// # Ok(())
    /// # }
    /// ```
    PackageInfoV1 {}
}

impl FromStr for PackageInfoV1 {
    type Err = Error;

    /// Creates a [`PackageInfoV1`] from a string slice.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fields in `input` can not be
    /// validated, or if `input` carries a `pkgtype` keyword.
    fn from_str(input: &str) -> Result<PackageInfoV1, Self::Err> {
        let mut package_info: PackageInfoV1 = repod_parsers::key_value::from_str(input)?;
        let (makepkg_version, fakeroot_version) = tool_versions_from_comments(input);
        package_info.makepkg_version = makepkg_version;
        package_info.fakeroot_version = fakeroot_version;
        Ok(package_info)
    }
}

impl Display for PackageInfoV1 {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        self.fmt_common(fmt)
    }
}
