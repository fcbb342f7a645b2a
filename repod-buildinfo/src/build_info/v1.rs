//! The BUILDINFO version 1 file format.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use repod_common::FileFormatSchema;
use repod_types::{
    digests::Sha256, Architecture, BuildDate, BuildDirectory, BuildEnvironmentOption, Checksum,
    InstalledPackage, Name, PackageOption, Packager, Version,
};
use serde_with::{serde_as, DisplayFromStr};

use crate::{BuildInfoSchema, Error};

/// Generates a struct holding the fields shared by all BUILDINFO versions,
/// with additional per-version fields.
macro_rules! generate_build_info {
    ($(#[$meta:meta])* $name:ident { $($extra_fields:tt)* }) => {
        $(#[$meta])*
        #[serde_as]
        #[derive(Clone, Debug, serde::Deserialize, PartialEq, serde::Serialize)]
        #[serde(deny_unknown_fields)]
        pub struct $name {
            #[serde_as(as = "DisplayFromStr")]
            format: BuildInfoSchema,

            #[serde_as(as = "DisplayFromStr")]
            pkgname: Name,

            #[serde_as(as = "DisplayFromStr")]
            pkgbase: Name,

            #[serde_as(as = "DisplayFromStr")]
            pkgver: Version,

            #[serde_as(as = "DisplayFromStr")]
            pkgarch: Architecture,

            #[serde_as(as = "DisplayFromStr")]
            pkgbuild_sha256sum: Checksum<Sha256>,

            #[serde_as(as = "DisplayFromStr")]
            packager: Packager,

            #[serde_as(as = "DisplayFromStr")]
            builddate: BuildDate,

            #[serde_as(as = "DisplayFromStr")]
            builddir: BuildDirectory,

            #[serde_as(as = "Vec<DisplayFromStr>")]
            #[serde(default)]
            buildenv: Vec<BuildEnvironmentOption>,

            #[serde_as(as = "Vec<DisplayFromStr>")]
            #[serde(default)]
            options: Vec<PackageOption>,

            #[serde_as(as = "Vec<DisplayFromStr>")]
            #[serde(default)]
            installed: Vec<InstalledPackage>,

            $($extra_fields)*
        }

        impl $name {
            /// Returns the format of the BUILDINFO file.
            pub fn format(&self) -> &BuildInfoSchema {
                &self.format
            }

            /// Returns the package name.
            pub fn pkgname(&self) -> &Name {
                &self.pkgname
            }

            /// Returns the package base.
            pub fn pkgbase(&self) -> &Name {
                &self.pkgbase
            }

            /// Returns the package version.
            pub fn pkgver(&self) -> &Version {
                &self.pkgver
            }

            /// Returns the package architecture.
            pub fn pkgarch(&self) -> Architecture {
                self.pkgarch
            }

            /// Returns the SHA-256 checksum of the PKGBUILD the package was
            /// built from.
            pub fn pkgbuild_sha256sum(&self) -> &Checksum<Sha256> {
                &self.pkgbuild_sha256sum
            }

            /// Returns the packager.
            pub fn packager(&self) -> &Packager {
                &self.packager
            }

            /// Returns the build date.
            pub fn builddate(&self) -> BuildDate {
                self.builddate
            }

            /// Returns the build directory.
            pub fn builddir(&self) -> &BuildDirectory {
                &self.builddir
            }

            /// Returns the build environment options.
            pub fn buildenv(&self) -> &[BuildEnvironmentOption] {
                &self.buildenv
            }

            /// Returns the package options.
            pub fn options(&self) -> &[PackageOption] {
                &self.options
            }

            /// Returns the packages installed during the build.
            pub fn installed(&self) -> &[InstalledPackage] {
                &self.installed
            }
        }
    }
}

pub(crate) use generate_build_info;

generate_build_info! {
    /// BUILDINFO version 1.
    ///
    /// `BuildInfoV1` is (exclusively) compatible with data following the
    /// first revision of the BUILDINFO format.
    ///
    /// ## Examples
    /// ```
    /// use std::str::FromStr;
    ///
    /// use repod_buildinfo::BuildInfoV1;
    ///
    /// # fn main() -> Result<(), repod_buildinfo::Error> {
    /// let data = r#"format = 1
    /// pkgname = foo
    /// pkgbase = foo
    /// pkgver = 1:1.0.0-1
    /// pkgarch = any
    /// pkgbuild_sha256sum = b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c
    /// packager = Foobar McFooface <foobar@mcfooface.org>
    /// builddate = 1
    /// builddir = /build
    /// buildenv = ccache
    /// options = lto
    /// installed = bar-1.2.3-1-any
    /// "#;
    ///
    /// let build_info = BuildInfoV1::from_str(data)?;
    /// assert_eq!(build_info.to_string(), data);
    /// # Ok(())
    /// # }
    /// ```
    BuildInfoV1 {}
}

impl FromStr for BuildInfoV1 {
    type Err = Error;

    /// Creates a [`BuildInfoV1`] from a string slice.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fields in `input` can not be
    /// validated, or if the `format` keyword does not denote version 1.
    fn from_str(input: &str) -> Result<BuildInfoV1, Self::Err> {
        let build_info: BuildInfoV1 = repod_parsers::key_value::from_str(input)?;
        if build_info.format().inner().inner().major != 1 {
            return Err(Error::WrongSchemaVersion(
                build_info.format().inner().clone(),
            ));
        }
        Ok(build_info)
    }
}

impl Display for BuildInfoV1 {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(
            fmt,
            "format = {}\n\
            pkgname = {}\n\
            pkgbase = {}\n\
            pkgver = {}\n\
            pkgarch = {}\n\
            pkgbuild_sha256sum = {}\n\
            packager = {}\n\
            builddate = {}\n\
            builddir = {}\n",
            self.format(),
            self.pkgname(),
            self.pkgbase(),
            self.pkgver(),
            self.pkgarch(),
            self.pkgbuild_sha256sum(),
            self.packager(),
            self.builddate(),
            self.builddir(),
        )?;
        for buildenv in self.buildenv() {
            writeln!(fmt, "buildenv = {buildenv}")?;
        }
        for option in self.options() {
            writeln!(fmt, "options = {option}")?;
        }
        for installed in self.installed() {
            writeln!(fmt, "installed = {installed}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use testresult::TestResult;

    use super::*;

    #[fixture]
    fn valid_build_info_v1() -> String {
        r#"builddate = 1
builddir = /build
buildenv = ccache
buildenv = color
format = 1
installed = bar-1.2.3-1-any
installed = beh-2.2.3-4-any
options = lto
options = !strip
packager = Foobar McFooface <foobar@mcfooface.org>
pkgarch = any
pkgbase = foo
pkgbuild_sha256sum = b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c
pkgname = foo
pkgver = 1:1.0.0-1
"#
        .to_string()
    }

    #[rstest]
    fn build_info_v1_from_str(valid_build_info_v1: String) -> TestResult {
        let build_info = BuildInfoV1::from_str(&valid_build_info_v1)?;
        assert_eq!(build_info.format().inner().inner().major, 1);
        assert_eq!(build_info.buildenv().len(), 2);
        assert_eq!(build_info.installed().len(), 2);
        Ok(())
    }

    #[rstest]
    fn build_info_v1_wrong_format() {
        assert!(BuildInfoV1::from_str("format = 2\npkgname = foo").is_err());
    }

    #[rstest]
    #[case("builddate = 2")]
    #[case("builddir = /build2")]
    #[case("format = 1")]
    #[case("packager = Foobar McFooface <foobar@mcfooface.org>")]
    #[case("pkgarch = any")]
    #[case("pkgbase = foo")]
    #[case("pkgname = foo")]
    #[case("pkgver = 1:1.0.0-1")]
    fn build_info_v1_duplicate_field(
        mut valid_build_info_v1: String,
        #[case] duplicate: &str,
    ) {
        valid_build_info_v1.push_str(duplicate);
        assert!(BuildInfoV1::from_str(&valid_build_info_v1).is_err());
    }

    #[rstest]
    fn build_info_v1_unknown_key(mut valid_build_info_v1: String) {
        valid_build_info_v1.push_str("startdir = /startdir\n");
        assert!(BuildInfoV1::from_str(&valid_build_info_v1).is_err());
    }
}
