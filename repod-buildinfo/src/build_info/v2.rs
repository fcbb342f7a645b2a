//! The BUILDINFO version 2 file format.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use repod_common::FileFormatSchema;
use repod_types::{
    digests::Sha256, Architecture, BuildDate, BuildDirectory, BuildEnvironmentOption, BuildTool,
    BuildToolVersion, Checksum, InstalledPackage, Name, PackageOption, Packager, StartDirectory,
    Version,
};
use serde_with::{serde_as, DisplayFromStr};

use super::v1::generate_build_info;
use crate::{BuildInfoSchema, Error};

/// The build tool that requires a fully qualified build tool version.
const DEVTOOLS: &str = "devtools";

generate_build_info! {
    /// BUILDINFO version 2.
    ///
    /// `BuildInfoV2` tracks the same fields as [`crate::BuildInfoV1`] and
    /// additionally the start directory, the build tool and the build tool
    /// version.
    ///
    /// ## Examples
    /// ```
    /// use std::str::FromStr;
    ///
    /// use repod_buildinfo::BuildInfoV2;
    ///
    /// # fn main() -> Result<(), repod_buildinfo::Error> {
    /// let data = r#"format = 2
    /// pkgname = foo
    /// pkgbase = foo
    /// pkgver = 1:1.0.0-1
    /// pkgarch = any
    /// pkgbuild_sha256sum = b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c
    /// packager = Foobar McFooface <foobar@mcfooface.org>
    /// builddate = 1
    /// builddir = /build
    /// startdir = /startdir
    /// buildtool = devtools
    /// buildtoolver = 1:1.2.1-1-any
    /// buildenv = ccache
    /// options = lto
    /// installed = bar-1.2.3-1-any
    /// "#;
    ///
    /// let build_info = BuildInfoV2::from_str(data)?;
    /// assert_eq!(build_info.to_string(), data);
    /// # Ok(())
    /// # }
    /// ```
    BuildInfoV2 {
        #[serde_as(as = "DisplayFromStr")]
        startdir: StartDirectory,

        #[serde_as(as = "DisplayFromStr")]
        buildtool: BuildTool,

        #[serde_as(as = "DisplayFromStr")]
        buildtoolver: BuildToolVersion,
    }
}

impl BuildInfoV2 {
    /// Returns the start directory.
    pub fn startdir(&self) -> &StartDirectory {
        &self.startdir
    }

    /// Returns the build tool.
    pub fn buildtool(&self) -> &BuildTool {
        &self.buildtool
    }

    /// Returns the build tool version.
    pub fn buildtoolver(&self) -> &BuildToolVersion {
        &self.buildtoolver
    }
}

impl FromStr for BuildInfoV2 {
    type Err = Error;

    /// Creates a [`BuildInfoV2`] from a string slice.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fields in `input` can not be
    /// validated, if the `format` keyword does not denote version 2, or if
    /// the build tool is `devtools` but the build tool version is not fully
    /// qualified (a full version followed by an architecture).
    fn from_str(input: &str) -> Result<BuildInfoV2, Self::Err> {
        let build_info: BuildInfoV2 = repod_parsers::key_value::from_str(input)?;
        if build_info.format().inner().inner().major != 2 {
            return Err(Error::WrongSchemaVersion(
                build_info.format().inner().clone(),
            ));
        }
        if build_info.buildtool().inner().inner() == DEVTOOLS
            && build_info.buildtoolver().architecture().is_none()
        {
            return Err(Error::WrongBuildToolVersion {
                buildtool: build_info.buildtool().to_string(),
                buildtoolver: build_info.buildtoolver().to_string(),
            });
        }
        Ok(build_info)
    }
}

impl Display for BuildInfoV2 {
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
            builddir = {}\n\
            startdir = {}\n\
            buildtool = {}\n\
            buildtoolver = {}\n",
            self.format(),
            self.pkgname(),
            self.pkgbase(),
            self.pkgver(),
            self.pkgarch(),
            self.pkgbuild_sha256sum(),
            self.packager(),
            self.builddate(),
            self.builddir(),
            self.startdir(),
            self.buildtool(),
            self.buildtoolver(),
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
    fn valid_build_info_v2() -> String {
        r#"builddate = 1
builddir = /build
startdir = /startdir
buildtool = devtools
buildtoolver = 1:1.2.1-1-any
buildenv = ccache
format = 2
installed = bar-1.2.3-1-any
options = lto
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
    fn build_info_v2_from_str(valid_build_info_v2: String) -> TestResult {
        let build_info = BuildInfoV2::from_str(&valid_build_info_v2)?;
        assert_eq!(build_info.buildtool().to_string(), "devtools");
        assert!(build_info.buildtoolver().architecture().is_some());
        Ok(())
    }

    #[rstest]
    fn build_info_v2_wrong_format(valid_build_info_v2: String) {
        assert!(BuildInfoV2::from_str(&valid_build_info_v2.replace("format = 2", "format = 1"))
            .is_err());
    }

    #[rstest]
    fn build_info_v2_devtools_requires_full_buildtoolver(valid_build_info_v2: String) {
        assert!(BuildInfoV2::from_str(
            &valid_build_info_v2.replace("buildtoolver = 1:1.2.1-1-any", "buildtoolver = 20210216")
        )
        .is_err());
    }
}
