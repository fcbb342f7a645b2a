//! The PKGINFO version 2 file format.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use repod_types::{Architecture, BuildDate, InstalledSize, Name, PackageType, Packager, Version};
use serde_with::{serde_as, DisplayFromStr};
use url::Url;

use super::v1::{generate_package_info, tool_versions_from_comments};
use crate::Error;

generate_package_info! {
    /// PKGINFO version 2.
    ///
    /// `PackageInfoV2` tracks the same fields as [`crate::PackageInfoV1`]
    /// and additionally the type of the package.
    ///
    /// ## Examples
    /// ```
    /// use std::str::FromStr;
    ///
    /// use repod_pkginfo::PackageInfoV2;
    /// use repod_types::PackageType;
    ///
    /// # fn main() -> Result<(), repod_pkginfo::Error> {
    /// let data = r#"pkgname = foo-debug
    /// pkgbase = foo
    /// pkgver = 1:1.0.0-1
    /// pkgdesc = Debug symbols for foo
    /// url = https://example.org/
    /// builddate = 1
    /// packager = Foobar McFooface <foobar@mcfooface.org>
    /// size = 181849963
    /// arch = any
    /// license = GPL-3.0-or-later
    /// pkgtype = debug
    /// "#;
    ///
    /// let package_info = PackageInfoV2::from_str(data)?;
    /// assert_eq!(package_info.package_type(), PackageType::Debug);
    /// assert_eq!(package_info.to_string(), data);
    /// # Ok(())
    /// # }
    /// ```
    PackageInfoV2 {
        #[serde_as(as = "DisplayFromStr")]
        pkgtype: PackageType,
    }
}

impl PackageInfoV2 {
    /// Returns the type of the package.
    pub fn package_type(&self) -> PackageType {
        self.pkgtype
    }
}

impl FromStr for PackageInfoV2 {
    type Err = Error;

    /// Creates a [`PackageInfoV2`] from a string slice.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fields in `input` can not be
    /// validated, or if the `pkgtype` keyword is missing.
    fn from_str(input: &str) -> Result<PackageInfoV2, Self::Err> {
        let mut package_info: PackageInfoV2 = repod_parsers::key_value::from_str(input)?;
        let (makepkg_version, fakeroot_version) = tool_versions_from_comments(input);
        package_info.makepkg_version = makepkg_version;
        package_info.fakeroot_version = fakeroot_version;
        Ok(package_info)
    }
}

impl Display for PackageInfoV2 {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        self.fmt_common(fmt)?;
        writeln!(fmt, "pkgtype = {}", self.pkgtype)
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use testresult::TestResult;

    use super::*;

    #[fixture]
    fn valid_package_info_v2() -> String {
        r#"pkgname = foo
pkgbase = foo
pkgver = 1:1.0.0-1
pkgdesc = An example package
url = https://example.org/
builddate = 1
packager = Foobar McFooface <foobar@mcfooface.org>
size = 181849963
arch = any
license = GPL-3.0-or-later
pkgtype = pkg
"#
        .to_string()
    }

    #[rstest]
    fn package_info_v2_round_trip(valid_package_info_v2: String) -> TestResult {
        let package_info = PackageInfoV2::from_str(&valid_package_info_v2)?;
        assert_eq!(package_info.to_string(), valid_package_info_v2);
        Ok(())
    }

    #[rstest]
    fn package_info_v2_missing_pkgtype() {
        assert!(PackageInfoV2::from_str("pkgname = foo").is_err());
    }
}
