//! Build metadata lifted into the management record.

use repod_buildinfo::{BuildInfo, BuildInfoV1, BuildInfoV2};
use repod_types::{digests::Sha256, Checksum};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

/// The build metadata of a pkgbase, version 1.
///
/// Mirrors the fields of a BUILDINFO version 1 file, minus the per-package
/// identity fields (which are tracked on the surrounding record).
#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct OutputBuildInfoV1 {
    /// The build date in seconds since the epoch.
    pub builddate: i64,

    /// The directory the package was built in.
    pub builddir: String,

    /// The build environment options.
    pub buildenv: Vec<String>,

    /// The packages installed during the build.
    pub installed: Vec<String>,

    /// The package options.
    pub options: Vec<String>,

    /// The SHA-256 checksum of the PKGBUILD the package was built from.
    #[serde_as(as = "DisplayFromStr")]
    pub pkgbuild_sha256sum: Checksum<Sha256>,

    /// The schema version of the object.
    pub schema_version: u64,
}

/// The build metadata of a pkgbase, version 2.
///
/// Additionally tracks the start directory, the build tool and the build
/// tool version.
#[serde_as]
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct OutputBuildInfoV2 {
    /// The build date in seconds since the epoch.
    pub builddate: i64,

    /// The directory the package was built in.
    pub builddir: String,

    /// The build environment options.
    pub buildenv: Vec<String>,

    /// The build tool used to build the package.
    pub buildtool: String,

    /// The version of the build tool.
    pub buildtoolver: String,

    /// The packages installed during the build.
    pub installed: Vec<String>,

    /// The package options.
    pub options: Vec<String>,

    /// The SHA-256 checksum of the PKGBUILD the package was built from.
    #[serde_as(as = "DisplayFromStr")]
    pub pkgbuild_sha256sum: Checksum<Sha256>,

    /// The schema version of the object.
    pub schema_version: u64,

    /// The directory the package build was started from.
    pub startdir: String,
}

/// The build metadata of a pkgbase.
///
/// Tracks all versions of the lifted BUILDINFO metadata. The version is
/// distinguished by the presence of the build tool fields.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputBuildInfo {
    /// Build metadata derived from a BUILDINFO version 2 file.
    V2(OutputBuildInfoV2),
    /// Build metadata derived from a BUILDINFO version 1 file.
    V1(OutputBuildInfoV1),
}

impl From<&BuildInfoV1> for OutputBuildInfo {
    fn from(build_info: &BuildInfoV1) -> Self {
        OutputBuildInfo::V1(OutputBuildInfoV1 {
            builddate: build_info.builddate().inner(),
            builddir: build_info.builddir().to_string(),
            buildenv: build_info
                .buildenv()
                .iter()
                .map(ToString::to_string)
                .collect(),
            installed: build_info
                .installed()
                .iter()
                .map(ToString::to_string)
                .collect(),
            options: build_info
                .options()
                .iter()
                .map(ToString::to_string)
                .collect(),
            pkgbuild_sha256sum: build_info.pkgbuild_sha256sum().clone(),
            schema_version: 1,
        })
    }
}

impl From<&BuildInfoV2> for OutputBuildInfo {
    fn from(build_info: &BuildInfoV2) -> Self {
        OutputBuildInfo::V2(OutputBuildInfoV2 {
            builddate: build_info.builddate().inner(),
            builddir: build_info.builddir().to_string(),
            buildenv: build_info
                .buildenv()
                .iter()
                .map(ToString::to_string)
                .collect(),
            buildtool: build_info.buildtool().to_string(),
            buildtoolver: build_info.buildtoolver().to_string(),
            installed: build_info
                .installed()
                .iter()
                .map(ToString::to_string)
                .collect(),
            options: build_info
                .options()
                .iter()
                .map(ToString::to_string)
                .collect(),
            pkgbuild_sha256sum: build_info.pkgbuild_sha256sum().clone(),
            schema_version: 2,
            startdir: build_info.startdir().to_string(),
        })
    }
}

impl From<&BuildInfo> for OutputBuildInfo {
    fn from(build_info: &BuildInfo) -> Self {
        match build_info {
            BuildInfo::V1(build_info) => build_info.into(),
            BuildInfo::V2(build_info) => build_info.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    #[rstest]
    fn output_build_info_from_build_info_v2() -> TestResult {
        let data = r#"format = 2
pkgname = foo
pkgbase = foo
pkgver = 1:1.0.0-1
pkgarch = any
pkgbuild_sha256sum = b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c
packager = Foobar McFooface <foobar@mcfooface.org>
builddate = 1
builddir = /build
startdir = /startdir
buildtool = devtools
buildtoolver = 1:1.2.1-1-any
buildenv = ccache
options = lto
installed = bar-1.2.3-1-any
"#;
        let build_info = BuildInfo::from_str(data)?;
        let output: OutputBuildInfo = (&build_info).into();
        let OutputBuildInfo::V2(output) = output else {
            panic!("expected version 2 output build info");
        };
        assert_eq!(output.buildtool, "devtools");
        assert_eq!(output.schema_version, 2);
        Ok(())
    }

    #[rstest]
    fn output_build_info_json_round_trip() -> TestResult {
        let output = OutputBuildInfo::V1(OutputBuildInfoV1 {
            builddate: 1,
            builddir: "/build".to_string(),
            buildenv: vec!["ccache".to_string()],
            installed: vec!["bar-1.2.3-1-any".to_string()],
            options: vec!["lto".to_string()],
            pkgbuild_sha256sum: Checksum::calculate_from("foo"),
            schema_version: 1,
        });
        let json = serde_json::to_string(&output)?;
        let parsed: OutputBuildInfo = serde_json::from_str(&json)?;
        assert_eq!(parsed, output);
        Ok(())
    }
}
