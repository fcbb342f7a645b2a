//! Helpers shared by the end-to-end tests.
#![allow(dead_code)]

use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};

use flate2::{write::GzEncoder, Compression};
use testresult::TestResult;

/// Creates the base directories of a repository below `base`.
pub fn create_repo_dirs(base: &Path) -> TestResult {
    for dir in ["repo", "source", "management", "pool/package", "pool/source"] {
        std::fs::create_dir_all(base.join(dir))?;
    }
    Ok(())
}

/// Writes a configuration file for a repository below `base`.
///
/// The configuration describes a single repository named `test` with all
/// four flavors, using gzip compressed sync databases.
pub fn write_config(base: &Path) -> TestResult<PathBuf> {
    create_repo_dirs(base)?;
    let config_path = base.join("repod.conf");
    let mut config = File::create(&config_path)?;
    write!(
        config,
        r#"architecture = "any"
package_repo_base = "{base}/repo"
source_repo_base = "{base}/source"
package_pool = "{base}/pool/package"
source_pool = "{base}/pool/source"

[management_repo]
directory = "{base}/management"

[[repositories]]
name = "test"
debug = "test-debug"
staging = "test-staging"
testing = "test-testing"
"#,
        base = base.display(),
    )?;
    Ok(config_path)
}

/// Writes a package file (and a dummy signature) for `name` at `version`.
pub fn build_package(
    directory: &Path,
    name: &str,
    base: &str,
    version: &str,
    package_type: &str,
) -> TestResult<PathBuf> {
    let file_name = format!("{name}-{version}-any.pkg.tar.zst");
    let package_path = directory.join(&file_name);

    let build_info = format!(
        "format = 2\n\
        pkgname = {name}\n\
        pkgbase = {base}\n\
        pkgver = {version}\n\
        pkgarch = any\n\
        pkgbuild_sha256sum = b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c\n\
        packager = Foobar McFooface <foobar@mcfooface.org>\n\
        builddate = 1\n\
        builddir = /build\n\
        startdir = /startdir\n\
        buildtool = devtools\n\
        buildtoolver = 1:1.2.1-1-any\n"
    );
    let package_info = format!(
        "pkgname = {name}\n\
        pkgbase = {base}\n\
        pkgver = {version}\n\
        pkgdesc = An example package\n\
        url = https://example.org/\n\
        builddate = 1\n\
        packager = Foobar McFooface <foobar@mcfooface.org>\n\
        size = 42\n\
        arch = any\n\
        license = GPL-3.0-or-later\n\
        pkgtype = {package_type}\n"
    );
    let mtree = "#mtree\n\
        /set uid=0 gid=0 mode=644 type=file\n\
        ./usr time=1.0 mode=755 type=dir\n\
        ./usr/bin time=1.0 mode=755 type=dir\n\
        ./usr/bin/foo time=1.0 size=42 md5digest=d3b07384d113edec49eaa6238ad5ff00 sha256digest=b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c\n";

    let mut mtree_gz = Vec::new();
    {
        let mut encoder = GzEncoder::new(&mut mtree_gz, Compression::default());
        encoder.write_all(mtree.as_bytes())?;
        encoder.finish()?;
    }

    let file = File::create(&package_path)?;
    let encoder = zstd::Encoder::new(file, 0)?.auto_finish();
    let mut builder = tar::Builder::new(encoder);
    for (member, data) in [
        (".BUILDINFO", build_info.as_bytes()),
        (".PKGINFO", package_info.as_bytes()),
        (".MTREE", mtree_gz.as_slice()),
        ("usr/bin/foo", b"payload".as_slice()),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, member, data)?;
    }
    builder.into_inner()?;

    let mut signature = File::create(directory.join(format!("{file_name}.sig")))?;
    signature.write_all(b"dummy signature")?;

    Ok(package_path)
}

/// Lists the file names in `directory`, sorted.
pub fn dir_entries(directory: &Path) -> TestResult<Vec<String>> {
    let mut entries: Vec<String> = std::fs::read_dir(directory)?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    entries.sort();
    Ok(entries)
}
