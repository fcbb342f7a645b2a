//! Reading and writing of sync database archives.

use std::{
    collections::BTreeMap,
    fs::File,
    io::{Read, Write},
    path::Path,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use bzip2::write::BzEncoder;
use flate2::write::GzEncoder;
use liblzma::write::XzEncoder;
use log::debug;
use repod_package::CompressionDecoder;
use repod_types::CompressionType;
use tar::{Archive, Builder, EntryType, Header};

use crate::{
    desc::RepoDesc,
    files::FilesV1,
    Error,
};

/// The user and group name used for database members.
const DB_OWNER: &str = "root";

/// The file mode of database file members.
const DB_FILE_MODE: u32 = 0o644;

/// The file mode of database directory members.
const DB_DIR_MODE: u32 = 0o755;

/// The kind of a sync database.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DatabaseKind {
    /// A default sync database, holding only `desc` members.
    Default,
    /// A files sync database, holding `desc` and `files` members.
    Files,
}

impl DatabaseKind {
    /// Returns the file name of a database of this kind for `name`.
    ///
    /// The suffix of `compression` is appended to the base name (e.g.
    /// `test.db.tar.gz` or `test.files.tar.gz`).
    pub fn db_file_name(&self, name: &str, compression: CompressionType) -> String {
        let infix = match self {
            DatabaseKind::Default => "db",
            DatabaseKind::Files => "files",
        };
        format!("{name}.{infix}.tar{}", compression.tar_suffix())
    }
}

/// A compressing writer supporting multiple backends.
enum CompressionEncoder<'a> {
    /// The bzip2 encoder.
    Bzip2(BzEncoder<File>),
    /// The gzip encoder.
    Gzip(GzEncoder<File>),
    /// The xz encoder.
    Xz(XzEncoder<File>),
    /// The zstandard encoder.
    Zstd(zstd::Encoder<'a, File>),
    /// No compression.
    None(File),
}

impl CompressionEncoder<'_> {
    /// Creates a new [`CompressionEncoder`] writing to `file`.
    fn new(file: File, compression: CompressionType) -> Result<Self, Error> {
        match compression {
            CompressionType::Bzip2 => Ok(Self::Bzip2(BzEncoder::new(
                file,
                bzip2::Compression::default(),
            ))),
            CompressionType::Gzip => Ok(Self::Gzip(GzEncoder::new(
                file,
                flate2::Compression::default(),
            ))),
            CompressionType::Lzma => Ok(Self::Xz(XzEncoder::new(file, 6))),
            CompressionType::Zstandard => Ok(Self::Zstd(
                zstd::Encoder::new(file, 0).map_err(|source| Error::IoWrite {
                    context: "creating a zstandard encoder",
                    source,
                })?,
            )),
            CompressionType::None => Ok(Self::None(file)),
        }
    }

    /// Finishes the compression stream.
    fn finish(self) -> Result<(), Error> {
        let error = |source| Error::IoWrite {
            context: "finishing a compression stream",
            source,
        };
        match self {
            CompressionEncoder::Bzip2(encoder) => encoder.finish().map(|_| ()).map_err(error),
            CompressionEncoder::Gzip(encoder) => encoder.finish().map(|_| ()).map_err(error),
            CompressionEncoder::Xz(encoder) => encoder.finish().map(|_| ()).map_err(error),
            CompressionEncoder::Zstd(encoder) => encoder.finish().map(|_| ()).map_err(error),
            CompressionEncoder::None(_) => Ok(()),
        }
    }
}

impl Write for CompressionEncoder<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            CompressionEncoder::Bzip2(encoder) => encoder.write(buf),
            CompressionEncoder::Gzip(encoder) => encoder.write(buf),
            CompressionEncoder::Xz(encoder) => encoder.write(buf),
            CompressionEncoder::Zstd(encoder) => encoder.write(buf),
            CompressionEncoder::None(file) => file.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            CompressionEncoder::Bzip2(encoder) => encoder.flush(),
            CompressionEncoder::Gzip(encoder) => encoder.flush(),
            CompressionEncoder::Xz(encoder) => encoder.flush(),
            CompressionEncoder::Zstd(encoder) => encoder.flush(),
            CompressionEncoder::None(file) => file.flush(),
        }
    }
}

/// A single package entry read from a sync database.
#[derive(Clone, Debug)]
pub struct DatabaseEntry {
    /// The name of the package.
    pub name: String,
    /// The `desc` member of the package.
    pub desc: RepoDesc,
    /// The optional `files` member of the package.
    pub files: Option<FilesV1>,
}

/// A streaming writer for sync databases.
///
/// Members are streamed into a fresh tar archive. The tar entry metadata is
/// fixed: owner and group are `root`, files carry mode `0644`, directories
/// mode `0755`, and the modification time is the creation time of the
/// database.
pub struct DatabaseWriter<'a> {
    builder: Builder<CompressionEncoder<'a>>,
    kind: DatabaseKind,
    mtime: u64,
}

impl std::fmt::Debug for DatabaseWriter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseWriter")
            .field("builder", &"Builder<CompressionEncoder>")
            .field("kind", &self.kind)
            .field("mtime", &self.mtime)
            .finish()
    }
}

impl DatabaseWriter<'_> {
    /// Creates a new [`DatabaseWriter`] writing to the file at `path`.
    pub fn create(
        path: impl AsRef<Path>,
        compression: CompressionType,
        kind: DatabaseKind,
    ) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("Opening sync database {path:?} for writing...");
        let file = File::create(path).map_err(|source| Error::IoPath {
            path: path.to_path_buf(),
            context: "creating a sync database file",
            source,
        })?;
        let encoder = CompressionEncoder::new(file, compression)?;
        Ok(DatabaseWriter {
            builder: Builder::new(encoder),
            kind,
            mtime: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|duration| duration.as_secs())
                .unwrap_or(0),
        })
    }

    /// Returns a tar header with the fixed database member metadata.
    fn header(&self, entry_type: EntryType, size: u64) -> Header {
        let mut header = Header::new_gnu();
        header.set_entry_type(entry_type);
        header.set_size(size);
        header.set_mode(match entry_type {
            EntryType::Directory => DB_DIR_MODE,
            _ => DB_FILE_MODE,
        });
        header.set_uid(0);
        header.set_gid(0);
        let _ = header.set_username(DB_OWNER);
        let _ = header.set_groupname(DB_OWNER);
        header.set_mtime(self.mtime);
        header
    }

    /// Appends the members of a single package to the database.
    ///
    /// Writes the directory `{name}-{version}/`, its `desc` member and, for
    /// [`DatabaseKind::Files`] databases, its `files` member.
    ///
    /// # Errors
    ///
    /// Returns an error if writing any of the members fails, or if the
    /// database is a *files* database but `files` is [`None`].
    pub fn append(
        &mut self,
        name: &str,
        version: &str,
        desc: &RepoDesc,
        files: Option<&FilesV1>,
    ) -> Result<(), Error> {
        let dirname = format!("{name}-{version}");
        debug!("Streaming database members for {dirname}...");

        let write_error = |source| Error::IoWrite {
            context: "streaming a sync database member",
            source,
        };

        let mut header = self.header(EntryType::Directory, 0);
        self.builder
            .append_data(&mut header, format!("{dirname}/"), std::io::empty())
            .map_err(write_error)?;

        let desc_content = desc.to_string();
        let mut header = self.header(EntryType::Regular, desc_content.len() as u64);
        self.builder
            .append_data(
                &mut header,
                format!("{dirname}/desc"),
                desc_content.as_bytes(),
            )
            .map_err(write_error)?;

        if self.kind == DatabaseKind::Files {
            let files_content = files.cloned().unwrap_or_default().to_string();
            let mut header = self.header(EntryType::Regular, files_content.len() as u64);
            self.builder
                .append_data(
                    &mut header,
                    format!("{dirname}/files"),
                    files_content.as_bytes(),
                )
                .map_err(write_error)?;
        }

        Ok(())
    }

    /// Finishes the database, flushing the tar archive and the compression
    /// stream.
    pub fn finish(self) -> Result<(), Error> {
        self.builder
            .into_inner()
            .map_err(|source| Error::IoWrite {
                context: "finishing a sync database archive",
                source,
            })?
            .finish()
    }
}

/// Recovers a package name from a database directory name.
///
/// The directory name is of the form `{name}-{version}-{pkgrel}`, hence the
/// last two `-` delimited fields are stripped.
fn name_from_dirname(dirname: &str) -> Result<String, Error> {
    let error = || Error::InvalidMemberName(dirname.to_string());
    let (rest, _pkgrel) = dirname.rsplit_once('-').ok_or_else(error)?;
    let (name, _version) = rest.rsplit_once('-').ok_or_else(error)?;
    if name.is_empty() {
        return Err(error());
    }
    Ok(name.to_string())
}

/// Reads all package entries from the sync database at `path`.
///
/// Walks the archive member by member, matching `desc` and `files` members
/// by their path suffix and accumulating them per package name.
///
/// # Errors
///
/// Returns an error if the archive can not be read or any member can not be
/// parsed.
pub fn read_database(path: impl AsRef<Path>) -> Result<Vec<DatabaseEntry>, Error> {
    let path = path.as_ref();
    debug!("Reading sync database {path:?}...");

    let decoder = CompressionDecoder::open(path)?;
    let mut archive = Archive::new(decoder);

    let mut descs: BTreeMap<String, RepoDesc> = BTreeMap::new();
    let mut files: BTreeMap<String, FilesV1> = BTreeMap::new();

    let entries = archive.entries().map_err(|source| Error::IoPath {
        path: path.to_path_buf(),
        context: "reading a sync database archive",
        source,
    })?;

    for entry in entries {
        let mut entry = entry.map_err(|source| Error::IoPath {
            path: path.to_path_buf(),
            context: "reading a sync database entry",
            source,
        })?;

        let (dirname, member) = {
            let entry_path = entry.path().map_err(|source| Error::IoPath {
                path: path.to_path_buf(),
                context: "reading the path of a sync database entry",
                source,
            })?;
            let member = entry_path
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string);
            let dirname = entry_path
                .parent()
                .and_then(|parent| parent.file_name())
                .and_then(|name| name.to_str())
                .map(str::to_string);
            (dirname, member)
        };

        let (Some(dirname), Some(member)) = (dirname, member) else {
            continue;
        };
        if member != "desc" && member != "files" {
            continue;
        }

        let name = name_from_dirname(&dirname)?;

        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .map_err(|source| Error::IoPath {
                path: path.to_path_buf(),
                context: "reading a sync database member",
                source,
            })?;

        if member == "desc" {
            descs.insert(name, RepoDesc::from_str(&content)?);
        } else {
            files.insert(name, FilesV1::from_str(&content)?);
        }
    }

    Ok(descs
        .into_iter()
        .map(|(name, desc)| {
            let files = files.remove(&name);
            DatabaseEntry { name, desc, files }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;
    use testresult::TestResult;

    use super::*;

    fn desc(name: &str, version: &str) -> RepoDesc {
        let data = format!(
            "%FILENAME%\n{name}-{version}-any.pkg.tar.zst\n\n\
            %NAME%\n{name}\n\n\
            %BASE%\n{name}\n\n\
            %VERSION%\n{version}\n\n\
            %CSIZE%\n1\n\n\
            %ISIZE%\n1\n\n\
            %MD5SUM%\nd3b07384d113edec49eaa6238ad5ff00\n\n\
            %SHA256SUM%\nb5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c\n\n\
            %ARCH%\nany\n\n\
            %BUILDDATE%\n1\n\n\
            %PACKAGER%\nFoobar McFooface <foobar@mcfooface.org>\n\n"
        );
        RepoDesc::from_str(&data).unwrap()
    }

    #[rstest]
    #[case::default_db(DatabaseKind::Default, CompressionType::Gzip)]
    #[case::files_db(DatabaseKind::Files, CompressionType::Gzip)]
    #[case::zstd(DatabaseKind::Files, CompressionType::Zstandard)]
    #[case::none(DatabaseKind::Default, CompressionType::None)]
    fn database_round_trip(
        #[case] kind: DatabaseKind,
        #[case] compression: CompressionType,
    ) -> TestResult {
        let dir = TempDir::new()?;
        let db_path = dir.path().join(kind.db_file_name("test", compression));

        let mut writer = DatabaseWriter::create(&db_path, compression, kind)?;
        let files = FilesV1::new(vec!["usr/".to_string(), "usr/bin/foo".to_string()])?;
        writer.append("foo", "1:1.0.0-1", &desc("foo", "1:1.0.0-1"), Some(&files))?;
        writer.append("bar", "2.0.0-1", &desc("bar", "2.0.0-1"), None)?;
        writer.finish()?;

        let entries = read_database(&db_path)?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "bar");
        assert_eq!(entries[1].name, "foo");
        assert_eq!(
            entries[1].files.is_some(),
            matches!(kind, DatabaseKind::Files)
        );
        Ok(())
    }

    #[rstest]
    #[case("foo-1:1.0.0-1", "foo")]
    #[case("foo-bar-1.0.0-1", "foo-bar")]
    fn dirname_to_name(#[case] dirname: &str, #[case] name: &str) -> TestResult {
        assert_eq!(name_from_dirname(dirname)?, name);
        Ok(())
    }

    #[rstest]
    fn dirname_to_name_invalid() {
        assert!(name_from_dirname("foo").is_err());
    }

    #[rstest]
    fn db_file_name() {
        assert_eq!(
            DatabaseKind::Default.db_file_name("test", CompressionType::Gzip),
            "test.db.tar.gz"
        );
        assert_eq!(
            DatabaseKind::Files.db_file_name("test", CompressionType::None),
            "test.files.tar"
        );
    }
}
