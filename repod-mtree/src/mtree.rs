//! Interpretation of parsed MTREE data.

use std::{
    fs::File,
    io::Read,
    path::{Component, Path, PathBuf},
    str::FromStr,
};

use flate2::read::GzDecoder;
use repod_types::{Md5Checksum, Sha256Checksum};
use serde::Serialize;
use winnow::Parser;

use crate::{
    parser::{self, PathProperty, PathType, SetProperty, Statement, UnsetProperty},
    Error,
};

/// The kind of an entry in an MTREE file.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// A block device.
    Block,
    /// A character device.
    Char,
    /// A directory.
    Dir,
    /// A named pipe.
    Fifo,
    /// A regular file.
    File,
    /// A symbolic link.
    Link,
    /// A socket.
    Socket,
}

impl From<PathType> for EntryKind {
    fn from(path_type: PathType) -> Self {
        match path_type {
            PathType::Block => EntryKind::Block,
            PathType::Char => EntryKind::Char,
            PathType::Dir => EntryKind::Dir,
            PathType::Fifo => EntryKind::Fifo,
            PathType::File => EntryKind::File,
            PathType::Link => EntryKind::Link,
            PathType::Socket => EntryKind::Socket,
        }
    }
}

/// A single entry of an MTREE file.
///
/// Every entry carries a path, a unix mode, a kind, system ids and a
/// modification time. Size and checksums are present for regular files, a
/// link target for symbolic links.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MtreeEntry {
    /// The path of the entry.
    pub path: PathBuf,
    /// The kind of the entry.
    pub kind: EntryKind,
    /// The unix file mode of the entry (3 or 4 octal digits).
    pub mode: String,
    /// The user id of the entry.
    pub uid: u32,
    /// The group id of the entry.
    pub gid: u32,
    /// The modification time of the entry in seconds since the epoch.
    pub time: f64,
    /// The size of the entry in bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// The MD5 checksum of the entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub md5: Option<Md5Checksum>,
    /// The SHA-256 checksum of the entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<Sha256Checksum>,
    /// The link target of the entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<PathBuf>,
}

impl MtreeEntry {
    /// Returns the link target as written in the MTREE data.
    pub fn link_literal(&self) -> Option<&Path> {
        self.link.as_deref()
    }

    /// Returns the link target resolved against the parent of the entry's
    /// path.
    ///
    /// Relative targets are joined with the parent directory of
    /// [`MtreeEntry::path`] and lexically normalized. Absolute targets are
    /// only normalized.
    pub fn link_resolved(&self) -> Option<PathBuf> {
        let link = self.link.as_ref()?;
        if link.is_absolute() {
            return Some(normalize(link));
        }
        let parent = self.path.parent().unwrap_or(Path::new(""));
        Some(normalize(&parent.join(link)))
    }
}

/// Lexically normalizes a path by resolving `.` and `..` components.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(Component::ParentDir);
                }
            }
            component => normalized.push(component),
        }
    }
    normalized
}

/// The defaults established by `/set` lines.
#[derive(Clone, Debug, Default)]
struct PathDefaults {
    uid: Option<u32>,
    gid: Option<u32>,
    mode: Option<String>,
    path_type: Option<PathType>,
}

impl PathDefaults {
    /// Applies a `/set` statement's properties to the current defaults.
    fn apply_set(&mut self, properties: Vec<SetProperty>) {
        for property in properties {
            match property {
                SetProperty::Uid(uid) => self.uid = Some(uid),
                SetProperty::Gid(gid) => self.gid = Some(gid),
                SetProperty::Mode(mode) => self.mode = Some(mode.to_string()),
                SetProperty::Type(path_type) => self.path_type = Some(path_type),
            }
        }
    }

    /// Applies an `/unset` statement's properties to the current defaults.
    fn apply_unset(&mut self, properties: Vec<UnsetProperty>) {
        for property in properties {
            match property {
                UnsetProperty::Uid => self.uid = None,
                UnsetProperty::Gid => self.gid = None,
                UnsetProperty::Mode => self.mode = None,
                UnsetProperty::Type => self.path_type = None,
            }
        }
    }
}

/// Creates an [`MtreeEntry`] from a path statement and the current defaults.
fn entry_from_statement(
    path: PathBuf,
    properties: Vec<PathProperty>,
    defaults: &PathDefaults,
) -> Result<MtreeEntry, Error> {
    let mut uid = defaults.uid;
    let mut gid = defaults.gid;
    let mut mode = defaults.mode.clone();
    let mut path_type = defaults.path_type;
    let mut size = None;
    let mut time = None;
    let mut md5 = None;
    let mut sha256 = None;
    let mut link = None;

    for property in properties {
        match property {
            PathProperty::Uid(value) => uid = Some(value),
            PathProperty::Gid(value) => gid = Some(value),
            PathProperty::Mode(value) => mode = Some(value.to_string()),
            PathProperty::Type(value) => path_type = Some(value),
            PathProperty::Size(value) => size = Some(value),
            PathProperty::Time(value) => time = Some(value),
            PathProperty::Md5Digest(value) => md5 = Some(value),
            PathProperty::Sha256Digest(value) => sha256 = Some(value),
            PathProperty::Link(value) => link = Some(value),
        }
    }

    let missing = |property: &'static str| Error::MissingProperty {
        path: path.clone(),
        property,
    };

    let kind: EntryKind = path_type.ok_or_else(|| missing("type"))?.into();
    let uid = uid.ok_or_else(|| missing("uid"))?;
    let gid = gid.ok_or_else(|| missing("gid"))?;
    let mode = mode.ok_or_else(|| missing("mode"))?;
    let time = time.ok_or_else(|| missing("time"))?;

    for (kind_name, id) in [("uid", uid), ("gid", gid)] {
        if id > 999 {
            return Err(Error::SystemIdOutOfRange {
                path,
                kind: kind_name,
                id,
            });
        }
    }

    if time < 0.0 {
        return Err(Error::NegativeTime { path, time });
    }

    match kind {
        EntryKind::File => {
            if size.is_none() {
                return Err(missing("size"));
            }
            if md5.is_none() {
                return Err(missing("md5digest"));
            }
            if sha256.is_none() {
                return Err(missing("sha256digest"));
            }
        }
        EntryKind::Link => {
            if link.is_none() {
                return Err(missing("link"));
            }
        }
        _ => {}
    }

    Ok(MtreeEntry {
        path,
        kind,
        mode,
        uid,
        gid,
        time,
        size,
        md5,
        sha256,
        link,
    })
}

/// A representation of the contents of an MTREE file.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_mtree::{EntryKind, Mtree};
///
/// # fn main() -> Result<(), repod_mtree::Error> {
/// let data = r#"#mtree
/// /set uid=0 gid=0 mode=644 type=file
/// ./.BUILDINFO time=1672931631.0 size=5574 md5digest=f4e416e089533d7f33f2a1fb0a0b4acb sha256digest=ed4e5855da200753eaf00cd584f017bef6910ecd3b1c1c54db8d8c979af6f3c8
/// ./usr time=1672931631.0 mode=755 type=dir
/// "#;
///
/// let mtree = Mtree::from_str(data)?;
/// assert_eq!(mtree.entries().len(), 2);
/// assert_eq!(mtree.entries()[1].kind, EntryKind::Dir);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Mtree {
    entries: Vec<MtreeEntry>,
}

impl Mtree {
    /// Returns the entries of the MTREE file in input order.
    pub fn entries(&self) -> &[MtreeEntry] {
        &self.entries
    }

    /// Creates an [`Mtree`] from a reader over gzip-compressed MTREE data.
    ///
    /// Package files carry their `.MTREE` member gzip-compressed.
    pub fn from_gzip_reader(reader: impl Read) -> Result<Self, Error> {
        let mut decoder = GzDecoder::new(reader);
        let mut buf = String::new();
        decoder
            .read_to_string(&mut buf)
            .map_err(|source| Error::IoRead {
                context: "decompressing MTREE data",
                source,
            })?;
        Self::from_str(&buf)
    }

    /// Creates an [`Mtree`] from a gzip-compressed MTREE file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        Self::from_gzip_reader(File::open(path).map_err(|source| Error::IoPath {
            path: path.to_path_buf(),
            context: "opening an MTREE file",
            source,
        })?)
    }
}

impl FromStr for Mtree {
    type Err = Error;

    /// Creates an [`Mtree`] from uncompressed MTREE data.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is syntactically invalid, or if any
    /// path statement violates the constraints on its properties.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let statements = parser::mtree
            .parse(s)
            .map_err(|error| Error::Parse(error.to_string()))?;

        let mut defaults = PathDefaults::default();
        let mut entries = Vec::new();

        for statement in statements {
            match statement {
                Statement::Ignored => {}
                Statement::Set(properties) => defaults.apply_set(properties),
                Statement::Unset(properties) => defaults.apply_unset(properties),
                Statement::Path { path, properties } => {
                    entries.push(entry_from_statement(path, properties, &defaults)?);
                }
            }
        }

        Ok(Mtree { entries })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    const MTREE_DATA: &str = r#"#mtree
/set uid=0 gid=0 mode=644 type=file
./.BUILDINFO time=1672931631.0 size=5574 md5digest=f4e416e089533d7f33f2a1fb0a0b4acb sha256digest=ed4e5855da200753eaf00cd584f017bef6910ecd3b1c1c54db8d8c979af6f3c8
./.PKGINFO time=1672931631.0 size=501 md5digest=f4e416e089533d7f33f2a1fb0a0b4acb sha256digest=ed4e5855da200753eaf00cd584f017bef6910ecd3b1c1c54db8d8c979af6f3c8
/set mode=755
./usr time=1672931631.0 type=dir
./usr/bin time=1672931631.0 type=dir
./usr/bin/foo time=1672931631.0 mode=777 type=link link=../lib/foo/foo
"#;

    #[rstest]
    fn mtree_from_str() -> TestResult {
        let mtree = Mtree::from_str(MTREE_DATA)?;
        assert_eq!(mtree.entries().len(), 5);

        let build_info = &mtree.entries()[0];
        assert_eq!(build_info.kind, EntryKind::File);
        assert_eq!(build_info.mode, "644");
        assert_eq!(build_info.size, Some(5574));

        let usr = &mtree.entries()[2];
        assert_eq!(usr.kind, EntryKind::Dir);
        assert_eq!(usr.mode, "755");
        Ok(())
    }

    #[rstest]
    fn mtree_link_modes() -> TestResult {
        let mtree = Mtree::from_str(MTREE_DATA)?;
        let link = &mtree.entries()[4];
        assert_eq!(
            link.link_literal(),
            Some(Path::new("../lib/foo/foo"))
        );
        assert_eq!(
            link.link_resolved(),
            Some(PathBuf::from("./usr/lib/foo/foo"))
        );
        Ok(())
    }

    #[rstest]
    fn mtree_escaped_path() -> TestResult {
        let data = r#"/set uid=0 gid=0 mode=644 type=file
./\320\220\321\202\320\273\320\260\321\201\320\275\321\213\320\265.svgz time=1.0 size=1 md5digest=f4e416e089533d7f33f2a1fb0a0b4acb sha256digest=ed4e5855da200753eaf00cd584f017bef6910ecd3b1c1c54db8d8c979af6f3c8
"#;
        let mtree = Mtree::from_str(data)?;
        assert_eq!(
            mtree.entries()[0].path,
            PathBuf::from("./Атласные.svgz")
        );
        Ok(())
    }

    #[rstest]
    #[case("./foo time=1.0 type=file\n")]
    #[case("/set uid=0 gid=0 mode=644 type=file\n./foo size=1 md5digest=f4e416e089533d7f33f2a1fb0a0b4acb sha256digest=ed4e5855da200753eaf00cd584f017bef6910ecd3b1c1c54db8d8c979af6f3c8\n")]
    fn mtree_missing_property(#[case] data: &str) {
        assert!(Mtree::from_str(data).is_err());
    }

    #[rstest]
    fn mtree_system_id_out_of_range() {
        let data = "/set uid=1000 gid=0 mode=755 type=dir\n./usr time=1.0\n";
        assert!(matches!(
            Mtree::from_str(data),
            Err(Error::SystemIdOutOfRange { .. })
        ));
    }

    #[rstest]
    fn mtree_unset_defaults() {
        let data = "/set uid=0 gid=0 mode=755 type=dir\n/unset mode\n./usr time=1.0\n";
        assert!(matches!(
            Mtree::from_str(data),
            Err(Error::MissingProperty { property: "mode", .. })
        ));
    }
}
