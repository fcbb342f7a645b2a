//! The line oriented grammar of MTREE data.

use std::path::PathBuf;

use repod_types::{Md5Checksum, Sha256Checksum};
use winnow::{
    ascii::{digit1, line_ending, space0},
    combinator::{
        alt, cut_err, eof, fail, preceded, repeat_till, separated, separated_pair, terminated,
    },
    error::{StrContext, StrContextValue},
    stream::AsChar,
    token::{take_until, take_while},
    ModalResult, Parser as WinnowParser,
};

use crate::path_decoder::decode_utf8_chars;

/// One line of an MTREE file.
#[derive(Debug, Clone)]
pub enum Statement<'a> {
    /// A line that does not contribute to the file system layout.
    ///
    /// Includes empty lines and lines starting with `#` (e.g. the `#mtree`
    /// signature line and comments).
    Ignored,
    /// A `/set` command followed by properties.
    Set(Vec<SetProperty<'a>>),
    /// An `/unset` command followed by properties.
    Unset(Vec<UnsetProperty>),
    /// A path statement followed by properties.
    Path {
        /// The (decoded) path of the entry.
        path: PathBuf,
        /// The properties of the entry.
        properties: Vec<PathProperty<'a>>,
    },
}

/// A property that may be set in `/set` lines.
#[derive(Debug, Clone)]
pub enum SetProperty<'a> {
    /// A default user id.
    Uid(u32),
    /// A default group id.
    Gid(u32),
    /// A default file mode.
    Mode(&'a str),
    /// A default path type.
    Type(PathType),
}

/// A property that can be unset by `/unset` lines.
#[derive(Debug, Clone)]
pub enum UnsetProperty {
    /// Unset the default user id.
    Uid,
    /// Unset the default group id.
    Gid,
    /// Unset the default file mode.
    Mode,
    /// Unset the default path type.
    Type,
}

/// A property of a single path statement.
#[derive(Debug, Clone)]
pub enum PathProperty<'a> {
    /// The user id of the path.
    Uid(u32),
    /// The group id of the path.
    Gid(u32),
    /// The file mode of the path.
    Mode(&'a str),
    /// The type of the path.
    Type(PathType),
    /// The size of the path in bytes.
    Size(u64),
    /// The target of a symlink.
    Link(PathBuf),
    /// The MD5 checksum of the path.
    Md5Digest(Md5Checksum),
    /// The SHA-256 checksum of the path.
    Sha256Digest(Sha256Checksum),
    /// The modification time of the path in seconds since the epoch.
    Time(f64),
}

/// All known path types.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PathType {
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

/// The keywords naming a [`PathType`].
const PATH_TYPES: [&str; 7] = ["block", "char", "dir", "fifo", "file", "link", "socket"];

/// Parses a [`PathType`] keyword.
fn path_type(input: &mut &str) -> ModalResult<PathType> {
    alt(PATH_TYPES)
        .map(|value| match value {
            "block" => PathType::Block,
            "char" => PathType::Char,
            "dir" => PathType::Dir,
            "fifo" => PathType::Fifo,
            "file" => PathType::File,
            "link" => PathType::Link,
            "socket" => PathType::Socket,
            _ => unreachable!(),
        })
        .context(StrContext::Label("path type"))
        .context(StrContext::Expected(StrContextValue::Description(
            "'block', 'char', 'dir', 'fifo', 'file', 'link' or 'socket'",
        )))
        .parse_next(input)
}

/// Parses a single `/set` property.
fn set_property<'s>(input: &mut &'s str) -> ModalResult<SetProperty<'s>> {
    let keywords = ["uid", "gid", "type", "mode"];
    let property_type = cut_err(alt(keywords))
        .context(StrContext::Label("property"))
        .parse_next(input)?;

    let _ = "=".parse_next(input)?;

    let property = match property_type {
        "type" => SetProperty::Type(path_type(input)?),
        "uid" => SetProperty::Uid(system_id("user id", input)?),
        "gid" => SetProperty::Gid(system_id("group id", input)?),
        "mode" => SetProperty::Mode(mode(input)?),
        _ => unreachable!(),
    };

    Ok(property)
}

/// Parses a single `/unset` property.
fn unset_property(input: &mut &str) -> ModalResult<UnsetProperty> {
    let keywords = ["uid", "gid", "type", "mode"];
    let property_type = cut_err(alt(keywords))
        .context(StrContext::Label("property"))
        .parse_next(input)?;

    let property = match property_type {
        "type" => UnsetProperty::Type,
        "uid" => UnsetProperty::Uid,
        "gid" => UnsetProperty::Gid,
        "mode" => UnsetProperty::Mode,
        _ => unreachable!(),
    };

    Ok(property)
}

/// Parses a system id.
fn system_id(id_type: &'static str, input: &mut &str) -> ModalResult<u32> {
    cut_err(digit1.parse_to())
        .context(StrContext::Label(id_type))
        .context(StrContext::Expected(StrContextValue::Description(
            "a system id",
        )))
        .parse_next(input)
}

/// Parses a Unix timestamp.
///
/// In mtree this is a float, even though the decimal place is always `0`.
fn timestamp(input: &mut &str) -> ModalResult<f64> {
    cut_err(
        separated_pair(digit1, '.', digit1)
            .take()
            .parse_to::<f64>(),
    )
    .context(StrContext::Label("unix epoch"))
    .context(StrContext::Expected(StrContextValue::Description(
        "a unix epoch in float notation",
    )))
    .parse_next(input)
}

/// Parses a file system mode.
///
/// A mode consists of 3 or 4 octal digits without a `0o` prefix.
fn mode<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    cut_err(take_while(3..=4, AsChar::is_oct_digit))
        .context(StrContext::Label("file mode"))
        .context(StrContext::Expected(StrContextValue::Description(
            "an octal string of length 3-4",
        )))
        .parse_next(input)
}

/// Parses a SHA-256 checksum.
fn sha256(input: &mut &str) -> ModalResult<Sha256Checksum> {
    cut_err(take_while(64, AsChar::is_hex_digit).parse_to())
        .context(StrContext::Label("sha256 checksum"))
        .context(StrContext::Expected(StrContextValue::Description(
            "a 64 character long hexadecimal string",
        )))
        .parse_next(input)
}

/// Parses an MD5 checksum.
fn md5(input: &mut &str) -> ModalResult<Md5Checksum> {
    cut_err(take_while(32, AsChar::is_hex_digit).parse_to())
        .context(StrContext::Label("md5 checksum"))
        .context(StrContext::Expected(StrContextValue::Description(
            "a 32 character long hexadecimal string",
        )))
        .parse_next(input)
}

/// Parses a symlink target.
///
/// Consumes all characters until a space or newline is hit. See
/// [`decode_utf8_chars`] for the escaping of special characters.
fn link(input: &mut &str) -> ModalResult<String> {
    take_while(0.., |c| c != ' ' && c != '\n')
        .and_then(decode_utf8_chars)
        .parse_next(input)
}

/// Parses a file size.
fn size(input: &mut &str) -> ModalResult<u64> {
    cut_err(take_while(0.., |c| c != ' ' && c != '\n').parse_to())
        .context(StrContext::Label("file size"))
        .context(StrContext::Expected(StrContextValue::Description(
            "a positive integer representing the file's size",
        )))
        .parse_next(input)
}

/// Parses a single path property.
fn property<'s>(input: &mut &'s str) -> ModalResult<PathProperty<'s>> {
    let keywords = [
        "type",
        "uid",
        "gid",
        "mode",
        "size",
        "link",
        "md5digest",
        "sha256digest",
        "time",
    ];
    let property_type = cut_err(alt(keywords))
        .context(StrContext::Label("file property type"))
        .parse_next(input)?;

    let _ = "=".parse_next(input)?;

    let property = match property_type {
        "type" => PathProperty::Type(path_type(input)?),
        "uid" => PathProperty::Uid(system_id("user id", input)?),
        "gid" => PathProperty::Gid(system_id("group id", input)?),
        "mode" => PathProperty::Mode(mode(input)?),
        "size" => PathProperty::Size(size.parse_next(input)?),
        "link" => PathProperty::Link(PathBuf::from(link.parse_next(input)?)),
        "md5digest" => PathProperty::Md5Digest(md5(input)?),
        "sha256digest" => PathProperty::Sha256Digest(sha256(input)?),
        "time" => PathProperty::Time(timestamp(input)?),
        _ => unreachable!(),
    };

    Ok(property)
}

/// Parses the properties following a path declaration.
fn properties<'s>(input: &mut &'s str) -> ModalResult<Vec<PathProperty<'s>>> {
    cut_err(terminated(separated(0.., property, " "), line_ending)).parse_next(input)
}

/// Parses the properties following a `/set` command.
fn set_properties<'s>(input: &mut &'s str) -> ModalResult<Vec<SetProperty<'s>>> {
    cut_err(terminated(separated(0.., set_property, " "), line_ending)).parse_next(input)
}

/// Parses the properties following an `/unset` command.
fn unset_properties(input: &mut &str) -> ModalResult<Vec<UnsetProperty>> {
    cut_err(terminated(separated(0.., unset_property, " "), line_ending)).parse_next(input)
}

/// Parses the next statement in the file.
fn statement<'s>(input: &mut &'s str) -> ModalResult<Statement<'s>> {
    // Figure out what kind of line this is by looking at its start. Path
    // statements begin with `./` and run until the first unescaped space
    // (whitespace in path names is escaped, see `decode_utf8_chars`).
    let statement_type: String = alt((
        preceded(
            space0,
            terminated((".", take_until(0.., " ")).take(), ' '),
        )
        .and_then(decode_utf8_chars),
        terminated("/set", " ").map(|s: &str| s.to_string()),
        terminated("/unset", " ").map(|s: &str| s.to_string()),
        preceded(("#", take_until(0.., "\n")), line_ending).map(|s: &str| s.to_string()),
        preceded(space0, line_ending).map(|s: &str| s.to_string()),
        fail.context(StrContext::Label("statement"))
            .context(StrContext::Expected(StrContextValue::Description(
                "'/set', '/unset', or a relative path (./some/path) followed by properties",
            ))),
    ))
    .parse_next(input)?;

    if statement_type.trim().is_empty() {
        return Ok(Statement::Ignored);
    }

    let statement = match statement_type.as_str() {
        "/set" => Statement::Set(set_properties.parse_next(input)?),
        "/unset" => Statement::Unset(unset_properties.parse_next(input)?),
        path => Statement::Path {
            path: PathBuf::from(path),
            properties: properties.parse_next(input)?,
        },
    };

    Ok(statement)
}

/// Parses MTREE data into a list of [`Statement`]s.
///
/// Empty lines and comment lines are returned as [`Statement::Ignored`] to
/// preserve the line structure of the input.
pub fn mtree<'s>(input: &mut &'s str) -> ModalResult<Vec<Statement<'s>>> {
    let (statements, _eof): (Vec<Statement<'s>>, _) =
        repeat_till(0.., statement, eof).parse_next(input)?;

    Ok(statements)
}
