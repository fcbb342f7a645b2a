//! Parser for `desc` members of sync databases.

use std::str::FromStr;

use repod_types::{
    Architecture, BuildDate, CompressedSize, InstalledSize, Md5Checksum, Name, PackageFileName,
    Packager, Sha256Checksum, Version,
};
use strum::{Display, EnumString, VariantNames};
use url::Url;
use winnow::{
    ascii::{line_ending, newline, space0, till_line_ending},
    combinator::{
        alt, cut_err, delimited, eof, opt, peek, preceded, repeat, repeat_till, terminated,
    },
    error::{StrContext, StrContextValue},
    token::take_while,
    ModalResult, Parser,
};

/// A known section name in a `desc` file.
///
/// Section names are e.g. `%NAME%` or `%VERSION%`.
#[derive(Clone, Debug, Display, EnumString, Eq, Hash, PartialEq, VariantNames)]
#[strum(serialize_all = "UPPERCASE")]
pub enum SectionKeyword {
    /// %FILENAME%
    Filename,
    /// %NAME%
    Name,
    /// %BASE%
    Base,
    /// %VERSION%
    Version,
    /// %DESC%
    Desc,
    /// %GROUPS%
    Groups,
    /// %CSIZE%
    CSize,
    /// %ISIZE%
    ISize,
    /// %MD5SUM%
    Md5Sum,
    /// %SHA256SUM%
    Sha256Sum,
    /// %PGPSIG%
    PgpSig,
    /// %URL%
    Url,
    /// %LICENSE%
    License,
    /// %ARCH%
    Arch,
    /// %BUILDDATE%
    BuildDate,
    /// %PACKAGER%
    Packager,
    /// %REPLACES%
    Replaces,
    /// %CONFLICTS%
    Conflicts,
    /// %PROVIDES%
    Provides,
    /// %DEPENDS%
    Depends,
    /// %OPTDEPENDS%
    OptDepends,
    /// %BACKUP%
    Backup,
    /// %MAKEDEPENDS%
    MakeDepends,
    /// %CHECKDEPENDS%
    CheckDepends,
}

impl SectionKeyword {
    /// Recognizes a [`SectionKeyword`] in an input string slice.
    ///
    /// # Errors
    ///
    /// Returns an error if the input does not start with a valid
    /// `%SECTION%` header followed by a newline.
    pub fn parser(input: &mut &str) -> ModalResult<Self> {
        let section = delimited("%", take_while(1.., |c| c != '%'), "%");
        terminated(
            preceded(space0, section.try_map(Self::from_str)),
            line_ending,
        )
        .parse_next(input)
    }
}

/// A single parsed section of a `desc` file.
#[derive(Clone, Debug)]
pub enum Section {
    /// %FILENAME%
    Filename(PackageFileName),
    /// %NAME%
    Name(Name),
    /// %BASE%
    Base(Name),
    /// %VERSION%
    Version(Version),
    /// %DESC%
    Desc(String),
    /// %GROUPS%
    Groups(Vec<String>),
    /// %CSIZE%
    CSize(CompressedSize),
    /// %ISIZE%
    ISize(InstalledSize),
    /// %MD5SUM%
    Md5Sum(Md5Checksum),
    /// %SHA256SUM%
    Sha256Sum(Sha256Checksum),
    /// %PGPSIG%
    PgpSig(String),
    /// %URL%
    Url(Option<Url>),
    /// %LICENSE%
    License(Vec<String>),
    /// %ARCH%
    Arch(Architecture),
    /// %BUILDDATE%
    BuildDate(BuildDate),
    /// %PACKAGER%
    Packager(Packager),
    /// %REPLACES%
    Replaces(Vec<String>),
    /// %CONFLICTS%
    Conflicts(Vec<String>),
    /// %PROVIDES%
    Provides(Vec<String>),
    /// %DEPENDS%
    Depends(Vec<String>),
    /// %OPTDEPENDS%
    OptDepends(Vec<String>),
    /// %BACKUP%
    Backup(Vec<String>),
    /// %MAKEDEPENDS%
    MakeDepends(Vec<String>),
    /// %CHECKDEPENDS%
    CheckDepends(Vec<String>),
}

impl Section {
    /// Returns the [`SectionKeyword`] of the section.
    pub fn keyword(&self) -> SectionKeyword {
        match self {
            Section::Filename(_) => SectionKeyword::Filename,
            Section::Name(_) => SectionKeyword::Name,
            Section::Base(_) => SectionKeyword::Base,
            Section::Version(_) => SectionKeyword::Version,
            Section::Desc(_) => SectionKeyword::Desc,
            Section::Groups(_) => SectionKeyword::Groups,
            Section::CSize(_) => SectionKeyword::CSize,
            Section::ISize(_) => SectionKeyword::ISize,
            Section::Md5Sum(_) => SectionKeyword::Md5Sum,
            Section::Sha256Sum(_) => SectionKeyword::Sha256Sum,
            Section::PgpSig(_) => SectionKeyword::PgpSig,
            Section::Url(_) => SectionKeyword::Url,
            Section::License(_) => SectionKeyword::License,
            Section::Arch(_) => SectionKeyword::Arch,
            Section::BuildDate(_) => SectionKeyword::BuildDate,
            Section::Packager(_) => SectionKeyword::Packager,
            Section::Replaces(_) => SectionKeyword::Replaces,
            Section::Conflicts(_) => SectionKeyword::Conflicts,
            Section::Provides(_) => SectionKeyword::Provides,
            Section::Depends(_) => SectionKeyword::Depends,
            Section::OptDepends(_) => SectionKeyword::OptDepends,
            Section::Backup(_) => SectionKeyword::Backup,
            Section::MakeDepends(_) => SectionKeyword::MakeDepends,
            Section::CheckDepends(_) => SectionKeyword::CheckDepends,
        }
    }
}

/// Zero or more newlines.
fn newlines(input: &mut &str) -> ModalResult<()> {
    repeat(0.., line_ending).parse_next(input)
}

/// Parses a single typed value, consuming the rest of the current line.
fn value<T>(input: &mut &str) -> ModalResult<T>
where
    T: FromStr,
    T::Err: std::fmt::Display + std::error::Error + Send + Sync + 'static,
{
    let value = cut_err(till_line_ending.try_map(T::from_str)).parse_next(input)?;
    alt((line_ending, eof)).parse_next(input)?;
    Ok(value)
}

/// Parses an optional typed value, consuming the rest of the current line.
///
/// An immediately following blank line yields [`None`].
fn opt_value<T>(input: &mut &str) -> ModalResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = till_line_ending.parse_next(input)?;
    alt((line_ending, eof)).parse_next(input)?;
    if raw.is_empty() {
        return Ok(None);
    }
    match T::from_str(raw) {
        Ok(value) => Ok(Some(value)),
        Err(_) => Err(winnow::error::ErrMode::Cut(
            winnow::error::ContextError::new(),
        )),
    }
}

/// Parses a list of values, until the next section header or the end of the
/// input.
fn values<T>(input: &mut &str) -> ModalResult<Vec<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display + std::error::Error + Send + Sync + 'static,
{
    let next_section = peek(preceded(newline, SectionKeyword::parser)).map(|_| ());
    let blank_line = terminated(space0, newline).map(|_| ());

    repeat_till(0.., value, alt((next_section, blank_line, eof.map(|_| ()))))
        .context(StrContext::Label("values"))
        .context(StrContext::Expected(StrContextValue::Description(
            "a list of values in a desc file section",
        )))
        .parse_next(input)
        .map(|(values, _)| values)
}

/// Parses a single `%SECTION%` block into a [`Section`].
fn section(input: &mut &str) -> ModalResult<Section> {
    let section_keyword = cut_err(SectionKeyword::parser)
        .context(StrContext::Label("section name"))
        .context(StrContext::Expected(StrContextValue::Description(
            "a section name enclosed in '%' characters",
        )))
        .parse_next(input)?;

    let section = match section_keyword {
        SectionKeyword::Filename => Section::Filename(value(input)?),
        SectionKeyword::Name => Section::Name(value(input)?),
        SectionKeyword::Base => Section::Base(value(input)?),
        SectionKeyword::Version => Section::Version(value(input)?),
        SectionKeyword::Desc => Section::Desc(value(input)?),
        SectionKeyword::Groups => Section::Groups(values(input)?),
        SectionKeyword::CSize => Section::CSize(value(input)?),
        SectionKeyword::ISize => Section::ISize(value(input)?),
        SectionKeyword::Md5Sum => Section::Md5Sum(value(input)?),
        SectionKeyword::Sha256Sum => Section::Sha256Sum(value(input)?),
        SectionKeyword::PgpSig => Section::PgpSig(value(input)?),
        SectionKeyword::Url => Section::Url(opt_value(input)?),
        SectionKeyword::License => Section::License(values(input)?),
        SectionKeyword::Arch => Section::Arch(value(input)?),
        SectionKeyword::BuildDate => Section::BuildDate(value(input)?),
        SectionKeyword::Packager => Section::Packager(value(input)?),
        SectionKeyword::Replaces => Section::Replaces(values(input)?),
        SectionKeyword::Conflicts => Section::Conflicts(values(input)?),
        SectionKeyword::Provides => Section::Provides(values(input)?),
        SectionKeyword::Depends => Section::Depends(values(input)?),
        SectionKeyword::OptDepends => Section::OptDepends(values(input)?),
        SectionKeyword::Backup => Section::Backup(values(input)?),
        SectionKeyword::MakeDepends => Section::MakeDepends(values(input)?),
        SectionKeyword::CheckDepends => Section::CheckDepends(values(input)?),
    };

    Ok(section)
}

/// Parses all `%SECTION%` blocks of a `desc` file.
pub(crate) fn sections(input: &mut &str) -> ModalResult<Vec<Section>> {
    cut_err(repeat_till(
        0..,
        preceded(opt(newlines), section),
        terminated(opt(newlines), eof),
    ))
    .context(StrContext::Label("sections"))
    .context(StrContext::Expected(StrContextValue::Description(
        "a section in a desc file",
    )))
    .parse_next(input)
    .map(|(sections, _): (Vec<Section>, _)| sections)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    #[rstest]
    fn section_keyword_parser() -> TestResult {
        let mut input = "%NAME%\nfoo\n";
        assert_eq!(SectionKeyword::parser(&mut input)?, SectionKeyword::Name);
        Ok(())
    }

    #[rstest]
    fn sections_parser() -> TestResult {
        let mut input = "%NAME%\nfoo\n\n%VERSION%\n1.0.0-1\n\n%DEPENDS%\nbar\nbaz\n\n";
        let sections = sections(&mut input)?;
        assert_eq!(sections.len(), 3);
        assert!(matches!(&sections[0], Section::Name(name) if name.inner() == "foo"));
        assert!(matches!(&sections[2], Section::Depends(depends) if depends.len() == 2));
        Ok(())
    }

    #[rstest]
    fn sections_parser_unknown_section() {
        let mut input = "%FROBNICATE%\nfoo\n";
        assert!(sections(&mut input).is_err());
    }
}
