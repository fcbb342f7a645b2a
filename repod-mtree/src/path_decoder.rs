//! Decoding of escaped path names in MTREE data.

use winnow::{
    combinator::{alt, cut_err, fail, preceded},
    error::{AddContext, ContextError, ErrMode, StrContext, StrContextValue},
    stream::{Checkpoint, Stream},
    token::take_while,
    ModalResult, Parser,
};

/// Decodes the escape sequences used in MTREE path names.
///
/// MTREE data escapes bytes outside of the safe printable set, as well as
/// space, `=` and `#`:
///
/// 1. The control characters allowed in file names use the `strsvis(3)`
///    VIS_CSTYLE encoding: `\s` (space), `\t` (tab), `\r` (carriage return)
///    and `\n` (line feed).
/// 2. `#` is encoded as `\#` to distinguish path names from comments.
/// 3. All other bytes are encoded as backslash-octal triplets (`\NNN`). The
///    resulting byte sequence is decoded as UTF-8 (see [`unicode_char`]).
pub fn decode_utf8_chars(input: &mut &str) -> ModalResult<String> {
    let mut path = String::new();

    loop {
        let part = take_while(0.., |c| c != '\\').parse_next(input)?;
        path.push_str(part);

        if input.is_empty() {
            break;
        }

        let escaped: Result<&str, ErrMode<ContextError>> = alt((
            "\\s".value(" "),
            "\\t".value("\t"),
            "\\r".value("\r"),
            "\\n".value("\n"),
            "\\#".value("#"),
            "\\=".value("="),
        ))
        .parse_next(&mut *input);
        let escaped = escaped.map(|s: &str| s.to_string());

        let unescaped = match escaped {
            Ok(unescaped) => unescaped,
            Err(_) => alt((
                unicode_char,
                fail.context(StrContext::Label("escape sequence"))
                    .context(StrContext::Expected(StrContextValue::Description(
                        "a VIS_CSTYLE escape or octal triplets encoding a unicode character",
                    ))),
            ))
            .parse_next(input)?,
        };

        path.push_str(&unescaped);
    }

    Ok(path)
}

/// Parses a single backslash-octal triplet into a byte.
///
/// An octal triplet encodes 9 bits, while the target byte holds 8. The
/// conversion to `u8` rejects triplets with the highest bit set.
fn octal_triplet(input: &mut &str) -> ModalResult<u8> {
    preceded('\\', take_while(3, |c: char| c.is_digit(8)))
        .verify_map(|octals| u8::from_str_radix(octals, 8).ok())
        .parse_next(input)
}

/// Parses and decodes a unicode character encoded as octal triplets.
///
/// For example, `Д` is encoded as `\320\224`. The number of leading ones in
/// the first byte determines the number of continuation bytes.
fn unicode_char(input: &mut &str) -> ModalResult<String> {
    let mut unicode_bytes = Vec::new();

    let checkpoint = input.checkpoint();

    let first = octal_triplet(input)?;
    unicode_bytes.push(first);

    let leading_ones = first.leading_ones() as usize;

    // a single byte UTF-8 character
    if leading_ones == 0 {
        return bytes_to_string(input, checkpoint, unicode_bytes);
    }

    if leading_ones == 1 || leading_ones > 4 {
        let mut error = ContextError::new();
        error = error.add_context(
            input,
            &checkpoint,
            StrContext::Label("leading ones in the first UTF-8 byte"),
        );
        return Err(ErrMode::Cut(error));
    }

    for _ in 1..leading_ones {
        let byte = cut_err(octal_triplet)
            .context(StrContext::Label("UTF-8 continuation byte"))
            .context(StrContext::Expected(StrContextValue::Description(
                "an octal triplet encoding a unicode byte",
            )))
            .parse_next(input)?;
        unicode_bytes.push(byte);
    }

    bytes_to_string(input, checkpoint, unicode_bytes)
}

/// Decodes a UTF-8 byte sequence into a [`String`].
fn bytes_to_string(
    input: &mut &str,
    checkpoint: Checkpoint<&str, &str>,
    bytes: Vec<u8>,
) -> ModalResult<String> {
    match String::from_utf8(bytes) {
        Ok(decoded) => Ok(decoded),
        Err(_) => {
            let mut error = ContextError::new();
            error = error.add_context(input, &checkpoint, StrContext::Label("UTF-8 byte sequence"));
            Err(ErrMode::Cut(error))
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(r"hello\sworld", "hello world")]
    #[case(r"\#", "#")]
    #[case(r"\=", "=")]
    #[case(r"\n", "\n")]
    #[case(
        r"/\320\220\321\202\320\273\320\260\321\201\320\275\321\213\320\265.svgz",
        "/Атласные.svgz"
    )]
    #[case(r"\360\237\214\240", "🌠")]
    fn decode(#[case] input: &str, #[case] expected: &str) {
        let mut input = input;
        assert_eq!(decode_utf8_chars(&mut input), Ok(expected.to_string()));
    }

    #[rstest]
    // unknown escape sequence
    #[case(r"invalid\escape")]
    // the first octal triplet overflows a byte
    #[case(r"\460\237\214\240")]
    // four byte segments expected, three passed
    #[case(r"\360\237\214")]
    // five leading ones in the first byte
    #[case(r"\370\237\214\240")]
    fn decode_invalid_escape(#[case] input: &str) {
        let mut input = input;
        assert!(decode_utf8_chars(&mut input).is_err());
    }
}
