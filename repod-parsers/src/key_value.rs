//! A deserializer for `key = value` files.
//!
//! Package metadata files such as `.BUILDINFO` and `.PKGINFO` consist of
//! lines in the format `key = value`. Blank lines and lines starting with
//! `#` are ignored. A key that occurs once holds a single value, while a key
//! that occurs multiple times holds a sequence of values in file order.
//!
//! Whether a key is *allowed* to occur multiple times is decided by the type
//! being deserialized into: a sequence field accepts one or more
//! occurrences, any other field rejects duplicates.
//!
//! # Example
//!
//! ```
//! use repod_parsers::key_value;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! struct Data {
//!     num: u64,
//!     text: String,
//!     list: Vec<String>,
//! }
//!
//! # fn main() -> key_value::Result<()> {
//! let content = "
//!     # a comment
//!     num = 42
//!     text = foo
//!     list = bar
//!     list = baz
//! ";
//!
//! let data = key_value::from_str::<Data>(content)?;
//!
//! assert_eq!(data.num, 42);
//! assert_eq!(data.text, "foo");
//! assert_eq!(data.list, vec!["bar", "baz"]);
//! # Ok(())
//! # }
//! ```

use std::{
    collections::BTreeMap,
    fmt::{self, Display},
    str::FromStr,
};

use serde::{
    de::{self, value::SeqDeserializer, DeserializeOwned, IntoDeserializer, Visitor},
    forward_to_deserialize_any, Deserialize,
};

/// The error that can occur when deserializing a `key = value` file.
#[derive(Clone, Debug, PartialEq)]
pub enum Error {
    /// A line is not in the `key = value` format.
    Parse(String),

    /// A singular key occurs more than once.
    DuplicateKey(String),

    /// An error message passed through from the type being deserialized.
    Custom(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(line) => write!(f, "invalid line: {line}"),
            Error::DuplicateKey(key) => {
                write!(f, "the singular key '{key}' occurs more than once")
            }
            Error::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl de::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

/// The result type of this module.
pub type Result<T> = std::result::Result<T, Error>;

/// A raw value of one key in a `key = value` file.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(untagged)]
pub enum Item {
    /// The value of a key that occurs exactly once.
    Value(String),
    /// The values of a key that occurs multiple times, in file order.
    List(Vec<String>),
}

impl Item {
    /// Returns the single value of the item.
    ///
    /// # Errors
    ///
    /// Returns an error if the item holds a list of values.
    fn value(&self, key: &str) -> Result<&str> {
        match self {
            Item::Value(value) => Ok(value),
            Item::List(_) => Err(Error::DuplicateKey(key.to_string())),
        }
    }
}

/// Parses the contents of a `key = value` file into a map of raw [`Item`]s.
///
/// Blank lines and `#` comment lines are skipped. This is useful for schema
/// detection, where a single key decides which strongly typed representation
/// to deserialize into.
///
/// # Errors
///
/// Returns an error if a non-blank, non-comment line does not contain a `=`
/// delimiter.
pub fn parse_items(content: &str) -> Result<BTreeMap<String, Item>> {
    let mut items: Vec<(String, Vec<String>)> = Vec::new();

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = trimmed.split_once('=') else {
            return Err(Error::Parse(line.to_string()));
        };
        let key = key.trim().to_string();
        let value = value.trim().to_string();
        if let Some((_, values)) = items.iter_mut().find(|(existing, _)| *existing == key) {
            values.push(value);
        } else {
            items.push((key, vec![value]));
        }
    }

    Ok(items
        .into_iter()
        .map(|(key, mut values)| {
            let item = if values.len() == 1 {
                Item::Value(values.remove(0))
            } else {
                Item::List(values)
            };
            (key, item)
        })
        .collect())
}

/// Deserializes the contents of a `key = value` file into `T`.
///
/// # Errors
///
/// Returns an error if the input is syntactically invalid, if a singular key
/// occurs multiple times, or if a value can not be converted into the
/// corresponding field of `T`.
pub fn from_str<T: DeserializeOwned>(content: &str) -> Result<T> {
    let mut deserializer = Deserializer {
        input: parse_items(content)?,
    };
    T::deserialize(&mut deserializer)
}

/// A deserializer over the parsed map of [`Item`]s.
struct Deserializer {
    input: BTreeMap<String, Item>,
}

impl<'de> de::Deserializer<'de> for &mut Deserializer {
    type Error = Error;

    fn is_human_readable(&self) -> bool {
        true
    }

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        let entries: Vec<(String, KeyedItem)> = self
            .input
            .iter()
            .map(|(key, item)| {
                (
                    key.clone(),
                    KeyedItem {
                        key: key.clone(),
                        item: item.clone(),
                    },
                )
            })
            .collect();
        visitor.visit_map(de::value::MapDeserializer::new(entries.into_iter()))
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string bytes
        byte_buf unit unit_struct newtype_struct tuple_struct
        struct identifier ignored_any enum option map tuple seq
    }
}

/// An [`Item`] together with the key it was parsed from.
///
/// The key is kept for error messages about duplicate singular keys.
#[derive(Clone, Debug)]
struct KeyedItem {
    key: String,
    item: Item,
}

impl<'de> IntoDeserializer<'de, Error> for KeyedItem {
    type Deserializer = KeyedItem;

    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident,)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
                let value = self.item.value(&self.key)?;
                visitor.$visit(
                    FromStr::from_str(value).map_err(|_| {
                        Error::Custom(format!("invalid value for key '{}': {value}", self.key))
                    })?,
                )
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for KeyedItem {
    type Error = Error;

    fn is_human_readable(&self) -> bool {
        true
    }

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        match &self.item {
            Item::Value(value) => visitor.visit_str(value),
            Item::List(_) => Err(Error::DuplicateKey(self.key.clone())),
        }
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        // a single occurrence deserializes as a list of one element
        let values = match self.item {
            Item::Value(value) => vec![value],
            Item::List(values) => values,
        };
        visitor.visit_seq(SeqDeserializer::new(
            values.into_iter().map(SeqValueDeserializer),
        ))
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    deserialize_parsed! {
        deserialize_bool => visit_bool,
        deserialize_i8 => visit_i8,
        deserialize_i16 => visit_i16,
        deserialize_i32 => visit_i32,
        deserialize_i64 => visit_i64,
        deserialize_i128 => visit_i128,
        deserialize_u8 => visit_u8,
        deserialize_u16 => visit_u16,
        deserialize_u32 => visit_u32,
        deserialize_u64 => visit_u64,
        deserialize_u128 => visit_u128,
        deserialize_f32 => visit_f32,
        deserialize_f64 => visit_f64,
    }

    forward_to_deserialize_any! {
        char str string bytes
        byte_buf unit unit_struct newtype_struct tuple tuple_struct
        struct identifier ignored_any enum map
    }
}

/// A deserializer for individual sequence values.
struct SeqValueDeserializer(String);

impl<'de> de::Deserializer<'de> for SeqValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_str(&self.0)
    }

    fn deserialize_u64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: Visitor<'de>,
    {
        visitor.visit_u64(
            self.0
                .parse()
                .map_err(|_| Error::Custom(format!("invalid integer: {}", self.0)))?,
        )
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u128 f32 f64 char str string bytes
        byte_buf unit unit_struct newtype_struct tuple tuple_struct
        map struct identifier ignored_any enum option seq
    }
}

impl<'de> IntoDeserializer<'de, Error> for SeqValueDeserializer {
    type Deserializer = SeqValueDeserializer;

    fn into_deserializer(self) -> Self::Deserializer {
        self
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde::Deserialize;
    use testresult::TestResult;

    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestModel {
        builddate: i64,
        builddir: String,
        buildenv: Vec<String>,
        format: String,
        packager: String,
    }

    const TEST_INPUT: &str = "
        # a leading comment
        builddate = 1
        builddir = /build
        buildenv = envfoo
        buildenv = envbar
        format = 1
        packager = Foobar McFooface <foobar@mcfooface.org>";

    #[rstest]
    fn deserialize() -> TestResult {
        let value = from_str::<TestModel>(TEST_INPUT)?;
        assert_eq!(
            value,
            TestModel {
                builddate: 1,
                builddir: "/build".into(),
                buildenv: vec!["envfoo".into(), "envbar".into()],
                format: "1".into(),
                packager: "Foobar McFooface <foobar@mcfooface.org>".into(),
            }
        );
        Ok(())
    }

    #[rstest]
    fn duplicate_singular_key() {
        let input = "format = 1\nformat = 2\nbuilddate = 1\nbuilddir = /build\npackager = foo <f@f.org>\nbuildenv = a";
        assert!(from_str::<TestModel>(input).is_err());
    }

    #[rstest]
    fn invalid_line() {
        assert!(parse_items("no delimiter here").is_err());
    }

    #[rstest]
    fn comments_and_blank_lines_are_skipped() -> TestResult {
        let items = parse_items("# comment\n\nkey = value\n")?;
        assert_eq!(
            items.get("key"),
            Some(&Item::Value("value".to_string()))
        );
        assert_eq!(items.len(), 1);
        Ok(())
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct TypedModel {
        num: u64,
        signed: i32,
        list: Vec<u64>,
        flag: bool,
        maybe: Option<String>,
    }

    #[rstest]
    fn deserialize_types() -> TestResult {
        let value = from_str::<TypedModel>(
            "num = 42\nsigned = -3\nlist = 1\nlist = 2\nflag = true\nmaybe = yes",
        )?;
        assert_eq!(
            value,
            TypedModel {
                num: 42,
                signed: -3,
                list: vec![1, 2],
                flag: true,
                maybe: Some("yes".to_string()),
            }
        );
        Ok(())
    }
}
