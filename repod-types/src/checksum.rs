//! Checksums based on various hash functions.

use std::{
    fmt::{Debug, Display, Formatter},
    str::FromStr,
};

use digest::Digest;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// A checksum using a supported hash function.
///
/// [`Checksum`] is generic over the hash functions re-exported in
/// [`crate::digests`]. The hex representation round-trips through
/// [`Display`]/[`FromStr`] and is used for (de)serialization.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::{digests::Sha256, Checksum};
///
/// let checksum = Checksum::<Sha256>::calculate_from("foo\n");
/// assert_eq!(
///     checksum.to_string(),
///     "b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c"
/// );
/// assert_eq!(Checksum::<Sha256>::from_str(&checksum.to_string()), Ok(checksum));
/// ```
#[derive(Clone)]
pub struct Checksum<D: Digest> {
    digest: Vec<u8>,
    _phantom: std::marker::PhantomData<D>,
}

/// A checksum using the MD5 hash function.
pub type Md5Checksum = Checksum<md5::Md5>;

/// A checksum using the SHA-256 hash function.
pub type Sha256Checksum = Checksum<sha2::Sha256>;

impl<D: Digest> Checksum<D> {
    /// Calculates a [`Checksum`] over `input`.
    pub fn calculate_from(input: impl AsRef<[u8]>) -> Self {
        let mut hasher = D::new();
        hasher.update(input);
        Checksum {
            digest: hasher.finalize().to_vec(),
            _phantom: std::marker::PhantomData,
        }
    }

    /// Creates a [`Checksum`] from a raw digest.
    ///
    /// # Errors
    ///
    /// Returns an error if `digest` does not have the output size of the
    /// hash function.
    pub fn from_digest(digest: Vec<u8>) -> Result<Self, Error> {
        if digest.len() != <D as Digest>::output_size() {
            return Err(Error::InvalidChecksum {
                digest: Self::digest_name(),
                input: hex_encode(&digest),
            });
        }
        Ok(Checksum {
            digest,
            _phantom: std::marker::PhantomData,
        })
    }

    /// Returns the raw digest bytes.
    pub fn inner(&self) -> &[u8] {
        &self.digest
    }

    /// Returns a short name for the hash function, for use in messages.
    fn digest_name() -> &'static str {
        let name = std::any::type_name::<D>();
        name.rsplit("::").next().unwrap_or(name)
    }
}

/// Encodes `bytes` as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

impl<D: Digest> FromStr for Checksum<D> {
    type Err = Error;

    /// Creates a [`Checksum`] from a hex string.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` is not a lowercase hex string of exactly
    /// twice the output size of the hash function.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let error = || Error::InvalidChecksum {
            digest: Self::digest_name(),
            input: input.to_string(),
        };

        if input.len() != <D as Digest>::output_size() * 2 {
            return Err(error());
        }

        let mut digest = Vec::with_capacity(<D as Digest>::output_size());
        for chunk in input.as_bytes().chunks(2) {
            let chunk = std::str::from_utf8(chunk).map_err(|_| error())?;
            if chunk.chars().any(|c| c.is_ascii_uppercase()) {
                return Err(error());
            }
            digest.push(u8::from_str_radix(chunk, 16).map_err(|_| error())?);
        }

        Ok(Checksum {
            digest,
            _phantom: std::marker::PhantomData,
        })
    }
}

impl<D: Digest> Display for Checksum<D> {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "{}", hex_encode(&self.digest))
    }
}

impl<D: Digest> Debug for Checksum<D> {
    fn fmt(&self, fmt: &mut Formatter) -> std::fmt::Result {
        write!(fmt, "Checksum({self})")
    }
}

impl<D: Digest> PartialEq for Checksum<D> {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}

impl<D: Digest> Eq for Checksum<D> {}

impl<D: Digest> Serialize for Checksum<D> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de, D: Digest> Deserialize<'de> for Checksum<D> {
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        let input = String::deserialize(deserializer)?;
        Checksum::from_str(&input).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn sha256_calculate_from() {
        assert_eq!(
            Sha256Checksum::calculate_from("foo\n").to_string(),
            "b5bb9d8014a0f9b1d61e21e796d78dccdf1352f23cd32812f4850b878ae4944c"
        );
    }

    #[rstest]
    fn md5_calculate_from() {
        assert_eq!(
            Md5Checksum::calculate_from("foo\n").to_string(),
            "d3b07384d113edec49eaa6238ad5ff00"
        );
    }

    proptest! {
        #[test]
        fn valid_md5_from_string(checksum in "[a-f0-9]{32}") {
            let parsed = Md5Checksum::from_str(&checksum).unwrap();
            prop_assert_eq!(checksum, parsed.to_string());
        }

        #[test]
        fn invalid_md5_wrong_length(checksum in "[a-f0-9]{16}") {
            prop_assert!(Md5Checksum::from_str(&checksum).is_err());
        }

        #[test]
        fn invalid_sha256_wrong_chars(checksum in "[g-z]{64}") {
            prop_assert!(Sha256Checksum::from_str(&checksum).is_err());
        }
    }
}
