//! CPU architectures.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantNames};

/// CPU architecture
///
/// Members of the [`Architecture`] enum can be created from string slices.
///
/// ## Examples
/// ```
/// use std::str::FromStr;
///
/// use repod_types::Architecture;
///
/// assert_eq!(Architecture::from_str("aarch64"), Ok(Architecture::Aarch64));
/// assert_eq!("x86_64", format!("{}", Architecture::X86_64));
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    EnumString,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    VariantNames,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    /// ARMv8 64-bit
    Aarch64,
    /// Any architecture
    Any,
    /// ARM
    Arm,
    /// ARMv6 hard-float
    Armv6h,
    /// ARMv7 hard-float
    Armv7h,
    /// Intel 386
    I386,
    /// Intel 486
    I486,
    /// Intel 686
    I686,
    /// Intel Pentium 4
    Pentium4,
    /// RISC-V 32-bit
    Riscv32,
    /// RISC-V 64-bit
    Riscv64,
    /// Intel x86_64
    X86_64,
    /// Intel x86_64 version 2
    #[strum(to_string = "x86_64_v2")]
    #[serde(rename = "x86_64_v2")]
    X86_64V2,
    /// Intel x86_64 version 3
    #[strum(to_string = "x86_64_v3")]
    #[serde(rename = "x86_64_v3")]
    X86_64V3,
    /// Intel x86_64 version 4
    #[strum(to_string = "x86_64_v4")]
    #[serde(rename = "x86_64_v4")]
    X86_64V4,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rstest::rstest;
    use strum::ParseError;

    use super::*;

    #[rstest]
    #[case("aarch64", Ok(Architecture::Aarch64))]
    #[case("any", Ok(Architecture::Any))]
    #[case("x86_64", Ok(Architecture::X86_64))]
    #[case("x86_64_v3", Ok(Architecture::X86_64V3))]
    #[case("foo", Err(ParseError::VariantNotFound))]
    fn architecture_from_string(#[case] s: &str, #[case] arch: Result<Architecture, ParseError>) {
        assert_eq!(Architecture::from_str(s), arch);
    }

    #[rstest]
    #[case(Architecture::Any, "any")]
    #[case(Architecture::X86_64, "x86_64")]
    #[case(Architecture::X86_64V2, "x86_64_v2")]
    fn architecture_format_string(#[case] arch: Architecture, #[case] arch_str: &str) {
        assert_eq!(arch_str, format!("{arch}"));
    }
}
