use core::fmt;
use core::str::FromStr;

use rkyv::{Archive, Deserialize, Serialize};

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

/// Output formats a tree printer understands. The names match the ones
/// parser tool chains accept on their command lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Archive, Serialize, Deserialize)]
#[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
#[archive(check_bytes)]
#[repr(u8)]
pub enum PrintMode {
    #[default]
    Penn = 0,
    #[cfg_attr(feature = "serde", serde(rename = "oneline"))]
    OneLine = 1,
    WordsAndTags = 2,
    TypedDependencies = 3,
    TypedDependenciesCollapsed = 4,
}

impl PrintMode {
    pub const ALL: [PrintMode; 5] = [
        PrintMode::Penn,
        PrintMode::OneLine,
        PrintMode::WordsAndTags,
        PrintMode::TypedDependencies,
        PrintMode::TypedDependenciesCollapsed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PrintMode::Penn => "penn",
            PrintMode::OneLine => "oneline",
            PrintMode::WordsAndTags => "wordsAndTags",
            PrintMode::TypedDependencies => "typedDependencies",
            PrintMode::TypedDependenciesCollapsed => "typedDependenciesCollapsed",
        }
    }
}

impl fmt::Display for PrintMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPrintMode;

impl fmt::Display for UnknownPrintMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("unknown print mode, expected one of: ")?;
        for (i, mode) in PrintMode::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(mode.as_str())?;
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownPrintMode {}

impl FromStr for PrintMode {
    type Err = UnknownPrintMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrintMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or(UnknownPrintMode)
    }
}
