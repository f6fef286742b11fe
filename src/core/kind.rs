use crate::utils::error::{AssertError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a single constraint compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonKind {
    #[serde(rename = "string")]
    EqualsString,
    #[serde(rename = "number")]
    EqualsNumber,
    #[serde(rename = "structure")]
    EqualsStructure,
    #[serde(rename = "child")]
    HasChild,
    #[serde(rename = "children")]
    HasChildren,
    #[serde(rename = "contains")]
    ContainsValue,
    #[serde(rename = "lt")]
    LessThan,
    #[serde(rename = "gt")]
    GreaterThan,
    #[serde(rename = "active")]
    IsActive,
    CodePool,
    Depends,
    #[serde(rename = "version")]
    EqualsVersion,
    #[serde(rename = "version_lt")]
    LessThanVersion,
    #[serde(rename = "version_gt")]
    GreaterThanVersion,
}

/// The kind of operand a comparison needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    None,
    Text,
    Number,
    Structure,
    Version,
}

impl ComparisonKind {
    pub const ALL: [ComparisonKind; 14] = [
        ComparisonKind::EqualsString,
        ComparisonKind::EqualsNumber,
        ComparisonKind::EqualsStructure,
        ComparisonKind::HasChild,
        ComparisonKind::HasChildren,
        ComparisonKind::ContainsValue,
        ComparisonKind::LessThan,
        ComparisonKind::GreaterThan,
        ComparisonKind::IsActive,
        ComparisonKind::CodePool,
        ComparisonKind::Depends,
        ComparisonKind::EqualsVersion,
        ComparisonKind::LessThanVersion,
        ComparisonKind::GreaterThanVersion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonKind::EqualsString => "string",
            ComparisonKind::EqualsNumber => "number",
            ComparisonKind::EqualsStructure => "structure",
            ComparisonKind::HasChild => "child",
            ComparisonKind::HasChildren => "children",
            ComparisonKind::ContainsValue => "contains",
            ComparisonKind::LessThan => "lt",
            ComparisonKind::GreaterThan => "gt",
            ComparisonKind::IsActive => "active",
            ComparisonKind::CodePool => "code_pool",
            ComparisonKind::Depends => "depends",
            ComparisonKind::EqualsVersion => "version",
            ComparisonKind::LessThanVersion => "version_lt",
            ComparisonKind::GreaterThanVersion => "version_gt",
        }
    }

    pub fn is_node_kind(&self) -> bool {
        matches!(
            self,
            ComparisonKind::EqualsString
                | ComparisonKind::EqualsNumber
                | ComparisonKind::EqualsStructure
                | ComparisonKind::HasChild
                | ComparisonKind::HasChildren
                | ComparisonKind::ContainsValue
                | ComparisonKind::LessThan
                | ComparisonKind::GreaterThan
        )
    }

    pub fn is_module_kind(&self) -> bool {
        !self.is_node_kind()
    }

    pub fn operand(&self) -> Operand {
        match self {
            ComparisonKind::HasChildren | ComparisonKind::IsActive => Operand::None,
            ComparisonKind::EqualsNumber | ComparisonKind::LessThan | ComparisonKind::GreaterThan => {
                Operand::Number
            }
            ComparisonKind::EqualsStructure => Operand::Structure,
            ComparisonKind::EqualsVersion
            | ComparisonKind::LessThanVersion
            | ComparisonKind::GreaterThanVersion => Operand::Version,
            ComparisonKind::EqualsString
            | ComparisonKind::HasChild
            | ComparisonKind::ContainsValue
            | ComparisonKind::CodePool
            | ComparisonKind::Depends => Operand::Text,
        }
    }

    pub fn requires_expected(&self) -> bool {
        self.operand() != Operand::None
    }
}

impl fmt::Display for ComparisonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparisonKind {
    type Err = AssertError;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        ComparisonKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| AssertError::unsupported_kind(needle, "any target"))
    }
}
