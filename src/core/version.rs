use crate::utils::error::{AssertError, Result};
use semver::{BuildMetadata, Prerelease};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A module version made of any number of numeric components.
///
/// Components are compared left to right with missing ones counting as zero,
/// so `1.2`, `1.2.0` and `v1.2.0.0` are the same version. A `-pre` suffix
/// sorts before the release and follows semantic-version pre-release rules;
/// `+build` metadata is accepted and ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModuleVersion {
    raw: String,
    components: Vec<u64>,
    pre: Prerelease,
}

impl ModuleVersion {
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = |reason: String| AssertError::InvalidVersion {
            value: value.to_string(),
            reason,
        };

        let trimmed = value.trim();
        let stripped = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        if stripped.is_empty() {
            return Err(invalid("version cannot be empty".to_string()));
        }

        let rest = match stripped.split_once('+') {
            Some((rest, build)) => {
                BuildMetadata::new(build).map_err(|e| invalid(e.to_string()))?;
                rest
            }
            None => stripped,
        };

        let (core, pre) = match rest.split_once('-') {
            Some((_, "")) => return Err(invalid("empty pre-release".to_string())),
            Some((core, pre)) => (core, Prerelease::new(pre).map_err(|e| invalid(e.to_string()))?),
            None => (rest, Prerelease::EMPTY),
        };

        let components = core
            .split('.')
            .map(|component| {
                component
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("\"{}\" is not a numeric component", component)))
            })
            .collect::<Result<Vec<u64>>>()?;

        Ok(Self {
            raw: trimmed.to_string(),
            components,
            pre,
        })
    }

    pub fn components(&self) -> &[u64] {
        &self.components
    }

    pub fn pre_release(&self) -> &Prerelease {
        &self.pre
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl PartialEq for ModuleVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ModuleVersion {}

impl PartialOrd for ModuleVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModuleVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|index| self.component(index).cmp(&other.component(index)))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or_else(|| self.pre.cmp(&other.pre))
    }
}

impl FromStr for ModuleVersion {
    type Err = AssertError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ModuleVersion {
    type Error = AssertError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ModuleVersion> for String {
    fn from(value: ModuleVersion) -> Self {
        value.raw
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
