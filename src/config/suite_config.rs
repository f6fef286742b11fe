use crate::config::toml_config::{node_from_toml_table, parse_fragment, toml_scalar_text};
use crate::core::constraint::ExpectedValue;
use crate::core::kind::ComparisonKind;
use crate::utils::error::{AssertError, Result};
use crate::utils::validation::{
    validate_module_name, validate_node_path, validate_non_empty_string, validate_required_field,
    Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest integer magnitude an `f64` operand holds exactly.
const MAX_EXACT_INTEGER: u64 = 1 << 53;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub suite: SuiteInfo,
    #[serde(default)]
    pub assertions: Vec<AssertionStep>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteInfo {
    pub name: String,
    pub description: Option<String>,
    pub module: Option<String>, // 預設的受測模組
    pub fail_fast: Option<bool>,
}

/// Which helper a step runs, named after the helper without its `assert_` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssertionName {
    ConfigNodeValue,
    ConfigNodeNotValue,
    ConfigNodeHasChild,
    ConfigNodeNotHasChild,
    ConfigNodeHasChildren,
    ConfigNodeNotHasChildren,
    ConfigNodeContainsValue,
    ConfigNodeNotContainsValue,
    ConfigNodeStructure,
    ConfigNodeNotStructure,
    ConfigNodeLessThan,
    ConfigNodeLessThanOrEquals,
    ConfigNodeGreaterThan,
    ConfigNodeGreaterThanOrEquals,
    ModuleIsActive,
    ModuleIsNotActive,
    ModuleCodePool,
    ModuleDepends,
    ModuleNotDepends,
    ModuleVersion,
    ModuleVersionNot,
    ModuleVersionLessThan,
    ModuleVersionLessThanOrEquals,
    ModuleVersionGreaterThan,
    ModuleVersionGreaterThanOrEquals,
}

impl AssertionName {
    pub fn is_node_assertion(&self) -> bool {
        matches!(
            self,
            AssertionName::ConfigNodeValue
                | AssertionName::ConfigNodeNotValue
                | AssertionName::ConfigNodeHasChild
                | AssertionName::ConfigNodeNotHasChild
                | AssertionName::ConfigNodeHasChildren
                | AssertionName::ConfigNodeNotHasChildren
                | AssertionName::ConfigNodeContainsValue
                | AssertionName::ConfigNodeNotContainsValue
                | AssertionName::ConfigNodeStructure
                | AssertionName::ConfigNodeNotStructure
                | AssertionName::ConfigNodeLessThan
                | AssertionName::ConfigNodeLessThanOrEquals
                | AssertionName::ConfigNodeGreaterThan
                | AssertionName::ConfigNodeGreaterThanOrEquals
        )
    }

    pub fn takes_expected(&self) -> bool {
        !matches!(
            self,
            AssertionName::ConfigNodeHasChildren
                | AssertionName::ConfigNodeNotHasChildren
                | AssertionName::ModuleIsActive
                | AssertionName::ModuleIsNotActive
        )
    }

    pub fn takes_kind(&self) -> bool {
        matches!(
            self,
            AssertionName::ConfigNodeValue | AssertionName::ConfigNodeNotValue
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionStep {
    #[serde(rename = "assert")]
    pub assertion: AssertionName,
    pub path: Option<String>,
    pub expected: Option<toml::Value>,
    pub kind: Option<ComparisonKind>,
    pub module: Option<String>, // 覆寫此步驟的受測模組
    #[serde(default)]
    pub message: String,
}

impl AssertionStep {
    /// Locator shown in reports: the node path or module name, if any.
    pub fn target(&self) -> String {
        match (&self.path, &self.module) {
            (Some(path), _) => path.clone(),
            (None, Some(module)) => module.clone(),
            (None, None) => String::new(),
        }
    }

    pub fn path(&self) -> Result<&str> {
        validate_required_field("path", &self.path).map(String::as_str)
    }

    /// The expected operand converted for the comparison this step runs.
    ///
    /// Tables become structure fragments, as do strings given to structure
    /// assertions (parsed as TOML).
    pub fn expected_value(&self) -> Result<Option<ExpectedValue>> {
        let Some(value) = &self.expected else {
            return Ok(None);
        };

        let structural = matches!(
            self.assertion,
            AssertionName::ConfigNodeStructure | AssertionName::ConfigNodeNotStructure
        ) || self.kind == Some(ComparisonKind::EqualsStructure);

        let expected = match value {
            toml::Value::Table(table) => ExpectedValue::Structure(node_from_toml_table("", table)),
            toml::Value::String(text) if structural => {
                ExpectedValue::Structure(parse_fragment(text)?)
            }
            toml::Value::Integer(i) if i.unsigned_abs() > MAX_EXACT_INTEGER => {
                return Err(AssertError::InvalidExpectedValue {
                    kind: format!("{:?}", self.assertion),
                    reason: format!("integer {} exceeds ±2^53 and cannot be compared exactly", i),
                })
            }
            toml::Value::Integer(i) => ExpectedValue::Number(*i as f64),
            toml::Value::Float(f) => ExpectedValue::Number(*f),
            other => ExpectedValue::Text(toml_scalar_text(other)),
        };
        Ok(Some(expected))
    }

    /// The expected operand as plain text, for helpers that take a name or version.
    pub fn expected_text(&self) -> Result<String> {
        let value = validate_required_field("expected", &self.expected)?;
        Ok(toml_scalar_text(value))
    }
}

impl SuiteConfig {
    /// 從 TOML 檔案載入斷言套件
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AssertError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AssertError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn fail_fast(&self) -> bool {
        self.suite.fail_fast.unwrap_or(false)
    }

    /// Validates the suite as it will run when `module` overrides its declared module.
    pub fn validate_with_module(&self, module: Option<&str>) -> Result<()> {
        validate_non_empty_string("suite.name", &self.suite.name)?;
        for (field, name) in [("module", module), ("suite.module", self.suite.module.as_deref())] {
            if let Some(name) = name {
                validate_module_name(name).map_err(|e| AssertError::ConfigValidationError {
                    field: field.to_string(),
                    message: e.to_string(),
                })?;
            }
        }

        let default_module = module.or(self.suite.module.as_deref());
        for (index, step) in self.assertions.iter().enumerate() {
            validate_step(index, step, default_module)?;
        }
        Ok(())
    }
}

fn validate_step(index: usize, step: &AssertionStep, default_module: Option<&str>) -> Result<()> {
    let field = |name: &str| format!("assertions[{}].{}", index, name);

    if step.assertion.is_node_assertion() {
        let path = validate_required_field(&field("path"), &step.path)?;
        validate_node_path(path).map_err(|e| AssertError::ConfigValidationError {
            field: field("path"),
            message: e.to_string(),
        })?;
    } else if step.module.is_none() && default_module.is_none() {
        return Err(AssertError::MissingConfigError {
            field: field("module"),
        });
    }

    if let Some(module) = &step.module {
        validate_module_name(module).map_err(|e| AssertError::ConfigValidationError {
            field: field("module"),
            message: e.to_string(),
        })?;
    }

    // value/not_value 以外的斷言不接受 kind 覆寫
    if step.kind.is_some() && !step.assertion.takes_kind() {
        return Err(AssertError::ConfigValidationError {
            field: field("kind"),
            message: format!("{:?} does not accept a comparison kind", step.assertion),
        });
    }

    let takes_expected = match step.kind {
        Some(kind) => kind.requires_expected(),
        None => step.assertion.takes_expected(),
    };
    match (takes_expected, &step.expected) {
        (true, None) => {
            return Err(AssertError::MissingConfigError {
                field: field("expected"),
            })
        }
        (false, Some(_)) => {
            return Err(AssertError::ConfigValidationError {
                field: field("expected"),
                message: format!("{:?} does not take an expected value", step.assertion),
            })
        }
        _ => {}
    }

    step.expected_value()
        .map(|_| ())
        .map_err(|e| AssertError::ConfigValidationError {
            field: field("expected"),
            message: e.to_string(),
        })
}

impl Validate for SuiteConfig {
    fn validate(&self) -> Result<()> {
        self.validate_with_module(None)
    }
}
