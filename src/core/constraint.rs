//! Constraints over the configuration tree and module declarations.
//!
//! A [`Constraint`] is either a single comparison ([`Constraint::Leaf`]) or a
//! logical combination of other constraints. Leaves are built through
//! [`config_node`] and [`config_module`], which reject kinds that do not fit
//! the target and operands that do not fit the kind, so evaluation never has
//! to deal with malformed input coming from those constructors.

use crate::core::kind::{ComparisonKind, Operand};
use crate::core::matcher::{Evaluation, Matcher};
use crate::core::version::ModuleVersion;
use crate::domain::{split_list, ConfigNode, ModuleDescriptor, ModuleRegistry};
use crate::utils::error::{AssertError, Result};
use crate::utils::validation::{validate_module_name, validate_node_path};
use std::fmt;

/// The operand a comparison is checked against.
#[derive(Debug, Clone, PartialEq)]
pub enum ExpectedValue {
    Text(String),
    Number(f64),
    Structure(ConfigNode),
    Version(ModuleVersion),
}

impl ExpectedValue {
    pub fn render(&self) -> String {
        match self {
            ExpectedValue::Text(text) => text.clone(),
            ExpectedValue::Number(number) => number.to_string(),
            ExpectedValue::Structure(node) => node.to_string(),
            ExpectedValue::Version(version) => version.to_string(),
        }
    }
}

impl From<&str> for ExpectedValue {
    fn from(value: &str) -> Self {
        ExpectedValue::Text(value.to_string())
    }
}

impl From<String> for ExpectedValue {
    fn from(value: String) -> Self {
        ExpectedValue::Text(value)
    }
}

impl From<&String> for ExpectedValue {
    fn from(value: &String) -> Self {
        ExpectedValue::Text(value.clone())
    }
}

impl From<bool> for ExpectedValue {
    fn from(value: bool) -> Self {
        ExpectedValue::Text(if value { "1" } else { "0" }.to_string())
    }
}

impl From<f64> for ExpectedValue {
    fn from(value: f64) -> Self {
        ExpectedValue::Number(value)
    }
}

impl From<i32> for ExpectedValue {
    fn from(value: i32) -> Self {
        ExpectedValue::Number(f64::from(value))
    }
}

impl From<u32> for ExpectedValue {
    fn from(value: u32) -> Self {
        ExpectedValue::Number(f64::from(value))
    }
}

impl From<ConfigNode> for ExpectedValue {
    fn from(value: ConfigNode) -> Self {
        ExpectedValue::Structure(value)
    }
}

impl From<ModuleVersion> for ExpectedValue {
    fn from(value: ModuleVersion) -> Self {
        ExpectedValue::Version(value)
    }
}

/// What a leaf constraint looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Node(String),
    Module(String),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Node(path) => write!(f, "config node \"{}\"", path),
            Target::Module(name) => write!(f, "module \"{}\"", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Leaf {
        target: Target,
        kind: ComparisonKind,
        expected: Option<ExpectedValue>,
    },
    Not(Box<Constraint>),
    Or(Box<Constraint>, Box<Constraint>),
}

/// Builds a constraint on the node at `path`.
pub fn config_node(
    path: &str,
    kind: ComparisonKind,
    expected: Option<ExpectedValue>,
) -> Result<Constraint> {
    validate_node_path(path)?;
    if !kind.is_node_kind() {
        return Err(AssertError::unsupported_kind(kind, "config nodes"));
    }

    Ok(Constraint::Leaf {
        target: Target::Node(path.to_string()),
        kind,
        expected: coerce_expected(kind, expected)?,
    })
}

/// Builds a constraint on the declaration of `module_name`.
pub fn config_module(
    module_name: &str,
    kind: ComparisonKind,
    expected: Option<ExpectedValue>,
) -> Result<Constraint> {
    validate_module_name(module_name)?;
    if !kind.is_module_kind() {
        return Err(AssertError::unsupported_kind(kind, "modules"));
    }

    Ok(Constraint::Leaf {
        target: Target::Module(module_name.to_string()),
        kind,
        expected: coerce_expected(kind, expected)?,
    })
}

pub fn logical_not(constraint: Constraint) -> Constraint {
    Constraint::Not(Box::new(constraint))
}

pub fn logical_or(left: Constraint, right: Constraint) -> Constraint {
    Constraint::Or(Box::new(left), Box::new(right))
}

/// Checks the operand against what `kind` needs, converting where the
/// conversion is lossless (numeric text to a number, text to a version).
fn coerce_expected(
    kind: ComparisonKind,
    expected: Option<ExpectedValue>,
) -> Result<Option<ExpectedValue>> {
    let invalid = |reason: String| AssertError::InvalidExpectedValue {
        kind: kind.to_string(),
        reason,
    };

    let value = match (kind.operand(), expected) {
        (Operand::None, None) => return Ok(None),
        (Operand::None, Some(_)) => {
            return Err(AssertError::UnexpectedValue {
                kind: kind.to_string(),
            })
        }
        (_, None) => {
            return Err(AssertError::MissingExpectedValue {
                kind: kind.to_string(),
            })
        }
        (operand, Some(value)) => (operand, value),
    };

    let coerced = match value {
        (Operand::Text, ExpectedValue::Text(text)) => ExpectedValue::Text(text),
        (Operand::Text, ExpectedValue::Number(number)) => ExpectedValue::Text(number.to_string()),
        (Operand::Text, ExpectedValue::Version(version)) => ExpectedValue::Text(version.to_string()),
        (Operand::Number, ExpectedValue::Number(number)) => ExpectedValue::Number(number),
        (Operand::Number, ExpectedValue::Text(text)) => {
            let number = text
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid(format!("\"{}\" is not a number", text)))?;
            ExpectedValue::Number(number)
        }
        (Operand::Structure, ExpectedValue::Structure(node)) => ExpectedValue::Structure(node),
        (Operand::Version, ExpectedValue::Version(version)) => ExpectedValue::Version(version),
        (Operand::Version, ExpectedValue::Text(text)) => {
            ExpectedValue::Version(ModuleVersion::parse(&text)?)
        }
        (operand, other) => {
            return Err(invalid(format!(
                "expected a {:?} operand, got {}",
                operand,
                operand_name(&other)
            )))
        }
    };

    let rejection = match &coerced {
        ExpectedValue::Number(number) if !number.is_finite() => Some("number must be finite"),
        ExpectedValue::Text(text)
            if matches!(kind, ComparisonKind::HasChild | ComparisonKind::Depends)
                && text.trim().is_empty() =>
        {
            Some("name cannot be empty")
        }
        _ => None,
    };

    match rejection {
        Some(reason) => Err(invalid(reason.to_string())),
        None => Ok(Some(coerced)),
    }
}

fn operand_name(value: &ExpectedValue) -> &'static str {
    match value {
        ExpectedValue::Text(_) => "text",
        ExpectedValue::Number(_) => "a number",
        ExpectedValue::Structure(_) => "a structure",
        ExpectedValue::Version(_) => "a version",
    }
}

fn phrase(kind: ComparisonKind, expected: Option<&ExpectedValue>) -> String {
    let operand = expected.map(ExpectedValue::render).unwrap_or_default();
    match kind {
        ComparisonKind::EqualsString => format!("equals \"{}\"", operand),
        ComparisonKind::EqualsNumber => format!("equals {}", operand),
        ComparisonKind::EqualsStructure => "matches the expected structure".to_string(),
        ComparisonKind::HasChild => format!("has child \"{}\"", operand),
        ComparisonKind::HasChildren => "has children".to_string(),
        ComparisonKind::ContainsValue => format!("contains \"{}\" in its value list", operand),
        ComparisonKind::LessThan => format!("is less than {}", operand),
        ComparisonKind::GreaterThan => format!("is greater than {}", operand),
        ComparisonKind::IsActive => "is active".to_string(),
        ComparisonKind::CodePool => format!("is in code pool \"{}\"", operand),
        ComparisonKind::Depends => format!("depends on \"{}\"", operand),
        ComparisonKind::EqualsVersion => format!("has version \"{}\"", operand),
        ComparisonKind::LessThanVersion => format!("has a version lower than \"{}\"", operand),
        ComparisonKind::GreaterThanVersion => {
            format!("has a version higher than \"{}\"", operand)
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Leaf {
                target,
                kind,
                expected,
            } => write!(f, "{} {}", target, phrase(*kind, expected.as_ref())),
            Constraint::Not(inner) => write!(f, "not ({})", inner),
            Constraint::Or(left, right) => write!(f, "({}) or ({})", left, right),
        }
    }
}

impl Constraint {
    /// Evaluates against `root`, looking modules up in `registry`.
    pub fn evaluate_in(&self, root: &ConfigNode, registry: &dyn ModuleRegistry) -> Evaluation {
        match self {
            Constraint::Leaf {
                target: Target::Node(path),
                kind,
                expected,
            } => evaluate_node(root, path, *kind, expected.as_ref(), self.to_string()),
            Constraint::Leaf {
                target: Target::Module(name),
                kind,
                expected,
            } => evaluate_module(registry, name, *kind, expected.as_ref(), self.to_string()),
            Constraint::Not(inner) => {
                let evaluation = inner.evaluate_in(root, registry);
                Evaluation {
                    satisfied: !evaluation.satisfied,
                    description: format!("not ({})", evaluation.description),
                    expected: evaluation.expected.map(|expected| format!("not {}", expected)),
                    actual: evaluation.actual,
                }
            }
            Constraint::Or(left, right) => {
                let left = left.evaluate_in(root, registry);
                let right = right.evaluate_in(root, registry);
                let expected = match (left.expected, right.expected) {
                    (Some(l), Some(r)) if l == r => Some(l),
                    (Some(l), Some(r)) => Some(format!("{} or {}", l, r)),
                    (l, r) => l.or(r),
                };
                Evaluation {
                    satisfied: left.satisfied || right.satisfied,
                    description: format!("({}) or ({})", left.description, right.description),
                    expected,
                    actual: left.actual.or(right.actual),
                }
            }
        }
    }
}

impl Matcher<ConfigNode> for Constraint {
    fn evaluate(&self, subject: &ConfigNode) -> Evaluation {
        self.evaluate_in(subject, subject)
    }
}

fn evaluate_node(
    root: &ConfigNode,
    path: &str,
    kind: ComparisonKind,
    expected: Option<&ExpectedValue>,
    description: String,
) -> Evaluation {
    let Some(node) = root.node(path) else {
        return Evaluation::new(false, format!("{} (node not found)", description));
    };
    let actual = node.text();

    match (kind, expected) {
        (ComparisonKind::EqualsString, Some(ExpectedValue::Text(text))) => {
            Evaluation::new(actual == text, description).with_diff(text.clone(), actual)
        }
        (ComparisonKind::EqualsNumber, Some(ExpectedValue::Number(number))) => {
            compare_number(actual, *number, description, |a, b| a == b)
        }
        (ComparisonKind::LessThan, Some(ExpectedValue::Number(number))) => {
            compare_number(actual, *number, description, |a, b| a < b)
        }
        (ComparisonKind::GreaterThan, Some(ExpectedValue::Number(number))) => {
            compare_number(actual, *number, description, |a, b| a > b)
        }
        (ComparisonKind::EqualsStructure, Some(ExpectedValue::Structure(structure))) => {
            let mut shown = structure.clone();
            shown.name = node.name.clone();
            Evaluation::new(node.structurally_eq(structure), description)
                .with_diff(shown.to_string(), node.to_string())
        }
        (ComparisonKind::HasChild, Some(ExpectedValue::Text(name))) => {
            let children: Vec<&str> = node.children.iter().map(|c| c.name.as_str()).collect();
            Evaluation::new(node.child(name).is_some(), description)
                .with_diff(name.clone(), children.join(", "))
        }
        (ComparisonKind::HasChildren, None) => Evaluation::new(node.has_children(), description),
        (ComparisonKind::ContainsValue, Some(ExpectedValue::Text(item))) => {
            let contained = split_list(actual).iter().any(|value| value == item);
            Evaluation::new(contained, description).with_diff(item.clone(), actual)
        }
        _ => Evaluation::new(false, format!("{} (invalid operand)", description)),
    }
}

fn compare_number(
    actual: &str,
    expected: f64,
    description: String,
    compare: impl Fn(f64, f64) -> bool,
) -> Evaluation {
    match actual.trim().parse::<f64>() {
        Ok(value) => Evaluation::new(compare(value, expected), description)
            .with_diff(expected.to_string(), actual),
        Err(_) => Evaluation::new(
            false,
            format!("{} (value \"{}\" is not numeric)", description, actual),
        ),
    }
}

fn evaluate_module(
    registry: &dyn ModuleRegistry,
    name: &str,
    kind: ComparisonKind,
    expected: Option<&ExpectedValue>,
    description: String,
) -> Evaluation {
    let Some(module) = registry.module(name) else {
        return Evaluation::new(false, format!("{} (module not registered)", description));
    };

    match (kind, expected) {
        (ComparisonKind::IsActive, None) => Evaluation::new(module.active, description)
            .with_diff("active", if module.active { "active" } else { "inactive" }),
        (ComparisonKind::CodePool, Some(ExpectedValue::Text(pool))) => {
            Evaluation::new(module.code_pool == *pool, description)
                .with_diff(pool.clone(), module.code_pool.clone())
        }
        (ComparisonKind::Depends, Some(ExpectedValue::Text(dependency))) => {
            Evaluation::new(module.has_dependency(dependency), description)
                .with_diff(dependency.clone(), module.depends.join(", "))
        }
        (ComparisonKind::EqualsVersion, Some(ExpectedValue::Version(version))) => {
            compare_version(&module, version, description, |a, b| a == b)
        }
        (ComparisonKind::LessThanVersion, Some(ExpectedValue::Version(version))) => {
            compare_version(&module, version, description, |a, b| a < b)
        }
        (ComparisonKind::GreaterThanVersion, Some(ExpectedValue::Version(version))) => {
            compare_version(&module, version, description, |a, b| a > b)
        }
        _ => Evaluation::new(false, format!("{} (invalid operand)", description)),
    }
}

fn compare_version(
    module: &ModuleDescriptor,
    expected: &ModuleVersion,
    description: String,
    compare: impl Fn(&ModuleVersion, &ModuleVersion) -> bool,
) -> Evaluation {
    let Some(raw) = module.version.as_deref() else {
        return Evaluation::new(false, format!("{} (no version declared)", description));
    };

    match ModuleVersion::parse(raw) {
        Ok(actual) => Evaluation::new(compare(&actual, expected), description)
            .with_diff(expected.to_string(), raw),
        Err(e) => Evaluation::new(false, format!("{} ({})", description, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> ConfigNode {
        let mut root = ConfigNode::new("config");
        root.set_path("global/cache/enabled", "1").unwrap();
        root.set_path("global/cache/lifetime", "3600").unwrap();
        root.set_path("default/allowed/currencies", "USD, EUR,GBP").unwrap();
        root.set_path("default/web/url", "http://shop.test/").unwrap();
        root.insert_module(
            &ModuleDescriptor::new("Foo_Bar")
                .active(true)
                .code_pool("community")
                .version("1.2.0")
                .depends_on("Foo_Baz"),
        )
        .unwrap();
        root.insert_module(&ModuleDescriptor::new("Foo_Old").code_pool("local"))
            .unwrap();
        root
    }

    fn holds(constraint: &Constraint) -> bool {
        constraint.evaluate(&tree()).satisfied
    }

    fn node(path: &str, kind: ComparisonKind, expected: impl Into<ExpectedValue>) -> Constraint {
        config_node(path, kind, Some(expected.into())).unwrap()
    }

    fn module(name: &str, kind: ComparisonKind, expected: impl Into<ExpectedValue>) -> Constraint {
        config_module(name, kind, Some(expected.into())).unwrap()
    }

    #[test]
    fn test_operand_is_absent_exactly_for_operandless_kinds() {
        for kind in ComparisonKind::ALL.into_iter().filter(|k| k.is_node_kind()) {
            let expected = match kind.operand() {
                Operand::None => None,
                Operand::Number => Some(ExpectedValue::Number(1.0)),
                Operand::Structure => Some(ExpectedValue::Structure(ConfigNode::new(""))),
                _ => Some(ExpectedValue::Text("x".to_string())),
            };
            match config_node("a/b", kind, expected).unwrap() {
                Constraint::Leaf { expected, .. } => {
                    assert_eq!(expected.is_none(), kind == ComparisonKind::HasChildren)
                }
                other => panic!("unexpected constraint: {other:?}"),
            }
        }
    }

    #[test]
    fn test_construction_fails_fast() {
        assert!(matches!(
            config_node("a", ComparisonKind::IsActive, None),
            Err(AssertError::UnsupportedKind { .. })
        ));
        assert!(matches!(
            config_module("Foo_Bar", ComparisonKind::HasChildren, None),
            Err(AssertError::UnsupportedKind { .. })
        ));
        assert!(matches!(
            config_node("a", ComparisonKind::EqualsString, None),
            Err(AssertError::MissingExpectedValue { .. })
        ));
        assert!(matches!(
            config_node("a", ComparisonKind::HasChildren, Some("x".into())),
            Err(AssertError::UnexpectedValue { .. })
        ));
        assert!(matches!(
            config_node("a", ComparisonKind::LessThan, Some("ten".into())),
            Err(AssertError::InvalidExpectedValue { .. })
        ));
        assert!(matches!(
            config_node("a", ComparisonKind::EqualsStructure, Some("<a/>".into())),
            Err(AssertError::InvalidExpectedValue { .. })
        ));
        assert!(matches!(
            config_module("Foo_Bar", ComparisonKind::EqualsVersion, Some("1.x".into())),
            Err(AssertError::InvalidVersion { .. })
        ));
        assert!(matches!(
            config_node("", ComparisonKind::HasChildren, None),
            Err(AssertError::InvalidLocator { .. })
        ));
        assert!(matches!(
            config_node("a", ComparisonKind::HasChild, Some(" ".into())),
            Err(AssertError::InvalidExpectedValue { .. })
        ));
    }

    #[test]
    fn test_operand_coercion() {
        match node("a", ComparisonKind::LessThan, "10") {
            Constraint::Leaf { expected, .. } => {
                assert_eq!(expected, Some(ExpectedValue::Number(10.0)))
            }
            other => panic!("unexpected constraint: {other:?}"),
        }
        match node("a", ComparisonKind::EqualsString, 5) {
            Constraint::Leaf { expected, .. } => {
                assert_eq!(expected, Some(ExpectedValue::Text("5".to_string())))
            }
            other => panic!("unexpected constraint: {other:?}"),
        }
    }

    #[test]
    fn test_string_and_number_comparisons() {
        assert!(holds(&node("global/cache/enabled", ComparisonKind::EqualsString, "1")));
        assert!(!holds(&node("global/cache/enabled", ComparisonKind::EqualsString, "0")));
        assert!(holds(&node("global/cache/lifetime", ComparisonKind::EqualsNumber, 3600)));
        assert!(holds(&node("global/cache/lifetime", ComparisonKind::LessThan, 3601)));
        assert!(!holds(&node("global/cache/lifetime", ComparisonKind::LessThan, 3600)));
        assert!(holds(&node("global/cache/lifetime", ComparisonKind::GreaterThan, 60.5)));
        assert!(!holds(&node("default/web/url", ComparisonKind::GreaterThan, 1)));
    }

    #[test]
    fn test_structural_comparisons() {
        assert!(holds(&node("global/cache", ComparisonKind::HasChild, "enabled")));
        assert!(!holds(&node("global/cache", ComparisonKind::HasChild, "backend")));
        assert!(holds(&config_node("global", ComparisonKind::HasChildren, None).unwrap()));
        assert!(!holds(
            &config_node("global/cache/enabled", ComparisonKind::HasChildren, None).unwrap()
        ));

        let fragment = ConfigNode::new("")
            .with_child(ConfigNode::leaf("lifetime", "3600"))
            .with_child(ConfigNode::leaf("enabled", "1"));
        assert!(holds(&node("global/cache", ComparisonKind::EqualsStructure, fragment)));
        let different = ConfigNode::new("").with_child(ConfigNode::leaf("enabled", "1"));
        assert!(!holds(&node("global/cache", ComparisonKind::EqualsStructure, different)));
    }

    #[test]
    fn test_contains_value() {
        assert!(holds(&node("default/allowed/currencies", ComparisonKind::ContainsValue, "EUR")));
        assert!(holds(&node("default/allowed/currencies", ComparisonKind::ContainsValue, "USD")));
        assert!(!holds(&node("default/allowed/currencies", ComparisonKind::ContainsValue, "EU")));
    }

    #[test]
    fn test_missing_node_is_not_satisfied() {
        let evaluation =
            node("global/missing", ComparisonKind::EqualsString, "1").evaluate(&tree());
        assert!(!evaluation.satisfied);
        assert!(evaluation.description.ends_with("(node not found)"));
        assert!(holds(&logical_not(node(
            "global/missing",
            ComparisonKind::EqualsString,
            "1"
        ))));
    }

    #[test]
    fn test_module_comparisons() {
        assert!(holds(&config_module("Foo_Bar", ComparisonKind::IsActive, None).unwrap()));
        assert!(!holds(&config_module("Foo_Old", ComparisonKind::IsActive, None).unwrap()));
        assert!(holds(&module("Foo_Bar", ComparisonKind::CodePool, "community")));
        assert!(!holds(&module("Foo_Bar", ComparisonKind::CodePool, "core")));
        assert!(holds(&module("Foo_Bar", ComparisonKind::Depends, "Foo_Baz")));
        assert!(!holds(&module("Foo_Bar", ComparisonKind::Depends, "Foo_Old")));
        assert!(holds(&module("Foo_Bar", ComparisonKind::EqualsVersion, "1.2")));
        assert!(holds(&module("Foo_Bar", ComparisonKind::GreaterThanVersion, "1.1.0")));
        assert!(!holds(&module("Foo_Bar", ComparisonKind::GreaterThanVersion, "1.2.0")));
        assert!(holds(&module("Foo_Bar", ComparisonKind::LessThanVersion, "1.10.0")));
    }

    #[test]
    fn test_module_without_version_or_registration() {
        let evaluation = module("Foo_Old", ComparisonKind::EqualsVersion, "1.0.0").evaluate(&tree());
        assert!(!evaluation.satisfied);
        assert!(evaluation.description.contains("no version declared"));

        let evaluation = config_module("Foo_Missing", ComparisonKind::IsActive, None)
            .unwrap()
            .evaluate(&tree());
        assert!(!evaluation.satisfied);
        assert!(evaluation.description.ends_with("(module not registered)"));
    }

    #[test]
    fn test_combinators() {
        let equals = node("global/cache/lifetime", ComparisonKind::EqualsNumber, 3600);
        let less = node("global/cache/lifetime", ComparisonKind::LessThan, 3600);
        let greater = node("global/cache/lifetime", ComparisonKind::GreaterThan, 3600);

        assert!(holds(&logical_or(equals.clone(), less.clone())));
        assert!(!holds(&logical_or(less.clone(), greater.clone())));
        assert!(holds(&logical_not(less)));
        assert!(!holds(&logical_not(equals)));
    }

    #[test]
    fn test_descriptions() {
        let constraint = logical_not(node("global/cache/enabled", ComparisonKind::EqualsString, "1"));
        assert_eq!(
            constraint.to_string(),
            "not (config node \"global/cache/enabled\" equals \"1\")"
        );

        let evaluation = constraint.evaluate(&tree());
        assert_eq!(evaluation.expected.as_deref(), Some("not 1"));
        assert_eq!(evaluation.actual.as_deref(), Some("1"));
    }

    struct FixedRegistry(ModuleDescriptor);

    impl ModuleRegistry for FixedRegistry {
        fn module(&self, name: &str) -> Option<ModuleDescriptor> {
            (self.0.name == name).then(|| self.0.clone())
        }
    }

    #[test]
    fn test_evaluate_with_external_registry() {
        let registry = FixedRegistry(ModuleDescriptor::new("Ext_Mod").active(true).version("2.0.0"));
        let root = ConfigNode::new("config");
        let constraint = module("Ext_Mod", ComparisonKind::GreaterThanVersion, "1.9.9");
        assert!(constraint.evaluate_in(&root, &registry).satisfied);
        assert!(!constraint.evaluate(&root).satisfied);
    }
}
