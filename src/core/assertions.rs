//! Assertion helpers for configuration values and module declarations.
//!
//! Each helper builds a [`Constraint`] and hands it to [`assert_that`] with
//! the live configuration root as subject. Failures come back as
//! [`AssertError::AssertionFailed`] carrying the caller's message and an
//! expected/actual diff; misuse (bad path, wrong operand) is reported before
//! anything is evaluated.
//!
//! Module helpers take an optional module name. When it is `None` the name
//! declared by the test's [`ModuleContext`] is used.
//!
//! [`AssertError::AssertionFailed`]: crate::utils::error::AssertError::AssertionFailed

use crate::core::constraint::{
    config_module, config_node, logical_not, logical_or, Constraint, ExpectedValue,
};
use crate::core::context::resolve_module_name;
use crate::core::kind::ComparisonKind;
use crate::core::matcher::assert_that;
use crate::domain::{ConfigNode, ConfigProvider, ModuleContext};
use crate::utils::error::Result;

/// Evaluates `constraint` against the configuration root of `config`.
pub fn assert_that_config(
    config: &impl ConfigProvider,
    constraint: &Constraint,
    message: &str,
) -> Result<()> {
    assert_that(config.config_root(), constraint, message)
}

pub fn assert_config_node_value(
    config: &impl ConfigProvider,
    path: &str,
    expected: impl Into<ExpectedValue>,
    message: &str,
) -> Result<()> {
    assert_config_node_value_with(
        config,
        path,
        Some(expected.into()),
        message,
        ComparisonKind::EqualsString,
    )
}

/// [`assert_config_node_value`] with an explicit comparison kind.
pub fn assert_config_node_value_with(
    config: &impl ConfigProvider,
    path: &str,
    expected: Option<ExpectedValue>,
    message: &str,
    kind: ComparisonKind,
) -> Result<()> {
    assert_that_config(config, &config_node(path, kind, expected)?, message)
}

pub fn assert_config_node_not_value(
    config: &impl ConfigProvider,
    path: &str,
    expected: impl Into<ExpectedValue>,
    message: &str,
) -> Result<()> {
    assert_config_node_not_value_with(
        config,
        path,
        Some(expected.into()),
        message,
        ComparisonKind::EqualsString,
    )
}

pub fn assert_config_node_not_value_with(
    config: &impl ConfigProvider,
    path: &str,
    expected: Option<ExpectedValue>,
    message: &str,
    kind: ComparisonKind,
) -> Result<()> {
    assert_that_config(
        config,
        &logical_not(config_node(path, kind, expected)?),
        message,
    )
}

pub fn assert_config_node_has_child(
    config: &impl ConfigProvider,
    path: &str,
    child_name: &str,
    message: &str,
) -> Result<()> {
    assert_config_node_value_with(
        config,
        path,
        Some(child_name.into()),
        message,
        ComparisonKind::HasChild,
    )
}

pub fn assert_config_node_not_has_child(
    config: &impl ConfigProvider,
    path: &str,
    child_name: &str,
    message: &str,
) -> Result<()> {
    assert_config_node_not_value_with(
        config,
        path,
        Some(child_name.into()),
        message,
        ComparisonKind::HasChild,
    )
}

pub fn assert_config_node_has_children(
    config: &impl ConfigProvider,
    path: &str,
    message: &str,
) -> Result<()> {
    assert_config_node_value_with(config, path, None, message, ComparisonKind::HasChildren)
}

pub fn assert_config_node_not_has_children(
    config: &impl ConfigProvider,
    path: &str,
    message: &str,
) -> Result<()> {
    assert_config_node_not_value_with(config, path, None, message, ComparisonKind::HasChildren)
}

/// Asserts that `expected` is one of the items of the node's comma separated value.
pub fn assert_config_node_contains_value(
    config: &impl ConfigProvider,
    path: &str,
    expected: impl Into<ExpectedValue>,
    message: &str,
) -> Result<()> {
    assert_config_node_value_with(
        config,
        path,
        Some(expected.into()),
        message,
        ComparisonKind::ContainsValue,
    )
}

pub fn assert_config_node_not_contains_value(
    config: &impl ConfigProvider,
    path: &str,
    expected: impl Into<ExpectedValue>,
    message: &str,
) -> Result<()> {
    assert_config_node_not_value_with(
        config,
        path,
        Some(expected.into()),
        message,
        ComparisonKind::ContainsValue,
    )
}

/// Asserts that the node has the same structure as `expected`.
///
/// The name of `expected` itself is ignored; values must match and children
/// may appear in any order.
pub fn assert_config_node_structure(
    config: &impl ConfigProvider,
    path: &str,
    expected: &ConfigNode,
    message: &str,
) -> Result<()> {
    assert_config_node_value_with(
        config,
        path,
        Some(ExpectedValue::Structure(expected.clone())),
        message,
        ComparisonKind::EqualsStructure,
    )
}

pub fn assert_config_node_not_structure(
    config: &impl ConfigProvider,
    path: &str,
    expected: &ConfigNode,
    message: &str,
) -> Result<()> {
    assert_config_node_not_value_with(
        config,
        path,
        Some(ExpectedValue::Structure(expected.clone())),
        message,
        ComparisonKind::EqualsStructure,
    )
}

pub fn assert_config_node_less_than(
    config: &impl ConfigProvider,
    path: &str,
    expected: impl Into<ExpectedValue>,
    message: &str,
) -> Result<()> {
    assert_config_node_value_with(
        config,
        path,
        Some(expected.into()),
        message,
        ComparisonKind::LessThan,
    )
}

pub fn assert_config_node_less_than_or_equals(
    config: &impl ConfigProvider,
    path: &str,
    expected: impl Into<ExpectedValue>,
    message: &str,
) -> Result<()> {
    let constraint = node_or_equals(path, expected.into(), ComparisonKind::LessThan)?;
    assert_that_config(config, &constraint, message)
}

pub fn assert_config_node_greater_than(
    config: &impl ConfigProvider,
    path: &str,
    expected: impl Into<ExpectedValue>,
    message: &str,
) -> Result<()> {
    assert_config_node_value_with(
        config,
        path,
        Some(expected.into()),
        message,
        ComparisonKind::GreaterThan,
    )
}

pub fn assert_config_node_greater_than_or_equals(
    config: &impl ConfigProvider,
    path: &str,
    expected: impl Into<ExpectedValue>,
    message: &str,
) -> Result<()> {
    let constraint = node_or_equals(path, expected.into(), ComparisonKind::GreaterThan)?;
    assert_that_config(config, &constraint, message)
}

// There is no native "<=" / ">=" kind: equality is or-ed with the strict comparison.
fn node_or_equals(path: &str, expected: ExpectedValue, strict: ComparisonKind) -> Result<Constraint> {
    Ok(logical_or(
        config_node(path, ComparisonKind::EqualsNumber, Some(expected.clone()))?,
        config_node(path, strict, Some(expected))?,
    ))
}

fn module_or_equals(module: &str, expected: &str, strict: ComparisonKind) -> Result<Constraint> {
    Ok(logical_or(
        config_module(module, ComparisonKind::EqualsVersion, Some(expected.into()))?,
        config_module(module, strict, Some(expected.into()))?,
    ))
}

fn assert_module(
    config: &impl ConfigProvider,
    context: &impl ModuleContext,
    module_name: Option<&str>,
    message: &str,
    build: impl FnOnce(&str) -> Result<Constraint>,
) -> Result<()> {
    let module = resolve_module_name(context, module_name)?;
    tracing::debug!(module, "checking module declaration");
    assert_that_config(config, &build(module)?, message)
}

pub fn assert_module_is_active(
    config: &impl ConfigProvider,
    context: &impl ModuleContext,
    message: &str,
    module_name: Option<&str>,
) -> Result<()> {
    assert_module(config, context, module_name, message, |module| {
        config_module(module, ComparisonKind::IsActive, None)
    })
}

pub fn assert_module_is_not_active(
    config: &impl ConfigProvider,
    context: &impl ModuleContext,
    message: &str,
    module_name: Option<&str>,
) -> Result<()> {
    assert_module(config, context, module_name, message, |module| {
        Ok(logical_not(config_module(module, ComparisonKind::IsActive, None)?))
    })
}

pub fn assert_module_code_pool(
    config: &impl ConfigProvider,
    context: &impl ModuleContext,
    expected: &str,
    message: &str,
    module_name: Option<&str>,
) -> Result<()> {
    assert_module(config, context, module_name, message, |module| {
        config_module(module, ComparisonKind::CodePool, Some(expected.into()))
    })
}

pub fn assert_module_depends(
    config: &impl ConfigProvider,
    context: &impl ModuleContext,
    required_module: &str,
    message: &str,
    module_name: Option<&str>,
) -> Result<()> {
    assert_module(config, context, module_name, message, |module| {
        config_module(module, ComparisonKind::Depends, Some(required_module.into()))
    })
}

pub fn assert_module_not_depends(
    config: &impl ConfigProvider,
    context: &impl ModuleContext,
    required_module: &str,
    message: &str,
    module_name: Option<&str>,
) -> Result<()> {
    assert_module(config, context, module_name, message, |module| {
        Ok(logical_not(config_module(
            module,
            ComparisonKind::Depends,
            Some(required_module.into()),
        )?))
    })
}

pub fn assert_module_version(
    config: &impl ConfigProvider,
    context: &impl ModuleContext,
    expected_version: &str,
    message: &str,
    module_name: Option<&str>,
) -> Result<()> {
    assert_module(config, context, module_name, message, |module| {
        config_module(module, ComparisonKind::EqualsVersion, Some(expected_version.into()))
    })
}

pub fn assert_module_version_not(
    config: &impl ConfigProvider,
    context: &impl ModuleContext,
    expected_version: &str,
    message: &str,
    module_name: Option<&str>,
) -> Result<()> {
    assert_module(config, context, module_name, message, |module| {
        Ok(logical_not(config_module(
            module,
            ComparisonKind::EqualsVersion,
            Some(expected_version.into()),
        )?))
    })
}

pub fn assert_module_version_less_than(
    config: &impl ConfigProvider,
    context: &impl ModuleContext,
    expected_version: &str,
    message: &str,
    module_name: Option<&str>,
) -> Result<()> {
    assert_module(config, context, module_name, message, |module| {
        config_module(module, ComparisonKind::LessThanVersion, Some(expected_version.into()))
    })
}

pub fn assert_module_version_less_than_or_equals(
    config: &impl ConfigProvider,
    context: &impl ModuleContext,
    expected_version: &str,
    message: &str,
    module_name: Option<&str>,
) -> Result<()> {
    assert_module(config, context, module_name, message, |module| {
        module_or_equals(module, expected_version, ComparisonKind::LessThanVersion)
    })
}

pub fn assert_module_version_greater_than(
    config: &impl ConfigProvider,
    context: &impl ModuleContext,
    expected_version: &str,
    message: &str,
    module_name: Option<&str>,
) -> Result<()> {
    assert_module(config, context, module_name, message, |module| {
        config_module(module, ComparisonKind::GreaterThanVersion, Some(expected_version.into()))
    })
}

pub fn assert_module_version_greater_than_or_equals(
    config: &impl ConfigProvider,
    context: &impl ModuleContext,
    expected_version: &str,
    message: &str,
    module_name: Option<&str>,
) -> Result<()> {
    assert_module(config, context, module_name, message, |module| {
        module_or_equals(module, expected_version, ComparisonKind::GreaterThanVersion)
    })
}
