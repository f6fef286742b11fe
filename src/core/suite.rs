use crate::config::suite_config::{AssertionName, AssertionStep, SuiteConfig};
use crate::core::assertions::*;
use crate::core::constraint::ExpectedValue;
use crate::core::context::TestContext;
use crate::domain::{ConfigNode, ConfigProvider};
use crate::utils::error::{AssertError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Module under test, taking precedence over the suite's own declaration.
    pub module: Option<String>,
    pub fail_fast: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    Failed,
    Error,
    Skipped,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub index: usize,
    pub assertion: AssertionName,
    pub target: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub suite: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    pub results: Vec<StepResult>,
}

impl SuiteReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0 && self.errors == 0
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }
}

/// Runs every step of `suite` against `config` and collects the outcomes.
///
/// Assertion failures and misuse errors are both recorded per step; with
/// `fail_fast` the remaining steps are reported as skipped.
pub fn run_suite(
    config: &impl ConfigProvider,
    suite: &SuiteConfig,
    options: &RunOptions,
) -> SuiteReport {
    let started_at = Utc::now();
    let fail_fast = options.fail_fast || suite.fail_fast();
    let context = TestContext::new().with_module(
        options
            .module
            .clone()
            .or_else(|| suite.suite.module.clone()),
    );

    tracing::info!(
        "Running suite '{}' ({} assertions)",
        suite.suite.name,
        suite.assertions.len()
    );

    let mut results = Vec::with_capacity(suite.assertions.len());
    let mut stop = false;
    for (index, step) in suite.assertions.iter().enumerate() {
        let (status, detail) = if stop {
            (StepStatus::Skipped, None)
        } else {
            match run_step(config, &context, step) {
                Ok(()) => (StepStatus::Passed, None),
                Err(e) if e.is_assertion_failure() => (StepStatus::Failed, Some(e.to_string())),
                Err(e) => (StepStatus::Error, Some(e.to_string())),
            }
        };

        if matches!(status, StepStatus::Failed | StepStatus::Error) {
            tracing::warn!("Step {} ({:?}) {:?}", index, step.assertion, status);
            stop = fail_fast;
        }

        results.push(StepResult {
            index,
            assertion: step.assertion,
            target: step.target(),
            status,
            detail,
        });
    }

    let count = |status: StepStatus| results.iter().filter(|r| r.status == status).count();
    let report = SuiteReport {
        suite: suite.suite.name.clone(),
        started_at,
        finished_at: Utc::now(),
        passed: count(StepStatus::Passed),
        failed: count(StepStatus::Failed),
        errors: count(StepStatus::Error),
        skipped: count(StepStatus::Skipped),
        results,
    };

    tracing::info!(
        "Suite '{}' finished: {} passed, {} failed, {} errors, {} skipped",
        report.suite,
        report.passed,
        report.failed,
        report.errors,
        report.skipped
    );
    report
}

/// Dispatches a single step to its assertion helper.
pub fn run_step(
    config: &impl ConfigProvider,
    context: &TestContext,
    step: &AssertionStep,
) -> Result<()> {
    let message = step.message.as_str();
    let module = step.module.as_deref();

    match step.assertion {
        AssertionName::ConfigNodeValue => match step.kind {
            Some(kind) => {
                assert_config_node_value_with(config, step.path()?, step.expected_value()?, message, kind)
            }
            None => assert_config_node_value(config, step.path()?, required(step)?, message),
        },
        AssertionName::ConfigNodeNotValue => match step.kind {
            Some(kind) => assert_config_node_not_value_with(
                config,
                step.path()?,
                step.expected_value()?,
                message,
                kind,
            ),
            None => assert_config_node_not_value(config, step.path()?, required(step)?, message),
        },
        AssertionName::ConfigNodeHasChild => {
            assert_config_node_has_child(config, step.path()?, &step.expected_text()?, message)
        }
        AssertionName::ConfigNodeNotHasChild => {
            assert_config_node_not_has_child(config, step.path()?, &step.expected_text()?, message)
        }
        AssertionName::ConfigNodeHasChildren => {
            assert_config_node_has_children(config, step.path()?, message)
        }
        AssertionName::ConfigNodeNotHasChildren => {
            assert_config_node_not_has_children(config, step.path()?, message)
        }
        AssertionName::ConfigNodeContainsValue => {
            assert_config_node_contains_value(config, step.path()?, required(step)?, message)
        }
        AssertionName::ConfigNodeNotContainsValue => {
            assert_config_node_not_contains_value(config, step.path()?, required(step)?, message)
        }
        AssertionName::ConfigNodeStructure => {
            assert_config_node_structure(config, step.path()?, &structure(step)?, message)
        }
        AssertionName::ConfigNodeNotStructure => {
            assert_config_node_not_structure(config, step.path()?, &structure(step)?, message)
        }
        AssertionName::ConfigNodeLessThan => {
            assert_config_node_less_than(config, step.path()?, required(step)?, message)
        }
        AssertionName::ConfigNodeLessThanOrEquals => {
            assert_config_node_less_than_or_equals(config, step.path()?, required(step)?, message)
        }
        AssertionName::ConfigNodeGreaterThan => {
            assert_config_node_greater_than(config, step.path()?, required(step)?, message)
        }
        AssertionName::ConfigNodeGreaterThanOrEquals => assert_config_node_greater_than_or_equals(
            config,
            step.path()?,
            required(step)?,
            message,
        ),
        AssertionName::ModuleIsActive => assert_module_is_active(config, context, message, module),
        AssertionName::ModuleIsNotActive => {
            assert_module_is_not_active(config, context, message, module)
        }
        AssertionName::ModuleCodePool => {
            assert_module_code_pool(config, context, &step.expected_text()?, message, module)
        }
        AssertionName::ModuleDepends => {
            assert_module_depends(config, context, &step.expected_text()?, message, module)
        }
        AssertionName::ModuleNotDepends => {
            assert_module_not_depends(config, context, &step.expected_text()?, message, module)
        }
        AssertionName::ModuleVersion => {
            assert_module_version(config, context, &step.expected_text()?, message, module)
        }
        AssertionName::ModuleVersionNot => {
            assert_module_version_not(config, context, &step.expected_text()?, message, module)
        }
        AssertionName::ModuleVersionLessThan => {
            assert_module_version_less_than(config, context, &step.expected_text()?, message, module)
        }
        AssertionName::ModuleVersionLessThanOrEquals => assert_module_version_less_than_or_equals(
            config,
            context,
            &step.expected_text()?,
            message,
            module,
        ),
        AssertionName::ModuleVersionGreaterThan => assert_module_version_greater_than(
            config,
            context,
            &step.expected_text()?,
            message,
            module,
        ),
        AssertionName::ModuleVersionGreaterThanOrEquals => {
            assert_module_version_greater_than_or_equals(
                config,
                context,
                &step.expected_text()?,
                message,
                module,
            )
        }
    }
}

fn required(step: &AssertionStep) -> Result<ExpectedValue> {
    step.expected_value()?
        .ok_or_else(|| AssertError::MissingConfigError {
            field: "expected".to_string(),
        })
}

fn structure(step: &AssertionStep) -> Result<ConfigNode> {
    match required(step)? {
        ExpectedValue::Structure(node) => Ok(node),
        other => Err(AssertError::InvalidExpectedValue {
            kind: "structure".to_string(),
            reason: format!("expected a table, got \"{}\"", other.render()),
        }),
    }
}
