use anyhow::Result;
use config_assert::core::suite::StepStatus;
use config_assert::utils::validation::Validate;
use config_assert::{run_suite, ConfigFixture, RunOptions, SuiteConfig};
use tempfile::TempDir;

const FIXTURE: &str = r#"
[global.cache]
enabled = true
lifetime = 3600

[default.currency.options]
allow = ["USD", "EUR"]

[modules.Foo_Bar]
active = true
codePool = "community"
version = "1.2.0"

[modules.Foo_Bar.depends]
Foo_Baz = ""
"#;

const SUITE: &str = r#"
[suite]
name = "foo-bar configuration"
description = "Checks the Foo_Bar module declaration and cache settings"
module = "Foo_Bar"

[[assertions]]
assert = "config_node_value"
path = "global/cache/enabled"
expected = true
message = "cache must be enabled"

[[assertions]]
assert = "config_node_greater_than_or_equals"
path = "global/cache/lifetime"
expected = 3600

[[assertions]]
assert = "config_node_contains_value"
path = "default/currency/options/allow"
expected = "EUR"

[[assertions]]
assert = "config_node_not_contains_value"
path = "default/currency/options/allow"
expected = "JPY"

[[assertions]]
assert = "config_node_has_child"
path = "global"
expected = "cache"

[[assertions]]
assert = "config_node_structure"
path = "global/cache"
expected = { enabled = "1", lifetime = "3600" }

[[assertions]]
assert = "module_is_active"

[[assertions]]
assert = "module_depends"
expected = "Foo_Baz"

[[assertions]]
assert = "module_version_greater_than"
expected = "1.1.0"

[[assertions]]
assert = "module_version_less_than_or_equals"
expected = "1.2.0"
"#;

/// 由檔案載入 fixture 與斷言套件並執行
#[test]
fn test_suite_from_files_passes() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let fixture_path = temp_dir.path().join("config.toml");
    let suite_path = temp_dir.path().join("assertions.toml");
    std::fs::write(&fixture_path, FIXTURE)?;
    std::fs::write(&suite_path, SUITE)?;

    let fixture = ConfigFixture::from_file(&fixture_path)?;
    let suite = SuiteConfig::from_file(&suite_path)?;
    suite.validate()?;

    let report = run_suite(&fixture, &suite, &RunOptions::default());

    let failures: Vec<_> = report
        .results
        .iter()
        .filter(|r| r.status != StepStatus::Passed)
        .collect();
    assert!(failures.is_empty(), "unexpected failures: {:?}", failures);
    assert_eq!(report.passed, 10);
    assert!(report.is_success());
    Ok(())
}

#[test]
fn test_suite_against_json_fixture() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let fixture_path = temp_dir.path().join("config.json");
    std::fs::write(
        &fixture_path,
        serde_json::json!({
            "global": {"cache": {"enabled": "0", "lifetime": 60}},
            "modules": {"Foo_Bar": {"active": "1", "codePool": "core", "version": "1.2.0"}}
        })
        .to_string(),
    )?;

    let fixture = ConfigFixture::from_file(&fixture_path)?;
    let suite = SuiteConfig::from_toml_str(SUITE)?;
    let report = run_suite(&fixture, &suite, &RunOptions::default());

    assert!(!report.is_success());
    let failed: Vec<usize> = report
        .results
        .iter()
        .filter(|r| r.status == StepStatus::Failed)
        .map(|r| r.index)
        .collect();
    // not_contains_value passes on a missing node
    assert_eq!(failed, vec![0, 1, 2, 5, 7]);
    assert_eq!(report.passed, 5);
    Ok(())
}

#[test]
fn test_fail_fast_from_suite_declaration() -> Result<()> {
    let fixture = ConfigFixture::from_toml_str(FIXTURE)?;
    let suite = SuiteConfig::from_toml_str(
        r#"
[suite]
name = "stops early"
fail_fast = true

[[assertions]]
assert = "config_node_value"
path = "global/cache/enabled"
expected = "0"

[[assertions]]
assert = "config_node_has_children"
path = "global"
"#,
    )?;

    let report = run_suite(&fixture, &suite, &RunOptions::default());
    assert_eq!(report.failed, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.results[1].status, StepStatus::Skipped);
    Ok(())
}

#[test]
fn test_module_override_for_suite_without_module() -> Result<()> {
    let fixture = ConfigFixture::from_toml_str(FIXTURE)?;
    let suite = SuiteConfig::from_toml_str(
        r#"
[suite]
name = "module from the command line"

[[assertions]]
assert = "module_is_active"

[[assertions]]
assert = "module_code_pool"
expected = "community"
"#,
    )?;

    assert!(suite.validate().is_err());
    suite.validate_with_module(Some("Foo_Bar"))?;

    let options = RunOptions {
        module: Some("Foo_Bar".to_string()),
        fail_fast: false,
    };
    let report = run_suite(&fixture, &suite, &options);
    assert!(report.is_success());
    assert_eq!(report.passed, 2);
    Ok(())
}
