use anyhow::Result;
use config_assert::assertions::*;
use config_assert::config::toml_config::parse_fragment;
use config_assert::{AssertError, ComparisonKind, ConfigFixture, ConfigNode};
use pretty_assertions::assert_eq;

const STORE_CONFIG: &str = r#"
[global.cache]
enabled = "1"
lifetime = 7200

[global.resources.core_setup.setup]
module = "Mage_Core"

[default.catalog.frontend]
grid_per_page = 12
list_mode = "grid-list"

[default.currency.options]
allow = "USD,EUR,GBP"
base = "USD"

[default.design.theme]
"#;

fn store() -> Result<ConfigFixture> {
    Ok(ConfigFixture::from_toml_str(STORE_CONFIG)?)
}

/// 節點值相等: 成功與失敗的差異訊息
#[test]
fn test_node_value_passes_and_fails_with_diff() -> Result<()> {
    let config = store()?;

    assert_config_node_value(&config, "global/cache/enabled", "1", "cache enabled")?;

    let err = assert_config_node_value(&config, "global/cache/enabled", "0", "cache enabled")
        .unwrap_err();
    assert!(err.is_assertion_failure());
    assert_eq!(
        err.to_string(),
        "cache enabled\n\
         Failed asserting that config node \"global/cache/enabled\" equals \"0\".\n\
         --- Expected\n\
         +++ Actual\n\
         -0\n\
         +1"
    );
    Ok(())
}

#[test]
fn test_node_not_value() -> Result<()> {
    let config = store()?;

    assert_config_node_not_value(&config, "global/cache/enabled", "0", "")?;
    assert!(assert_config_node_not_value(&config, "global/cache/enabled", "1", "").is_err());
    // A missing node never equals anything.
    assert_config_node_not_value(&config, "global/cache/missing", "1", "")?;
    Ok(())
}

#[test]
fn test_missing_node_fails_instead_of_erroring() -> Result<()> {
    let config = store()?;

    let err = assert_config_node_value(&config, "global/session/save", "files", "").unwrap_err();
    assert!(err.is_assertion_failure());
    assert!(err.to_string().contains("(node not found)"));
    Ok(())
}

#[test]
fn test_has_child_and_children() -> Result<()> {
    let config = store()?;

    assert_config_node_has_child(&config, "global/resources", "core_setup", "")?;
    assert_config_node_not_has_child(&config, "global/resources", "catalog_setup", "")?;
    assert!(assert_config_node_has_child(&config, "global/resources", "catalog_setup", "").is_err());

    assert_config_node_has_children(&config, "default/currency/options", "")?;
    assert_config_node_not_has_children(&config, "default/design/theme", "")?;
    assert!(assert_config_node_has_children(&config, "default/design/theme", "").is_err());
    Ok(())
}

#[test]
fn test_contains_value_and_its_negation() -> Result<()> {
    let config = store()?;

    assert_config_node_contains_value(&config, "default/currency/options/allow", "EUR", "")?;
    assert_config_node_not_contains_value(&config, "default/currency/options/allow", "JPY", "")?;

    let err = assert_config_node_not_contains_value(&config, "default/currency/options/allow", "GBP", "")
        .unwrap_err();
    assert!(err.is_assertion_failure());
    Ok(())
}

#[test]
fn test_structure_assertions() -> Result<()> {
    let config = store()?;

    let expected = parse_fragment("base = \"USD\"\nallow = \"USD,EUR,GBP\"")?;
    assert_config_node_structure(&config, "default/currency/options", &expected, "")?;

    let different = ConfigNode::new("")
        .with_child(ConfigNode::leaf("allow", "USD"))
        .with_child(ConfigNode::leaf("base", "USD"));
    assert_config_node_not_structure(&config, "default/currency/options", &different, "")?;

    let err = assert_config_node_structure(&config, "default/currency/options", &different, "")
        .unwrap_err();
    assert!(err.to_string().contains("matches the expected structure"));
    Ok(())
}

#[test]
fn test_strict_numeric_comparisons() -> Result<()> {
    let config = store()?;

    assert_config_node_less_than(&config, "global/cache/lifetime", 7201, "")?;
    assert_config_node_greater_than(&config, "global/cache/lifetime", 3600.5, "")?;
    assert!(assert_config_node_less_than(&config, "global/cache/lifetime", 7200, "").is_err());
    assert!(assert_config_node_greater_than(&config, "global/cache/lifetime", 7200, "").is_err());

    // Non numeric values never compare.
    assert!(assert_config_node_greater_than(&config, "default/catalog/frontend/list_mode", 0, "").is_err());
    Ok(())
}

#[test]
fn test_or_equals_matches_equals_or_strict() -> Result<()> {
    let config = store()?;
    let path = "default/catalog/frontend/grid_per_page";

    for expected in [11, 12, 13] {
        let equals = assert_config_node_value_with(
            &config,
            path,
            Some(expected.into()),
            "",
            ComparisonKind::EqualsNumber,
        )
        .is_ok();
        let less = assert_config_node_less_than(&config, path, expected, "").is_ok();
        let greater = assert_config_node_greater_than(&config, path, expected, "").is_ok();

        assert_eq!(
            assert_config_node_less_than_or_equals(&config, path, expected, "").is_ok(),
            equals || less,
            "<= {}",
            expected
        );
        assert_eq!(
            assert_config_node_greater_than_or_equals(&config, path, expected, "").is_ok(),
            equals || greater,
            ">= {}",
            expected
        );
    }
    Ok(())
}

#[test]
fn test_misuse_is_reported_before_evaluation() -> Result<()> {
    let config = store()?;

    assert!(matches!(
        assert_config_node_value(&config, "", "1", ""),
        Err(AssertError::InvalidLocator { .. })
    ));
    assert!(matches!(
        assert_config_node_value_with(&config, "global", None, "", ComparisonKind::EqualsString),
        Err(AssertError::MissingExpectedValue { .. })
    ));
    assert!(matches!(
        assert_config_node_value_with(&config, "global", None, "", ComparisonKind::IsActive),
        Err(AssertError::UnsupportedKind { .. })
    ));
    Ok(())
}
