use crate::utils::error::{AssertError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Splits a `/`-separated config path into its segments.
///
/// Leading and trailing slashes are ignored; an empty path or an empty
/// segment (`a//b`) is rejected.
pub fn validate_node_path(path: &str) -> Result<Vec<&str>> {
    let trimmed = path.trim_matches('/');
    if trimmed.trim().is_empty() {
        return Err(AssertError::InvalidLocator {
            locator: path.to_string(),
            reason: "Config path cannot be empty".to_string(),
        });
    }

    let segments: Vec<&str> = trimmed.split('/').collect();
    if segments.iter().any(|segment| segment.trim().is_empty()) {
        return Err(AssertError::InvalidLocator {
            locator: path.to_string(),
            reason: "Config path contains an empty segment".to_string(),
        });
    }

    Ok(segments)
}

pub fn validate_module_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AssertError::InvalidLocator {
            locator: name.to_string(),
            reason: "Module name cannot be empty".to_string(),
        });
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AssertError::InvalidLocator {
            locator: name.to_string(),
            reason: "Module name may only contain letters, digits and underscores".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| AssertError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AssertError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}
