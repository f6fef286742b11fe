use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssertError {
    #[error("Unsupported comparison kind '{kind}' for {target}")]
    UnsupportedKind { kind: String, target: String },

    #[error("Comparison kind '{kind}' requires an expected value")]
    MissingExpectedValue { kind: String },

    #[error("Comparison kind '{kind}' does not take an expected value")]
    UnexpectedValue { kind: String },

    #[error("Invalid expected value for '{kind}': {reason}")]
    InvalidExpectedValue { kind: String, reason: String },

    #[error("Invalid version '{value}': {reason}")]
    InvalidVersion { value: String, reason: String },

    #[error("Invalid locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },

    #[error("No module name given and the test context does not declare a module")]
    ModuleNotResolved,

    #[error("{}", format_failure(.message, .description))]
    AssertionFailed { message: String, description: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },
}

fn format_failure(message: &str, description: &str) -> String {
    if message.is_empty() {
        description.to_string()
    } else {
        format!("{}\n{}", message, description)
    }
}

impl AssertError {
    /// True when the error is a failed assertion rather than a misuse or loading problem.
    pub fn is_assertion_failure(&self) -> bool {
        matches!(self, AssertError::AssertionFailed { .. })
    }

    pub fn unsupported_kind(kind: impl std::fmt::Display, target: impl Into<String>) -> Self {
        AssertError::UnsupportedKind {
            kind: kind.to_string(),
            target: target.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AssertError>;
