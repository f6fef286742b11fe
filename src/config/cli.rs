use crate::utils::error::{AssertError, Result};
use crate::utils::validation::{validate_module_name, Validate};
use clap::{Parser, ValueEnum};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "config-assert")]
#[command(about = "Run configuration and module assertions against a config fixture")]
pub struct CliConfig {
    /// Path to the configuration fixture (TOML, or JSON by extension)
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Path to the assertion suite
    #[arg(short, long, default_value = "assertions.toml")]
    pub suite: String,

    /// Module under test, overriding the suite's declaration
    #[arg(short, long)]
    pub module: Option<String>,

    /// Stop at the first failing assertion
    #[arg(long)]
    pub fail_fast: bool,

    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        for (field, path) in [("config", &self.config), ("suite", &self.suite)] {
            if !Path::new(path).is_file() {
                return Err(AssertError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: path.clone(),
                    reason: "File does not exist".to_string(),
                });
            }
        }

        if let Some(module) = &self.module {
            validate_module_name(module)?;
        }
        Ok(())
    }
}
