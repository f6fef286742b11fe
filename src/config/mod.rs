#[cfg(feature = "cli")]
pub mod cli;
pub mod suite_config;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{CliConfig, OutputFormat};
pub use suite_config::{AssertionName, AssertionStep, SuiteConfig};
pub use toml_config::ConfigFixture;
