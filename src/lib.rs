pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::config::{ConfigFixture, SuiteConfig};
pub use crate::core::assertions;
pub use crate::core::suite::{run_suite, RunOptions, SuiteReport};
pub use crate::core::{ComparisonKind, Constraint, ExpectedValue, TestContext};
pub use crate::domain::{ConfigNode, ModuleDescriptor};
pub use crate::utils::error::{AssertError, Result};
