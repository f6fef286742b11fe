pub mod assertions;
pub mod constraint;
pub mod context;
pub mod kind;
pub mod matcher;
pub mod suite;
pub mod version;

pub use crate::domain::{ConfigNode, ConfigProvider, ModuleContext, ModuleRegistry};
pub use crate::utils::error::Result;
pub use constraint::{config_module, config_node, logical_not, logical_or, Constraint, ExpectedValue, Target};
pub use context::TestContext;
pub use kind::ComparisonKind;
pub use matcher::{assert_that, Evaluation, Matcher};
pub use version::ModuleVersion;
