use crate::domain::ModuleContext;
use crate::utils::error::{AssertError, Result};
use crate::utils::validation::validate_module_name;

/// Per-test execution context carrying the module under test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestContext {
    module: Option<String>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_module(module: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
        }
    }

    pub fn with_module(mut self, module: Option<String>) -> Self {
        self.module = module;
        self
    }
}

impl ModuleContext for TestContext {
    fn current_module(&self) -> Option<&str> {
        self.module.as_deref()
    }
}

/// Picks the explicit module name when given, otherwise the one the context declares.
pub fn resolve_module_name<'a>(
    context: &'a impl ModuleContext,
    explicit: Option<&'a str>,
) -> Result<&'a str> {
    let name = explicit
        .or_else(|| context.current_module())
        .ok_or(AssertError::ModuleNotResolved)?;
    validate_module_name(name)?;
    Ok(name)
}
