use crate::domain::model::{ConfigNode, ModuleDescriptor, MODULES_NODE};

/// Accessor for the live configuration root assertions run against.
pub trait ConfigProvider: Send + Sync {
    fn config_root(&self) -> &ConfigNode;
}

/// Lookup of installed module metadata.
pub trait ModuleRegistry {
    fn module(&self, name: &str) -> Option<ModuleDescriptor>;
}

/// The module a test case declares it is testing.
pub trait ModuleContext {
    fn current_module(&self) -> Option<&str>;
}

impl ConfigProvider for ConfigNode {
    fn config_root(&self) -> &ConfigNode {
        self
    }
}

impl ModuleRegistry for ConfigNode {
    fn module(&self, name: &str) -> Option<ModuleDescriptor> {
        self.child(MODULES_NODE)?
            .child(name)
            .map(ModuleDescriptor::from_node)
    }
}
