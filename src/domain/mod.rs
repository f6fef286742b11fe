// Domain layer: the configuration tree, module metadata and the collaborator ports
// assertions read from. No dependencies beyond std/serde.

pub mod model;
pub mod ports;

pub use model::{split_list, ConfigNode, ModuleDescriptor, MODULES_NODE};
pub use ports::{ConfigProvider, ModuleContext, ModuleRegistry};
