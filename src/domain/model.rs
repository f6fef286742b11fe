use crate::utils::error::Result;
use crate::utils::validation::validate_node_path;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the top level node holding module declarations.
pub const MODULES_NODE: &str = "modules";

/// A node of the configuration tree.
///
/// Leaves carry a text value, containers carry children. Both may be present
/// at once, which mirrors how merged configuration documents behave.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigNode {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ConfigNode>,
}

impl ConfigNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            children: Vec::new(),
        }
    }

    pub fn leaf(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name).with_value(value)
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_child(mut self, child: ConfigNode) -> Self {
        self.children.push(child);
        self
    }

    /// Text content of the node, empty for pure containers.
    pub fn text(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn child(&self, name: &str) -> Option<&ConfigNode> {
        self.children.iter().find(|child| child.name == name)
    }

    /// Looks up a descendant by `/`-separated path.
    ///
    /// Returns `Ok(None)` when the path is well formed but absent.
    pub fn descend(&self, path: &str) -> Result<Option<&ConfigNode>> {
        let segments = validate_node_path(path)?;
        let mut current = self;
        for segment in segments {
            match current.child(segment) {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current))
    }

    /// Lenient variant of [`ConfigNode::descend`] treating malformed paths as absent.
    pub fn node(&self, path: &str) -> Option<&ConfigNode> {
        self.descend(path).ok().flatten()
    }

    /// Sets the value at `path`, creating intermediate nodes as needed.
    pub fn set_path(&mut self, path: &str, value: impl Into<String>) -> Result<()> {
        let node = self.ensure_path(path)?;
        node.value = Some(value.into());
        Ok(())
    }

    /// Returns the node at `path`, creating it and its ancestors when missing.
    pub fn ensure_path(&mut self, path: &str) -> Result<&mut ConfigNode> {
        let segments = validate_node_path(path)?;
        let mut current = self;
        for segment in segments {
            let index = match current.children.iter().position(|child| child.name == segment) {
                Some(index) => index,
                None => {
                    current.children.push(ConfigNode::new(segment));
                    current.children.len() - 1
                }
            };
            current = &mut current.children[index];
        }
        Ok(current)
    }

    /// Writes `descriptor` under `modules/<name>`, replacing any previous declaration.
    pub fn insert_module(&mut self, descriptor: &ModuleDescriptor) -> Result<()> {
        let modules = self.ensure_path(MODULES_NODE)?;
        modules
            .children
            .retain(|child| child.name != descriptor.name);
        modules.children.push(descriptor.to_node());
        Ok(())
    }

    /// Structural equality: the names of `self` and `other` are ignored,
    /// text values must match and children are compared as an unordered
    /// collection, recursively.
    pub fn structurally_eq(&self, other: &ConfigNode) -> bool {
        if self.text() != other.text() || self.children.len() != other.children.len() {
            return false;
        }

        let mut matched = vec![false; other.children.len()];
        self.children.iter().all(|child| {
            let found = other.children.iter().enumerate().position(|(index, candidate)| {
                !matched[index]
                    && candidate.name == child.name
                    && child.structurally_eq(candidate)
            });
            match found {
                Some(index) => {
                    matched[index] = true;
                    true
                }
                None => false,
            }
        })
    }

    fn render(&self, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        let name = if self.name.is_empty() { "(root)" } else { &self.name };
        match &self.value {
            Some(value) => out.push_str(&format!("{}{} = {:?}\n", indent, name, value)),
            None => out.push_str(&format!("{}{}\n", indent, name)),
        }
        for child in &self.children {
            child.render(depth + 1, out);
        }
    }
}

impl fmt::Display for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(0, &mut out);
        f.write_str(out.trim_end())
    }
}

/// Metadata of an installed module, read from `modules/<name>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub name: String,
    pub active: bool,
    pub code_pool: String,
    pub version: Option<String>,
    pub depends: Vec<String>,
}

impl ModuleDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    pub fn code_pool(mut self, code_pool: impl Into<String>) -> Self {
        self.code_pool = code_pool.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn depends_on(mut self, module: impl Into<String>) -> Self {
        self.depends.push(module.into());
        self
    }

    pub fn has_dependency(&self, module: &str) -> bool {
        self.depends.iter().any(|dependency| dependency == module)
    }

    /// Reads a descriptor from its declaration node.
    ///
    /// `active` accepts `1`/`true`, `depends` may list modules either as
    /// child nodes or as a comma separated value.
    pub fn from_node(node: &ConfigNode) -> Self {
        let active = node
            .child("active")
            .map(|n| matches!(n.text().trim().to_ascii_lowercase().as_str(), "1" | "true"))
            .unwrap_or(false);

        let code_pool = node
            .child("codePool")
            .or_else(|| node.child("code_pool"))
            .map(|n| n.text().trim().to_string())
            .unwrap_or_default();

        let version = node
            .child("version")
            .map(|n| n.text().trim().to_string())
            .filter(|v| !v.is_empty());

        let depends = match node.child("depends") {
            Some(depends) if depends.has_children() => depends
                .children
                .iter()
                .map(|child| child.name.clone())
                .collect(),
            Some(depends) => split_list(depends.text()),
            None => Vec::new(),
        };

        Self {
            name: node.name.clone(),
            active,
            code_pool,
            version,
            depends,
        }
    }

    pub fn to_node(&self) -> ConfigNode {
        let mut node = ConfigNode::new(self.name.clone())
            .with_child(ConfigNode::leaf("active", if self.active { "true" } else { "false" }))
            .with_child(ConfigNode::leaf("codePool", self.code_pool.clone()));

        if let Some(version) = &self.version {
            node = node.with_child(ConfigNode::leaf("version", version.clone()));
        }

        if !self.depends.is_empty() {
            let depends = self
                .depends
                .iter()
                .fold(ConfigNode::new("depends"), |acc, dependency| {
                    acc.with_child(ConfigNode::new(dependency.clone()))
                });
            node = node.with_child(depends);
        }

        node
    }
}

/// Splits a comma separated list, trimming items and dropping empty ones.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
