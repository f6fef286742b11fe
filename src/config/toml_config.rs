use crate::domain::{ConfigNode, ConfigProvider, ModuleDescriptor, MODULES_NODE};
use crate::utils::error::{AssertError, Result};
use std::path::{Path, PathBuf};

/// Name given to the root node of loaded fixtures.
pub const ROOT_NODE: &str = "config";

/// A configuration tree loaded from a TOML or JSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFixture {
    root: ConfigNode,
    source: Option<PathBuf>,
}

impl ConfigFixture {
    pub fn new(root: ConfigNode) -> Self {
        Self { root, source: None }
    }

    /// 從檔案載入配置樹 (`.json` 以 JSON 解析, 其餘以 TOML 解析)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(AssertError::IoError)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let mut fixture = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        fixture.source = Some(path.to_path_buf());

        tracing::debug!(
            "Loaded configuration fixture from {} ({} top level nodes)",
            path.display(),
            fixture.root.children.len()
        );
        Ok(fixture)
    }

    /// 從 TOML 字串解析配置樹
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = substitute_env_vars(content)?;
        let table: toml::Table =
            toml::from_str(&processed_content).map_err(|e| AssertError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        Ok(Self::new(node_from_toml_table(ROOT_NODE, &table)))
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        if !value.is_object() {
            return Err(AssertError::ConfigValidationError {
                field: "json_parsing".to_string(),
                message: "the top level JSON value must be an object".to_string(),
            });
        }

        Ok(Self::new(node_from_json(ROOT_NODE, &value)))
    }

    pub fn root(&self) -> &ConfigNode {
        &self.root
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// All modules declared under `modules/`.
    pub fn modules(&self) -> Vec<ModuleDescriptor> {
        self.root
            .child(MODULES_NODE)
            .map(|modules| modules.children.iter().map(ModuleDescriptor::from_node).collect())
            .unwrap_or_default()
    }
}

impl ConfigProvider for ConfigFixture {
    fn config_root(&self) -> &ConfigNode {
        &self.root
    }
}

/// Parses a TOML fragment into an unnamed node, used as a structure expectation.
pub fn parse_fragment(content: &str) -> Result<ConfigNode> {
    let table: toml::Table = toml::from_str(content).map_err(|e| AssertError::ConfigValidationError {
        field: "fragment".to_string(),
        message: format!("TOML parsing error: {}", e),
    })?;
    Ok(node_from_toml_table("", &table))
}

/// 替換環境變數 (例如 ${STORE_URL}); 未設定的變數保持原樣
fn substitute_env_vars(content: &str) -> Result<String> {
    use regex::Regex;
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AssertError::ConfigError {
        message: format!("invalid substitution pattern: {}", e),
    })?;

    let result = re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    });

    Ok(result.to_string())
}

pub fn node_from_toml_table(name: &str, table: &toml::Table) -> ConfigNode {
    let mut node = ConfigNode::new(name);
    for (key, value) in table {
        append_toml_value(&mut node, key, value);
    }
    node
}

fn append_toml_value(parent: &mut ConfigNode, key: &str, value: &toml::Value) {
    match value {
        toml::Value::Table(table) => parent.children.push(node_from_toml_table(key, table)),
        toml::Value::Array(items) if !items.is_empty() && items.iter().all(|i| i.is_table()) => {
            for item in items {
                append_toml_value(parent, key, item);
            }
        }
        scalar => parent
            .children
            .push(ConfigNode::leaf(key, toml_scalar_text(scalar))),
    }
}

/// Text form of a TOML scalar: booleans become `1`/`0`, arrays a comma separated list.
pub fn toml_scalar_text(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => (if *b { "1" } else { "0" }).to_string(),
        toml::Value::Datetime(dt) => dt.to_string(),
        toml::Value::Array(items) => items
            .iter()
            .map(toml_scalar_text)
            .collect::<Vec<_>>()
            .join(","),
        toml::Value::Table(table) => node_from_toml_table("", table).to_string(),
    }
}

pub fn node_from_json(name: &str, value: &serde_json::Value) -> ConfigNode {
    let mut node = ConfigNode::new(name);
    if let serde_json::Value::Object(map) = value {
        for (key, item) in map {
            append_json_value(&mut node, key, item);
        }
    } else if let Some(text) = json_scalar_text(value) {
        node.value = Some(text);
    }
    node
}

fn append_json_value(parent: &mut ConfigNode, key: &str, value: &serde_json::Value) {
    match value {
        serde_json::Value::Object(_) => parent.children.push(node_from_json(key, value)),
        serde_json::Value::Array(items)
            if !items.is_empty() && items.iter().all(|i| i.is_object()) =>
        {
            for item in items {
                append_json_value(parent, key, item);
            }
        }
        scalar => parent.children.push(node_from_json(key, scalar)),
    }
}

fn json_scalar_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null | serde_json::Value::Object(_) => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        serde_json::Value::Array(items) => Some(
            items
                .iter()
                .filter_map(json_scalar_text)
                .collect::<Vec<_>>()
                .join(","),
        ),
    }
}
