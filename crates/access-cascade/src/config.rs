//! Module tree configuration
//!
//! The host ships its module hierarchy as static configuration, either as
//! TOML or JSON. Two layouts are accepted under a top-level `modules` key:
//!
//! ```toml
//! # nested: children are inline module tables
//! [[modules]]
//! id = "assets"
//! label = "Assets"
//!
//! [[modules.children]]
//! id = "documents"
//! supports_download = true
//! ```
//!
//! ```toml
//! # flat: children are id references, roots are never referenced
//! [[modules]]
//! id = "assets"
//! children = ["documents"]
//!
//! [[modules]]
//! id = "documents"
//! supports_download = true
//! ```

use crate::error::{CascadeError, CascadeResult};
use crate::tree::{FlatModule, ModuleNode, ModuleTree};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Module definitions in either supported layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ModuleList {
    /// Children nested inline
    Nested(Vec<ModuleNode>),
    /// Children referenced by id
    Flat(Vec<FlatModule>),
}

impl Default for ModuleList {
    fn default() -> Self {
        Self::Nested(Vec::new())
    }
}

/// Static module tree configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeConfig {
    /// Module definitions
    pub modules: ModuleList,
}

/// Document shape before the module layout is chosen.
#[derive(Deserialize)]
struct RawConfig<V> {
    modules: Option<V>,
}

impl TreeConfig {
    /// Wrap nested module definitions.
    pub fn nested(modules: Vec<ModuleNode>) -> Self {
        Self {
            modules: ModuleList::Nested(modules),
        }
    }

    /// Parse a TOML document.
    ///
    /// `modules` is read as the nested layout first and as the flat layout if
    /// that fails. When neither fits, the error reports the nested failure
    /// followed by the flat one.
    pub fn from_toml_str(content: &str) -> CascadeResult<Self> {
        let raw: RawConfig<toml::Value> = toml::from_str(content)
            .map_err(|e| CascadeError::config(format!("invalid TOML: {e}")))?;
        let modules = match raw.modules {
            Some(value) => select_layout(
                "TOML",
                value.clone().try_into::<Vec<ModuleNode>>(),
                || value.try_into::<Vec<FlatModule>>(),
            )?,
            None => ModuleList::default(),
        };
        Ok(Self { modules })
    }

    /// Parse a JSON document.
    ///
    /// Layout selection and error reporting follow [`TreeConfig::from_toml_str`].
    pub fn from_json_str(content: &str) -> CascadeResult<Self> {
        let raw: RawConfig<serde_json::Value> = serde_json::from_str(content)
            .map_err(|e| CascadeError::config(format!("invalid JSON: {e}")))?;
        let modules = match raw.modules {
            Some(value) => select_layout(
                "JSON",
                serde_json::from_value::<Vec<ModuleNode>>(value.clone()),
                || serde_json::from_value::<Vec<FlatModule>>(value),
            )?,
            None => ModuleList::default(),
        };
        Ok(Self { modules })
    }

    /// Load from a `.toml` or `.json` file.
    pub fn load_from_file(path: &Path) -> CascadeResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CascadeError::config(format!("failed to read {}: {e}", path.display()))
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        debug!(path = %path.display(), ?extension, "loading module tree configuration");
        match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(CascadeError::config(format!(
                "unsupported configuration format: {}",
                path.display()
            ))),
        }
    }

    /// Validate the definitions and build the tree.
    pub fn build(self) -> CascadeResult<ModuleTree> {
        let tree = match self.modules {
            ModuleList::Nested(nodes) => ModuleTree::from_nodes(nodes)?,
            ModuleList::Flat(modules) => ModuleTree::from_flat(modules)?,
        };
        Ok(tree)
    }
}

fn select_layout<E: fmt::Display>(
    format: &str,
    nested: Result<Vec<ModuleNode>, E>,
    flat: impl FnOnce() -> Result<Vec<FlatModule>, E>,
) -> CascadeResult<ModuleList> {
    let nested_err = match nested {
        Ok(nodes) => return Ok(ModuleList::Nested(nodes)),
        Err(e) => e,
    };
    match flat() {
        Ok(modules) => Ok(ModuleList::Flat(modules)),
        Err(flat_err) => Err(CascadeError::config(format!(
            "invalid {format} modules: {nested_err} (as flat layout: {flat_err})"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MalformedTreeError;
    use crate::tree::ModuleId;

    #[test]
    fn test_nested_toml() {
        let config = TreeConfig::from_toml_str(
            r#"
            [[modules]]
            id = "assets"
            label = "Assets"

            [[modules.children]]
            id = "documents"
            supports_download = true

            [[modules]]
            id = "employees"
            "#,
        )
        .unwrap();
        assert!(matches!(config.modules, ModuleList::Nested(_)));

        let tree = config.build().unwrap();
        assert_eq!(tree.len(), 3);
        assert!(tree.supports_download(&"documents".into()).unwrap());
        assert!(!tree.supports_download(&"assets".into()).unwrap());
        assert_eq!(tree.find(&"employees".into()).unwrap().label(), "employees");
    }

    #[test]
    fn test_flat_json() {
        let config = TreeConfig::from_json_str(
            r#"{"modules": [
                {"id": "assets", "children": ["documents"]},
                {"id": "documents", "supportsDownload": true}
            ]}"#,
        )
        .unwrap();
        assert!(matches!(config.modules, ModuleList::Flat(_)));

        let tree = config.build().unwrap();
        assert_eq!(
            tree.parent(&"documents".into()).unwrap(),
            Some(&ModuleId::from("assets"))
        );
        assert!(tree.supports_download(&"documents".into()).unwrap());
    }

    #[test]
    fn test_flat_cycle_is_malformed() {
        let config = TreeConfig::from_json_str(
            r#"{"modules": [
                {"id": "a", "children": ["b"]},
                {"id": "b", "children": ["a"]}
            ]}"#,
        )
        .unwrap();
        let err = config.build().unwrap_err();
        assert!(matches!(
            err,
            CascadeError::MalformedTree(MalformedTreeError::Cycle { .. })
        ));
    }

    #[test]
    fn test_invalid_documents() {
        assert!(matches!(
            TreeConfig::from_toml_str("modules = 3"),
            Err(CascadeError::Config { .. })
        ));
        assert!(matches!(
            TreeConfig::from_json_str("{"),
            Err(CascadeError::Config { .. })
        ));
    }

    #[test]
    fn test_empty_config_builds_empty_tree() {
        let tree = TreeConfig::from_toml_str("").unwrap().build().unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_nested_typo_reports_nested_error() {
        let err = TreeConfig::from_json_str(
            r#"{"modules": [
                {"id": "assets", "children": [{"label": "Documents"}]}
            ]}"#,
        )
        .unwrap_err();
        match err {
            CascadeError::Config { reason } => {
                assert!(reason.contains("missing field `id`"), "{reason}");
                assert!(reason.contains("as flat layout"), "{reason}");
            }
            other => panic!("expected config error, got {other:?}"),
        }

        let err = TreeConfig::from_toml_str(
            r#"
            [[modules]]
            id = "assets"

            [[modules.children]]
            label = "Documents"
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CascadeError::Config { reason } if reason.contains("missing field `id`")
        ));
    }
}
