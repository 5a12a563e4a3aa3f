//! Module tree
//!
//! The static hierarchy of capability modules permissions are granted on.
//! A tree is built once from configuration and is read-only afterwards.
//! Construction rejects duplicate ids and, for flat configurations, cycles,
//! dangling child references and children listed under two parents.
//!
//! All traversals use an explicit stack so depth is bounded only by memory.

use crate::error::{CascadeError, CascadeResult, MalformedTreeError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

/// Unique identifier of a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(String);

impl ModuleId {
    /// Create an id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModuleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ModuleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&ModuleId> for ModuleId {
    fn from(id: &ModuleId) -> Self {
        id.clone()
    }
}

/// Nested module definition as supplied by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleNode {
    /// Unique module id
    pub id: ModuleId,
    /// Display label, defaults to the id
    #[serde(default)]
    pub label: String,
    /// Whether the Download facet may be granted on this module
    #[serde(default, alias = "supportsDownload")]
    pub supports_download: bool,
    /// Child modules, in display order
    #[serde(default)]
    pub children: Vec<ModuleNode>,
}

impl ModuleNode {
    /// Create a leaf module without download support.
    pub fn new(id: impl Into<ModuleId>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            supports_download: false,
            children: Vec::new(),
        }
    }

    /// Mark the module as supporting Download.
    pub fn with_download(mut self) -> Self {
        self.supports_download = true;
        self
    }

    /// Replace the module's children.
    pub fn with_children(mut self, children: Vec<ModuleNode>) -> Self {
        self.children = children;
        self
    }
}

/// Flat module definition whose children are id references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatModule {
    /// Unique module id
    pub id: ModuleId,
    /// Display label, defaults to the id
    #[serde(default)]
    pub label: String,
    /// Whether the Download facet may be granted on this module
    #[serde(default, alias = "supportsDownload")]
    pub supports_download: bool,
    /// Ids of child modules, in display order
    #[serde(default)]
    pub children: Vec<ModuleId>,
}

/// A module as stored in a built tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    id: ModuleId,
    label: String,
    supports_download: bool,
    parent: Option<ModuleId>,
    children: Vec<ModuleId>,
}

impl Module {
    /// Module id.
    pub fn id(&self) -> &ModuleId {
        &self.id
    }

    /// Display label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether Download may be granted here.
    pub fn supports_download(&self) -> bool {
        self.supports_download
    }

    /// Parent id, `None` for roots.
    pub fn parent(&self) -> Option<&ModuleId> {
        self.parent.as_ref()
    }

    /// Child ids in display order.
    pub fn children(&self) -> &[ModuleId] {
        &self.children
    }
}

/// Read-only forest of modules.
///
/// Modules are stored in forest pre-order, so [`ModuleTree::iter`] visits each
/// parent before its children and siblings in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleTree {
    modules: IndexMap<ModuleId, Module>,
    roots: Vec<ModuleId>,
}

impl ModuleTree {
    /// Build a tree from nested module definitions.
    pub fn from_nodes(roots: Vec<ModuleNode>) -> Result<Self, MalformedTreeError> {
        let mut tree = Self::default();
        let mut stack: Vec<(ModuleNode, Option<ModuleId>)> =
            roots.into_iter().rev().map(|n| (n, None)).collect();

        while let Some((node, parent)) = stack.pop() {
            let ModuleNode {
                id,
                label,
                supports_download,
                children,
            } = node;
            check_id(&id)?;
            if tree.modules.contains_key(&id) {
                warn!(module = %id, "duplicate module id in tree configuration");
                return Err(MalformedTreeError::DuplicateId { id });
            }

            let child_ids = children.iter().map(|c| c.id.clone()).collect();
            if parent.is_none() {
                tree.roots.push(id.clone());
            }
            stack.extend(children.into_iter().rev().map(|c| (c, Some(id.clone()))));
            tree.insert(id, label, supports_download, parent, child_ids);
        }

        debug!(
            modules = tree.modules.len(),
            roots = tree.roots.len(),
            "module tree built"
        );
        Ok(tree)
    }

    /// Build a tree from flat definitions that reference children by id.
    ///
    /// Roots are the modules no other module lists as a child, in declaration
    /// order.
    pub fn from_flat(modules: Vec<FlatModule>) -> Result<Self, MalformedTreeError> {
        let mut defs: IndexMap<ModuleId, FlatModule> = IndexMap::with_capacity(modules.len());
        for module in modules {
            check_id(&module.id)?;
            if defs.contains_key(&module.id) {
                warn!(module = %module.id, "duplicate module id in tree configuration");
                return Err(MalformedTreeError::DuplicateId { id: module.id });
            }
            defs.insert(module.id.clone(), module);
        }

        let mut parents: HashMap<&ModuleId, &ModuleId> = HashMap::new();
        for def in defs.values() {
            for child in &def.children {
                let Some((child, _)) = defs.get_key_value(child) else {
                    warn!(parent = %def.id, child = %child, "dangling child reference");
                    return Err(MalformedTreeError::DanglingChild {
                        parent: def.id.clone(),
                        child: child.clone(),
                    });
                };
                if let Some(first) = parents.insert(child, &def.id) {
                    warn!(module = %child, "module listed under two parents");
                    return Err(MalformedTreeError::SharedChild {
                        child: child.clone(),
                        first_parent: first.clone(),
                        second_parent: def.id.clone(),
                    });
                }
            }
        }

        let mut tree = Self::default();
        let mut stack: Vec<&ModuleId> = defs
            .keys()
            .filter(|id| !parents.contains_key(id))
            .rev()
            .collect();
        while let Some(id) = stack.pop() {
            let def = &defs[id];
            if !parents.contains_key(id) {
                tree.roots.push(id.clone());
            }
            stack.extend(def.children.iter().rev());
            tree.insert(
                id.clone(),
                def.label.clone(),
                def.supports_download,
                parents.get(id).map(|p| (*p).clone()),
                def.children.clone(),
            );
        }

        // Every module has at most one parent, so anything unreachable from a
        // root sits on a parent cycle.
        if let Some(stray) = defs.keys().find(|id| !tree.modules.contains_key(*id)) {
            let path = parent_cycle(stray, &parents);
            warn!(?path, "cycle in tree configuration");
            return Err(MalformedTreeError::Cycle { path });
        }

        debug!(
            modules = tree.modules.len(),
            roots = tree.roots.len(),
            "module tree built"
        );
        Ok(tree)
    }

    fn insert(
        &mut self,
        id: ModuleId,
        label: String,
        supports_download: bool,
        parent: Option<ModuleId>,
        children: Vec<ModuleId>,
    ) {
        let label = if label.trim().is_empty() {
            id.to_string()
        } else {
            label
        };
        self.modules.insert(
            id.clone(),
            Module {
                id,
                label,
                supports_download,
                parent,
                children,
            },
        );
    }

    /// Look up a module.
    pub fn find(&self, id: &ModuleId) -> CascadeResult<&Module> {
        self.modules
            .get(id)
            .ok_or_else(|| CascadeError::unknown_module(id))
    }

    /// Whether the tree contains `id`.
    pub fn contains(&self, id: &ModuleId) -> bool {
        self.modules.contains_key(id)
    }

    /// Child ids of a module in display order.
    pub fn children(&self, id: &ModuleId) -> CascadeResult<&[ModuleId]> {
        self.find(id).map(Module::children)
    }

    /// All transitive descendants of a module in pre-order, excluding the module.
    pub fn descendants(&self, id: &ModuleId) -> CascadeResult<Vec<ModuleId>> {
        let mut out = Vec::new();
        let mut stack: Vec<&ModuleId> = self.find(id)?.children.iter().rev().collect();
        while let Some(next) = stack.pop() {
            out.push(next.clone());
            stack.extend(self.find(next)?.children.iter().rev());
        }
        Ok(out)
    }

    /// Whether the Download facet may be granted on a module.
    pub fn supports_download(&self, id: &ModuleId) -> CascadeResult<bool> {
        self.find(id).map(Module::supports_download)
    }

    /// Parent of a module, `None` for roots.
    pub fn parent(&self, id: &ModuleId) -> CascadeResult<Option<&ModuleId>> {
        self.find(id).map(Module::parent)
    }

    /// Ancestors of a module, nearest first.
    pub fn ancestors(&self, id: &ModuleId) -> CascadeResult<Vec<ModuleId>> {
        let mut out = Vec::new();
        let mut current = self.find(id)?;
        while let Some(parent) = current.parent() {
            out.push(parent.clone());
            current = self.find(parent)?;
        }
        Ok(out)
    }

    /// Number of ancestors above a module; roots have depth zero.
    pub fn depth(&self, id: &ModuleId) -> CascadeResult<usize> {
        self.ancestors(id).map(|a| a.len())
    }

    /// Root ids in display order.
    pub fn roots(&self) -> &[ModuleId] {
        &self.roots
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the tree has no modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Every module in forest pre-order.
    pub fn iter(&self) -> impl Iterator<Item = &Module> {
        self.modules.values()
    }
}

fn check_id(id: &ModuleId) -> Result<(), MalformedTreeError> {
    if id.as_str().trim().is_empty() {
        warn!("empty module id in tree configuration");
        return Err(MalformedTreeError::EmptyId);
    }
    Ok(())
}

/// Walk parent links from `start` until a module repeats, returning the cycle
/// in parent-to-child order.
fn parent_cycle<'a>(
    start: &'a ModuleId,
    parents: &HashMap<&'a ModuleId, &'a ModuleId>,
) -> Vec<ModuleId> {
    let mut seen = HashSet::new();
    let mut walk = Vec::new();
    let mut current = start;
    while seen.insert(current) {
        walk.push(current);
        match parents.get(current) {
            Some(parent) => current = *parent,
            None => break,
        }
    }

    let begin = walk.iter().position(|id| *id == current).unwrap_or(0);
    let mut path: Vec<ModuleId> = walk[begin..].iter().map(|id| (*id).clone()).collect();
    path.push(current.clone());
    path.reverse();
    path
}
