//! Tree disclosure state
//!
//! Tracks which modules are expanded in an editor's tree view. Every module
//! starts collapsed. When a cascade turns View on for a module, that module
//! and all of its ancestors are expanded so the newly granted rows are
//! visible. Disclosure lives for one edit session and is never persisted.

use crate::cascade::CascadeOutcome;
use crate::error::{CascadeError, CascadeResult};
use crate::tree::{ModuleId, ModuleTree};
use std::collections::{BTreeSet, HashSet};

/// Set of expanded modules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisclosureState {
    expanded: BTreeSet<ModuleId>,
}

impl DisclosureState {
    /// All modules collapsed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a module is expanded.
    pub fn is_expanded(&self, id: &ModuleId) -> bool {
        self.expanded.contains(id)
    }

    /// Expanded modules in id order.
    pub fn expanded(&self) -> impl Iterator<Item = &ModuleId> {
        self.expanded.iter()
    }

    /// Expand a module. Returns `true` if it was collapsed.
    pub fn expand(&mut self, tree: &ModuleTree, id: &ModuleId) -> CascadeResult<bool> {
        ensure_known(tree, id)?;
        Ok(self.expanded.insert(id.clone()))
    }

    /// Collapse a module. Returns `true` if it was expanded.
    pub fn collapse(&mut self, tree: &ModuleTree, id: &ModuleId) -> CascadeResult<bool> {
        ensure_known(tree, id)?;
        Ok(self.expanded.remove(id))
    }

    /// Flip a module's state. Returns the new state.
    pub fn toggle(&mut self, tree: &ModuleTree, id: &ModuleId) -> CascadeResult<bool> {
        if self.collapse(tree, id)? {
            return Ok(false);
        }
        self.expanded.insert(id.clone());
        Ok(true)
    }

    /// Collapse everything.
    pub fn clear(&mut self) {
        self.expanded.clear();
    }
}

fn ensure_known(tree: &ModuleTree, id: &ModuleId) -> CascadeResult<()> {
    if tree.contains(id) {
        Ok(())
    } else {
        Err(CascadeError::unknown_module(id))
    }
}

/// Derives disclosure changes from cascade outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpansionPolicy;

impl ExpansionPolicy {
    /// Expand every module whose View was just enabled, plus its ancestors.
    ///
    /// Each module is visited at most once per call, so the cost is linear in
    /// the affected subtree plus the path above it.
    ///
    /// Returns the modules that went from collapsed to expanded.
    pub fn observe(
        tree: &ModuleTree,
        outcome: &CascadeOutcome,
        state: &mut DisclosureState,
    ) -> CascadeResult<Vec<ModuleId>> {
        let mut opened = Vec::new();
        let mut visited: HashSet<&ModuleId> = HashSet::new();
        for id in &outcome.view_enabled {
            let mut current = Some(id);
            while let Some(target) = current {
                // Everything above a visited module has been walked already
                if !visited.insert(target) {
                    break;
                }
                if state.expanded.insert(target.clone()) {
                    opened.push(target.clone());
                }
                current = tree.parent(target)?;
            }
        }
        Ok(opened)
    }
}
