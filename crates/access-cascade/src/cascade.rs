//! Cascade engine
//!
//! Applies a facet toggle to a module and ripples the same toggle through
//! every descendant. Each module's new record depends only on its own prior
//! record and the toggle, so the walk order does not affect the result.
//!
//! Download is gated per module: a toggle aimed at a module without download
//! support changes nothing, and descendants without support are skipped while
//! the rest of the subtree still receives the toggle.

use crate::error::CascadeResult;
use crate::facet::{resolve, Facet};
use crate::matrix::PermissionMatrix;
use crate::tree::{ModuleId, ModuleTree};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// A single requested facet change.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Intent {
    /// Module the toggle is aimed at
    pub module: ModuleId,
    /// Facet being toggled
    pub facet: Facet,
    /// Requested value
    pub value: bool,
}

impl Intent {
    /// Create an intent.
    pub fn new(module: impl Into<ModuleId>, facet: Facet, value: bool) -> Self {
        Self {
            module: module.into(),
            facet,
            value,
        }
    }
}

/// What an applied intent changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeOutcome {
    /// Modules whose record changed, in pre-order
    pub changed: Vec<ModuleId>,
    /// Modules whose View facet went from false to true, in pre-order
    pub view_enabled: Vec<ModuleId>,
    /// The intent was a Download toggle on a module without download support
    pub download_rejected: bool,
}

impl CascadeOutcome {
    /// Whether the matrix was left untouched.
    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }

    fn merge(&mut self, other: CascadeOutcome) {
        self.changed.extend(other.changed);
        self.view_enabled.extend(other.view_enabled);
        self.download_rejected |= other.download_rejected;
    }
}

/// Resolves intents against a module tree.
#[derive(Debug, Clone, Copy)]
pub struct CascadeEngine<'a> {
    tree: &'a ModuleTree,
}

impl<'a> CascadeEngine<'a> {
    /// Create an engine over a tree.
    pub fn new(tree: &'a ModuleTree) -> Self {
        Self { tree }
    }

    /// The tree intents are resolved against.
    pub fn tree(&self) -> &'a ModuleTree {
        self.tree
    }

    /// Apply `facet = value` to `module` and all of its descendants.
    ///
    /// Fails with [`CascadeError::UnknownModule`](crate::CascadeError::UnknownModule)
    /// when the tree does not contain `module`; the matrix is not touched in
    /// that case.
    pub fn apply(
        &self,
        matrix: &mut PermissionMatrix,
        module: &ModuleId,
        facet: Facet,
        value: bool,
    ) -> CascadeResult<CascadeOutcome> {
        let target = self.tree.find(module)?;

        if facet == Facet::Download && !target.supports_download() {
            debug!(
                module = %module,
                value,
                "download toggle ignored, module does not support download"
            );
            return Ok(CascadeOutcome {
                download_rejected: true,
                ..CascadeOutcome::default()
            });
        }

        let descendants = self.tree.descendants(module)?;
        let mut outcome = CascadeOutcome::default();
        for id in std::iter::once(module).chain(descendants.iter()) {
            if facet == Facet::Download && !self.tree.supports_download(id)? {
                trace!(module = %id, "skipping download on unsupported descendant");
                continue;
            }

            let before = matrix.get(id);
            let after = resolve(before, facet, value);
            if after == before {
                continue;
            }

            trace!(module = %id, ?before, ?after, "permission record updated");
            matrix.set(id, after);
            outcome.changed.push(id.clone());
            if !before.view && after.view {
                outcome.view_enabled.push(id.clone());
            }
        }

        debug!(
            module = %module,
            %facet,
            value,
            subtree = descendants.len() + 1,
            changed = outcome.changed.len(),
            "permission intent applied"
        );
        Ok(outcome)
    }

    /// Apply a queued [`Intent`].
    pub fn apply_intent(
        &self,
        matrix: &mut PermissionMatrix,
        intent: &Intent,
    ) -> CascadeResult<CascadeOutcome> {
        self.apply(matrix, &intent.module, intent.facet, intent.value)
    }

    /// Apply `facet = value` at every root, covering the whole forest.
    ///
    /// Roots without download support reject a Download toggle as in
    /// [`CascadeEngine::apply`], leaving their subtrees untouched.
    pub fn apply_all(
        &self,
        matrix: &mut PermissionMatrix,
        facet: Facet,
        value: bool,
    ) -> CascadeResult<CascadeOutcome> {
        let mut outcome = CascadeOutcome::default();
        for root in self.tree.roots() {
            outcome.merge(self.apply(matrix, root, facet, value)?);
        }
        Ok(outcome)
    }
}
