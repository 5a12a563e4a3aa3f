//! Edit sessions and authorization-group records
//!
//! An [`EditSession`] owns the matrix being edited and the tree disclosure
//! state for one editor. It is the single writer for its matrix; hosts with
//! concurrent editors keep one session per editor and serialize submits.

use crate::cascade::{CascadeEngine, CascadeOutcome, Intent};
use crate::error::{CascadeError, CascadeResult};
use crate::expansion::{DisclosureState, ExpansionPolicy};
use crate::facet::Facet;
use crate::matrix::PermissionMatrix;
use crate::tree::{ModuleId, ModuleTree};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// Authorization group record handed to persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationGroup {
    /// Group name
    pub name: String,
    /// Per-module facet grants
    #[serde(default)]
    pub permissions: PermissionMatrix,
}

impl AuthorizationGroup {
    /// Parse a persisted group record.
    pub fn from_json(json: &str) -> CascadeResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| CascadeError::record(format!("invalid authorization group: {e}")))
    }

    /// Render the group record for persistence.
    pub fn to_json(&self) -> CascadeResult<String> {
        serde_json::to_string(self)
            .map_err(|e| CascadeError::record(format!("failed to encode authorization group: {e}")))
    }
}

/// One editor's in-progress changes to an authorization group.
#[derive(Debug, Clone)]
pub struct EditSession {
    tree: Arc<ModuleTree>,
    matrix: PermissionMatrix,
    disclosure: DisclosureState,
    name: Option<String>,
}

impl EditSession {
    /// Start editing a new, empty group.
    pub fn new(tree: Arc<ModuleTree>) -> Self {
        Self {
            tree,
            matrix: PermissionMatrix::new(),
            disclosure: DisclosureState::new(),
            name: None,
        }
    }

    /// Start editing an existing group.
    ///
    /// Grants on modules the tree no longer contains are dropped.
    pub fn editing(tree: Arc<ModuleTree>, group: AuthorizationGroup) -> Self {
        let AuthorizationGroup {
            name,
            permissions: mut matrix,
        } = group;
        let dropped = matrix.normalize(&tree);
        if !dropped.is_empty() {
            warn!(group = %name, ?dropped, "dropping grants on unknown modules");
        }
        debug!(group = %name, modules = matrix.len(), "editing authorization group");
        Self {
            tree,
            matrix,
            disclosure: DisclosureState::new(),
            name: Some(name),
        }
    }

    /// Toggle a facet on a module and update disclosure.
    pub fn apply(
        &mut self,
        module: &ModuleId,
        facet: Facet,
        value: bool,
    ) -> CascadeResult<CascadeOutcome> {
        let outcome = CascadeEngine::new(&self.tree).apply(&mut self.matrix, module, facet, value)?;
        ExpansionPolicy::observe(&self.tree, &outcome, &mut self.disclosure)?;
        Ok(outcome)
    }

    /// Apply a queued intent.
    pub fn apply_intent(&mut self, intent: &Intent) -> CascadeResult<CascadeOutcome> {
        self.apply(&intent.module, intent.facet, intent.value)
    }

    /// Toggle a facet across every root.
    pub fn apply_all(&mut self, facet: Facet, value: bool) -> CascadeResult<CascadeOutcome> {
        let outcome = CascadeEngine::new(&self.tree).apply_all(&mut self.matrix, facet, value)?;
        ExpansionPolicy::observe(&self.tree, &outcome, &mut self.disclosure)?;
        Ok(outcome)
    }

    /// The module tree being edited against.
    pub fn tree(&self) -> &ModuleTree {
        &self.tree
    }

    /// Current grants.
    pub fn matrix(&self) -> &PermissionMatrix {
        &self.matrix
    }

    /// Current disclosure state.
    pub fn disclosure(&self) -> &DisclosureState {
        &self.disclosure
    }

    /// Mutable disclosure state for manual expand and collapse.
    pub fn disclosure_mut(&mut self) -> &mut DisclosureState {
        &mut self.disclosure
    }

    /// Name of the group being edited, if it already existed.
    pub fn existing_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Finish the session and produce the record to persist.
    ///
    /// Records with no facet set are omitted.
    pub fn into_group(self, name: impl Into<String>) -> CascadeResult<AuthorizationGroup> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(CascadeError::invalid_group("group name must not be empty"));
        }

        let mut permissions = self.matrix;
        permissions.normalize(&self.tree);
        debug!(group = %name, modules = permissions.len(), "authorization group ready");
        Ok(AuthorizationGroup { name, permissions })
    }
}
