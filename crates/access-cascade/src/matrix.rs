//! Permission matrix
//!
//! Per-module facet records keyed by module id. A missing key reads as an
//! all-false record, so an empty matrix grants nothing. The serialized shape,
//! a JSON object of `{ "<module id>": { "isView": .., ... } }`, is the record
//! persisted on authorization groups.

use crate::error::{CascadeError, CascadeResult};
use crate::facet::PermissionRecord;
use crate::tree::{ModuleId, ModuleTree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Facet records per module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionMatrix {
    records: BTreeMap<ModuleId, PermissionRecord>,
}

impl PermissionMatrix {
    /// Create an empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for a module, all-false when absent.
    pub fn get(&self, id: &ModuleId) -> PermissionRecord {
        self.records.get(id).copied().unwrap_or_default()
    }

    pub(crate) fn set(&mut self, id: &ModuleId, record: PermissionRecord) {
        match self.records.get_mut(id) {
            Some(existing) => *existing = record,
            None => {
                self.records.insert(id.clone(), record);
            }
        }
    }

    /// Stored records in id order, including explicit all-false entries.
    pub fn iter(&self) -> impl Iterator<Item = (&ModuleId, &PermissionRecord)> {
        self.records.iter()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are stored.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ids of modules with at least one facet set.
    pub fn granted_modules(&self) -> Vec<&ModuleId> {
        self.records
            .iter()
            .filter(|(_, r)| !r.is_empty())
            .map(|(id, _)| id)
            .collect()
    }

    /// Drop records for modules the tree does not know and records with no
    /// facet set. Returns the unknown ids that were dropped.
    pub fn normalize(&mut self, tree: &ModuleTree) -> Vec<ModuleId> {
        let mut unknown = Vec::new();
        self.records.retain(|id, record| {
            if !tree.contains(id) {
                unknown.push(id.clone());
                return false;
            }
            !record.is_empty()
        });
        unknown
    }

    /// Whether two matrices grant the same facets, treating absent keys as
    /// all-false.
    pub fn equivalent(&self, other: &PermissionMatrix) -> bool {
        self.records
            .keys()
            .chain(other.records.keys())
            .all(|id| self.get(id) == other.get(id))
    }

    /// Parse the persisted JSON shape.
    pub fn from_json(json: &str) -> CascadeResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| CascadeError::record(format!("invalid permission matrix: {e}")))
    }

    /// Render the persisted JSON shape.
    pub fn to_json(&self) -> CascadeResult<String> {
        serde_json::to_string(self)
            .map_err(|e| CascadeError::record(format!("failed to encode permission matrix: {e}")))
    }
}

impl FromIterator<(ModuleId, PermissionRecord)> for PermissionMatrix {
    fn from_iter<I: IntoIterator<Item = (ModuleId, PermissionRecord)>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
