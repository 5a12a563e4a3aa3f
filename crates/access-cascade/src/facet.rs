//! Permission facets and the dependency rule between them
//!
//! A module carries five facets. Four of them form a chain ordered by
//! privilege, `Delete ⇒ Edit ⇒ Create ⇒ View`; `Download` stands apart.
//!
//! Granting a chain facet grants everything below it. Revoking any chain facet
//! revokes the whole chain, whichever facet was toggled:
//!
//! ```rust
//! use access_cascade::{resolve, Facet, PermissionRecord};
//!
//! let granted = resolve(PermissionRecord::default(), Facet::Edit, true);
//! assert!(granted.view && granted.create && granted.edit);
//! assert!(!granted.delete);
//!
//! let revoked = resolve(granted, Facet::Edit, false);
//! assert!(!revoked.view && !revoked.create);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the five permission kinds on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facet {
    /// Read access
    View,
    /// Create new records
    Create,
    /// Modify existing records
    Edit,
    /// Remove records
    Delete,
    /// Export attached files
    Download,
}

impl Facet {
    /// Every facet, chain first.
    pub const ALL: [Facet; 5] = [
        Facet::View,
        Facet::Create,
        Facet::Edit,
        Facet::Delete,
        Facet::Download,
    ];

    /// The dependency chain, least privileged first.
    pub const CHAIN: [Facet; 4] = [Facet::View, Facet::Create, Facet::Edit, Facet::Delete];

    /// Whether this facet participates in the dependency chain.
    pub fn is_chain(self) -> bool {
        !matches!(self, Facet::Download)
    }

    /// Position in the chain, `None` for `Download`.
    pub fn rank(self) -> Option<usize> {
        Self::CHAIN.iter().position(|f| *f == self)
    }

    /// Lowercase name used in configuration and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Facet::View => "view",
            Facet::Create => "create",
            Facet::Edit => "edit",
            Facet::Delete => "delete",
            Facet::Download => "download",
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unrecognised facet name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown facet {0:?}")]
pub struct ParseFacetError(pub String);

impl FromStr for Facet {
    type Err = ParseFacetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Facet::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseFacetError(s.to_string()))
    }
}

/// The five facet flags of a single module.
///
/// Serializes with the field names persisted on authorization-group records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionRecord {
    /// View flag
    #[serde(rename = "isView")]
    pub view: bool,
    /// Create flag
    #[serde(rename = "isCreate")]
    pub create: bool,
    /// Edit flag
    #[serde(rename = "isEdit")]
    pub edit: bool,
    /// Delete flag
    #[serde(rename = "isDelete")]
    pub delete: bool,
    /// Download flag
    #[serde(rename = "isDownload")]
    pub download: bool,
}

impl PermissionRecord {
    /// Record with every facet set.
    pub const FULL: PermissionRecord = PermissionRecord {
        view: true,
        create: true,
        edit: true,
        delete: true,
        download: true,
    };

    /// Read a single facet.
    pub fn get(&self, facet: Facet) -> bool {
        match facet {
            Facet::View => self.view,
            Facet::Create => self.create,
            Facet::Edit => self.edit,
            Facet::Delete => self.delete,
            Facet::Download => self.download,
        }
    }

    /// Overwrite a single facet without applying the dependency rule.
    fn set(&mut self, facet: Facet, value: bool) {
        match facet {
            Facet::View => self.view = value,
            Facet::Create => self.create = value,
            Facet::Edit => self.edit = value,
            Facet::Delete => self.delete = value,
            Facet::Download => self.download = value,
        }
    }

    /// True when no facet is set.
    pub fn is_empty(&self) -> bool {
        Facet::ALL.iter().all(|f| !self.get(*f))
    }

    /// Whether the chain facets satisfy `Delete ⇒ Edit ⇒ Create ⇒ View`.
    pub fn chain_consistent(&self) -> bool {
        (!self.delete || self.edit) && (!self.edit || self.create) && (!self.create || self.view)
    }

    /// Facets currently set, in `Facet::ALL` order.
    pub fn granted(&self) -> Vec<Facet> {
        Facet::ALL.into_iter().filter(|f| self.get(*f)).collect()
    }
}

/// Apply the dependency rule for one facet toggle.
///
/// - Enabling a chain facet enables it and every chain facet below it; facets
///   above it and `Download` are left as they were.
/// - Disabling any chain facet clears all four chain facets.
/// - `Download` is set alone.
///
/// Download support gating is the caller's concern; see
/// [`CascadeEngine`](crate::CascadeEngine).
pub fn resolve(current: PermissionRecord, facet: Facet, value: bool) -> PermissionRecord {
    let mut next = current;
    match (facet.rank(), value) {
        (None, _) => next.set(Facet::Download, value),
        (Some(rank), true) => {
            for lower in &Facet::CHAIN[..=rank] {
                next.set(*lower, true);
            }
        }
        (Some(_), false) => {
            for chain in Facet::CHAIN {
                next.set(chain, false);
            }
        }
    }
    next
}
