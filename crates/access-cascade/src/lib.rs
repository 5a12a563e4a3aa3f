//! Access Cascade - Hierarchical Permission Resolver
//!
//! Maintains an authorization matrix over a tree of capability modules. Each
//! module carries five facets (View, Create, Edit, Delete, Download) and every
//! change made at a module ripples to all of its descendants.
//!
//! - [`ModuleTree`]: static module hierarchy built from configuration
//! - [`PermissionMatrix`]: per-module facet records
//! - [`resolve`]: the dependency rule among facets
//! - [`CascadeEngine`]: applies a toggle to a module and its subtree
//! - [`ExpansionPolicy`]: expands tree rows whose View was just granted
//! - [`EditSession`]: one editor's matrix and disclosure state
//!
//! # Example
//!
//! ```rust
//! use access_cascade::{CascadeEngine, Facet, ModuleNode, ModuleTree, PermissionMatrix};
//!
//! let tree = ModuleTree::from_nodes(vec![ModuleNode::new("assets", "Assets")
//!     .with_children(vec![ModuleNode::new("documents", "Documents").with_download()])])?;
//! let engine = CascadeEngine::new(&tree);
//! let mut matrix = PermissionMatrix::new();
//!
//! engine.apply(&mut matrix, &"assets".into(), Facet::Delete, true)?;
//! assert!(matrix.get(&"documents".into()).edit);
//! assert!(!matrix.get(&"documents".into()).download);
//! # Ok::<(), access_cascade::CascadeError>(())
//! ```
//!
//! The engine is synchronous and performs no I/O. Callers own the matrix and
//! hand the finished record to their own persistence layer.

pub mod cascade;
pub mod config;
pub mod error;
pub mod expansion;
pub mod facet;
pub mod matrix;
pub mod session;
pub mod tree;

pub use cascade::{CascadeEngine, CascadeOutcome, Intent};
pub use config::{ModuleList, TreeConfig};
pub use error::{CascadeError, CascadeResult, MalformedTreeError};
pub use expansion::{DisclosureState, ExpansionPolicy};
pub use facet::{resolve, Facet, ParseFacetError, PermissionRecord};
pub use matrix::PermissionMatrix;
pub use session::{AuthorizationGroup, EditSession};
pub use tree::{FlatModule, Module, ModuleId, ModuleNode, ModuleTree};
