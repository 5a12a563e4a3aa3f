//! Proptest strategies for module trees and permission matrices

#![allow(dead_code)]

use access_cascade::{Facet, FlatModule, ModuleId, ModuleTree, PermissionMatrix, PermissionRecord};
use proptest::prelude::*;
use proptest::sample::Index;

/// A tree, a starting matrix and one intent aimed at a module in the tree.
#[derive(Debug, Clone)]
pub struct CascadeCase {
    pub tree: ModuleTree,
    pub matrix: PermissionMatrix,
    pub module: ModuleId,
    pub facet: Facet,
    pub value: bool,
}

/// Generate forests of up to 16 modules; each module's parent is an earlier
/// module or none.
pub fn arb_tree() -> impl Strategy<Value = ModuleTree> {
    (1usize..16)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(any::<bool>(), n),
                prop::collection::vec(prop::option::weighted(0.8, any::<Index>()), n),
            )
        })
        .prop_map(|(downloads, parents)| {
            let mut modules: Vec<FlatModule> = downloads
                .iter()
                .enumerate()
                .map(|(i, supports_download)| FlatModule {
                    id: ModuleId::new(format!("m{i}")),
                    label: String::new(),
                    supports_download: *supports_download,
                    children: Vec::new(),
                })
                .collect();
            for (i, parent) in parents.iter().enumerate().skip(1) {
                if let Some(index) = parent {
                    let id = modules[i].id.clone();
                    modules[index.index(i)].children.push(id);
                }
            }
            ModuleTree::from_flat(modules).expect("generated forest is well formed")
        })
}

pub fn arb_facet() -> impl Strategy<Value = Facet> {
    prop::sample::select(Facet::ALL.to_vec())
}

/// Any combination of flags, including chain-inconsistent ones.
pub fn arb_record() -> impl Strategy<Value = PermissionRecord> {
    any::<[bool; 5]>().prop_map(|[view, create, edit, delete, download]| PermissionRecord {
        view,
        create,
        edit,
        delete,
        download,
    })
}

/// Records that already satisfy the chain order.
pub fn arb_consistent_record() -> impl Strategy<Value = PermissionRecord> {
    (0usize..=4, any::<bool>()).prop_map(|(level, download)| PermissionRecord {
        view: level >= 1,
        create: level >= 2,
        edit: level >= 3,
        delete: level >= 4,
        download,
    })
}

fn arb_case_with<S>(records: fn() -> S) -> impl Strategy<Value = CascadeCase>
where
    S: Strategy<Value = PermissionRecord> + 'static,
{
    arb_tree()
        .prop_flat_map(move |tree| {
            let n = tree.len();
            (
                Just(tree),
                prop::collection::vec(prop::option::of(records()), n),
                0..n,
                arb_facet(),
                any::<bool>(),
            )
        })
        .prop_map(|(tree, records, target, facet, value)| {
            let ids: Vec<ModuleId> = tree.iter().map(|m| m.id().clone()).collect();
            let matrix = ids
                .iter()
                .zip(records)
                .filter_map(|(id, record)| record.map(|r| (id.clone(), r)))
                .collect();
            CascadeCase {
                module: ids[target].clone(),
                tree,
                matrix,
                facet,
                value,
            }
        })
}

/// Cases starting from arbitrary matrices.
pub fn arb_case() -> impl Strategy<Value = CascadeCase> {
    arb_case_with(arb_record)
}

/// Cases starting from chain-consistent matrices.
pub fn arb_consistent_case() -> impl Strategy<Value = CascadeCase> {
    arb_case_with(arb_consistent_record)
}
