//! Property tests for the cascade engine over generated trees and matrices

mod strategies;

use access_cascade::{resolve, CascadeEngine, Facet, PermissionMatrix};
use proptest::prelude::*;
use std::collections::HashSet;
use strategies::{arb_case, arb_consistent_case, CascadeCase};

fn apply(case: &CascadeCase) -> PermissionMatrix {
    let mut matrix = case.matrix.clone();
    CascadeEngine::new(&case.tree)
        .apply(&mut matrix, &case.module, case.facet, case.value)
        .unwrap();
    matrix
}

proptest! {
    #[test]
    fn prop_apply_is_idempotent(case in arb_case()) {
        let once = apply(&case);
        let mut twice = once.clone();
        let outcome = CascadeEngine::new(&case.tree)
            .apply(&mut twice, &case.module, case.facet, case.value)
            .unwrap();
        prop_assert_eq!(&twice, &once);
        prop_assert!(outcome.changed.is_empty());
    }

    #[test]
    fn prop_enable_preserves_chain_order(case in arb_consistent_case()) {
        let case = CascadeCase { value: true, ..case };
        let result = apply(&case);
        for module in case.tree.iter() {
            prop_assert!(result.get(module.id()).chain_consistent(), "module {}", module.id());
        }
    }

    #[test]
    fn prop_disable_clears_chain_on_subtree(case in arb_case()) {
        prop_assume!(case.facet.is_chain());
        let case = CascadeCase { value: false, ..case };
        let result = apply(&case);

        let mut subtree = case.tree.descendants(&case.module).unwrap();
        subtree.push(case.module.clone());
        for id in &subtree {
            let after = result.get(id);
            prop_assert!(!after.view && !after.create && !after.edit && !after.delete);
        }
        for module in case.tree.iter() {
            prop_assert_eq!(
                result.get(module.id()).download,
                case.matrix.get(module.id()).download
            );
        }
    }

    #[test]
    fn prop_propagation_matches_rule(case in arb_case()) {
        let result = apply(&case);
        let tree = &case.tree;
        let target_rejected = case.facet == Facet::Download
            && !tree.supports_download(&case.module).unwrap();

        let mut subtree: HashSet<_> = tree.descendants(&case.module).unwrap().into_iter().collect();
        subtree.insert(case.module.clone());

        for module in tree.iter() {
            let before = case.matrix.get(module.id());
            let after = result.get(module.id());
            let skipped = target_rejected
                || !subtree.contains(module.id())
                || (case.facet == Facet::Download && !module.supports_download());
            if skipped {
                prop_assert_eq!(after, before, "module {} should be untouched", module.id());
            } else {
                prop_assert_eq!(after, resolve(before, case.facet, case.value));
            }
        }
    }

    #[test]
    fn prop_download_gated_on_target(case in arb_case()) {
        prop_assume!(!case.tree.supports_download(&case.module).unwrap());
        let mut matrix = case.matrix.clone();
        let outcome = CascadeEngine::new(&case.tree)
            .apply(&mut matrix, &case.module, Facet::Download, true)
            .unwrap();
        prop_assert!(outcome.download_rejected);
        prop_assert_eq!(matrix, case.matrix);
    }

    #[test]
    fn prop_view_enabled_reports_transitions(case in arb_case()) {
        let mut matrix = case.matrix.clone();
        let outcome = CascadeEngine::new(&case.tree)
            .apply(&mut matrix, &case.module, case.facet, case.value)
            .unwrap();
        for module in case.tree.iter() {
            let turned_on = !case.matrix.get(module.id()).view && matrix.get(module.id()).view;
            prop_assert_eq!(outcome.view_enabled.contains(module.id()), turned_on);
        }
    }
}
