//! # Property-Based Tests
//!
//! Normalization invariants checked with proptest.

use ferry_core::{AliasTable, simple_var_type};
use proptest::collection::vec;
use proptest::prelude::*;

/// Spelling fragments that exercise qualifiers, references and templates.
fn fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "const", "int", "&", "&&", "*", " ", "std::vector", "<", ">", ", ", "x", "struct",
        "std::int32_t", "::",
    ])
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Simplifying twice changes nothing.
    #[test]
    fn simple_var_type_is_idempotent(parts in vec(fragment(), 0..12)) {
        let spelling: String = parts.concat();
        let once = simple_var_type(&spelling);
        let twice = simple_var_type(&once);
        prop_assert_eq!(once, twice);
    }

    /// The simple form never contains a reference or a `const` word.
    #[test]
    fn simple_var_type_strips_const_and_references(parts in vec(fragment(), 0..12)) {
        let simple = simple_var_type(&parts.concat());
        prop_assert!(!simple.contains('&'));
        prop_assert!(!simple.split(|c: char| !c.is_alphanumeric() && c != '_').any(|w| w == "const"));
    }

    /// Pointer markers are never dropped.
    #[test]
    fn simple_var_type_keeps_pointer_levels(levels in 0usize..6) {
        let spelling = format!("const int {}", "*".repeat(levels));
        let simple = simple_var_type(&spelling);
        prop_assert_eq!(simple.matches('*').count(), levels);
    }

    /// An acyclic alias chain resolves to its final target.
    #[test]
    fn alias_chain_reaches_fixed_point(length in 1usize..16, reversed in any::<bool>()) {
        let mut links: Vec<(String, String)> = (0..length)
            .map(|i| {
                let target = if i + 1 == length {
                    "Target".to_string()
                } else {
                    format!("Alias{}", i + 1)
                };
                (format!("Alias{}", i), target)
            })
            .collect();
        if reversed {
            links.reverse();
        }

        let mut table = AliasTable::new();
        for (name, target) in links {
            table.insert(name, target).expect("insert");
        }

        prop_assert_eq!(table.full_var_type("Alias0"), "Target");
        prop_assert_eq!(
            table.full_var_type("std::vector<Alias0>"),
            "std::vector<Target>"
        );
    }

    /// Resolution is a fixed point: resolving a resolved spelling is a no-op.
    #[test]
    fn full_var_type_is_stable(length in 1usize..8) {
        let mut table = AliasTable::new();
        for i in 0..length {
            table
                .insert(format!("A{}", i), format!("A{} *", i + 1))
                .expect("insert");
        }
        let full = table.full_var_type("A0");
        prop_assert_eq!(table.full_var_type(&full), full.clone());
        prop_assert_eq!(full.matches('*').count(), length);
    }
}
