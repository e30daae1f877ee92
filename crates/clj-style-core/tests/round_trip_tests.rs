//! Property-based tests for the CST
//!
//! Any input, well-formed or not, must parse into a tree that reproduces
//! the input exactly.

use clj_style_core::cst::{flatten, leaves};
use clj_style_core::{parse, parse_ns};
use proptest::prelude::*;
use rayon::prelude::*;

/// Fragments that exercise every reader macro and delimiter
fn clojure_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("(".to_string()),
        Just(")".to_string()),
        Just("[".to_string()),
        Just("]".to_string()),
        Just("{".to_string()),
        Just("}".to_string()),
        Just("#{".to_string()),
        Just("#?(".to_string()),
        Just("#?@(".to_string()),
        Just("#_".to_string()),
        Just("#:ns{".to_string()),
        Just("^".to_string()),
        Just("'".to_string()),
        Just("@".to_string()),
        Just("~@".to_string()),
        Just("\"".to_string()),
        Just("\\".to_string()),
        Just(";".to_string()),
        Just(",".to_string()),
        Just("\n".to_string()),
        Just(" ".to_string()),
        Just("ns".to_string()),
        Just(":require".to_string()),
        "[a-z.]{1,6}",
        ":[a-z-]{1,6}",
        "[0-9]{1,3}",
    ]
}

fn clojure_like() -> impl Strategy<Value = String> {
    prop::collection::vec(clojure_fragment(), 0..40).prop_map(|parts| parts.concat())
}

proptest! {
    #[test]
    fn prop_leaves_rebuild_input(source in clojure_like()) {
        let root = parse(&source);
        let rebuilt: String = leaves(&root).iter().filter_map(|n| n.text()).collect();
        prop_assert_eq!(rebuilt, source);
    }

    #[test]
    fn prop_arbitrary_text_is_lossless(source in any::<String>()) {
        let root = parse(&source);
        prop_assert_eq!(root.full_text(), source.clone());
        prop_assert_eq!((root.start(), root.end()), (0, source.len()));
    }

    #[test]
    fn prop_parse_is_deterministic(source in clojure_like()) {
        prop_assert_eq!(parse(&source), parse(&source));
    }

    #[test]
    fn prop_ids_follow_preorder(source in clojure_like()) {
        let root = parse(&source);
        for (index, node) in flatten(&root).iter().enumerate() {
            prop_assert_eq!(node.id(), index as u64);
        }
    }

    #[test]
    fn prop_children_tile_parent(source in clojure_like()) {
        let root = parse(&source);
        for node in flatten(&root) {
            let mut pos = node.start();
            for child in node.children() {
                prop_assert_eq!(child.start(), pos);
                pos = child.end();
            }
            if !node.children().is_empty() {
                prop_assert_eq!(pos, node.end());
            }
        }
    }

    #[test]
    fn prop_ns_extraction_never_panics(source in clojure_like()) {
        let root = parse(&source);
        let _ = parse_ns(&flatten(&root));
    }
}

#[test]
fn test_parallel_parses_share_the_grammar() {
    let sources: Vec<String> = (0..64)
        .map(|i| format!("(ns app.module{i}\n  (:require [lib{i}.core :as l{i}]))\n(defn f{i} [x] x)\n"))
        .collect();

    let results: Vec<_> = sources
        .par_iter()
        .map(|source| {
            let root = parse(source);
            let ns = parse_ns(&flatten(&root));
            (root.full_text() == *source, ns.and_then(|ns| ns.ns_symbol))
        })
        .collect();

    for (i, (lossless, symbol)) in results.into_iter().enumerate() {
        assert!(lossless);
        assert_eq!(symbol, Some(format!("app.module{i}")));
    }
}
