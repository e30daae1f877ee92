//! Tests for the `ns` form extractor
//!
//! Fixture cases compare the JSON form of the descriptor; the remaining
//! tests check individual fields.

use clj_style_core::ns::{GenClassValue, Refer};
use clj_style_core::{NsDescriptor, flatten, parse, parse_ns};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct NsCase {
    name: String,
    input: String,
    expected: Value,
}

fn ns_of(source: &str) -> Option<NsDescriptor> {
    let root = parse(source);
    parse_ns(&flatten(&root))
}

#[test]
fn test_fixture_descriptors() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/parse_ns_tests.json");
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to read fixture file: {}", path.display()));
    let cases: Vec<NsCase> = serde_json::from_str(&content).unwrap();

    for case in cases {
        let actual = serde_json::to_value(ns_of(&case.input)).unwrap();
        assert_eq!(
            actual, case.expected,
            "ns fixture '{}' failed\ninput: {:?}",
            case.name, case.input
        );
    }
}

#[test]
fn test_basic_require() {
    let ns = ns_of("(ns foo.bar (:require [a.b :as c]))").unwrap();
    assert_eq!(ns.ns_symbol.as_deref(), Some("foo.bar"));
    assert_eq!(ns.requires.len(), 1);
    assert_eq!(ns.requires[0].symbol, "a.b");
    assert_eq!(ns.requires[0].as_sym.as_deref(), Some("c"));
}

#[test]
fn test_prefix_list_shares_id() {
    let ns = ns_of("(ns x (:require [a [b :as c] [d]]))").unwrap();
    let symbols: Vec<_> = ns.requires.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["a.b", "a.d"]);
    assert_eq!(ns.requires[0].as_sym.as_deref(), Some("c"));
    assert!(ns.requires[0].prefix_list_id.is_some());
    assert_eq!(ns.requires[0].prefix_list_id, ns.requires[1].prefix_list_id);
}

#[test]
fn test_separate_prefix_lists_get_distinct_ids() {
    let ns = ns_of("(ns x (:require [a [b] [c]] [d [e]]))").unwrap();
    let ids: Vec<_> = ns.requires.iter().map(|r| (r.symbol.as_str(), r.prefix_list_id)).collect();
    assert_eq!(ids, vec![("a.b", Some(1)), ("a.c", Some(1)), ("d.e", Some(2))]);
}

#[test]
fn test_prefix_list_comments() {
    let source = "(ns x\n  (:require\n    ;; shared\n    [a [b] [c]] ; both\n    ))";
    let ns = ns_of(source).unwrap();
    let comments = &ns.prefix_list_comments[&1];
    assert_eq!(comments.comments_above, vec![";; shared"]);
    assert_eq!(comments.comment_after.as_deref(), Some("; both"));
}

#[test]
fn test_trailing_and_leading_comments() {
    let source = "(ns x\n  (:require\n    ;; about b\n    [b.c]\n    [a.b]) ; note\n  )";
    let ns = ns_of(source).unwrap();

    let a = ns.requires.iter().find(|r| r.symbol == "a.b").unwrap();
    assert_eq!(a.comment_after.as_deref(), Some("; note"));

    let b = ns.requires.iter().find(|r| r.symbol == "b.c").unwrap();
    assert_eq!(b.comments_above, vec![";; about b"]);
    assert_eq!(b.comment_after, None);
}

#[test]
fn test_comment_on_require_keyword_line() {
    let ns = ns_of("(ns x\n  (:require ; deps\n    [a]))").unwrap();
    assert_eq!(ns.require_comment_after.as_deref(), Some("; deps"));
    assert_eq!(ns.requires[0].comment_after, None);
}

#[test]
fn test_reader_conditional_sections() {
    let ns = ns_of("(ns x #?(:clj (:require [a]) :cljs (:require [b])))").unwrap();
    let platforms: Vec<_> = ns
        .requires
        .iter()
        .map(|r| (r.symbol.as_str(), r.platform.as_deref()))
        .collect();
    assert_eq!(platforms, vec![("a", Some("clj")), ("b", Some("cljs"))]);
}

#[test]
fn test_nested_reader_conditionals_use_innermost_platform() {
    let ns = ns_of("(ns x (:require #?(:clj #?(:bb [a] :default [b]))))").unwrap();
    let platforms: Vec<_> = ns
        .requires
        .iter()
        .map(|r| (r.symbol.as_str(), r.platform.as_deref()))
        .collect();
    assert_eq!(platforms, vec![("a", Some("bb")), ("b", Some("default"))]);
}

#[test]
fn test_no_ns_form() {
    assert!(ns_of("(+ 1 2)").is_none());
    assert!(ns_of("").is_none());
    assert!(ns_of("ns").is_none());
}

#[test]
fn test_require_options() {
    let source = r#"(ns x
  (:require
    [a.b :as-alias ab]
    [c.d :refer [z y] :exclude [w] :rename {y why}]
    [e.f :refer-macros [m] :include-macros true]
    ["left-pad" :default leftPad]))"#;
    let ns = ns_of(source).unwrap();
    let by_symbol = |s: &str| ns.requires.iter().find(|r| r.symbol == s).unwrap();

    assert_eq!(by_symbol("a.b").as_alias.as_deref(), Some("ab"));

    let cd = by_symbol("c.d");
    match &cd.refer {
        Some(Refer::Symbols(symbols)) => {
            let names: Vec<_> = symbols.iter().map(|s| s.symbol.as_str()).collect();
            assert_eq!(names, vec!["y", "z"]);
        }
        other => panic!("expected refer symbols, got {other:?}"),
    }
    assert_eq!(cd.exclude.as_ref().unwrap()[0].symbol, "w");
    let rename = &cd.rename.as_ref().unwrap()[0];
    assert_eq!((rename.from_symbol.as_str(), rename.to_symbol.as_str()), ("y", "why"));

    let ef = by_symbol("e.f");
    assert_eq!(ef.refer_macros.as_ref().unwrap()[0].symbol, "m");
    assert_eq!(ef.include_macros, Some(true));

    let pad = by_symbol("left-pad");
    assert!(pad.symbol_is_string);
    assert_eq!(pad.default.as_deref(), Some("leftPad"));
}

#[test]
fn test_refer_clojure_clauses() {
    let source = "(ns x\n  ;; core\n  (:refer-clojure :only [map] :rename {map core-map})) ; rc";
    let ns = ns_of(source).unwrap();
    let refer_clojure = ns.refer_clojure.unwrap();

    assert_eq!(refer_clojure.only.unwrap()[0].symbol, "map");
    let rename = &refer_clojure.rename.unwrap()[0];
    assert_eq!(rename.to_symbol, "core-map");
    assert_eq!(ns.refer_clojure_comments_above, vec![";; core"]);
    assert_eq!(ns.refer_clojure_comment_after.as_deref(), Some("; rc"));
}

#[test]
fn test_import_comments() {
    let source = "(ns x\n  (:import\n    ;; time\n    (java.time Instant) ; now\n    ))";
    let ns = ns_of(source).unwrap();
    let entry = &ns.imports_obj["java.time"];
    assert_eq!(entry.classes, vec!["Instant"]);
    assert_eq!(entry.comments_above, vec![";; time"]);
    assert_eq!(entry.comment_after.as_deref(), Some("; now"));
}

#[test]
fn test_gen_class_options() {
    let source = "(ns x\n  (:gen-class\n    :prefix \"my-\"\n    ;; entry point\n    :main true ; yes\n    :implements [Runnable]))";
    let ns = ns_of(source).unwrap();
    let gen_class = ns.gen_class.unwrap();

    assert_eq!(
        gen_class.options["prefix"].value,
        GenClassValue::Text("my-".to_string())
    );
    let main = &gen_class.options["main"];
    assert_eq!(main.value, GenClassValue::Bool(true));
    assert_eq!(main.comments_above, vec![";; entry point"]);
    assert_eq!(main.comment_after.as_deref(), Some("; yes"));
    assert!(!gen_class.options.contains_key("implements"));
}

#[test]
fn test_use_clause_is_ignored() {
    let ns = ns_of("(ns x (:use [a.b]) (:require [c]))").unwrap();
    let symbols: Vec<_> = ns.requires.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["c"]);
}

#[test]
fn test_descriptor_is_sorted() {
    let ns = ns_of("(ns x (:require [zeta] [alpha] [mid]))").unwrap();
    let symbols: Vec<_> = ns.requires.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["alpha", "mid", "zeta"]);
}
