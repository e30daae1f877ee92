//! Golden-dump tests for the Clojure grammar
//!
//! Each case in `fixtures/parser_tests.json` pairs an input with the
//! expected [`dump`] of its tree.

use clj_style_core::cst::{Grammar, Parser, Rule, leaves};
use clj_style_core::{GrammarError, dump, parse, try_parse};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct DumpCase {
    name: String,
    input: String,
    expected: String,
}

fn load_cases() -> Vec<DumpCase> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/parser_tests.json");
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|_| panic!("Failed to read fixture file: {}", path.display()));
    serde_json::from_str(&content).expect("Fixture file should be valid JSON")
}

#[test]
fn test_fixture_dumps() {
    let cases = load_cases();
    assert!(!cases.is_empty());

    let mut failures = Vec::new();
    for case in &cases {
        let actual = dump(&parse(&case.input));
        if actual != case.expected {
            failures.push(format!(
                "{}\n--- expected\n{}\n--- actual\n{}",
                case.name, case.expected, actual
            ));
        }
    }
    assert!(
        failures.is_empty(),
        "{} of {} fixture(s) failed:\n\n{}",
        failures.len(),
        cases.len(),
        failures.join("\n\n")
    );
}

#[test]
fn test_fixture_inputs_are_lossless() {
    for case in load_cases() {
        let root = parse(&case.input);
        let rebuilt: String = leaves(&root).iter().filter_map(|n| n.text()).collect();
        assert_eq!(rebuilt, case.input, "{}", case.name);
    }
}

#[test]
fn test_try_parse_matches_parse() {
    let source = "(ns foo.bar (:require [a.b :as c]))";
    assert_eq!(try_parse(source).unwrap(), parse(source));
}

#[test]
fn test_unterminated_string_spans_to_end() {
    let root = parse("\"abc");
    let string = &root.children()[0];
    assert!(string.is(Rule::String));
    assert_eq!((string.start(), string.end()), (0, 4));
    assert!(string.children().iter().all(|c| !c.is(Rule::Close)));
}

#[test]
fn test_input_without_ns_covers_everything() {
    let root = parse("(+ 1 2)");
    assert_eq!((root.start(), root.end()), (0, 7));
    assert_eq!(root.full_text(), "(+ 1 2)");
}

#[test]
fn test_custom_grammar() {
    let mut grammar = Grammar::new();
    grammar
        .register("word", Parser::regex("[a-z]+", Some(Rule::Token)).unwrap())
        .register("space", Parser::char(' ', Some(Rule::Whitespace)))
        .register(
            "source",
            Parser::repeat(
                Parser::choice(vec![Parser::rule("word"), Parser::rule("space")], None),
                None,
                0,
            ),
        );
    grammar.validate().unwrap();

    let root = grammar.parse("ab cd").unwrap();
    assert!(root.is(Rule::Source));
    assert_eq!(root.children().len(), 3);
    assert_eq!(root.children()[2].text(), Some("cd"));
}

#[test]
fn test_dangling_reference_is_reported() {
    let mut grammar = Grammar::new();
    grammar.register("source", Parser::rule("nowhere"));

    let err = grammar.validate().unwrap_err();
    assert!(matches!(err, GrammarError::UnknownRule { ref name } if name == "nowhere"));

    let err = grammar.parse("x").unwrap_err();
    assert_eq!(err.to_string(), "Could not find parser: nowhere");
}
