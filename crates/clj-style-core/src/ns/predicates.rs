//! Node classification helpers used by the `ns` extractor

use crate::cst::{Node, Rule};

/// Keys accepted inside `(:gen-class ...)`
pub const GEN_CLASS_KEYS: &[&str] = &[
    "name",
    "extends",
    "implements",
    "init",
    "constructors",
    "post-init",
    "methods",
    "main",
    "factory",
    "state",
    "exposes",
    "exposes-methods",
    "prefix",
    "impl-ns",
    "load-impl-ns",
];

/// How the value of a `:gen-class` key is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenClassKeyKind {
    /// `:prefix "..."`
    Text,
    /// `:name Foo`, `:extends Bar`, ...
    Symbol,
    /// `:main true`
    Boolean,
    /// `:implements [..]`, `:methods [..]`, ... (not modeled)
    Composite,
}

pub fn gen_class_key_kind(key: &str) -> GenClassKeyKind {
    match key {
        "prefix" => GenClassKeyKind::Text,
        "name" | "extends" | "init" | "post-init" | "factory" | "state" | "impl-ns" => {
            GenClassKeyKind::Symbol
        }
        "main" | "load-impl-ns" => GenClassKeyKind::Boolean,
        _ => GenClassKeyKind::Composite,
    }
}

pub fn text_is(node: &Node, expected: &str) -> bool {
    node.text() == Some(expected)
}

pub fn is_newline_node(node: &Node) -> bool {
    node.is(Rule::Whitespace) && node.text().is_some_and(|t| t.contains('\n'))
}

pub fn is_whitespace_node(node: &Node) -> bool {
    node.is(Rule::Whitespace)
}

pub fn is_token_node(node: &Node) -> bool {
    node.is(Rule::Token)
}

pub fn is_comment_node(node: &Node) -> bool {
    node.is(Rule::Comment)
}

pub fn is_discard_node(node: &Node) -> bool {
    node.is(Rule::Discard)
}

pub fn is_ns_node(node: &Node) -> bool {
    is_token_node(node) && text_is(node, "ns")
}

pub fn is_refer_clojure_node(node: &Node) -> bool {
    text_is(node, ":refer-clojure") || text_is(node, "refer-clojure")
}

pub fn is_require_node(node: &Node) -> bool {
    text_is(node, ":require") || text_is(node, "require")
}

pub fn is_import_node(node: &Node) -> bool {
    text_is(node, ":import") || text_is(node, "import")
}

pub fn is_require_macros_node(node: &Node) -> bool {
    text_is(node, ":require-macros")
}

pub fn is_gen_class_node(node: &Node) -> bool {
    text_is(node, ":gen-class")
}

pub fn is_use_node(node: &Node) -> bool {
    text_is(node, ":use") || text_is(node, "use")
}

/// Opening delimiter of a list, vector, map, set or reader conditional
pub fn is_opener(node: &Node) -> bool {
    if !node.is(Rule::Open) {
        return false;
    }
    match node.text() {
        Some("(" | "[" | "{" | "#{" | "#(" | "#?(" | "#?@(" | "#=(") => true,
        Some(text) => is_namespaced_map_opener(text),
        None => false,
    }
}

fn is_namespaced_map_opener(text: &str) -> bool {
    text.starts_with("#:") && text.ends_with('{')
}

pub fn is_closer(node: &Node) -> bool {
    node.is(Rule::Close) && matches!(node.text(), Some(")" | "]" | "}"))
}

pub fn is_reader_conditional_opener(node: &Node) -> bool {
    node.is(Rule::Open) && matches!(node.text(), Some("#?(" | "#?@("))
}

/// Token starting with `:`
pub fn is_keyword_node(node: &Node) -> bool {
    is_token_node(node) && node.text().is_some_and(|t| t.starts_with(':'))
}

/// Token that is not a keyword
pub fn is_symbol_node(node: &Node) -> bool {
    is_token_node(node) && node.has_text() && !is_keyword_node(node)
}

pub fn is_boolean_node(node: &Node) -> bool {
    text_is(node, "true") || text_is(node, "false")
}

/// `^` or `#^` metadata marker
pub fn is_meta_marker(node: &Node) -> bool {
    node.is(Rule::Marker) && matches!(node.text(), Some("^" | "#^"))
}

/// A terminated string: open quote, body, close quote
pub fn is_string_node(node: &Node) -> bool {
    node.is(Rule::String)
        && node.children().len() == 3
        && node.children()[1].is(Rule::Body)
}

/// Body of a string node; empty for `""`
pub fn string_body(node: &Node) -> Option<&str> {
    if !node.is(Rule::String) {
        return None;
    }
    Some(
        node.children()
            .iter()
            .find(|child| child.is(Rule::Body))
            .and_then(Node::text)
            .unwrap_or(""),
    )
}

pub fn is_gen_class_keyword(node: &Node) -> bool {
    is_keyword_node(node)
        && node
            .text()
            .and_then(|t| t.strip_prefix(':'))
            .is_some_and(|key| GEN_CLASS_KEYS.contains(&key))
}

/// First node at or after `start` that is not whitespace
pub fn find_next_non_whitespace<'a>(nodes: &[&'a Node], start: usize) -> Option<&'a Node> {
    nodes.iter().skip(start).copied().find(|n| !is_whitespace_node(n))
}

/// First node at or after `start` that carries text
pub fn find_next_node_with_text<'a>(nodes: &[&'a Node], start: usize) -> Option<&'a Node> {
    nodes.iter().skip(start).copied().find(|n| n.has_text())
}

/// Next token before the enclosing form closes
pub fn find_next_token_inside_form<'a>(nodes: &[&'a Node], start: usize) -> Option<&'a Node> {
    for node in nodes.iter().skip(start).copied() {
        if is_closer(node) {
            return None;
        }
        if is_token_node(node) && node.has_text() {
            return Some(node);
        }
    }
    None
}

/// Next node that is not whitespace, a comment, or a container shell
///
/// Containers (`parens`, `.body`, ...) are skipped so the answer is the
/// first leaf, e.g. the `.open` of a nested list.
pub fn find_next_significant_leaf<'a>(nodes: &[&'a Node], start: usize) -> Option<&'a Node> {
    nodes
        .iter()
        .skip(start)
        .copied()
        .find(|n| n.has_text() && !is_whitespace_node(n) && !is_comment_node(n))
}

/// Split `java.util.Date` into package and class
///
/// The last dot-separated segment is a class name if it starts with an
/// uppercase letter; otherwise the whole token is a package.
pub fn parse_java_package_with_class(s: &str) -> (String, Option<String>) {
    let (package, last) = s.rsplit_once('.').unwrap_or(("", s));
    if last.chars().next().is_some_and(char::is_uppercase) {
        (package.to_string(), Some(last.to_string()))
    } else {
        (s.to_string(), None)
    }
}
