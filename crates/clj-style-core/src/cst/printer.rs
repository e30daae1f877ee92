//! S-expression debug dump of a CST
//!
//! ```text
//! (source 0..7
//!   (parens 0..7
//!     (.open 0..1 '(')
//!     (.body 1..6
//!       (token 1..2 '+')
//!       (token 3..4 '1')
//!       (token 5..6 '2'))
//!     (.close 6..7 ')')))
//! ```
//!
//! Spans are 0-based, end-exclusive byte offsets. Whitespace nodes are left
//! out, and newlines inside text are written as `\n`. Golden fixtures are
//! compared against this format.

use std::fmt::Write;

use super::node::{Node, Rule};

/// Render `node` and its subtree
pub fn dump(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, 0, &mut out);
    out
}

fn write_node(node: &Node, depth: usize, out: &mut String) {
    if node.is(Rule::Whitespace) {
        return;
    }
    if !node.is(Rule::Source) {
        out.push('\n');
        out.push_str(&"  ".repeat(depth));
    }
    let name = node.name().map_or("_", Rule::as_str);
    let _ = write!(out, "({} {}..{}", name, node.start(), node.end());
    if let Some(text) = node.text_if_present() {
        let _ = write!(out, " '{}'", text.replace('\n', "\\n"));
    }
    for child in node.children() {
        write_node(child, depth + 1, out);
    }
    out.push(')');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newlines_escaped() {
        let node = Node::leaf(Some(Rule::Comment), 0, "; a\n");
        assert_eq!(dump(&node), "\n(comment 0..4 '; a\\n')");
    }

    #[test]
    fn test_anonymous_and_whitespace() {
        let node = Node::branch(
            None,
            0,
            3,
            vec![
                Node::leaf(Some(Rule::Token), 0, "a"),
                Node::leaf(Some(Rule::Whitespace), 1, " "),
                Node::leaf(Some(Rule::Token), 2, "b"),
            ],
        );
        assert_eq!(
            dump(&node),
            "\n(_ 0..3\n  (token 0..1 'a')\n  (token 2..3 'b'))"
        );
    }
}
