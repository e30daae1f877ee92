//! Pre-order linearization of a CST

use super::node::Node;

/// Every node of the tree in pre-order: a node, then each child subtree
///
/// Whitespace and comments are included. Because ids are pre-order indexes,
/// `flatten(root)[i].id() == i` for any tree produced by a parse.
pub fn flatten(root: &Node) -> Vec<&Node> {
    let mut nodes = Vec::new();
    push_pre_order(root, &mut nodes);
    nodes
}

fn push_pre_order<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
    out.push(node);
    for child in node.children() {
        push_pre_order(child, out);
    }
}

/// Leaves in source order
pub fn leaves(root: &Node) -> Vec<&Node> {
    flatten(root)
        .into_iter()
        .filter(|node| node.children().is_empty())
        .collect()
}
