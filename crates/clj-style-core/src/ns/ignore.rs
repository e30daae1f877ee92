//! `:standard-clj/ignore-file` directive

use super::predicates::{is_ns_node, text_is};
use crate::cst::Node;

/// Keyword that opts a file out of formatting
pub const IGNORE_FILE_KEYWORD: &str = ":standard-clj/ignore-file";

/// True if the ignore-file keyword appears before the `ns` symbol
///
/// The directive is usually written as `#_:standard-clj/ignore-file` or
/// inside a discarded map, so any token with that exact text counts. Only the
/// part of the file before the first `ns` token is searched.
pub fn look_for_ignore_file(nodes: &[&Node]) -> bool {
    nodes
        .iter()
        .take_while(|node| !is_ns_node(node))
        .any(|node| text_is(node, IGNORE_FILE_KEYWORD))
}
