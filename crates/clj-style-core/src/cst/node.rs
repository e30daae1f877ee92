//! CST node value type

use serde::{Serialize, Serializer};
use std::fmt;

/// Tag carried by every semantically meaningful node
///
/// Child-role tags (`.open`, `.close`, `.body`, `.marker`, `.tag`, `.meta`)
/// start with a dot so they never collide with rule names in dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    Source,
    Token,
    String,
    Comment,
    Whitespace,
    Discard,
    Parens,
    Brackets,
    Braces,
    Meta,
    Wrap,
    Tagged,
    Error,
    Open,
    Close,
    Body,
    Marker,
    Tag,
    MetaValue,
}

impl Rule {
    /// Name used in debug dumps and JSON output
    pub fn as_str(self) -> &'static str {
        match self {
            Rule::Source => "source",
            Rule::Token => "token",
            Rule::String => "string",
            Rule::Comment => "comment",
            Rule::Whitespace => "whitespace",
            Rule::Discard => "discard",
            Rule::Parens => "parens",
            Rule::Brackets => "brackets",
            Rule::Braces => "braces",
            Rule::Meta => "meta",
            Rule::Wrap => "wrap",
            Rule::Tagged => "tagged",
            Rule::Error => "error",
            Rule::Open => ".open",
            Rule::Close => ".close",
            Rule::Body => ".body",
            Rule::Marker => ".marker",
            Rule::Tag => ".tag",
            Rule::MetaValue => ".meta",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Rule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Immutable node of the concrete syntax tree
///
/// Leaves carry `text`; containers carry `children` whose texts tile the
/// container's span. Direct children are always named: anonymous grouping
/// nodes are spliced into their parent while the tree is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    id: u64,
    name: Option<Rule>,
    start: usize,
    end: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

impl Node {
    /// Leaf covering `text` starting at `start`
    pub(crate) fn leaf(name: Option<Rule>, start: usize, text: &str) -> Self {
        Self {
            id: 0,
            name,
            start,
            end: start + text.len(),
            text: Some(text.to_string()),
            children: Vec::new(),
        }
    }

    /// Container spanning `start..end`
    pub(crate) fn branch(name: Option<Rule>, start: usize, end: usize, children: Vec<Node>) -> Self {
        Self {
            id: 0,
            name,
            start,
            end,
            text: None,
            children,
        }
    }

    /// Zero-width anonymous node at `pos`
    pub(crate) fn empty(pos: usize) -> Self {
        Self::branch(None, pos, pos, Vec::new())
    }

    /// Pre-order index of this node within its parse
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> Option<Rule> {
        self.name
    }

    /// Byte offset where the node starts
    pub fn start(&self) -> usize {
        self.start
    }

    /// Byte offset just past the node
    pub fn end(&self) -> usize {
        self.end
    }

    /// Text of a leaf; `None` for containers
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is(&self, rule: Rule) -> bool {
        self.name == Some(rule)
    }

    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }

    /// Number of bytes covered
    pub fn width(&self) -> usize {
        self.end - self.start
    }

    /// True when the node has its own non-empty text
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Own text if non-empty
    pub fn text_if_present(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }

    /// Effective text: own text, or the children's effective text in order
    pub fn full_text(&self) -> String {
        let mut out = String::with_capacity(self.width());
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        if let Some(text) = &self.text {
            out.push_str(text);
        }
        for child in &self.children {
            child.push_text(out);
        }
    }

    /// Deepest, last descendant that carries non-empty text
    ///
    /// Used to find where a subtree ends inside the flattened node sequence.
    pub fn last_text_descendant(&self) -> Option<&Node> {
        let mut last = None;
        for child in &self.children {
            if child.has_text() {
                last = Some(child);
            }
            if let Some(inner) = child.last_text_descendant() {
                last = Some(inner);
            }
        }
        last
    }

    /// Id of the last node belonging to this subtree in pre-order
    pub fn last_descendant_id(&self) -> u64 {
        match self.children.last() {
            Some(child) => child.last_descendant_id(),
            None => self.id,
        }
    }

    /// Give an anonymous node a name in place
    pub(crate) fn relabel(mut self, name: Rule) -> Self {
        self.name = Some(name);
        self
    }

    /// Wrap this node as the sole child of a new container
    pub(crate) fn wrap(self, name: Rule) -> Self {
        Node::branch(Some(name), self.start, self.end, vec![self])
    }

    /// Splice this node into a parent's child list
    ///
    /// Named nodes are kept whole; anonymous ones contribute their own
    /// children instead.
    pub(crate) fn append_into(self, out: &mut Vec<Node>) {
        if self.name.is_some() {
            out.push(self);
        } else {
            for child in self.children {
                child.append_into(out);
            }
        }
    }

    /// Number ids in pre-order starting at zero
    pub(crate) fn assign_ids(&mut self) {
        let mut next = 0;
        self.assign_ids_from(&mut next);
    }

    fn assign_ids_from(&mut self, next: &mut u64) {
        self.id = *next;
        *next += 1;
        for child in &mut self.children {
            child.assign_ids_from(next);
        }
    }
}
