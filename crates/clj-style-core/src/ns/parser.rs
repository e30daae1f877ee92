//! Namespace form extractor
//!
//! Walks the flattened CST once, left to right, and builds an
//! [`NsDescriptor`] for the file's `ns` form.
//!
//! # Algorithm
//!
//! Every node goes through four phases, in this order:
//!
//! 1. **Section entry**: `ns` at depth 1 opens the form; `:require`,
//!    `:import`, `:refer-clojure`, `:require-macros` and `:gen-class` at the
//!    head of a list open a section.
//! 2. **Delimiters**: openers and closers move the nesting depth and close
//!    whatever state was scoped to the depth being left (sections, clause
//!    collections, prefix lists, reader conditionals, import package lists).
//! 3. **Discards**: a `#_` form switches off interpretation until its last
//!    text-bearing node has gone by.
//! 4. **Classification**: [`NsExtractor::classify`] picks exactly one
//!    [`Branch`] from an ordered cascade and [`NsExtractor::apply`] performs
//!    it. Several predicates overlap, so the order of the cascade decides the
//!    outcome and must not change.
//!
//! The walk ends when the nodes run out, or two line breaks after the `ns`
//! form has closed, which leaves room for one trailing comment on the
//! closing line.
//!
//! Unsupported shapes (`:use`, composite `:gen-class` keys) are skipped and
//! produce a partial descriptor.

use std::mem;
use tracing::{debug, trace, warn};

use super::model::{
    GenClassOption, GenClassValue, ImportEntry, NsDescriptor, NsMetadata, PlatformSymbol,
    Refer, ReferClojure, Rename, RequireEntry, RequireMacroEntry,
};
use super::predicates::{
    GenClassKeyKind, find_next_node_with_text, find_next_non_whitespace,
    find_next_significant_leaf, find_next_token_inside_form, gen_class_key_kind, is_boolean_node,
    is_closer, is_comment_node, is_discard_node, is_gen_class_node, is_gen_class_keyword,
    is_import_node, is_keyword_node, is_meta_marker, is_newline_node, is_ns_node, is_opener,
    is_reader_conditional_opener, is_refer_clojure_node, is_require_macros_node, is_require_node,
    is_string_node, is_symbol_node, is_token_node, is_use_node, parse_java_package_with_class,
    string_body, text_is,
};
use super::sort::sort_ns_result;
use crate::cst::{Node, Rule};

/// Extract the namespace descriptor from a flattened CST
///
/// Returns `None` when the file has no `ns` call at nesting depth 1. A
/// malformed `ns` form yields whatever could be recognized.
///
/// # Example
///
/// ```rust
/// use clj_style_core::{flatten, parse, parse_ns};
///
/// let root = parse("(ns foo.bar (:require [a.b :as c]))");
/// let ns = parse_ns(&flatten(&root)).unwrap();
/// assert_eq!(ns.ns_symbol.as_deref(), Some("foo.bar"));
/// assert_eq!(ns.requires[0].symbol, "a.b");
/// assert_eq!(ns.requires[0].as_sym.as_deref(), Some("c"));
/// ```
pub fn parse_ns(nodes: &[&Node]) -> Option<NsDescriptor> {
    let mut extractor = NsExtractor::new(nodes);
    extractor.run();
    extractor.finish()
}

/// `ns` clause currently being read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    ReferClojure,
    Require,
    RequireMacros,
    Import,
    GenClass,
}

impl Section {
    fn from_keyword(node: &Node) -> Option<Self> {
        if is_refer_clojure_node(node) {
            Some(Section::ReferClojure)
        } else if is_require_node(node) {
            Some(Section::Require)
        } else if is_import_node(node) {
            Some(Section::Import)
        } else if is_require_macros_node(node) {
            Some(Section::RequireMacros)
        } else if is_gen_class_node(node) {
            Some(Section::GenClass)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveSection {
    kind: Section,
    /// Depth of the list whose head is the section keyword
    depth: usize,
    keyword_idx: usize,
}

#[derive(Debug, Clone)]
struct ReaderConditional {
    depth: usize,
    platform: Option<String>,
    /// `#?@(`: the collection after the platform is spliced into the enclosing list
    splicing: bool,
}

/// Reading of namespace metadata before the ns symbol (or an attr-map after it)
#[derive(Debug, Clone, Default)]
enum MetaMode {
    #[default]
    Off,
    /// `^:flag`: the next token is a key whose value is `true`
    Shorthand,
    /// `^{...}` or attr-map: alternating keys and values
    Map {
        /// Depth of the map once its `{` has been seen
        depth: Option<usize>,
        expecting_key: bool,
        key: Option<String>,
        value_id: Option<u64>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReferClause {
    Exclude,
    Only,
    Rename,
}

/// Require option whose value is the next token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingValue {
    As,
    AsAlias,
    Default,
    IncludeMacros,
}

/// Require option whose value is a collection of symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Refer,
    ReferMacros,
    Exclude,
    Rename,
}

/// Per-list state shared by `:require` and `:require-macros`
#[derive(Debug, Default)]
struct ListState {
    /// The current libspec already named its namespace
    has_symbol: bool,
    pending: Option<PendingValue>,
    collecting: Option<(Collection, usize)>,
}

#[derive(Debug, Clone)]
struct PrefixList {
    symbol: String,
    depth: usize,
    id: u32,
}

#[derive(Debug, Default)]
struct ImportState {
    in_package_list: bool,
    package: Option<String>,
}

#[derive(Debug, Default)]
struct GenClassState {
    expecting_value: bool,
    key: Option<String>,
    key_comments: Vec<String>,
}

/// Last line each kind of entity was touched on, for same-line comments
#[derive(Debug, Default)]
struct LineMarks {
    prefix_list: Option<usize>,
    require: Option<usize>,
    import: Option<usize>,
    require_macros: Option<usize>,
    gen_class: Option<usize>,
    gen_class_value: Option<usize>,
    last_comment: Option<usize>,
}

#[derive(Debug, Default)]
struct ActiveEntries {
    require: Option<usize>,
    require_macro: Option<usize>,
    import: Option<String>,
    gen_class_key: Option<String>,
    prefix_list: Option<u32>,
}

#[derive(Debug, Default)]
struct NsFormState {
    node_idx: Option<usize>,
    inside: bool,
    end_line: Option<usize>,
    expect_symbol: bool,
    symbol_idx: Option<usize>,
    beyond_metadata: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListStep {
    Pending(PendingValue),
    Collect(Collection),
    Value(PendingValue),
    Collected(Collection),
    PrefixStart,
    Entry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImportStep {
    PackageHead,
    PackageClass,
    Flat,
}

/// Outcome of classifying one node; exactly one runs per node
#[derive(Debug, Clone, PartialEq, Eq)]
enum Branch {
    Skip,
    MetaFlag,
    MetaMapOpen,
    MetaMapEnd,
    MetaMapKey,
    MetaMapValue,
    MetaMarker,
    AttrMap,
    NsSymbol,
    Platform,
    LeadingComment(String),
    EolComment(String),
    InsideDiscard,
    SectionCommentsAbove(Section),
    Docstring,
    ReferClojureClause(ReferClause),
    ReferClojureSymbol,
    Require(ListStep),
    RequireMacros(ListStep),
    Import(ImportStep),
    GenClassKey,
    GenClassValue,
    Idle,
}

struct NsExtractor<'a> {
    nodes: &'a [&'a Node],
    result: NsDescriptor,
    depth: usize,
    line: usize,
    prev_newline: bool,
    ns: NsFormState,
    meta: MetaMode,
    section: Option<ActiveSection>,
    eol_section: Option<Section>,
    reader_conditionals: Vec<ReaderConditional>,
    pending_comments: Vec<String>,
    discard_until: Option<u64>,
    skip_until: Option<u64>,
    refer_clause: Option<(ReferClause, usize)>,
    rename_from: Option<String>,
    list: ListState,
    prefix: Option<PrefixList>,
    next_prefix_id: u32,
    import: ImportState,
    gen_class: GenClassState,
    lines: LineMarks,
    active: ActiveEntries,
}

impl<'a> NsExtractor<'a> {
    fn new(nodes: &'a [&'a Node]) -> Self {
        Self {
            nodes,
            result: NsDescriptor::default(),
            depth: 0,
            line: 0,
            prev_newline: false,
            ns: NsFormState::default(),
            meta: MetaMode::Off,
            section: None,
            eol_section: None,
            reader_conditionals: Vec::new(),
            pending_comments: Vec::new(),
            discard_until: None,
            skip_until: None,
            refer_clause: None,
            rename_from: None,
            list: ListState::default(),
            prefix: None,
            next_prefix_id: 0,
            import: ImportState::default(),
            gen_class: GenClassState::default(),
            lines: LineMarks::default(),
            active: ActiveEntries::default(),
        }
    }

    fn run(&mut self) {
        let nodes = self.nodes;
        for (idx, node) in nodes.iter().copied().enumerate() {
            let is_newline = is_newline_node(node);

            self.enter_section(idx, node);
            self.track_delimiters(node);
            let in_discard = self.discard_until.is_some();
            self.track_discard(node);

            let branch = self.classify(idx, node, in_discard);
            trace!("node {} {:?} -> {:?}", idx, node.name(), branch);
            self.apply(idx, node, branch);
            if self.discard_until == Some(node.id()) {
                self.discard_until = None;
            }

            if is_newline {
                self.line += 1;
            }
            self.prev_newline = is_newline;

            if self.ns_form_done() {
                debug!("Stopped scanning at node {} (line {})", idx, self.line);
                break;
            }
        }
    }

    fn finish(self) -> Option<NsDescriptor> {
        self.ns.node_idx?;
        let mut result = self.result;
        sort_ns_result(&mut result);
        Some(result)
    }

    fn ns_form_done(&self) -> bool {
        self.ns.node_idx.is_some()
            && !self.ns.inside
            && self.ns.end_line.is_some_and(|end| self.line >= end + 2)
    }

    /// True when `node` is the first element of a parenthesized list
    fn is_list_head(&self, idx: usize, node: &Node) -> bool {
        idx >= 2 && {
            let body = self.nodes[idx - 1];
            let open = self.nodes[idx - 2];
            body.is(Rule::Body)
                && body.start() == node.start()
                && open.is(Rule::Open)
                && open.text().is_some_and(|t| t.ends_with('('))
        }
    }

    fn in_section(&self, kind: Section) -> bool {
        self.section.is_some_and(|s| s.kind == kind)
    }

    fn platform(&self) -> Option<String> {
        self.reader_conditionals
            .last()
            .and_then(|rc| rc.platform.clone())
    }

    // Phase 1

    fn enter_section(&mut self, idx: usize, node: &Node) {
        if self.discard_until.is_some() {
            return;
        }
        if self.depth == 1 && is_ns_node(node) && self.ns.node_idx.is_none() {
            debug!("Found ns form at node {}", idx);
            self.ns.inside = true;
            self.ns.expect_symbol = true;
            self.ns.node_idx = Some(idx);
            return;
        }
        if !self.ns.inside || !self.is_list_head(idx, node) {
            return;
        }

        let Some(kind) = Section::from_keyword(node) else {
            if is_use_node(node) {
                warn!("`:use` in the ns form is not supported; it will be ignored");
            }
            return;
        };

        debug!("Entering {:?} section at depth {}", kind, self.depth);
        self.section = Some(ActiveSection {
            kind,
            depth: self.depth,
            keyword_idx: idx,
        });
        self.ns.beyond_metadata = true;
        self.eol_section = Some(kind);
        self.list = ListState::default();
        self.refer_clause = None;
        self.import = ImportState::default();

        match kind {
            Section::Require => self.lines.require = Some(self.line),
            Section::Import => self.lines.import = Some(self.line),
            Section::RequireMacros => self.lines.require_macros = Some(self.line),
            Section::GenClass => {
                self.lines.gen_class = Some(self.line);
                self.gen_class = GenClassState::default();
                self.result.gen_class.get_or_insert_with(Default::default);
            }
            Section::ReferClojure => {}
        }
    }

    // Phase 2

    fn track_delimiters(&mut self, node: &Node) {
        if is_opener(node) {
            self.depth += 1;

            if self.ns.inside && is_reader_conditional_opener(node) {
                self.reader_conditionals.push(ReaderConditional {
                    depth: self.depth,
                    platform: None,
                    splicing: text_is(node, "#?@("),
                });
            } else if self.in_section(Section::Require) || self.in_section(Section::RequireMacros)
            {
                self.list.has_symbol = false;
            } else if let Some(section) = self.section {
                if section.kind == Section::Import && self.depth > section.depth {
                    self.import.in_package_list = true;
                    self.import.package = None;
                }
            }
        } else if is_closer(node) {
            self.depth = self.depth.saturating_sub(1);
            let depth = self.depth;

            self.import.in_package_list = false;

            if self.refer_clause.is_some_and(|(_, d)| depth <= d) {
                self.refer_clause = None;
                self.rename_from = None;
            }
            if self.list.collecting.is_some_and(|(_, d)| depth <= d) {
                self.list.collecting = None;
                self.rename_from = None;
            }
            self.list.has_symbol = false;
            self.list.pending = None;

            if self.prefix.as_ref().is_some_and(|p| depth < p.depth) {
                self.prefix = None;
            }
            while self.reader_conditionals.last().is_some_and(|rc| depth < rc.depth) {
                self.reader_conditionals.pop();
            }
            if let Some(section) = self.section {
                if depth < section.depth {
                    debug!("Leaving {:?} section", section.kind);
                    self.section = None;
                    self.gen_class = GenClassState::default();
                }
            }
            if self.ns.inside && depth == 0 {
                debug!("ns form ends on line {}", self.line);
                self.ns.inside = false;
                self.ns.end_line = Some(self.line);
            }
        }
    }

    // Phase 3

    fn track_discard(&mut self, node: &Node) {
        if !is_discard_node(node) {
            return;
        }
        if let Some(last) = node.last_text_descendant() {
            let until = self.discard_until.map_or(last.id(), |id| id.max(last.id()));
            self.discard_until = Some(until);
        }
    }

    // Phase 4

    fn classify(&self, idx: usize, node: &Node, in_discard: bool) -> Branch {
        if self.skip_until.is_some() {
            return Branch::Skip;
        }

        match &self.meta {
            MetaMode::Off => {}
            MetaMode::Shorthand => {
                return if is_token_node(node) && node.has_text() {
                    Branch::MetaFlag
                } else {
                    Branch::Idle
                };
            }
            MetaMode::Map {
                depth,
                expecting_key,
                value_id,
                ..
            } => {
                return if depth.is_some_and(|d| self.depth < d) && is_closer(node) {
                    Branch::MetaMapEnd
                } else if depth.is_none() && node.is(Rule::Open) && text_is(node, "{") {
                    Branch::MetaMapOpen
                } else if *expecting_key && is_token_node(node) && node.has_text() {
                    Branch::MetaMapKey
                } else if *value_id == Some(node.id()) {
                    Branch::MetaMapValue
                } else {
                    Branch::Idle
                };
            }
        }

        let after_ns = self.ns.node_idx.is_some_and(|ns_idx| idx > ns_idx);
        let live = self.discard_until.is_none();

        if live && self.ns.inside && self.ns.symbol_idx.is_none() && is_meta_marker(node) {
            return Branch::MetaMarker;
        }
        if self.ns.inside
            && after_ns
            && self.depth >= 1
            && !self.ns.beyond_metadata
            && live
            && node.is(Rule::Open)
            && text_is(node, "{")
        {
            return Branch::AttrMap;
        }
        if live
            && self.ns.inside
            && after_ns
            && self.ns.expect_symbol
            && is_token_node(node)
            && node.has_text()
        {
            return Branch::NsSymbol;
        }
        if live
            && self
                .reader_conditionals
                .last()
                .is_some_and(|rc| rc.depth == self.depth)
            && is_keyword_node(node)
        {
            return Branch::Platform;
        }

        let is_comment = is_comment_node(node);
        let is_discard = is_discard_node(node);
        if !in_discard && after_ns && (is_comment || is_discard) {
            let text = node.full_text();
            if self.prev_newline {
                if self.ns.inside {
                    return Branch::LeadingComment(text);
                }
            } else {
                return Branch::EolComment(text);
            }
        }
        if self.discard_until.is_some() {
            return Branch::InsideDiscard;
        }

        if let Some(section) = self.section {
            if idx == section.keyword_idx && !self.pending_comments.is_empty() {
                return Branch::SectionCommentsAbove(section.kind);
            }
        }
        if self.ns.inside
            && after_ns
            && self.depth == 1
            && !self.ns.beyond_metadata
            && is_string_node(node)
        {
            return Branch::Docstring;
        }

        match self.section {
            Some(section) if idx > section.keyword_idx => match section.kind {
                Section::ReferClojure => self.classify_refer_clojure(node),
                Section::Require => self
                    .classify_require(idx, node, section)
                    .map_or(Branch::Idle, Branch::Require),
                Section::RequireMacros => self
                    .classify_require_macros(node, section)
                    .map_or(Branch::Idle, Branch::RequireMacros),
                Section::Import => self.classify_import(node),
                Section::GenClass => self.classify_gen_class(node),
            },
            _ => Branch::Idle,
        }
    }

    fn classify_refer_clojure(&self, node: &Node) -> Branch {
        let clause = match node.text() {
            Some(":exclude") => Some(ReferClause::Exclude),
            Some(":only") => Some(ReferClause::Only),
            Some(":rename") => Some(ReferClause::Rename),
            _ => None,
        };
        if let Some(clause) = clause {
            return Branch::ReferClojureClause(clause);
        }
        if self.refer_clause.is_some_and(|(_, d)| self.depth > d) && is_symbol_node(node) {
            return Branch::ReferClojureSymbol;
        }
        Branch::Idle
    }

    /// Entry-level position: directly in the section list, a reader
    /// conditional, or the collection spliced in by `#?@(`
    fn at_list_level(&self, section: ActiveSection) -> bool {
        self.depth == section.depth
            || self.reader_conditionals.last().is_some_and(|rc| {
                rc.depth > section.depth
                    && (rc.depth == self.depth || (rc.splicing && rc.depth + 1 == self.depth))
            })
    }

    fn classify_require(&self, idx: usize, node: &Node, section: ActiveSection) -> Option<ListStep> {
        if is_keyword_node(node) {
            let step = match node.text() {
                Some(":as") => ListStep::Pending(PendingValue::As),
                Some(":as-alias") => ListStep::Pending(PendingValue::AsAlias),
                Some(":default") => ListStep::Pending(PendingValue::Default),
                Some(":include-macros") => ListStep::Pending(PendingValue::IncludeMacros),
                Some(":refer") => ListStep::Collect(Collection::Refer),
                Some(":refer-macros") => ListStep::Collect(Collection::ReferMacros),
                Some(":exclude") => ListStep::Collect(Collection::Exclude),
                Some(":rename") => ListStep::Collect(Collection::Rename),
                _ => return None,
            };
            return Some(step);
        }
        if let Some(pending) = self.list.pending {
            if is_token_node(node) && node.has_text() {
                return Some(ListStep::Value(pending));
            }
        }
        if let Some((collection, depth)) = self.list.collecting {
            if self.depth > depth && is_symbol_node(node) {
                return Some(ListStep::Collected(collection));
            }
        }

        let list_level = self.at_list_level(section);
        if self.prefix.is_none()
            && !list_level
            && !self.list.has_symbol
            && is_symbol_node(node)
            && find_next_significant_leaf(self.nodes, idx + 1).is_some_and(is_opener)
        {
            return Some(ListStep::PrefixStart);
        }

        let in_prefix_level = self.prefix.as_ref().is_some_and(|p| p.depth == self.depth);
        if (is_symbol_node(node) || node.is(Rule::String))
            && (list_level || !self.list.has_symbol || in_prefix_level)
        {
            return Some(ListStep::Entry);
        }
        None
    }

    fn classify_require_macros(&self, node: &Node, section: ActiveSection) -> Option<ListStep> {
        if is_keyword_node(node) {
            return match node.text() {
                Some(":as") => Some(ListStep::Pending(PendingValue::As)),
                Some(":refer") => Some(ListStep::Collect(Collection::Refer)),
                Some(":rename") => Some(ListStep::Collect(Collection::Rename)),
                _ => None,
            };
        }
        if let Some(pending) = self.list.pending {
            if is_token_node(node) && node.has_text() {
                return Some(ListStep::Value(pending));
            }
        }
        if let Some((collection, depth)) = self.list.collecting {
            if self.depth > depth && is_symbol_node(node) {
                return Some(ListStep::Collected(collection));
            }
        }
        if is_symbol_node(node) && (self.at_list_level(section) || !self.list.has_symbol) {
            return Some(ListStep::Entry);
        }
        None
    }

    fn classify_import(&self, node: &Node) -> Branch {
        if self.import.in_package_list && is_token_node(node) && node.has_text() {
            return Branch::Import(if self.import.package.is_none() {
                ImportStep::PackageHead
            } else {
                ImportStep::PackageClass
            });
        }
        if is_symbol_node(node) {
            return Branch::Import(ImportStep::Flat);
        }
        Branch::Idle
    }

    fn classify_gen_class(&self, node: &Node) -> Branch {
        if !self.gen_class.expecting_value && is_gen_class_keyword(node) {
            Branch::GenClassKey
        } else if self.gen_class.expecting_value && is_form_node(node) {
            Branch::GenClassValue
        } else {
            Branch::Idle
        }
    }

    fn apply(&mut self, idx: usize, node: &Node, branch: Branch) {
        match branch {
            Branch::Skip => {
                if self.skip_until == Some(node.id()) {
                    self.skip_until = None;
                }
            }
            Branch::MetaFlag => {
                if let Some(key) = node.text() {
                    self.result.ns_metadata.push(NsMetadata {
                        key: key.to_string(),
                        value: "true".to_string(),
                    });
                }
                self.meta = MetaMode::Off;
            }
            Branch::MetaMapOpen | Branch::AttrMap => {
                self.meta = MetaMode::Map {
                    depth: Some(self.depth),
                    expecting_key: true,
                    key: None,
                    value_id: None,
                };
            }
            Branch::MetaMapEnd => self.meta = MetaMode::Off,
            Branch::MetaMapKey => {
                let value_id = find_next_non_whitespace(self.nodes, idx + 1).map(Node::id);
                if let MetaMode::Map {
                    expecting_key,
                    key,
                    value_id: slot,
                    ..
                } = &mut self.meta
                {
                    *key = node.text().map(str::to_string);
                    *expecting_key = false;
                    *slot = value_id;
                }
            }
            Branch::MetaMapValue => {
                if let MetaMode::Map {
                    expecting_key,
                    key,
                    value_id,
                    ..
                } = &mut self.meta
                {
                    if let Some(key) = key.take() {
                        self.result.ns_metadata.push(NsMetadata {
                            key,
                            value: node.full_text(),
                        });
                    }
                    *expecting_key = true;
                    *value_id = None;
                }
                if !node.children().is_empty() {
                    self.skip_until = Some(node.last_descendant_id());
                }
            }
            Branch::MetaMarker => {
                match find_next_node_with_text(self.nodes, idx + 1) {
                    Some(next) if text_is(next, "{") => {
                        self.meta = MetaMode::Map {
                            depth: None,
                            expecting_key: false,
                            key: None,
                            value_id: None,
                        };
                    }
                    Some(next) if is_token_node(next) => self.meta = MetaMode::Shorthand,
                    _ => {}
                }
            }
            Branch::NsSymbol => {
                debug!("ns symbol: {:?}", node.text());
                self.result.ns_symbol = node.text().map(str::to_string);
                self.ns.symbol_idx = Some(idx);
                self.ns.expect_symbol = false;
            }
            Branch::Platform => {
                let platform = node.text().map(|t| t.trim_start_matches(':').to_string());
                if let Some(rc) = self.reader_conditionals.last_mut() {
                    rc.platform = platform;
                }
            }
            Branch::LeadingComment(text) => self.pending_comments.push(text),
            Branch::EolComment(text) => self.attach_eol_comment(text),
            Branch::InsideDiscard => {}
            Branch::SectionCommentsAbove(kind) => {
                let comments = mem::take(&mut self.pending_comments);
                match kind {
                    Section::Require => self.result.require_comments_above.extend(comments),
                    Section::Import => self.result.import_comments_above.extend(comments),
                    Section::ReferClojure => {
                        self.result.refer_clojure_comments_above.extend(comments)
                    }
                    Section::RequireMacros => {
                        self.result.require_macros_comments_above.extend(comments)
                    }
                    Section::GenClass => {
                        if let Some(gen_class) = self.result.gen_class.as_mut() {
                            gen_class.comments_above.extend(comments);
                        }
                    }
                }
            }
            Branch::Docstring => self.result.docstring = string_body(node).map(str::to_string),
            Branch::ReferClojureClause(clause) => self.start_refer_clause(clause),
            Branch::ReferClojureSymbol => self.collect_refer_clojure_symbol(node),
            Branch::Require(step) => self.apply_require(idx, node, step),
            Branch::RequireMacros(step) => self.apply_require_macros(node, step),
            Branch::Import(step) => self.apply_import(node, step),
            Branch::GenClassKey => {
                self.gen_class.key = node
                    .text()
                    .and_then(|t| t.strip_prefix(':'))
                    .map(str::to_string);
                self.gen_class.key_comments = mem::take(&mut self.pending_comments);
                self.gen_class.expecting_value = true;
            }
            Branch::GenClassValue => self.apply_gen_class_value(node),
            Branch::Idle => {}
        }
    }

    fn attach_eol_comment(&mut self, text: String) {
        let line = Some(self.line);
        let result = &mut self.result;

        let attached = if self.lines.prefix_list == line && self.active.prefix_list.is_some() {
            if let Some(id) = self.active.prefix_list {
                result.prefix_list_comments.entry(id).or_default().comment_after =
                    Some(text.clone());
            }
            true
        } else if self.lines.require == line {
            match self.active.require.and_then(|i| result.requires.get_mut(i)) {
                Some(entry) => entry.comment_after = Some(text.clone()),
                None => result.require_comment_after = Some(text.clone()),
            }
            true
        } else if self.eol_section == Some(Section::ReferClojure)
            && result.refer_clojure.is_some()
            && (self.ns.inside || self.ns.end_line == line)
        {
            result.refer_clojure_comment_after = Some(text.clone());
            true
        } else if self.lines.import == line {
            let active = self.active.import.as_ref();
            match active.and_then(|pkg| result.imports_obj.get_mut(pkg)) {
                Some(entry) => entry.comment_after = Some(text.clone()),
                None => result.import_comment_after = Some(text.clone()),
            }
            true
        } else if self.lines.require_macros == line {
            let active = self.active.require_macro;
            match active.and_then(|i| result.require_macros.get_mut(i)) {
                Some(entry) => entry.comment_after = Some(text.clone()),
                None => result.require_macros_comment_after = Some(text.clone()),
            }
            true
        } else if self.lines.gen_class == line {
            if let Some(gen_class) = result.gen_class.as_mut() {
                gen_class.comment_after = Some(text.clone());
            }
            true
        } else if self.lines.gen_class_value == line {
            let key = self.active.gen_class_key.as_ref();
            let option = result
                .gen_class
                .as_mut()
                .zip(key)
                .and_then(|(gen_class, key)| gen_class.options.get_mut(key));
            if let Some(option) = option {
                option.comment_after = Some(text.clone());
            }
            true
        } else {
            false
        };

        if attached {
            self.lines.last_comment = line;
        }
        if !self.ns.inside && self.lines.last_comment == line {
            self.result.comment_outside_ns_form = Some(text);
        }
    }

    fn start_refer_clause(&mut self, clause: ReferClause) {
        let refer_clojure = self
            .result
            .refer_clojure
            .get_or_insert_with(ReferClojure::default);
        match clause {
            ReferClause::Exclude => {
                refer_clojure.exclude.get_or_insert_with(Vec::new);
            }
            ReferClause::Only => {
                refer_clojure.only.get_or_insert_with(Vec::new);
            }
            ReferClause::Rename => {
                refer_clojure.rename.get_or_insert_with(Vec::new);
            }
        }
        self.refer_clause = Some((clause, self.depth));
        self.rename_from = None;
    }

    fn collect_refer_clojure_symbol(&mut self, node: &Node) {
        let Some((clause, _)) = self.refer_clause else {
            return;
        };
        let Some(symbol) = node.text().map(str::to_string) else {
            return;
        };
        let platform = self.platform();
        let rename = if clause == ReferClause::Rename {
            self.pair_rename(symbol.clone())
        } else {
            None
        };
        let Some(refer_clojure) = self.result.refer_clojure.as_mut() else {
            return;
        };
        match clause {
            ReferClause::Exclude => refer_clojure
                .exclude
                .get_or_insert_with(Vec::new)
                .push(PlatformSymbol { symbol, platform }),
            ReferClause::Only => refer_clojure
                .only
                .get_or_insert_with(Vec::new)
                .push(PlatformSymbol { symbol, platform }),
            ReferClause::Rename => {
                if let Some(rename) = rename {
                    refer_clojure.rename.get_or_insert_with(Vec::new).push(rename);
                }
            }
        }
    }

    /// Pair rename symbols two at a time
    fn pair_rename(&mut self, symbol: String) -> Option<Rename> {
        match self.rename_from.take() {
            None => {
                self.rename_from = Some(symbol);
                None
            }
            Some(from_symbol) => Some(Rename {
                from_symbol,
                to_symbol: symbol,
                platform: self.platform(),
            }),
        }
    }

    fn active_require(&mut self) -> Option<&mut RequireEntry> {
        self.active
            .require
            .and_then(|i| self.result.requires.get_mut(i))
    }

    fn apply_require(&mut self, idx: usize, node: &Node, step: ListStep) {
        match step {
            ListStep::Pending(pending) => {
                if self.active_require().is_some() {
                    self.list.pending = Some(pending);
                }
            }
            ListStep::Collect(collection) => {
                let refer_all = collection == Collection::Refer
                    && find_next_token_inside_form(self.nodes, idx + 1)
                        .is_some_and(|next| text_is(next, ":all"));
                let depth = self.depth;
                let Some(entry) = self.active_require() else {
                    return;
                };
                match collection {
                    Collection::Refer if refer_all => {
                        entry.refer = Some(Refer::All);
                        return;
                    }
                    Collection::Refer => entry.refer = Some(Refer::Symbols(Vec::new())),
                    Collection::ReferMacros => entry.refer_macros = Some(Vec::new()),
                    Collection::Exclude => entry.exclude = Some(Vec::new()),
                    Collection::Rename => entry.rename = Some(Vec::new()),
                }
                self.list.collecting = Some((collection, depth));
                self.rename_from = None;
            }
            ListStep::Value(pending) => {
                self.list.pending = None;
                let Some(text) = node.text().map(str::to_string) else {
                    return;
                };
                let Some(entry) = self.active_require() else {
                    return;
                };
                match pending {
                    PendingValue::As => entry.as_sym = Some(text),
                    PendingValue::AsAlias => entry.as_alias = Some(text),
                    PendingValue::Default => entry.default = Some(text),
                    PendingValue::IncludeMacros => entry.include_macros = Some(text == "true"),
                }
            }
            ListStep::Collected(collection) => {
                let Some(symbol) = node.text().map(str::to_string) else {
                    return;
                };
                let platform = self.platform();
                let rename = if collection == Collection::Rename {
                    self.pair_rename(symbol.clone())
                } else {
                    None
                };
                let Some(entry) = self.active_require() else {
                    return;
                };
                let item = PlatformSymbol { symbol, platform };
                match collection {
                    Collection::Refer => {
                        if let Some(Refer::Symbols(symbols)) = entry.refer.as_mut() {
                            symbols.push(item);
                        }
                    }
                    Collection::ReferMacros => {
                        entry.refer_macros.get_or_insert_with(Vec::new).push(item)
                    }
                    Collection::Exclude => entry.exclude.get_or_insert_with(Vec::new).push(item),
                    Collection::Rename => {
                        if let Some(rename) = rename {
                            entry.rename.get_or_insert_with(Vec::new).push(rename);
                        }
                    }
                }
            }
            ListStep::PrefixStart => {
                let Some(symbol) = node.text().map(str::to_string) else {
                    return;
                };
                self.next_prefix_id += 1;
                let id = self.next_prefix_id;
                trace!("Prefix list {} for '{}'", id, symbol);
                self.prefix = Some(PrefixList {
                    symbol,
                    depth: self.depth,
                    id,
                });
                self.active.prefix_list = Some(id);
                self.lines.prefix_list = Some(self.line);
                self.list.has_symbol = true;
                if !self.pending_comments.is_empty() {
                    let comments = mem::take(&mut self.pending_comments);
                    self.result
                        .prefix_list_comments
                        .entry(id)
                        .or_default()
                        .comments_above
                        .extend(comments);
                }
            }
            ListStep::Entry => self.add_require(node),
        }
    }

    fn add_require(&mut self, node: &Node) {
        let (symbol, symbol_is_string) = if node.is(Rule::String) {
            if !node.children().is_empty() {
                self.skip_until = Some(node.last_descendant_id());
            }
            (string_body(node).unwrap_or_default().to_string(), true)
        } else {
            (node.text().unwrap_or_default().to_string(), false)
        };
        let symbol = match &self.prefix {
            Some(p) if !symbol_is_string => format!("{}.{}", p.symbol, symbol),
            _ => symbol,
        };

        trace!("require entry '{}'", symbol);
        let entry = RequireEntry {
            symbol_is_string,
            platform: self.platform(),
            prefix_list_id: self.prefix.as_ref().map(|p| p.id),
            comments_above: mem::take(&mut self.pending_comments),
            ..RequireEntry::new(symbol)
        };
        self.result.requires.push(entry);
        self.active.require = Some(self.result.requires.len() - 1);
        self.list.has_symbol = true;
        self.lines.require = Some(self.line);
    }

    fn active_require_macro(&mut self) -> Option<&mut RequireMacroEntry> {
        self.active
            .require_macro
            .and_then(|i| self.result.require_macros.get_mut(i))
    }

    fn apply_require_macros(&mut self, node: &Node, step: ListStep) {
        match step {
            ListStep::Pending(pending) => {
                if self.active_require_macro().is_some() {
                    self.list.pending = Some(pending);
                }
            }
            ListStep::Collect(collection) => {
                let depth = self.depth;
                let Some(entry) = self.active_require_macro() else {
                    return;
                };
                match collection {
                    Collection::Rename => entry.rename = Some(Vec::new()),
                    _ => entry.refer = Some(Vec::new()),
                }
                self.list.collecting = Some((collection, depth));
                self.rename_from = None;
            }
            ListStep::Value(_) => {
                self.list.pending = None;
                let text = node.text().map(str::to_string);
                if let Some(entry) = self.active_require_macro() {
                    entry.as_sym = text;
                }
            }
            ListStep::Collected(collection) => {
                let Some(symbol) = node.text().map(str::to_string) else {
                    return;
                };
                let platform = self.platform();
                let rename = if collection == Collection::Rename {
                    self.pair_rename(symbol.clone())
                } else {
                    None
                };
                let Some(entry) = self.active_require_macro() else {
                    return;
                };
                match rename {
                    Some(rename) => entry.rename.get_or_insert_with(Vec::new).push(rename),
                    None if collection != Collection::Rename => entry
                        .refer
                        .get_or_insert_with(Vec::new)
                        .push(PlatformSymbol { symbol, platform }),
                    None => {}
                }
            }
            ListStep::PrefixStart => {}
            ListStep::Entry => {
                let Some(symbol) = node.text().map(str::to_string) else {
                    return;
                };
                trace!("require-macros entry '{}'", symbol);
                let entry = RequireMacroEntry {
                    symbol,
                    platform: self.platform(),
                    comments_above: mem::take(&mut self.pending_comments),
                    ..RequireMacroEntry::default()
                };
                self.result.require_macros.push(entry);
                self.active.require_macro = Some(self.result.require_macros.len() - 1);
                self.list.has_symbol = true;
                self.lines.require_macros = Some(self.line);
            }
        }
    }

    fn apply_import(&mut self, node: &Node, step: ImportStep) {
        let Some(text) = node.text() else {
            return;
        };
        let (package, class) = match step {
            ImportStep::PackageHead => {
                self.import.package = Some(text.to_string());
                (text.to_string(), None)
            }
            ImportStep::PackageClass => match self.import.package.clone() {
                Some(package) => (package, Some(text.to_string())),
                None => return,
            },
            ImportStep::Flat => parse_java_package_with_class(text),
        };

        let platform = self.platform();
        let comments = mem::take(&mut self.pending_comments);
        let entry = self
            .result
            .imports_obj
            .entry(package.clone())
            .or_insert_with(ImportEntry::default);
        if let Some(class) = class {
            entry.classes.push(class);
        }
        if entry.platform.is_none() {
            entry.platform = platform;
        }
        entry.comments_above.extend(comments);

        trace!("import package '{}'", package);
        self.active.import = Some(package);
        self.lines.import = Some(self.line);
    }

    fn apply_gen_class_value(&mut self, node: &Node) {
        self.gen_class.expecting_value = false;
        let Some(key) = self.gen_class.key.take() else {
            return;
        };
        let comments_above = mem::take(&mut self.gen_class.key_comments);
        if !node.children().is_empty() {
            self.skip_until = Some(node.last_descendant_id());
        }

        let value = match gen_class_key_kind(&key) {
            GenClassKeyKind::Composite => {
                warn!(":gen-class option :{} is not supported; skipping its value", key);
                None
            }
            GenClassKeyKind::Boolean if is_boolean_node(node) => {
                Some(GenClassValue::Bool(text_is(node, "true")))
            }
            _ if node.is(Rule::String) => string_body(node).map(|s| GenClassValue::Text(s.to_string())),
            _ if is_token_node(node) => node.text().map(|t| GenClassValue::Text(t.to_string())),
            _ => None,
        };
        let Some(value) = value else {
            return;
        };

        if let Some(gen_class) = self.result.gen_class.as_mut() {
            trace!("gen-class :{} = {:?}", key, value);
            gen_class.options.insert(
                key.clone(),
                GenClassOption {
                    value,
                    comments_above,
                    comment_after: None,
                },
            );
            self.active.gen_class_key = Some(key);
            self.lines.gen_class_value = Some(self.line);
        }
    }
}

/// A node that can be the value of a `:gen-class` key
fn is_form_node(node: &Node) -> bool {
    matches!(
        node.name(),
        Some(
            Rule::Token
                | Rule::String
                | Rule::Parens
                | Rule::Brackets
                | Rule::Braces
                | Rule::Meta
                | Rule::Wrap
                | Rule::Tagged
        )
    )
}
