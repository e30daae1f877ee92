//! Grammar registry
//!
//! A name→parser table. Rules refer to each other through
//! [`Parser::Ref`], which is looked up every time it is parsed, so rules can
//! be registered in any order and may be mutually recursive (`_form`
//! contains `parens`, which contains `_form`).
//!
//! The registry is built once and then only read, so one handle can be
//! shared by any number of concurrent parses.

use std::collections::HashMap;
use tracing::{debug, trace};

use super::combinators::Parser;
use super::node::{Node, Rule};
use crate::error::{GrammarError, Result};

/// Name of the top-level rule used by [`Grammar::parse`]
pub const SOURCE_RULE: &str = "source";

/// Registry of named parsing rules
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    rules: HashMap<String, Parser>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule, replacing any previous rule with the same name
    pub fn register(&mut self, name: impl Into<String>, parser: Parser) -> &mut Self {
        let name = name.into();
        if self.rules.insert(name.clone(), parser).is_some() {
            debug!("Replaced grammar rule '{}'", name);
        } else {
            trace!("Registered grammar rule '{}'", name);
        }
        self
    }

    /// Look up a rule by name
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::UnknownRule`] if `name` was never registered.
    pub fn get(&self, name: &str) -> Result<&Parser> {
        self.rules
            .get(name)
            .ok_or_else(|| GrammarError::unknown_rule(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Registered rule names, sorted
    pub fn rule_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Check that every by-name reference resolves
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::UnknownRule`] for the first dangling reference,
    /// visiting rules in name order.
    pub fn validate(&self) -> Result<()> {
        for name in self.rule_names() {
            let mut refs = Vec::new();
            self.rules[name].collect_refs(&mut refs);
            if let Some(missing) = refs.into_iter().find(|r| !self.contains(r)) {
                return Err(GrammarError::unknown_rule(missing));
            }
        }
        Ok(())
    }

    /// Run the rule `name` against `text` at `pos`
    pub fn parse_rule(&self, name: &str, text: &str, pos: usize) -> Result<Option<Node>> {
        self.get(name)?.parse(self, text, pos)
    }

    /// Parse a whole document with the [`SOURCE_RULE`] rule
    ///
    /// The returned root is always named `source` (also for empty input)
    /// and its nodes carry their pre-order index as id.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::UnknownRule`] when the grammar is incomplete.
    pub fn parse(&self, source: &str) -> Result<Node> {
        debug!("Parsing {} bytes", source.len());
        let root = self
            .parse_rule(SOURCE_RULE, source, 0)?
            .unwrap_or_else(|| Node::empty(0));
        let mut root = if root.is(Rule::Source) {
            root
        } else if root.is_named() {
            root.wrap(Rule::Source)
        } else {
            root.relabel(Rule::Source)
        };
        root.assign_ids();
        debug!("Parsed {} bytes into {} nodes", source.len(), root.last_descendant_id() + 1);
        Ok(root)
    }
}
