//! Terminal and combining parser primitives
//!
//! Every parser answers the same question: does it match `text` at byte
//! offset `pos`, and if so, which node does it produce? A non-match is
//! `Ok(None)`; `Err` is reserved for grammar configuration errors (an
//! unregistered rule name), so malformed input can never fail a parse.
//!
//! Terminals, `Sequence` and `Choice` never match at or past the end of the
//! input. `Repeat` with `min_matches == 0` and `Optional` always succeed,
//! which is what lets closing delimiters and string terminators be missing.

use regex::Regex;
use std::collections::HashMap;

use super::node::{Node, Rule};
use super::registry::Grammar;
use crate::error::{GrammarError, Result};

/// A parser expression
#[derive(Debug, Clone)]
pub enum Parser {
    /// Exactly one code point `ch`
    Char { ch: char, name: Option<Rule> },
    /// Exactly one code point that is not `ch`
    NotChar { ch: char, name: Option<Rule> },
    /// Any one code point
    AnyChar { name: Option<Rule> },
    /// The exact substring `text`
    Literal { text: String, name: Option<Rule> },
    /// Anchored regex match at the current position
    Regex {
        regex: Regex,
        name: Option<Rule>,
        group: Option<usize>,
    },
    /// All sub-parsers in order, atomically
    Sequence { parsers: Vec<Parser>, name: Option<Rule> },
    /// First sub-parser that matches at the same position
    Choice { parsers: Vec<Parser>, name: Option<Rule> },
    /// Greedy repetition
    Repeat {
        parser: Box<Parser>,
        name: Option<Rule>,
        min_matches: usize,
    },
    /// Zero or one, never fails
    Optional(Box<Parser>),
    /// Give a stable name to the child's result
    Named { parser: Box<Parser>, name: Rule },
    /// Lazy reference to a registered rule
    Ref(String),
}

impl Parser {
    pub fn char(ch: char, name: Option<Rule>) -> Self {
        Parser::Char { ch, name }
    }

    pub fn not_char(ch: char, name: Option<Rule>) -> Self {
        Parser::NotChar { ch, name }
    }

    pub fn any_char(name: Option<Rule>) -> Self {
        Parser::AnyChar { name }
    }

    pub fn literal(text: impl Into<String>, name: Option<Rule>) -> Self {
        Parser::Literal {
            text: text.into(),
            name,
        }
    }

    /// Compile an anchored regex terminal
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::InvalidPattern`] when `pattern` does not compile.
    pub fn regex(pattern: &str, name: Option<Rule>) -> Result<Self> {
        Self::regex_group(pattern, name, None)
    }

    /// Like [`Parser::regex`], but the node text is capture `group` when it matched
    /// something non-empty
    pub fn regex_group(pattern: &str, name: Option<Rule>, group: Option<usize>) -> Result<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})"))
            .map_err(|err| GrammarError::invalid_pattern(pattern, err))?;
        Ok(Parser::Regex { regex, name, group })
    }

    pub fn seq(parsers: Vec<Parser>, name: Option<Rule>) -> Self {
        Parser::Sequence { parsers, name }
    }

    pub fn choice(parsers: Vec<Parser>, name: Option<Rule>) -> Self {
        Parser::Choice { parsers, name }
    }

    pub fn repeat(parser: Parser, name: Option<Rule>, min_matches: usize) -> Self {
        Parser::Repeat {
            parser: Box::new(parser),
            name,
            min_matches,
        }
    }

    pub fn optional(parser: Parser) -> Self {
        Parser::Optional(Box::new(parser))
    }

    pub fn named(parser: Parser, name: Rule) -> Self {
        Parser::Named {
            parser: Box::new(parser),
            name,
        }
    }

    /// Reference a rule by name; resolved each time it is parsed
    pub fn rule(name: impl Into<String>) -> Self {
        Parser::Ref(name.into())
    }

    /// Try to match at `pos`
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::UnknownRule`] when a reachable [`Parser::Ref`]
    /// names a rule missing from `grammar`.
    pub fn parse(&self, grammar: &Grammar, text: &str, pos: usize) -> Result<Option<Node>> {
        self.parse_memo(grammar, text, pos, &mut Memo::default())
    }

    fn parse_memo<'g>(
        &'g self,
        grammar: &'g Grammar,
        text: &str,
        pos: usize,
        memo: &mut Memo<'g>,
    ) -> Result<Option<Node>> {
        match self {
            Parser::Char { ch, name } => Ok(match next_char(text, pos) {
                Some(c) if c == *ch => Some(char_leaf(*name, text, pos, c)),
                _ => None,
            }),
            Parser::NotChar { ch, name } => Ok(match next_char(text, pos) {
                Some(c) if c != *ch => Some(char_leaf(*name, text, pos, c)),
                _ => None,
            }),
            Parser::AnyChar { name } => {
                Ok(next_char(text, pos).map(|c| char_leaf(*name, text, pos, c)))
            }
            Parser::Literal { text: literal, name } => Ok(match rest_of(text, pos) {
                Some(rest) if rest.starts_with(literal.as_str()) => {
                    Some(Node::leaf(*name, pos, literal))
                }
                _ => None,
            }),
            Parser::Regex { regex, name, group } => {
                Ok(match_regex(regex, *group, text, pos).map(|m| Node::leaf(*name, pos, m)))
            }
            Parser::Sequence { parsers, name } => {
                if rest_of(text, pos).is_none() {
                    return Ok(None);
                }
                let mut children = Vec::new();
                let mut end = pos;
                for parser in parsers {
                    match parser.parse_memo(grammar, text, end, memo)? {
                        Some(node) => {
                            end = node.end();
                            node.append_into(&mut children);
                        }
                        None => return Ok(None),
                    }
                }
                Ok(Some(Node::branch(*name, pos, end, children)))
            }
            Parser::Choice { parsers, name } => {
                if rest_of(text, pos).is_none() {
                    return Ok(None);
                }
                for parser in parsers {
                    if let Some(node) = parser.parse_memo(grammar, text, pos, memo)? {
                        return Ok(Some(match name {
                            Some(name) if !node.is_named() => node.relabel(*name),
                            _ => node,
                        }));
                    }
                }
                Ok(None)
            }
            Parser::Repeat {
                parser,
                name,
                min_matches,
            } => {
                let mut children = Vec::new();
                let mut end = pos;
                let mut count = 0;
                while let Some(node) = parser.parse_memo(grammar, text, end, memo)? {
                    // zero-width matches would loop forever
                    if node.end() <= end {
                        break;
                    }
                    end = node.end();
                    count += 1;
                    node.append_into(&mut children);
                }
                if count < *min_matches {
                    return Ok(None);
                }
                let name = if count > 0 { *name } else { None };
                Ok(Some(Node::branch(name, pos, end, children)))
            }
            Parser::Optional(parser) => {
                Ok(Some(match parser.parse_memo(grammar, text, pos, memo)? {
                    Some(node) if node.width() > 0 => node,
                    _ => Node::empty(pos),
                }))
            }
            Parser::Named { parser, name } => {
                Ok(parser.parse_memo(grammar, text, pos, memo)?.map(|node| {
                    if node.is_named() {
                        node.wrap(*name)
                    } else {
                        node.relabel(*name)
                    }
                }))
            }
            Parser::Ref(rule) => {
                let key = (rule.as_str(), pos);
                if let Some(hit) = memo.get(&key) {
                    return Ok(hit.clone());
                }
                let result = grammar.get(rule)?.parse_memo(grammar, text, pos, memo)?;
                memo.insert(key, result.clone());
                Ok(result)
            }
        }
    }

    /// Collect the names of every rule this expression refers to
    pub(crate) fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Parser::Ref(rule) => out.push(rule),
            Parser::Sequence { parsers, .. } | Parser::Choice { parsers, .. } => {
                for parser in parsers {
                    parser.collect_refs(out);
                }
            }
            Parser::Repeat { parser, .. }
            | Parser::Optional(parser)
            | Parser::Named { parser, .. } => parser.collect_refs(out),
            Parser::Char { .. }
            | Parser::NotChar { .. }
            | Parser::AnyChar { .. }
            | Parser::Literal { .. }
            | Parser::Regex { .. } => {}
        }
    }
}

/// Outcome of every by-name rule tried during one parse, keyed by rule and offset
///
/// Failed alternatives are often retried at the same offset by error
/// recovery; without this table nested failures re-parse their input once
/// per enclosing level.
type Memo<'g> = HashMap<(&'g str, usize), Option<Node>>;

/// Non-empty remainder of `text` from `pos`
fn rest_of(text: &str, pos: usize) -> Option<&str> {
    text.get(pos..).filter(|rest| !rest.is_empty())
}

fn next_char(text: &str, pos: usize) -> Option<char> {
    rest_of(text, pos)?.chars().next()
}

fn char_leaf(name: Option<Rule>, text: &str, pos: usize, c: char) -> Node {
    Node::leaf(name, pos, &text[pos..pos + c.len_utf8()])
}

fn match_regex<'t>(regex: &Regex, group: Option<usize>, text: &'t str, pos: usize) -> Option<&'t str> {
    let rest = rest_of(text, pos)?;
    match group {
        None => regex.find(rest).map(|m| m.as_str()),
        Some(group) => {
            let caps = regex.captures(rest)?;
            let whole = caps.get(0)?.as_str();
            Some(
                caps.get(group)
                    .map(|m| m.as_str())
                    .filter(|m| !m.is_empty())
                    .unwrap_or(whole),
            )
        }
    }
}
