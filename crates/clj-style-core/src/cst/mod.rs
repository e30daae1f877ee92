//! Concrete Syntax Tree (CST) for Clojure
//!
//! This module implements a lossless syntax tree built by a small PEG
//! engine. The tree keeps every byte of the input, including whitespace,
//! commas, comments and discarded forms, so that
//! `parse(source).full_text() == source` for any input.
//!
//! ## Architecture
//!
//! - [`Parser`]: terminal and combining parser expressions
//! - [`Grammar`]: name→parser registry with lazy by-name references,
//!   allowing mutually recursive rules
//! - [`Grammar::clojure`]: the Clojure rule set
//! - [`flatten`]: pre-order node sequence consumed by the `ns` extractor
//! - [`dump`]: s-expression rendering used by golden tests
//!
//! ## Error Recovery
//!
//! Parsing never fails on malformed source. Bytes that no rule accepts
//! become `error` leaves, and closing delimiters and string terminators
//! are optional, so an unterminated `"abc` is still a `string` node.
//!
//! ## Example
//!
//! ```rust
//! use clj_style_core::cst::{Rule, dump, parse};
//!
//! let root = parse("(+ 1 2)");
//! assert_eq!(root.full_text(), "(+ 1 2)");
//! assert!(root.children()[0].is(Rule::Parens));
//! assert!(dump(&root).starts_with("(source 0..7"));
//! ```

mod combinators;
mod flatten;
mod grammar;
mod node;
mod printer;
mod registry;

pub use combinators::Parser;
pub use flatten::{flatten, leaves};
pub use grammar::{clojure_grammar, parse, try_parse};
pub use node::{Node, Rule};
pub use printer::dump;
pub use registry::{Grammar, SOURCE_RULE};
