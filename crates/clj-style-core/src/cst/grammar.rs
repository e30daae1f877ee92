//! Clojure grammar
//!
//! The rule set that turns Clojure/ClojureScript source into a lossless CST.
//! Rules whose names start with `_` produce anonymous nodes that are spliced
//! into their parent; all other rules name their node after themselves.
//!
//! ```text
//! source   = (_gap | _form | error)*
//! _gap     = _ws | comment | discard
//! _form    = token | string | parens | brackets | braces | wrap | meta | tagged
//! discard  = "#_" _gap* _form
//! parens   = opener (_gap | _form | !")")* ")"?
//! meta     = ("^" _gap* _form _gap*)+ _form
//! wrap     = ("@" | "'" | "`" | "~@" | "~" | "#'") _gap* _form
//! tagged   = "#" _gap* token _gap* _form
//! ```
//!
//! Every text-bearing terminal is named, so concatenating the leaves of any
//! parse reproduces the input exactly, however malformed it is.

use once_cell::sync::Lazy;
use tracing::debug;

use super::combinators::Parser;
use super::node::{Node, Rule};
use super::registry::{Grammar, SOURCE_RULE};
use crate::error::Result;

/// Whitespace: ASCII separators, comma, and the Unicode separators the
/// Clojure reader treats as whitespace (no non-breaking spaces)
const WHITESPACE: &str = r" ,\n\r\t\f\x0B\x1C-\x1F\x{2028}\x{2029}\x{1680}\x{2000}-\x{2006}\x{2008}\x{2009}\x{200A}\x{205F}\x{3000}";

/// Characters a token may not start with
const TOKEN_HEAD_EXCLUDED: &str = r#"()\[\]{}"@~^;`#'"#;

/// Characters a token may not contain after its first character
const TOKEN_TAIL_EXCLUDED: &str = r#"()\[\]{}"@^;`"#;

/// Character literal of a delimiter or separator, e.g. `\(` or `\ `
const CHAR_LITERAL: &str = r#"\\[()\[\]{}"@^;`, ]"#;

const STRING_OPEN: &str = r#"#?""#;
const STRING_BODY: &str = r#"(?:[^"\\]+|\\(?s:.))+"#;
const PARENS_OPEN: &str = r"(?:#\?@|#\?|#=|#)?\(";
const NAMESPACED_MAP_OPEN: &str = r"#:{1,2}[a-zA-Z][a-zA-Z0-9.\-_]*\{";
const META_MARKER: &str = r"#?\^";
const WRAP_MARKER: &str = r"@|'|`|~@|~|#'";

static CLOJURE: Lazy<Grammar> = Lazy::new(|| match Grammar::clojure() {
    Ok(grammar) => grammar,
    Err(err) => panic!("built-in Clojure grammar is invalid: {err}"),
});

/// Shared handle to the built-in Clojure grammar
pub fn clojure_grammar() -> &'static Grammar {
    &CLOJURE
}

/// Parse Clojure source into a CST rooted at a `source` node
///
/// Total: malformed input still yields a tree covering every byte.
///
/// # Panics
///
/// Only if the built-in grammar is itself broken.
pub fn parse(source: &str) -> Node {
    match try_parse(source) {
        Ok(root) => root,
        Err(err) => panic!("built-in Clojure grammar is invalid: {err}"),
    }
}

/// Parse with the built-in grammar, propagating configuration errors
pub fn try_parse(source: &str) -> Result<Node> {
    clojure_grammar().parse(source)
}

impl Grammar {
    /// Build and validate the Clojure rule set
    ///
    /// # Errors
    ///
    /// Returns a [`crate::GrammarError`] if a pattern fails to compile or a
    /// rule reference is dangling.
    pub fn clojure() -> Result<Self> {
        let mut grammar = Grammar::new();

        grammar
            .register("_ws", Parser::regex(&format!("[{WHITESPACE}]+"), Some(Rule::Whitespace))?)
            .register("comment", Parser::regex(";[^\\n]*", Some(Rule::Comment))?)
            .register("token", Parser::regex(&token_pattern(), Some(Rule::Token))?)
            .register(
                "string",
                Parser::seq(
                    vec![
                        Parser::regex(STRING_OPEN, Some(Rule::Open))?,
                        Parser::optional(Parser::regex(STRING_BODY, Some(Rule::Body))?),
                        Parser::optional(Parser::char('"', Some(Rule::Close))),
                    ],
                    Some(Rule::String),
                ),
            )
            .register(
                "_gap",
                Parser::choice(
                    vec![
                        Parser::rule("_ws"),
                        Parser::rule("comment"),
                        Parser::rule("discard"),
                    ],
                    None,
                ),
            )
            .register(
                "discard",
                Parser::seq(
                    vec![
                        Parser::literal("#_", Some(Rule::Marker)),
                        gaps(),
                        Parser::named(Parser::rule("_form"), Rule::Body),
                    ],
                    Some(Rule::Discard),
                ),
            )
            .register(
                "braces",
                delimited(
                    Parser::choice(
                        vec![
                            Parser::char('{', Some(Rule::Open)),
                            Parser::literal("#{", Some(Rule::Open)),
                            Parser::literal("#::{", Some(Rule::Open)),
                            Parser::regex(NAMESPACED_MAP_OPEN, Some(Rule::Open))?,
                        ],
                        None,
                    ),
                    '}',
                    Rule::Braces,
                ),
            )
            .register(
                "brackets",
                delimited(Parser::char('[', Some(Rule::Open)), ']', Rule::Brackets),
            )
            .register(
                "parens",
                delimited(Parser::regex(PARENS_OPEN, Some(Rule::Open))?, ')', Rule::Parens),
            )
            .register(
                "meta",
                Parser::seq(
                    vec![
                        Parser::repeat(
                            Parser::seq(
                                vec![
                                    Parser::regex(META_MARKER, Some(Rule::Marker))?,
                                    gaps(),
                                    Parser::named(Parser::rule("_form"), Rule::MetaValue),
                                    gaps(),
                                ],
                                None,
                            ),
                            None,
                            1,
                        ),
                        Parser::named(Parser::rule("_form"), Rule::Body),
                    ],
                    Some(Rule::Meta),
                ),
            )
            .register(
                "wrap",
                Parser::seq(
                    vec![
                        Parser::regex(WRAP_MARKER, Some(Rule::Marker))?,
                        gaps(),
                        Parser::named(Parser::rule("_form"), Rule::Body),
                    ],
                    Some(Rule::Wrap),
                ),
            )
            .register(
                "tagged",
                Parser::seq(
                    vec![
                        Parser::char('#', Some(Rule::Marker)),
                        gaps(),
                        Parser::named(Parser::rule("token"), Rule::Tag),
                        gaps(),
                        Parser::named(Parser::rule("_form"), Rule::Body),
                    ],
                    Some(Rule::Tagged),
                ),
            )
            .register(
                "_form",
                Parser::choice(
                    ["token", "string", "parens", "brackets", "braces", "wrap", "meta", "tagged"]
                        .into_iter()
                        .map(Parser::rule)
                        .collect(),
                    None,
                ),
            )
            .register(
                SOURCE_RULE,
                Parser::repeat(
                    Parser::choice(
                        vec![
                            Parser::rule("_gap"),
                            Parser::rule("_form"),
                            Parser::any_char(Some(Rule::Error)),
                        ],
                        None,
                    ),
                    Some(Rule::Source),
                    0,
                ),
            );

        grammar.validate()?;
        debug!("Built Clojure grammar with {} rules", grammar.len());
        Ok(grammar)
    }
}

fn token_pattern() -> String {
    [
        "(?:##)?(?:",
        CHAR_LITERAL,
        "|[^",
        TOKEN_HEAD_EXCLUDED,
        WHITESPACE,
        "][^",
        TOKEN_TAIL_EXCLUDED,
        WHITESPACE,
        "]*)",
    ]
    .concat()
}

fn gaps() -> Parser {
    Parser::repeat(Parser::rule("_gap"), None, 0)
}

/// Opener, a body that always makes progress, and a tolerant closer
fn delimited(open: Parser, close: char, name: Rule) -> Parser {
    Parser::seq(
        vec![
            open,
            Parser::repeat(
                Parser::choice(
                    vec![
                        Parser::rule("_gap"),
                        Parser::rule("_form"),
                        Parser::not_char(close, Some(Rule::Error)),
                    ],
                    None,
                ),
                Some(Rule::Body),
                0,
            ),
            Parser::optional(Parser::char(close, Some(Rule::Close))),
        ],
        Some(name),
    )
}
