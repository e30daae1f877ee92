//! Namespace descriptor produced by the `ns` extractor
//!
//! Field names and nesting are a wire contract: fixtures and the formatter
//! consume the camelCase JSON form. Empty fields are left out of the JSON.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// Description of a file's `ns` form
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NsDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ns_symbol: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ns_metadata: Vec<NsMetadata>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refer_clojure: Option<ReferClojure>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub refer_clojure_comments_above: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refer_clojure_comment_after: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<RequireEntry>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub require_comments_above: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_comment_after: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub require_macros: Vec<RequireMacroEntry>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub require_macros_comments_above: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub require_macros_comment_after: Option<String>,

    /// Imports keyed by Java package
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub imports_obj: BTreeMap<String, ImportEntry>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub import_comments_above: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_comment_after: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gen_class: Option<GenClass>,

    /// Comments attached to a whole prefix list, keyed by `prefixListId`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub prefix_list_comments: BTreeMap<u32, PrefixListComments>,

    /// Trailing comment on the line where the `ns` form closes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_outside_ns_form: Option<String>,
}

/// One `^:flag` or `^{:key value}` entry on the namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NsMetadata {
    pub key: String,
    pub value: String,
}

/// A symbol, tagged with the reader-conditional platform it appeared under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformSymbol {
    pub symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// A `:rename` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rename {
    pub from_symbol: String,
    pub to_symbol: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
}

/// `(:refer-clojure ...)` clauses
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferClojure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<PlatformSymbol>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub only: Option<Vec<PlatformSymbol>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename: Option<Vec<Rename>>,
}

/// Value of `:refer`: either a list of symbols or `:all`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refer {
    All,
    Symbols(Vec<PlatformSymbol>),
}

impl Serialize for Refer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Refer::All => serializer.serialize_str("all"),
            Refer::Symbols(symbols) => symbols.serialize(serializer),
        }
    }
}

/// One namespace loaded by `(:require ...)`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequireEntry {
    pub symbol: String,

    /// True for string namespaces such as `["react" :as react]`
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub symbol_is_string: bool,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_sym: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub as_alias: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refer: Option<Refer>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refer_macros: Option<Vec<PlatformSymbol>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<PlatformSymbol>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename: Option<Vec<Rename>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_macros: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_list_id: Option<u32>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments_above: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_after: Option<String>,
}

impl RequireEntry {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Self::default()
        }
    }
}

/// One namespace loaded by `(:require-macros ...)`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequireMacroEntry {
    pub symbol: String,

    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub as_sym: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub refer: Option<Vec<PlatformSymbol>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rename: Option<Vec<Rename>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments_above: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_after: Option<String>,
}

/// Classes imported from one Java package
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportEntry {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments_above: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_after: Option<String>,
}

/// `(:gen-class ...)` options
///
/// Options are flattened next to the comment fields, so the JSON reads
/// `{"name": {"value": "Foo"}, "main": {"value": true}, "commentAfter": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenClass {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments_above: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_after: Option<String>,

    #[serde(flatten)]
    pub options: BTreeMap<String, GenClassOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenClassOption {
    pub value: GenClassValue,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments_above: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_after: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GenClassValue {
    Text(String),
    Bool(bool),
}

/// Comments attached to a prefix list as a whole
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefixListComments {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub comments_above: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_after: Option<String>,
}
