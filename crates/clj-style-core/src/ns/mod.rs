//! `ns` form extraction
//!
//! Reads the namespace declaration of a Clojure file out of the flattened
//! CST and describes it as an [`NsDescriptor`]: the namespace symbol,
//! metadata and docstring, `:refer-clojure`, `:require`, `:require-macros`,
//! `:import` and `:gen-class` clauses, reader-conditional platforms, prefix
//! lists, and the comments attached to each of them.
//!
//! The descriptor is the input for rewriting the `ns` form in canonical
//! order, so it serializes to camelCase JSON with empty fields omitted.
//!
//! ```rust
//! use clj_style_core::{flatten, parse};
//! use clj_style_core::ns::{look_for_ignore_file, parse_ns};
//!
//! let root = parse("(ns app.core\n  (:import (java.util Date UUID)))");
//! let nodes = flatten(&root);
//! assert!(!look_for_ignore_file(&nodes));
//!
//! let ns = parse_ns(&nodes).unwrap();
//! assert_eq!(ns.imports_obj["java.util"].classes, vec!["Date", "UUID"]);
//! ```

mod ignore;
mod model;
mod parser;
pub mod predicates;
mod sort;

pub use ignore::{IGNORE_FILE_KEYWORD, look_for_ignore_file};
pub use model::{
    GenClass, GenClassOption, GenClassValue, ImportEntry, NsDescriptor, NsMetadata,
    PlatformSymbol, PrefixListComments, Refer, ReferClojure, Rename, RequireEntry,
    RequireMacroEntry,
};
pub use parser::parse_ns;
pub use sort::sort_ns_result;
