//! Standard Clojure Style core
//!
//! Parsing layer of a Clojure formatter: a PEG grammar that turns any text
//! into a lossless concrete syntax tree, and an extractor that reads the
//! file's `ns` form into a structured descriptor.
//!
//! ```rust
//! use clj_style_core::{flatten, parse, parse_ns};
//!
//! let source = "(ns foo.bar\n  (:require [clojure.string :as str]))\n";
//! let root = parse(source);
//! assert_eq!(root.full_text(), source);
//!
//! let ns = parse_ns(&flatten(&root)).unwrap();
//! assert_eq!(ns.ns_symbol.as_deref(), Some("foo.bar"));
//! ```

pub mod cst;
pub mod error;
pub mod ns;

// Re-export commonly used types
pub use cst::{Grammar, Node, Rule, dump, flatten, parse, try_parse};
pub use error::{GrammarError, Result};
pub use ns::{NsDescriptor, look_for_ignore_file, parse_ns, sort_ns_result};

/// Initialize the tracing subscriber for logging
///
/// Logs go to stderr. `RUST_LOG` overrides `level` when set.
pub fn init_tracing(level: tracing::Level) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_log_directives(level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(level >= tracing::Level::DEBUG)
                .with_line_number(level >= tracing::Level::DEBUG),
        )
        .init();
}

/// Filter used when `RUST_LOG` is unset: the clj-style crates at `level`
fn default_log_directives(level: tracing::Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("clj_style_core={level},clj_style_devtools={level}")
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
