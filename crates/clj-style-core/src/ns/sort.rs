//! Canonical ordering of an [`NsDescriptor`]

use super::model::{NsDescriptor, PlatformSymbol, Refer, Rename};

/// Sort a descriptor in place
///
/// Requires and require-macros are ordered by symbol, then platform. Symbol
/// lists are ordered by symbol, renames by their source symbol, and import
/// classes are sorted with duplicates removed. The sort is stable, so entries
/// that compare equal keep their source order.
pub fn sort_ns_result(ns: &mut NsDescriptor) {
    ns.requires.sort_by(|a, b| {
        a.symbol
            .cmp(&b.symbol)
            .then_with(|| a.platform.cmp(&b.platform))
    });
    for entry in &mut ns.requires {
        if let Some(Refer::Symbols(symbols)) = entry.refer.as_mut() {
            sort_symbols(symbols);
        }
        if let Some(list) = entry.refer_macros.as_mut() {
            sort_symbols(list);
        }
        if let Some(list) = entry.exclude.as_mut() {
            sort_symbols(list);
        }
        if let Some(list) = entry.rename.as_mut() {
            sort_renames(list);
        }
    }

    ns.require_macros.sort_by(|a, b| {
        a.symbol
            .cmp(&b.symbol)
            .then_with(|| a.platform.cmp(&b.platform))
    });
    for entry in &mut ns.require_macros {
        if let Some(list) = entry.refer.as_mut() {
            sort_symbols(list);
        }
        if let Some(list) = entry.rename.as_mut() {
            sort_renames(list);
        }
    }

    if let Some(refer_clojure) = ns.refer_clojure.as_mut() {
        if let Some(list) = refer_clojure.exclude.as_mut() {
            sort_symbols(list);
        }
        if let Some(list) = refer_clojure.only.as_mut() {
            sort_symbols(list);
        }
        if let Some(list) = refer_clojure.rename.as_mut() {
            sort_renames(list);
        }
    }

    for import in ns.imports_obj.values_mut() {
        import.classes.sort();
        import.classes.dedup();
    }
}

fn sort_symbols(symbols: &mut [PlatformSymbol]) {
    symbols.sort_by(|a, b| {
        a.symbol
            .cmp(&b.symbol)
            .then_with(|| a.platform.cmp(&b.platform))
    });
}

fn sort_renames(renames: &mut [Rename]) {
    renames.sort_by(|a, b| a.from_symbol.cmp(&b.from_symbol));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ns::model::{ImportEntry, ReferClojure, RequireEntry};

    fn symbol(s: &str) -> PlatformSymbol {
        PlatformSymbol {
            symbol: s.to_string(),
            platform: None,
        }
    }

    #[test]
    fn test_requires_sorted_by_symbol_then_platform() {
        let mut ns = NsDescriptor::default();
        for (sym, platform) in [("b", None), ("a", Some("cljs")), ("a", Some("clj")), ("a", None)] {
            ns.requires.push(RequireEntry {
                platform: platform.map(str::to_string),
                ..RequireEntry::new(sym)
            });
        }
        sort_ns_result(&mut ns);

        let order: Vec<_> = ns
            .requires
            .iter()
            .map(|r| (r.symbol.as_str(), r.platform.as_deref()))
            .collect();
        assert_eq!(
            order,
            vec![("a", None), ("a", Some("clj")), ("a", Some("cljs")), ("b", None)]
        );
    }

    #[test]
    fn test_nested_lists_sorted() {
        let mut ns = NsDescriptor::default();
        ns.requires.push(RequireEntry {
            refer: Some(Refer::Symbols(vec![symbol("z"), symbol("m"), symbol("a")])),
            rename: Some(vec![
                Rename {
                    from_symbol: "y".to_string(),
                    to_symbol: "y2".to_string(),
                    platform: None,
                },
                Rename {
                    from_symbol: "x".to_string(),
                    to_symbol: "x2".to_string(),
                    platform: None,
                },
            ]),
            ..RequireEntry::new("lib")
        });
        ns.refer_clojure = Some(ReferClojure {
            exclude: Some(vec![symbol("update"), symbol("get")]),
            ..ReferClojure::default()
        });
        ns.imports_obj.insert(
            "java.util".to_string(),
            ImportEntry {
                classes: vec!["UUID".into(), "Date".into(), "UUID".into()],
                ..ImportEntry::default()
            },
        );

        sort_ns_result(&mut ns);

        let entry = &ns.requires[0];
        assert_eq!(
            entry.refer,
            Some(Refer::Symbols(vec![symbol("a"), symbol("m"), symbol("z")]))
        );
        let renames: Vec<_> = entry
            .rename
            .iter()
            .flatten()
            .map(|r| r.from_symbol.as_str())
            .collect();
        assert_eq!(renames, vec!["x", "y"]);

        let exclude = ns.refer_clojure.unwrap().exclude.unwrap();
        assert_eq!(exclude, vec![symbol("get"), symbol("update")]);
        assert_eq!(ns.imports_obj["java.util"].classes, vec!["Date", "UUID"]);
    }

    #[test]
    fn test_refer_all_untouched() {
        let mut ns = NsDescriptor::default();
        ns.requires.push(RequireEntry {
            refer: Some(Refer::All),
            ..RequireEntry::new("a")
        });
        sort_ns_result(&mut ns);
        assert_eq!(ns.requires[0].refer, Some(Refer::All));
    }
}
