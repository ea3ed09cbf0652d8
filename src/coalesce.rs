//! Folding of single-entry mapping chains into dotted keys.

use crate::scalar::ScalarStyle;
use crate::visitor::{walk_entry, Cursor, YamlAccept, YamlVisitor};
use crate::yaml::{Document, Entry};
use std::sync::Arc;

/// A post-processing pass run after a property has been moved.
pub trait Coalesce {
    /// Return the document with properties coalesced.
    fn coalesce(&self, document: &Document) -> Document;
}

impl<F> Coalesce for F
where
    F: Fn(&Document) -> Document,
{
    fn coalesce(&self, document: &Document) -> Document {
        self(document)
    }
}

/// Collapses every entry whose value is a mapping with exactly one entry
/// into a single dotted key, so `a:\n  b: 1` becomes `a.b: 1`.
///
/// Chains collapse completely because inner entries are folded first.
/// Entries are left alone when either key is quoted or when the nested
/// mapping is preceded by a comment, which would otherwise be lost.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoalesceProperties;

impl Coalesce for CoalesceProperties {
    fn coalesce(&self, document: &Document) -> Document {
        document.accept(&mut CoalesceVisitor)
    }
}

struct CoalesceVisitor;

impl YamlVisitor for CoalesceVisitor {
    fn visit_entry<'a>(&mut self, entry: &'a Arc<Entry>, cursor: &mut Cursor<'a>) -> Arc<Entry> {
        let entry = walk_entry(self, entry, cursor);
        let Some(mapping) = entry.value().as_mapping() else {
            return entry;
        };
        let [inner] = mapping.entries() else {
            return entry;
        };
        if entry.key().style() != ScalarStyle::Plain
            || inner.key().style() != ScalarStyle::Plain
            || mapping.prefix().contains('#')
            || inner.prefix().contains('#')
        {
            return entry;
        }

        let key = entry
            .key()
            .with_value(format!("{}.{}", entry.key().value(), inner.key().value()));
        Arc::new(
            entry
                .with_key(Arc::new(key))
                .with_before_colon(inner.before_colon())
                .with_value(inner.value().clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yaml::Yaml;
    use std::str::FromStr;

    fn coalesce(text: &str) -> String {
        let document = Yaml::from_str(text).unwrap().document().unwrap().clone();
        CoalesceProperties.coalesce(&document).to_string()
    }

    #[test]
    fn test_fold_chain() {
        assert_eq!(coalesce("a:\n  b:\n    c: 1\n"), "a.b.c: 1\n");
    }

    #[test]
    fn test_fold_stops_at_branching_mapping() {
        assert_eq!(
            coalesce("a:\n  b:\n    c: 1\n    d: 2\n"),
            "a.b:\n    c: 1\n    d: 2\n"
        );
        assert_eq!(
            coalesce("a:\n  b:\n    c: 1\n  e: 2\n"),
            "a:\n  b.c: 1\n  e: 2\n"
        );
    }

    #[test]
    fn test_fold_keeps_nested_sequences() {
        assert_eq!(coalesce("a:\n  b:\n  - x\n  - y\n"), "a.b:\n  - x\n  - y\n");
    }

    #[test]
    fn test_quoted_keys_and_comments_are_kept() {
        let quoted = "'a':\n  b: 1\n";
        assert_eq!(coalesce(quoted), quoted);
        let commented = "a: # note\n  b: 1\n";
        assert_eq!(coalesce(commented), commented);
    }

    #[test]
    fn test_idempotent() {
        let once = coalesce("x:\n  y:\n    z: 1\nq:\n  r: 2\n  s: 3\n");
        assert_eq!(once, "x.y.z: 1\nq:\n  r: 2\n  s: 3\n");
        assert_eq!(coalesce(&once), once);
    }

    #[test]
    fn test_closure_coalescer() {
        let document = Yaml::from_str("a: 1\n").unwrap().document().unwrap().clone();
        let hook = |document: &Document| document.with_end("\n# done\n");
        assert_eq!(hook.coalesce(&document).to_string(), "a: 1\n# done\n");
    }
}
