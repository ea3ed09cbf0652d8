//! Appends a relocated property next to the entry where old and new names diverge.

use crate::scalar::Scalar;
use crate::visitor::{walk_mapping, Cursor, YamlAccept, YamlVisitor};
use crate::yaml::{Block, Document, Entry, Mapping, NodeId};
use log::{debug, warn};
use std::sync::Arc;

/// Appends `subproperty: value` to the mapping that holds the entry `scope`.
pub(crate) struct InsertSubproperty<'p> {
    scope: NodeId,
    subproperty: &'p str,
    value: &'p Block,
    inserted: bool,
}

impl<'p> InsertSubproperty<'p> {
    pub(crate) fn new(scope: NodeId, subproperty: &'p str, value: &'p Block) -> Self {
        Self {
            scope,
            subproperty,
            value,
            inserted: false,
        }
    }

    pub(crate) fn apply(mut self, document: &Document) -> Document {
        let result = document.accept(&mut self);
        if !self.inserted {
            warn!(
                "no mapping contains entry {}; '{}' was not inserted",
                self.scope, self.subproperty
            );
        }
        result
    }
}

impl YamlVisitor for InsertSubproperty<'_> {
    fn visit_mapping<'a>(
        &mut self,
        mapping: &'a Arc<Mapping>,
        cursor: &mut Cursor<'a>,
    ) -> Arc<Mapping> {
        let mapping = walk_mapping(self, mapping, cursor);
        if self.inserted {
            return mapping;
        }
        let Some(index) = mapping
            .entries()
            .iter()
            .position(|entry| entry.id() == self.scope)
        else {
            return mapping;
        };
        let scope = &mapping.entries()[index];

        let entry = Entry::new(Scalar::plain(self.subproperty), self.value.deep_clone())
            .with_prefix(entry_prefix(scope, &mapping))
            .with_before_colon(scope.before_colon());
        debug!("inserting '{}' into mapping {}", self.subproperty, mapping.id());

        let mut entries = mapping.entries().to_vec();
        entries.push(Arc::new(entry));
        self.inserted = true;
        Arc::new(mapping.with_entries(entries))
    }
}

/// Leading text for an entry appended after `scope`'s siblings.
///
/// Reuses `scope`'s own prefix so the new entry lines up with it. The first
/// entry of a mapping has an empty prefix, and a prefix carrying comments
/// would duplicate them, so both fall back to a line break plus the
/// mapping's indentation.
fn entry_prefix(scope: &Entry, mapping: &Mapping) -> String {
    let prefix = scope.prefix();
    if !prefix.is_empty() && !prefix.contains('#') {
        prefix.to_string()
    } else {
        format!("{}{}", line_break(scope, mapping), " ".repeat(mapping.indent()))
    }
}

/// The line break already used around `scope`: the first one found in the
/// prefixes of `mapping`, else the first one in `scope`'s value.
fn line_break(scope: &Entry, mapping: &Mapping) -> &'static str {
    let crlf = mapping
        .entries()
        .iter()
        .map(|entry| entry.prefix())
        .chain([mapping.prefix()])
        .find(|prefix| prefix.contains('\n'))
        .map(|prefix| prefix.contains("\r\n"))
        .unwrap_or_else(|| scope.value().to_string().contains("\r\n"));
    if crlf {
        "\r\n"
    } else {
        "\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yaml::Yaml;
    use std::str::FromStr;

    fn parse(text: &str) -> Document {
        Yaml::from_str(text).unwrap().document().unwrap().clone()
    }

    fn value(text: &str) -> Block {
        Block::from(Scalar::plain(text).with_prefix(" "))
    }

    #[test]
    fn test_insert_after_first_entry_uses_indentation() {
        let document = parse("a:\n  b: 1\n  c: 2\n");
        let mapping = document.as_mapping().unwrap().entries()[0].value().as_mapping().unwrap();
        let scope = mapping.entries()[0].id();
        let v = value("3");
        let result = InsertSubproperty::new(scope, "x.y", &v).apply(&document);
        assert_eq!(result.to_string(), "a:\n  b: 1\n  c: 2\n  x.y: 3\n");
    }

    #[test]
    fn test_insert_keeps_crlf_line_breaks() {
        let document = parse("a: 1\r\nb: 2\r\n");
        let scope = document.as_mapping().unwrap().entries()[0].id();
        let v = value("3");
        let result = InsertSubproperty::new(scope, "c", &v).apply(&document);
        assert_eq!(result.to_string(), "a: 1\r\nb: 2\r\nc: 3\r\n");

        let document = parse("a:\r\n  b: 1\r\n");
        let scope = document.as_mapping().unwrap().entries()[0].id();
        let result = InsertSubproperty::new(scope, "c", &v).apply(&document);
        assert_eq!(result.to_string(), "a:\r\n  b: 1\r\nc: 3\r\n");
    }

    #[test]
    fn test_insert_copies_sibling_prefix() {
        let document = parse("a: 1\n\nb: 2\n");
        let scope = document.as_mapping().unwrap().entries()[1].id();
        let v = value("3");
        let result = InsertSubproperty::new(scope, "c", &v).apply(&document);
        assert_eq!(result.to_string(), "a: 1\n\nb: 2\n\nc: 3\n");
    }

    #[test]
    fn test_insert_does_not_copy_comments() {
        let document = parse("a: 1\n# about b\nb: 2\n");
        let scope = document.as_mapping().unwrap().entries()[1].id();
        let v = value("3");
        let result = InsertSubproperty::new(scope, "c", &v).apply(&document);
        assert_eq!(result.to_string(), "a: 1\n# about b\nb: 2\nc: 3\n");
    }

    #[test]
    fn test_insert_copies_spacing_before_colon() {
        let document = parse("a : 1\n");
        let scope = document.as_mapping().unwrap().entries()[0].id();
        let v = value("2");
        let result = InsertSubproperty::new(scope, "b", &v).apply(&document);
        assert_eq!(result.to_string(), "a : 1\nb : 2\n");
    }

    #[test]
    fn test_inserted_value_is_a_fresh_copy() {
        let document = parse("a:\n  b: 1\n");
        let entry = &document.as_mapping().unwrap().entries()[0];
        let result = InsertSubproperty::new(entry.id(), "c", entry.value()).apply(&document);
        assert_eq!(result.to_string(), "a:\n  b: 1\nc:\n  b: 1\n");

        let inserted = &result.as_mapping().unwrap().entries()[1];
        assert!(inserted.value().content_eq(entry.value()));
        assert_ne!(inserted.value().id(), entry.value().id());
    }

    #[test]
    fn test_missing_scope_is_noop() {
        let document = parse("a: 1\n");
        let v = value("2");
        let result = InsertSubproperty::new(NodeId::fresh(), "b", &v).apply(&document);
        assert_eq!(result.to_string(), "a: 1\n");
        assert!(result.block().ptr_eq(document.block()));
    }
}
