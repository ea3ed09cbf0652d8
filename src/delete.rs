//! Removes a relocated property and every mapping left empty by the removal.

use crate::visitor::{walk_mapping, Cursor, YamlAccept, YamlVisitor};
use crate::yaml::{Document, Entry, Mapping, NodeId};
use log::trace;
use std::sync::Arc;

/// Drops the entry `scope`, then prunes entries whose value became an
/// empty mapping, working from the leaves up.
pub(crate) struct DeleteProperty {
    scope: NodeId,
}

impl DeleteProperty {
    pub(crate) fn new(scope: NodeId) -> Self {
        Self { scope }
    }

    pub(crate) fn apply(mut self, document: &Document) -> Document {
        document.accept(&mut self)
    }
}

impl YamlVisitor for DeleteProperty {
    fn visit_mapping<'a>(
        &mut self,
        mapping: &'a Arc<Mapping>,
        cursor: &mut Cursor<'a>,
    ) -> Arc<Mapping> {
        let mapping = walk_mapping(self, mapping, cursor);

        // A removed entry's prefix opens with the comment ending the line of
        // the entry before it; that comment moves to the next kept entry.
        let mut entries: Vec<Arc<Entry>> = Vec::with_capacity(mapping.entries().len());
        let mut carried = None;
        let mut predecessor_removed = false;
        for entry in mapping.entries() {
            if entry.id() == self.scope || entry.value().is_empty_mapping() {
                if !predecessor_removed && !entries.is_empty() {
                    carried = same_line_comment(entry.prefix());
                }
                predecessor_removed = true;
                continue;
            }
            entries.push(if predecessor_removed {
                replace_same_line_comment(entry, carried.take())
            } else {
                Arc::clone(entry)
            });
            predecessor_removed = false;
        }
        let changed = entries.len() != mapping.entries().len();
        let first_dropped = changed
            && entries.first().map(|entry| entry.id())
                != mapping.entries().first().map(|entry| entry.id());
        let document_root = cursor
            .parent_document()
            .is_some_and(|document| !document.is_explicit());

        if !changed && !document_root {
            return mapping;
        }
        if changed {
            trace!(
                "mapping {} keeps {} of {} entries",
                mapping.id(),
                entries.len(),
                mapping.entries().len()
            );
        }

        // The new first entry must not start with the line break that used
        // to separate it from its predecessor.
        if (changed && (entries.len() == 1 || first_dropped)) || document_root {
            if let Some(first) = entries.first_mut() {
                *first = trim_leading_whitespace(first);
            }
        }
        Arc::new(mapping.with_entries(entries))
    }
}

/// The comment that opens `prefix` and ends the previous line, if any.
fn same_line_comment(prefix: &str) -> Option<&str> {
    let end = prefix.find(['\r', '\n'])?;
    let line = &prefix[..end];
    line.trim_start().starts_with('#').then_some(line)
}

/// The entry with the comment closing the line above it replaced by
/// `comment`.
fn replace_same_line_comment(entry: &Arc<Entry>, comment: Option<&str>) -> Arc<Entry> {
    let prefix = entry.prefix();
    let rest = same_line_comment(prefix).map_or(prefix, |own| &prefix[own.len()..]);
    let replaced = format!("{}{}", comment.unwrap_or(""), rest);
    if replaced == prefix {
        Arc::clone(entry)
    } else {
        trace!("moving the comment before entry {}", entry.id());
        Arc::new(entry.with_prefix(replaced))
    }
}

/// The entry without the whitespace that opens its prefix. Comment lines
/// further into the prefix are kept.
fn trim_leading_whitespace(entry: &Arc<Entry>) -> Arc<Entry> {
    let prefix = entry.prefix();
    let trimmed = prefix.trim_start_matches(|c: char| matches!(c, ' ' | '\t' | '\r' | '\n'));
    if trimmed.len() == prefix.len() {
        Arc::clone(entry)
    } else {
        Arc::new(entry.with_prefix(trimmed))
    }
}
