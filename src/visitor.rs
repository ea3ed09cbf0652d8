//! Visitor pattern implementation for traversing and rewriting documents.

use crate::property::property_path;
use crate::scalar::Scalar;
use crate::yaml::{Block, Document, Entry, Mapping, Sequence, SequenceEntry, Yaml};
use std::sync::Arc;

/// Trait for implementing the visitor pattern on YAML nodes.
///
/// Every method returns the node to use in place of the one visited. The
/// default implementations recurse through the `walk_*` functions, which
/// rebuild a parent only when one of its children came back as a
/// different allocation. Returning the input unchanged therefore costs
/// nothing and keeps the whole subtree shared.
///
/// A [`Cursor`] is threaded through the traversal. When a method is
/// called, the cursor's last element is the node being visited.
///
/// # Example
///
/// ```rust
/// use std::str::FromStr;
/// use std::sync::Arc;
/// use yaml_property_edit::visitor::{walk_entry, Cursor, YamlAccept, YamlVisitor};
/// use yaml_property_edit::{Entry, Yaml};
///
/// struct UpperCaseKeys;
///
/// impl YamlVisitor for UpperCaseKeys {
///     fn visit_entry<'a>(&mut self, entry: &'a Arc<Entry>, cursor: &mut Cursor<'a>) -> Arc<Entry> {
///         let entry = walk_entry(self, entry, cursor);
///         let key = entry.key().with_value(entry.key().value().to_uppercase());
///         Arc::new(entry.with_key(Arc::new(key)))
///     }
/// }
///
/// let yaml = Yaml::from_str("a:\n  b: 1\n").unwrap();
/// let document = yaml.document().unwrap().accept(&mut UpperCaseKeys);
/// assert_eq!(document.to_string(), "A:\n  B: 1\n");
/// ```
pub trait YamlVisitor {
    /// Visit a document node
    fn visit_document<'a>(&mut self, document: &'a Document, cursor: &mut Cursor<'a>) -> Document {
        walk_document(self, document, cursor)
    }

    /// Visit whichever node a block wraps
    fn visit_block<'a>(&mut self, block: &'a Block, cursor: &mut Cursor<'a>) -> Block {
        walk_block(self, block, cursor)
    }

    /// Visit a mapping node
    fn visit_mapping<'a>(
        &mut self,
        mapping: &'a Arc<Mapping>,
        cursor: &mut Cursor<'a>,
    ) -> Arc<Mapping> {
        walk_mapping(self, mapping, cursor)
    }

    /// Visit a mapping entry
    fn visit_entry<'a>(&mut self, entry: &'a Arc<Entry>, cursor: &mut Cursor<'a>) -> Arc<Entry> {
        walk_entry(self, entry, cursor)
    }

    /// Visit a sequence node
    fn visit_sequence<'a>(
        &mut self,
        sequence: &'a Arc<Sequence>,
        cursor: &mut Cursor<'a>,
    ) -> Arc<Sequence> {
        walk_sequence(self, sequence, cursor)
    }

    /// Visit a sequence item
    fn visit_sequence_entry<'a>(
        &mut self,
        entry: &'a Arc<SequenceEntry>,
        cursor: &mut Cursor<'a>,
    ) -> Arc<SequenceEntry> {
        walk_sequence_entry(self, entry, cursor)
    }

    /// Visit a scalar node, key or value
    fn visit_scalar<'a>(&mut self, scalar: &'a Arc<Scalar>, _cursor: &mut Cursor<'a>) -> Arc<Scalar> {
        Arc::clone(scalar)
    }
}

/// A node on the path from the document to the node being visited.
#[derive(Debug, Clone, Copy)]
pub enum Ancestor<'a> {
    /// The document
    Document(&'a Document),
    /// A mapping
    Mapping(&'a Arc<Mapping>),
    /// A mapping entry
    Entry(&'a Arc<Entry>),
    /// A sequence
    Sequence(&'a Arc<Sequence>),
    /// A sequence item
    SequenceEntry(&'a Arc<SequenceEntry>),
    /// A key or value scalar
    Scalar(&'a Arc<Scalar>),
}

/// The stack of nodes from the document root down to the node being visited.
///
/// The cursor always refers to the input tree, never to replacements
/// returned by the visitor.
#[derive(Debug, Default)]
pub struct Cursor<'a> {
    path: Vec<Ancestor<'a>>,
}

impl<'a> Cursor<'a> {
    /// Create an empty cursor.
    pub fn new() -> Self {
        Self { path: Vec::new() }
    }

    /// Enter a node.
    pub fn push(&mut self, node: Ancestor<'a>) {
        self.path.push(node);
    }

    /// Leave the innermost node.
    pub fn pop(&mut self) -> Option<Ancestor<'a>> {
        self.path.pop()
    }

    /// The full path, outermost first.
    pub fn path(&self) -> &[Ancestor<'a>] {
        &self.path
    }

    /// The node being visited.
    pub fn current(&self) -> Option<Ancestor<'a>> {
        self.path.last().copied()
    }

    /// The direct parent of the node being visited.
    pub fn parent(&self) -> Option<Ancestor<'a>> {
        self.path.len().checked_sub(2).map(|i| self.path[i])
    }

    /// The document, if it is the direct parent of the node being visited.
    pub fn parent_document(&self) -> Option<&'a Document> {
        match self.parent() {
            Some(Ancestor::Document(document)) => Some(document),
            _ => None,
        }
    }

    /// Whether the node being visited is the root block of its document.
    pub fn parent_is_document(&self) -> bool {
        self.parent_document().is_some()
    }

    /// The mapping entries on the path, root to leaf, including the node
    /// being visited if it is an entry.
    pub fn property_entries(&self) -> Vec<&'a Arc<Entry>> {
        self.path
            .iter()
            .filter_map(|node| match node {
                Ancestor::Entry(entry) => Some(*entry),
                _ => None,
            })
            .collect()
    }
}

/// Visit the root block of a document.
pub fn walk_document<'a, V: YamlVisitor + ?Sized>(
    visitor: &mut V,
    document: &'a Document,
    cursor: &mut Cursor<'a>,
) -> Document {
    let block = visitor.visit_block(document.block(), cursor);
    if block.ptr_eq(document.block()) {
        document.clone()
    } else {
        document.with_block(block)
    }
}

/// Dispatch on the node a block wraps.
pub fn walk_block<'a, V: YamlVisitor + ?Sized>(
    visitor: &mut V,
    block: &'a Block,
    cursor: &mut Cursor<'a>,
) -> Block {
    match block {
        Block::Scalar(scalar) => {
            cursor.push(Ancestor::Scalar(scalar));
            let scalar = visitor.visit_scalar(scalar, cursor);
            cursor.pop();
            Block::Scalar(scalar)
        }
        Block::Mapping(mapping) => {
            cursor.push(Ancestor::Mapping(mapping));
            let mapping = visitor.visit_mapping(mapping, cursor);
            cursor.pop();
            Block::Mapping(mapping)
        }
        Block::Sequence(sequence) => {
            cursor.push(Ancestor::Sequence(sequence));
            let sequence = visitor.visit_sequence(sequence, cursor);
            cursor.pop();
            Block::Sequence(sequence)
        }
    }
}

/// Visit every entry of a mapping.
pub fn walk_mapping<'a, V: YamlVisitor + ?Sized>(
    visitor: &mut V,
    mapping: &'a Arc<Mapping>,
    cursor: &mut Cursor<'a>,
) -> Arc<Mapping> {
    let original: &'a Mapping = mapping;
    let mut changed = false;
    let mut entries = Vec::with_capacity(original.entries().len());
    for entry in original.entries() {
        cursor.push(Ancestor::Entry(entry));
        let visited = visitor.visit_entry(entry, cursor);
        cursor.pop();
        changed |= !Arc::ptr_eq(&visited, entry);
        entries.push(visited);
    }
    if changed {
        Arc::new(original.with_entries(entries))
    } else {
        Arc::clone(mapping)
    }
}

/// Visit the key and then the value of an entry.
pub fn walk_entry<'a, V: YamlVisitor + ?Sized>(
    visitor: &mut V,
    entry: &'a Arc<Entry>,
    cursor: &mut Cursor<'a>,
) -> Arc<Entry> {
    let original: &'a Entry = entry;

    cursor.push(Ancestor::Scalar(original.key()));
    let key = visitor.visit_scalar(original.key(), cursor);
    cursor.pop();

    let value = visitor.visit_block(original.value(), cursor);

    match (Arc::ptr_eq(&key, original.key()), value.ptr_eq(original.value())) {
        (true, true) => Arc::clone(entry),
        (true, false) => Arc::new(original.with_value(value)),
        (false, true) => Arc::new(original.with_key(key)),
        (false, false) => Arc::new(original.with_key(key).with_value(value)),
    }
}

/// Visit every item of a sequence.
pub fn walk_sequence<'a, V: YamlVisitor + ?Sized>(
    visitor: &mut V,
    sequence: &'a Arc<Sequence>,
    cursor: &mut Cursor<'a>,
) -> Arc<Sequence> {
    let original: &'a Sequence = sequence;
    let mut changed = false;
    let mut entries = Vec::with_capacity(original.entries().len());
    for entry in original.entries() {
        cursor.push(Ancestor::SequenceEntry(entry));
        let visited = visitor.visit_sequence_entry(entry, cursor);
        cursor.pop();
        changed |= !Arc::ptr_eq(&visited, entry);
        entries.push(visited);
    }
    if changed {
        Arc::new(original.with_entries(entries))
    } else {
        Arc::clone(sequence)
    }
}

/// Visit the value of a sequence item.
pub fn walk_sequence_entry<'a, V: YamlVisitor + ?Sized>(
    visitor: &mut V,
    entry: &'a Arc<SequenceEntry>,
    cursor: &mut Cursor<'a>,
) -> Arc<SequenceEntry> {
    let original: &'a SequenceEntry = entry;
    let value = visitor.visit_block(original.value(), cursor);
    if value.ptr_eq(original.value()) {
        Arc::clone(entry)
    } else {
        Arc::new(original.with_value(value))
    }
}

/// Trait for nodes that can accept a visitor
pub trait YamlAccept: Sized {
    /// Run a visitor over this node, returning the rewritten node.
    fn accept<V: YamlVisitor + ?Sized>(&self, visitor: &mut V) -> Self;
}

impl YamlAccept for Document {
    fn accept<V: YamlVisitor + ?Sized>(&self, visitor: &mut V) -> Self {
        let mut cursor = Cursor::new();
        cursor.push(Ancestor::Document(self));
        visitor.visit_document(self, &mut cursor)
    }
}

impl YamlAccept for Yaml {
    fn accept<V: YamlVisitor + ?Sized>(&self, visitor: &mut V) -> Self {
        let documents = self
            .documents()
            .iter()
            .map(|document| document.accept(visitor))
            .collect();
        self.with_documents(documents)
    }
}

/// A visitor that collects the dotted name of every entry whose value is
/// not a mapping, in document order.
#[derive(Debug, Default)]
pub struct PropertyCollector {
    properties: Vec<String>,
}

impl PropertyCollector {
    /// Create a new property collector
    pub fn new() -> Self {
        Self::default()
    }

    /// The properties collected so far.
    pub fn properties(&self) -> &[String] {
        &self.properties
    }

    /// Consume the collector, returning the properties.
    pub fn into_properties(self) -> Vec<String> {
        self.properties
    }
}

impl YamlVisitor for PropertyCollector {
    fn visit_entry<'a>(&mut self, entry: &'a Arc<Entry>, cursor: &mut Cursor<'a>) -> Arc<Entry> {
        if entry.value().as_mapping().is_none() {
            self.properties.push(property_path(&cursor.property_entries()));
        }
        walk_entry(self, entry, cursor)
    }
}
