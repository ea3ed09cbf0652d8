//! Persistent, lossless YAML document model.
//!
//! Nodes are immutable. Children are shared through [`Arc`], so a rewrite
//! only allocates along the path from the root to whatever changed and
//! every untouched subtree is shared with the input. Every node carries a
//! [`NodeId`]; rebuilding a node with new children keeps its id, while
//! [`Block::deep_clone`] hands out fresh ones.
//!
//! Whitespace and comments live in `prefix` fields: the text that precedes
//! a node. Printing a tree concatenates prefixes and token text, so an
//! unchanged tree prints back to exactly the text it was parsed from.

use crate::parse::{Parse, SyntaxNode};
use crate::scalar::Scalar;
use crate::visitor::{PropertyCollector, YamlAccept};
use crate::ParseError;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a node in a document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate a new, never before seen identifier.
    pub fn fresh() -> Self {
        NodeId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A key-value pair of a block mapping.
#[derive(Debug, Clone)]
pub struct Entry {
    id: NodeId,
    prefix: String,
    key: Arc<Scalar>,
    before_colon: String,
    value: Block,
}

impl Entry {
    /// Create an entry with no surrounding whitespace.
    pub fn new(key: Scalar, value: Block) -> Self {
        Self {
            id: NodeId::fresh(),
            prefix: String::new(),
            key: Arc::new(key),
            before_colon: String::new(),
            value,
        }
    }

    /// Identity of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Line break, indentation and comments before the key.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The key scalar.
    pub fn key(&self) -> &Arc<Scalar> {
        &self.key
    }

    /// Whitespace between the key and the `:` indicator.
    pub fn before_colon(&self) -> &str {
        &self.before_colon
    }

    /// The value block.
    pub fn value(&self) -> &Block {
        &self.value
    }

    /// The same entry with a different prefix.
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..self.clone()
        }
    }

    /// The same entry with different spacing before the colon.
    pub fn with_before_colon(&self, before_colon: impl Into<String>) -> Self {
        Self {
            before_colon: before_colon.into(),
            ..self.clone()
        }
    }

    /// The same entry with a different key.
    pub fn with_key(&self, key: Arc<Scalar>) -> Self {
        Self {
            key,
            ..self.clone()
        }
    }

    /// The same entry with a different value.
    pub fn with_value(&self, value: Block) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }

    pub(crate) fn deep_clone(&self) -> Self {
        Self {
            id: NodeId::fresh(),
            prefix: self.prefix.clone(),
            key: Arc::new(self.key.deep_clone()),
            before_colon: self.before_colon.clone(),
            value: self.value.deep_clone(),
        }
    }

    /// Compare structure and text, ignoring identity.
    pub fn content_eq(&self, other: &Entry) -> bool {
        self.prefix == other.prefix
            && self.before_colon == other.before_colon
            && self.key.content_eq(&other.key)
            && self.value.content_eq(&other.value)
    }
}

impl AsRef<Entry> for Entry {
    fn as_ref(&self) -> &Entry {
        self
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}:{}", self.prefix, self.key, self.before_colon, self.value)
    }
}

/// A block mapping.
///
/// The first entry's own prefix is empty in parsed documents: the trivia
/// before it belongs to the mapping.
#[derive(Debug, Clone)]
pub struct Mapping {
    id: NodeId,
    prefix: String,
    indent: usize,
    entries: Vec<Arc<Entry>>,
}

impl Mapping {
    /// Create a mapping whose keys sit at column `indent`.
    pub fn new(prefix: impl Into<String>, indent: usize, entries: Vec<Arc<Entry>>) -> Self {
        Self {
            id: NodeId::fresh(),
            prefix: prefix.into(),
            indent,
            entries,
        }
    }

    /// Identity of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Whitespace and comments before the first entry.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Column of the keys of this mapping.
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// The entries, in document order.
    pub fn entries(&self) -> &[Arc<Entry>] {
        &self.entries
    }

    /// Whether the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by its plain key value.
    pub fn get(&self, key: &str) -> Option<&Arc<Entry>> {
        self.entries.iter().find(|entry| entry.key().value() == key)
    }

    /// Whether one of the entries has the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.entries.iter().any(|entry| entry.id() == id)
    }

    /// The same mapping with a different prefix.
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..self.clone()
        }
    }

    /// The same mapping with a different list of entries.
    pub fn with_entries(&self, entries: Vec<Arc<Entry>>) -> Self {
        Self {
            id: self.id,
            prefix: self.prefix.clone(),
            indent: self.indent,
            entries,
        }
    }

    pub(crate) fn deep_clone(&self) -> Self {
        Self {
            id: NodeId::fresh(),
            prefix: self.prefix.clone(),
            indent: self.indent,
            entries: self
                .entries
                .iter()
                .map(|entry| Arc::new(entry.deep_clone()))
                .collect(),
        }
    }

    /// Compare structure and text, ignoring identity.
    pub fn content_eq(&self, other: &Mapping) -> bool {
        self.prefix == other.prefix
            && self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.content_eq(b))
    }
}

impl fmt::Display for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix)?;
        for entry in &self.entries {
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

/// An item of a block sequence.
#[derive(Debug, Clone)]
pub struct SequenceEntry {
    id: NodeId,
    prefix: String,
    value: Block,
}

impl SequenceEntry {
    /// Create a sequence item.
    pub fn new(value: Block) -> Self {
        Self {
            id: NodeId::fresh(),
            prefix: String::new(),
            value,
        }
    }

    /// Identity of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Whitespace and comments before the `-` indicator.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The item value.
    pub fn value(&self) -> &Block {
        &self.value
    }

    /// The same item with a different prefix.
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..self.clone()
        }
    }

    /// The same item with a different value.
    pub fn with_value(&self, value: Block) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }

    pub(crate) fn deep_clone(&self) -> Self {
        Self {
            id: NodeId::fresh(),
            prefix: self.prefix.clone(),
            value: self.value.deep_clone(),
        }
    }

    fn content_eq(&self, other: &SequenceEntry) -> bool {
        self.prefix == other.prefix && self.value.content_eq(&other.value)
    }
}

impl fmt::Display for SequenceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prefix, self.value)
    }
}

/// A block sequence.
#[derive(Debug, Clone)]
pub struct Sequence {
    id: NodeId,
    prefix: String,
    entries: Vec<Arc<SequenceEntry>>,
}

impl Sequence {
    /// Create a sequence from its items.
    pub fn new(prefix: impl Into<String>, entries: Vec<Arc<SequenceEntry>>) -> Self {
        Self {
            id: NodeId::fresh(),
            prefix: prefix.into(),
            entries,
        }
    }

    /// Identity of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Whitespace and comments before the first item.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The items, in document order.
    pub fn entries(&self) -> &[Arc<SequenceEntry>] {
        &self.entries
    }

    /// The same sequence with a different list of items.
    pub fn with_entries(&self, entries: Vec<Arc<SequenceEntry>>) -> Self {
        Self {
            id: self.id,
            prefix: self.prefix.clone(),
            entries,
        }
    }

    pub(crate) fn deep_clone(&self) -> Self {
        Self {
            id: NodeId::fresh(),
            prefix: self.prefix.clone(),
            entries: self
                .entries
                .iter()
                .map(|entry| Arc::new(entry.deep_clone()))
                .collect(),
        }
    }

    fn content_eq(&self, other: &Sequence) -> bool {
        self.prefix == other.prefix
            && self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.content_eq(b))
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix)?;
        for entry in &self.entries {
            write!(f, "{}", entry)?;
        }
        Ok(())
    }
}

/// Any block node: the value of an entry, an item or a document root.
#[derive(Debug, Clone)]
pub enum Block {
    /// A scalar value
    Scalar(Arc<Scalar>),
    /// A nested mapping
    Mapping(Arc<Mapping>),
    /// A nested sequence
    Sequence(Arc<Sequence>),
}

impl Block {
    /// An empty plain scalar, as produced by `key:` with nothing after it.
    pub fn empty() -> Self {
        Block::Scalar(Arc::new(Scalar::plain("")))
    }

    /// Identity of the wrapped node.
    pub fn id(&self) -> NodeId {
        match self {
            Block::Scalar(scalar) => scalar.id(),
            Block::Mapping(mapping) => mapping.id(),
            Block::Sequence(sequence) => sequence.id(),
        }
    }

    /// Whitespace and comments before the wrapped node.
    pub fn prefix(&self) -> &str {
        match self {
            Block::Scalar(scalar) => scalar.prefix(),
            Block::Mapping(mapping) => mapping.prefix(),
            Block::Sequence(sequence) => sequence.prefix(),
        }
    }

    /// The mapping, if this block is one.
    pub fn as_mapping(&self) -> Option<&Arc<Mapping>> {
        match self {
            Block::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// The scalar, if this block is one.
    pub fn as_scalar(&self) -> Option<&Arc<Scalar>> {
        match self {
            Block::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// The sequence, if this block is one.
    pub fn as_sequence(&self) -> Option<&Arc<Sequence>> {
        match self {
            Block::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    /// Whether this block is a mapping without entries.
    pub fn is_empty_mapping(&self) -> bool {
        matches!(self, Block::Mapping(mapping) if mapping.is_empty())
    }

    /// Whether both blocks wrap the very same allocation.
    pub fn ptr_eq(&self, other: &Block) -> bool {
        match (self, other) {
            (Block::Scalar(a), Block::Scalar(b)) => Arc::ptr_eq(a, b),
            (Block::Mapping(a), Block::Mapping(b)) => Arc::ptr_eq(a, b),
            (Block::Sequence(a), Block::Sequence(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// A structurally identical copy in which every node has a fresh id.
    pub fn deep_clone(&self) -> Block {
        match self {
            Block::Scalar(scalar) => Block::Scalar(Arc::new(scalar.deep_clone())),
            Block::Mapping(mapping) => Block::Mapping(Arc::new(mapping.deep_clone())),
            Block::Sequence(sequence) => Block::Sequence(Arc::new(sequence.deep_clone())),
        }
    }

    /// Compare structure and text, ignoring identity.
    pub fn content_eq(&self, other: &Block) -> bool {
        match (self, other) {
            (Block::Scalar(a), Block::Scalar(b)) => a.content_eq(b),
            (Block::Mapping(a), Block::Mapping(b)) => a.content_eq(b),
            (Block::Sequence(a), Block::Sequence(b)) => a.content_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Scalar(scalar) => write!(f, "{}", scalar),
            Block::Mapping(mapping) => write!(f, "{}", mapping),
            Block::Sequence(sequence) => write!(f, "{}", sequence),
        }
    }
}

impl From<Scalar> for Block {
    fn from(scalar: Scalar) -> Self {
        Block::Scalar(Arc::new(scalar))
    }
}

impl From<Mapping> for Block {
    fn from(mapping: Mapping) -> Self {
        Block::Mapping(Arc::new(mapping))
    }
}

impl From<Sequence> for Block {
    fn from(sequence: Sequence) -> Self {
        Block::Sequence(Arc::new(sequence))
    }
}

/// A single YAML document.
#[derive(Debug, Clone)]
pub struct Document {
    id: NodeId,
    prefix: String,
    explicit: bool,
    block: Block,
    end: String,
    end_marker: bool,
}

impl Document {
    /// Create an implicit document (no `---` marker) around a root block.
    pub fn new(block: Block) -> Self {
        Self {
            id: NodeId::fresh(),
            prefix: String::new(),
            explicit: false,
            block,
            end: String::new(),
            end_marker: false,
        }
    }

    pub(crate) fn from_parts(
        prefix: String,
        explicit: bool,
        block: Block,
        end: String,
        end_marker: bool,
    ) -> Self {
        Self {
            id: NodeId::fresh(),
            prefix,
            explicit,
            block,
            end,
            end_marker,
        }
    }

    /// Identity of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Comments, blank lines and directives before the document.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether the document is introduced by an explicit `---` marker.
    pub fn is_explicit(&self) -> bool {
        self.explicit
    }

    /// The root block.
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// Trailing whitespace and comments after the root block.
    pub fn end(&self) -> &str {
        &self.end
    }

    /// Whether the document is closed by a `...` marker.
    pub fn has_end_marker(&self) -> bool {
        self.end_marker
    }

    /// The root mapping, if the root block is a mapping.
    pub fn as_mapping(&self) -> Option<&Arc<Mapping>> {
        self.block.as_mapping()
    }

    /// The same document with a different root block.
    pub fn with_block(&self, block: Block) -> Self {
        Self {
            block,
            ..self.clone()
        }
    }

    /// The same document with different trailing trivia.
    pub fn with_end(&self, end: impl Into<String>) -> Self {
        Self {
            end: end.into(),
            ..self.clone()
        }
    }

    /// The same document, marked explicit or not.
    pub fn with_explicit(&self, explicit: bool) -> Self {
        Self {
            explicit,
            ..self.clone()
        }
    }

    /// Every leaf property of the document as a dotted name, in document order.
    pub fn properties(&self) -> Vec<String> {
        let mut collector = PropertyCollector::default();
        self.accept(&mut collector);
        collector.into_properties()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix)?;
        if self.explicit {
            f.write_str("---")?;
        }
        write!(f, "{}{}", self.block, self.end)?;
        if self.end_marker {
            f.write_str("...")?;
        }
        Ok(())
    }
}

/// A YAML stream: zero or more documents.
#[derive(Debug, Clone, Default)]
pub struct Yaml {
    documents: Vec<Document>,
    suffix: String,
}

impl Yaml {
    /// Create a stream from documents.
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            suffix: String::new(),
        }
    }

    pub(crate) fn from_parts(documents: Vec<Document>, suffix: String) -> Self {
        Self { documents, suffix }
    }

    /// Parse YAML text, keeping the syntax errors alongside the tree.
    pub fn parse(text: &str) -> Parse<Yaml> {
        Parse::parse_yaml(text)
    }

    /// The documents of the stream.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// The first document, if any.
    pub fn document(&self) -> Option<&Document> {
        self.documents.first()
    }

    /// Trailing trivia after the last document.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// The same stream with different documents.
    pub fn with_documents(&self, documents: Vec<Document>) -> Self {
        Self {
            documents,
            suffix: self.suffix.clone(),
        }
    }
}

impl fmt::Display for Yaml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for document in &self.documents {
            write!(f, "{}", document)?;
        }
        f.write_str(&self.suffix)
    }
}

impl FromStr for Yaml {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Yaml::parse(s).to_result()
    }
}

impl From<SyntaxNode> for Yaml {
    fn from(node: SyntaxNode) -> Self {
        crate::lower::lower(&node)
    }
}
