//! Conversion of the lossless syntax tree into the document model.
//!
//! Trivia tokens are collected until the next structural node starts and
//! then become that node's prefix. Whatever is still pending when a
//! document ends becomes its trailing text.

use crate::lex::SyntaxKind;
use crate::parse::SyntaxNode;
use crate::scalar::{Scalar, ScalarStyle};
use crate::yaml::{Block, Document, Entry, Mapping, Sequence, SequenceEntry, Yaml};
use rowan::NodeOrToken;
use std::sync::Arc;

pub(crate) fn lower(root: &SyntaxNode) -> Yaml {
    let mut lowering = Lowering {
        source: root.text().to_string(),
        pending: String::new(),
    };
    lowering.yaml(root)
}

struct Lowering {
    source: String,
    pending: String,
}

impl Lowering {
    fn take(&mut self) -> String {
        std::mem::take(&mut self.pending)
    }

    fn column(&self, node: &SyntaxNode) -> usize {
        let offset = u32::from(node.text_range().start()) as usize;
        let line_start = self.source[..offset].rfind('\n').map_or(0, |i| i + 1);
        offset - line_start
    }

    fn yaml(&mut self, root: &SyntaxNode) -> Yaml {
        let mut documents = Vec::new();
        for child in root.children_with_tokens() {
            match child {
                NodeOrToken::Node(node) if node.kind() == SyntaxKind::DOCUMENT => {
                    documents.push(self.document(&node));
                }
                NodeOrToken::Node(node) => self.pending.push_str(&node.text().to_string()),
                NodeOrToken::Token(token) => self.pending.push_str(token.text()),
            }
        }
        let suffix = self.take();
        Yaml::from_parts(documents, suffix)
    }

    fn document(&mut self, node: &SyntaxNode) -> Document {
        let mut prefix = None;
        let mut explicit = false;
        let mut block = None;
        let mut end = None;
        for child in node.children_with_tokens() {
            match child {
                NodeOrToken::Token(token) if token.kind() == SyntaxKind::DOC_START => {
                    prefix = Some(self.take());
                    explicit = true;
                }
                NodeOrToken::Token(token) if token.kind() == SyntaxKind::DOC_END => {
                    if prefix.is_none() {
                        prefix = Some(self.take());
                    }
                    end = Some(self.take());
                }
                NodeOrToken::Token(token) => self.pending.push_str(token.text()),
                NodeOrToken::Node(child) if block.is_none() && is_block(child.kind()) => {
                    if prefix.is_none() {
                        prefix = Some(self.take());
                    }
                    block = Some(self.block(&child));
                }
                NodeOrToken::Node(child) => self.pending.push_str(&child.text().to_string()),
            }
        }

        let prefix = prefix.unwrap_or_else(|| self.take());
        let block = block.unwrap_or_else(Block::empty);
        let end_marker = end.is_some();
        let end = end.unwrap_or_else(|| self.take());
        Document::from_parts(prefix, explicit, block, end, end_marker)
    }

    fn block(&mut self, node: &SyntaxNode) -> Block {
        match node.kind() {
            SyntaxKind::MAPPING => Block::Mapping(Arc::new(self.mapping(node))),
            SyntaxKind::SEQUENCE => Block::Sequence(Arc::new(self.sequence(node))),
            _ => Block::Scalar(Arc::new(self.scalar(node))),
        }
    }

    fn mapping(&mut self, node: &SyntaxNode) -> Mapping {
        let prefix = self.take();
        let indent = node
            .children()
            .find(|child| child.kind() == SyntaxKind::MAPPING_ENTRY)
            .map_or(0, |entry| self.column(&entry));
        let mut entries = Vec::new();
        for child in node.children_with_tokens() {
            match child {
                NodeOrToken::Node(child) if child.kind() == SyntaxKind::MAPPING_ENTRY => {
                    entries.push(Arc::new(self.entry(&child)));
                }
                NodeOrToken::Node(child) => self.pending.push_str(&child.text().to_string()),
                NodeOrToken::Token(token) => self.pending.push_str(token.text()),
            }
        }
        Mapping::new(prefix, indent, entries)
    }

    fn entry(&mut self, node: &SyntaxNode) -> Entry {
        let prefix = self.take();
        let mut key = None;
        let mut before_colon = String::new();
        let mut value = None;
        for child in node.children_with_tokens() {
            match child {
                NodeOrToken::Node(child) if child.kind() == SyntaxKind::KEY => {
                    key = child
                        .children()
                        .find(|n| n.kind() == SyntaxKind::SCALAR)
                        .map(|scalar| self.scalar(&scalar));
                }
                NodeOrToken::Node(child) if child.kind() == SyntaxKind::VALUE => {
                    value = self.value(&child);
                }
                NodeOrToken::Node(child) => self.pending.push_str(&child.text().to_string()),
                NodeOrToken::Token(token) if token.kind() == SyntaxKind::COLON => {
                    before_colon = self.take();
                }
                NodeOrToken::Token(token) => self.pending.push_str(token.text()),
            }
        }
        Entry::new(key.unwrap_or_else(|| Scalar::plain("")), value.unwrap_or_else(Block::empty))
            .with_prefix(prefix)
            .with_before_colon(before_colon)
    }

    fn sequence(&mut self, node: &SyntaxNode) -> Sequence {
        let prefix = self.take();
        let mut entries = Vec::new();
        for child in node.children_with_tokens() {
            match child {
                NodeOrToken::Node(child) if child.kind() == SyntaxKind::SEQUENCE_ENTRY => {
                    entries.push(Arc::new(self.sequence_entry(&child)));
                }
                NodeOrToken::Node(child) => self.pending.push_str(&child.text().to_string()),
                NodeOrToken::Token(token) => self.pending.push_str(token.text()),
            }
        }
        Sequence::new(prefix, entries)
    }

    fn sequence_entry(&mut self, node: &SyntaxNode) -> SequenceEntry {
        let mut prefix = None;
        let mut value = None;
        for child in node.children_with_tokens() {
            match child {
                NodeOrToken::Token(token) if token.kind() == SyntaxKind::DASH => {
                    prefix = Some(self.take());
                }
                NodeOrToken::Token(token) => self.pending.push_str(token.text()),
                NodeOrToken::Node(child) if child.kind() == SyntaxKind::VALUE => {
                    value = self.value(&child);
                }
                NodeOrToken::Node(child) => self.pending.push_str(&child.text().to_string()),
            }
        }
        let prefix = prefix.unwrap_or_default();
        SequenceEntry::new(value.unwrap_or_else(Block::empty)).with_prefix(prefix)
    }

    fn value(&mut self, node: &SyntaxNode) -> Option<Block> {
        let mut value = None;
        for child in node.children_with_tokens() {
            match child {
                NodeOrToken::Node(child) if value.is_none() && is_block(child.kind()) => {
                    value = Some(self.block(&child));
                }
                NodeOrToken::Node(child) => self.pending.push_str(&child.text().to_string()),
                NodeOrToken::Token(token) => self.pending.push_str(token.text()),
            }
        }
        value
    }

    fn scalar(&mut self, node: &SyntaxNode) -> Scalar {
        let prefix = self.take();
        let text = node.text().to_string();
        let first = node.first_token().map(|token| token.kind());
        let (style, value) = match first {
            Some(SyntaxKind::SINGLE_QUOTED) if is_closed(&text, '\'') => {
                (ScalarStyle::SingleQuoted, &text[1..text.len() - 1])
            }
            Some(SyntaxKind::DOUBLE_QUOTED) if is_closed(&text, '"') => {
                (ScalarStyle::DoubleQuoted, &text[1..text.len() - 1])
            }
            Some(SyntaxKind::BLOCK_SCALAR) if text.starts_with('|') => {
                (ScalarStyle::Literal, &text[1..])
            }
            Some(SyntaxKind::BLOCK_SCALAR) if text.starts_with('>') => {
                (ScalarStyle::Folded, &text[1..])
            }
            _ => (ScalarStyle::Plain, text.as_str()),
        };
        Scalar::new(style, value).with_prefix(prefix)
    }
}

fn is_block(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::MAPPING | SyntaxKind::SEQUENCE | SyntaxKind::SCALAR
    )
}

fn is_closed(text: &str, quote: char) -> bool {
    text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote)
}
