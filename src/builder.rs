//! Builder pattern for constructing YAML documents fluently.
//!
//! The builder emits a syntax tree with two-space indentation, which is then
//! lowered into the document model exactly like parsed text.

use crate::lex::SyntaxKind;
use crate::parse::SyntaxNode;
use crate::scalar::{Scalar, ScalarStyle};
use crate::yaml::Yaml;
use rowan::GreenNodeBuilder;

const INDENT: usize = 2;

/// A builder for constructing YAML documents with a fluent API.
pub struct YamlBuilder {
    root: BuilderNode,
}

/// Internal representation of nodes being built.
#[derive(Debug, Clone)]
enum BuilderNode {
    Scalar(String),
    Sequence(Vec<BuilderNode>),
    Mapping(Vec<(String, BuilderNode)>),
}

impl YamlBuilder {
    /// Create a builder for a document holding an empty mapping.
    pub fn new() -> Self {
        YamlBuilder {
            root: BuilderNode::Mapping(Vec::new()),
        }
    }

    /// Start building from a scalar value.
    pub fn scalar(value: impl Into<String>) -> Self {
        YamlBuilder {
            root: BuilderNode::Scalar(value.into()),
        }
    }

    /// Start building from a sequence.
    pub fn sequence() -> SequenceBuilder {
        SequenceBuilder { items: Vec::new() }
    }

    /// Start building from a mapping.
    pub fn mapping() -> MappingBuilder {
        MappingBuilder { pairs: Vec::new() }
    }

    /// Build the final YAML stream, holding one document.
    pub fn build(self) -> Yaml {
        let mut builder = GreenNodeBuilder::new();
        builder.start_node(SyntaxKind::ROOT.into());
        builder.start_node(SyntaxKind::DOCUMENT.into());
        build_block(&mut builder, &self.root, 0);
        builder.token(SyntaxKind::NEWLINE.into(), "\n");
        builder.finish_node();
        builder.finish_node();
        Yaml::from(SyntaxNode::new_root(builder.finish()))
    }
}

impl Default for YamlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Emit a block node whose first token sits at `column`.
fn build_block(builder: &mut GreenNodeBuilder, node: &BuilderNode, column: usize) {
    match node {
        BuilderNode::Scalar(value) => build_scalar(builder, value),
        BuilderNode::Mapping(pairs) => {
            builder.start_node(SyntaxKind::MAPPING.into());
            for (i, (key, value)) in pairs.iter().enumerate() {
                if i > 0 {
                    line_break(builder, column);
                }
                builder.start_node(SyntaxKind::MAPPING_ENTRY.into());
                builder.start_node(SyntaxKind::KEY.into());
                build_scalar(builder, key);
                builder.finish_node();
                builder.token(SyntaxKind::COLON.into(), ":");
                builder.start_node(SyntaxKind::VALUE.into());
                build_entry_value(builder, value, column);
                builder.finish_node();
                builder.finish_node();
            }
            builder.finish_node();
        }
        BuilderNode::Sequence(items) => {
            builder.start_node(SyntaxKind::SEQUENCE.into());
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    line_break(builder, column);
                }
                builder.start_node(SyntaxKind::SEQUENCE_ENTRY.into());
                builder.token(SyntaxKind::DASH.into(), "-");
                builder.start_node(SyntaxKind::VALUE.into());
                if !is_empty_collection(item) {
                    builder.token(SyntaxKind::WHITESPACE.into(), " ");
                }
                // Items start on the dash line.
                build_block(builder, item, column + INDENT);
                builder.finish_node();
                builder.finish_node();
            }
            builder.finish_node();
        }
    }
}

/// Emit the value of a mapping entry whose key sits at `column`.
fn build_entry_value(builder: &mut GreenNodeBuilder, node: &BuilderNode, column: usize) {
    match node {
        BuilderNode::Scalar(_) => builder.token(SyntaxKind::WHITESPACE.into(), " "),
        _ if is_empty_collection(node) => {}
        _ => line_break(builder, column + INDENT),
    }
    build_block(builder, node, column + INDENT);
}

fn build_scalar(builder: &mut GreenNodeBuilder, text: &str) {
    let scalar = Scalar::from_text(text);
    let kind = match scalar.style() {
        ScalarStyle::Plain => SyntaxKind::PLAIN,
        ScalarStyle::SingleQuoted => SyntaxKind::SINGLE_QUOTED,
        ScalarStyle::DoubleQuoted => SyntaxKind::DOUBLE_QUOTED,
        ScalarStyle::Literal | ScalarStyle::Folded => SyntaxKind::BLOCK_SCALAR,
    };
    builder.start_node(SyntaxKind::SCALAR.into());
    builder.token(kind.into(), &scalar.to_string());
    builder.finish_node();
}

fn line_break(builder: &mut GreenNodeBuilder, column: usize) {
    builder.token(SyntaxKind::NEWLINE.into(), "\n");
    if column > 0 {
        builder.token(SyntaxKind::INDENT.into(), &" ".repeat(column));
    }
}

fn is_empty_collection(node: &BuilderNode) -> bool {
    match node {
        BuilderNode::Mapping(pairs) => pairs.is_empty(),
        BuilderNode::Sequence(items) => items.is_empty(),
        BuilderNode::Scalar(_) => false,
    }
}

/// Builder for YAML sequences.
pub struct SequenceBuilder {
    items: Vec<BuilderNode>,
}

impl SequenceBuilder {
    /// Add a scalar value to the sequence.
    pub fn item(mut self, value: impl Into<String>) -> Self {
        self.items.push(BuilderNode::Scalar(value.into()));
        self
    }

    /// Add a nested sequence to this sequence.
    pub fn sequence<F>(mut self, f: F) -> Self
    where
        F: FnOnce(SequenceBuilder) -> SequenceBuilder,
    {
        let nested = f(SequenceBuilder { items: Vec::new() });
        self.items.push(BuilderNode::Sequence(nested.items));
        self
    }

    /// Add a nested mapping to this sequence.
    pub fn mapping<F>(mut self, f: F) -> Self
    where
        F: FnOnce(MappingBuilder) -> MappingBuilder,
    {
        let nested = f(MappingBuilder { pairs: Vec::new() });
        self.items.push(BuilderNode::Mapping(nested.pairs));
        self
    }

    /// Build the sequence into a YamlBuilder.
    pub fn build(self) -> YamlBuilder {
        YamlBuilder {
            root: BuilderNode::Sequence(self.items),
        }
    }
}

/// Builder for YAML mappings.
pub struct MappingBuilder {
    pairs: Vec<(String, BuilderNode)>,
}

impl MappingBuilder {
    /// Add a key-value pair with a scalar value.
    pub fn pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.pairs
            .push((key.into(), BuilderNode::Scalar(value.into())));
        self
    }

    /// Add a key-value pair with a sequence value.
    pub fn sequence<F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(SequenceBuilder) -> SequenceBuilder,
    {
        let nested = f(SequenceBuilder { items: Vec::new() });
        self.pairs
            .push((key.into(), BuilderNode::Sequence(nested.items)));
        self
    }

    /// Add a key-value pair with a mapping value.
    ///
    /// A mapping left without pairs is kept as an empty mapping.
    pub fn mapping<F>(mut self, key: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(MappingBuilder) -> MappingBuilder,
    {
        let nested = f(MappingBuilder { pairs: Vec::new() });
        self.pairs
            .push((key.into(), BuilderNode::Mapping(nested.pairs)));
        self
    }

    /// Build the mapping into a YamlBuilder.
    pub fn build(self) -> YamlBuilder {
        YamlBuilder {
            root: BuilderNode::Mapping(self.pairs),
        }
    }
}
