//! Parser types and utilities.

use crate::lex::{lex, SyntaxKind};
use crate::PositionedParseError;
use rowan::{GreenNode, GreenNodeBuilder, TextRange, TextSize};

/// YAML language type for rowan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Lang {}

impl rowan::Language for Lang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        SyntaxKind::from_raw(raw.0).unwrap_or(SyntaxKind::ERROR)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// A node in the lossless syntax tree.
pub type SyntaxNode = rowan::SyntaxNode<Lang>;

/// The result of a parse operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse<T> {
    green_node: GreenNode,
    errors: Vec<String>,
    positioned_errors: Vec<PositionedParseError>,
    _ty: std::marker::PhantomData<fn() -> T>,
}

impl<T> Parse<T> {
    pub(crate) fn new_with_positioned_errors(
        green_node: GreenNode,
        errors: Vec<String>,
        positioned_errors: Vec<PositionedParseError>,
    ) -> Self {
        Parse {
            green_node,
            errors,
            positioned_errors,
            _ty: std::marker::PhantomData,
        }
    }

    /// The lossless syntax tree produced by the parser.
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green_node.clone())
    }

    /// The parse tree. If there were no parse errors, this is a valid tree.
    /// If there were parse errors, this tree might be only partially valid.
    pub fn tree(&self) -> T
    where
        T: From<SyntaxNode>,
    {
        T::from(self.syntax())
    }

    /// Parse errors, if any.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Positioned parse errors with location information.
    pub fn positioned_errors(&self) -> &[PositionedParseError] {
        &self.positioned_errors
    }

    /// Convert parse result to Result, failing if there are any errors.
    pub fn to_result(self) -> Result<T, crate::ParseError>
    where
        T: From<SyntaxNode>,
    {
        if !self.errors.is_empty() {
            Err(crate::ParseError(self.errors))
        } else {
            Ok(self.tree())
        }
    }

    /// Whether the parse had any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Parse<crate::Yaml> {
    /// Parse YAML text, returning a Parse result
    pub fn parse_yaml(text: &str) -> Self {
        let parsed = parse(text);
        Parse::new_with_positioned_errors(
            parsed.green_node,
            parsed.errors,
            parsed.positioned_errors,
        )
    }
}

pub(crate) struct ParsedYaml {
    pub green_node: GreenNode,
    pub errors: Vec<String>,
    pub positioned_errors: Vec<PositionedParseError>,
}

pub(crate) fn parse(text: &str) -> ParsedYaml {
    let mut parser = Parser::new(text);
    parser.parse_stream();
    ParsedYaml {
        green_node: parser.builder.finish(),
        errors: parser.errors,
        positioned_errors: parser.positioned_errors,
    }
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: SyntaxKind,
    text: &'a str,
    offset: usize,
    column: usize,
    line: usize,
    end_line: usize,
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    let mut line = 0;
    let mut line_start = 0;
    for (kind, text) in lex(text) {
        let breaks = if kind == SyntaxKind::NEWLINE {
            1
        } else {
            text.matches('\n').count()
        };
        tokens.push(Token {
            kind,
            text,
            offset,
            column: offset - line_start,
            line,
            end_line: if kind == SyntaxKind::NEWLINE { line } else { line + breaks },
        });
        if kind == SyntaxKind::NEWLINE {
            line_start = offset + text.len();
        } else if let Some(i) = text.rfind('\n') {
            line_start = offset + i + 1;
        }
        line += breaks;
        offset += text.len();
    }
    tokens
}

/// Indentation-driven recursive descent over the token stream.
///
/// Every token ends up in the green tree, so the tree always prints back to
/// the input. Trivia is attached to whichever node is open when it is
/// reached; the lowering pass reassigns it as prefixes.
struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    source_len: usize,
    /// Line on which the last significant token ended.
    last_line: usize,
    builder: GreenNodeBuilder<'static>,
    errors: Vec<String>,
    positioned_errors: Vec<PositionedParseError>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            tokens: tokenize(text),
            pos: 0,
            source_len: text.len(),
            last_line: 0,
            builder: GreenNodeBuilder::new(),
            errors: Vec::new(),
            positioned_errors: Vec::new(),
        }
    }

    fn current(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn current_kind(&self) -> Option<SyntaxKind> {
        self.current().map(|token| token.kind)
    }

    fn kind_at(&self, index: usize) -> Option<SyntaxKind> {
        self.tokens.get(index).map(|token| token.kind)
    }

    fn bump(&mut self) {
        if let Some(token) = self.current() {
            self.builder.token(token.kind.into(), token.text);
            if !token.kind.is_trivia() {
                self.last_line = token.end_line;
            }
            self.pos += 1;
        }
    }

    fn next_significant(&self) -> Option<usize> {
        (self.pos..self.tokens.len()).find(|&i| !self.tokens[i].kind.is_trivia())
    }

    fn eat_trivia(&mut self) {
        while matches!(self.current_kind(), Some(kind) if kind.is_trivia()) {
            self.bump();
        }
    }

    fn is_boundary(&self, index: usize) -> bool {
        matches!(
            self.kind_at(index),
            Some(SyntaxKind::DOC_START | SyntaxKind::DOC_END | SyntaxKind::DIRECTIVE)
        )
    }

    /// Whether the token at `index` is a scalar followed by `:`.
    fn is_key(&self, index: usize) -> bool {
        if !matches!(
            self.kind_at(index),
            Some(SyntaxKind::PLAIN | SyntaxKind::SINGLE_QUOTED | SyntaxKind::DOUBLE_QUOTED)
        ) {
            return false;
        }
        let mut next = index + 1;
        if self.kind_at(next) == Some(SyntaxKind::WHITESPACE) {
            next += 1;
        }
        self.kind_at(next) == Some(SyntaxKind::COLON)
    }

    /// Record an error at the current token and wrap the rest of the line in
    /// an ERROR node.
    fn error(&mut self, message: &str) {
        let start = self.current().map_or(self.source_len, |token| token.offset);
        if let Some(token) = self.current() {
            self.errors.push(format!(
                "{} at line {}, column {}",
                message,
                token.line + 1,
                token.column + 1
            ));
        } else {
            self.errors.push(format!("{} at end of input", message));
        }

        self.builder.start_node(SyntaxKind::ERROR.into());
        while let Some(token) = self.current() {
            if token.kind == SyntaxKind::NEWLINE {
                break;
            }
            self.bump();
        }
        self.builder.finish_node();

        let end = self.current().map_or(self.source_len, |token| token.offset);
        self.positioned_errors.push(PositionedParseError {
            message: message.to_string(),
            range: TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32)),
            code: Some("syntax".to_string()),
        });
    }

    fn parse_stream(&mut self) {
        self.builder.start_node(SyntaxKind::ROOT.into());
        while self.next_significant().is_some() {
            let before = self.pos;
            self.parse_document();
            if self.pos == before {
                self.eat_trivia();
                self.error("unexpected token");
            }
        }
        self.eat_trivia();
        self.builder.finish_node();
    }

    fn parse_document(&mut self) {
        self.builder.start_node(SyntaxKind::DOCUMENT.into());

        loop {
            match self.next_significant() {
                Some(i) if self.kind_at(i) == Some(SyntaxKind::DIRECTIVE) => {
                    self.eat_trivia();
                    self.bump();
                }
                _ => break,
            }
        }
        if let Some(i) = self.next_significant() {
            if self.kind_at(i) == Some(SyntaxKind::DOC_START) {
                self.eat_trivia();
                self.bump();
            }
        }

        if let Some(i) = self.next_significant() {
            if !self.is_boundary(i) {
                self.eat_trivia();
                self.parse_block_node(None);
            }
        }

        while let Some(i) = self.next_significant() {
            if self.is_boundary(i) {
                break;
            }
            self.eat_trivia();
            self.error("unexpected content after the document root");
        }

        match self.next_significant() {
            Some(i) if self.kind_at(i) == Some(SyntaxKind::DOC_END) => {
                self.eat_trivia();
                self.bump();
            }
            _ => self.eat_trivia(),
        }

        self.builder.finish_node();
    }

    fn parse_block_node(&mut self, parent: Option<usize>) {
        let Some(token) = self.current() else {
            return;
        };
        match token.kind {
            SyntaxKind::DASH => self.parse_sequence(token.column),
            _ if self.is_key(self.pos) => self.parse_mapping(token.column),
            kind if kind.is_scalar_content() => self.parse_scalar(parent),
            _ => self.error("expected a mapping, sequence or scalar"),
        }
    }

    fn parse_mapping(&mut self, indent: usize) {
        self.builder.start_node(SyntaxKind::MAPPING.into());
        self.parse_entry(indent);
        while let Some(i) = self.next_significant() {
            let token = self.tokens[i];
            if self.is_boundary(i) || token.column < indent {
                break;
            }
            self.eat_trivia();
            if token.column == indent && self.is_key(i) {
                self.parse_entry(indent);
            } else if token.column == indent {
                self.error("expected a mapping key");
            } else {
                self.error("unexpected indentation");
            }
        }
        self.builder.finish_node();
    }

    fn parse_entry(&mut self, indent: usize) {
        self.builder.start_node(SyntaxKind::MAPPING_ENTRY.into());

        self.builder.start_node(SyntaxKind::KEY.into());
        self.builder.start_node(SyntaxKind::SCALAR.into());
        self.bump();
        self.builder.finish_node();
        self.builder.finish_node();

        if self.current_kind() == Some(SyntaxKind::WHITESPACE) {
            self.bump();
        }
        if self.current_kind() == Some(SyntaxKind::COLON) {
            self.bump();
        }

        self.parse_value(indent, true);
        self.builder.finish_node();
    }

    fn parse_sequence(&mut self, indent: usize) {
        self.builder.start_node(SyntaxKind::SEQUENCE.into());
        self.parse_sequence_entry(indent);
        while let Some(i) = self.next_significant() {
            let token = self.tokens[i];
            if self.is_boundary(i) || token.column < indent {
                break;
            }
            if token.column == indent && token.kind == SyntaxKind::DASH {
                self.eat_trivia();
                self.parse_sequence_entry(indent);
            } else if token.column == indent {
                // A compact sequence under a mapping key ends at the next key.
                break;
            } else {
                self.eat_trivia();
                self.error("unexpected indentation");
            }
        }
        self.builder.finish_node();
    }

    fn parse_sequence_entry(&mut self, indent: usize) {
        self.builder.start_node(SyntaxKind::SEQUENCE_ENTRY.into());
        self.bump();
        self.parse_value(indent, false);
        self.builder.finish_node();
    }

    /// Parse the value following a `:` or `-` indicator owned by a node at
    /// column `indent`.
    fn parse_value(&mut self, indent: usize, in_mapping: bool) {
        let line = self.last_line;
        match self.next_significant() {
            Some(i) if self.tokens[i].line == line => {
                self.eat_trivia();
                self.builder.start_node(SyntaxKind::VALUE.into());
                if in_mapping && (self.kind_at(i) == Some(SyntaxKind::DASH) || self.is_key(i)) {
                    self.error("block collections cannot start on the same line as a key");
                } else {
                    self.parse_block_node(Some(indent));
                }
                self.builder.finish_node();
                self.finish_line();
            }
            Some(i) if !self.is_boundary(i) && self.opens_nested(i, indent, in_mapping) => {
                self.eat_trivia();
                self.builder.start_node(SyntaxKind::VALUE.into());
                self.parse_block_node(Some(indent));
                self.builder.finish_node();
            }
            _ => {
                self.builder.start_node(SyntaxKind::VALUE.into());
                self.builder.start_node(SyntaxKind::SCALAR.into());
                self.builder.finish_node();
                self.builder.finish_node();
            }
        }
    }

    fn opens_nested(&self, index: usize, indent: usize, in_mapping: bool) -> bool {
        let token = self.tokens[index];
        token.column > indent
            || (in_mapping && token.kind == SyntaxKind::DASH && token.column == indent)
    }

    fn finish_line(&mut self) {
        while let Some(i) = self.next_significant() {
            if self.tokens[i].line != self.last_line {
                break;
            }
            self.eat_trivia();
            self.error("unexpected content after value");
        }
    }

    fn parse_scalar(&mut self, parent: Option<usize>) {
        self.builder.start_node(SyntaxKind::SCALAR.into());
        let kind = self.current_kind();
        self.bump();
        if kind == Some(SyntaxKind::PLAIN) {
            // Plain scalars continue on more-indented lines.
            while let Some(i) = self.next_significant() {
                let token = self.tokens[i];
                let continues = token.kind == SyntaxKind::PLAIN
                    && token.line > self.last_line
                    && !self.is_key(i)
                    && parent.map_or(true, |parent| token.column > parent)
                    && !self.tokens[self.pos..i]
                        .iter()
                        .any(|t| t.kind == SyntaxKind::COMMENT);
                if !continues {
                    break;
                }
                while self.pos <= i {
                    self.bump();
                }
            }
        }
        self.builder.finish_node();
    }
}
