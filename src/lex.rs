//! Lexer for YAML block documents.

/// Lexical analysis: the variants are the node kinds built by the parser
/// followed by the kinds of "tokens" produced by [`lex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // Structural
    /// Root node of the syntax tree
    ROOT = 0,
    /// A YAML document
    DOCUMENT,
    /// A YAML block mapping
    MAPPING,
    /// A key-value pair inside a mapping
    MAPPING_ENTRY,
    /// The key of a mapping entry
    KEY,
    /// The value of a mapping or sequence entry
    VALUE,
    /// A YAML block sequence
    SEQUENCE,
    /// An item of a block sequence
    SEQUENCE_ENTRY,
    /// A YAML scalar value
    SCALAR,
    /// Parse error marker
    ERROR,

    // Indicators
    /// Sequence entry indicator '-'
    DASH,
    /// Mapping value indicator ':'
    COLON,
    /// Document start marker '---'
    DOC_START,
    /// Document end marker '...'
    DOC_END,
    /// A directive line such as `%YAML 1.2`
    DIRECTIVE,

    // Content
    /// Plain (unquoted) scalar text, possibly containing interior spaces
    PLAIN,
    /// Single-quoted scalar including its quotes
    SINGLE_QUOTED,
    /// Double-quoted scalar including its quotes
    DOUBLE_QUOTED,
    /// Literal or folded block scalar: header plus content lines
    BLOCK_SCALAR,
    /// Flow collection captured verbatim, brackets included
    FLOW,

    // Trivia
    /// Spaces or tabs inside a line
    WHITESPACE,
    /// Line break
    NEWLINE,
    /// Leading whitespace at the start of a line
    INDENT,
    /// Comment starting with '#'
    COMMENT,
}

impl SyntaxKind {
    /// Whether this token carries no structure (whitespace, line breaks, comments).
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE | SyntaxKind::INDENT | SyntaxKind::COMMENT
        )
    }

    /// Whether this token can start a scalar node.
    pub fn is_scalar_content(self) -> bool {
        matches!(
            self,
            SyntaxKind::PLAIN
                | SyntaxKind::SINGLE_QUOTED
                | SyntaxKind::DOUBLE_QUOTED
                | SyntaxKind::BLOCK_SCALAR
                | SyntaxKind::FLOW
        )
    }

    pub(crate) fn from_raw(raw: u16) -> Option<SyntaxKind> {
        if raw <= SyntaxKind::COMMENT as u16 {
            // SAFETY: SyntaxKind is repr(u16) with contiguous discriminants
            // starting at zero, and `raw` is within range.
            Some(unsafe { std::mem::transmute::<u16, SyntaxKind>(raw) })
        } else {
            None
        }
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

/// Tokenize YAML input.
///
/// The lexer never fails: concatenating the text of the returned tokens
/// always yields `input` again.
pub fn lex(input: &str) -> Vec<(SyntaxKind, &str)> {
    let mut lexer = Lexer {
        input,
        pos: 0,
        line_start: 0,
        content_column: None,
        dash_column: None,
        seen_colon: false,
        tokens: Vec::new(),
    };
    lexer.run();
    lexer.tokens
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line_start: usize,
    /// Column of the first content token on the current line.
    content_column: Option<usize>,
    /// Column of the last `-` indicator on the current line.
    dash_column: Option<usize>,
    seen_colon: bool,
    tokens: Vec<(SyntaxKind, &'a str)>,
}

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn column(&self) -> usize {
        self.pos - self.line_start
    }

    fn follows_whitespace(&self) -> bool {
        self.pos > 0 && matches!(self.input.as_bytes()[self.pos - 1], b' ' | b'\t')
    }

    fn push(&mut self, kind: SyntaxKind, len: usize) {
        let start = self.pos;
        let text = &self.input[start..start + len];
        if kind.is_scalar_content() && self.content_column.is_none() {
            self.content_column = Some(self.column());
        }
        self.tokens.push((kind, text));
        self.pos += len;
        if kind == SyntaxKind::NEWLINE {
            self.line_start = self.pos;
            self.content_column = None;
            self.dash_column = None;
            self.seen_colon = false;
        } else if let Some(i) = text.rfind('\n') {
            self.line_start = start + i + 1;
        }
    }

    fn run(&mut self) {
        use SyntaxKind::*;

        while let Some(ch) = self.rest().chars().next() {
            let rest = self.rest();
            let at_line_start = self.pos == self.line_start;
            match ch {
                '\n' => self.push(NEWLINE, 1),
                '\r' => self.push(NEWLINE, if rest.starts_with("\r\n") { 2 } else { 1 }),
                ' ' | '\t' => {
                    let len = rest
                        .find(|c: char| c != ' ' && c != '\t')
                        .unwrap_or(rest.len());
                    self.push(if at_line_start { INDENT } else { WHITESPACE }, len);
                }
                '#' if at_line_start || self.follows_whitespace() => {
                    self.push(COMMENT, line_len(rest))
                }
                '-' if at_line_start && rest.starts_with("---") && is_break_or_end(&rest[3..]) => {
                    self.push(DOC_START, 3)
                }
                '.' if at_line_start && rest.starts_with("...") && is_break_or_end(&rest[3..]) => {
                    self.push(DOC_END, 3)
                }
                '%' if at_line_start => self.push(DIRECTIVE, line_len(rest)),
                '-' if is_break_or_end(&rest[1..]) => {
                    self.dash_column = Some(self.column());
                    self.push(DASH, 1);
                }
                ':' if is_break_or_end(&rest[1..]) => {
                    self.seen_colon = true;
                    self.push(COLON, 1);
                }
                '"' => self.push(DOUBLE_QUOTED, double_quoted_len(rest)),
                '\'' => self.push(SINGLE_QUOTED, single_quoted_len(rest)),
                '|' | '>' => {
                    let len = self.block_scalar_len();
                    self.push(BLOCK_SCALAR, len);
                }
                '[' | '{' => self.push(FLOW, flow_len(rest)),
                _ => self.push(PLAIN, plain_len(rest)),
            }
        }
    }

    /// Length of a block scalar starting at the current position: the header
    /// line plus every following line indented deeper than the node that owns
    /// the scalar. Trailing blank lines are left to the trivia.
    fn block_scalar_len(&self) -> usize {
        let rest = self.rest();
        let parent = if self.seen_colon {
            self.content_column
        } else {
            self.dash_column
        };

        let mut end = line_len(rest);
        let mut line_end = end;
        loop {
            let after = &rest[line_end..];
            let newline = if after.starts_with("\r\n") {
                2
            } else if after.starts_with('\n') || after.starts_with('\r') {
                1
            } else {
                break;
            };
            let start = line_end + newline;
            let len = line_len(&rest[start..]);
            let text = &rest[start..start + len];
            if text.trim().is_empty() {
                line_end = start + len;
                continue;
            }
            let indent = text.len() - text.trim_start_matches(' ').len();
            let inside = match parent {
                Some(parent) => indent > parent,
                None => !(indent == 0 && (text.starts_with("---") || text.starts_with("..."))),
            };
            if !inside {
                break;
            }
            end = start + len;
            line_end = end;
        }
        end
    }
}

fn is_break_or_end(s: &str) -> bool {
    s.is_empty() || s.starts_with(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r'))
}

fn line_len(s: &str) -> usize {
    s.find(|c: char| c == '\n' || c == '\r').unwrap_or(s.len())
}

fn double_quoted_len(s: &str) -> usize {
    let mut escaped = false;
    for (i, c) in s.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => return i + 1,
            _ => {}
        }
    }
    s.len()
}

fn single_quoted_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut i = 1;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return i + 1;
        }
        i += 1;
    }
    s.len()
}

fn flow_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1;
                }
            }
            b'"' => {
                i += double_quoted_len(&s[i..]);
                continue;
            }
            b'\'' => {
                i += single_quoted_len(&s[i..]);
                continue;
            }
            b'#' if i > 0 && matches!(bytes[i - 1], b' ' | b'\t' | b'\n') => {
                i += line_len(&s[i..]);
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    s.len()
}

fn plain_len(s: &str) -> usize {
    let mut end = 0;
    let mut after_space = false;
    for (i, c) in s.char_indices() {
        match c {
            '\n' | '\r' => break,
            ':' if is_break_or_end(&s[i + 1..]) => break,
            '#' if after_space => break,
            ' ' | '\t' => {
                after_space = true;
                continue;
            }
            _ => {}
        }
        after_space = false;
        end = i + c.len_utf8();
    }
    end.max(s.chars().next().map_or(0, char::len_utf8))
}
