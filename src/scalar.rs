//! Scalar nodes with style support and escaping.

use crate::yaml::NodeId;
use std::fmt;

/// Style of scalar representation in YAML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarStyle {
    /// Plain scalar (no quotes)
    Plain,
    /// Single-quoted scalar
    SingleQuoted,
    /// Double-quoted scalar
    DoubleQuoted,
    /// Literal scalar (|)
    Literal,
    /// Folded scalar (>)
    Folded,
}

/// A scalar node: a mapping key or a leaf value.
///
/// The value is stored exactly as written. For quoted styles that is the
/// text between the quotes, escapes included; for block styles it is
/// everything after the `|` or `>` indicator. Use [`Scalar::text`] for the
/// decoded content.
#[derive(Debug, Clone)]
pub struct Scalar {
    id: NodeId,
    prefix: String,
    style: ScalarStyle,
    value: String,
}

impl Scalar {
    /// Create a scalar with a raw value in the given style.
    pub fn new(style: ScalarStyle, value: impl Into<String>) -> Self {
        Self {
            id: NodeId::fresh(),
            prefix: String::new(),
            style,
            value: value.into(),
        }
    }

    /// Create a plain scalar
    pub fn plain(value: impl Into<String>) -> Self {
        Self::new(ScalarStyle::Plain, value)
    }

    /// Create a scalar holding `text`, quoting and escaping it when a plain
    /// scalar would be read back differently.
    pub fn from_text(text: &str) -> Self {
        match detect_style(text) {
            ScalarStyle::SingleQuoted => {
                Self::new(ScalarStyle::SingleQuoted, text.replace('\'', "''"))
            }
            ScalarStyle::DoubleQuoted => Self::new(ScalarStyle::DoubleQuoted, escape_double_quoted(text)),
            style => Self::new(style, text),
        }
    }

    /// Identity of this node.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Whitespace and comments before the scalar.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Get the style
    pub fn style(&self) -> ScalarStyle {
        self.style
    }

    /// Get the raw value, as written between the delimiters.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The decoded content of the scalar.
    pub fn text(&self) -> String {
        match self.style {
            ScalarStyle::Plain => self.value.clone(),
            ScalarStyle::SingleQuoted => self.value.replace("''", "'"),
            ScalarStyle::DoubleQuoted => unescape_double_quoted(&self.value),
            ScalarStyle::Literal | ScalarStyle::Folded => block_content(&self.value),
        }
    }

    /// The same node with a different prefix.
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..self.clone()
        }
    }

    /// The same node with a different raw value.
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..self.clone()
        }
    }

    pub(crate) fn with_id(&self, id: NodeId) -> Self {
        Self { id, ..self.clone() }
    }

    pub(crate) fn deep_clone(&self) -> Self {
        self.with_id(NodeId::fresh())
    }

    /// Compare style, prefix and value, ignoring identity.
    pub fn content_eq(&self, other: &Scalar) -> bool {
        self.style == other.style && self.prefix == other.prefix && self.value == other.value
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix)?;
        match self.style {
            ScalarStyle::Plain => f.write_str(&self.value),
            ScalarStyle::SingleQuoted => write!(f, "'{}'", self.value),
            ScalarStyle::DoubleQuoted => write!(f, "\"{}\"", self.value),
            ScalarStyle::Literal => write!(f, "|{}", self.value),
            ScalarStyle::Folded => write!(f, ">{}", self.value),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::from_text(value)
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::from_text(&value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::plain(value.to_string())
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::plain(value.to_string())
    }
}

/// Detect the appropriate style for a value
fn detect_style(value: &str) -> ScalarStyle {
    if value.contains('\n') || value.contains('\t') {
        ScalarStyle::DoubleQuoted
    } else if needs_quoting(value) {
        // Prefer single quotes if no single quotes in value
        if !value.contains('\'') {
            ScalarStyle::SingleQuoted
        } else {
            ScalarStyle::DoubleQuoted
        }
    } else {
        ScalarStyle::Plain
    }
}

/// Check if a value needs quoting when treated as a string
fn needs_quoting(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }

    // YAML keywords that would be misinterpreted
    let lowercase = value.to_lowercase();
    if matches!(
        lowercase.as_str(),
        "true" | "false" | "yes" | "no" | "on" | "off" | "null" | "~"
    ) {
        return true;
    }

    // Quote things that look like numbers to preserve them as strings
    if value.parse::<f64>().is_ok() || value.parse::<i64>().is_ok() {
        return true;
    }

    !is_plain_safe(value)
}

/// Whether `value` reads back as the same text when written as a plain
/// scalar. Typing (numbers, booleans) is not considered.
pub(crate) fn is_plain_safe(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    if matches!(first, '-' | '?' | '[' | ']' | '{' | '}' | ',') {
        return false;
    }
    if value.chars().any(|ch| {
        matches!(
            ch,
            ':' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@' | '`' | '\n' | '\r' | '\t'
        )
    }) {
        return false;
    }

    // Leading/trailing whitespace would be lost
    value == value.trim()
}

fn escape_double_quoted(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\x08' => result.push_str("\\b"),
            '\x0C' => result.push_str("\\f"),
            c if c.is_control() => result.push_str(&format!("\\x{:02x}", c as u32)),
            c => result.push(c),
        }
    }
    result
}

/// Unescape a double-quoted string
fn unescape_double_quoted(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            result.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('t') => result.push('\t'),
            Some('\\') => result.push('\\'),
            Some('"') => result.push('"'),
            Some('/') => result.push('/'),
            Some('b') => result.push('\u{0008}'),
            Some('f') => result.push('\u{000C}'),
            Some('0') => result.push('\0'),
            Some(' ') => result.push(' '),
            Some('x') => push_code_point(&mut result, &mut chars, 2, 'x'),
            Some('u') => push_code_point(&mut result, &mut chars, 4, 'u'),
            Some('U') => push_code_point(&mut result, &mut chars, 8, 'U'),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}

fn push_code_point(result: &mut String, chars: &mut std::str::Chars<'_>, digits: usize, marker: char) {
    let hex: String = chars.by_ref().take(digits).collect();
    match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
        Some(ch) => result.push(ch),
        None => {
            result.push('\\');
            result.push(marker);
            result.push_str(&hex);
        }
    }
}

/// Content lines of a block scalar with their common indentation removed.
fn block_content(raw: &str) -> String {
    let body = match raw.find('\n') {
        Some(i) => &raw[i + 1..],
        None => return String::new(),
    };
    let indent = body
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);
    let mut result = String::new();
    for line in body.lines() {
        result.push_str(line.get(indent..).unwrap_or(""));
        result.push('\n');
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_detection() {
        assert_eq!(Scalar::from_text("hello").style(), ScalarStyle::Plain);
        assert_eq!(Scalar::from_text("true").style(), ScalarStyle::SingleQuoted);
        assert_eq!(Scalar::from_text("123").style(), ScalarStyle::SingleQuoted);
        assert_eq!(Scalar::from_text("").style(), ScalarStyle::SingleQuoted);
        assert_eq!(Scalar::from_text("it's: x").style(), ScalarStyle::DoubleQuoted);
        assert_eq!(Scalar::from_text("a\nb").style(), ScalarStyle::DoubleQuoted);
    }

    #[test]
    fn test_render() {
        assert_eq!(Scalar::from_text("hello").to_string(), "hello");
        assert_eq!(Scalar::from_text("it's #1").to_string(), "\"it's #1\"");
        assert_eq!(Scalar::from_text("key: value").to_string(), "'key: value'");
        assert_eq!(Scalar::from_text("a\n\"b\"").to_string(), "\"a\\n\\\"b\\\"\"");
        assert_eq!(Scalar::plain("x").with_prefix(" ").to_string(), " x");
        assert_eq!(
            Scalar::new(ScalarStyle::Literal, "\n  one\n  two").to_string(),
            "|\n  one\n  two"
        );
    }

    #[test]
    fn test_text_decodes() {
        assert_eq!(Scalar::new(ScalarStyle::SingleQuoted, "it''s").text(), "it's");
        assert_eq!(
            Scalar::new(ScalarStyle::DoubleQuoted, "tab\\there\\u00e9\\x41").text(),
            "tab\there\u{e9}A"
        );
        assert_eq!(Scalar::new(ScalarStyle::DoubleQuoted, "bad\\q").text(), "bad\\q");
        assert_eq!(
            Scalar::new(ScalarStyle::Literal, "\n    one\n      two").text(),
            "one\n  two\n"
        );
    }

    #[test]
    fn test_text_roundtrips_through_from_text() {
        for text in ["plain", "with 'quote'", "true", "tab\tand\nnewline", "-dash", " padded "] {
            assert_eq!(Scalar::from_text(text).text(), text);
        }
    }

    #[test]
    fn test_plain_safety() {
        for text in ["url", "jdbc-url", "8080", "true", "two words", "a.b"] {
            assert!(is_plain_safe(text), "{:?}", text);
        }
        for text in ["", "x: y", "x #y", "- x", "[a]", "*ref", " x", "x ", "a\tb"] {
            assert!(!is_plain_safe(text), "{:?}", text);
        }
    }

    #[test]
    fn test_identity() {
        let scalar = Scalar::plain("a");
        assert_eq!(scalar.with_prefix(" ").id(), scalar.id());
        assert_eq!(scalar.with_value("b").id(), scalar.id());
        let copy = scalar.deep_clone();
        assert_ne!(copy.id(), scalar.id());
        assert!(copy.content_eq(&scalar));
        assert!(!scalar.content_eq(&scalar.with_prefix(" ")));
    }

    #[test]
    fn test_from_numbers() {
        assert_eq!(Scalar::from(42i64).to_string(), "42");
        assert_eq!(Scalar::from(true).style(), ScalarStyle::Plain);
    }
}
