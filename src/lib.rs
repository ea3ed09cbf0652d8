#![deny(missing_docs)]
#![allow(clippy::type_complexity)]
#![warn(clippy::unnecessary_to_owned)]
#![warn(clippy::redundant_clone)]
#![warn(clippy::inefficient_to_string)]
#![warn(clippy::manual_string_new)]
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

//! Renaming of dotted properties in YAML configuration files.
//!
//! Text is parsed losslessly with [rowan] and lowered into a persistent
//! document model. Edits rebuild only the nodes on the path to a change and
//! print everything else exactly as it was written.

mod builder;
mod coalesce;
mod delete;
mod error;
mod insert;
mod lex;
mod lower;
mod parse;
mod property;
mod rename;
mod scalar;
pub mod visitor;
mod yaml;

pub use builder::{MappingBuilder, SequenceBuilder, YamlBuilder};
pub use coalesce::{Coalesce, CoalesceProperties};
pub use error::{YamlError, YamlResult};
pub use lex::{lex, SyntaxKind};
pub use parse::{Lang, Parse, SyntaxNode};
pub use property::{property_path, PropertyName};
pub use rename::{
    rename_property, try_rename_property, DocumentTransform, RenameOptions, RenamePlan,
    RenameProperty,
};
pub use rowan::TextRange;
pub use scalar::{Scalar, ScalarStyle};
pub use yaml::{Block, Document, Entry, Mapping, NodeId, Sequence, SequenceEntry, Yaml};

/// A positioned parse error containing location information.
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
#[error("{message}")]
pub struct PositionedParseError {
    /// The error message
    pub message: String,
    /// The text range where the error occurred
    pub range: rowan::TextRange,
    /// Optional error code for categorization
    pub code: Option<String>,
}

/// List of encountered syntax errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, thiserror::Error)]
#[error("{}", .0.join("\n"))]
pub struct ParseError(pub Vec<String>);

/// Error reading YAML files
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A syntax error was encountered while parsing the file.
    #[error(transparent)]
    ParseError(#[from] ParseError),

    /// An I/O error was encountered while reading the file.
    #[error(transparent)]
    IoError(#[from] std::io::Error),
}
