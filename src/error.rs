//! Error types for yaml-property-edit

use crate::ParseError;
use thiserror::Error;

/// Errors that can occur when working with YAML documents
#[derive(Debug, Error)]
pub enum YamlError {
    /// Parse error when parsing YAML
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    /// A dotted property name that cannot address any entry
    #[error("Invalid property name '{name}': {reason}")]
    InvalidProperty {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },
}

/// Result type for yaml-property-edit operations
pub type YamlResult<T> = Result<T, YamlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = YamlError::InvalidProperty {
            name: "a..b".to_string(),
            reason: "empty segment".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid property name 'a..b': empty segment");

        let err = YamlError::from(ParseError(vec!["bad indent".to_string()]));
        assert_eq!(err.to_string(), "Parse error: bad indent");
    }
}
