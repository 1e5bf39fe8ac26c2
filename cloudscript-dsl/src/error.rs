//! Error types for CloudScript compilation

use crate::lexer::TokenKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The kind of block a parser decision was made in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Program,
    Service,
    Endpoint,
    Event,
    Database,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockKind::Program => "program",
            BlockKind::Service => "service",
            BlockKind::Endpoint => "endpoint",
            BlockKind::Event => "event",
            BlockKind::Database => "database",
        };
        f.write_str(name)
    }
}

/// Fatal parse failure. A compile produces at most one.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseError {
    #[error("expected {expected}, found {found} at line {line}")]
    UnexpectedToken {
        expected: TokenKind,
        found: TokenKind,
        line: usize,
        column: usize,
    },

    #[error("invalid integer `{literal}` at line {line}")]
    InvalidInteger {
        literal: String,
        line: usize,
        column: usize,
    },

    #[error("unknown {block} member {found} at line {line}")]
    UnknownMember {
        block: BlockKind,
        found: TokenKind,
        line: usize,
        column: usize,
    },

    #[error("database setting `{key}` must be a string or number, found {found} at line {line}")]
    InvalidSettingValue {
        key: String,
        found: TokenKind,
        line: usize,
        column: usize,
    },
}

impl ParseError {
    pub fn line(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { line, .. }
            | ParseError::InvalidInteger { line, .. }
            | ParseError::UnknownMember { line, .. }
            | ParseError::InvalidSettingValue { line, .. } => *line,
        }
    }

    pub fn column(&self) -> usize {
        match self {
            ParseError::UnexpectedToken { column, .. }
            | ParseError::InvalidInteger { column, .. }
            | ParseError::UnknownMember { column, .. }
            | ParseError::InvalidSettingValue { column, .. } => *column,
        }
    }

    /// True when the parser ran out of tokens before the construct was complete.
    pub fn is_end_of_input(&self) -> bool {
        matches!(
            self,
            ParseError::UnexpectedToken {
                found: TokenKind::Eof,
                ..
            }
        )
    }
}

/// Parser configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid parser configuration: {reason}")]
    Malformed { reason: String },
}

pub type ParseResult<T> = Result<T, ParseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_token_message() {
        let err = ParseError::UnexpectedToken {
            expected: TokenKind::Identifier,
            found: TokenKind::LBrace,
            line: 3,
            column: 9,
        };

        assert_eq!(err.to_string(), "expected identifier, found `{` at line 3");
        assert_eq!(err.line(), 3);
        assert_eq!(err.column(), 9);
        assert!(!err.is_end_of_input());
    }

    #[test]
    fn test_end_of_input_message() {
        let err = ParseError::UnexpectedToken {
            expected: TokenKind::RBrace,
            found: TokenKind::Eof,
            line: 7,
            column: 1,
        };

        assert_eq!(err.to_string(), "expected `}`, found end of input at line 7");
        assert!(err.is_end_of_input());
    }

    #[test]
    fn test_unknown_member_message() {
        let err = ParseError::UnknownMember {
            block: BlockKind::Endpoint,
            found: TokenKind::Identifier,
            line: 2,
            column: 5,
        };

        assert_eq!(err.to_string(), "unknown endpoint member identifier at line 2");
    }

    #[test]
    fn test_error_serializes() -> Result<(), serde_json::Error> {
        let err = ParseError::InvalidInteger {
            literal: "80.5".to_string(),
            line: 1,
            column: 7,
        };
        let json = serde_json::to_string(&err)?;
        let back: ParseError = serde_json::from_str(&json)?;

        assert_eq!(err, back);
        Ok(())
    }
}
