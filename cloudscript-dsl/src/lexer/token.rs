//! Lexer token types

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// TOKEN KINDS
// ============================================================================

/// Token kinds for the CloudScript DSL.
///
/// The set is closed: literal payloads live in [`Token::lexeme`], so a kind
/// can be compared, copied and reported in diagnostics on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Structural keywords
    Service,
    Endpoint,
    Connect,
    To,
    Via,
    Deploy,
    On,
    Database,
    Replicas,
    Port,
    Method,
    Response,
    Cache,
    RateLimit,
    Timeout,
    Auth,
    Fallback,

    // HTTP methods
    Get,
    Post,
    Put,
    Delete,
    Patch,

    // Protocols
    Http,
    Grpc,
    RabbitMq,
    Kafka,

    // Platforms
    Docker,
    Kubernetes,
    Aws,
    Azure,
    Gcp,

    // Auth levels
    Required,
    Optional,
    None,

    // Literals
    Identifier,
    Number,
    String,
    Path,
    Duration,

    // Delimiters
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Colon,
    Comma,
    LParen,
    RParen,

    // Special
    Eof,
}

/// Coarse category of a token kind, as assigned by the keyword table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenCategory {
    Keyword,
    HttpMethod,
    Protocol,
    Platform,
    AuthLevel,
    Literal,
    Delimiter,
    EndOfInput,
}

impl TokenKind {
    /// The category this kind belongs to.
    pub fn category(self) -> TokenCategory {
        match self {
            TokenKind::Service
            | TokenKind::Endpoint
            | TokenKind::Connect
            | TokenKind::To
            | TokenKind::Via
            | TokenKind::Deploy
            | TokenKind::On
            | TokenKind::Database
            | TokenKind::Replicas
            | TokenKind::Port
            | TokenKind::Method
            | TokenKind::Response
            | TokenKind::Cache
            | TokenKind::RateLimit
            | TokenKind::Timeout
            | TokenKind::Auth
            | TokenKind::Fallback => TokenCategory::Keyword,

            TokenKind::Get
            | TokenKind::Post
            | TokenKind::Put
            | TokenKind::Delete
            | TokenKind::Patch => TokenCategory::HttpMethod,

            TokenKind::Http | TokenKind::Grpc | TokenKind::RabbitMq | TokenKind::Kafka => {
                TokenCategory::Protocol
            }

            TokenKind::Docker
            | TokenKind::Kubernetes
            | TokenKind::Aws
            | TokenKind::Azure
            | TokenKind::Gcp => TokenCategory::Platform,

            TokenKind::Required | TokenKind::Optional | TokenKind::None => {
                TokenCategory::AuthLevel
            }

            TokenKind::Identifier
            | TokenKind::Number
            | TokenKind::String
            | TokenKind::Path
            | TokenKind::Duration => TokenCategory::Literal,

            TokenKind::LBrace
            | TokenKind::RBrace
            | TokenKind::LBracket
            | TokenKind::RBracket
            | TokenKind::Colon
            | TokenKind::Comma
            | TokenKind::LParen
            | TokenKind::RParen => TokenCategory::Delimiter,

            TokenKind::Eof => TokenCategory::EndOfInput,
        }
    }

    /// True for every kind produced from the reserved-word table.
    pub fn is_reserved(self) -> bool {
        matches!(
            self.category(),
            TokenCategory::Keyword
                | TokenCategory::HttpMethod
                | TokenCategory::Protocol
                | TokenCategory::Platform
                | TokenCategory::AuthLevel
        )
    }

    /// Human-readable name used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Service => "`service`",
            TokenKind::Endpoint => "`endpoint`",
            TokenKind::Connect => "`connect`",
            TokenKind::To => "`to`",
            TokenKind::Via => "`via`",
            TokenKind::Deploy => "`deploy`",
            TokenKind::On => "`on`",
            TokenKind::Database => "`database`",
            TokenKind::Replicas => "`replicas`",
            TokenKind::Port => "`port`",
            TokenKind::Method => "`method`",
            TokenKind::Response => "`response`",
            TokenKind::Cache => "`cache`",
            TokenKind::RateLimit => "`rateLimit`",
            TokenKind::Timeout => "`timeout`",
            TokenKind::Auth => "`auth`",
            TokenKind::Fallback => "`fallback`",
            TokenKind::Get => "`GET`",
            TokenKind::Post => "`POST`",
            TokenKind::Put => "`PUT`",
            TokenKind::Delete => "`DELETE`",
            TokenKind::Patch => "`PATCH`",
            TokenKind::Http => "`http`",
            TokenKind::Grpc => "`grpc`",
            TokenKind::RabbitMq => "`rabbitmq`",
            TokenKind::Kafka => "`kafka`",
            TokenKind::Docker => "`docker`",
            TokenKind::Kubernetes => "`kubernetes`",
            TokenKind::Aws => "`aws`",
            TokenKind::Azure => "`azure`",
            TokenKind::Gcp => "`gcp`",
            TokenKind::Required => "`required`",
            TokenKind::Optional => "`optional`",
            TokenKind::None => "`none`",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Path => "path",
            TokenKind::Duration => "duration",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::Colon => "`:`",
            TokenKind::Comma => "`,`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

// ============================================================================
// TOKENS
// ============================================================================

/// Source location span.
///
/// `line` and `column` are 1-based and point at the first character of the
/// token; `start`/`end` are byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Default for Span {
    fn default() -> Self {
        Self {
            start: 0,
            end: 0,
            line: 1,
            column: 1,
        }
    }
}

/// A token with its kind, literal text and source location.
///
/// For strings the lexeme is the unescaped contents without quotes; for
/// every other kind it is the exact source slice. `Eof` has an empty lexeme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            span,
        }
    }

    pub fn line(&self) -> usize {
        self.span.line
    }

    pub fn column(&self) -> usize {
        self.span.column
    }
}
