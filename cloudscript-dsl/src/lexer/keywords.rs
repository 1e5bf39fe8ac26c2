//! Reserved-word table

use super::token::TokenKind;

/// Every reserved spelling with the kind it maps to.
///
/// Lookup is case-sensitive: `GET` is a method, `get` is an identifier.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("service", TokenKind::Service),
    ("endpoint", TokenKind::Endpoint),
    ("connect", TokenKind::Connect),
    ("to", TokenKind::To),
    ("via", TokenKind::Via),
    ("deploy", TokenKind::Deploy),
    ("on", TokenKind::On),
    ("database", TokenKind::Database),
    ("replicas", TokenKind::Replicas),
    ("port", TokenKind::Port),
    ("method", TokenKind::Method),
    ("response", TokenKind::Response),
    ("cache", TokenKind::Cache),
    ("rateLimit", TokenKind::RateLimit),
    ("timeout", TokenKind::Timeout),
    ("auth", TokenKind::Auth),
    ("fallback", TokenKind::Fallback),
    // HTTP methods
    ("GET", TokenKind::Get),
    ("POST", TokenKind::Post),
    ("PUT", TokenKind::Put),
    ("DELETE", TokenKind::Delete),
    ("PATCH", TokenKind::Patch),
    // Protocols
    ("http", TokenKind::Http),
    ("grpc", TokenKind::Grpc),
    ("rabbitmq", TokenKind::RabbitMq),
    ("kafka", TokenKind::Kafka),
    // Platforms
    ("docker", TokenKind::Docker),
    ("kubernetes", TokenKind::Kubernetes),
    ("aws", TokenKind::Aws),
    ("azure", TokenKind::Azure),
    ("gcp", TokenKind::Gcp),
    // Auth levels
    ("required", TokenKind::Required),
    ("optional", TokenKind::Optional),
    ("none", TokenKind::None),
];

/// Classify an identifier spelling against the reserved-word table.
pub fn keyword(ident: &str) -> Option<TokenKind> {
    KEYWORDS
        .iter()
        .find(|(spelling, _)| *spelling == ident)
        .map(|(_, kind)| *kind)
}

/// Classify an identifier spelling, falling back to a plain identifier.
pub fn classify(ident: &str) -> TokenKind {
    keyword(ident).unwrap_or(TokenKind::Identifier)
}

/// The source spelling of a reserved kind, if it has one.
pub fn spelling(kind: TokenKind) -> Option<&'static str> {
    KEYWORDS
        .iter()
        .find(|(_, k)| *k == kind)
        .map(|(spelling, _)| *spelling)
}
