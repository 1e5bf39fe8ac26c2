//! CloudScript DSL - front end for the microservice description language
//!
//! This crate turns CloudScript source text into a validated syntax tree that
//! artifact generators (container builds, orchestration manifests, API docs)
//! consume without re-validating.
//!
//! Architecture:
//! ```text
//! Source text (.cs files)
//!     ↓
//! Lexer (+ reserved-word table)
//!     ↓
//! Token sequence
//!     ↓
//! Parser (+ ParserConfig policies)
//!     ↓
//! Program (services → endpoints, connections, configuration, events)
//!     ↓
//! Pretty printer (for round-trip testing and tracing)
//! ```
//!
//! ```
//! let program = cloudscript_dsl::parse("service Users { port: 8080 }")?;
//! assert_eq!(program.services[0].port(), Some(8080));
//! # Ok::<(), cloudscript_dsl::ParseError>(())
//! ```

pub mod config;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod pretty_printer;

// Re-export key types for convenience
pub use config::{BlockPolicies, DatabaseValuePolicy, ParserConfig, UnknownMemberPolicy};
pub use error::*;
pub use lexer::*;
pub use parser::*;
pub use pretty_printer::{outline, pretty_print, round_trip};
