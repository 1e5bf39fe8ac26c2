//! Parser module for the CloudScript DSL

pub mod ast;
#[allow(clippy::module_inception)]
pub mod parser;

pub use ast::*;
pub use parser::*;
