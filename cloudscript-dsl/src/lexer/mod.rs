//! Lexer module for the CloudScript DSL

pub mod keywords;
pub mod scanner;
pub mod token;

pub use keywords::{classify, keyword, KEYWORDS};
pub use scanner::*;
pub use token::*;
