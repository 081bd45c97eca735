//! Content-stream parsing.
//!
//! - `lexer`: byte-level tokenizer with a per-call decode arena
//! - `token`: token, span and program types
//! - `operator`: operator mnemonic table

pub mod lexer;
pub mod operator;
pub mod token;

// Re-export main types for convenience
pub use lexer::{Lexer, LexerOptions, tokenize};
pub use operator::Operator;
pub use token::{Program, Span, Token};
