//! Error types for content-stream lexing and interpretation.

use thiserror::Error;

/// Primary error type for content-stream processing.
///
/// Lexical errors abort tokenizing of one buffer. Everything else is a
/// structural error that aborts the current content program; the
/// sub-program executor contains those at form and tile boundaries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    #[error("invalid token at position {pos}: {msg}")]
    Lexical { pos: usize, msg: &'static str },

    #[error("operator {op} expects {expected} operand(s), found {found}")]
    MissingOperands {
        op: String,
        expected: usize,
        found: usize,
    },

    #[error("operator {op}: expected {expected} operand")]
    OperandType { op: String, expected: &'static str },

    #[error("EX without matching BX")]
    UnbalancedCompatibility,

    #[error("graphics state stack underflow")]
    StackUnderflow,

    #[error("{kind} resource not found: {name}")]
    MissingResource { kind: &'static str, name: String },

    #[error("invalid inline image: {0}")]
    InvalidInlineImage(String),

    #[error("non-invertible transform {0:?}")]
    NonInvertibleTransform(crate::utils::Matrix),

    #[error("sub-program nesting exceeds {0} levels")]
    NestingTooDeep(usize),
}

impl ContentError {
    /// True for errors raised by the lexer.
    pub fn is_lexical(&self) -> bool {
        matches!(self, ContentError::Lexical { .. })
    }
}

/// Convenience Result type alias for ContentError.
pub type Result<T> = std::result::Result<T, ContentError>;
