//! Token types produced by the content lexer.

use bytes::Bytes;

use super::operator::Operator;

/// Byte range into one of a [`Program`]'s buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    pub const fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Content-stream token.
///
/// `String` and `Name` spans point into the program's decoded arena.
/// `InlineImageData` spans point into the untouched source buffer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Token {
    Operator(Operator),
    String(Span),
    Number(f64),
    Array(Vec<Token>),
    Name(Span),
    DictOpen,
    DictClose,
    Boolean(bool),
    InlineImageData(Span),
}

impl Token {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Token::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_operator(&self) -> Option<&Operator> {
        match self {
            Token::Operator(op) => Some(op),
            _ => None,
        }
    }
}

/// Result of tokenizing one content buffer.
///
/// Owns the shared source bytes and a fresh arena holding every decoded
/// string and name, so the source is never rewritten and tokenizing the
/// same bytes twice always yields the same tokens.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub(crate) source: Bytes,
    pub(crate) decoded: Vec<u8>,
    pub(crate) tokens: Vec<Token>,
}

impl Program {
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn source(&self) -> &Bytes {
        &self.source
    }

    /// Decoded bytes of a `String` or `Name` token.
    pub fn decoded(&self, span: Span) -> &[u8] {
        self.decoded.get(span.start..span.end()).unwrap_or(&[])
    }

    /// Raw bytes of an `InlineImageData` token.
    pub fn raw(&self, span: Span) -> &[u8] {
        self.source.get(span.start..span.end()).unwrap_or(&[])
    }

    /// Name token text. Names are not required to be UTF-8.
    pub fn name_str(&self, span: Span) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(self.decoded(span))
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}
