//! Content-stream tokenizer.
//!
//! Scans a byte buffer left to right exactly once. Literal strings, hex
//! strings and names are decoded into a per-call arena owned by the
//! resulting [`Program`]; the source buffer itself is never rewritten.

use bytes::Bytes;

use super::operator::Operator;
use super::token::{Program, Span, Token};
use crate::error::{ContentError, Result};

/// Lexer switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LexerOptions {
    /// Require the byte after an inline image's `EI` terminator to be
    /// whitespace (or end of buffer) before accepting it.
    ///
    /// Off by default. Inline image data has no declared length, so the
    /// terminator scan is a heuristic either way; this narrows the cases
    /// where raw pixel bytes are mistaken for the end marker.
    pub strict_inline_image_end: bool,
}

/// Tokenize a content buffer with default options.
pub fn tokenize(source: impl Into<Bytes>) -> Result<Program> {
    Lexer::with_options(LexerOptions::default()).tokenize(source)
}

/// Content-stream lexer.
#[derive(Debug, Clone, Default)]
pub struct Lexer {
    options: LexerOptions,
}

impl Lexer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: LexerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> LexerOptions {
        self.options
    }

    /// Tokenize `source` into a fresh [`Program`].
    pub fn tokenize(&self, source: impl Into<Bytes>) -> Result<Program> {
        let source = source.into();
        let mut scanner = Scanner {
            data: &source,
            pos: 0,
            decoded: Vec::with_capacity(source.len() / 8),
            options: self.options,
        };
        let tokens = scanner.scan(false)?;
        let decoded = scanner.decoded;
        Ok(Program {
            source,
            decoded,
            tokens,
        })
    }
}

struct Scanner<'s> {
    data: &'s [u8],
    pos: usize,
    decoded: Vec<u8>,
    options: LexerOptions,
}

const fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x0c')
}

const fn is_name_end(b: u8) -> bool {
    is_whitespace(b)
        || matches!(
            b,
            b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
        )
}

const fn is_operator_end(b: u8) -> bool {
    is_whitespace(b) || matches!(b, b'(' | b'/' | b'[' | b'<' | b'%')
}

const fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl<'s> Scanner<'s> {
    fn error(&self, pos: usize, msg: &'static str) -> ContentError {
        ContentError::Lexical { pos, msg }
    }

    fn peek_at(&self, pos: usize) -> Option<u8> {
        self.data.get(pos).copied()
    }

    /// Scan tokens until end of buffer, or until the `]` closing the
    /// array when `in_array` is set.
    fn scan(&mut self, in_array: bool) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek_at(self.pos) else {
                if in_array {
                    return Err(self.error(self.pos, "unterminated array"));
                }
                return Ok(tokens);
            };
            let token = match c {
                b'(' => self.parse_string()?,
                b'<' if self.peek_at(self.pos + 1) == Some(b'<') => {
                    self.pos += 2;
                    Token::DictOpen
                }
                b'<' => self.parse_hex_string()?,
                b'>' if self.peek_at(self.pos + 1) == Some(b'>') => {
                    self.pos += 2;
                    Token::DictClose
                }
                b'[' => {
                    self.pos += 1;
                    Token::Array(self.scan(true)?)
                }
                b']' => {
                    if !in_array {
                        return Err(self.error(self.pos, "unbalanced ']'"));
                    }
                    self.pos += 1;
                    return Ok(tokens);
                }
                b'/' => self.parse_name(),
                b'+' | b'-' | b'.' | b'0'..=b'9' => self.parse_number()?,
                b't' if self.data[self.pos..].starts_with(b"true") => {
                    self.pos += 4;
                    Token::Boolean(true)
                }
                b'f' if self.data[self.pos..].starts_with(b"false") => {
                    self.pos += 5;
                    Token::Boolean(false)
                }
                _ => self.parse_operator()?,
            };
            tokens.push(token);
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek_at(self.pos) {
            if b == b'%' {
                while let Some(b) = self.peek_at(self.pos) {
                    if b == b'\r' || b == b'\n' {
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }
            if !is_whitespace(b) {
                break;
            }
            self.pos += 1;
        }
    }

    fn parse_string(&mut self) -> Result<Token> {
        let start = self.pos;
        let data = self.data;
        let len = data.len();
        let out_start = self.decoded.len();
        let mut pos = self.pos + 1; // skip '('
        let mut depth = 1usize;

        loop {
            let Some(&c) = data.get(pos) else {
                return Err(self.error(start, "unterminated string"));
            };
            pos += 1;
            match c {
                b'(' => {
                    depth += 1;
                    self.decoded.push(b'(');
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    self.decoded.push(b')');
                }
                b'\r' => {
                    if pos < len && data[pos] == b'\n' {
                        pos += 1;
                    }
                    self.decoded.push(b'\n');
                }
                b'\\' => {
                    let Some(&esc) = data.get(pos) else {
                        return Err(self.error(start, "unterminated string"));
                    };
                    pos += 1;
                    match esc {
                        b'n' => self.decoded.push(b'\n'),
                        b'r' => self.decoded.push(b'\r'),
                        b't' => self.decoded.push(b'\t'),
                        b'b' => self.decoded.push(0x08),
                        b'f' => self.decoded.push(0x0c),
                        b'(' | b')' | b'\\' => self.decoded.push(esc),
                        b'\r' => {
                            if pos < len && data[pos] == b'\n' {
                                pos += 1;
                            }
                        }
                        b'\n' => {}
                        b'0'..=b'7' => {
                            let mut octal = u32::from(esc - b'0');
                            for _ in 0..2 {
                                match data.get(pos) {
                                    Some(&d @ b'0'..=b'7') => {
                                        octal = octal * 8 + u32::from(d - b'0');
                                        pos += 1;
                                    }
                                    _ => break,
                                }
                            }
                            self.decoded.push((octal & 0xFF) as u8);
                        }
                        other => self.decoded.push(other),
                    }
                }
                other => self.decoded.push(other),
            }
        }

        self.pos = pos;
        Ok(Token::String(Span::new(
            out_start,
            self.decoded.len() - out_start,
        )))
    }

    fn parse_hex_string(&mut self) -> Result<Token> {
        let start = self.pos;
        let out_start = self.decoded.len();
        let mut pos = self.pos + 1; // skip '<'
        let mut pending: Option<u8> = None;

        loop {
            let Some(&c) = self.data.get(pos) else {
                return Err(self.error(start, "unterminated hex string"));
            };
            pos += 1;
            if c == b'>' {
                break;
            }
            if is_whitespace(c) {
                continue;
            }
            let Some(nibble) = hex_value(c) else {
                return Err(self.error(pos - 1, "invalid hex digit"));
            };
            match pending.take() {
                Some(high) => self.decoded.push((high << 4) | nibble),
                None => pending = Some(nibble),
            }
        }

        if let Some(high) = pending {
            self.decoded.push(high << 4);
        }

        self.pos = pos;
        Ok(Token::String(Span::new(
            out_start,
            self.decoded.len() - out_start,
        )))
    }

    fn parse_name(&mut self) -> Token {
        let data = self.data;
        let out_start = self.decoded.len();
        let mut pos = self.pos + 1; // skip '/'

        while let Some(&b) = data.get(pos) {
            if is_name_end(b) {
                break;
            }
            if b == b'#' {
                let hi = data.get(pos + 1).copied().and_then(hex_value);
                let lo = data.get(pos + 2).copied().and_then(hex_value);
                if let (Some(hi), Some(lo)) = (hi, lo) {
                    self.decoded.push((hi << 4) | lo);
                    pos += 3;
                    continue;
                }
            }
            self.decoded.push(b);
            pos += 1;
        }

        self.pos = pos;
        Token::Name(Span::new(out_start, self.decoded.len() - out_start))
    }

    fn parse_number(&mut self) -> Result<Token> {
        let data = self.data;
        let start = self.pos;
        let mut pos = self.pos;
        let mut negative = false;

        match data[pos] {
            b'-' => {
                negative = true;
                pos += 1;
            }
            b'+' => pos += 1,
            _ => {}
        }

        let mut int_part = 0f64;
        let mut frac_part = 0f64;
        let mut divisor = 1f64;
        let mut seen_dot = false;
        let mut digits = 0usize;

        while let Some(&c) = data.get(pos) {
            match c {
                b'0'..=b'9' => {
                    let d = f64::from(c - b'0');
                    if seen_dot {
                        frac_part = frac_part * 10.0 + d;
                        divisor *= 10.0;
                    } else {
                        int_part = int_part * 10.0 + d;
                    }
                    digits += 1;
                }
                b'.' => {
                    if seen_dot {
                        return Err(self.error(pos, "second decimal point in number"));
                    }
                    seen_dot = true;
                }
                _ => break,
            }
            pos += 1;
        }

        if digits == 0 {
            return Err(self.error(start, "number has no digits"));
        }

        self.pos = pos;
        let value = int_part + frac_part / divisor;
        Ok(Token::Number(if negative { -value } else { value }))
    }

    fn parse_operator(&mut self) -> Result<Token> {
        let start = self.pos;
        let mut pos = start + 1;
        while let Some(&b) = self.data.get(pos) {
            if is_operator_end(b) {
                break;
            }
            pos += 1;
        }
        // `ID` is a two-byte introducer: binary or hex data may follow it
        // without a separator.
        if self.data[start..pos].starts_with(b"ID") {
            self.pos = start + 2;
            return self.parse_inline_image_data(start);
        }
        self.pos = pos;
        Ok(Token::Operator(Operator::from_bytes(&self.data[start..pos])))
    }

    /// Scan raw inline image bytes following `ID` up to the first
    /// whitespace + `EI` sequence.
    fn parse_inline_image_data(&mut self, op_start: usize) -> Result<Token> {
        let data = self.data;
        let len = data.len();
        // The separator itself may also precede an empty payload's EI.
        let scan = self.pos;
        let mut start = self.pos;
        if start < len && is_whitespace(data[start]) {
            start += 1;
        }

        let strict = self.options.strict_inline_image_end;
        let mut i = scan;
        while i + 2 < len {
            if is_whitespace(data[i]) && data[i + 1] == b'E' && data[i + 2] == b'I' {
                let after = data.get(i + 3).copied();
                if !strict || after.is_none_or(is_whitespace) {
                    let end = i.max(start);
                    self.pos = i + 3;
                    return Ok(Token::InlineImageData(Span::new(start, end - start)));
                }
            }
            i += 1;
        }

        Err(self.error(op_start, "unterminated inline image"))
    }
}
