//! Tests for the content-stream lexer.

use bytes::Bytes;
use pagemark_core::parser::{Lexer, LexerOptions, Operator, Program, Span, Token, tokenize};
use proptest::prelude::*;

fn lex(data: &[u8]) -> Program {
    tokenize(Bytes::copy_from_slice(data)).expect("tokenize")
}

fn decoded_strings(program: &Program) -> Vec<Vec<u8>> {
    program
        .tokens()
        .iter()
        .filter_map(|t| match t {
            Token::String(span) => Some(program.decoded(*span).to_vec()),
            _ => None,
        })
        .collect()
}

// ============================================================================
// Basic tokens
// ============================================================================

#[test]
fn test_basic_text_program() {
    let program = lex(b"BT /F1 12 Tf (Hello) Tj ET");
    let tokens = program.tokens();

    assert_eq!(tokens.len(), 7);
    assert_eq!(tokens[0], Token::Operator(Operator::BT));
    let Token::Name(font) = tokens[1] else {
        panic!("expected name, got {:?}", tokens[1]);
    };
    assert_eq!(program.name_str(font), "F1");
    assert_eq!(tokens[2], Token::Number(12.0));
    assert_eq!(tokens[3], Token::Operator(Operator::Tf));
    assert_eq!(decoded_strings(&program), vec![b"Hello".to_vec()]);
    assert_eq!(tokens[5], Token::Operator(Operator::Tj));
    assert_eq!(tokens[6], Token::Operator(Operator::ET));
}

#[test]
fn test_numbers() {
    let program = lex(b"0 -1 +2 .5 -.25 3. 007");
    let numbers: Vec<f64> = program.tokens().iter().filter_map(Token::as_number).collect();
    assert_eq!(numbers, vec![0.0, -1.0, 2.0, 0.5, -0.25, 3.0, 7.0]);
}

#[test]
fn test_comments_and_whitespace() {
    let program = lex(b"q % save state\r\n\t1 w\x0cQ%trailing");
    assert_eq!(
        program.tokens(),
        &[
            Token::Operator(Operator::Qq),
            Token::Number(1.0),
            Token::Operator(Operator::Ww),
            Token::Operator(Operator::Q),
        ]
    );
}

#[test]
fn test_star_and_quote_operators() {
    let program = lex(b"f* B* b* T* W* ' \"");
    let ops: Vec<&Operator> = program.tokens().iter().filter_map(Token::as_operator).collect();
    assert_eq!(
        ops,
        vec![
            &Operator::FStar,
            &Operator::BStar,
            &Operator::BbStar,
            &Operator::TStar,
            &Operator::WStar,
            &Operator::Quote,
            &Operator::DoubleQuote,
        ]
    );
}

#[test]
fn test_booleans_and_unknown_operator() {
    let program = lex(b"true false foo");
    assert_eq!(program.tokens()[0], Token::Boolean(true));
    assert_eq!(program.tokens()[1], Token::Boolean(false));
    assert_eq!(
        program.tokens()[2],
        Token::Operator(Operator::Unknown("foo".into()))
    );
}

// ============================================================================
// Strings and names
// ============================================================================

#[test]
fn test_literal_string_escapes() {
    let program = lex(b"(a\\nb\\tc\\(d\\)e\\\\f) (x\\qy)");
    assert_eq!(
        decoded_strings(&program),
        vec![b"a\nb\tc(d)e\\f".to_vec(), b"xqy".to_vec()]
    );
}

#[test]
fn test_literal_string_nesting_and_line_ends() {
    let program = lex(b"(a(b)c) (l1\r\nl2\rl3) (split\\\nline)");
    assert_eq!(
        decoded_strings(&program),
        vec![
            b"a(b)c".to_vec(),
            b"l1\nl2\nl3".to_vec(),
            b"splitline".to_vec()
        ]
    );
}

#[test]
fn test_octal_escapes() {
    let program = lex(b"(\\101\\60\\0061\\777)");
    // \101 = 'A', \60 = '0', \006 then '1', \777 wraps to 0xFF
    assert_eq!(
        decoded_strings(&program),
        vec![vec![b'A', b'0', 0x06, b'1', 0xFF]]
    );
}

#[test]
fn test_hex_strings() {
    let program = lex(b"<48 65 6C 6c 6F> <4F3> <>");
    assert_eq!(
        decoded_strings(&program),
        vec![b"Hello".to_vec(), vec![0x4F, 0x30], Vec::new()]
    );
}

#[test]
fn test_name_hex_escapes() {
    let program = lex(b"/A#20B /Lime#47reen /C#2");
    let names: Vec<String> = program
        .tokens()
        .iter()
        .filter_map(|t| match t {
            Token::Name(span) => Some(program.name_str(*span).into_owned()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["A B", "LimeGreen", "C#2"]);
}

#[test]
fn test_source_is_never_rewritten() {
    let src = Bytes::from_static(b"(\\101) /N#41 <41>");
    let first = tokenize(src.clone()).unwrap();
    let second = tokenize(src.clone()).unwrap();
    assert_eq!(first.tokens(), second.tokens());
    assert_eq!(&src[..], b"(\\101) /N#41 <41>");
    assert_eq!(first.source(), &src);
}

// ============================================================================
// Arrays and dictionaries
// ============================================================================

#[test]
fn test_nested_arrays() {
    let program = lex(b"[1 [2 (x)] /N] TJ");
    let Token::Array(items) = &program.tokens()[0] else {
        panic!("expected array");
    };
    assert_eq!(items.len(), 3);
    assert_eq!(items[0], Token::Number(1.0));
    let Token::Array(inner) = &items[1] else {
        panic!("expected inner array");
    };
    assert_eq!(inner[0], Token::Number(2.0));
    assert!(matches!(inner[1], Token::String(_)));
    assert_eq!(program.tokens()[1], Token::Operator(Operator::TJ));
}

#[test]
fn test_dictionary_delimiters() {
    let program = lex(b"/Tag << /MCID 3 >> BDC");
    assert_eq!(program.tokens()[1], Token::DictOpen);
    assert_eq!(program.tokens()[4], Token::DictClose);
    assert_eq!(program.tokens()[5], Token::Operator(Operator::BDC));
}

// ============================================================================
// Inline images
// ============================================================================

#[test]
fn test_inline_image_data() {
    let data = b"BI /W 2 /H 1 /BPC 8 /CS /G ID \x00\xff EI Q";
    let program = lex(data);
    let tokens = program.tokens();
    let Some(Token::InlineImageData(span)) =
        tokens.iter().find(|t| matches!(t, Token::InlineImageData(_)))
    else {
        panic!("expected inline image data");
    };
    assert_eq!(program.raw(*span), b"\x00\xff");
    assert_eq!(tokens.last(), Some(&Token::Operator(Operator::Q)));
    // ID never appears as an operator
    assert!(!tokens.contains(&Token::Operator(Operator::ID)));
}

#[test]
fn test_inline_image_empty_payload() {
    let program = lex(b"BI /W 1 ID EI Q");
    assert_eq!(program.tokens()[3], Token::InlineImageData(Span::new(11, 0)));
    assert_eq!(program.tokens()[4], Token::Operator(Operator::Q));
}

#[test]
fn test_inline_image_data_without_separator() {
    let program = lex(b"BI /W 1 /H 1 /F /AHx ID00> EI Q");
    let tokens = program.tokens();
    let Some(Token::InlineImageData(span)) =
        tokens.iter().find(|t| matches!(t, Token::InlineImageData(_)))
    else {
        panic!("expected inline image data, got {tokens:?}");
    };
    assert_eq!(program.raw(*span), b"00>");
    assert!(!tokens.iter().any(|t| matches!(t, Token::Operator(Operator::Unknown(_)))));
    assert_eq!(tokens.last(), Some(&Token::Operator(Operator::Q)));
}

#[test]
fn test_inline_image_strict_terminator() {
    // Payload contains " EIx", which only the lenient scan accepts as the end.
    let data = Bytes::from_static(b"BI /W 1 ID ab EIx cd EI Q");

    let lenient = Lexer::new().tokenize(data.clone()).unwrap();
    let Token::InlineImageData(span) = lenient.tokens()[3] else {
        panic!("expected inline image data");
    };
    assert_eq!(lenient.raw(span), b"ab");

    let strict = Lexer::with_options(LexerOptions {
        strict_inline_image_end: true,
    })
    .tokenize(data)
    .unwrap();
    let Token::InlineImageData(span) = strict.tokens()[3] else {
        panic!("expected inline image data");
    };
    assert_eq!(strict.raw(span), b"ab EIx cd");
    assert_eq!(strict.tokens()[4], Token::Operator(Operator::Q));
}

// ============================================================================
// Lexical errors
// ============================================================================

#[test]
fn test_lexical_errors() {
    for bad in [
        &b"(unterminated"[..],
        b"<4G>",
        b"<41",
        b"[1 2",
        b"1 2 ]",
        b"1..2",
        b"- 5",
        b"BI /W 1 ID abc",
    ] {
        let err = tokenize(Bytes::copy_from_slice(bad)).unwrap_err();
        assert!(err.is_lexical(), "{bad:?} gave {err:?}");
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_integers_round_trip(n in -1_000_000i64..1_000_000i64) {
        let program = lex(n.to_string().as_bytes());
        prop_assert_eq!(program.tokens(), &[Token::Number(n as f64)]);
    }

    #[test]
    fn prop_decimals_parse(int in 0u32..100_000u32, frac in 0u32..1000u32) {
        let text = format!("{int}.{frac:03}");
        let program = lex(text.as_bytes());
        let value = program.tokens()[0].as_number().unwrap();
        let expected: f64 = text.parse().unwrap();
        prop_assert!((value - expected).abs() < 1e-9);
    }

    #[test]
    fn prop_octal_escape_low_byte(code in 0u32..512u32) {
        let text = format!("(\\{code:03o})");
        let program = lex(text.as_bytes());
        prop_assert_eq!(decoded_strings(&program), vec![vec![(code & 0xFF) as u8]]);
    }
}
