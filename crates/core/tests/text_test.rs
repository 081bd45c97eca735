//! Tests for text positioning and glyph output.

use std::sync::Arc;

use bytes::Bytes;
use pagemark_core::error::ContentError;
use pagemark_core::interp::{Interpreter, PaintEvent, TraceHandler, glyph_displacement};
use pagemark_core::model::{GState, TextRenderMode};
use pagemark_core::resources::{Font, Glyph, ResourceMap, SimpleFont};
use pagemark_core::utils::Matrix;

/// Single-byte font: every glyph 500 units wide, the space 250.
fn resources() -> ResourceMap {
    let font = SimpleFont::new("Test")
        .with_default_width(500.0)
        .with_width(b' ', 250.0);
    ResourceMap::new().with_font("F1", Arc::new(font))
}

/// (code, transform) of every glyph shown by `content`.
fn glyphs(content: &[u8]) -> Vec<(u32, Matrix)> {
    let mut handler = TraceHandler::new();
    Interpreter::new(&mut handler, Arc::new(resources()))
        .execute(&Bytes::copy_from_slice(content))
        .expect("program should run");
    handler
        .into_events()
        .into_iter()
        .filter_map(|e| match e {
            PaintEvent::Glyph { code, transform } => Some((code, transform)),
            _ => None,
        })
        .collect()
}

/// Device x/y origin of each glyph.
fn origins(content: &[u8]) -> Vec<(f64, f64)> {
    glyphs(content).into_iter().map(|(_, m)| (m.4, m.5)).collect()
}

fn assert_close(actual: &[(f64, f64)], expected: &[(f64, f64)]) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            (a.0 - e.0).abs() < 1e-9 && (a.1 - e.1).abs() < 1e-9,
            "{actual:?} vs {expected:?}"
        );
    }
}

#[test]
fn test_show_text_glyph_transform() {
    let shown = glyphs(b"BT /F1 10 Tf 100 700 Td (AB) Tj ET");
    assert_eq!(
        shown,
        vec![
            (65, (10.0, 0.0, 0.0, 10.0, 100.0, 700.0)),
            (66, (10.0, 0.0, 0.0, 10.0, 105.0, 700.0)),
        ]
    );
}

#[test]
fn test_advance_without_word_spacing() {
    assert_close(
        &origins(b"BT /F1 10 Tf (A B) Tj ET"),
        &[(0.0, 0.0), (5.0, 0.0), (7.5, 0.0)],
    );
}

#[test]
fn test_advance_with_word_spacing() {
    // Word spacing is added after the space only
    assert_close(
        &origins(b"BT /F1 10 Tf 5 Tw (A B) Tj ET"),
        &[(0.0, 0.0), (5.0, 0.0), (12.5, 0.0)],
    );
}

/// Two-byte font: every code 500 units wide.
#[derive(Debug)]
struct TwoByteFont;

impl Font for TwoByteFont {
    fn name(&self) -> &str {
        "TwoByte"
    }

    fn decode(&self, bytes: &[u8]) -> Vec<Glyph> {
        bytes
            .chunks(2)
            .map(|pair| Glyph {
                code: pair.iter().fold(0, |acc, &b| (acc << 8) | u32::from(b)),
                width: 500.0,
                single_byte: false,
            })
            .collect()
    }
}

#[test]
fn test_word_spacing_skips_two_byte_space() {
    let resources = ResourceMap::new().with_font("F2", Arc::new(TwoByteFont));
    let mut handler = TraceHandler::new();
    Interpreter::new(&mut handler, Arc::new(resources))
        .execute(&Bytes::from_static(b"BT /F2 10 Tf 1 Tc 5 Tw <004100200041> Tj ET"))
        .unwrap();
    let shown: Vec<(u32, f64)> = handler
        .into_events()
        .into_iter()
        .filter_map(|e| match e {
            PaintEvent::Glyph { code, transform } => Some((code, transform.4)),
            _ => None,
        })
        .collect();
    // (500/1000 * 10 + 1) * 1 per glyph, no word spacing after code 32
    assert_eq!(shown, vec![(0x41, 0.0), (0x20, 6.0), (0x41, 12.0)]);
}

#[test]
fn test_char_spacing_and_horizontal_scale() {
    // (500/1000 * 10 + 2) * 0.5 = 3.5 per glyph
    let shown = glyphs(b"BT /F1 10 Tf 2 Tc 50 Tz (AA) Tj ET");
    assert_eq!(shown[0].1, (5.0, 0.0, 0.0, 10.0, 0.0, 0.0));
    assert_eq!(shown[1].1.4, 3.5);
}

#[test]
fn test_rise_offsets_baseline() {
    let shown = glyphs(b"BT /F1 10 Tf 3 Ts 0 700 Td (A) Tj ET");
    assert_eq!(shown[0].1, (10.0, 0.0, 0.0, 10.0, 0.0, 703.0));
}

#[test]
fn test_tj_adjustments() {
    // -1000 moves right by a full em (10 units); 500 moves left by 5
    assert_close(
        &origins(b"BT /F1 10 Tf [(A) -1000 (B) 500 (C)] TJ ET"),
        &[(0.0, 0.0), (15.0, 0.0), (15.0, 0.0)],
    );
}

#[test]
fn test_line_movement() {
    assert_close(
        &origins(b"BT /F1 10 Tf 10 700 Td 0 -14 TD (A) Tj T* (B) Tj 12 TL (C) ' 1 2 (D) \" ET"),
        &[(10.0, 686.0), (10.0, 672.0), (10.0, 660.0), (10.0, 648.0)],
    );
}

#[test]
fn test_double_quote_sets_spacing() {
    let mut handler = TraceHandler::new();
    let mut interp = Interpreter::new(&mut handler, Arc::new(resources()));
    interp
        .execute(&Bytes::from_static(b"BT /F1 10 Tf 3 1 (A B) \" ET"))
        .unwrap();
    assert_eq!(interp.gstate().word_spacing, 3.0);
    assert_eq!(interp.gstate().char_spacing, 1.0);
}

#[test]
fn test_text_matrix_and_ctm_at_bt() {
    let shown = glyphs(b"2 0 0 2 0 0 cm BT /F1 10 Tf 1 0 0 1 10 10 Tm (A) Tj ET");
    assert_eq!(shown[0].1, (20.0, 0.0, 0.0, 20.0, 20.0, 20.0));
}

#[test]
fn test_bt_resets_matrices() {
    assert_close(
        &origins(b"BT /F1 10 Tf 50 50 Td (A) Tj ET BT (B) Tj ET"),
        &[(50.0, 50.0), (0.0, 0.0)],
    );
}

#[test]
fn test_text_outside_bt_is_ignored() {
    assert!(glyphs(b"/F1 10 Tf (A) Tj 5 5 Td [(B)] TJ").is_empty());
}

#[test]
fn test_show_without_font_is_ignored() {
    assert!(glyphs(b"BT (A) Tj ET").is_empty());
}

#[test]
fn test_unknown_font_is_error() {
    let mut handler = TraceHandler::new();
    let result = Interpreter::new(&mut handler, Arc::new(resources()))
        .execute(&Bytes::from_static(b"BT /F9 12 Tf (A) Tj ET"));
    assert_eq!(
        result,
        Err(ContentError::MissingResource {
            kind: "font",
            name: "F9".into(),
        })
    );
}

#[test]
fn test_glyph_displacement() {
    let mut gs = GState::default();
    gs.font_size = 12.0;
    gs.char_spacing = 1.0;
    gs.word_spacing = 4.0;
    gs.horizontal_scale = 0.5;
    // (600/1000 * 12 + 1) * 0.5
    assert!((glyph_displacement(600.0, false, &gs) - 4.1).abs() < 1e-9);
    // (600/1000 * 12 + 1 + 4) * 0.5
    assert!((glyph_displacement(600.0, true, &gs) - 6.1).abs() < 1e-9);
}

#[test]
fn test_render_mode_out_of_range_is_ignored() {
    let mut handler = TraceHandler::new();
    let mut interp = Interpreter::new(&mut handler, Arc::new(resources()));
    interp.execute(&Bytes::from_static(b"7 Tr 9 Tr")).unwrap();
    assert_eq!(interp.gstate().render_mode, TextRenderMode::Clip);
}
