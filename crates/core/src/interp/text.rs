//! Text positioning within a `BT ... ET` object.
//!
//! The line and character matrices live in text space. The transform in
//! force at `BT` is captured once and composed in when a glyph's device
//! position is read.

use crate::model::GState;
use crate::resources::Glyph;
use crate::utils::{MATRIX_IDENTITY, Matrix, mult_matrix, translate_matrix};

/// Horizontal displacement of one glyph in unscaled text space units.
///
/// `(w/1000 * fontSize + charSpacing + wordSpacing?) * horizontalScale`,
/// where word spacing is added only for the single-byte code 32.
pub fn glyph_displacement(width: f64, word_space: bool, gs: &GState) -> f64 {
    let mut tx = width / 1000.0 * gs.font_size + gs.char_spacing;
    if word_space {
        tx += gs.word_spacing;
    }
    tx * gs.horizontal_scale
}

/// State of the current text object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextObject {
    active: bool,
    base: Matrix,
    line_matrix: Matrix,
    char_matrix: Matrix,
}

impl Default for TextObject {
    fn default() -> Self {
        Self {
            active: false,
            base: MATRIX_IDENTITY,
            line_matrix: MATRIX_IDENTITY,
            char_matrix: MATRIX_IDENTITY,
        }
    }
}

impl TextObject {
    pub fn new() -> Self {
        Self::default()
    }

    /// BT: reset both matrices and capture the current transform.
    pub fn begin(&mut self, ctm: Matrix) {
        self.active = true;
        self.base = ctm;
        self.line_matrix = MATRIX_IDENTITY;
        self.char_matrix = MATRIX_IDENTITY;
    }

    /// ET: inert until the next `begin`.
    pub fn end(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn line_matrix(&self) -> Matrix {
        self.line_matrix
    }

    pub fn char_matrix(&self) -> Matrix {
        self.char_matrix
    }

    /// Td: move the line start by (tx, ty) in text space.
    pub fn position_text(&mut self, tx: f64, ty: f64) {
        self.line_matrix = translate_matrix(self.line_matrix, (tx, ty));
        self.char_matrix = self.line_matrix;
    }

    /// Tm: replace both matrices.
    pub fn set_text_matrix(&mut self, m: Matrix) {
        self.line_matrix = m;
        self.char_matrix = m;
    }

    /// Move past a shown glyph. Returns the displacement applied.
    pub fn advance(&mut self, glyph: &Glyph, gs: &GState) -> f64 {
        let tx = glyph_displacement(glyph.width, glyph.is_word_space(), gs);
        self.char_matrix = translate_matrix(self.char_matrix, (tx, 0.0));
        tx
    }

    /// TJ number: shift by `-amount/1000 * fontSize * horizontalScale`.
    pub fn adjust(&mut self, amount: f64, gs: &GState) {
        let tx = -amount / 1000.0 * gs.font_size * gs.horizontal_scale;
        self.char_matrix = translate_matrix(self.char_matrix, (tx, 0.0));
    }

    /// Glyph space to device space for the next glyph.
    pub fn glyph_transform(&self, gs: &GState) -> Matrix {
        let params = (
            gs.font_size * gs.horizontal_scale,
            0.0,
            0.0,
            gs.font_size,
            0.0,
            gs.rise,
        );
        mult_matrix(mult_matrix(params, self.char_matrix), self.base)
    }
}
