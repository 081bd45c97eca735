//! Text operators.
//!
//! Handles: BT, ET, Tc, Tw, Tz, TL, Tf, Tr, Ts, Td, TD, Tm, T*, Tj, TJ, ', "
//!
//! Text object:
//! - BT/ET: Begin/end text object
//!
//! Text state:
//! - Tc: Character spacing
//! - Tw: Word spacing
//! - Tz: Horizontal scaling
//! - TL: Leading
//! - Tf: Font and size
//! - Tr: Rendering mode
//! - Ts: Rise (baseline offset)
//!
//! Text positioning:
//! - Td/TD: Move to next line (TD also sets leading)
//! - Tm: Set text matrix directly
//! - T*: Move to next line using current leading
//!
//! Text showing:
//! - Tj: Show string
//! - TJ: Show with individual glyph positioning
//! - ': Move to next line and show
//! - ": Set spacing, move to next line, and show
//!
//! Positioning and showing operators outside `BT ... ET` are ignored with a
//! warning. Text state operators are valid anywhere.

use tracing::warn;

use crate::error::Result;
use crate::interp::device::{GlyphRun, MarkupHandler};
use crate::interp::interpreter::{Frame, Interpreter};
use crate::model::TextRenderMode;
use crate::parser::Token;
use crate::utils::Matrix;

#[allow(non_snake_case)]
impl<'a, H: MarkupHandler> Interpreter<'a, H> {
    fn in_text_object(frame: &Frame<'_>, op: &'static str) -> bool {
        if !frame.text.is_active() {
            warn!(op, "text operator outside BT/ET, ignored");
            return false;
        }
        true
    }

    // ========================================================================
    // Text Object Operators
    // ========================================================================

    /// BT - Begin text object.
    ///
    /// Resets the text and line matrices to identity. A `BT` inside an open
    /// text object restarts it.
    pub(crate) fn do_BT(&mut self, frame: &mut Frame<'_>) {
        if frame.text.is_active() {
            warn!("nested BT, restarting text object");
        }
        frame.text.begin(self.gstack.current().ctm);
    }

    /// ET - End text object.
    pub(crate) fn do_ET(&mut self, frame: &mut Frame<'_>) {
        if !frame.text.is_active() {
            warn!("ET without BT");
        }
        frame.text.end();
    }

    // ========================================================================
    // Text State Operators
    // ========================================================================

    /// Tc - Set character spacing.
    pub(crate) fn do_Tc(&mut self, spacing: f64) {
        self.gstack.current_mut().char_spacing = spacing;
    }

    /// Tw - Set word spacing, applied to single-byte code 32 only.
    pub(crate) fn do_Tw(&mut self, spacing: f64) {
        self.gstack.current_mut().word_spacing = spacing;
    }

    /// Tz - Set horizontal scaling, given in percent.
    pub(crate) fn do_Tz(&mut self, scale: f64) {
        self.gstack.current_mut().horizontal_scale = scale / 100.0;
    }

    /// TL - Set leading.
    pub(crate) fn do_TL(&mut self, leading: f64) {
        self.gstack.current_mut().leading = leading;
    }

    /// Tf - Select font and size.
    ///
    /// A font name the resources cannot resolve aborts the program.
    pub(crate) fn do_Tf(&mut self, name: &str, size: f64) -> Result<()> {
        let font = self.resources.font(name)?;
        let gs = self.gstack.current_mut();
        gs.font = Some(font);
        gs.font_size = size;
        Ok(())
    }

    /// Tr - Set text rendering mode.
    pub(crate) fn do_Tr(&mut self, mode: i32) {
        match TextRenderMode::from_i32(mode) {
            Some(mode) => self.gstack.current_mut().render_mode = mode,
            None => warn!(mode, "invalid text rendering mode, ignored"),
        }
    }

    /// Ts - Set text rise.
    pub(crate) fn do_Ts(&mut self, rise: f64) {
        self.gstack.current_mut().rise = rise;
    }

    // ========================================================================
    // Text Positioning Operators
    // ========================================================================

    /// Td - Move to the start of the next line, offset by (tx, ty).
    pub(crate) fn do_Td(&mut self, frame: &mut Frame<'_>, tx: f64, ty: f64) {
        if Self::in_text_object(frame, "Td") {
            frame.text.position_text(tx, ty);
        }
    }

    /// TD - Like Td, and set the leading to `-ty`.
    pub(crate) fn do_TD(&mut self, frame: &mut Frame<'_>, tx: f64, ty: f64) {
        if Self::in_text_object(frame, "TD") {
            self.gstack.current_mut().leading = -ty;
            frame.text.position_text(tx, ty);
        }
    }

    /// Tm - Set the text matrix and the text line matrix.
    pub(crate) fn do_Tm(&mut self, frame: &mut Frame<'_>, m: Matrix) {
        if Self::in_text_object(frame, "Tm") {
            frame.text.set_text_matrix(m);
        }
    }

    /// T* - Move to the start of the next line using the leading.
    pub(crate) fn do_T_star(&mut self, frame: &mut Frame<'_>) {
        if Self::in_text_object(frame, "T*") {
            let leading = self.gstack.current().leading;
            frame.text.position_text(0.0, -leading);
        }
    }

    // ========================================================================
    // Text Showing Operators
    // ========================================================================

    /// Show each glyph of `bytes` and advance past it.
    fn show_text(&mut self, frame: &mut Frame<'_>, bytes: &[u8]) {
        let gs = self.gstack.current();
        let Some(font) = gs.font.as_ref() else {
            warn!("text shown with no font selected, ignored");
            return;
        };
        for glyph in font.decode(bytes) {
            let run = GlyphRun {
                glyph,
                transform: frame.text.glyph_transform(gs),
            };
            self.handler.show_glyphs(gs, &run);
            frame.text.advance(&glyph, gs);
        }
    }

    /// Tj - Show a string.
    pub(crate) fn do_Tj(&mut self, frame: &mut Frame<'_>, s: &[u8]) {
        if Self::in_text_object(frame, "Tj") {
            self.show_text(frame, s);
        }
    }

    /// TJ - Show strings with individual positioning.
    ///
    /// Numbers shift the next glyph left by thousandths of text space,
    /// scaled by font size and horizontal scaling.
    pub(crate) fn do_TJ(&mut self, frame: &mut Frame<'_>, seq: &[Token]) {
        if !Self::in_text_object(frame, "TJ") {
            return;
        }
        let program = frame.program;
        for item in seq {
            match item {
                Token::String(span) => self.show_text(frame, program.decoded(*span)),
                Token::Number(n) => frame.text.adjust(*n, self.gstack.current()),
                other => warn!(?other, "unexpected TJ element, skipped"),
            }
        }
    }

    /// ' - Move to the next line and show a string.
    pub(crate) fn do_quote(&mut self, frame: &mut Frame<'_>, s: &[u8]) {
        if Self::in_text_object(frame, "'") {
            self.do_T_star(frame);
            self.show_text(frame, s);
        }
    }

    /// " - Set word and character spacing, move to the next line and show
    /// a string.
    pub(crate) fn do_doublequote(&mut self, frame: &mut Frame<'_>, aw: f64, ac: f64, s: &[u8]) {
        if Self::in_text_object(frame, "\"") {
            self.do_Tw(aw);
            self.do_Tc(ac);
            self.do_T_star(frame);
            self.show_text(frame, s);
        }
    }
}
