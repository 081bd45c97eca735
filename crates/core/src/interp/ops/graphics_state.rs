//! Graphics state operators.
//!
//! Handles: q, Q, cm, w, J, j, M, d, ri, i, gs
//!
//! - q/Q: Push/pop graphics state, mirrored to the handler
//! - cm: Concatenate transformation matrix
//! - w, J, j, M, d: Line styling (width, cap, join, miter limit, dash)
//! - ri, i: Rendering intent and flatness
//! - gs: Set parameters from an ExtGState dictionary

use tracing::{debug, trace, warn};

use crate::error::{ContentError, Result};
use crate::interp::device::MarkupHandler;
use crate::interp::interpreter::{Frame, Interpreter};
use crate::model::{BlendMode, LineCap, LineJoin, Object, RenderingIntent};
use crate::utils::mult_matrix;

#[allow(non_snake_case)]
impl<'a, H: MarkupHandler> Interpreter<'a, H> {
    /// Saves the current graphics state to the stack.
    ///
    /// PDF operator: `q`
    pub(crate) fn do_q(&mut self) {
        self.gstack.save();
        self.handler.gsave(self.gstack.current());
    }

    /// Restores the graphics state saved by the matching `q`.
    ///
    /// A program may only pop states it pushed itself.
    ///
    /// PDF operator: `Q`
    pub(crate) fn do_Q(&mut self, frame: &Frame<'_>) -> Result<()> {
        if self.gstack.depth() <= frame.gstack_base {
            return Err(ContentError::StackUnderflow);
        }
        self.gstack.restore()?;
        self.handler.grestore(self.gstack.current());
        Ok(())
    }

    /// Concatenates a matrix to the current transformation matrix.
    ///
    /// PDF operator: `cm`
    pub(crate) fn do_cm(&mut self, m: crate::utils::Matrix) {
        let gs = self.gstack.current_mut();
        gs.ctm = mult_matrix(m, gs.ctm);
    }

    /// PDF operator: `w`
    pub(crate) fn do_w(&mut self, width: f64) {
        self.gstack.current_mut().set_line_width(width);
    }

    /// PDF operator: `J`
    pub(crate) fn do_J(&mut self, cap: i32) {
        match LineCap::from_i32(cap) {
            Some(cap) => self.gstack.current_mut().set_line_cap(cap),
            None => warn!(cap, "invalid line cap, ignored"),
        }
    }

    /// PDF operator: `j`
    pub(crate) fn do_j(&mut self, join: i32) {
        match LineJoin::from_i32(join) {
            Some(join) => self.gstack.current_mut().set_line_join(join),
            None => warn!(join, "invalid line join, ignored"),
        }
    }

    /// PDF operator: `M`
    pub(crate) fn do_M(&mut self, limit: f64) {
        self.gstack.current_mut().set_miter_limit(limit);
    }

    /// Sets the line dash pattern.
    ///
    /// PDF operator: `d`
    pub(crate) fn do_d(&mut self, dash: &[f64], phase: f64) {
        self.gstack
            .current_mut()
            .set_dash(dash.iter().copied(), phase);
    }

    /// Sets the color rendering intent.
    ///
    /// PDF operator: `ri`
    pub(crate) fn do_ri(&mut self, intent: &str) {
        self.gstack.current_mut().rendering_intent = RenderingIntent::from_name(intent);
    }

    /// Sets the flatness tolerance.
    ///
    /// PDF operator: `i`
    pub(crate) fn do_i(&mut self, flatness: f64) {
        self.gstack.current_mut().flatness = flatness;
    }

    /// Applies the entries of a named ExtGState dictionary.
    ///
    /// Unsupported keys are skipped. Soft masks other than `/None` are
    /// logged and ignored.
    ///
    /// PDF operator: `gs`
    pub(crate) fn do_gs(&mut self, name: &str) -> Result<()> {
        let params = self.resources.ext_gstate(name)?;
        for (key, value) in params.iter() {
            match key.as_str() {
                "LW" => {
                    if let Some(w) = value.as_num() {
                        self.do_w(w);
                    }
                }
                "LC" => {
                    if let Some(cap) = value.as_int() {
                        self.do_J(cap as i32);
                    }
                }
                "LJ" => {
                    if let Some(join) = value.as_int() {
                        self.do_j(join as i32);
                    }
                }
                "ML" => {
                    if let Some(limit) = value.as_num() {
                        self.do_M(limit);
                    }
                }
                "D" => {
                    // [[dash...] phase]
                    if let Some([dash, phase]) = as_pair(value) {
                        let dash = dash.as_numbers().unwrap_or_default();
                        self.do_d(&dash, phase.as_num().unwrap_or(0.0));
                    }
                }
                "RI" => {
                    if let Some(intent) = value.as_name() {
                        self.do_ri(intent);
                    }
                }
                "FL" => {
                    if let Some(flatness) = value.as_num() {
                        self.do_i(flatness);
                    }
                }
                "BM" => {
                    // A name, or an array of names where the first known one wins
                    let mode = match value {
                        Object::Name(n) => BlendMode::from_name(n),
                        Object::Array(arr) => arr
                            .iter()
                            .filter_map(Object::as_name)
                            .find_map(BlendMode::from_name),
                        _ => None,
                    };
                    match mode {
                        Some(mode) => self.gstack.current_mut().blend_mode = mode,
                        None => warn!(?value, "unknown blend mode, ignored"),
                    }
                }
                "AIS" => {
                    if let Some(flag) = value.as_bool() {
                        self.gstack.current_mut().alpha_is_shape = flag;
                    }
                }
                "CA" => {
                    if let Some(alpha) = value.as_num() {
                        self.gstack.current_mut().stroke_alpha = alpha.clamp(0.0, 1.0);
                    }
                }
                "ca" => {
                    if let Some(alpha) = value.as_num() {
                        self.gstack.current_mut().fill_alpha = alpha.clamp(0.0, 1.0);
                    }
                }
                "SMask" => {
                    if value.as_name() != Some("None") {
                        debug!(ext_gstate = name, "soft mask not supported, ignored");
                    }
                }
                "Font" => {
                    if let Some([font, size]) = as_pair(value)
                        && let (Some(font), Some(size)) = (font.as_name(), size.as_num())
                    {
                        self.do_Tf(font, size)?;
                    }
                }
                "TK" => {
                    if let Some(flag) = value.as_bool() {
                        self.gstack.current_mut().knockout = flag;
                    }
                }
                other => trace!(key = other, "ExtGState key ignored"),
            }
        }
        Ok(())
    }

    /// Opens a compatibility section; unknown operators inside it are
    /// skipped quietly.
    ///
    /// PDF operator: `BX`
    pub(crate) fn do_BX(&mut self, frame: &mut Frame<'_>) {
        frame.compat_depth += 1;
    }

    /// PDF operator: `EX`
    pub(crate) fn do_EX(&mut self, frame: &mut Frame<'_>) -> Result<()> {
        if frame.compat_depth == 0 {
            return Err(ContentError::UnbalancedCompatibility);
        }
        frame.compat_depth -= 1;
        Ok(())
    }
}

/// Two-element array operand, as used by the `D` and `Font` entries.
fn as_pair(value: &Object) -> Option<&[Object; 2]> {
    value.as_array().and_then(|a| a.try_into().ok())
}
