//! Path construction, painting and clipping operators.
//!
//! Handles: m, l, c, v, y, h, re, S, s, f, F, f*, B, B*, b, b*, n, W, W*
//!
//! `W`/`W*` only record a clip request. The clip takes effect after the
//! next painting operator has painted, so that painting is itself
//! unclipped by the new path.

use crate::interp::device::MarkupHandler;
use crate::interp::interpreter::{Frame, Interpreter};
use crate::model::{Path, WindingRule};

#[allow(non_snake_case)]
impl<'a, H: MarkupHandler> Interpreter<'a, H> {
    /// Current path, started with an implicit move to `(x, y)` when empty.
    fn path_from<'f>(&mut self, frame: &'f mut Frame<'_>, x: f64, y: f64) -> &'f mut Path {
        let started = self.gstack.current().current_point.is_some();
        let path = frame.path.get_or_insert_with(Path::new);
        if !started || path.is_empty() {
            path.move_to(x, y);
        }
        path
    }

    fn set_current_point(&mut self, x: f64, y: f64) {
        self.gstack.current_mut().current_point = Some((x, y));
    }

    /// Begins a new subpath.
    ///
    /// PDF operator: `m`
    pub(crate) fn do_m(&mut self, frame: &mut Frame<'_>, x: f64, y: f64) {
        frame.path.get_or_insert_with(Path::new).move_to(x, y);
        self.set_current_point(x, y);
    }

    /// Appends a straight line segment.
    ///
    /// PDF operator: `l`
    pub(crate) fn do_l(&mut self, frame: &mut Frame<'_>, x: f64, y: f64) {
        self.path_from(frame, x, y).line_to(x, y);
        self.set_current_point(x, y);
    }

    /// Appends a cubic Bezier curve.
    ///
    /// PDF operator: `c`
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn do_c(
        &mut self,
        frame: &mut Frame<'_>,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
    ) {
        self.path_from(frame, x1, y1)
            .curve_to(x1, y1, x2, y2, x3, y3);
        self.set_current_point(x3, y3);
    }

    /// Appends a cubic Bezier curve whose first control point is the
    /// current point.
    ///
    /// PDF operator: `v`
    pub(crate) fn do_v(&mut self, frame: &mut Frame<'_>, x2: f64, y2: f64, x3: f64, y3: f64) {
        let (x1, y1) = self.gstack.current().current_point.unwrap_or((x2, y2));
        self.path_from(frame, x1, y1)
            .curve_to(x1, y1, x2, y2, x3, y3);
        self.set_current_point(x3, y3);
    }

    /// Appends a cubic Bezier curve whose second control point is the end
    /// point.
    ///
    /// PDF operator: `y`
    pub(crate) fn do_y(&mut self, frame: &mut Frame<'_>, x1: f64, y1: f64, x3: f64, y3: f64) {
        self.path_from(frame, x1, y1)
            .curve_to(x1, y1, x3, y3, x3, y3);
        self.set_current_point(x3, y3);
    }

    /// Closes the current subpath.
    ///
    /// PDF operator: `h`
    pub(crate) fn do_h(&mut self, frame: &mut Frame<'_>) {
        if let Some(path) = frame.path.as_mut() {
            path.close();
            if let Some(start) = path.subpath_start() {
                self.gstack.current_mut().current_point = Some(start);
            }
        }
    }

    /// Appends a closed rectangle as its own subpath.
    ///
    /// PDF operator: `re`
    pub(crate) fn do_re(&mut self, frame: &mut Frame<'_>, x: f64, y: f64, w: f64, h: f64) {
        frame
            .path
            .get_or_insert_with(Path::new)
            .append_rect(x, y, w, h);
        self.set_current_point(x, y);
    }

    // ========================================================================
    // Painting
    // ========================================================================

    /// Paint the current path, then apply any pending clip and end the path.
    fn paint_path(
        &mut self,
        frame: &mut Frame<'_>,
        close: bool,
        fill: Option<WindingRule>,
        stroke: bool,
    ) {
        if let Some(mut path) = frame.path.take()
            && !path.is_empty()
        {
            if close {
                path.close();
            }
            if let Some(rule) = fill {
                path.set_winding(rule);
                self.handler.fill_path(self.gstack.current(), &path);
            }
            if stroke {
                self.handler.stroke_path(self.gstack.current(), &path);
            }
        }
        self.end_path(frame);
    }

    /// Apply the clip requested by `W`/`W*` and discard the current path.
    pub(crate) fn end_path(&mut self, frame: &mut Frame<'_>) {
        if let Some(clip) = frame.pending_clip.take() {
            self.establish_clip(&clip);
        }
        frame.path = None;
        self.gstack.current_mut().current_point = None;
    }

    /// Strokes the path.
    ///
    /// PDF operator: `S`
    pub(crate) fn do_S(&mut self, frame: &mut Frame<'_>) {
        self.paint_path(frame, false, None, true);
    }

    /// Closes and strokes the path.
    ///
    /// PDF operator: `s`
    pub(crate) fn do_s(&mut self, frame: &mut Frame<'_>) {
        self.paint_path(frame, true, None, true);
    }

    /// Fills the path using the nonzero winding rule.
    ///
    /// PDF operators: `f`, `F`
    pub(crate) fn do_f(&mut self, frame: &mut Frame<'_>) {
        self.paint_path(frame, false, Some(WindingRule::NonZero), false);
    }

    /// Fills the path using the even-odd rule.
    ///
    /// PDF operators: `f*`, `F*`
    pub(crate) fn do_f_star(&mut self, frame: &mut Frame<'_>) {
        self.paint_path(frame, false, Some(WindingRule::EvenOdd), false);
    }

    /// Fills then strokes the path (nonzero).
    ///
    /// PDF operator: `B`
    pub(crate) fn do_B(&mut self, frame: &mut Frame<'_>) {
        self.paint_path(frame, false, Some(WindingRule::NonZero), true);
    }

    /// Fills then strokes the path (even-odd).
    ///
    /// PDF operator: `B*`
    pub(crate) fn do_B_star(&mut self, frame: &mut Frame<'_>) {
        self.paint_path(frame, false, Some(WindingRule::EvenOdd), true);
    }

    /// Closes, fills and strokes the path (nonzero).
    ///
    /// PDF operator: `b`
    pub(crate) fn do_b(&mut self, frame: &mut Frame<'_>) {
        self.paint_path(frame, true, Some(WindingRule::NonZero), true);
    }

    /// Closes, fills and strokes the path (even-odd).
    ///
    /// PDF operator: `b*`
    pub(crate) fn do_b_star(&mut self, frame: &mut Frame<'_>) {
        self.paint_path(frame, true, Some(WindingRule::EvenOdd), true);
    }

    /// Ends the path without painting.
    ///
    /// PDF operator: `n`
    pub(crate) fn do_n(&mut self, frame: &mut Frame<'_>) {
        self.end_path(frame);
    }

    // ========================================================================
    // Clipping
    // ========================================================================

    fn request_clip(&mut self, frame: &mut Frame<'_>, rule: WindingRule) {
        frame.pending_clip = frame.path.clone().map(|p| p.with_winding(rule));
    }

    /// Requests a nonzero clip with the current path.
    ///
    /// PDF operator: `W`
    pub(crate) fn do_W(&mut self, frame: &mut Frame<'_>) {
        self.request_clip(frame, WindingRule::NonZero);
    }

    /// Requests an even-odd clip with the current path.
    ///
    /// PDF operator: `W*`
    pub(crate) fn do_W_star(&mut self, frame: &mut Frame<'_>) {
        self.request_clip(frame, WindingRule::EvenOdd);
    }
}
