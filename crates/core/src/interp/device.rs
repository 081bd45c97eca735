//! Markup handler - the paint sink driven by the interpreter.
//!
//! Handlers translate interpreter output to a backend (rasterizer, display
//! list, recorder). Every method has a no-op default so a handler only
//! implements what it consumes.

use crate::model::{GState, Path, TileSurface};
use crate::resources::{Glyph, Image};
use crate::utils::{Matrix, Rect};

/// One positioned glyph handed to [`MarkupHandler::show_glyphs`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct GlyphRun {
    pub glyph: Glyph,
    /// Glyph space to device space, read before the glyph's advance
    pub transform: Matrix,
}

/// Markup handler trait - interface for receiving paint calls.
///
/// Paths given to `fill_path` and `stroke_path` are in user space and are
/// painted under `gstate.ctm`. Clip paths are already in device space.
pub trait MarkupHandler {
    /// Begin a page of the given size in device units.
    fn begin_page(&mut self, _width: f64, _height: f64) {}

    /// End the current page.
    fn end_page(&mut self) {}

    /// A state was pushed; `gstate` is the new current state.
    fn gsave(&mut self, _gstate: &GState) {}

    /// A state was popped; `gstate` is the state now current.
    fn grestore(&mut self, _gstate: &GState) {}

    /// Fill a path with `gstate.fill`.
    fn fill_path(&mut self, _gstate: &GState, _path: &Path) {}

    /// Stroke a path with `gstate.stroke` and `gstate.stroke_style()`.
    fn stroke_path(&mut self, _gstate: &GState, _path: &Path) {}

    /// Paint an image; `transform` maps image pixels onto the unit square.
    fn draw_image(&mut self, _gstate: &GState, _image: &Image, _transform: Matrix) {}

    /// Paint one glyph.
    fn show_glyphs(&mut self, _gstate: &GState, _run: &GlyphRun) {}

    /// Intersect the native clip with `path` (device space).
    fn establish_clip(&mut self, _path: &Path, _even_odd: bool) {}

    /// Start rendering a tile cell offscreen. Paint calls until `end_tile`
    /// belong to the tile.
    fn begin_tile(&mut self, _cell: Rect, _matrix: Matrix) {}

    /// Finish the tile started by `begin_tile`.
    fn end_tile(&mut self) -> Option<TileSurface> {
        None
    }

    /// An operator the interpreter does not implement was skipped.
    fn unknown_operator(&mut self, _op: &str) {}
}
