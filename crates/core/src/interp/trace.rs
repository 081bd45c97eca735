//! Recording handler.
//!
//! [`TraceHandler`] keeps every paint call as a [`PaintEvent`], in order.
//! The dump tool prints these and the tests assert on them.

use std::sync::Arc;

use super::device::{GlyphRun, MarkupHandler};
use crate::model::{GState, Paint, Path, StrokeStyle, TileSurface};
use crate::resources::Image;
use crate::utils::{Matrix, Rect};

/// Serializable summary of a [`Paint`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum PaintRecord {
    Solid {
        components: Vec<f64>,
    },
    Tiling {
        pattern_id: u64,
        tint: Option<Vec<f64>>,
    },
    Shading {
        shading_type: i32,
    },
}

impl From<&Paint> for PaintRecord {
    fn from(paint: &Paint) -> Self {
        match paint {
            Paint::Solid(c) => PaintRecord::Solid {
                components: c.components.to_vec(),
            },
            Paint::Tiling { tile, tint } => PaintRecord::Tiling {
                pattern_id: tile.pattern_id,
                tint: tint.as_ref().map(|t| t.components.to_vec()),
            },
            Paint::Shading { shading, .. } => PaintRecord::Shading {
                shading_type: shading.shading_type,
            },
        }
    }
}

/// One recorded handler call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "event", rename_all = "snake_case"))]
pub enum PaintEvent {
    BeginPage {
        width: f64,
        height: f64,
    },
    EndPage,
    Save,
    Restore,
    Fill {
        path: Path,
        paint: PaintRecord,
        ctm: Matrix,
        alpha: f64,
    },
    Stroke {
        path: Path,
        paint: PaintRecord,
        ctm: Matrix,
        style: StrokeStyle,
    },
    Image {
        width: u32,
        height: u32,
        inline: bool,
        ctm: Matrix,
        transform: Matrix,
    },
    Glyph {
        code: u32,
        transform: Matrix,
    },
    Clip {
        path: Path,
        even_odd: bool,
    },
    BeginTile {
        cell: Rect,
        matrix: Matrix,
    },
    EndTile,
    UnknownOperator {
        op: String,
    },
}

/// Handler that records every call it receives.
#[derive(Debug, Default)]
pub struct TraceHandler {
    pub events: Vec<PaintEvent>,
    tiles: usize,
}

impl TraceHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[PaintEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<PaintEvent> {
        self.events
    }

    /// Number of recorded events matching `pred`.
    pub fn count(&self, pred: impl Fn(&PaintEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl MarkupHandler for TraceHandler {
    fn begin_page(&mut self, width: f64, height: f64) {
        self.events.push(PaintEvent::BeginPage { width, height });
    }

    fn end_page(&mut self) {
        self.events.push(PaintEvent::EndPage);
    }

    fn gsave(&mut self, _gstate: &GState) {
        self.events.push(PaintEvent::Save);
    }

    fn grestore(&mut self, _gstate: &GState) {
        self.events.push(PaintEvent::Restore);
    }

    fn fill_path(&mut self, gstate: &GState, path: &Path) {
        self.events.push(PaintEvent::Fill {
            path: path.clone(),
            paint: PaintRecord::from(&gstate.fill),
            ctm: gstate.ctm,
            alpha: gstate.fill_alpha,
        });
    }

    fn stroke_path(&mut self, gstate: &GState, path: &Path) {
        self.events.push(PaintEvent::Stroke {
            path: path.clone(),
            paint: PaintRecord::from(&gstate.stroke),
            ctm: gstate.ctm,
            style: gstate.stroke_style().clone(),
        });
    }

    fn draw_image(&mut self, gstate: &GState, image: &Image, transform: Matrix) {
        self.events.push(PaintEvent::Image {
            width: image.width,
            height: image.height,
            inline: image.inline,
            ctm: gstate.ctm,
            transform,
        });
    }

    fn show_glyphs(&mut self, _gstate: &GState, run: &GlyphRun) {
        self.events.push(PaintEvent::Glyph {
            code: run.glyph.code,
            transform: run.transform,
        });
    }

    fn establish_clip(&mut self, path: &Path, even_odd: bool) {
        self.events.push(PaintEvent::Clip {
            path: path.clone(),
            even_odd,
        });
    }

    fn begin_tile(&mut self, cell: Rect, matrix: Matrix) {
        self.events.push(PaintEvent::BeginTile { cell, matrix });
    }

    /// Hands back the tile's ordinal as its surface.
    fn end_tile(&mut self) -> Option<TileSurface> {
        self.events.push(PaintEvent::EndTile);
        self.tiles += 1;
        Some(Arc::new(self.tiles))
    }

    fn unknown_operator(&mut self, op: &str) {
        self.events.push(PaintEvent::UnknownOperator { op: op.to_string() });
    }
}
