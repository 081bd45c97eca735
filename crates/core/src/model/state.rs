//! Graphics state and the save/restore stack.

use std::cell::OnceCell;
use std::sync::Arc;

use smallvec::SmallVec;

use super::color::{ColorSpace, Paint};
use super::path::Path;
use crate::error::{ContentError, Result};
use crate::resources::Font;
use crate::utils::{MATRIX_IDENTITY, Matrix, Point, Rect};

/// Line cap style (`J`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    ProjectingSquare,
}

impl LineCap {
    pub fn from_i32(v: i32) -> Option<Self> {
        match v {
            0 => Some(LineCap::Butt),
            1 => Some(LineCap::Round),
            2 => Some(LineCap::ProjectingSquare),
            _ => None,
        }
    }
}

/// Line join style (`j`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    pub fn from_i32(v: i32) -> Option<Self> {
        match v {
            0 => Some(LineJoin::Miter),
            1 => Some(LineJoin::Round),
            2 => Some(LineJoin::Bevel),
            _ => None,
        }
    }
}

/// Text rendering mode (`Tr`). Modes 4-7 add the glyphs to the clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TextRenderMode {
    #[default]
    Fill,
    Stroke,
    FillStroke,
    Invisible,
    FillClip,
    StrokeClip,
    FillStrokeClip,
    Clip,
}

impl TextRenderMode {
    pub fn from_i32(v: i32) -> Option<Self> {
        Some(match v {
            0 => TextRenderMode::Fill,
            1 => TextRenderMode::Stroke,
            2 => TextRenderMode::FillStroke,
            3 => TextRenderMode::Invisible,
            4 => TextRenderMode::FillClip,
            5 => TextRenderMode::StrokeClip,
            6 => TextRenderMode::FillStrokeClip,
            7 => TextRenderMode::Clip,
            _ => return None,
        })
    }
}

/// Color rendering intent (`ri`, ExtGState `RI`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RenderingIntent {
    AbsoluteColorimetric,
    #[default]
    RelativeColorimetric,
    Saturation,
    Perceptual,
}

impl RenderingIntent {
    /// Unrecognized names fall back to RelativeColorimetric.
    pub fn from_name(name: &str) -> Self {
        match name {
            "AbsoluteColorimetric" => RenderingIntent::AbsoluteColorimetric,
            "Saturation" => RenderingIntent::Saturation,
            "Perceptual" => RenderingIntent::Perceptual,
            _ => RenderingIntent::RelativeColorimetric,
        }
    }
}

/// Separable and non-separable blend modes (ExtGState `BM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
}

impl BlendMode {
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Normal" | "Compatible" => BlendMode::Normal,
            "Multiply" => BlendMode::Multiply,
            "Screen" => BlendMode::Screen,
            "Overlay" => BlendMode::Overlay,
            "Darken" => BlendMode::Darken,
            "Lighten" => BlendMode::Lighten,
            "ColorDodge" => BlendMode::ColorDodge,
            "ColorBurn" => BlendMode::ColorBurn,
            "HardLight" => BlendMode::HardLight,
            "SoftLight" => BlendMode::SoftLight,
            "Difference" => BlendMode::Difference,
            "Exclusion" => BlendMode::Exclusion,
            "Hue" => BlendMode::Hue,
            "Saturation" => BlendMode::Saturation,
            "Color" => BlendMode::Color,
            "Luminosity" => BlendMode::Luminosity,
            _ => return None,
        })
    }
}

/// Blend mode and constant alpha applied when painting.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Composite {
    pub blend_mode: BlendMode,
    pub alpha: f64,
    pub alpha_is_shape: bool,
}

/// Stroke parameters realized for a backend.
///
/// Negative widths become zero, a dash array whose entries are all zero
/// (or any negative) means a solid line, and the miter limit is at least 1.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StrokeStyle {
    pub width: f64,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f64,
    pub dash: Option<(SmallVec<[f64; 4]>, f64)>,
}

/// Graphics state.
///
/// A complete snapshot: cloning it and later restoring the clone
/// reproduces identical paint behavior. Paint and font handles are shared
/// by reference; the transform, current point and clip are plain values.
#[derive(Debug, Clone)]
pub struct GState {
    /// Current transformation matrix (user space to device space)
    pub ctm: Matrix,
    /// Current point in user space
    pub current_point: Option<Point>,

    pub fill: Paint,
    pub fill_space: ColorSpace,
    pub fill_alpha: f64,
    pub stroke: Paint,
    pub stroke_space: ColorSpace,
    pub stroke_alpha: f64,
    pub blend_mode: BlendMode,
    pub alpha_is_shape: bool,

    line_width: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    miter_limit: f64,
    dash: SmallVec<[f64; 4]>,
    dash_phase: f64,
    pub flatness: f64,

    /// Most recent clip path in device space, `None` when unclipped
    pub clip: Option<Path>,
    /// Intersection of the bounds of every clip established so far
    pub clip_bounds: Option<Rect>,

    pub font: Option<Arc<dyn Font>>,
    pub font_size: f64,
    pub char_spacing: f64,
    pub word_spacing: f64,
    pub leading: f64,
    pub rise: f64,
    /// Horizontal scale as a fraction (1.0 = 100%)
    pub horizontal_scale: f64,
    pub render_mode: TextRenderMode,
    pub knockout: bool,

    pub rendering_intent: RenderingIntent,

    stroke_style: OnceCell<StrokeStyle>,
}

impl Default for GState {
    fn default() -> Self {
        Self {
            ctm: MATRIX_IDENTITY,
            current_point: None,
            fill: Paint::default(),
            fill_space: ColorSpace::default(),
            fill_alpha: 1.0,
            stroke: Paint::default(),
            stroke_space: ColorSpace::default(),
            stroke_alpha: 1.0,
            blend_mode: BlendMode::Normal,
            alpha_is_shape: false,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 10.0,
            dash: SmallVec::new(),
            dash_phase: 0.0,
            flatness: 0.0,
            clip: None,
            clip_bounds: None,
            font: None,
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            leading: 0.0,
            rise: 0.0,
            horizontal_scale: 1.0,
            render_mode: TextRenderMode::Fill,
            knockout: true,
            rendering_intent: RenderingIntent::RelativeColorimetric,
            stroke_style: OnceCell::new(),
        }
    }
}

impl GState {
    pub fn new(ctm: Matrix) -> Self {
        Self {
            ctm,
            ..Self::default()
        }
    }

    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    pub fn line_cap(&self) -> LineCap {
        self.line_cap
    }

    pub fn line_join(&self) -> LineJoin {
        self.line_join
    }

    pub fn miter_limit(&self) -> f64 {
        self.miter_limit
    }

    pub fn dash(&self) -> (&[f64], f64) {
        (&self.dash, self.dash_phase)
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
        self.stroke_style.take();
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.line_cap = cap;
        self.stroke_style.take();
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.line_join = join;
        self.stroke_style.take();
    }

    pub fn set_miter_limit(&mut self, limit: f64) {
        self.miter_limit = limit;
        self.stroke_style.take();
    }

    pub fn set_dash(&mut self, dash: impl IntoIterator<Item = f64>, phase: f64) {
        self.dash = dash.into_iter().collect();
        self.dash_phase = phase;
        self.stroke_style.take();
    }

    /// Realized stroke, computed on first use after a geometry change.
    pub fn stroke_style(&self) -> &StrokeStyle {
        self.stroke_style.get_or_init(|| {
            let solid = self.dash.is_empty()
                || self.dash.iter().any(|d| *d < 0.0)
                || self.dash.iter().all(|d| *d == 0.0);
            StrokeStyle {
                width: self.line_width.max(0.0),
                cap: self.line_cap,
                join: self.line_join,
                miter_limit: self.miter_limit.max(1.0),
                dash: (!solid).then(|| (self.dash.clone(), self.dash_phase)),
            }
        })
    }

    /// True once the realized stroke has been computed and not invalidated.
    pub fn has_realized_stroke(&self) -> bool {
        self.stroke_style.get().is_some()
    }

    pub fn fill_composite(&self) -> Composite {
        Composite {
            blend_mode: self.blend_mode,
            alpha: self.fill_alpha,
            alpha_is_shape: self.alpha_is_shape,
        }
    }

    pub fn stroke_composite(&self) -> Composite {
        Composite {
            blend_mode: self.blend_mode,
            alpha: self.stroke_alpha,
            alpha_is_shape: self.alpha_is_shape,
        }
    }

    pub fn font_name(&self) -> Option<&str> {
        self.font.as_deref().map(|f| f.name())
    }
}

impl PartialEq for GState {
    fn eq(&self, other: &Self) -> bool {
        let same_font = match (&self.font, &other.font) {
            (Some(a), Some(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
            (None, None) => true,
            _ => false,
        };
        same_font
            && self.ctm == other.ctm
            && self.current_point == other.current_point
            && self.fill == other.fill
            && self.fill_space == other.fill_space
            && self.fill_alpha == other.fill_alpha
            && self.stroke == other.stroke
            && self.stroke_space == other.stroke_space
            && self.stroke_alpha == other.stroke_alpha
            && self.blend_mode == other.blend_mode
            && self.alpha_is_shape == other.alpha_is_shape
            && self.line_width == other.line_width
            && self.line_cap == other.line_cap
            && self.line_join == other.line_join
            && self.miter_limit == other.miter_limit
            && self.dash == other.dash
            && self.dash_phase == other.dash_phase
            && self.flatness == other.flatness
            && self.clip == other.clip
            && self.clip_bounds == other.clip_bounds
            && self.font_size == other.font_size
            && self.char_spacing == other.char_spacing
            && self.word_spacing == other.word_spacing
            && self.leading == other.leading
            && self.rise == other.rise
            && self.horizontal_scale == other.horizontal_scale
            && self.render_mode == other.render_mode
            && self.knockout == other.knockout
            && self.rendering_intent == other.rendering_intent
    }
}

/// Graphics state stack. Never empty: the root state cannot be popped.
#[derive(Debug, Clone)]
pub struct GStateStack {
    stack: Vec<GState>,
}

impl GStateStack {
    pub fn new(root: GState) -> Self {
        Self { stack: vec![root] }
    }

    pub fn current(&self) -> &GState {
        // The root is never popped.
        &self.stack[self.stack.len() - 1]
    }

    pub fn current_mut(&mut self) -> &mut GState {
        let top = self.stack.len() - 1;
        &mut self.stack[top]
    }

    /// Push a clone of the current state.
    pub fn save(&mut self) {
        let top = self.current().clone();
        self.stack.push(top);
    }

    /// Pop the current state, returning to the one saved before it.
    pub fn restore(&mut self) -> Result<()> {
        if self.stack.len() <= 1 {
            return Err(ContentError::StackUnderflow);
        }
        self.stack.pop();
        Ok(())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Drop every state above `depth`.
    pub fn truncate(&mut self, depth: usize) {
        self.stack.truncate(depth.max(1));
    }
}

impl Default for GStateStack {
    fn default() -> Self {
        Self::new(GState::default())
    }
}
