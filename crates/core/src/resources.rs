//! Named resources: the resolver contract, its scope stack, and a map
//! based resolver.
//!
//! The interpreter never parses documents. Everything a content program
//! names (fonts, images, forms, patterns, shadings, parameter dictionaries,
//! color spaces) is handed over by a [`ResourceResolver`].

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::error::{ContentError, Result};
use crate::model::{Color, ColorSpace, Dict, Object};
use crate::utils::{MATRIX_IDENTITY, Matrix, Rect};

/// One decoded glyph of a shown string.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Glyph {
    /// Character code as found in the string
    pub code: u32,
    /// Horizontal advance in thousandths of text space
    pub width: f64,
    /// True when the code was encoded in a single byte
    pub single_byte: bool,
}

impl Glyph {
    /// Word spacing applies only to the single-byte code 32.
    pub fn is_word_space(&self) -> bool {
        self.single_byte && self.code == 32
    }
}

/// Font collaborator: decodes string bytes into glyphs with widths.
pub trait Font: Send + Sync + fmt::Debug {
    /// Resource or base font name.
    fn name(&self) -> &str;

    /// Decode shown bytes into glyphs.
    fn decode(&self, bytes: &[u8]) -> Vec<Glyph>;
}

/// Single-byte font with a width table.
#[derive(Debug, Clone)]
pub struct SimpleFont {
    name: SmolStr,
    widths: FxHashMap<u8, f64>,
    default_width: f64,
}

impl SimpleFont {
    pub fn new(name: &str) -> Self {
        Self {
            name: SmolStr::new(name),
            widths: FxHashMap::default(),
            default_width: 0.0,
        }
    }

    pub fn with_default_width(mut self, width: f64) -> Self {
        self.default_width = width;
        self
    }

    pub fn with_width(mut self, code: u8, width: f64) -> Self {
        self.widths.insert(code, width);
        self
    }
}

impl Font for SimpleFont {
    fn name(&self) -> &str {
        &self.name
    }

    fn decode(&self, bytes: &[u8]) -> Vec<Glyph> {
        bytes
            .iter()
            .map(|&b| Glyph {
                code: u32::from(b),
                width: self.widths.get(&b).copied().unwrap_or(self.default_width),
                single_byte: true,
            })
            .collect()
    }
}

/// Raster image descriptor. Pixel decoding is left to the handler.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub bits_per_component: u32,
    pub color_space: Option<ColorSpace>,
    pub image_mask: bool,
    pub filters: Vec<SmolStr>,
    pub data: Bytes,
    /// Set for images embedded with `BI ... ID ... EI`
    pub inline: bool,
}

impl Image {
    /// Build an image descriptor from an expanded inline image dictionary.
    pub fn from_inline(dict: &Dict, data: &[u8]) -> Result<Self> {
        let dim = |key: &str| {
            dict.get(key)
                .and_then(Object::as_num)
                .filter(|v| *v >= 1.0)
                .map(|v| v as u32)
                .ok_or_else(|| ContentError::InvalidInlineImage(format!("missing {key}")))
        };
        let width = dim("Width")?;
        let height = dim("Height")?;
        let image_mask = dict
            .get("ImageMask")
            .and_then(Object::as_bool)
            .unwrap_or(false);
        let bits_per_component = dict
            .get("BitsPerComponent")
            .and_then(Object::as_num)
            .map(|v| v as u32)
            .unwrap_or(if image_mask { 1 } else { 8 });
        let color_space = dict
            .get("ColorSpace")
            .and_then(Object::as_name)
            .and_then(ColorSpace::predefined);
        let filters = match dict.get("Filter") {
            Some(Object::Name(n)) => vec![n.clone()],
            Some(Object::Array(arr)) => arr
                .iter()
                .filter_map(|f| f.as_name().map(SmolStr::new))
                .collect(),
            _ => Vec::new(),
        };
        Ok(Self {
            width,
            height,
            bits_per_component,
            color_space,
            image_mask,
            filters,
            data: Bytes::copy_from_slice(data),
            inline: true,
        })
    }
}

/// Reusable content block (form XObject).
#[derive(Debug, Clone)]
pub struct FormXObject {
    /// Identity used for recursion detection
    pub id: u64,
    pub bbox: Rect,
    pub matrix: Matrix,
    /// Content bytes, still encoded; see [`ResourceResolver::decode_stream`]
    pub content: Bytes,
    /// Own resource scope, if the form declares one
    pub resources: Option<Arc<dyn ResourceResolver>>,
}

/// External object named by `Do`.
#[derive(Debug, Clone)]
pub enum XObject {
    Image(Arc<Image>),
    Form(Arc<FormXObject>),
}

/// Tiling pattern paint type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintType {
    /// Content carries its own colors
    Colored,
    /// Content is a stencil tinted at reference time
    Uncolored,
}

/// Tiling pattern resource.
#[derive(Debug, Clone)]
pub struct TilingPattern {
    /// Identity used as the tile cache key
    pub id: u64,
    pub paint_type: PaintType,
    pub bbox: Rect,
    pub xstep: f64,
    pub ystep: f64,
    pub matrix: Matrix,
    pub content: Bytes,
    pub resources: Option<Arc<dyn ResourceResolver>>,
}

/// Smooth shading resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Shading {
    pub shading_type: i32,
    pub color_space: ColorSpace,
    /// Declared extent in shading space
    pub bbox: Option<Rect>,
    pub background: Option<Color>,
}

/// Pattern resource named by `scn`/`SCN`.
#[derive(Debug, Clone)]
pub enum Pattern {
    Tiling(Arc<TilingPattern>),
    Shading {
        shading: Arc<Shading>,
        matrix: Matrix,
    },
}

/// Resolves resource names for one scope.
///
/// Every lookup defaults to "not found" so resolvers implement only the
/// categories they carry.
pub trait ResourceResolver: fmt::Debug {
    fn font(&self, _name: &str) -> Option<Arc<dyn Font>> {
        None
    }

    fn xobject(&self, _name: &str) -> Option<XObject> {
        None
    }

    fn pattern(&self, _name: &str) -> Option<Pattern> {
        None
    }

    fn shading(&self, _name: &str) -> Option<Arc<Shading>> {
        None
    }

    fn ext_gstate(&self, _name: &str) -> Option<Arc<Dict>> {
        None
    }

    fn color_space(&self, _name: &str) -> Option<ColorSpace> {
        None
    }

    /// Decode a content stream's raw bytes (filters, decryption).
    fn decode_stream(&self, raw: &Bytes) -> Result<Bytes> {
        Ok(raw.clone())
    }

    /// Turn an inline image dictionary and its raw data into an image.
    fn decode_inline_image(&self, dict: &Dict, data: &[u8]) -> Result<Image> {
        Image::from_inline(dict, data)
    }
}

/// Stack of resource scopes, innermost last.
///
/// Lookups walk from the innermost scope outwards so nested programs can
/// shadow names while still reaching outer resources.
#[derive(Debug, Clone, Default)]
pub struct ResourceStack {
    scopes: Vec<Arc<dyn ResourceResolver>>,
}

macro_rules! lookup {
    ($self:ident, $method:ident, $name:ident, $kind:literal) => {
        $self
            .scopes
            .iter()
            .rev()
            .find_map(|scope| scope.$method($name))
            .ok_or_else(|| ContentError::MissingResource {
                kind: $kind,
                name: $name.to_string(),
            })
    };
}

impl ResourceStack {
    pub fn new(root: Arc<dyn ResourceResolver>) -> Self {
        Self { scopes: vec![root] }
    }

    pub fn push(&mut self, scope: Arc<dyn ResourceResolver>) {
        self.scopes.push(scope);
    }

    pub fn pop(&mut self) -> Option<Arc<dyn ResourceResolver>> {
        self.scopes.pop()
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn truncate(&mut self, depth: usize) {
        self.scopes.truncate(depth);
    }

    fn innermost(&self) -> Option<&Arc<dyn ResourceResolver>> {
        self.scopes.last()
    }

    pub fn font(&self, name: &str) -> Result<Arc<dyn Font>> {
        lookup!(self, font, name, "font")
    }

    pub fn xobject(&self, name: &str) -> Result<XObject> {
        lookup!(self, xobject, name, "xobject")
    }

    pub fn pattern(&self, name: &str) -> Result<Pattern> {
        lookup!(self, pattern, name, "pattern")
    }

    pub fn shading(&self, name: &str) -> Result<Arc<Shading>> {
        lookup!(self, shading, name, "shading")
    }

    pub fn ext_gstate(&self, name: &str) -> Result<Arc<Dict>> {
        lookup!(self, ext_gstate, name, "ext_gstate")
    }

    pub fn color_space(&self, name: &str) -> Result<ColorSpace> {
        lookup!(self, color_space, name, "color_space")
    }

    pub fn decode_stream(&self, raw: &Bytes) -> Result<Bytes> {
        match self.innermost() {
            Some(scope) => scope.decode_stream(raw),
            None => Ok(raw.clone()),
        }
    }

    pub fn decode_inline_image(&self, dict: &Dict, data: &[u8]) -> Result<Image> {
        match self.innermost() {
            Some(scope) => scope.decode_inline_image(dict, data),
            None => Image::from_inline(dict, data),
        }
    }
}

/// Resolver backed by in-memory maps.
#[derive(Debug, Clone, Default)]
pub struct ResourceMap {
    fonts: FxHashMap<SmolStr, Arc<dyn Font>>,
    xobjects: FxHashMap<SmolStr, XObject>,
    patterns: FxHashMap<SmolStr, Pattern>,
    shadings: FxHashMap<SmolStr, Arc<Shading>>,
    ext_gstates: FxHashMap<SmolStr, Arc<Dict>>,
    color_spaces: FxHashMap<SmolStr, ColorSpace>,
}

impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font(mut self, name: &str, font: Arc<dyn Font>) -> Self {
        self.fonts.insert(SmolStr::new(name), font);
        self
    }

    pub fn with_image(mut self, name: &str, image: Image) -> Self {
        self.xobjects
            .insert(SmolStr::new(name), XObject::Image(Arc::new(image)));
        self
    }

    pub fn with_form(mut self, name: &str, form: FormXObject) -> Self {
        self.xobjects
            .insert(SmolStr::new(name), XObject::Form(Arc::new(form)));
        self
    }

    pub fn with_tiling_pattern(mut self, name: &str, pattern: TilingPattern) -> Self {
        self.patterns
            .insert(SmolStr::new(name), Pattern::Tiling(Arc::new(pattern)));
        self
    }

    pub fn with_shading_pattern(mut self, name: &str, shading: Shading, matrix: Matrix) -> Self {
        self.patterns.insert(
            SmolStr::new(name),
            Pattern::Shading {
                shading: Arc::new(shading),
                matrix,
            },
        );
        self
    }

    pub fn with_shading(mut self, name: &str, shading: Shading) -> Self {
        self.shadings.insert(SmolStr::new(name), Arc::new(shading));
        self
    }

    pub fn with_ext_gstate(mut self, name: &str, dict: Dict) -> Self {
        self.ext_gstates.insert(SmolStr::new(name), Arc::new(dict));
        self
    }

    pub fn with_color_space(mut self, name: &str, space: ColorSpace) -> Self {
        self.color_spaces.insert(SmolStr::new(name), space);
        self
    }
}

impl ResourceResolver for ResourceMap {
    fn font(&self, name: &str) -> Option<Arc<dyn Font>> {
        self.fonts.get(name).cloned()
    }

    fn xobject(&self, name: &str) -> Option<XObject> {
        self.xobjects.get(name).cloned()
    }

    fn pattern(&self, name: &str) -> Option<Pattern> {
        self.patterns.get(name).cloned()
    }

    fn shading(&self, name: &str) -> Option<Arc<Shading>> {
        self.shadings.get(name).cloned()
    }

    fn ext_gstate(&self, name: &str) -> Option<Arc<Dict>> {
        self.ext_gstates.get(name).cloned()
    }

    fn color_space(&self, name: &str) -> Option<ColorSpace> {
        self.color_spaces.get(name).cloned()
    }
}

impl FormXObject {
    pub fn new(id: u64, bbox: Rect, content: impl Into<Bytes>) -> Self {
        Self {
            id,
            bbox,
            matrix: MATRIX_IDENTITY,
            content: content.into(),
            resources: None,
        }
    }

    pub fn with_matrix(mut self, matrix: Matrix) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn with_resources(mut self, resources: Arc<dyn ResourceResolver>) -> Self {
        self.resources = Some(resources);
        self
    }
}

impl TilingPattern {
    pub fn new(id: u64, paint_type: PaintType, bbox: Rect, content: impl Into<Bytes>) -> Self {
        Self {
            id,
            paint_type,
            bbox,
            xstep: bbox.2 - bbox.0,
            ystep: bbox.3 - bbox.1,
            matrix: MATRIX_IDENTITY,
            content: content.into(),
            resources: None,
        }
    }

    pub fn with_matrix(mut self, matrix: Matrix) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn with_resources(mut self, resources: Arc<dyn ResourceResolver>) -> Self {
        self.resources = Some(resources);
        self
    }
}
