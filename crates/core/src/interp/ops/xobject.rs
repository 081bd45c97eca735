//! XObject, inline image and shading operators.
//!
//! Handles: Do, BI (with its ID data), sh
//!
//! XObjects:
//! - Do: Invoke named XObject (Form or Image)
//!
//! Inline images:
//! - BI: Collect the abbreviated image dictionary up to the data token the
//!   lexer produced for `ID ... EI`
//!
//! Shadings:
//! - sh: Fill the current clip (or the shading's extent) with a shading

use std::collections::HashMap;
use std::sync::LazyLock;

use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::error::{ContentError, Result};
use crate::interp::device::MarkupHandler;
use crate::interp::interpreter::{Frame, Interpreter};
use crate::model::{Dict, Object, Paint, Path};
use crate::parser::{Program, Token};
use crate::resources::{Image, XObject};
use crate::utils::{Matrix, apply_matrix_rect, invert_matrix};

/// Inline image dictionary key abbreviations.
static INLINE_IMAGE_KEYS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("BPC", "BitsPerComponent"),
        ("CS", "ColorSpace"),
        ("D", "Decode"),
        ("DP", "DecodeParms"),
        ("F", "Filter"),
        ("H", "Height"),
        ("IM", "ImageMask"),
        ("I", "Interpolate"),
        ("W", "Width"),
    ])
});

/// Abbreviated values of the inline image `ColorSpace` and `Filter` keys.
static INLINE_IMAGE_VALUES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("G", "DeviceGray"),
        ("RGB", "DeviceRGB"),
        ("CMYK", "DeviceCMYK"),
        ("I", "Indexed"),
        ("AHx", "ASCIIHexDecode"),
        ("A85", "ASCII85Decode"),
        ("LZW", "LZWDecode"),
        ("Fl", "FlateDecode"),
        ("RL", "RunLengthDecode"),
        ("CCF", "CCITTFaxDecode"),
        ("DCT", "DCTDecode"),
    ])
});

fn invalid(msg: impl Into<String>) -> ContentError {
    ContentError::InvalidInlineImage(msg.into())
}

fn expand_value(value: Object) -> Object {
    match value {
        Object::Name(n) => match INLINE_IMAGE_VALUES.get(n.as_str()) {
            Some(full) => Object::Name(SmolStr::new_static(*full)),
            None => Object::Name(n),
        },
        Object::Array(items) => Object::Array(items.into_iter().map(expand_value).collect()),
        other => other,
    }
}

/// Parse one object starting at `tokens[*next]`.
fn parse_object(program: &Program, tokens: &[Token], next: &mut usize) -> Result<Object> {
    let token = tokens
        .get(*next)
        .ok_or_else(|| invalid("dictionary ends without a value"))?;
    *next += 1;
    Ok(match token {
        Token::Number(n) => Object::Number(*n),
        Token::Boolean(b) => Object::Bool(*b),
        Token::Name(span) => Object::Name(SmolStr::new(program.name_str(*span))),
        Token::String(span) => Object::String(program.decoded(*span).to_vec()),
        Token::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            let mut i = 0;
            while i < items.len() {
                out.push(parse_object(program, items, &mut i)?);
            }
            Object::Array(out)
        }
        Token::DictOpen => Object::Dict(parse_dict(program, tokens, next)?),
        other => return Err(invalid(format!("unexpected {other:?} in image dictionary"))),
    })
}

/// Parse `name value` pairs up to the closing `>>`.
fn parse_dict(program: &Program, tokens: &[Token], next: &mut usize) -> Result<Dict> {
    let mut dict = Dict::new();
    loop {
        match tokens.get(*next) {
            Some(Token::DictClose) => {
                *next += 1;
                return Ok(dict);
            }
            Some(Token::Name(span)) => {
                *next += 1;
                let key = SmolStr::new(program.name_str(*span));
                let value = parse_object(program, tokens, next)?;
                dict.insert(key, value);
            }
            Some(other) => return Err(invalid(format!("expected a key, found {other:?}"))),
            None => return Err(invalid("unterminated nested dictionary")),
        }
    }
}

/// Maps image space (w x h pixels, top row first) onto the unit square.
pub(crate) fn image_matrix(image: &Image) -> Matrix {
    (
        1.0 / f64::from(image.width.max(1)),
        0.0,
        0.0,
        -1.0 / f64::from(image.height.max(1)),
        0.0,
        1.0,
    )
}

#[allow(non_snake_case)]
impl<'a, H: MarkupHandler> Interpreter<'a, H> {
    // ========================================================================
    // XObject Operators
    // ========================================================================

    /// Do - Invoke named XObject (images or form XObjects).
    ///
    /// A form already executing further up is skipped. Failures inside a
    /// form's own content are logged and do not abort the caller.
    ///
    /// PDF operator: `Do`
    pub(crate) fn do_Do(&mut self, name: &str) -> Result<()> {
        match self.resources.xobject(name)? {
            XObject::Image(image) => {
                debug!(xobject = name, width = image.width, height = image.height, "draw image");
                self.draw_image(&image);
            }
            XObject::Form(form) => {
                if self.form_stack.contains(&form.id) {
                    warn!(xobject = name, id = form.id, "skip recursive form XObject");
                    return Ok(());
                }
                debug!(xobject = name, id = form.id, "run form XObject");
                self.form_stack.push(form.id);
                let result = self.execute_sub_program(
                    &form.content,
                    form.matrix,
                    Some(form.bbox),
                    form.resources.clone(),
                );
                self.form_stack.pop();
                if let Err(e) = result {
                    warn!(xobject = name, error = %e, "form XObject aborted");
                }
            }
        }
        Ok(())
    }

    pub(crate) fn draw_image(&mut self, image: &Image) {
        let transform = image_matrix(image);
        self.handler
            .draw_image(self.gstack.current(), image, transform);
    }

    // ========================================================================
    // Inline Images
    // ========================================================================

    /// BI - Read the inline image dictionary and its data, then draw it.
    ///
    /// Consumes tokens from `*next` through the image data token.
    pub(crate) fn do_BI(&mut self, frame: &mut Frame<'_>, next: &mut usize) -> Result<()> {
        let program = frame.program;
        let tokens = program.tokens();
        let mut dict = Dict::new();

        let data = loop {
            let token = tokens
                .get(*next)
                .ok_or_else(|| invalid("missing image data"))?;
            *next += 1;
            match token {
                Token::InlineImageData(span) => break program.raw(*span),
                Token::Name(span) => {
                    let key = program.name_str(*span);
                    let key = INLINE_IMAGE_KEYS
                        .get(key.as_ref())
                        .map_or_else(|| SmolStr::new(&key), |full| SmolStr::new_static(*full));
                    let mut value = parse_object(program, tokens, next)?;
                    if key == "ColorSpace" || key == "Filter" {
                        value = expand_value(value);
                    }
                    dict.insert(key, value);
                }
                other => return Err(invalid(format!("unexpected {other:?} before image data"))),
            }
        };
        dict.insert(
            SmolStr::new_static("Subtype"),
            Object::Name(SmolStr::new_static("Image")),
        );

        let image = self.resources.decode_inline_image(&dict, data)?;
        debug!(width = image.width, height = image.height, bytes = data.len(), "draw inline image");
        self.draw_image(&image);
        Ok(())
    }

    // ========================================================================
    // Shading
    // ========================================================================

    /// sh - Paint a shading over the current clip.
    ///
    /// The painted region is the shading's own extent when declared,
    /// otherwise the current clip path (or the page) mapped back into
    /// user space.
    ///
    /// PDF operator: `sh`
    pub(crate) fn do_sh(&mut self, frame: &mut Frame<'_>, name: &str) -> Result<()> {
        let shading = self.resources.shading(name)?;
        let gs = self.gstack.current();
        let region = match shading.bbox {
            Some(bbox) => Path::from_bbox(bbox),
            None => {
                let inverse =
                    invert_matrix(gs.ctm).ok_or(ContentError::NonInvertibleTransform(gs.ctm))?;
                match &gs.clip {
                    Some(clip) => clip.transformed(inverse),
                    None => Path::from_bbox(apply_matrix_rect(inverse, self.page_bounds)),
                }
            }
        };

        let mut painted = gs.clone();
        painted.fill_space = shading.color_space.clone();
        painted.fill = Paint::Shading {
            shading,
            matrix: crate::utils::MATRIX_IDENTITY,
        };
        self.handler.fill_path(&painted, &region);
        self.end_path(frame);
        Ok(())
    }
}
