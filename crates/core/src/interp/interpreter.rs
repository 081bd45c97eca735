//! Page interpreter - executes content-stream operators.
//!
//! Tokens are consumed once, in order. Operands accumulate on the frame's
//! operand stack and each operator pops its fixed arity from the top; the
//! stack is cleared after every operator whether or not it succeeded.

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use super::device::MarkupHandler;
use super::text::TextObject;
use crate::config::InterpreterConfig;
use crate::error::{ContentError, Result};
use crate::model::{GState, GStateStack, Path, TileImage};
use crate::parser::{Lexer, Operator, Program, Token};
use crate::resources::{ResourceResolver, ResourceStack};
use crate::utils::{Matrix, Rect, intersect_rect, normalize_rect};

/// Key of the per-page tile cache: pattern id plus tint bits, the latter
/// empty unless tints are part of the key.
pub(crate) type TileKey = (u64, SmallVec<[u64; 4]>);

/// A page to render.
#[derive(Debug, Clone)]
pub struct Page {
    pub media_box: Rect,
    /// Visible region; intersected with the media box when present
    pub crop_box: Option<Rect>,
    /// Clockwise rotation in degrees, a multiple of 90
    pub rotate: i32,
    /// Content stream bytes, still encoded
    pub content: Bytes,
    pub resources: Arc<dyn ResourceResolver>,
}

impl Page {
    pub fn new(
        media_box: Rect,
        content: impl Into<Bytes>,
        resources: Arc<dyn ResourceResolver>,
    ) -> Self {
        Self {
            media_box,
            crop_box: None,
            rotate: 0,
            content: content.into(),
            resources,
        }
    }

    pub fn with_crop_box(mut self, crop_box: Rect) -> Self {
        self.crop_box = Some(crop_box);
        self
    }

    pub fn with_rotate(mut self, rotate: i32) -> Self {
        self.rotate = rotate;
        self
    }

    /// Media box clipped by the crop box.
    pub fn bounds(&self) -> Rect {
        let media = normalize_rect(self.media_box);
        match self.crop_box {
            Some(crop) => intersect_rect(media, normalize_rect(crop)),
            None => media,
        }
    }
}

/// Per-program interpretation state.
///
/// Everything here belongs to one content program and is never shared
/// with nested programs: each gets a fresh frame.
pub(crate) struct Frame<'p> {
    pub(crate) program: &'p Program,
    pub(crate) operands: SmallVec<[&'p Token; 8]>,
    /// Path under construction; created by the first construction operator
    pub(crate) path: Option<Path>,
    /// Clip requested by W/W*, applied after the next painting operator
    pub(crate) pending_clip: Option<Path>,
    /// Open BX sections
    pub(crate) compat_depth: usize,
    pub(crate) text: TextObject,
    /// Graphics state depth when the program started; Q may not go below it
    pub(crate) gstack_base: usize,
}

impl<'p> Frame<'p> {
    pub(crate) fn new(program: &'p Program, gstack_base: usize) -> Self {
        Self {
            program,
            operands: SmallVec::new(),
            path: None,
            pending_clip: None,
            compat_depth: 0,
            text: TextObject::new(),
            gstack_base,
        }
    }

    fn require(&self, op: &Operator, expected: usize) -> Result<()> {
        if self.operands.len() < expected {
            return Err(ContentError::MissingOperands {
                op: op.to_string(),
                expected,
                found: self.operands.len(),
            });
        }
        Ok(())
    }

    fn pop(&mut self, op: &Operator) -> Result<&'p Token> {
        self.require(op, 1)?;
        self.operands.pop().ok_or(ContentError::MissingOperands {
            op: op.to_string(),
            expected: 1,
            found: 0,
        })
    }

    fn type_error(op: &Operator, expected: &'static str) -> ContentError {
        ContentError::OperandType {
            op: op.to_string(),
            expected,
        }
    }

    pub(crate) fn pop_number(&mut self, op: &Operator) -> Result<f64> {
        self.pop(op)?
            .as_number()
            .ok_or_else(|| Self::type_error(op, "number"))
    }

    pub(crate) fn pop_int(&mut self, op: &Operator) -> Result<i32> {
        self.pop_number(op).map(|n| n as i32)
    }

    /// Pop `N` numbers, returned in stream order.
    pub(crate) fn pop_numbers<const N: usize>(&mut self, op: &Operator) -> Result<[f64; N]> {
        self.require(op, N)?;
        let mut out = [0.0; N];
        for slot in out.iter_mut().rev() {
            *slot = self.pop_number(op)?;
        }
        Ok(out)
    }

    /// Pop `n` numbers, returned in stream order.
    pub(crate) fn pop_n_numbers(&mut self, op: &Operator, n: usize) -> Result<SmallVec<[f64; 4]>> {
        self.require(op, n)?;
        let mut out: SmallVec<[f64; 4]> = SmallVec::from_elem(0.0, n);
        for slot in out.iter_mut().rev() {
            *slot = self.pop_number(op)?;
        }
        Ok(out)
    }

    pub(crate) fn pop_point(&mut self, op: &Operator) -> Result<(f64, f64)> {
        let [x, y] = self.pop_numbers(op)?;
        Ok((x, y))
    }

    pub(crate) fn pop_matrix(&mut self, op: &Operator) -> Result<Matrix> {
        let [a, b, c, d, e, f] = self.pop_numbers(op)?;
        Ok((a, b, c, d, e, f))
    }

    pub(crate) fn pop_name(&mut self, op: &Operator) -> Result<Cow<'p, str>> {
        let program = self.program;
        match self.pop(op)? {
            Token::Name(span) => Ok(program.name_str(*span)),
            _ => Err(Self::type_error(op, "name")),
        }
    }

    pub(crate) fn pop_string(&mut self, op: &Operator) -> Result<&'p [u8]> {
        let program = self.program;
        match self.pop(op)? {
            Token::String(span) => Ok(program.decoded(*span)),
            _ => Err(Self::type_error(op, "string")),
        }
    }

    pub(crate) fn pop_array(&mut self, op: &Operator) -> Result<&'p [Token]> {
        match self.pop(op)? {
            Token::Array(items) => Ok(items),
            _ => Err(Self::type_error(op, "array")),
        }
    }

    /// Discard `n` operands of an operator whose operands are not used.
    fn discard(&mut self, op: &Operator, n: usize) -> Result<()> {
        self.require(op, n)?;
        let keep = self.operands.len() - n;
        self.operands.truncate(keep);
        Ok(())
    }
}

/// Content-stream interpreter bound to one markup handler.
///
/// Method names like `do_Q`, `do_S`, `do_B` use uppercase to match the
/// operator mnemonics (q/Q, s/S, b/B, etc.).
pub struct Interpreter<'a, H: MarkupHandler> {
    /// Output sink for paint calls
    pub(crate) handler: &'a mut H,
    /// Graphics state stack for q/Q operators
    pub(crate) gstack: GStateStack,
    /// Resource scopes, innermost last
    pub(crate) resources: ResourceStack,
    pub(crate) config: InterpreterConfig,
    pub(crate) lexer: Lexer,
    /// Page extent in device space
    pub(crate) page_bounds: Rect,
    /// Rendered tiles for the current page
    pub(crate) tile_cache: FxHashMap<TileKey, Arc<TileImage>>,
    /// Ids of form XObjects currently executing
    pub(crate) form_stack: Vec<u64>,
    /// Nesting depth of forms and tiles below the page program
    pub(crate) depth: usize,
}

impl<'a, H: MarkupHandler> Interpreter<'a, H> {
    /// Create an interpreter with default configuration.
    pub fn new(handler: &'a mut H, resources: Arc<dyn ResourceResolver>) -> Self {
        Self::with_config(handler, resources, InterpreterConfig::default())
    }

    pub fn with_config(
        handler: &'a mut H,
        resources: Arc<dyn ResourceResolver>,
        config: InterpreterConfig,
    ) -> Self {
        Self {
            handler,
            gstack: GStateStack::default(),
            resources: ResourceStack::new(resources),
            lexer: Lexer::with_options(config.lexer),
            config,
            page_bounds: (0.0, 0.0, 0.0, 0.0),
            tile_cache: FxHashMap::default(),
            form_stack: Vec::new(),
            depth: 0,
        }
    }

    /// Current graphics state (read-only).
    pub fn gstate(&self) -> &GState {
        self.gstack.current()
    }

    /// Number of states on the graphics state stack, root included.
    pub fn gstate_depth(&self) -> usize {
        self.gstack.depth()
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Number of distinct tiles rendered on the current page.
    pub fn cached_tiles(&self) -> usize {
        self.tile_cache.len()
    }

    // ========================================================================
    // Page Processing
    // ========================================================================

    /// Render one page.
    ///
    /// Sets up the root transform for the page's bounds and rotation,
    /// brackets the content with `begin_page`/`end_page` and interprets it.
    /// `end_page` is called even when interpretation fails; paint calls
    /// already issued stay issued.
    pub fn render_page(&mut self, page: &Page) -> Result<()> {
        let (x0, y0, x1, y1) = page.bounds();
        let rotate = page.rotate.rem_euclid(360);
        let ctm = match rotate {
            90 => (0.0, -1.0, 1.0, 0.0, -y0, x1),
            180 => (-1.0, 0.0, 0.0, -1.0, x1, y1),
            270 => (0.0, 1.0, -1.0, 0.0, y1, -x0),
            _ => (1.0, 0.0, 0.0, 1.0, -x0, -y0),
        };
        let (width, height) = if rotate == 90 || rotate == 270 {
            (y1 - y0, x1 - x0)
        } else {
            (x1 - x0, y1 - y0)
        };
        if rotate % 90 != 0 {
            warn!(rotate = page.rotate, "page rotation is not a multiple of 90, ignored");
        }

        self.page_bounds = (0.0, 0.0, width, height);
        self.gstack = GStateStack::new(GState::new(ctm));
        self.resources = ResourceStack::new(page.resources.clone());
        self.tile_cache.clear();
        self.form_stack.clear();
        self.depth = 0;

        debug!(width, height, rotate, "begin page");
        self.handler.begin_page(width, height);
        let result = self.execute(&page.content);
        self.handler.end_page();
        if let Err(e) = &result {
            warn!(error = %e, "page content aborted");
        }
        result
    }

    /// Decode, tokenize and run a content stream against the current state.
    pub fn execute(&mut self, content: &Bytes) -> Result<()> {
        let decoded = self.resources.decode_stream(content)?;
        let program = self.lexer.tokenize(decoded)?;
        self.run(&program)
    }

    /// Run an already tokenized program in a fresh frame.
    pub fn run(&mut self, program: &Program) -> Result<()> {
        let mut frame = Frame::new(program, self.gstack.depth());
        let tokens = program.tokens();
        let mut next = 0;

        while next < tokens.len() {
            let token = &tokens[next];
            next += 1;
            match token {
                Token::Operator(op) => {
                    let result = if *op == Operator::BI {
                        self.do_BI(&mut frame, &mut next)
                    } else {
                        self.dispatch_operator(&mut frame, op)
                    };
                    frame.operands.clear();
                    result?;
                }
                Token::InlineImageData(_) => {
                    warn!("inline image data without BI, skipped");
                    frame.operands.clear();
                }
                operand => frame.operands.push(operand),
            }
        }

        if frame.compat_depth > 0 {
            debug!(open = frame.compat_depth, "program ended inside BX section");
        }
        if frame.pending_clip.is_some() {
            debug!("program ended with a clip request but no painting operator");
        }
        Ok(())
    }

    fn dispatch_operator(&mut self, frame: &mut Frame<'_>, op: &Operator) -> Result<()> {
        trace!(op = %op, operands = frame.operands.len(), "dispatch");
        match op {
            // Graphics state operators
            Operator::Qq => self.do_q(),
            Operator::Q => self.do_Q(frame)?,
            Operator::Cm => {
                let m = frame.pop_matrix(op)?;
                self.do_cm(m);
            }
            Operator::Ww => {
                let w = frame.pop_number(op)?;
                self.do_w(w);
            }
            Operator::J => {
                let cap = frame.pop_int(op)?;
                self.do_J(cap);
            }
            Operator::Jj => {
                let join = frame.pop_int(op)?;
                self.do_j(join);
            }
            Operator::M => {
                let limit = frame.pop_number(op)?;
                self.do_M(limit);
            }
            Operator::D => {
                let phase = frame.pop_number(op)?;
                let arr = frame.pop_array(op)?;
                let dash: Vec<f64> = arr.iter().filter_map(Token::as_number).collect();
                self.do_d(&dash, phase);
            }
            Operator::Ri => {
                let intent = frame.pop_name(op)?;
                self.do_ri(&intent);
            }
            Operator::I => {
                let flatness = frame.pop_number(op)?;
                self.do_i(flatness);
            }
            Operator::Gs => {
                let name = frame.pop_name(op)?;
                self.do_gs(&name)?;
            }

            // Path construction operators
            Operator::Mm => {
                let (x, y) = frame.pop_point(op)?;
                self.do_m(frame, x, y);
            }
            Operator::L => {
                let (x, y) = frame.pop_point(op)?;
                self.do_l(frame, x, y);
            }
            Operator::C => {
                let [x1, y1, x2, y2, x3, y3] = frame.pop_numbers(op)?;
                self.do_c(frame, x1, y1, x2, y2, x3, y3);
            }
            Operator::V => {
                let [x2, y2, x3, y3] = frame.pop_numbers(op)?;
                self.do_v(frame, x2, y2, x3, y3);
            }
            Operator::Y => {
                let [x1, y1, x3, y3] = frame.pop_numbers(op)?;
                self.do_y(frame, x1, y1, x3, y3);
            }
            Operator::H => self.do_h(frame),
            Operator::Re => {
                let [x, y, w, h] = frame.pop_numbers(op)?;
                self.do_re(frame, x, y, w, h);
            }

            // Path painting operators
            Operator::S => self.do_S(frame),
            Operator::Ss => self.do_s(frame),
            Operator::F | Operator::Ff => self.do_f(frame),
            Operator::FStar | Operator::FFStar => self.do_f_star(frame),
            Operator::B => self.do_B(frame),
            Operator::BStar => self.do_B_star(frame),
            Operator::Bb => self.do_b(frame),
            Operator::BbStar => self.do_b_star(frame),
            Operator::N => self.do_n(frame),

            // Clipping path operators
            Operator::WClip => self.do_W(frame),
            Operator::WStar => self.do_W_star(frame),

            // Color operators
            Operator::CS => {
                let name = frame.pop_name(op)?;
                self.do_CS(&name)?;
            }
            Operator::Cs => {
                let name = frame.pop_name(op)?;
                self.do_cs(&name)?;
            }
            Operator::SC | Operator::SCN => self.do_SC(frame, op)?,
            Operator::Sc | Operator::Scn => self.do_sc(frame, op)?,
            Operator::G => {
                let gray = frame.pop_number(op)?;
                self.do_G(gray);
            }
            Operator::Gg => {
                let gray = frame.pop_number(op)?;
                self.do_g(gray);
            }
            Operator::RG => {
                let [r, g, b] = frame.pop_numbers(op)?;
                self.do_RG(r, g, b);
            }
            Operator::Rg => {
                let [r, g, b] = frame.pop_numbers(op)?;
                self.do_rg(r, g, b);
            }
            Operator::K => {
                let [c, m, y, k] = frame.pop_numbers(op)?;
                self.do_K(c, m, y, k);
            }
            Operator::Kk => {
                let [c, m, y, k] = frame.pop_numbers(op)?;
                self.do_k(c, m, y, k);
            }

            // Text object operators
            Operator::BT => self.do_BT(frame),
            Operator::ET => self.do_ET(frame),

            // Text state operators
            Operator::Tc => {
                let v = frame.pop_number(op)?;
                self.do_Tc(v);
            }
            Operator::Tw => {
                let v = frame.pop_number(op)?;
                self.do_Tw(v);
            }
            Operator::Tz => {
                let v = frame.pop_number(op)?;
                self.do_Tz(v);
            }
            Operator::TL => {
                let v = frame.pop_number(op)?;
                self.do_TL(v);
            }
            Operator::Tf => {
                let size = frame.pop_number(op)?;
                let name = frame.pop_name(op)?;
                self.do_Tf(&name, size)?;
            }
            Operator::Tr => {
                let mode = frame.pop_int(op)?;
                self.do_Tr(mode);
            }
            Operator::Ts => {
                let v = frame.pop_number(op)?;
                self.do_Ts(v);
            }

            // Text positioning operators
            Operator::Td => {
                let (tx, ty) = frame.pop_point(op)?;
                self.do_Td(frame, tx, ty);
            }
            Operator::TD => {
                let (tx, ty) = frame.pop_point(op)?;
                self.do_TD(frame, tx, ty);
            }
            Operator::Tm => {
                let m = frame.pop_matrix(op)?;
                self.do_Tm(frame, m);
            }
            Operator::TStar => self.do_T_star(frame),

            // Text showing operators
            Operator::Tj => {
                let s = frame.pop_string(op)?;
                self.do_Tj(frame, s);
            }
            Operator::TJ => {
                let seq = frame.pop_array(op)?;
                self.do_TJ(frame, seq);
            }
            Operator::Quote => {
                let s = frame.pop_string(op)?;
                self.do_quote(frame, s);
            }
            Operator::DoubleQuote => {
                let s = frame.pop_string(op)?;
                let [aw, ac] = frame.pop_numbers(op)?;
                self.do_doublequote(frame, aw, ac, s);
            }

            // XObject and shading operators
            Operator::Do => {
                let name = frame.pop_name(op)?;
                self.do_Do(&name)?;
            }
            Operator::Sh => {
                let name = frame.pop_name(op)?;
                self.do_sh(frame, &name)?;
            }

            // Marked content operators
            Operator::BMC | Operator::MP => frame.discard(op, 1)?,
            Operator::BDC | Operator::DP => frame.discard(op, 2)?,
            Operator::EMC => {}

            // Type 3 glyph metrics carry no paint
            Operator::D0 => frame.discard(op, 2)?,
            Operator::D1 => frame.discard(op, 6)?,

            // Compatibility sections
            Operator::BX => self.do_BX(frame),
            Operator::EX => self.do_EX(frame)?,

            // BI is dispatched by `run`, ID data arrives as its own token
            Operator::BI | Operator::ID | Operator::EI => {
                warn!(op = %op, "inline image operator out of sequence, ignored");
            }

            Operator::Unknown(name) => {
                if frame.compat_depth > 0 {
                    debug!(op = %name, "unknown operator inside BX section, ignored");
                } else {
                    warn!(op = %name, "unknown operator, ignored");
                }
                self.handler.unknown_operator(name);
            }
        }
        Ok(())
    }

    // ========================================================================
    // Shared helpers
    // ========================================================================

    /// Intersect the clip with `path` (user space) in both the current
    /// state and the handler.
    pub(crate) fn establish_clip(&mut self, path: &Path) {
        let gs = self.gstack.current_mut();
        let device = path.transformed(gs.ctm);
        let even_odd = device.winding() == crate::model::WindingRule::EvenOdd;
        if let Some(bounds) = device.bounds() {
            gs.clip_bounds = Some(match gs.clip_bounds {
                Some(prev) => intersect_rect(prev, bounds),
                None => bounds,
            });
        }
        self.handler.establish_clip(&device, even_odd);
        gs.clip = Some(device);
    }

    /// Pop states until the stack is `depth` deep, mirroring each pop.
    pub(crate) fn unwind_gstack(&mut self, depth: usize) {
        while self.gstack.depth() > depth {
            if self.gstack.restore().is_err() {
                break;
            }
            self.handler.grestore(self.gstack.current());
        }
    }
}
