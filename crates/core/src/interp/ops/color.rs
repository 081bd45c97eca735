//! Color operators.
//!
//! Handles: CS, cs, SC, SCN, sc, scn, G, g, RG, rg, K, k
//!
//! Uppercase operators set stroking color, lowercase set non-stroking.
//! Selecting a space also resets its color to the space's initial value.

use tracing::debug;

use crate::error::Result;
use crate::interp::device::MarkupHandler;
use crate::interp::interpreter::{Frame, Interpreter};
use crate::model::{Color, ColorSpace, Paint};
use crate::parser::Operator;
use crate::resources::{PaintType, Pattern};

#[allow(non_snake_case)]
impl<'a, H: MarkupHandler> Interpreter<'a, H> {
    fn resolve_color_space(&self, name: &str) -> Result<ColorSpace> {
        match ColorSpace::predefined(name) {
            Some(space) => Ok(space),
            None => self.resources.color_space(name),
        }
    }

    fn set_color_space(&mut self, space: ColorSpace, stroke: bool) {
        let gs = self.gstack.current_mut();
        let color = Paint::Solid(space.initial_color());
        if stroke {
            gs.stroke = color;
            gs.stroke_space = space;
        } else {
            gs.fill = color;
            gs.fill_space = space;
        }
    }

    fn set_paint(&mut self, space: ColorSpace, paint: Paint, stroke: bool) {
        let gs = self.gstack.current_mut();
        if stroke {
            gs.stroke = paint;
            gs.stroke_space = space;
        } else {
            gs.fill = paint;
            gs.fill_space = space;
        }
    }

    /// Pop the operands of `sc`/`scn` (or their stroking forms) for the
    /// current space and build the paint.
    fn pop_paint(
        &mut self,
        frame: &mut Frame<'_>,
        op: &Operator,
        space: &ColorSpace,
    ) -> Result<Paint> {
        if !space.is_pattern() {
            let components = frame.pop_n_numbers(op, space.ncomponents)?;
            return Ok(Paint::Solid(Color::from_components(components)));
        }

        let name = frame.pop_name(op)?;
        match self.resources.pattern(&name)? {
            Pattern::Shading { shading, matrix } => Ok(Paint::Shading { shading, matrix }),
            Pattern::Tiling(pattern) => {
                let tint = match pattern.paint_type {
                    PaintType::Colored => None,
                    PaintType::Uncolored => {
                        let n = match &space.base {
                            Some(base) => base.ncomponents,
                            None => frame.operands.len(),
                        };
                        Some(Color::from_components(frame.pop_n_numbers(op, n)?))
                    }
                };
                debug!(pattern = %name, id = pattern.id, "tiling pattern selected");
                let tile = self.execute_tile_once(&pattern, tint.as_ref());
                Ok(Paint::Tiling { tile, tint })
            }
        }
    }

    /// Sets the stroking color space.
    ///
    /// PDF operator: `CS`
    pub(crate) fn do_CS(&mut self, name: &str) -> Result<()> {
        let space = self.resolve_color_space(name)?;
        self.set_color_space(space, true);
        Ok(())
    }

    /// Sets the non-stroking color space.
    ///
    /// PDF operator: `cs`
    pub(crate) fn do_cs(&mut self, name: &str) -> Result<()> {
        let space = self.resolve_color_space(name)?;
        self.set_color_space(space, false);
        Ok(())
    }

    /// Sets the stroking color in the current stroking space.
    ///
    /// PDF operators: `SC`, `SCN`
    pub(crate) fn do_SC(&mut self, frame: &mut Frame<'_>, op: &Operator) -> Result<()> {
        let space = self.gstack.current().stroke_space.clone();
        let paint = self.pop_paint(frame, op, &space)?;
        self.set_paint(space, paint, true);
        Ok(())
    }

    /// Sets the non-stroking color in the current non-stroking space.
    ///
    /// PDF operators: `sc`, `scn`
    pub(crate) fn do_sc(&mut self, frame: &mut Frame<'_>, op: &Operator) -> Result<()> {
        let space = self.gstack.current().fill_space.clone();
        let paint = self.pop_paint(frame, op, &space)?;
        self.set_paint(space, paint, false);
        Ok(())
    }

    /// PDF operator: `G`
    pub(crate) fn do_G(&mut self, gray: f64) {
        self.set_paint(ColorSpace::device_gray(), Paint::Solid(Color::gray(gray)), true);
    }

    /// PDF operator: `g`
    pub(crate) fn do_g(&mut self, gray: f64) {
        self.set_paint(ColorSpace::device_gray(), Paint::Solid(Color::gray(gray)), false);
    }

    /// PDF operator: `RG`
    pub(crate) fn do_RG(&mut self, r: f64, g: f64, b: f64) {
        self.set_paint(ColorSpace::device_rgb(), Paint::Solid(Color::rgb(r, g, b)), true);
    }

    /// PDF operator: `rg`
    pub(crate) fn do_rg(&mut self, r: f64, g: f64, b: f64) {
        self.set_paint(ColorSpace::device_rgb(), Paint::Solid(Color::rgb(r, g, b)), false);
    }

    /// PDF operator: `K`
    pub(crate) fn do_K(&mut self, c: f64, m: f64, y: f64, k: f64) {
        self.set_paint(
            ColorSpace::device_cmyk(),
            Paint::Solid(Color::cmyk(c, m, y, k)),
            true,
        );
    }

    /// PDF operator: `k`
    pub(crate) fn do_k(&mut self, c: f64, m: f64, y: f64, k: f64) {
        self.set_paint(
            ColorSpace::device_cmyk(),
            Paint::Solid(Color::cmyk(c, m, y, k)),
            false,
        );
    }
}
