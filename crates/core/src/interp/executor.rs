//! Nested program execution: form XObjects and tiling pattern cells.
//!
//! A nested program runs in its own frame against the interpreter's state
//! and handler. Whatever it leaves behind (unbalanced `q`, resource scope)
//! is unwound before control returns to the caller.

use std::sync::Arc;

use bytes::Bytes;
use smallvec::SmallVec;
use tracing::{debug, warn};

use super::device::MarkupHandler;
use super::interpreter::{Interpreter, TileKey};
use crate::config::TileCacheKey;
use crate::error::{ContentError, Result};
use crate::model::{Color, GState, GStateStack, Paint, Path, TileImage};
use crate::resources::{PaintType, ResourceResolver, TilingPattern};
use crate::utils::{Matrix, mult_matrix};

impl<'a, H: MarkupHandler> Interpreter<'a, H> {
    /// Decode, tokenize and run `content` one level deeper.
    fn run_nested(&mut self, content: &Bytes) -> Result<()> {
        if self.depth >= self.config.max_nesting_depth {
            return Err(ContentError::NestingTooDeep(self.config.max_nesting_depth));
        }
        self.depth += 1;
        let result = self.execute(content);
        self.depth -= 1;
        result
    }

    /// Run a nested program inside a saved graphics state.
    ///
    /// `transform` is concatenated onto the current transform and the clip
    /// is narrowed to `clip_bbox` (in the nested program's space) before
    /// the program starts. `resources`, when given, is searched before the
    /// caller's scopes. The state saved here is always restored, including
    /// when the program fails.
    pub fn execute_sub_program(
        &mut self,
        content: &Bytes,
        transform: Matrix,
        clip_bbox: Option<crate::utils::Rect>,
        resources: Option<Arc<dyn ResourceResolver>>,
    ) -> Result<()> {
        let gstack_depth = self.gstack.depth();
        let scope_depth = self.resources.depth();

        self.do_q();
        let gs = self.gstack.current_mut();
        gs.ctm = mult_matrix(transform, gs.ctm);
        if let Some(bbox) = clip_bbox {
            self.establish_clip(&Path::from_bbox(bbox));
        }
        if let Some(scope) = resources {
            self.resources.push(scope);
        }

        let result = self.run_nested(content);

        self.resources.truncate(scope_depth);
        self.unwind_gstack(gstack_depth);
        result
    }

    /// Render a tiling pattern's cell once and share the result.
    ///
    /// The cell is rendered offscreen through `begin_tile`/`end_tile` with a
    /// fresh graphics state whose origin is the cell's lower-left corner.
    /// Uncolored patterns are rendered with `tint` as both fill and stroke.
    /// States the cell leaves saved are restored, each through `grestore`.
    /// Later references with the same cache key reuse the stored tile.
    /// Errors in the cell's content are logged; the tile is still finished
    /// and cached so it is not retried on every reference.
    pub fn execute_tile_once(
        &mut self,
        pattern: &Arc<TilingPattern>,
        tint: Option<&Color>,
    ) -> Arc<TileImage> {
        let key: TileKey = match (self.config.tile_cache_key, pattern.paint_type, tint) {
            (TileCacheKey::PatternAndTint, PaintType::Uncolored, Some(tint)) => {
                (pattern.id, tint.key())
            }
            _ => (pattern.id, SmallVec::new()),
        };
        if let Some(tile) = self.tile_cache.get(&key) {
            debug!(pattern = pattern.id, "tile cache hit");
            return Arc::clone(tile);
        }

        let bbox = pattern.bbox;
        debug!(pattern = pattern.id, ?bbox, "render tile");
        self.handler.begin_tile(bbox, pattern.matrix);

        let mut root = GState::new((1.0, 0.0, 0.0, 1.0, -bbox.0, -bbox.1));
        if pattern.paint_type == PaintType::Uncolored
            && let Some(tint) = tint
        {
            root.fill = Paint::Solid(tint.clone());
            root.stroke = Paint::Solid(tint.clone());
        }

        let saved = std::mem::replace(&mut self.gstack, GStateStack::new(root));
        let scope_depth = self.resources.depth();
        if let Some(scope) = &pattern.resources {
            self.resources.push(Arc::clone(scope));
        }

        let result = self.run_nested(&pattern.content);

        self.resources.truncate(scope_depth);
        self.unwind_gstack(1);
        self.gstack = saved;
        if let Err(e) = result {
            warn!(pattern = pattern.id, error = %e, "tile content aborted");
        }

        let surface = self.handler.end_tile();
        let tile = Arc::new(TileImage {
            pattern_id: pattern.id,
            bbox,
            xstep: pattern.xstep,
            ystep: pattern.ystep,
            matrix: pattern.matrix,
            surface,
        });
        self.tile_cache.insert(key, Arc::clone(&tile));
        tile
    }
}
