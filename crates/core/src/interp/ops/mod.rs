//! Content stream operator implementations.
//!
//! Operators are grouped by category:
//! - `graphics_state` - State stack, transforms and compatibility sections (q, Q, cm, w, J, j, M, d, ri, i, gs, BX, EX)
//! - `color` - Color space and values (G, g, RG, rg, K, k, CS, cs, SC, SCN, sc, scn)
//! - `path` - Path construction and painting (m, l, c, v, y, h, re, S, s, f, F, f\*, B, B\*, b, b\*, n, W, W\*)
//! - `text` - Text state and rendering (BT, ET, Tc, Tw, Tz, TL, Tf, Tr, Ts, Td, TD, Tm, T\*, Tj, TJ, ', ")
//! - `xobject` - XObjects, inline images and shadings (Do, BI, sh)
//!
//! Marked content and Type 3 metrics operators carry no paint and are
//! consumed directly by the dispatcher.

mod color;
mod graphics_state;
mod path;
mod text;
mod xobject;

// Each file adds an impl block to Interpreter, so nothing is re-exported.
