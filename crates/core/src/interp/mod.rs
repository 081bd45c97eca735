//! Content program interpretation and handler output.
//!
//! This module contains:
//! - `interpreter`: the operator loop, page setup and operand handling
//! - `ops`: Operator implementations by category
//! - `executor`: nested form and tile programs
//! - `text`: text object matrices and glyph advance
//! - `device`: the markup handler trait
//! - `trace`: a handler that records paint calls

pub mod device;
pub mod executor;
pub mod interpreter;
pub mod ops;
pub mod text;
pub mod trace;

// Re-export main types for convenience
pub use device::{GlyphRun, MarkupHandler};
pub use interpreter::{Interpreter, Page};
pub use text::{TextObject, glyph_displacement};
pub use trace::{PaintEvent, PaintRecord, TraceHandler};
