//! pagemark - a page content-stream interpreter.
//!
//! Tokenizes page description programs and replays them against a
//! [`MarkupHandler`] as fills, strokes, glyphs, images and clips, running
//! form XObjects and tiling pattern cells as nested programs.

pub mod config;
pub mod error;
pub mod interp;
pub mod model;
pub mod parser;
pub mod resources;
pub mod utils;

pub use config::{InterpreterConfig, TileCacheKey};
pub use error::{ContentError, Result};
pub use interp::{Interpreter, MarkupHandler, Page, PaintEvent, TraceHandler};
pub use parser::{Lexer, LexerOptions, Operator, Program, Token, tokenize};
