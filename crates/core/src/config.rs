//! Interpreter configuration.
//!
//! Contains InterpreterConfig for controlling nesting limits, tile caching
//! and lexer strictness.

use crate::parser::LexerOptions;

/// How rendered tiling patterns are keyed in the per-page tile cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TileCacheKey {
    /// Key uncolored patterns by pattern and tint, so a pattern referenced
    /// with two different colors is rendered twice.
    #[default]
    PatternAndTint,
    /// Key by pattern only. Later references to an uncolored pattern reuse
    /// the first rendering whatever their tint.
    PatternOnly,
}

/// Parameters for content interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpreterConfig {
    /// Maximum depth of nested forms and tiles below the page program.
    pub max_nesting_depth: usize,

    /// Tile cache keying policy.
    pub tile_cache_key: TileCacheKey,

    /// Options passed to the lexer for every program, page or nested.
    pub lexer: LexerOptions,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: 32,
            tile_cache_key: TileCacheKey::default(),
            lexer: LexerOptions::default(),
        }
    }
}

impl InterpreterConfig {
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }

    pub fn with_tile_cache_key(mut self, key: TileCacheKey) -> Self {
        self.tile_cache_key = key;
        self
    }

    pub fn with_strict_inline_image_end(mut self, strict: bool) -> Self {
        self.lexer.strict_inline_image_end = strict;
        self
    }
}
