//! Graphics model types - state, color and path definitions.
//!
//! - `state` - Graphics state and its save/restore stack (GState, GStateStack)
//! - `color` - Color spaces, colors and paints (ColorSpace, Color, Paint)
//! - `path` - Path geometry (Path, PathSegment, WindingRule)
//! - `objects` - Dictionary values (Object, Dict)

pub mod color;
pub mod objects;
pub mod path;
pub mod state;

// Re-export main types for convenience
pub use color::{Color, ColorSpace, Paint, TileImage, TileSurface};
pub use objects::{Dict, Object};
pub use path::{Path, PathSegment, WindingRule};
pub use state::{
    BlendMode, Composite, GState, GStateStack, LineCap, LineJoin, RenderingIntent, StrokeStyle,
    TextRenderMode,
};
