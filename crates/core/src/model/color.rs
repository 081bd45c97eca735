//! Color spaces, color values and paints.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use smallvec::SmallVec;
use smol_str::SmolStr;

use crate::resources::Shading;
use crate::utils::{Matrix, Rect};

/// Represents a color space.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSpace {
    /// Name of the color space (e.g., "DeviceRGB")
    pub name: SmolStr,
    /// Number of color components
    pub ncomponents: usize,
    /// Underlying space of a Pattern space, used to tint uncolored tiles
    pub base: Option<Arc<ColorSpace>>,
}

impl ColorSpace {
    /// Create a new color space.
    pub fn new(name: &str, ncomponents: usize) -> Self {
        Self {
            name: SmolStr::new(name),
            ncomponents,
            base: None,
        }
    }

    /// A Pattern space whose uncolored tiles are tinted in `base`.
    pub fn pattern_with_base(base: ColorSpace) -> Self {
        Self {
            name: SmolStr::new_static("Pattern"),
            ncomponents: 1,
            base: Some(Arc::new(base)),
        }
    }

    pub fn device_gray() -> Self {
        Self::new("DeviceGray", 1)
    }

    pub fn device_rgb() -> Self {
        Self::new("DeviceRGB", 3)
    }

    pub fn device_cmyk() -> Self {
        Self::new("DeviceCMYK", 4)
    }

    pub fn is_pattern(&self) -> bool {
        self.name == "Pattern"
    }

    /// Look up a device space or one of its inline abbreviations.
    pub fn predefined(name: &str) -> Option<Self> {
        let name = INLINE_COLORSPACE_ABBREV.get(name).copied().unwrap_or(name);
        PREDEFINED_COLORSPACE.get(name).cloned()
    }

    /// Color in effect right after this space is selected.
    pub fn initial_color(&self) -> Color {
        match self.name.as_str() {
            "DeviceCMYK" => Color::cmyk(0.0, 0.0, 0.0, 1.0),
            "Pattern" => Color::default(),
            _ => Color::from_components(std::iter::repeat_n(0.0, self.ncomponents)),
        }
    }
}

impl Default for ColorSpace {
    fn default() -> Self {
        Self::device_gray()
    }
}

/// Predefined color spaces that need no resource lookup.
pub static PREDEFINED_COLORSPACE: LazyLock<HashMap<&'static str, ColorSpace>> =
    LazyLock::new(|| {
        let entries = [
            ("DeviceGray", 1),
            ("DeviceRGB", 3),
            ("DeviceCMYK", 4),
            ("Pattern", 1),
        ];

        let mut map = HashMap::with_capacity(entries.len());
        for (name, n) in entries {
            map.insert(name, ColorSpace::new(name, n));
        }
        map
    });

/// Inline image color space abbreviations.
pub static INLINE_COLORSPACE_ABBREV: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| {
        HashMap::from([
            ("G", "DeviceGray"),
            ("RGB", "DeviceRGB"),
            ("CMYK", "DeviceCMYK"),
        ])
    });

/// A color value: one number per component of its space.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Color {
    pub components: SmallVec<[f64; 4]>,
}

impl Default for Color {
    fn default() -> Self {
        Color::gray(0.0)
    }
}

impl Color {
    pub fn gray(g: f64) -> Self {
        Self::from_components([g])
    }

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::from_components([r, g, b])
    }

    pub fn cmyk(c: f64, m: f64, y: f64, k: f64) -> Self {
        Self::from_components([c, m, y, k])
    }

    pub fn from_components(components: impl IntoIterator<Item = f64>) -> Self {
        Self {
            components: components.into_iter().collect(),
        }
    }

    /// Bit patterns of the components, usable as a hash key.
    pub fn key(&self) -> SmallVec<[u64; 4]> {
        self.components.iter().map(|c| c.to_bits()).collect()
    }
}

/// Opaque offscreen surface produced by a handler for a rendered tile.
pub type TileSurface = Arc<dyn std::any::Any + Send + Sync>;

/// A tiling pattern rendered once and shared by every reference to it.
#[derive(Debug, Clone)]
pub struct TileImage {
    pub pattern_id: u64,
    /// Pattern cell in pattern space
    pub bbox: Rect,
    pub xstep: f64,
    pub ystep: f64,
    /// Pattern space to default page space
    pub matrix: Matrix,
    /// Whatever the handler returned from `end_tile`
    pub surface: Option<TileSurface>,
}

impl PartialEq for TileImage {
    fn eq(&self, other: &Self) -> bool {
        self.pattern_id == other.pattern_id
            && self.bbox == other.bbox
            && self.matrix == other.matrix
            && match (&self.surface, &other.surface) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

/// What a fill or stroke paints with.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// Flat color in the current color space
    Solid(Color),
    /// Tiling pattern; `tint` is set for uncolored patterns
    Tiling {
        tile: Arc<TileImage>,
        tint: Option<Color>,
    },
    /// Shading pattern or `sh` fill
    Shading {
        shading: Arc<Shading>,
        matrix: Matrix,
    },
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Solid(Color::default())
    }
}

impl Paint {
    pub fn as_color(&self) -> Option<&Color> {
        match self {
            Paint::Solid(c) => Some(c),
            _ => None,
        }
    }

    pub fn tile(&self) -> Option<&Arc<TileImage>> {
        match self {
            Paint::Tiling { tile, .. } => Some(tile),
            _ => None,
        }
    }
}
