//! Path geometry built by the path construction operators.

use crate::utils::{Matrix, Point, Rect, apply_matrix_pt, get_bound};

/// Path segment for graphics operations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PathSegment {
    /// Move to point (x, y)
    MoveTo(f64, f64),
    /// Line to point (x, y)
    LineTo(f64, f64),
    /// Quadratic bezier curve (x1, y1, x2, y2)
    QuadTo(f64, f64, f64, f64),
    /// Cubic bezier curve (x1, y1, x2, y2, x3, y3)
    CurveTo(f64, f64, f64, f64, f64, f64),
    /// Close path
    ClosePath,
}

impl PathSegment {
    fn transformed(self, m: Matrix) -> Self {
        let pt = |x, y| apply_matrix_pt(m, (x, y));
        match self {
            PathSegment::MoveTo(x, y) => {
                let (x, y) = pt(x, y);
                PathSegment::MoveTo(x, y)
            }
            PathSegment::LineTo(x, y) => {
                let (x, y) = pt(x, y);
                PathSegment::LineTo(x, y)
            }
            PathSegment::QuadTo(x1, y1, x2, y2) => {
                let (x1, y1) = pt(x1, y1);
                let (x2, y2) = pt(x2, y2);
                PathSegment::QuadTo(x1, y1, x2, y2)
            }
            PathSegment::CurveTo(x1, y1, x2, y2, x3, y3) => {
                let (x1, y1) = pt(x1, y1);
                let (x2, y2) = pt(x2, y2);
                let (x3, y3) = pt(x3, y3);
                PathSegment::CurveTo(x1, y1, x2, y2, x3, y3)
            }
            PathSegment::ClosePath => PathSegment::ClosePath,
        }
    }
}

/// Fill and clip rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum WindingRule {
    #[default]
    NonZero,
    EvenOdd,
}

/// A shape: subpaths of segments plus the rule used to fill or clip it.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Path {
    segments: Vec<PathSegment>,
    winding: WindingRule,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closed rectangle subpath, as appended by `re`.
    pub fn from_rect(x: f64, y: f64, w: f64, h: f64) -> Self {
        let mut path = Self::new();
        path.append_rect(x, y, w, h);
        path
    }

    pub fn from_bbox(r: Rect) -> Self {
        Self::from_rect(r.0, r.1, r.2 - r.0, r.3 - r.1)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn winding(&self) -> WindingRule {
        self.winding
    }

    pub fn set_winding(&mut self, winding: WindingRule) {
        self.winding = winding;
    }

    pub fn with_winding(mut self, winding: WindingRule) -> Self {
        self.winding = winding;
        self
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.segments.push(PathSegment::MoveTo(x, y));
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.segments.push(PathSegment::LineTo(x, y));
    }

    pub fn quad_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.segments.push(PathSegment::QuadTo(x1, y1, x2, y2));
    }

    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.segments
            .push(PathSegment::CurveTo(x1, y1, x2, y2, x3, y3));
    }

    pub fn close(&mut self) {
        self.segments.push(PathSegment::ClosePath);
    }

    /// Equivalent to: m x y; l x+w y; l x+w y+h; l x y+h; h
    pub fn append_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.move_to(x, y);
        self.line_to(x + w, y);
        self.line_to(x + w, y + h);
        self.line_to(x, y + h);
        self.close();
    }

    /// Start point of the last subpath, where `h` returns to.
    pub fn subpath_start(&self) -> Option<Point> {
        self.segments.iter().rev().find_map(|s| match s {
            PathSegment::MoveTo(x, y) => Some((*x, *y)),
            _ => None,
        })
    }

    /// Copy of this path mapped through `m`.
    pub fn transformed(&self, m: Matrix) -> Self {
        Self {
            segments: self.segments.iter().map(|s| s.transformed(m)).collect(),
            winding: self.winding,
        }
    }

    /// Bounding box of all segment points, control points included.
    pub fn bounds(&self) -> Option<Rect> {
        if self.segments.is_empty() {
            return None;
        }
        let mut pts = Vec::with_capacity(self.segments.len() * 2);
        for seg in &self.segments {
            match *seg {
                PathSegment::MoveTo(x, y) | PathSegment::LineTo(x, y) => pts.push((x, y)),
                PathSegment::QuadTo(x1, y1, x2, y2) => pts.extend([(x1, y1), (x2, y2)]),
                PathSegment::CurveTo(x1, y1, x2, y2, x3, y3) => {
                    pts.extend([(x1, y1), (x2, y2), (x3, y3)])
                }
                PathSegment::ClosePath => {}
            }
        }
        if pts.is_empty() {
            return None;
        }
        Some(get_bound(pts))
    }
}
