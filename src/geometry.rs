//! Integer box geometry shared by the sequencing and extraction steps.

use imageproc::contours::Contour;
use imageproc::rect::Rect;
use serde::Serialize;

/// Axis-aligned rectangle in the coordinate space of the image it came from.
///
/// `x` and `y` may be negative or lie past the image after padding; `w` and
/// `h` stay positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl BoundingBox {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Minimal enclosing rectangle of a contour, `None` for an empty contour
    pub fn from_contour(contour: &Contour<i32>) -> Option<Self> {
        let first = contour.points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &contour.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
    }

    pub fn area(&self) -> i64 {
        self.w as i64 * self.h as i64
    }

    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }

    /// Grow by `amount` above and below
    pub fn pad_vertical(self, amount: i32) -> Self {
        Self::new(
            self.x,
            self.y.saturating_sub(amount),
            self.w,
            self.h.saturating_add(amount.saturating_mul(2)),
        )
    }

    /// Grow the shorter side to match the longer one, re-centering on it
    pub fn squarify(self) -> Self {
        if self.w > self.h {
            let diff = self.w.saturating_sub(self.h);
            Self::new(self.x, self.y.saturating_sub(diff / 2), self.w, self.h.saturating_add(diff))
        } else {
            let diff = self.h.saturating_sub(self.w);
            Self::new(self.x.saturating_sub(diff / 2), self.y, self.w.saturating_add(diff), self.h)
        }
    }

    /// Map into an image scaled by `(sx, sy)` relative to this box's image
    pub fn scale(self, sx: f64, sy: f64) -> Self {
        let x0 = (self.x as f64 * sx).round() as i32;
        let y0 = (self.y as f64 * sy).round() as i32;
        let x1 = (self.right() as f64 * sx).round() as i32;
        let y1 = (self.bottom() as f64 * sy).round() as i32;
        Self::new(x0, y0, (x1 - x0).max(1), (y1 - y0).max(1))
    }

    /// Part of the box inside a `width` x `height` image, `None` if disjoint
    pub fn intersect_extent(self, width: u32, height: u32) -> Option<Self> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.right().min(width as i32);
        let y1 = self.bottom().min(height as i32);
        (x1 > x0 && y1 > y0).then(|| Self::new(x0, y0, x1 - x0, y1 - y0))
    }

    pub fn is_inside(&self, width: u32, height: u32) -> bool {
        self.x >= 0 && self.y >= 0 && self.right() <= width as i32 && self.bottom() <= height as i32
    }

    pub fn to_rect(self) -> Rect {
        Rect::at(self.x, self.y).of_size(self.w as u32, self.h as u32)
    }
}
