// SPDX-License-Identifier: MIT
//! 2-D geometry primitives: points, quadrilaterals, axis-aligned rectangles,
//! and the rotation math the line preprocessor needs to de-skew a page.

use core::f64::consts::FRAC_PI_2;

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Rotates this point by `theta` radians around the origin.
    pub fn rotate(self, theta: f64) -> Self {
        let (sin, cos) = theta.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An ordered quadrilateral bounding box: top-left, top-right, bottom-right,
/// bottom-left, in that order. Need not be axis-aligned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad(pub [Point; 4]);

impl Quad {
    pub fn new(top_left: Point, top_right: Point, bottom_right: Point, bottom_left: Point) -> Self {
        Self([top_left, top_right, bottom_right, bottom_left])
    }

    pub fn top_left(&self) -> Point {
        self.0[0]
    }

    pub fn top_right(&self) -> Point {
        self.0[1]
    }

    pub fn bottom_right(&self) -> Point {
        self.0[2]
    }

    pub fn bottom_left(&self) -> Point {
        self.0[3]
    }

    /// Angle of the quad's longer side, normalized into `[-pi/2, pi/2)`.
    ///
    /// Compares the top edge (top-left -> top-right) against the left edge
    /// (top-left -> bottom-left) and picks whichever is longer, matching the
    /// usual convention that a mostly-horizontal line of text has its long
    /// side along the top/bottom.
    pub fn long_side_angle(&self) -> f64 {
        let top = self.top_right().x - self.top_left().x;
        let top_y = self.top_right().y - self.top_left().y;
        let left = self.bottom_left().x - self.top_left().x;
        let left_y = self.bottom_left().y - self.top_left().y;
        let top_len = top.hypot(top_y);
        let left_len = left.hypot(left_y);
        let (dx, dy) = if top_len >= left_len {
            (top, top_y)
        } else {
            // Rotate the "vertical" long side by 90 degrees so the returned
            // angle is still measured against the horizontal.
            (left_y, -left)
        };
        normalize_angle(dy.atan2(dx))
    }

    /// Rotates every vertex by `theta` radians around the origin.
    pub fn rotated(&self, theta: f64) -> Self {
        Self(self.0.map(|p| p.rotate(theta)))
    }

    /// Axis-aligned envelope of the quad's four vertices.
    pub fn bounding_rect(&self) -> Rect {
        let xs = self.0.map(|p| p.x);
        let ys = self.0.map(|p| p.y);
        Rect {
            x0: xs.iter().cloned().fold(f64::INFINITY, f64::min),
            y0: ys.iter().cloned().fold(f64::INFINITY, f64::min),
            x1: xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            y1: ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        }
    }
}

/// Normalizes an angle into `[-pi/2, pi/2)`, treating near-horizontal as the
/// canonical orientation for a line of text.
fn normalize_angle(mut theta: f64) -> f64 {
    while theta >= FRAC_PI_2 {
        theta -= core::f64::consts::PI;
    }
    while theta < -FRAC_PI_2 {
        theta += core::f64::consts::PI;
    }
    theta
}

/// An axis-aligned rectangle `(x0, y0, x1, y1)` with `x0 <= x1`, `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Line height, falling back to `1.0` for degenerate (zero-height)
    /// geometry so downstream ratios never divide by zero (spec.md §7).
    pub fn safe_height(&self) -> f64 {
        let h = self.height();
        if h > 0.0 {
            h
        } else {
            1.0
        }
    }

    pub fn shifted(&self, dx: f64, dy: f64) -> Self {
        Self {
            x0: self.x0 + dx,
            y0: self.y0 + dy,
            x1: self.x1 + dx,
            y1: self.y1 + dy,
        }
    }
}

/// Absolute tolerance used throughout the crate when comparing coordinates
/// that may carry floating-point drift from the rotation step (spec.md §4.D,
/// §9).
pub const EPS: f64 = 1e-4;

pub fn nearly_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_side_angle_horizontal_is_zero() {
        let q = Quad::new(
            Point::new(0.0, 0.0),
            Point::new(50.0, 0.0),
            Point::new(50.0, 10.0),
            Point::new(0.0, 10.0),
        );
        assert!(nearly_eq(q.long_side_angle(), 0.0));
    }

    #[test]
    fn bounding_rect_of_axis_aligned_quad() {
        let q = Quad::new(
            Point::new(1.0, 2.0),
            Point::new(11.0, 2.0),
            Point::new(11.0, 12.0),
            Point::new(1.0, 12.0),
        );
        let r = q.bounding_rect();
        assert_eq!(r, Rect::new(1.0, 2.0, 11.0, 12.0));
    }

    #[test]
    fn rotation_round_trip() {
        let p = Point::new(3.0, 4.0);
        let theta = 0.3;
        let back = p.rotate(theta).rotate(-theta);
        assert!((back.x - p.x).abs() < 1e-9);
        assert!((back.y - p.y).abs() < 1e-9);
    }

    #[test]
    fn safe_height_avoids_division_by_zero() {
        let degenerate = Rect::new(0.0, 5.0, 10.0, 5.0);
        assert_eq!(degenerate.safe_height(), 1.0);
    }
}
