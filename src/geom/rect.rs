//! Axis-aligned integer rectangles.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::poly::Poly;

/// An axis-aligned rectangle in integer pixel coordinates, stored as
/// top-left corner plus dimensions.
///
/// `width`/`height` are always non-negative: [`Rect::new`] shifts the
/// origin when handed negative dimensions, so a rectangle drawn "backwards"
/// by an upstream detector still normalizes to the same region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Creates a new rectangle, normalizing negative dimensions by moving
    /// the origin.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        let (x, width) = if width < 0 { (x + width, -width) } else { (x, width) };
        let (y, height) = if height < 0 {
            (y + height, -height)
        } else {
            (y, height)
        };
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the x coordinate of the left edge.
    #[inline]
    pub fn left(&self) -> i32 {
        self.x
    }

    /// Returns the y coordinate of the top edge.
    #[inline]
    pub fn top(&self) -> i32 {
        self.y
    }

    /// Returns the x coordinate of the right edge (exclusive).
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Returns the y coordinate of the bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Returns the area (`width * height`).
    #[inline]
    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    /// Returns true if either dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the overlapping rectangle, if the two rectangles overlap
    /// with positive area.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x1 = self.left().max(other.left());
        let y1 = self.top().max(other.top());
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());
        if x2 > x1 && y2 > y1 {
            Some(Rect::new(x1, y1, x2 - x1, y2 - y1))
        } else {
            None
        }
    }

    /// Returns the area of the intersection, 0.0 when disjoint.
    pub fn intersection_area(&self, other: &Rect) -> f64 {
        self.intersection(other).map_or(0.0, |r| r.area())
    }

    /// Returns the area of the union.
    pub fn union_area(&self, other: &Rect) -> f64 {
        self.area() + other.area() - self.intersection_area(other)
    }

    /// Returns true if `other` lies fully inside this rectangle.
    pub fn contains(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.top() >= self.top()
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Turns the rectangle into its four-corner polygon outline.
    pub fn to_poly(&self) -> Poly {
        Poly::new(vec![
            (self.left(), self.top()),
            (self.right(), self.top()),
            (self.right(), self.bottom()),
            (self.left(), self.bottom()),
        ])
    }

    /// Scales the rectangle by the given factor, truncating to integers.
    pub fn scaled(&self, factor: f64) -> Rect {
        Rect::new(
            (self.x as f64 * factor) as i32,
            (self.y as f64 * factor) as i32,
            (self.width as f64 * factor) as i32,
            (self.height as f64 * factor) as i32,
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={}, y={}, w={}, h={}",
            self.x, self.y, self.width, self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_dimensions_normalize() {
        let rect = Rect::new(10, 10, -4, -6);
        assert_eq!(rect, Rect::new(6, 4, 4, 6));
    }

    #[test]
    fn intersection_of_overlapping_rects() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(5, 5, 10, 10);
        assert_eq!(a.intersection(&b), Some(Rect::new(5, 5, 5, 5)));
        assert_eq!(a.intersection_area(&b), 25.0);
        assert_eq!(a.union_area(&b), 175.0);
    }

    #[test]
    fn intersection_of_disjoint_rects_is_none() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(20, 20, 10, 10);
        assert_eq!(a.intersection(&b), None);
        assert_eq!(a.intersection_area(&b), 0.0);
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = Rect::new(0, 0, 10, 10);
        let b = Rect::new(10, 0, 10, 10);
        assert_eq!(a.intersection(&b), None);
    }

    #[test]
    fn contains_checks_all_edges() {
        let outer = Rect::new(0, 0, 10, 10);
        assert!(outer.contains(&Rect::new(2, 2, 5, 5)));
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&Rect::new(5, 5, 10, 10)));
    }

    #[test]
    fn to_poly_has_four_corners() {
        let poly = Rect::new(1, 2, 3, 4).to_poly();
        assert_eq!(poly.points, vec![(1, 2), (4, 2), (4, 6), (1, 6)]);
    }
}
