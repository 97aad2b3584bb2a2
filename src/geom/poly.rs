//! Polygon outlines and their `geo` conversions.

use geo::{Area, BooleanOps, Coord, LineString, MultiPolygon};
use serde::{Deserialize, Serialize};

use super::rect::Rect;

/// An ordered polygon outline in integer pixel coordinates.
///
/// A polygon needs at least three vertices to be usable; anything shorter
/// can still be represented (e.g. while decoding a report) but reports
/// itself as invalid via [`Poly::is_valid`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Poly {
    pub points: Vec<(i32, i32)>,
}

impl Poly {
    /// Creates a polygon from the given vertices.
    pub fn new(points: Vec<(i32, i32)>) -> Self {
        Self { points }
    }

    /// Returns true if the polygon has at least three vertices.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.points.len() >= 3
    }

    /// Returns the bounding rectangle of the vertices.
    ///
    /// An empty polygon yields an empty rectangle at the origin.
    pub fn bounds(&self) -> Rect {
        let Some(&(x0, y0)) = self.points.first() else {
            return Rect::default();
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (x0, y0, x0, y0);
        for &(x, y) in &self.points[1..] {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Converts into a `geo` polygon for boolean operations.
    ///
    /// The exterior ring is closed automatically by `geo`.
    pub fn to_geo(&self) -> geo::Polygon<f64> {
        let coords: Vec<Coord<f64>> = self
            .points
            .iter()
            .map(|&(x, y)| Coord {
                x: x as f64,
                y: y as f64,
            })
            .collect();
        geo::Polygon::new(LineString::from(coords), vec![])
    }

    /// Converts back from a `geo` polygon, truncating coordinates to
    /// integers and dropping the duplicated closing vertex.
    pub fn from_geo(poly: &geo::Polygon<f64>) -> Self {
        let coords: Vec<_> = poly.exterior().coords().collect();
        // geo linestrings always repeat the first coordinate at the end
        let open = if coords.len() > 1 {
            &coords[..coords.len() - 1]
        } else {
            &coords[..]
        };
        Self {
            points: open.iter().map(|c| (c.x as i32, c.y as i32)).collect(),
        }
    }

    /// Returns the enclosed area.
    pub fn area(&self) -> f64 {
        if !self.is_valid() {
            return 0.0;
        }
        self.to_geo().unsigned_area()
    }

    /// Total intersection area with another polygon (all pieces).
    pub fn intersection_area(&self, other: &Poly) -> f64 {
        if !self.is_valid() || !other.is_valid() {
            return 0.0;
        }
        self.to_geo()
            .intersection(&other.to_geo())
            .unsigned_area()
    }

    /// Total union area with another polygon.
    pub fn union_area(&self, other: &Poly) -> f64 {
        if !self.is_valid() || !other.is_valid() {
            return 0.0;
        }
        self.to_geo().union(&other.to_geo()).unsigned_area()
    }

    /// Returns the largest piece of the intersection region as an outline,
    /// or `None` when the polygons do not overlap.
    pub fn intersection_outline(&self, other: &Poly) -> Option<Poly> {
        if !self.is_valid() || !other.is_valid() {
            return None;
        }
        largest_piece(&self.to_geo().intersection(&other.to_geo()))
    }

    /// Returns the largest piece of the union region as an outline, or
    /// `None` when both polygons are degenerate.
    pub fn union_outline(&self, other: &Poly) -> Option<Poly> {
        if !self.is_valid() || !other.is_valid() {
            return None;
        }
        largest_piece(&self.to_geo().union(&other.to_geo()))
    }

    /// Parses a polygon from comma-separated x and y coordinate lists,
    /// the wire form used in flat reports (`poly_x`/`poly_y`).
    ///
    /// Returns `None` on parse failure or mismatched list lengths.
    pub fn from_coord_lists(xs: &str, ys: &str) -> Option<Poly> {
        let xs = parse_coord_list(xs)?;
        let ys = parse_coord_list(ys)?;
        if xs.is_empty() || xs.len() != ys.len() {
            return None;
        }
        Some(Poly::new(xs.into_iter().zip(ys).collect()))
    }

    /// The comma-separated list of x coordinates.
    pub fn x_list(&self) -> String {
        join_coords(self.points.iter().map(|p| p.0))
    }

    /// The comma-separated list of y coordinates.
    pub fn y_list(&self) -> String {
        join_coords(self.points.iter().map(|p| p.1))
    }

    /// Scales all vertices by the given factor, truncating to integers.
    pub fn scaled(&self, factor: f64) -> Poly {
        Poly::new(
            self.points
                .iter()
                .map(|&(x, y)| ((x as f64 * factor) as i32, (y as f64 * factor) as i32))
                .collect(),
        )
    }
}

fn parse_coord_list(list: &str) -> Option<Vec<i32>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().ok().map(|v| v as i32))
        .collect()
}

fn join_coords(coords: impl Iterator<Item = i32>) -> String {
    coords
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn largest_piece(pieces: &MultiPolygon<f64>) -> Option<Poly> {
    pieces
        .iter()
        .max_by(|a, b| {
            a.unsigned_area()
                .partial_cmp(&b.unsigned_area())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(Poly::from_geo)
        .filter(|p| p.is_valid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: i32, y: i32, side: i32) -> Poly {
        Rect::new(x, y, side, side).to_poly()
    }

    #[test]
    fn area_of_square() {
        assert_eq!(square(0, 0, 10).area(), 100.0);
    }

    #[test]
    fn degenerate_polygon_has_zero_area() {
        assert_eq!(Poly::new(vec![(0, 0), (5, 5)]).area(), 0.0);
    }

    #[test]
    fn bounds_of_triangle() {
        let tri = Poly::new(vec![(0, 0), (10, 0), (5, 8)]);
        assert_eq!(tri.bounds(), Rect::new(0, 0, 10, 8));
    }

    #[test]
    fn intersection_area_of_offset_squares() {
        let a = square(0, 0, 10);
        let b = square(5, 5, 10);
        assert!((a.intersection_area(&b) - 25.0).abs() < 1e-9);
        assert!((a.union_area(&b) - 175.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_squares_have_no_outline() {
        let a = square(0, 0, 10);
        let b = square(50, 50, 10);
        assert_eq!(a.intersection_area(&b), 0.0);
        assert!(a.intersection_outline(&b).is_none());
    }

    #[test]
    fn intersection_outline_bounds() {
        let a = square(0, 0, 10);
        let b = square(5, 5, 10);
        let outline = a.intersection_outline(&b).expect("squares overlap");
        assert_eq!(outline.bounds(), Rect::new(5, 5, 5, 5));
    }

    #[test]
    fn coord_list_roundtrip() {
        let tri = Poly::new(vec![(0, 0), (10, 0), (5, 8)]);
        let restored = Poly::from_coord_lists(&tri.x_list(), &tri.y_list()).unwrap();
        assert_eq!(tri, restored);
    }

    #[test]
    fn coord_list_accepts_floats() {
        let poly = Poly::from_coord_lists("0.0,10.5,5.2", "0,0,8").unwrap();
        assert_eq!(poly.points, vec![(0, 0), (10, 0), (5, 8)]);
    }

    #[test]
    fn coord_list_rejects_mismatched_lengths() {
        assert!(Poly::from_coord_lists("0,1,2", "0,1").is_none());
        assert!(Poly::from_coord_lists("0,x,2", "0,1,2").is_none());
    }
}
