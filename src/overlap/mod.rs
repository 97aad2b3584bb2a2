//! Pairwise overlap scoring between located objects.
//!
//! The metric and geometry variants are closed sets: every call site picks
//! one combination up front, so both are plain enums rather than open
//! trait hierarchies.

use crate::object::LocatedObject;

/// How the overlap ratio between two objects is computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverlapMetric {
    /// Intersection area over union area. Symmetric; the default.
    #[default]
    IntersectOverUnion,
    /// Intersection area over the area of the first object. Asymmetric;
    /// used by suppression and region counting.
    AreaRatio,
    /// Dice coefficient: twice the intersection over the summed areas.
    Dice,
}

/// Which geometry the ratio is computed on.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum GeometryMode {
    /// Bounding rectangles only; polygons are ignored.
    #[default]
    BoundingBox,
    /// Polygon outlines where available. An object falls back to its
    /// bounding box when it has no usable polygon, or when the
    /// polygon/bbox area ratio drops below `bbox_fallback_ratio`.
    Polygon { bbox_fallback_ratio: f64 },
}

/// A configured overlap calculator.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct OverlapCalc {
    pub metric: OverlapMetric,
    pub geometry: GeometryMode,
}

impl OverlapCalc {
    /// Creates a bounding-box calculator for the given metric.
    pub fn new(metric: OverlapMetric) -> Self {
        Self {
            metric,
            geometry: GeometryMode::BoundingBox,
        }
    }

    /// Creates a polygon-aware calculator for the given metric.
    pub fn with_polygons(metric: OverlapMetric, bbox_fallback_ratio: f64) -> Self {
        Self {
            metric,
            geometry: GeometryMode::Polygon {
                bbox_fallback_ratio,
            },
        }
    }

    /// Computes the overlap ratio between `a` and `b`, always in `[0, 1]`.
    ///
    /// Degenerate geometry (zero area on either side) yields 0.0, never an
    /// error. Identical geometry yields exactly 1.0.
    pub fn ratio(&self, a: &LocatedObject, b: &LocatedObject) -> f64 {
        let (intersection, area_a, area_b) = self.areas(a, b);

        let ratio = match self.metric {
            OverlapMetric::IntersectOverUnion => {
                let union = area_a + area_b - intersection;
                if union <= 0.0 {
                    return 0.0;
                }
                intersection / union
            }
            OverlapMetric::AreaRatio => {
                if area_a <= 0.0 {
                    return 0.0;
                }
                intersection / area_a
            }
            OverlapMetric::Dice => {
                let total = area_a + area_b;
                if total <= 0.0 {
                    return 0.0;
                }
                2.0 * intersection / total
            }
        };

        ratio.clamp(0.0, 1.0)
    }

    // Intersection area plus both object areas, on the configured geometry.
    fn areas(&self, a: &LocatedObject, b: &LocatedObject) -> (f64, f64, f64) {
        match self.geometry {
            GeometryMode::BoundingBox => (
                a.rect.intersection_area(&b.rect),
                a.rect.area(),
                b.rect.area(),
            ),
            GeometryMode::Polygon { bbox_fallback_ratio } => {
                let poly_a = if a.bbox_fallback(bbox_fallback_ratio) {
                    a.rect.to_poly()
                } else {
                    a.shape()
                };
                let poly_b = if b.bbox_fallback(bbox_fallback_ratio) {
                    b.rect.to_poly()
                } else {
                    b.shape()
                };
                (
                    poly_a.intersection_area(&poly_b),
                    poly_a.area(),
                    poly_b.area(),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Poly, Rect};

    fn obj(x: i32, y: i32, w: i32, h: i32) -> LocatedObject {
        LocatedObject::new(Rect::new(x, y, w, h))
    }

    #[test]
    fn identical_objects_score_one() {
        let a = obj(3, 4, 10, 12);
        for metric in [
            OverlapMetric::IntersectOverUnion,
            OverlapMetric::AreaRatio,
            OverlapMetric::Dice,
        ] {
            assert_eq!(OverlapCalc::new(metric).ratio(&a, &a), 1.0, "{:?}", metric);
        }
    }

    #[test]
    fn disjoint_objects_score_zero() {
        let a = obj(0, 0, 10, 10);
        let b = obj(100, 100, 10, 10);
        assert_eq!(OverlapCalc::default().ratio(&a, &b), 0.0);
    }

    #[test]
    fn degenerate_geometry_scores_zero() {
        let a = obj(0, 0, 0, 10);
        let b = obj(0, 0, 10, 10);
        let calc = OverlapCalc::default();
        assert_eq!(calc.ratio(&a, &a), 0.0);
        assert_eq!(calc.ratio(&a, &b), 0.0);
        assert_eq!(calc.ratio(&b, &a), 0.0);
    }

    #[test]
    fn iou_is_symmetric() {
        let a = obj(0, 0, 10, 10);
        let b = obj(5, 5, 20, 20);
        let calc = OverlapCalc::new(OverlapMetric::IntersectOverUnion);
        assert_eq!(calc.ratio(&a, &b), calc.ratio(&b, &a));
        // intersection 25, union 475
        assert!((calc.ratio(&a, &b) - 25.0 / 475.0).abs() < 1e-12);
    }

    #[test]
    fn area_ratio_is_asymmetric() {
        let a = obj(0, 0, 10, 10);
        let b = obj(5, 5, 20, 20);
        let calc = OverlapCalc::new(OverlapMetric::AreaRatio);
        assert!((calc.ratio(&a, &b) - 0.25).abs() < 1e-12);
        assert!((calc.ratio(&b, &a) - 25.0 / 400.0).abs() < 1e-12);
    }

    #[test]
    fn dice_of_half_overlapping_squares() {
        let a = obj(0, 0, 10, 10);
        let b = obj(5, 0, 10, 10);
        let calc = OverlapCalc::new(OverlapMetric::Dice);
        // 2 * 50 / 200
        assert!((calc.ratio(&a, &b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn containment_with_area_ratio_is_one() {
        let inner = obj(2, 2, 5, 5);
        let outer = obj(0, 0, 20, 20);
        let calc = OverlapCalc::new(OverlapMetric::AreaRatio);
        assert_eq!(calc.ratio(&inner, &outer), 1.0);
        assert!(calc.ratio(&outer, &inner) < 1.0);
    }

    #[test]
    fn polygon_mode_uses_outlines() {
        // two triangles that split the unit square along the diagonal
        let a = obj(0, 0, 10, 10).with_polygon(Poly::new(vec![(0, 0), (10, 0), (0, 10)]));
        let b = obj(0, 0, 10, 10).with_polygon(Poly::new(vec![(10, 0), (10, 10), (0, 10)]));

        let bbox = OverlapCalc::new(OverlapMetric::IntersectOverUnion);
        assert_eq!(bbox.ratio(&a, &b), 1.0);

        let poly = OverlapCalc::with_polygons(OverlapMetric::IntersectOverUnion, 0.0);
        // the triangles only share the diagonal, which has no area
        assert!(poly.ratio(&a, &b) < 0.01);
    }

    #[test]
    fn polygon_mode_falls_back_without_polygon() {
        let a = obj(0, 0, 10, 10);
        let b = obj(5, 5, 20, 20);
        let poly = OverlapCalc::with_polygons(OverlapMetric::IntersectOverUnion, 0.0);
        let bbox = OverlapCalc::new(OverlapMetric::IntersectOverUnion);
        assert!((poly.ratio(&a, &b) - bbox.ratio(&a, &b)).abs() < 1e-9);
    }
}
