//! Region membership counting.
//!
//! Scores how much of a detection collection falls inside a caller-supplied
//! rectangular or polygonal region. Full containment contributes 1 to the
//! count; partial overlap contributes the overlap ratio when partial
//! counting is enabled, and nothing otherwise.

use regex::Regex;

use crate::error::LocmatchError;
use crate::geom::{Poly, Rect};
use crate::object::{LocatedObject, LocatedObjects};
use crate::overlap::{GeometryMode, OverlapCalc, OverlapMetric};

// Tolerance for treating a floating ratio as full containment; polygon
// intersection areas come back from the boolean ops with float error.
const FULL_EPS: f64 = 1e-9;

/// A caller-supplied region of interest.
#[derive(Clone, Debug, PartialEq)]
pub enum Region {
    Rect(Rect),
    Poly(Poly),
}

impl Region {
    /// Creates a rectangular region.
    ///
    /// # Errors
    /// Rejects negative dimensions with [`LocmatchError::InvalidGeometry`].
    pub fn rect(left: i32, top: i32, width: i32, height: i32) -> Result<Region, LocmatchError> {
        if width < 0 || height < 0 {
            return Err(LocmatchError::InvalidGeometry(format!(
                "region dimensions must be non-negative, got {}x{}",
                width, height
            )));
        }
        Ok(Region::Rect(Rect::new(left, top, width, height)))
    }

    /// Creates a polygonal region.
    ///
    /// # Errors
    /// Rejects polygons with fewer than 3 vertices.
    pub fn poly(points: Vec<(i32, i32)>) -> Result<Region, LocmatchError> {
        if points.len() < 3 {
            return Err(LocmatchError::InvalidGeometry(format!(
                "region polygon needs at least 3 vertices, got {}",
                points.len()
            )));
        }
        Ok(Region::Poly(Poly::new(points)))
    }

    // The region as a located object, with its origin normalized to
    // zero-based coordinates.
    fn to_object(&self, one_based: bool) -> LocatedObject {
        let shift = if one_based { 1 } else { 0 };
        match self {
            Region::Rect(rect) => LocatedObject::new(Rect::new(
                rect.x - shift,
                rect.y - shift,
                rect.width,
                rect.height,
            )),
            Region::Poly(poly) => {
                let shifted = Poly::new(
                    poly.points
                        .iter()
                        .map(|&(x, y)| (x - shift, y - shift))
                        .collect(),
                );
                LocatedObject::new(shifted.bounds()).with_polygon(shifted)
            }
        }
    }
}

/// Options for region counting.
#[derive(Clone, Debug, Default)]
pub struct CountOptions {
    /// Region coordinates are 1-based and get normalized before scoring.
    pub one_based: bool,
    /// Credit partially contained objects with their overlap ratio.
    pub partial_counts: bool,
    /// Restrict counting to objects whose type metadata matches.
    pub check_type: bool,
    /// Metadata key holding the object type.
    pub type_suffix: String,
    /// Pattern the type value must match when `check_type` is set.
    pub type_find: Option<Regex>,
}

/// Counts how much object area falls inside the region.
///
/// Fully contained objects contribute 1.0 each; partially contained ones
/// contribute their overlap ratio only when `partial_counts` is enabled.
pub fn count(objects: &LocatedObjects, region: &Region, opts: &CountOptions) -> f64 {
    let region_obj = region.to_object(opts.one_based);
    let calc = region_calc(region);

    let mut total = 0.0;
    for obj in filtered(objects, opts) {
        let ratio = calc.ratio(obj, &region_obj);
        if ratio >= 1.0 - FULL_EPS {
            total += 1.0;
        } else if ratio > 0.0 && opts.partial_counts {
            total += ratio;
        }
    }
    total
}

/// Counts only the objects that are fully contained in the region.
pub fn count_full(objects: &LocatedObjects, region: &Region, opts: &CountOptions) -> usize {
    let region_obj = region.to_object(opts.one_based);
    let calc = region_calc(region);

    filtered(objects, opts)
        .filter(|obj| calc.ratio(obj, &region_obj) >= 1.0 - FULL_EPS)
        .count()
}

// The ratio of an object inside the region is intersection / object area;
// polygon geometry only matters when the region itself is a polygon.
fn region_calc(region: &Region) -> OverlapCalc {
    let geometry = match region {
        Region::Rect(_) => GeometryMode::BoundingBox,
        Region::Poly(_) => GeometryMode::Polygon {
            bbox_fallback_ratio: 0.0,
        },
    };
    OverlapCalc {
        metric: OverlapMetric::AreaRatio,
        geometry,
    }
}

fn filtered<'a>(
    objects: &'a LocatedObjects,
    opts: &'a CountOptions,
) -> impl Iterator<Item = &'a LocatedObject> {
    objects.iter().filter(move |obj| {
        if !opts.check_type {
            return true;
        }
        let Some(pattern) = opts.type_find.as_ref() else {
            return true;
        };
        obj.meta_str(&opts.type_suffix)
            .is_some_and(|value| pattern.is_match(&value))
    })
}
