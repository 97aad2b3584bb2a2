//! Geometric aggregation of matched pairs.
//!
//! For every pair in a match map, computes the intersection or union
//! region between the two objects and emits it as a new located object.
//! A pair whose boolean operation yields nothing records an error message
//! instead; the call only fails when every pair does.

use crate::error::LocmatchError;
use crate::matching::MatchMap;
use crate::object::{LocatedObject, LocatedObjects};

/// Metadata key for the overlap ratio the pair matched with.
pub const KEY_RATIO: &str = "overlap_ratio";
/// Metadata key for the index of the contributing actual object.
pub const KEY_ACTUAL_INDEX: &str = "actual_index";
/// Metadata key for the index of the contributing other object.
pub const KEY_OTHER_INDEX: &str = "other_index";

/// Which region each matched pair contributes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AreaMode {
    #[default]
    Intersection,
    Union,
}

/// The outcome of an aggregation run: the computed regions plus the
/// messages of any pairs that failed.
#[derive(Clone, Debug, Default)]
pub struct Aggregated {
    pub objects: LocatedObjects,
    pub errors: Vec<String>,
}

/// Computes the overlap regions for all matched pairs.
///
/// Positions in `matches` refer to `actual` and `other`. Failed pairs are
/// recorded in [`Aggregated::errors`]; if every pair fails the call
/// returns [`LocmatchError::AggregationFailed`] instead of a result.
pub fn aggregate(
    actual: &LocatedObjects,
    other: &LocatedObjects,
    matches: &MatchMap,
    mode: AreaMode,
) -> Result<Aggregated, LocmatchError> {
    let mut objects = LocatedObjects::new();
    let mut errors = Vec::new();
    let mut pair_count = 0usize;

    for (&ai, partners) in matches {
        let Some(a) = actual.get(ai) else {
            errors.push(format!("No object at position {} in actual collection", ai));
            continue;
        };
        for (&bi, &ratio) in partners {
            pair_count += 1;
            let Some(b) = other.get(bi) else {
                errors.push(format!("No object at position {} in other collection", bi));
                continue;
            };
            match region_of(a, b, mode) {
                Some(obj) => objects.push(obj.with_meta(KEY_RATIO, ratio)),
                None => errors.push(format!(
                    "Failed to compute {:?} region of {} and {}",
                    mode, a, b
                )),
            }
        }
    }

    if pair_count > 0 && objects.is_empty() {
        return Err(LocmatchError::AggregationFailed {
            pair_count,
            messages: errors,
        });
    }

    Ok(Aggregated {
        objects: objects.reset_indices(0),
        errors,
    })
}

fn region_of(a: &LocatedObject, b: &LocatedObject, mode: AreaMode) -> Option<LocatedObject> {
    let shape_a = a.shape();
    let shape_b = b.shape();
    let outline = match mode {
        AreaMode::Intersection => shape_a.intersection_outline(&shape_b),
        AreaMode::Union => shape_a.union_outline(&shape_b),
    }?;

    let mut obj = LocatedObject::new(outline.bounds()).with_polygon(outline);
    if let Some(index) = a.index_str() {
        obj = obj.with_meta(KEY_ACTUAL_INDEX, index);
    }
    if let Some(index) = b.index_str() {
        obj = obj.with_meta(KEY_OTHER_INDEX, index);
    }
    Some(obj)
}
