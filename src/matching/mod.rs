//! Correspondence building between two detection collections.
//!
//! Two collections play the roles of "actual" (A, e.g. annotations) and
//! "other" (B, e.g. predictions). [`matches`] collects every pair above a
//! threshold, [`annotate`] tags each A-object with its best B counterpart,
//! [`self_overlaps`] finds internally duplicated detections, and
//! [`matrix`] produces the dense ratio matrix.

use std::collections::{BTreeMap, BTreeSet};

use crate::object::LocatedObjects;
use crate::overlap::OverlapCalc;

/// Metadata key for the number of other objects above the threshold.
pub const OVERLAP_COUNT: &str = "overlap_count";

/// Metadata key for the highest overlap ratio found.
pub const OVERLAP_HIGHEST: &str = "overlap_highest";

/// Metadata key for the label of the highest-overlap object.
pub const OVERLAP_LABEL_HIGHEST: &str = "overlap_label_highest";

/// Metadata key for whether the labels of the highest overlap match.
pub const OVERLAP_LABEL_HIGHEST_MATCH: &str = "overlap_label_highest_match";

/// Metadata key marking objects only present in the other collection.
pub const ADDITIONAL_OBJ: &str = "additional_object";

/// Placeholder label when an object has no label metadata.
pub const UNKNOWN_LABEL: &str = "???";

/// All pairs above the threshold, keyed by list position: `A position ->
/// (B position -> ratio)`. Every A position is present, possibly empty.
pub type MatchMap = BTreeMap<usize, BTreeMap<usize, f64>>;

/// Options for [`annotate`].
#[derive(Clone, Debug)]
pub struct MatchOptions {
    /// Minimum ratio (inclusive) for a pair to count as an overlap.
    pub min_ratio: f64,
    /// Metadata key holding the object label; enables label tagging.
    pub label_key: Option<String>,
    /// Emit the matched B-object's geometry instead of the A-object's.
    pub use_other_object: bool,
    /// Append B-objects that matched no A-object, tagged as additional.
    pub additional_object: bool,
    /// Skip pairs with identical geometry (self-comparison setups).
    pub exclude_identical: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            min_ratio: 0.0,
            label_key: None,
            use_other_object: false,
            additional_object: false,
            exclude_identical: false,
        }
    }
}

/// Collects every `(a, b)` pair whose ratio is at least `min_ratio`.
pub fn matches(
    calc: &OverlapCalc,
    actual: &LocatedObjects,
    other: &LocatedObjects,
    min_ratio: f64,
) -> MatchMap {
    let mut map = MatchMap::new();
    for (ai, a) in actual.iter().enumerate() {
        let entry = map.entry(ai).or_default();
        for (bi, b) in other.iter().enumerate() {
            let ratio = calc.ratio(a, b);
            if ratio >= min_ratio && ratio > 0.0 {
                entry.insert(bi, ratio);
            }
        }
    }
    map
}

/// Tags each A-object with its best overlap among the B-objects.
///
/// Every returned object is a tagged clone carrying [`OVERLAP_COUNT`] and
/// [`OVERLAP_HIGHEST`]; when a label key is configured the winning label
/// and whether it matches are recorded too. Ties on the highest ratio are
/// broken by B's iteration order (first seen wins).
///
/// If `actual` is empty the result is simply `other`, unchanged.
pub fn annotate(
    calc: &OverlapCalc,
    actual: &LocatedObjects,
    other: &LocatedObjects,
    opts: &MatchOptions,
) -> LocatedObjects {
    if actual.is_empty() {
        return other.clone();
    }

    let label_key = opts.label_key.as_deref().unwrap_or("");
    let mut result = LocatedObjects::new();
    let mut matched: BTreeSet<usize> = BTreeSet::new();

    for this_obj in actual {
        let mut count = 0usize;
        let mut highest = 0.0f64;
        let mut label_highest = UNKNOWN_LABEL.to_string();
        let this_label = if label_key.is_empty() {
            UNKNOWN_LABEL.to_string()
        } else {
            this_obj
                .meta_str(label_key)
                .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
        };
        let mut act_obj = this_obj;

        for (bi, other_obj) in other.iter().enumerate() {
            if opts.exclude_identical
                && this_obj.rect == other_obj.rect
                && this_obj.polygon == other_obj.polygon
            {
                continue;
            }
            let ratio = calc.ratio(this_obj, other_obj);
            if ratio < opts.min_ratio {
                continue;
            }
            count += 1;
            if ratio > highest {
                highest = ratio;
                if opts.use_other_object {
                    act_obj = other_obj;
                }
                if label_key.is_empty() {
                    matched.insert(bi);
                } else {
                    match other_obj.meta_str(label_key) {
                        Some(label) => {
                            label_highest = label;
                            matched.insert(bi);
                        }
                        None => label_highest = UNKNOWN_LABEL.to_string(),
                    }
                }
            }
        }

        let mut tagged = act_obj
            .clone()
            .with_meta(OVERLAP_COUNT, count)
            .with_meta(OVERLAP_HIGHEST, highest);
        if !label_key.is_empty() {
            let label_match = this_label == label_highest;
            tagged = tagged
                .with_meta(OVERLAP_LABEL_HIGHEST, label_highest.as_str())
                .with_meta(OVERLAP_LABEL_HIGHEST_MATCH, label_match);
        }
        if opts.additional_object {
            tagged = tagged.with_meta(ADDITIONAL_OBJ, false);
        }
        result.push(tagged);
    }

    if opts.additional_object {
        for (bi, other_obj) in other.iter().enumerate() {
            if !matched.contains(&bi) {
                result.push(other_obj.clone().with_meta(ADDITIONAL_OBJ, true));
            }
        }
    }

    result
}

/// Computes pairwise overlaps within one collection, diagonal excluded.
///
/// Every unordered position pair is visited once; a pair is reported when
/// the ratio reaches `min_ratio` in either direction, carrying the larger
/// of the two ratios.
pub fn self_overlaps(
    calc: &OverlapCalc,
    objects: &LocatedObjects,
    min_ratio: f64,
) -> Vec<(usize, usize, f64)> {
    let mut result = Vec::new();
    for i in 0..objects.len() {
        for j in (i + 1)..objects.len() {
            let forward = calc.ratio(&objects[i], &objects[j]);
            let backward = calc.ratio(&objects[j], &objects[i]);
            if forward >= min_ratio || backward >= min_ratio {
                result.push((i, j, forward.max(backward)));
            }
        }
    }
    result
}

/// Produces the dense ratio matrix: `result[i][j]` is the ratio between
/// `actual[i]` and `other[j]`.
pub fn matrix(calc: &OverlapCalc, actual: &LocatedObjects, other: &LocatedObjects) -> Vec<Vec<f64>> {
    actual
        .iter()
        .map(|a| other.iter().map(|b| calc.ratio(a, b)).collect())
        .collect()
}

/// Splits annotated objects into label-matching and mismatching subsets,
/// based on the [`OVERLAP_LABEL_HIGHEST_MATCH`] tag.
pub fn split_by_label_match(objects: &LocatedObjects) -> (LocatedObjects, LocatedObjects) {
    let mut matching = LocatedObjects::new();
    let mut mismatching = LocatedObjects::new();
    for obj in objects {
        let is_match = obj
            .metadata
            .get(OVERLAP_LABEL_HIGHEST_MATCH)
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if is_match {
            matching.push(obj.clone());
        } else {
            mismatching.push(obj.clone());
        }
    }
    (matching, mismatching)
}
