//! Overlap-based duplicate removal (non-maximum suppression) plus
//! duplicate-index resolution.
//!
//! Suppression flags a pair when the overlap ratio reaches the threshold
//! in either direction, then drops the smaller, larger or both members
//! depending on the strategy. Area comparison deliberately uses the
//! bounding box (`width * height`) even when polygons are present.

use std::collections::{BTreeMap, BTreeSet};

use log::warn;

use crate::object::LocatedObjects;
use crate::overlap::OverlapCalc;
use crate::report::codec::{from_report, replace_objects};
use crate::report::Report;

/// Which member of a flagged pair gets dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RemovalStrategy {
    /// Drop the member with the smaller bounding-box area.
    #[default]
    RemoveSmaller,
    /// Drop the member with the larger bounding-box area.
    RemoveLarger,
    /// Drop both members.
    RemoveBoth,
}

/// Resolves duplicate `index` values within the collection.
///
/// Two-phase: all indices are collected first, then each collision is
/// resolved by searching forward from the colliding value for the next
/// free integer. The first occurrence of an index keeps it; later
/// occurrences are reassigned. Resolutions are logged, never fatal.
pub fn resolve_duplicate_indices(objects: &LocatedObjects) -> LocatedObjects {
    // phase 1: collect every numeric index and the positions sharing it
    let mut used: BTreeSet<i64> = BTreeSet::new();
    let mut positions: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (pos, obj) in objects.iter().enumerate() {
        if let Some(index) = obj.index() {
            used.insert(index);
            positions.entry(index).or_default().push(pos);
        }
    }

    // phase 2: reassign every occurrence after the first
    let mut reassigned: BTreeMap<usize, i64> = BTreeMap::new();
    for (index, holders) in &positions {
        for &pos in holders.iter().skip(1) {
            let mut candidate = index + 1;
            while used.contains(&candidate) {
                candidate += 1;
            }
            used.insert(candidate);
            reassigned.insert(pos, candidate);
            warn!(
                "Duplicate index {} at position {}, reassigned to {}",
                index, pos, candidate
            );
        }
    }

    objects
        .iter()
        .enumerate()
        .map(|(pos, obj)| match reassigned.get(&pos) {
            Some(&index) => obj.clone().with_index(index),
            None => obj.clone(),
        })
        .collect()
}

/// Removes overlapping objects within one collection.
///
/// Every unordered pair is checked once; a pair is flagged when the ratio
/// reaches `min_ratio` in either direction. On equal areas the later
/// object loses.
pub fn suppress(
    objects: &LocatedObjects,
    calc: &OverlapCalc,
    min_ratio: f64,
    strategy: RemovalStrategy,
) -> LocatedObjects {
    let mut remove = vec![false; objects.len()];

    for i in 0..objects.len() {
        for j in (i + 1)..objects.len() {
            let forward = calc.ratio(&objects[i], &objects[j]);
            let backward = calc.ratio(&objects[j], &objects[i]);
            if forward < min_ratio && backward < min_ratio {
                continue;
            }
            match strategy {
                RemovalStrategy::RemoveBoth => {
                    remove[i] = true;
                    remove[j] = true;
                }
                RemovalStrategy::RemoveSmaller => {
                    if objects[i].area() < objects[j].area() {
                        remove[i] = true;
                    } else {
                        remove[j] = true;
                    }
                }
                RemovalStrategy::RemoveLarger => {
                    if objects[i].area() > objects[j].area() {
                        remove[i] = true;
                    } else {
                        remove[j] = true;
                    }
                }
            }
        }
    }

    collect_kept(objects, &remove)
}

/// Removes objects that overlap with a separately-stored reference
/// collection. Only the primary collection's members are dropped.
pub fn suppress_against(
    objects: &LocatedObjects,
    reference: &LocatedObjects,
    calc: &OverlapCalc,
    min_ratio: f64,
    strategy: RemovalStrategy,
) -> LocatedObjects {
    let mut remove = vec![false; objects.len()];

    for (i, obj) in objects.iter().enumerate() {
        for ref_obj in reference {
            let forward = calc.ratio(obj, ref_obj);
            let backward = calc.ratio(ref_obj, obj);
            if forward < min_ratio && backward < min_ratio {
                continue;
            }
            let drop = match strategy {
                RemovalStrategy::RemoveBoth => true,
                RemovalStrategy::RemoveSmaller => obj.area() <= ref_obj.area(),
                RemovalStrategy::RemoveLarger => obj.area() >= ref_obj.area(),
            };
            if drop {
                remove[i] = true;
                break;
            }
        }
    }

    collect_kept(objects, &remove)
}

/// Report-level wrapper: decode, optionally resolve duplicate indices,
/// suppress, and re-encode, preserving every field outside the object
/// prefix.
#[allow(clippy::too_many_arguments)]
pub fn suppress_report(
    report: &Report,
    prefix: &str,
    resolve_indices: bool,
    reference: Option<&LocatedObjects>,
    calc: &OverlapCalc,
    min_ratio: f64,
    strategy: RemovalStrategy,
) -> Report {
    let mut objects = from_report(report, prefix);
    if resolve_indices {
        objects = resolve_duplicate_indices(&objects);
    }
    let kept = match reference {
        Some(reference) => suppress_against(&objects, reference, calc, min_ratio, strategy),
        None => suppress(&objects, calc, min_ratio, strategy),
    };
    replace_objects(report, prefix, &kept)
}

fn collect_kept(objects: &LocatedObjects, remove: &[bool]) -> LocatedObjects {
    objects
        .iter()
        .zip(remove)
        .filter(|(_, &removed)| !removed)
        .map(|(obj, _)| obj.clone())
        .collect()
}
