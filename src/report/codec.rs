//! Conversion between flat reports and located-object collections.
//!
//! Encoding writes each object under a 1-based, zero-padded position index:
//!
//! ```text
//! Object.1.x
//! Object.1.y
//! Object.1.width
//! Object.1.height
//! Object.1.location
//! Object.1.poly_x   -- if polygon data present
//! Object.1.poly_y   -- if polygon data present
//! Object.1.<key>    -- one field per metadata key
//! Object.count
//! ```
//!
//! Decoding groups fields by their `<prefix><idx>` segment and requires the
//! four rectangle fields before constructing an object; incomplete groups
//! are dropped with a warning, never an error.

use std::collections::BTreeMap;

use log::warn;

use crate::geom::{Poly, Rect};
use crate::object::{LocatedObject, LocatedObjects, KEY_INDEX};

use super::{
    Report, KEY_COUNT, KEY_HEIGHT, KEY_LOCATION, KEY_POLY_X, KEY_POLY_Y, KEY_WIDTH, KEY_X, KEY_Y,
};

/// Encodes the collection into a flat report using the given field prefix.
///
/// Metadata keys are written as-is; the `index` entry therefore survives a
/// round trip even when an object sits at a different list position.
pub fn to_report(objects: &LocatedObjects, prefix: &str) -> Report {
    to_report_at(objects, prefix, 0, false)
}

/// Encodes the collection, offsetting the position index and optionally
/// overwriting each object's `index` metadata with its padded position.
pub fn to_report_at(
    objects: &LocatedObjects,
    prefix: &str,
    offset: usize,
    update_index: bool,
) -> Report {
    let mut report = Report::new();
    let width = objects.len().to_string().len();

    for (pos, obj) in objects.iter().enumerate() {
        let idx = format!("{:0width$}", pos + 1 + offset, width = width);
        let group = format!("{}{}", prefix, idx);

        for (key, value) in &obj.metadata {
            if update_index && key == KEY_INDEX {
                continue;
            }
            report.set(format!("{}.{}", group, key), value.clone());
        }
        if update_index {
            report.set(format!("{}.{}", group, KEY_INDEX), idx.as_str());
        }

        report.set(format!("{}{}", group, KEY_X), obj.rect.x);
        report.set(format!("{}{}", group, KEY_Y), obj.rect.y);
        report.set(format!("{}{}", group, KEY_WIDTH), obj.rect.width);
        report.set(format!("{}{}", group, KEY_HEIGHT), obj.rect.height);
        report.set(format!("{}{}", group, KEY_LOCATION), location_string(&obj.rect));

        if let Some(poly) = obj.polygon.as_ref().filter(|p| p.is_valid()) {
            report.set(format!("{}{}", group, KEY_POLY_X), poly.x_list());
            report.set(format!("{}{}", group, KEY_POLY_Y), poly.y_list());
        }
    }

    report.set(format!("{}{}", prefix, KEY_COUNT), objects.len());
    report
}

/// Decodes all objects stored under the given prefix.
pub fn from_report(report: &Report, prefix: &str) -> LocatedObjects {
    from_report_multi(report, &[prefix])
}

/// Decodes all objects stored under any of the given prefixes.
pub fn from_report_multi(report: &Report, prefixes: &[&str]) -> LocatedObjects {
    let mut groups: BTreeMap<String, Vec<&str>> = BTreeMap::new();

    for name in report.fields.keys() {
        if !prefixes.iter().any(|prefix| name.starts_with(prefix)) {
            continue;
        }
        let Some(dot) = name.rfind('.') else { continue };
        groups.entry(name[..dot].to_string()).or_default().push(name);
    }

    let mut result = LocatedObjects::new();
    for (group, names) in &groups {
        let Some(prefix) = prefixes.iter().find(|p| group.starts_with(*p)) else {
            continue;
        };
        if group.len() <= prefix.len() {
            // e.g. the "<prefix>count" field grouped under the bare prefix
            continue;
        }
        let idx = &group[prefix.len()..];

        if !report.has(&format!("{}{}", group, KEY_X)) {
            continue;
        }
        let (Some(x), Some(y), Some(w), Some(h)) = (
            report.double(&format!("{}{}", group, KEY_X)),
            report.double(&format!("{}{}", group, KEY_Y)),
            report.double(&format!("{}{}", group, KEY_WIDTH)),
            report.double(&format!("{}{}", group, KEY_HEIGHT)),
        ) else {
            warn!(
                "Dropping object '{}': missing y/width/height companion fields",
                group
            );
            continue;
        };

        let mut obj = LocatedObject::new(Rect::new(x as i32, y as i32, w as i32, h as i32))
            .with_index(idx);

        for name in names {
            let suffix = &name[name.rfind('.').expect("grouped names contain a dot")..];
            if matches!(suffix, KEY_X | KEY_Y | KEY_WIDTH | KEY_HEIGHT | KEY_LOCATION) {
                continue;
            }
            if suffix == KEY_POLY_X || suffix == KEY_POLY_Y {
                continue;
            }
            if let Some(value) = report.get(name) {
                obj = obj.with_meta(suffix[1..].to_string(), value.clone());
            }
        }

        let poly_x = report.string(&format!("{}{}", group, KEY_POLY_X));
        let poly_y = report.string(&format!("{}{}", group, KEY_POLY_Y));
        if let (Some(xs), Some(ys)) = (poly_x, poly_y) {
            match Poly::from_coord_lists(&xs, &ys) {
                Some(poly) if poly.is_valid() => obj = obj.with_polygon(poly),
                _ => warn!("Ignoring unparseable polygon data for '{}'", group),
            }
        }

        result.push(obj);
    }

    result
}

/// Re-encodes `objects` into a copy of `report`, preserving every field
/// that does not start with the object prefix.
pub fn replace_objects(report: &Report, prefix: &str, objects: &LocatedObjects) -> Report {
    let mut result = report.without_prefix(prefix);
    result.merge(&to_report(objects, prefix));
    result
}

// Quadrilateral corner string for the bounding box, using the inclusive
// corner convention of the upstream annotation tools.
fn location_string(rect: &Rect) -> String {
    let right = rect.x + rect.width - 1;
    let bottom = rect.y + rect.height - 1;
    format!(
        "{} {} {} {} {} {} {} {}",
        rect.x, rect.y, right, rect.y, right, bottom, rect.x, bottom
    )
}
