#![allow(dead_code)]

use std::collections::BTreeMap;

use locmatch::geom::{Poly, Rect};
use locmatch::object::{LocatedObject, LocatedObjects, MetaValue};
use proptest::prelude::*;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Rectangles with non-negative dimensions inside a modest canvas.
pub fn arb_rect() -> impl Strategy<Value = Rect> {
    (0..500i32, 0..500i32, 0..200i32, 0..200i32)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

/// Rectangles guaranteed to have positive area.
pub fn arb_nonempty_rect() -> impl Strategy<Value = Rect> {
    (0..500i32, 0..500i32, 1..200i32, 1..200i32)
        .prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

/// Simple convex polygons: the corner triangle of a random rectangle.
pub fn arb_triangle() -> impl Strategy<Value = Poly> {
    arb_nonempty_rect().prop_map(|r| {
        Poly::new(vec![
            (r.left(), r.top()),
            (r.right(), r.top()),
            (r.left(), r.bottom()),
        ])
    })
}

/// Metadata keys that cannot collide with the codec's geometry fields.
fn arb_meta_key() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "type".to_string(),
        "score".to_string(),
        "source".to_string(),
        "occluded".to_string(),
    ])
}

fn arb_meta_value() -> impl Strategy<Value = MetaValue> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(MetaValue::Str),
        (0..10_000i64).prop_map(|n| MetaValue::Num(n as f64)),
        any::<bool>().prop_map(MetaValue::Bool),
    ]
}

fn arb_metadata() -> impl Strategy<Value = BTreeMap<String, MetaValue>> {
    prop::collection::btree_map(arb_meta_key(), arb_meta_value(), 0..4)
}

/// A located object with an optional triangle outline and metadata.
pub fn arb_located_object() -> impl Strategy<Value = LocatedObject> {
    (arb_nonempty_rect(), prop::option::of(arb_triangle()), arb_metadata()).prop_map(
        |(rect, polygon, metadata)| {
            let mut obj = LocatedObject::new(rect);
            if let Some(poly) = polygon {
                obj = obj.with_polygon(poly);
            }
            for (key, value) in metadata {
                obj = obj.with_meta(key, value);
            }
            obj
        },
    )
}

/// A collection of up to `max` objects.
pub fn arb_located_objects(max: usize) -> impl Strategy<Value = LocatedObjects> {
    prop::collection::vec(arb_located_object(), 0..=max).prop_map(LocatedObjects::from)
}
