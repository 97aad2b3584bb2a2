//! Integration tests for the flat report codec.

mod common;

use locmatch::geom::Rect;
use locmatch::object::LocatedObjects;
use locmatch::report::codec::{from_report, replace_objects, to_report, to_report_at};
use locmatch::report::{from_json_str, read_report_json, write_report_json, DEFAULT_PREFIX};

#[test]
fn roundtrip_preserves_geometry_and_metadata() {
    let objects = common::sample_objects();
    let decoded = from_report(&to_report(&objects, DEFAULT_PREFIX), DEFAULT_PREFIX);

    assert_eq!(decoded.len(), objects.len());
    for (original, restored) in objects.iter().zip(decoded.iter()) {
        assert_eq!(original.rect, restored.rect);
        assert_eq!(original.polygon, restored.polygon);
        assert_eq!(original.meta_str("type"), restored.meta_str("type"));
        assert_eq!(original.index(), restored.index());
    }
}

#[test]
fn roundtrip_is_idempotent() {
    let first = from_report(
        &to_report(&common::sample_objects(), DEFAULT_PREFIX),
        DEFAULT_PREFIX,
    );
    let second = from_report(&to_report(&first, DEFAULT_PREFIX), DEFAULT_PREFIX);
    assert_eq!(first, second);
}

#[test]
fn decode_order_follows_index_segments() {
    // encode with an offset so indices start at 5, then merge a second
    // batch with lower indices; decoding interleaves them numerically
    let late: LocatedObjects = vec![common::obj(0, 0, 1, 1, 0)].into();
    let mut report = to_report_at(&late, DEFAULT_PREFIX, 5, true);
    let early: LocatedObjects = vec![common::obj(9, 9, 1, 1, 0)].into();
    report.merge(&to_report_at(&early, DEFAULT_PREFIX, 0, true));

    let decoded = from_report(&report, DEFAULT_PREFIX);
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded[0].rect, Rect::new(9, 9, 1, 1));
    assert_eq!(decoded[1].rect, Rect::new(0, 0, 1, 1));
}

#[test]
fn missing_companion_fields_drop_only_that_object() {
    let json = r#"{
        "Object.1.x": 10,
        "Object.1.y": 20,
        "Object.2.x": 1,
        "Object.2.y": 2,
        "Object.2.width": 3,
        "Object.2.height": 4,
        "Object.count": 2
    }"#;
    let report = from_json_str(json).expect("parse report json");

    let decoded = from_report(&report, DEFAULT_PREFIX);
    assert_eq!(decoded.len(), 1);
    assert_eq!(decoded[0].rect, Rect::new(1, 2, 3, 4));
}

#[test]
fn replace_objects_keeps_non_object_fields() {
    let report = common::sample_report();
    let kept: LocatedObjects = vec![common::sample_objects()[0].clone()].into();

    let rebuilt = replace_objects(&report, DEFAULT_PREFIX, &kept);
    assert_eq!(
        rebuilt.string("Filename").as_deref(),
        Some("frame_0001.png")
    );
    assert_eq!(rebuilt.double("Object.count"), Some(1.0));
}

#[test]
fn file_roundtrip() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("objects.report.json");

    let report = common::sample_report();
    write_report_json(&path, &report).expect("write report");
    let restored = read_report_json(&path).expect("read report");

    assert_eq!(report, restored);
}
