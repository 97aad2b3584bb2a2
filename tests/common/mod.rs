#![allow(dead_code)]

use std::fs;
use std::path::Path;

use locmatch::geom::{Poly, Rect};
use locmatch::object::{LocatedObject, LocatedObjects};
use locmatch::report::codec::to_report;
use locmatch::report::{to_json_string, Report, DEFAULT_PREFIX};

pub fn obj(x: i32, y: i32, w: i32, h: i32, index: i64) -> LocatedObject {
    LocatedObject::new(Rect::new(x, y, w, h)).with_index(index)
}

pub fn labeled(x: i32, y: i32, w: i32, h: i32, index: i64, label: &str) -> LocatedObject {
    obj(x, y, w, h, index).with_meta("type", label)
}

pub fn sample_objects() -> LocatedObjects {
    vec![
        labeled(10, 20, 30, 40, 1, "car"),
        labeled(50, 60, 20, 10, 2, "bike").with_polygon(Poly::new(vec![
            (50, 60),
            (70, 60),
            (60, 70),
        ])),
        obj(100, 100, 5, 5, 3).with_meta("score", 0.85),
    ]
    .into()
}

pub fn sample_report() -> Report {
    let mut report = to_report(&sample_objects(), DEFAULT_PREFIX);
    report.set("Filename", "frame_0001.png");
    report
}

pub fn write_report(path: &Path, report: &Report) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    let json = to_json_string(report).expect("serialize report");
    fs::write(path, json).expect("write report file");
}
