//! Geometry primitives for located objects.
//!
//! Detections carry an axis-aligned integer [`Rect`] and, optionally, a
//! [`Poly`] outline. Both convert into `geo` polygons when a computation
//! needs proper boolean operations (intersection/union areas and outlines).

mod poly;
mod rect;

pub use poly::Poly;
pub use rect::Rect;
