use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geom::{Poly, Rect};

use super::KEY_INDEX;

/// A heterogeneous metadata value: string, number or boolean.
///
/// Serialized untagged so flat report JSON stays plain
/// (`"car"`, `0.82`, `true`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    Bool(bool),
    Num(f64),
    Str(String),
}

impl MetaValue {
    /// Returns the string content, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric content, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetaValue::Num(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean content, if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            MetaValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Bool(b) => write!(f, "{}", b),
            MetaValue::Num(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            MetaValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Str(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Str(value)
    }
}

impl From<f64> for MetaValue {
    fn from(value: f64) -> Self {
        MetaValue::Num(value)
    }
}

impl From<i64> for MetaValue {
    fn from(value: i64) -> Self {
        MetaValue::Num(value as f64)
    }
}

impl From<i32> for MetaValue {
    fn from(value: i32) -> Self {
        MetaValue::Num(value as f64)
    }
}

impl From<usize> for MetaValue {
    fn from(value: usize) -> Self {
        MetaValue::Num(value as f64)
    }
}

impl From<bool> for MetaValue {
    fn from(value: bool) -> Self {
        MetaValue::Bool(value)
    }
}

/// One geometric detection: a bounding rectangle, an optional polygon
/// outline, and arbitrary metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LocatedObject {
    /// Bounding rectangle of the detection.
    pub rect: Rect,

    /// Optional polygon outline; when absent the rectangle's four corners
    /// define the implicit polygon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Poly>,

    /// Additional metadata, including the conventional `index` and
    /// type/label keys.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, MetaValue>,
}

impl LocatedObject {
    /// Creates a new object from its bounding rectangle.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            polygon: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Sets the polygon outline.
    pub fn with_polygon(mut self, polygon: Poly) -> Self {
        self.polygon = Some(polygon);
        self
    }

    /// Adds a metadata entry.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Sets the index metadata entry.
    pub fn with_index(self, index: impl fmt::Display) -> Self {
        self.with_meta(KEY_INDEX, index.to_string())
    }

    /// Returns the index string of the object, if present.
    pub fn index_str(&self) -> Option<String> {
        self.metadata.get(KEY_INDEX).map(|v| v.to_string())
    }

    /// Returns the index of the object as an integer, if present and numeric.
    pub fn index(&self) -> Option<i64> {
        self.index_str().and_then(|s| s.parse::<i64>().ok())
    }

    /// Returns the string form of the metadata value under `key`.
    pub fn meta_str(&self, key: &str) -> Option<String> {
        self.metadata.get(key).map(|v| v.to_string())
    }

    /// Returns the bounding-box area (`width * height`).
    ///
    /// Suppression compares this area even when a polygon is present.
    #[inline]
    pub fn area(&self) -> f64 {
        self.rect.area()
    }

    /// Returns true if the object carries a usable polygon outline.
    pub fn has_valid_polygon(&self) -> bool {
        self.polygon.as_ref().is_some_and(Poly::is_valid)
    }

    /// Returns the polygon outline, falling back to the bounding-box
    /// corners when no usable polygon is present.
    pub fn shape(&self) -> Poly {
        match &self.polygon {
            Some(poly) if poly.is_valid() => poly.clone(),
            _ => self.rect.to_poly(),
        }
    }

    /// Decides whether computations should fall back from the polygon to
    /// the bounding box: either no usable polygon exists, or the
    /// polygon/bbox area ratio is below `min_ratio`.
    pub fn bbox_fallback(&self, min_ratio: f64) -> bool {
        let Some(poly) = self.polygon.as_ref().filter(|p| p.is_valid()) else {
            return true;
        };
        if min_ratio <= 0.0 {
            return false;
        }
        let bbox_area = self.rect.area();
        if bbox_area <= 0.0 {
            return false;
        }
        poly.area() / bbox_area < min_ratio
    }

    /// Clamps the rectangle and polygon into the `width x height` region,
    /// returning the adjusted object.
    pub fn fit_into(&self, width: i32, height: i32) -> LocatedObject {
        let left = self.rect.left().max(0);
        let top = self.rect.top().max(0);
        let right = self.rect.right().min(width);
        let bottom = self.rect.bottom().min(height);
        let rect = Rect::new(left, top, (right - left).max(0), (bottom - top).max(0));

        let polygon = self.polygon.as_ref().map(|poly| {
            Poly::new(
                poly.points
                    .iter()
                    .map(|&(x, y)| (x.clamp(0, width - 1), y.clamp(0, height - 1)))
                    .collect(),
            )
        });

        LocatedObject {
            rect,
            polygon,
            metadata: self.metadata.clone(),
        }
    }

    /// Scales the rectangle and polygon by the given factor.
    pub fn scaled(&self, factor: f64) -> LocatedObject {
        LocatedObject {
            rect: self.rect.scaled(factor),
            polygon: self.polygon.as_ref().map(|p| p.scaled(factor)),
            metadata: self.metadata.clone(),
        }
    }
}

impl fmt::Display for LocatedObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rect)
    }
}

/// An ordered collection of located objects.
///
/// Insertion order is significant: index-based lookup and tie-breaking
/// during matching rely on it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocatedObjects(pub Vec<LocatedObject>);

impl LocatedObjects {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the number of objects.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the collection holds no objects.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the objects in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, LocatedObject> {
        self.0.iter()
    }

    /// Returns the object at the given list position.
    pub fn get(&self, pos: usize) -> Option<&LocatedObject> {
        self.0.get(pos)
    }

    /// Appends an object.
    pub fn push(&mut self, obj: LocatedObject) {
        self.0.push(obj);
    }

    /// Returns the object with the specified index: exact string match
    /// first, then numeric comparison.
    pub fn find(&self, index: &str) -> Option<&LocatedObject> {
        let numeric = index.parse::<i64>().ok();
        self.0.iter().find(|obj| {
            if obj.index_str().as_deref() == Some(index) {
                return true;
            }
            match (numeric, obj.index()) {
                (Some(wanted), Some(actual)) => wanted == actual,
                _ => false,
            }
        })
    }

    /// Returns a new collection containing only the objects whose index is
    /// in `indices` (or not in, when `invert` is set).
    pub fn subset(&self, indices: &BTreeSet<i64>, invert: bool) -> LocatedObjects {
        self.0
            .iter()
            .filter(|obj| match obj.index() {
                Some(idx) => indices.contains(&idx) != invert,
                None => invert,
            })
            .cloned()
            .collect()
    }

    /// Returns a new collection with indices reassigned 1-based (plus
    /// `offset`) following the current insertion order.
    pub fn reset_indices(&self, offset: i64) -> LocatedObjects {
        self.0
            .iter()
            .enumerate()
            .map(|(pos, obj)| obj.clone().with_index(pos as i64 + 1 + offset))
            .collect()
    }

    /// Returns a new collection with all geometry scaled by `factor`.
    pub fn scaled(&self, factor: f64) -> LocatedObjects {
        self.0.iter().map(|obj| obj.scaled(factor)).collect()
    }

    /// Returns a new collection with the metadata key renamed in every
    /// object, plus how many objects were affected.
    pub fn rename_meta_key(&self, old: &str, new: &str) -> (LocatedObjects, usize) {
        let mut renamed = 0;
        let objects = self
            .0
            .iter()
            .map(|obj| {
                let mut obj = obj.clone();
                if let Some(value) = obj.metadata.remove(old) {
                    obj.metadata.insert(new.to_string(), value);
                    renamed += 1;
                }
                obj
            })
            .collect();
        (objects, renamed)
    }
}

impl From<Vec<LocatedObject>> for LocatedObjects {
    fn from(objects: Vec<LocatedObject>) -> Self {
        Self(objects)
    }
}

impl FromIterator<LocatedObject> for LocatedObjects {
    fn from_iter<T: IntoIterator<Item = LocatedObject>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::ops::Index<usize> for LocatedObjects {
    type Output = LocatedObject;

    fn index(&self, pos: usize) -> &Self::Output {
        &self.0[pos]
    }
}

impl<'a> IntoIterator for &'a LocatedObjects {
    type Item = &'a LocatedObject;
    type IntoIter = std::slice::Iter<'a, LocatedObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for LocatedObjects {
    type Item = LocatedObject;
    type IntoIter = std::vec::IntoIter<LocatedObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
