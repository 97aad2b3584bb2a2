//! Located-object model: one detection plus ordered collections of them.
//!
//! A [`LocatedObject`] is a bounding rectangle with an optional polygon
//! outline and a string-keyed metadata map. [`LocatedObjects`] is the
//! insertion-ordered collection every engine component operates on.
//!
//! All mutation helpers follow value semantics: they consume or clone and
//! return new objects, so collections never alias each other's entries.

mod model;

pub use model::{LocatedObject, LocatedObjects, MetaValue};

/// Metadata key holding the object's index within its collection.
pub const KEY_INDEX: &str = "index";
