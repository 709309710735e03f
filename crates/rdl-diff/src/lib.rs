//! Differential object serialization for RDL report documents.
//!
//! Report object trees serialize as markup nodes carrying only the
//! properties that differ from a default-constructed baseline of the same
//! class, which is what keeps saved documents small: an unchanged band is
//! one self-closing element. Objects participate by implementing the
//! [`Serializable`] capability; the writer never depends on concrete types.
//!
//! # Key Types
//!
//! - [`DiffWriter`] — serializes an object graph into a [`rdl_markup::Node`] tree
//! - [`DiffReader`] — restores objects from a node tree
//! - [`Serializable`] / [`Deserializable`] — the per-object capability traits
//! - [`BaselineRegistry`] — zero-arg constructors for diff baselines
//! - [`SerializeTarget`] — document / preview / clipboard / undo trimming modes
//!
//! # Design Rules
//!
//! 1. Property equality is textual: values that serialize to the same text
//!    are equal for diff purposes, whatever their in-memory form.
//! 2. Exactly one object is active per writer at a time; nested writes
//!    save and restore the cursor LIFO, on every exit path.
//! 3. A missing or failing baseline never aborts a write; the fallback is
//!    writing every property.

pub mod error;
pub mod reader;
pub mod registry;
pub mod target;
pub mod traits;
pub mod writer;

pub use error::{DiffError, DiffResult};
pub use reader::DiffReader;
pub use registry::BaselineRegistry;
pub use target::{full_name, short_name, SerializeTarget};
pub use traits::{Deserializable, Serializable};
pub use writer::{are_equal, DiffHook, DiffWriter, NULL_REF};
