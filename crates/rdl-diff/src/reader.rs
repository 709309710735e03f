//! The differential object reader.
//!
//! The mirror of the writer: wraps a markup node and hands typed property
//! values back to an object's `deserialize`. Absent attributes keep the
//! caller's defaults (a diffed document only stores what changed), and
//! abbreviated Preview names resolve transparently.

use rdl_convert::{bool_from_canonical, f32_from_canonical, f64_from_canonical, i32_from_canonical};
use rdl_markup::Node;

use crate::error::DiffResult;
use crate::target::short_name;
use crate::traits::Deserializable;
use crate::writer::NULL_REF;

/// Read cursor over one object's markup node.
#[derive(Clone, Copy, Debug)]
pub struct DiffReader<'a> {
    node: &'a Node,
}

impl<'a> DiffReader<'a> {
    /// Wrap a node for reading.
    pub fn new(node: &'a Node) -> Self {
        Self { node }
    }

    /// The underlying node.
    pub fn node(&self) -> &'a Node {
        self.node
    }

    /// The object's node name (its item name, or alias in preview trees).
    pub fn item_name(&self) -> &'a str {
        self.node.name()
    }

    /// Raw property text by full name, falling back to the Preview
    /// short name. `None` when the attribute is absent.
    pub fn read_str(&self, name: &str) -> Option<&'a str> {
        if self.node.has_prop(name) {
            return Some(self.node.get_prop(name));
        }
        let short = short_name(name);
        if short != name && self.node.has_prop(short) {
            return Some(self.node.get_prop(short));
        }
        None
    }

    /// String property with a default for the absent case.
    pub fn read_str_or(&self, name: &str, default: &'a str) -> &'a str {
        self.read_str(name).unwrap_or(default)
    }

    /// Boolean property; absent keeps `default`, present must parse.
    pub fn read_bool_or(&self, name: &str, default: bool) -> DiffResult<bool> {
        match self.read_str(name) {
            Some(text) => Ok(bool_from_canonical(text)?),
            None => Ok(default),
        }
    }

    /// 32-bit integer property; absent keeps `default`.
    pub fn read_i32_or(&self, name: &str, default: i32) -> DiffResult<i32> {
        match self.read_str(name) {
            Some(text) => Ok(i32_from_canonical(text)?),
            None => Ok(default),
        }
    }

    /// Single-precision float property; absent keeps `default`.
    pub fn read_f32_or(&self, name: &str, default: f32) -> DiffResult<f32> {
        match self.read_str(name) {
            Some(text) => Ok(f32_from_canonical(text)?),
            None => Ok(default),
        }
    }

    /// Double-precision float property; absent keeps `default`.
    pub fn read_f64_or(&self, name: &str, default: f64) -> DiffResult<f64> {
        match self.read_str(name) {
            Some(text) => Ok(f64_from_canonical(text)?),
            None => Ok(default),
        }
    }

    /// Reference property: the referenced object's name, with both the
    /// absent attribute and the literal `"null"` mapping to `None`.
    pub fn read_ref(&self, name: &str) -> Option<&'a str> {
        match self.read_str(name) {
            None => None,
            Some(NULL_REF) => None,
            Some(target) => Some(target),
        }
    }

    /// One reader per child node, in document order.
    pub fn children(&self) -> impl Iterator<Item = DiffReader<'a>> + '_ {
        self.node.children().iter().map(DiffReader::new)
    }

    /// Drive an object's own `deserialize` against this node.
    pub fn read_object(&self, obj: &mut dyn Deserializable) -> DiffResult<()> {
        obj.deserialize(self)
    }
}
