//! The self-serialization capability.

use crate::error::DiffResult;
use crate::reader::DiffReader;
use crate::writer::DiffWriter;

/// An object that can serialize itself through the diff writer.
///
/// Implementations emit their properties through the writer's property
/// primitives; the writer decides which of them actually land in the
/// output by diffing against a baseline instance of the same class. The
/// writer depends only on this trait, never on concrete object types.
pub trait Serializable {
    /// Name used for this object's markup node (typically the object's
    /// user-visible name, e.g. `"Page1"`). An empty item name falls back
    /// to the class name.
    fn item_name(&self) -> &str;

    /// Concrete class name, the key for baseline-registry lookups.
    fn class_name(&self) -> &str;

    /// Alternate node name used by targets that prefer aliases (an
    /// inherited object's name in its ancestor report). `None` for
    /// ordinary objects.
    fn alias(&self) -> Option<&str> {
        None
    }

    /// Emit this object's properties through the writer.
    fn serialize(&self, writer: &mut DiffWriter) -> DiffResult<()>;

    /// Child objects, serialized recursively when the writer's
    /// save-children flag is on.
    fn children(&self) -> Vec<&dyn Serializable> {
        Vec::new()
    }
}

/// An object that can restore itself from a markup node.
///
/// The mirror of [`Serializable`]: one object per node, properties read
/// through the reader's typed primitives (absent attributes keep the
/// caller-supplied defaults), child nodes resolved by the caller into
/// child objects.
pub trait Deserializable {
    /// Restore this object's properties from the reader.
    fn deserialize(&mut self, reader: &DiffReader<'_>) -> DiffResult<()>;
}
