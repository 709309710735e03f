//! The markup node tree.
//!
//! A [`Node`] is one element of the tree: a name, an ordered attribute list,
//! an ordered child list, and a text value. Children are owned exclusively
//! by their parent, so detaching a child moves it out of the tree and there
//! is no dangling back-reference to sever.
//!
//! Strings are stored as `Arc<str>` ([`IStr`]) so the reader's optional
//! interning pool can share one allocation across repeated names and values.

use std::sync::Arc;

/// Shared immutable string used throughout the node tree.
pub type IStr = Arc<str>;

fn istr(s: &str) -> IStr {
    Arc::from(s)
}

/// One attribute: a key/value pair of strings.
///
/// Keys are unique within a node and stored case-sensitively.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub key: IStr,
    pub value: IStr,
}

/// One element of the markup tree.
///
/// A node meaningfully carries either children or a text value, never both:
/// the writer ignores the value when children are present. Siblings may
/// share a name; child order is insertion order and is semantically
/// significant.
#[derive(Clone, Debug, Default)]
pub struct Node {
    name: IStr,
    value: IStr,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

impl Node {
    /// Create an empty node with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: istr(name),
            ..Self::default()
        }
    }

    pub(crate) fn with_name(name: IStr) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the element.
    pub fn set_name(&mut self, name: &str) {
        self.name = istr(name);
    }

    /// Text value (empty for non-leaf nodes).
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Set the text value.
    pub fn set_value(&mut self, value: &str) {
        self.value = istr(value);
    }

    pub(crate) fn set_value_interned(&mut self, value: IStr) {
        self.value = value;
    }

    // ---- children ------------------------------------------------------

    /// Direct children, in insertion order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Mutable access to direct children.
    pub fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Append a new empty child and return it.
    pub fn add(&mut self) -> &mut Node {
        self.children.push(Node::default());
        self.children.last_mut().unwrap()
    }

    /// Append an existing node as the last child (the attach half of a
    /// reparenting move) and return it.
    pub fn add_child(&mut self, child: Node) -> &mut Node {
        self.children.push(child);
        self.children.last_mut().unwrap()
    }

    /// Detach and return the child at `index` (the detach half of a
    /// reparenting move).
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn take_child(&mut self, index: usize) -> Node {
        self.children.remove(index)
    }

    /// Remove and drop the child at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn remove_child(&mut self, index: usize) {
        self.children.remove(index);
    }

    /// Case-insensitive search for a direct child by name. Returns the
    /// index of the first match.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Case-insensitive child lookup by name.
    pub fn find_node(&self, name: &str) -> Option<&Node> {
        self.find(name).map(|i| &self.children[i])
    }

    /// Case-insensitive child lookup; creates and appends an empty child
    /// with the given name when absent.
    ///
    /// Callers treat the tree as a sparse associative structure (settings
    /// storage relies on this auto-vivification).
    pub fn find_or_create(&mut self, name: &str) -> &mut Node {
        match self.find(name) {
            Some(i) => &mut self.children[i],
            None => self.add_child(Node::new(name)),
        }
    }

    // ---- attributes ----------------------------------------------------

    /// Attributes, in insertion order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Attribute value for `key`, or `""` when absent.
    ///
    /// An absent key and a key explicitly set to the empty string are
    /// indistinguishable here; use [`Node::has_prop`] when the difference
    /// matters.
    pub fn get_prop(&self, key: &str) -> &str {
        let key = key.trim();
        self.attributes
            .iter()
            .find(|a| &*a.key == key)
            .map(|a| &*a.value)
            .unwrap_or("")
    }

    /// Whether an attribute with `key` exists, even if its value is empty.
    pub fn has_prop(&self, key: &str) -> bool {
        let key = key.trim();
        self.attributes.iter().any(|a| &*a.key == key)
    }

    /// Insert or update an attribute. Key whitespace is trimmed.
    pub fn set_prop(&mut self, key: &str, value: &str) {
        self.set_prop_interned(istr(key.trim()), istr(value));
    }

    pub(crate) fn set_prop_interned(&mut self, key: IStr, value: IStr) {
        match self.attributes.iter_mut().find(|a| a.key == key) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute { key, value }),
        }
    }

    /// Remove an attribute. Returns whether it was present.
    pub fn remove_prop(&mut self, key: &str) -> bool {
        let key = key.trim();
        match self.attributes.iter().position(|a| &*a.key == key) {
            Some(i) => {
                self.attributes.remove(i);
                true
            }
            None => false,
        }
    }

    /// Drop all attributes, keeping name, value and children.
    pub fn clear_props(&mut self) {
        self.attributes.clear();
    }

    /// Drop attributes, children and text value, keeping the name.
    pub fn clear(&mut self) {
        self.attributes.clear();
        self.children.clear();
        self.value = IStr::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_appends_empty_child() {
        let mut root = Node::new("Root");
        root.add().set_name("First");
        root.add().set_name("Second");
        assert_eq!(root.child_count(), 2);
        assert_eq!(root.children()[0].name(), "First");
        assert_eq!(root.children()[1].name(), "Second");
    }

    #[test]
    fn find_is_case_insensitive_storage_is_not() {
        let mut root = Node::new("Root");
        root.add_child(Node::new("UIOptions"));
        assert_eq!(root.find("uioptions"), Some(0));
        assert_eq!(root.children()[0].name(), "UIOptions");
    }

    #[test]
    fn find_or_create_vivifies_once() {
        let mut root = Node::new("Root");
        root.find_or_create("Settings").set_prop("a", "1");
        root.find_or_create("settings").set_prop("b", "2");
        assert_eq!(root.child_count(), 1);
        assert_eq!(root.children()[0].get_prop("a"), "1");
        assert_eq!(root.children()[0].get_prop("b"), "2");
    }

    #[test]
    fn siblings_may_share_a_name() {
        let mut root = Node::new("Root");
        root.add_child(Node::new("Item"));
        root.add_child(Node::new("Item"));
        assert_eq!(root.child_count(), 2);
    }

    #[test]
    fn get_prop_misses_return_empty() {
        let mut node = Node::new("N");
        assert_eq!(node.get_prop("absent"), "");
        assert!(!node.has_prop("absent"));
        node.set_prop("k", "");
        assert_eq!(node.get_prop("k"), "");
        assert!(node.has_prop("k"));
    }

    #[test]
    fn set_prop_upserts_and_trims_keys() {
        let mut node = Node::new("N");
        node.set_prop(" Width ", "100");
        node.set_prop("Width", "200");
        assert_eq!(node.attributes().len(), 1);
        assert_eq!(node.get_prop("Width"), "200");
    }

    #[test]
    fn remove_prop_reports_presence() {
        let mut node = Node::new("N");
        node.set_prop("k", "v");
        assert!(node.remove_prop("k"));
        assert!(!node.remove_prop("k"));
    }

    #[test]
    fn take_child_reparents() {
        let mut a = Node::new("A");
        let mut b = Node::new("B");
        a.add_child(Node::new("Moved"));
        let moved = a.take_child(0);
        b.add_child(moved);
        assert_eq!(a.child_count(), 0);
        assert_eq!(b.children()[0].name(), "Moved");
    }
}
