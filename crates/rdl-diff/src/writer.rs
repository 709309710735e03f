//! The differential object writer.
//!
//! Walks a polymorphic object graph and produces a markup tree holding, for
//! each object, only the properties that differ from a baseline instance of
//! the same class. The baseline is resolved per object: an explicit
//! comparison instance wins, then a registered diff hook, then the
//! [`BaselineRegistry`]; when all three miss, every property is written.
//!
//! Equality is textual: a property is dropped when it produces the same
//! serialized text as the baseline's, regardless of in-memory
//! representation.

use std::collections::HashMap;

use rdl_convert::Canonical;
use rdl_markup::Node;

use crate::error::{DiffError, DiffResult};
use crate::registry::BaselineRegistry;
use crate::target::{short_name, SerializeTarget};
use crate::traits::Serializable;

/// Literal written by [`DiffWriter::write_ref`] for an absent reference.
pub const NULL_REF: &str = "null";

/// Hook asked for a comparison instance before the registry is consulted.
pub type DiffHook = Box<dyn Fn(&dyn Serializable) -> Option<Box<dyn Serializable>>>;

/// One object currently being serialized: its node under construction and
/// the baseline's shadow node to diff against.
struct Frame {
    node: Node,
    diff: Option<Node>,
}

/// Serializes object graphs as markup trees with only-changed properties.
pub struct DiffWriter {
    target: SerializeTarget,
    save_children: bool,
    registry: BaselineRegistry,
    diff_hook: Option<DiffHook>,
    /// Serialized baseline per class name; `None` records a resolution
    /// miss so it is not retried.
    baseline_cache: HashMap<String, Option<Node>>,
    /// LIFO of objects being serialized; the top frame is the cursor.
    stack: Vec<Frame>,
    /// Completed tree. The first top-level object becomes the root;
    /// later top-level objects attach under it.
    root: Option<Node>,
}

impl DiffWriter {
    /// Create a writer for the given target with an empty registry.
    pub fn new(target: SerializeTarget) -> Self {
        Self {
            target,
            save_children: true,
            registry: BaselineRegistry::new(),
            diff_hook: None,
            baseline_cache: HashMap::new(),
            stack: Vec::new(),
            root: None,
        }
    }

    /// Create a writer with a baseline registry.
    pub fn with_registry(target: SerializeTarget, registry: BaselineRegistry) -> Self {
        Self {
            registry,
            ..Self::new(target)
        }
    }

    /// The writer's serialization target.
    pub fn target(&self) -> SerializeTarget {
        self.target
    }

    /// Toggle recursive serialization of child objects (on by default).
    pub fn set_save_children(&mut self, on: bool) {
        self.save_children = on;
    }

    /// Whether child objects are serialized recursively.
    pub fn save_children(&self) -> bool {
        self.save_children
    }

    /// Install a diff hook consulted before the registry.
    pub fn set_diff_hook(&mut self, hook: DiffHook) {
        self.diff_hook = Some(hook);
    }

    /// Serialize one object (and, when enabled, its children) under the
    /// current cursor.
    pub fn write(&mut self, obj: &dyn Serializable) -> DiffResult<()> {
        self.write_with(obj, None)
    }

    /// Serialize one object against an explicit comparison instance.
    ///
    /// Cursor and diff state are pushed before the object serializes and
    /// popped on every exit path, so nested `write` calls from inside
    /// `serialize` compose without the caller managing any stack.
    pub fn write_with(
        &mut self,
        obj: &dyn Serializable,
        comparison: Option<&dyn Serializable>,
    ) -> DiffResult<()> {
        let name = self.node_name_for(obj);
        let diff = self.resolve_baseline(obj, comparison);

        self.stack.push(Frame {
            node: Node::new(&name),
            diff,
        });
        let result = self.serialize_frame(obj);
        let frame = self.stack.pop().expect("writer frame stack underflow");

        if result.is_ok() {
            self.attach(frame.node);
        }
        result
    }

    /// Consume the writer and return the produced tree.
    pub fn into_root(self) -> Node {
        self.root.unwrap_or_default()
    }

    /// The produced tree so far, if any top-level object completed.
    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    // ---- property primitives -------------------------------------------
    //
    // All of these funnel into `set_attr`, which applies the target's
    // name abbreviation and the baseline diff.

    /// Write a string property.
    pub fn write_str(&mut self, name: &str, value: &str) -> DiffResult<()> {
        self.set_attr(name, value)
    }

    /// Write a boolean property (`true` / `false`).
    pub fn write_bool(&mut self, name: &str, value: bool) -> DiffResult<()> {
        self.set_attr(name, &value.to_canonical())
    }

    /// Write a 32-bit integer property.
    pub fn write_i32(&mut self, name: &str, value: i32) -> DiffResult<()> {
        self.set_attr(name, &value.to_canonical())
    }

    /// Write a single-precision float property (locale-invariant).
    pub fn write_f32(&mut self, name: &str, value: f32) -> DiffResult<()> {
        self.set_attr(name, &value.to_canonical())
    }

    /// Write a double-precision float property (locale-invariant).
    pub fn write_f64(&mut self, name: &str, value: f64) -> DiffResult<()> {
        self.set_attr(name, &value.to_canonical())
    }

    /// Write any value through its canonical text form (enums, colors,
    /// anything implementing [`Canonical`]).
    pub fn write_value(&mut self, name: &str, value: &dyn Canonical) -> DiffResult<()> {
        self.set_attr(name, &value.to_canonical())
    }

    /// Write a reference property: the referenced object's item name, or
    /// the literal `"null"` when absent.
    pub fn write_ref(&mut self, name: &str, target: Option<&dyn Serializable>) -> DiffResult<()> {
        match target {
            Some(obj) => {
                let value = obj.item_name().to_string();
                self.set_attr(name, &value)
            }
            None => self.set_attr(name, NULL_REF),
        }
    }

    // ---- internals -----------------------------------------------------

    fn serialize_frame(&mut self, obj: &dyn Serializable) -> DiffResult<()> {
        obj.serialize(self)?;
        if self.save_children {
            for child in obj.children() {
                self.write(child)?;
            }
        }
        Ok(())
    }

    fn attach(&mut self, node: Node) {
        if let Some(frame) = self.stack.last_mut() {
            frame.node.add_child(node);
        } else if let Some(root) = &mut self.root {
            root.add_child(node);
        } else {
            self.root = Some(node);
        }
    }

    fn set_attr(&mut self, name: &str, value: &str) -> DiffResult<()> {
        let name = if self.target.abbreviates() {
            short_name(name)
        } else {
            name
        };
        let frame = self.stack.last_mut().ok_or(DiffError::NoActiveObject)?;
        if let Some(diff) = &frame.diff {
            if diff.has_prop(name) && diff.get_prop(name) == value {
                return Ok(());
            }
        }
        frame.node.set_prop(name, value);
        Ok(())
    }

    fn node_name_for(&self, obj: &dyn Serializable) -> String {
        if self.target.uses_alias() {
            if let Some(alias) = obj.alias() {
                return alias.to_string();
            }
        }
        let name = obj.item_name();
        if name.is_empty() {
            obj.class_name().to_string()
        } else {
            name.to_string()
        }
    }

    /// Resolve the comparison baseline for `obj` and serialize it into a
    /// shadow node. Resolution misses and baseline serialization failures
    /// are swallowed: the fallback is "no baseline, write everything", so
    /// one misbehaving class never blocks the rest of the document.
    fn resolve_baseline(
        &mut self,
        obj: &dyn Serializable,
        explicit: Option<&dyn Serializable>,
    ) -> Option<Node> {
        if let Some(baseline) = explicit {
            return shadow_of(self.target, baseline);
        }
        if let Some(hook) = &self.diff_hook {
            if let Some(baseline) = hook(obj) {
                return shadow_of(self.target, baseline.as_ref());
            }
        }

        let class = obj.class_name();
        if let Some(cached) = self.baseline_cache.get(class) {
            return cached.clone();
        }
        let shadow = self
            .registry
            .create(class)
            .and_then(|baseline| shadow_of(self.target, baseline.as_ref()));
        self.baseline_cache
            .insert(class.to_string(), shadow.clone());
        shadow
    }
}

/// Serialize a baseline instance into a shadow node with diffing disabled,
/// so every property it emits is present for comparison.
fn shadow_of(target: SerializeTarget, baseline: &dyn Serializable) -> Option<Node> {
    let mut writer = DiffWriter::new(target);
    writer.set_save_children(false);
    writer.write(baseline).ok()?;
    writer.root.take()
}

/// Diff equality as the writer defines it: both absent, or canonical text
/// forms that match. The same definition drives internal property diffing;
/// it is exposed for callers building custom diff logic.
pub fn are_equal(a: Option<&dyn Canonical>, b: Option<&dyn Canonical>) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some(a), Some(b)) => {
            std::ptr::addr_eq(a as *const dyn Canonical, b as *const dyn Canonical)
                || a.to_canonical() == b.to_canonical()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Band {
        name: String,
        alias: Option<String>,
        left: f32,
        top: f32,
        height: f32,
        visible: bool,
        can_grow: bool,
        text: String,
        children: Vec<Band>,
    }

    impl Default for Band {
        fn default() -> Self {
            Self {
                name: String::new(),
                alias: None,
                left: 0.0,
                top: 0.0,
                height: 37.8,
                visible: true,
                can_grow: false,
                text: String::new(),
                children: Vec::new(),
            }
        }
    }

    impl Serializable for Band {
        fn item_name(&self) -> &str {
            &self.name
        }

        fn class_name(&self) -> &str {
            "Band"
        }

        fn alias(&self) -> Option<&str> {
            self.alias.as_deref()
        }

        fn serialize(&self, writer: &mut DiffWriter) -> DiffResult<()> {
            writer.write_f32("Left", self.left)?;
            writer.write_f32("Top", self.top)?;
            writer.write_f32("Height", self.height)?;
            writer.write_bool("Visible", self.visible)?;
            writer.write_bool("CanGrow", self.can_grow)?;
            writer.write_str("Text", &self.text)?;
            Ok(())
        }

        fn children(&self) -> Vec<&dyn Serializable> {
            self.children
                .iter()
                .map(|c| c as &dyn Serializable)
                .collect()
        }
    }

    fn band_registry() -> BaselineRegistry {
        let mut registry = BaselineRegistry::new();
        registry.register("Band", || Box::<Band>::default() as Box<dyn Serializable>);
        registry
    }

    #[test]
    fn identical_to_baseline_writes_zero_attributes() {
        let mut writer = DiffWriter::with_registry(SerializeTarget::Report, band_registry());
        writer.write(&Band::default()).unwrap();
        let root = writer.into_root();
        assert_eq!(root.name(), "Band");
        assert!(root.attributes().is_empty());
    }

    #[test]
    fn one_changed_property_writes_exactly_one_attribute() {
        let band = Band {
            can_grow: true,
            ..Band::default()
        };
        let mut writer = DiffWriter::with_registry(SerializeTarget::Report, band_registry());
        writer.write(&band).unwrap();
        let root = writer.into_root();
        assert_eq!(root.attributes().len(), 1);
        assert_eq!(root.get_prop("CanGrow"), "true");
    }

    #[test]
    fn registry_miss_writes_everything() {
        let mut writer = DiffWriter::new(SerializeTarget::Report);
        writer.write(&Band::default()).unwrap();
        let root = writer.into_root();
        // All six properties present: no baseline to trim against.
        assert_eq!(root.attributes().len(), 6);
        assert_eq!(root.get_prop("Visible"), "true");
        assert_eq!(root.get_prop("Height"), "37.8");
    }

    #[test]
    fn explicit_comparison_beats_registry() {
        let band = Band {
            left: 50.0,
            ..Band::default()
        };
        let comparison = Band {
            left: 50.0,
            visible: false,
            ..Band::default()
        };
        let mut writer = DiffWriter::with_registry(SerializeTarget::Report, band_registry());
        writer.write_with(&band, Some(&comparison)).unwrap();
        let root = writer.into_root();
        // Left matches the comparison; Visible differs from it.
        assert!(!root.has_prop("Left"));
        assert_eq!(root.get_prop("Visible"), "true");
    }

    #[test]
    fn diff_hook_is_consulted_before_registry() {
        let mut writer = DiffWriter::with_registry(SerializeTarget::Report, band_registry());
        writer.set_diff_hook(Box::new(|_| {
            Some(Box::new(Band {
                text: "hook default".into(),
                ..Band::default()
            }) as Box<dyn Serializable>)
        }));
        let band = Band {
            text: "hook default".into(),
            ..Band::default()
        };
        writer.write(&band).unwrap();
        let root = writer.into_root();
        // Text matches the hook's baseline, so nothing is written.
        assert!(root.attributes().is_empty());
    }

    #[test]
    fn children_serialize_recursively() {
        let band = Band {
            name: "PageHeader1".into(),
            children: vec![
                Band {
                    name: "Text1".into(),
                    text: "hello".into(),
                    ..Band::default()
                },
                Band {
                    name: "Text2".into(),
                    ..Band::default()
                },
            ],
            ..Band::default()
        };
        let mut writer = DiffWriter::with_registry(SerializeTarget::Report, band_registry());
        writer.write(&band).unwrap();
        let root = writer.into_root();
        assert_eq!(root.name(), "PageHeader1");
        assert_eq!(root.child_count(), 2);
        assert_eq!(root.children()[0].get_prop("Text"), "hello");
        assert!(root.children()[1].attributes().is_empty());
    }

    #[test]
    fn save_children_off_skips_children() {
        let band = Band {
            children: vec![Band::default()],
            ..Band::default()
        };
        let mut writer = DiffWriter::with_registry(SerializeTarget::Report, band_registry());
        writer.set_save_children(false);
        writer.write(&band).unwrap();
        assert_eq!(writer.into_root().child_count(), 0);
    }

    #[test]
    fn preview_target_abbreviates_property_names() {
        let band = Band {
            left: 9.45,
            text: "x".into(),
            can_grow: true,
            ..Band::default()
        };
        let mut writer = DiffWriter::with_registry(SerializeTarget::Preview, band_registry());
        writer.write(&band).unwrap();
        let root = writer.into_root();
        assert_eq!(root.get_prop("l"), "9.45");
        assert_eq!(root.get_prop("x"), "x");
        // Names outside the table stay full even in Preview.
        assert_eq!(root.get_prop("CanGrow"), "true");
        assert!(!root.has_prop("Left"));
    }

    #[test]
    fn alias_names_the_node_for_preview_targets() {
        let band = Band {
            name: "Text1".into(),
            alias: Some("BaseText1".into()),
            ..Band::default()
        };

        let mut writer = DiffWriter::with_registry(SerializeTarget::Preview, band_registry());
        writer.write(&band).unwrap();
        assert_eq!(writer.into_root().name(), "BaseText1");

        let mut writer = DiffWriter::with_registry(SerializeTarget::Report, band_registry());
        writer.write(&band).unwrap();
        assert_eq!(writer.into_root().name(), "Text1");
    }

    #[test]
    fn empty_item_name_falls_back_to_class_name() {
        let mut writer = DiffWriter::new(SerializeTarget::Report);
        writer.write(&Band::default()).unwrap();
        assert_eq!(writer.into_root().name(), "Band");
    }

    #[test]
    fn second_top_level_write_attaches_under_root() {
        let mut writer = DiffWriter::with_registry(SerializeTarget::Report, band_registry());
        writer
            .write(&Band {
                name: "Report1".into(),
                ..Band::default()
            })
            .unwrap();
        writer
            .write(&Band {
                name: "Late".into(),
                ..Band::default()
            })
            .unwrap();
        let root = writer.into_root();
        assert_eq!(root.name(), "Report1");
        assert_eq!(root.children()[0].name(), "Late");
    }

    #[test]
    fn write_ref_names_target_or_null() {
        struct WithRef<'a> {
            data_source: Option<&'a Band>,
        }
        impl Serializable for WithRef<'_> {
            fn item_name(&self) -> &str {
                "Text1"
            }
            fn class_name(&self) -> &str {
                "TextObject"
            }
            fn serialize(&self, writer: &mut DiffWriter) -> DiffResult<()> {
                writer.write_ref(
                    "DataSource",
                    self.data_source.map(|b| b as &dyn Serializable),
                )
            }
        }

        let source = Band {
            name: "Table1".into(),
            ..Band::default()
        };
        let mut writer = DiffWriter::new(SerializeTarget::Report);
        writer
            .write(&WithRef {
                data_source: Some(&source),
            })
            .unwrap();
        assert_eq!(writer.into_root().get_prop("DataSource"), "Table1");

        let mut writer = DiffWriter::new(SerializeTarget::Report);
        writer.write(&WithRef { data_source: None }).unwrap();
        assert_eq!(writer.into_root().get_prop("DataSource"), "null");
    }

    #[test]
    fn failing_serialize_restores_cursor_state() {
        struct Broken;
        impl Serializable for Broken {
            fn item_name(&self) -> &str {
                "Broken"
            }
            fn class_name(&self) -> &str {
                "Broken"
            }
            fn serialize(&self, _writer: &mut DiffWriter) -> DiffResult<()> {
                Err(DiffError::object("cannot serialize"))
            }
        }

        let mut writer = DiffWriter::with_registry(SerializeTarget::Report, band_registry());
        writer
            .write(&Band {
                name: "Root".into(),
                ..Band::default()
            })
            .unwrap();
        assert!(writer.write(&Broken).is_err());
        // The failed object left no node behind and the writer still works.
        writer
            .write(&Band {
                name: "After".into(),
                ..Band::default()
            })
            .unwrap();
        let root = writer.into_root();
        assert_eq!(root.child_count(), 1);
        assert_eq!(root.children()[0].name(), "After");
    }

    #[test]
    fn property_write_outside_serialize_is_an_error() {
        let mut writer = DiffWriter::new(SerializeTarget::Report);
        assert!(matches!(
            writer.write_str("Name", "x"),
            Err(DiffError::NoActiveObject)
        ));
    }

    #[test]
    fn are_equal_follows_canonical_text() {
        let a = 1.0f32;
        let b = 1.0f32;
        assert!(are_equal(Some(&a), Some(&a)));
        assert!(are_equal(Some(&a), Some(&b)));
        assert!(are_equal(None, None));
        assert!(!are_equal(Some(&a), None));
        let c = 2.0f32;
        assert!(!are_equal(Some(&a), Some(&c)));
        // Different types with identical canonical text are equal.
        let f = 1.0f64;
        let i = 1i32;
        assert!(are_equal(Some(&f), Some(&i)));
    }
}
