//! Baseline construction registry.
//!
//! The diff writer compares each object against a freshly-constructed
//! default instance of its own class. Instead of reflection, classes
//! register a zero-arg constructor here; a missing registration is an
//! ordinary branch (the writer falls back to writing every property), not
//! an error.

use std::collections::HashMap;

use crate::traits::Serializable;

type Constructor = Box<dyn Fn() -> Box<dyn Serializable>>;

/// Maps class names to zero-arg baseline constructors.
#[derive(Default)]
pub struct BaselineRegistry {
    constructors: HashMap<String, Constructor>,
}

impl BaselineRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for `class_name`, replacing any previous one.
    pub fn register<F>(&mut self, class_name: &str, constructor: F)
    where
        F: Fn() -> Box<dyn Serializable> + 'static,
    {
        self.constructors
            .insert(class_name.to_string(), Box::new(constructor));
    }

    /// Construct a baseline instance, or `None` when the class is not
    /// registered.
    pub fn create(&self, class_name: &str) -> Option<Box<dyn Serializable>> {
        self.constructors.get(class_name).map(|ctor| ctor())
    }

    /// Whether a constructor is registered for `class_name`.
    pub fn contains(&self, class_name: &str) -> bool {
        self.constructors.contains_key(class_name)
    }
}

impl std::fmt::Debug for BaselineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaselineRegistry")
            .field("classes", &self.constructors.len())
            .finish()
    }
}
