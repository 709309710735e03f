//! String interning pool for the reader.
//!
//! Report documents repeat the same names and attribute values thousands of
//! times ("Text", "true", font names). With interning enabled the reader
//! funnels every parsed string through this pool so repeated strings share a
//! single allocation. The trade is CPU (one hash lookup per string) for
//! memory, which is why interning is an explicit opt-in, default off.

use std::collections::HashSet;

use crate::node::IStr;

/// Deduplicating pool of shared strings.
#[derive(Debug, Default)]
pub struct StringPool {
    set: HashSet<IStr>,
}

impl StringPool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a shared copy of `s`, reusing an existing allocation when the
    /// same text was interned before.
    pub fn intern(&mut self, s: &str) -> IStr {
        if let Some(existing) = self.set.get(s) {
            return existing.clone();
        }
        let shared: IStr = IStr::from(s);
        self.set.insert(shared.clone());
        shared
    }

    /// Number of distinct strings held.
    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}
