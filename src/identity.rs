//! Identity generation for generated values
//!
//! An `IdentityGenerator` hands out monotonically increasing identities and
//! memoizes them per source value, so that the same source object met again
//! during recursive generation receives the identity it got the first time.
//!
//! In the default [`IdentityMode::Reference`] mode two sources share an
//! identity only when they are the same allocation (`Rc::ptr_eq`); in
//! [`IdentityMode::Value`] mode structurally equal sources share one.
//!
//! A generator belongs to exactly one generation run. Assignment order is
//! part of what makes a run reproducible, so a generator is never shared
//! between runs.

use crate::model::Identity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityMode {
    #[default]
    Reference,
    Value,
}

#[derive(Debug)]
pub struct IdentityGenerator<T> {
    mode: IdentityMode,
    last: u64,
    // The `Rc` is kept alive so its address cannot be reused by another source.
    by_reference: HashMap<*const T, (Rc<T>, Identity)>,
    by_value: HashMap<T, Identity>,
}

impl<T: Eq + Hash + Clone> IdentityGenerator<T> {
    /// Create a generator whose first identity is `offset + 1`
    pub fn new(mode: IdentityMode, offset: u64) -> Self {
        Self {
            mode,
            last: offset,
            by_reference: HashMap::new(),
            by_value: HashMap::new(),
        }
    }

    pub fn reference_preserving(offset: u64) -> Self {
        Self::new(IdentityMode::Reference, offset)
    }

    pub fn value_preserving(offset: u64) -> Self {
        Self::new(IdentityMode::Value, offset)
    }

    pub fn mode(&self) -> IdentityMode {
        self.mode
    }

    /// Allocate a fresh identity that is not tied to any source value
    pub fn create_id(&mut self) -> Identity {
        self.last += 1;
        Identity(self.last)
    }

    /// Identity of `source`, allocating one on first sight
    pub fn identity_for(&mut self, source: &Rc<T>) -> Identity {
        match self.mode {
            IdentityMode::Reference => {
                let key = Rc::as_ptr(source);
                if let Some((_, id)) = self.by_reference.get(&key) {
                    return *id;
                }
                let id = self.create_id();
                self.by_reference.insert(key, (Rc::clone(source), id));
                id
            }
            IdentityMode::Value => {
                if let Some(id) = self.by_value.get(source.as_ref()) {
                    return *id;
                }
                let id = self.create_id();
                self.by_value.insert(T::clone(source), id);
                id
            }
        }
    }

    /// Number of memoized source values
    pub fn len(&self) -> usize {
        self.by_reference.len() + self.by_value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Source(&'static str);

    #[test]
    fn test_same_reference_gets_same_identity() {
        let mut ids = IdentityGenerator::reference_preserving(0);
        let source = Rc::new(Source("a"));

        let first = ids.identity_for(&source);
        let second = ids.identity_for(&Rc::clone(&source));

        assert_eq!(first, second);
        assert_eq!(first, Identity(1));
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_equal_values_get_distinct_identities_by_default() {
        let mut ids = IdentityGenerator::reference_preserving(0);
        let a = ids.identity_for(&Rc::new(Source("a")));
        let b = ids.identity_for(&Rc::new(Source("a")));
        assert_ne!(a, b);
    }

    #[test]
    fn test_value_mode_shares_identities_between_equal_values() {
        let mut ids = IdentityGenerator::value_preserving(10);
        let a = ids.identity_for(&Rc::new(Source("a")));
        let b = ids.identity_for(&Rc::new(Source("a")));
        let c = ids.identity_for(&Rc::new(Source("c")));

        assert_eq!(a, b);
        assert_eq!(a, Identity(11));
        assert_eq!(c, Identity(12));
    }

    #[test]
    fn test_fresh_identities_never_collide_with_memoized_ones() {
        let mut ids = IdentityGenerator::reference_preserving(0);
        let source = Rc::new(Source("a"));
        let memoized = ids.identity_for(&source);
        let fresh = ids.create_id();

        assert_ne!(memoized, fresh);
        assert_eq!(ids.identity_for(&source), memoized);
    }
}
