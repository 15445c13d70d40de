//! Validator policy: closed-schema, per-key write validation
//!
//! A write is accepted only when the key already exists on the store, a
//! predicate is registered for it, and the predicate accepts the value.
//! A rejected write leaves the store untouched. Reads and deletes are not
//! trapped.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::error::ProxyError;
use crate::reflect;
use crate::traps::TrapSet;
use crate::value::Value;

/// Per-key predicate over candidate values
pub type Predicate = Rc<dyn Fn(&Value) -> bool>;

/// Mapping from key to predicate.
#[derive(Clone, Default)]
pub struct Validators {
    rules: FxHashMap<String, Predicate>,
}

impl Validators {
    /// Empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn rule<F>(mut self, key: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + 'static,
    {
        self.insert(key, predicate);
        self
    }

    /// Register (or replace) the predicate for `key`
    pub fn insert<F>(&mut self, key: impl Into<String>, predicate: F)
    where
        F: Fn(&Value) -> bool + 'static,
    {
        self.rules.insert(key.into(), Rc::new(predicate));
    }

    /// Predicate for `key`
    pub fn get(&self, key: &str) -> Option<&Predicate> {
        self.rules.get(key)
    }

    /// Whether `key` has a predicate
    pub fn contains(&self, key: &str) -> bool {
        self.rules.contains_key(key)
    }

    /// Number of registered predicates
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no predicate is registered
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl std::fmt::Debug for Validators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<&String> = self.rules.keys().collect();
        keys.sort();
        f.debug_struct("Validators").field("keys", &keys).finish()
    }
}

/// Build a trap set enforcing `validators` on every write.
pub fn validator_policy(validators: Validators) -> TrapSet {
    TrapSet::new().on_set(move |store, key, value| {
        if !reflect::has(store, key)? {
            tracing::debug!(key, "rejected write to unknown key");
            return Err(ProxyError::UnknownKey {
                key: key.to_string(),
            });
        }
        let predicate = validators.get(key).ok_or_else(|| ProxyError::NoValidator {
            key: key.to_string(),
        })?;
        if !predicate(&value) {
            tracing::debug!(key, %value, "validation failed");
            return Err(ProxyError::Validation {
                key: key.to_string(),
                value,
            });
        }
        reflect::set(store, key, value)
    })
}
