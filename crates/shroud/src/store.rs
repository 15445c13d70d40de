//! Store: the collaborator interface a handle forwards to
//!
//! A handle never owns or copies its store; it holds a [`StoreRef`] and
//! forwards each operation. Any type implementing [`Store`] can be wrapped,
//! including another [`VirtualHandle`](crate::VirtualHandle), which is how
//! policies stack.
//!
//! [`Record`] is the stock implementation: an insertion-ordered map with
//! per-key `writable` / `enumerable` flags.
//!
//! Every [`Store`] method takes `&self`. Implementations keep their own
//! interior mutability and release it before returning, so a trap or
//! observer may re-enter any store in the chain while an outer operation on
//! it is still running.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::{HandleResult, ProxyError};
use crate::value::Value;

/// Shared, externally owned reference to a store
pub type StoreRef = Rc<dyn Store>;

/// Native key/value operations a handle falls back to.
///
/// All operations are fallible so that a handle (whose traps may fail) can
/// itself serve as a store.
pub trait Store {
    /// Read a key; `Value::Undefined` when absent
    fn get(&self, key: &str) -> HandleResult<Value>;

    /// Write a key, creating it when absent
    fn set(&self, key: &str, value: Value) -> HandleResult<()>;

    /// Check native containment
    fn has(&self, key: &str) -> HandleResult<bool>;

    /// Remove a key if present
    fn delete(&self, key: &str) -> HandleResult<()>;

    /// Own enumerable keys, in store order
    fn keys(&self) -> HandleResult<Vec<String>>;

    /// Descriptor of a key, or `None` when absent
    fn describe(&self, key: &str) -> HandleResult<Option<KeyDescriptor>>;
}

/// Metadata about one member of a store.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDescriptor {
    /// Current value
    pub value: Value,
    /// Whether native writes are accepted
    pub writable: bool,
    /// Whether the key shows up in enumeration
    pub enumerable: bool,
    /// Whether the key may be deleted
    pub configurable: bool,
}

impl KeyDescriptor {
    /// Default data descriptor (writable, enumerable, configurable)
    pub fn data(value: Value) -> Self {
        Self {
            value,
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }
}

/// Attribute flags for [`Record::define`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyFlags {
    /// Accept native writes
    pub writable: bool,
    /// Include in `keys()`
    pub enumerable: bool,
}

impl KeyFlags {
    /// Writable and enumerable
    pub const DEFAULT: Self = Self {
        writable: true,
        enumerable: true,
    };
    /// Enumerable but rejects writes
    pub const READ_ONLY: Self = Self {
        writable: false,
        enumerable: true,
    };
    /// Writable but skipped by enumeration
    pub const HIDDEN: Self = Self {
        writable: true,
        enumerable: false,
    };
}

impl Default for KeyFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone)]
struct Slot {
    value: Value,
    flags: KeyFlags,
}

/// Plain in-memory record.
///
/// Keys keep insertion order; deleting a key leaves the order of the
/// remaining keys untouched.
#[derive(Debug, Clone, Default)]
pub struct Record {
    slots: RefCell<IndexMap<String, Slot>>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or overwrite a key with default flags, bypassing `writable`.
    ///
    /// Returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.define(key, value, KeyFlags::DEFAULT)
    }

    /// Insert or overwrite a key with explicit flags.
    ///
    /// Returns the previous value.
    pub fn define(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
        flags: KeyFlags,
    ) -> Option<Value> {
        self.slots
            .get_mut()
            .insert(
                key.into(),
                Slot {
                    value: value.into(),
                    flags,
                },
            )
            .map(|slot| slot.value)
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.slots
            .get_mut()
            .shift_remove(key)
            .map(|slot| slot.value)
    }

    /// Copy of a value without going through the trait
    pub fn value(&self, key: &str) -> Option<Value> {
        self.slots.borrow().get(key).map(|slot| slot.value.clone())
    }

    /// Number of keys, enumerable or not
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Whether the record has no keys
    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    /// Move into a shared reference suitable for a handle
    pub fn into_shared(self) -> StoreRef {
        Rc::new(self)
    }
}

impl Store for Record {
    fn get(&self, key: &str) -> HandleResult<Value> {
        Ok(self.value(key).unwrap_or_default())
    }

    fn set(&self, key: &str, value: Value) -> HandleResult<()> {
        let mut slots = self.slots.borrow_mut();
        match slots.get_mut(key) {
            Some(slot) if !slot.flags.writable => Err(ProxyError::ReadOnlyKey {
                key: key.to_string(),
            }),
            Some(slot) => {
                slot.value = value;
                Ok(())
            }
            None => {
                slots.insert(
                    key.to_string(),
                    Slot {
                        value,
                        flags: KeyFlags::DEFAULT,
                    },
                );
                Ok(())
            }
        }
    }

    fn has(&self, key: &str) -> HandleResult<bool> {
        Ok(self.slots.borrow().contains_key(key))
    }

    fn delete(&self, key: &str) -> HandleResult<()> {
        self.slots.borrow_mut().shift_remove(key);
        Ok(())
    }

    fn keys(&self) -> HandleResult<Vec<String>> {
        Ok(self
            .slots
            .borrow()
            .iter()
            .filter(|(_, slot)| slot.flags.enumerable)
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn describe(&self, key: &str) -> HandleResult<Option<KeyDescriptor>> {
        Ok(self.slots.borrow().get(key).map(|slot| KeyDescriptor {
            value: slot.value.clone(),
            writable: slot.flags.writable,
            enumerable: slot.flags.enumerable,
            configurable: true,
        }))
    }
}
