//! Virtual Handle: the dispatch core
//!
//! Every operation on a [`VirtualHandle`] runs the same three steps:
//!
//! 1. fail with [`ProxyError::Revoked`] if the handle's token is revoked
//! 2. run the matching trap if the [`TrapSet`] defines one
//! 3. otherwise run the native default from [`reflect`]
//!
//! The handle adds no side effects of its own and passes trap errors
//! through unchanged. Nothing is cached; each call sees the live store.

use std::fmt;
use std::rc::Rc;

use crate::error::{HandleResult, ProxyError};
use crate::reflect;
use crate::revocation::{RevocationToken, Revoker};
use crate::store::{KeyDescriptor, Store, StoreRef};
use crate::traps::{TrapKind, TrapSet};
use crate::value::Value;

/// Wrapper binding one store to one trap set.
#[derive(Clone)]
pub struct VirtualHandle {
    store: StoreRef,
    traps: Rc<TrapSet>,
    revocation: Option<RevocationToken>,
}

impl fmt::Debug for VirtualHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualHandle")
            .field("traps", &self.traps)
            .field("revocable", &self.revocation.is_some())
            .field("revoked", &self.is_revoked())
            .finish_non_exhaustive()
    }
}

impl VirtualHandle {
    /// Bind `store` to `traps`. Never fails.
    pub fn new(store: StoreRef, traps: TrapSet) -> Self {
        Self {
            store,
            traps: Rc::new(traps),
            revocation: None,
        }
    }

    /// Bind `store` to `traps` and hand back the capability that revokes it
    pub fn revocable(store: StoreRef, traps: TrapSet) -> (Self, Revoker) {
        let token = RevocationToken::new();
        let handle = Self {
            store,
            traps: Rc::new(traps),
            revocation: Some(token.clone()),
        };
        (handle, Revoker::new(token))
    }

    /// The wrapped store
    pub fn store(&self) -> &StoreRef {
        &self.store
    }

    /// The bound trap set
    pub fn traps(&self) -> &TrapSet {
        &self.traps
    }

    /// Whether this handle has been revoked
    pub fn is_revoked(&self) -> bool {
        self.revocation
            .as_ref()
            .is_some_and(RevocationToken::is_revoked)
    }

    /// Move into a shared reference so another handle can wrap this one
    pub fn into_shared(self) -> StoreRef {
        Rc::new(self)
    }

    fn guard(&self, op: TrapKind, key: Option<&str>) -> HandleResult<()> {
        if self.is_revoked() {
            tracing::debug!(op = %op, key, "operation on revoked handle");
            return Err(ProxyError::Revoked);
        }
        tracing::trace!(op = %op, key, trapped = self.traps.defines(op), "dispatch");
        Ok(())
    }

    /// Read a member
    pub fn read(&self, key: &str) -> HandleResult<Value> {
        self.guard(TrapKind::Get, Some(key))?;
        match self.traps.get_trap() {
            Some(trap) => trap(&self.store, key),
            None => reflect::get(&self.store, key),
        }
    }

    /// Write a member
    pub fn write(&self, key: &str, value: impl Into<Value>) -> HandleResult<()> {
        self.guard(TrapKind::Set, Some(key))?;
        let value = value.into();
        match self.traps.set_trap() {
            Some(trap) => trap(&self.store, key, value),
            None => reflect::set(&self.store, key, value),
        }
    }

    /// Delete a member
    pub fn remove(&self, key: &str) -> HandleResult<()> {
        self.guard(TrapKind::Delete, Some(key))?;
        match self.traps.delete_trap() {
            Some(trap) => trap(&self.store, key),
            None => reflect::delete(&self.store, key),
        }
    }

    /// Query member existence
    pub fn contains(&self, key: &str) -> HandleResult<bool> {
        self.guard(TrapKind::HasKey, Some(key))?;
        match self.traps.has_key_trap() {
            Some(trap) => trap(&self.store, key),
            None => reflect::has(&self.store, key),
        }
    }

    /// Enumerate members
    pub fn list_keys(&self) -> HandleResult<Vec<String>> {
        self.guard(TrapKind::KeysOf, None)?;
        match self.traps.keys_of_trap() {
            Some(trap) => trap(&self.store),
            None => reflect::own_keys(&self.store),
        }
    }

    /// Query a member's descriptor; `None` means absent
    pub fn describe(&self, key: &str) -> HandleResult<Option<KeyDescriptor>> {
        self.guard(TrapKind::DescribeKey, Some(key))?;
        match self.traps.describe_key_trap() {
            Some(trap) => trap(&self.store, key),
            None => reflect::describe(&self.store, key),
        }
    }

    /// Invoke a member as an operation.
    ///
    /// An invoke hook registered for `key` runs directly. Any other member
    /// is read through the normal `Get` dispatch and called with the
    /// wrapped store as receiver.
    pub fn invoke(&self, key: &str, args: &[Value]) -> HandleResult<Value> {
        self.guard(TrapKind::Invoke, Some(key))?;
        if let Some(trap) = self.traps.invoke_trap().filter(|t| t.matches(key)) {
            return reflect::apply(trap.body(), &self.store, args);
        }
        match self.read(key)? {
            Value::Operation(op) => reflect::apply(&op, &self.store, args),
            _ => Err(ProxyError::NotInvocable {
                key: key.to_string(),
            }),
        }
    }
}

/// A handle is itself a store, so handles nest.
impl Store for VirtualHandle {
    fn get(&self, key: &str) -> HandleResult<Value> {
        self.read(key)
    }

    fn set(&self, key: &str, value: Value) -> HandleResult<()> {
        self.write(key, value)
    }

    fn has(&self, key: &str) -> HandleResult<bool> {
        self.contains(key)
    }

    fn delete(&self, key: &str) -> HandleResult<()> {
        self.remove(key)
    }

    fn keys(&self) -> HandleResult<Vec<String>> {
        self.list_keys()
    }

    fn describe(&self, key: &str) -> HandleResult<Option<KeyDescriptor>> {
        VirtualHandle::describe(self, key)
    }
}
