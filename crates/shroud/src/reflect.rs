//! Default operations
//!
//! These are the native store operations a handle performs when no trap is
//! defined, and the building blocks traps use to reach the store themselves.
//!
//! Stores manage their own interior mutability and hold no borrow across a
//! call, so traps, observers and operation bodies may touch the store again,
//! including through an enclosing handle.

use crate::error::HandleResult;
use crate::store::{KeyDescriptor, StoreRef};
use crate::value::{Operation, Value};

/// Native read
pub fn get(store: &StoreRef, key: &str) -> HandleResult<Value> {
    store.get(key)
}

/// Native write
pub fn set(store: &StoreRef, key: &str, value: Value) -> HandleResult<()> {
    store.set(key, value)
}

/// Native delete
pub fn delete(store: &StoreRef, key: &str) -> HandleResult<()> {
    store.delete(key)
}

/// Native containment check
pub fn has(store: &StoreRef, key: &str) -> HandleResult<bool> {
    store.has(key)
}

/// Native enumerable keys
pub fn own_keys(store: &StoreRef) -> HandleResult<Vec<String>> {
    store.keys()
}

/// Native descriptor query
pub fn describe(store: &StoreRef, key: &str) -> HandleResult<Option<KeyDescriptor>> {
    store.describe(key)
}

/// Call `op` with `receiver` as its store (a bound receiver wins)
pub fn apply(op: &Operation, receiver: &StoreRef, args: &[Value]) -> HandleResult<Value> {
    op.call_with(receiver, args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Record;

    #[test]
    fn test_defaults_hit_the_store() {
        let store = Record::new().with("a", 1).into_shared();

        assert_eq!(get(&store, "a").unwrap(), Value::Int(1));
        set(&store, "b", Value::Int(2)).unwrap();
        assert!(has(&store, "b").unwrap());
        assert_eq!(own_keys(&store).unwrap(), vec!["a", "b"]);
        delete(&store, "a").unwrap();
        assert_eq!(describe(&store, "a").unwrap(), None);
        assert_eq!(
            describe(&store, "b").unwrap(),
            Some(KeyDescriptor::data(Value::Int(2)))
        );
    }

    #[test]
    fn test_apply_allows_reentrant_store_access() {
        let store = Record::new().with("hits", 0).into_shared();
        let bump = Operation::method(|this, _| {
            let hits = get(this, "hits")?.as_int().unwrap_or(0) + 1;
            set(this, "hits", Value::Int(hits))?;
            Ok(Value::Int(hits))
        });

        assert_eq!(apply(&bump, &store, &[]).unwrap(), Value::Int(1));
        assert_eq!(apply(&bump, &store, &[]).unwrap(), Value::Int(2));
        assert_eq!(get(&store, "hits").unwrap(), Value::Int(2));
    }
}
