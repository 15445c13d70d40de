//! Interception policy: replace one named operation
//!
//! Reading the named member yields the replacement (bound to the store),
//! and invoking it runs the replacement directly; the native member is never
//! read or called. Every other key reads natively.

use std::rc::Rc;

use crate::reflect;
use crate::traps::TrapSet;
use crate::value::{Operation, Value};

/// Which member to replace, and with what.
#[derive(Debug, Clone)]
pub struct Interception {
    operation: String,
    replacement: Operation,
}

impl Interception {
    /// Replace member `operation` with `replacement`
    pub fn new(operation: impl Into<String>, replacement: Operation) -> Self {
        Self {
            operation: operation.into(),
            replacement,
        }
    }

    /// Build the trap set
    pub fn into_traps(self) -> TrapSet {
        let name = self.operation.clone();
        let replacement = self.replacement.clone();

        TrapSet::new()
            .on_get(move |store, key| {
                if key != name {
                    return reflect::get(store, key);
                }
                tracing::trace!(key, "serving intercepted operation");
                Ok(Value::Operation(if replacement.is_bound() {
                    replacement.clone()
                } else {
                    replacement.bind(Rc::clone(store))
                }))
            })
            .on_invoke(self.operation, self.replacement)
    }
}

/// Build a trap set that swaps member `operation_name` for `replacement`.
pub fn interception_policy(operation_name: impl Into<String>, replacement: Operation) -> TrapSet {
    Interception::new(operation_name, replacement).into_traps()
}
