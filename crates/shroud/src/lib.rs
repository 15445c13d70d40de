//! Shroud - object virtualization over key/value stores
//!
//! A [`VirtualHandle`] binds a [`Store`] to a [`TrapSet`] and routes every
//! structural operation (read, write, delete, existence, enumeration,
//! descriptor query, invocation) either to a caller-supplied trap or to the
//! native default on the store. Policies are ready-made trap sets:
//!
//! - [`observer_policy`] - notify after each write/delete
//! - [`validator_policy`] - closed-schema, per-key predicates
//! - [`encapsulation_policy`] - private keys are unreachable
//! - [`interception_policy`] - swap one named operation for another
//!
//! [`create_revocable_handle`] pairs a handle with a [`Revoker`] that
//! disables it permanently.
//!
//! # Example
//!
//! ```ignore
//! use shroud::{validator_policy, Record, Validators, VirtualHandle};
//!
//! let store = Record::new().with("count", 1).into_shared();
//! let validators = Validators::new().rule("count", |v| v.as_int().is_some_and(|n| n > 0));
//! let handle = VirtualHandle::new(store, validator_policy(validators));
//!
//! handle.write("count", 5)?;
//! assert!(handle.write("count", -1).is_err());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod config;
pub mod convert;
pub mod error;
pub mod handle;
pub mod policy;
pub mod reflect;
pub mod revocation;
pub mod store;
pub mod traps;
pub mod value;

pub use config::{ConfigError, EncapsulationConfig, InterceptionConfig, PolicyConfig};
pub use error::{HandleResult, ProxyError};
pub use handle::VirtualHandle;
pub use policy::{
    encapsulation_policy, encapsulation_policy_with, interception_policy, observer_policy,
    validator_policy, ChangeObserver, Interception, Predicate, PrivateKeyFilter, Validators,
};
pub use revocation::{create_revocable_handle, RevocationToken, Revoker};
pub use store::{KeyDescriptor, KeyFlags, Record, Store, StoreRef};
pub use traps::{InvokeTrap, TrapKind, TrapSet};
pub use value::{Operation, Value};

/// Bind `store` to `traps`; alias of [`VirtualHandle::new`]
pub fn create_virtual_handle(store: StoreRef, traps: TrapSet) -> VirtualHandle {
    VirtualHandle::new(store, traps)
}
