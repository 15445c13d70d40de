//! Policy builders
//!
//! Each policy is a function returning a [`TrapSet`](crate::TrapSet). The
//! policies are independent; to combine two, wrap one handle in another
//! (see [`VirtualHandle::into_shared`](crate::VirtualHandle::into_shared)).
//!
//! | Policy         | Hooks installed                                   |
//! |----------------|---------------------------------------------------|
//! | observer       | `Set`, `Delete`                                   |
//! | validator      | `Set`                                             |
//! | encapsulation  | `Get`, `Set`, `Delete`, `HasKey`, `KeysOf`, `DescribeKey` |
//! | interception   | `Get`, `Invoke`                                   |

mod encapsulation;
mod interception;
mod observer;
mod validator;

pub use encapsulation::{encapsulation_policy, encapsulation_policy_with, PrivateKeyFilter};
pub use interception::{interception_policy, Interception};
pub use observer::{observer_policy, ChangeObserver};
pub use validator::{validator_policy, Predicate, Validators};
