//! Trap Set: the dispatch table a handle consults
//!
//! A [`TrapSet`] holds at most one hook per [`TrapKind`]. Absent hooks fall
//! through to the defaults in [`reflect`](crate::reflect). The table is
//! assembled with a consuming builder and frozen behind an `Rc` once a
//! handle takes it; policy state is captured by the hook closures at
//! construction time.
//!
//! ## Hooks
//!
//! | Kind          | Hook signature                                   |
//! |---------------|--------------------------------------------------|
//! | `Get`         | `(store, key) -> Value`                          |
//! | `Set`         | `(store, key, value) -> ()`                      |
//! | `Delete`      | `(store, key) -> ()`                             |
//! | `HasKey`      | `(store, key) -> bool`                           |
//! | `KeysOf`      | `(store) -> Vec<String>`                         |
//! | `DescribeKey` | `(store, key) -> Option<KeyDescriptor>`          |
//! | `Invoke`      | operation name + replacement body                |

use std::fmt;
use std::rc::Rc;

use crate::error::HandleResult;
use crate::store::{KeyDescriptor, StoreRef};
use crate::value::{Operation, Value};

/// Tag for each hook in the dispatch table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrapKind {
    /// Member read
    Get,
    /// Member write
    Set,
    /// Member delete
    Delete,
    /// Existence query
    HasKey,
    /// Enumeration
    KeysOf,
    /// Descriptor query
    DescribeKey,
    /// Operation call keyed to one member name
    Invoke,
}

impl TrapKind {
    /// All kinds, in dispatch-table order
    pub const ALL: [TrapKind; 7] = [
        TrapKind::Get,
        TrapKind::Set,
        TrapKind::Delete,
        TrapKind::HasKey,
        TrapKind::KeysOf,
        TrapKind::DescribeKey,
        TrapKind::Invoke,
    ];

    /// Stable lowercase name
    pub const fn name(&self) -> &'static str {
        match self {
            TrapKind::Get => "get",
            TrapKind::Set => "set",
            TrapKind::Delete => "delete",
            TrapKind::HasKey => "has_key",
            TrapKind::KeysOf => "keys_of",
            TrapKind::DescribeKey => "describe_key",
            TrapKind::Invoke => "invoke",
        }
    }
}

impl fmt::Display for TrapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Read hook
pub type GetTrap = Rc<dyn Fn(&StoreRef, &str) -> HandleResult<Value>>;
/// Write hook
pub type SetTrap = Rc<dyn Fn(&StoreRef, &str, Value) -> HandleResult<()>>;
/// Delete hook
pub type DeleteTrap = Rc<dyn Fn(&StoreRef, &str) -> HandleResult<()>>;
/// Existence hook
pub type HasKeyTrap = Rc<dyn Fn(&StoreRef, &str) -> HandleResult<bool>>;
/// Enumeration hook
pub type KeysOfTrap = Rc<dyn Fn(&StoreRef) -> HandleResult<Vec<String>>>;
/// Descriptor hook
pub type DescribeKeyTrap = Rc<dyn Fn(&StoreRef, &str) -> HandleResult<Option<KeyDescriptor>>>;

/// Invoke hook: replaces calls to one named member.
#[derive(Debug, Clone)]
pub struct InvokeTrap {
    operation: String,
    body: Operation,
}

impl InvokeTrap {
    /// Member name this hook answers for
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Replacement body
    pub fn body(&self) -> &Operation {
        &self.body
    }

    /// Whether this hook answers for `key`
    pub fn matches(&self, key: &str) -> bool {
        self.operation == key
    }
}

/// Dispatch table of optional hooks.
#[derive(Clone, Default)]
pub struct TrapSet {
    get: Option<GetTrap>,
    set: Option<SetTrap>,
    delete: Option<DeleteTrap>,
    has_key: Option<HasKeyTrap>,
    keys_of: Option<KeysOfTrap>,
    describe_key: Option<DescribeKeyTrap>,
    invoke: Option<InvokeTrap>,
}

impl TrapSet {
    /// Empty table: every operation falls through
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the read hook
    pub fn on_get<F>(mut self, f: F) -> Self
    where
        F: Fn(&StoreRef, &str) -> HandleResult<Value> + 'static,
    {
        self.get = Some(Rc::new(f));
        self
    }

    /// Install the write hook
    pub fn on_set<F>(mut self, f: F) -> Self
    where
        F: Fn(&StoreRef, &str, Value) -> HandleResult<()> + 'static,
    {
        self.set = Some(Rc::new(f));
        self
    }

    /// Install the delete hook
    pub fn on_delete<F>(mut self, f: F) -> Self
    where
        F: Fn(&StoreRef, &str) -> HandleResult<()> + 'static,
    {
        self.delete = Some(Rc::new(f));
        self
    }

    /// Install the existence hook
    pub fn on_has_key<F>(mut self, f: F) -> Self
    where
        F: Fn(&StoreRef, &str) -> HandleResult<bool> + 'static,
    {
        self.has_key = Some(Rc::new(f));
        self
    }

    /// Install the enumeration hook
    pub fn on_keys_of<F>(mut self, f: F) -> Self
    where
        F: Fn(&StoreRef) -> HandleResult<Vec<String>> + 'static,
    {
        self.keys_of = Some(Rc::new(f));
        self
    }

    /// Install the descriptor hook
    pub fn on_describe_key<F>(mut self, f: F) -> Self
    where
        F: Fn(&StoreRef, &str) -> HandleResult<Option<KeyDescriptor>> + 'static,
    {
        self.describe_key = Some(Rc::new(f));
        self
    }

    /// Install the invoke hook for one member name
    pub fn on_invoke(mut self, operation: impl Into<String>, body: Operation) -> Self {
        self.invoke = Some(InvokeTrap {
            operation: operation.into(),
            body,
        });
        self
    }

    /// Whether the hook for `kind` is installed
    pub fn defines(&self, kind: TrapKind) -> bool {
        match kind {
            TrapKind::Get => self.get.is_some(),
            TrapKind::Set => self.set.is_some(),
            TrapKind::Delete => self.delete.is_some(),
            TrapKind::HasKey => self.has_key.is_some(),
            TrapKind::KeysOf => self.keys_of.is_some(),
            TrapKind::DescribeKey => self.describe_key.is_some(),
            TrapKind::Invoke => self.invoke.is_some(),
        }
    }

    /// Installed kinds, in table order
    pub fn defined(&self) -> Vec<TrapKind> {
        TrapKind::ALL
            .into_iter()
            .filter(|kind| self.defines(*kind))
            .collect()
    }

    /// Whether no hook is installed
    pub fn is_empty(&self) -> bool {
        self.defined().is_empty()
    }

    pub(crate) fn get_trap(&self) -> Option<&GetTrap> {
        self.get.as_ref()
    }

    pub(crate) fn set_trap(&self) -> Option<&SetTrap> {
        self.set.as_ref()
    }

    pub(crate) fn delete_trap(&self) -> Option<&DeleteTrap> {
        self.delete.as_ref()
    }

    pub(crate) fn has_key_trap(&self) -> Option<&HasKeyTrap> {
        self.has_key.as_ref()
    }

    pub(crate) fn keys_of_trap(&self) -> Option<&KeysOfTrap> {
        self.keys_of.as_ref()
    }

    pub(crate) fn describe_key_trap(&self) -> Option<&DescribeKeyTrap> {
        self.describe_key.as_ref()
    }

    /// The invoke hook, if installed
    pub fn invoke_trap(&self) -> Option<&InvokeTrap> {
        self.invoke.as_ref()
    }
}

impl fmt::Debug for TrapSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for kind in self.defined() {
            match (kind, &self.invoke) {
                (TrapKind::Invoke, Some(trap)) => {
                    list.entry(&format_args!("invoke({})", trap.operation));
                }
                _ => {
                    list.entry(&kind.name());
                }
            }
        }
        list.finish()
    }
}
