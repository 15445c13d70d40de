//! Revocation Capability
//!
//! A [`Revoker`] and its handle share one [`RevocationToken`]. The handle
//! checks the token at the top of every dispatch path, before any trap is
//! looked up, so revocation disables every policy uniformly.

use std::cell::Cell;
use std::rc::Rc;

use crate::handle::VirtualHandle;
use crate::store::StoreRef;
use crate::traps::TrapSet;

/// Shared one-way switch: active until revoked.
#[derive(Debug, Clone, Default)]
pub struct RevocationToken {
    revoked: Rc<Cell<bool>>,
}

impl RevocationToken {
    /// Fresh, active token
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the token has been revoked
    pub fn is_revoked(&self) -> bool {
        self.revoked.get()
    }

    /// Flip to revoked; returns `true` only on the first call
    fn revoke(&self) -> bool {
        !self.revoked.replace(true)
    }
}

/// Capability that permanently disables one handle.
///
/// Dropping the revoker does not revoke; the handle simply stays usable.
#[derive(Debug)]
pub struct Revoker {
    token: RevocationToken,
}

impl Revoker {
    pub(crate) fn new(token: RevocationToken) -> Self {
        Self { token }
    }

    /// Revoke the associated handle. Idempotent.
    pub fn revoke(&self) {
        if self.token.revoke() {
            tracing::debug!("handle revoked");
        }
    }

    /// Whether `revoke` has been called
    pub fn is_revoked(&self) -> bool {
        self.token.is_revoked()
    }
}

/// Wrap `store` in a pass-through handle that can be revoked.
pub fn create_revocable_handle(store: StoreRef) -> (VirtualHandle, Revoker) {
    VirtualHandle::revocable(store, TrapSet::new())
}
