//! Encapsulation policy: keys classified private are unreachable
//!
//! A private key cannot be read, written or deleted (each fails with
//! [`ProxyError::PrivacyViolation`]), and it is invisible to `contains`,
//! `list_keys` and `describe`. The error depends only on how the filter
//! classifies the key, never on whether the key exists, so a failed
//! access does not reveal presence.
//!
//! Operations read through the handle come back bound to the original
//! store: moving one out of the wrapper does not change what data it sees.

use std::rc::Rc;

use crate::error::{HandleResult, ProxyError};
use crate::reflect;
use crate::traps::TrapSet;
use crate::value::Value;

/// Classifies a key as private
pub type PrivateKeyFilter = Rc<dyn Fn(&str) -> bool>;

/// Build a trap set hiding every key for which `is_private` returns true.
pub fn encapsulation_policy<F>(is_private: F) -> TrapSet
where
    F: Fn(&str) -> bool + 'static,
{
    encapsulation_policy_with(Rc::new(is_private))
}

/// [`encapsulation_policy`] over an already shared filter
pub fn encapsulation_policy_with(filter: PrivateKeyFilter) -> TrapSet {
    let on_get = Rc::clone(&filter);
    let on_set = Rc::clone(&filter);
    let on_delete = Rc::clone(&filter);
    let on_has = Rc::clone(&filter);
    let on_keys = Rc::clone(&filter);
    let on_describe = filter;

    TrapSet::new()
        .on_get(move |store, key| {
            deny_private(&*on_get, key)?;
            Ok(match reflect::get(store, key)? {
                Value::Operation(op) if !op.is_bound() => {
                    Value::Operation(op.bind(Rc::clone(store)))
                }
                value => value,
            })
        })
        .on_set(move |store, key, value| {
            deny_private(&*on_set, key)?;
            reflect::set(store, key, value)
        })
        .on_delete(move |store, key| {
            deny_private(&*on_delete, key)?;
            reflect::delete(store, key)
        })
        .on_has_key(move |store, key| Ok(!on_has(key) && reflect::has(store, key)?))
        .on_keys_of(move |store| {
            Ok(reflect::own_keys(store)?
                .into_iter()
                .filter(|key| !on_keys(key.as_str()))
                .collect())
        })
        .on_describe_key(move |store, key| {
            if on_describe(key) {
                return Ok(None);
            }
            reflect::describe(store, key)
        })
}

fn deny_private(is_private: &dyn Fn(&str) -> bool, key: &str) -> HandleResult<()> {
    if is_private(key) {
        tracing::debug!(key, "blocked access to private key");
        return Err(ProxyError::PrivacyViolation {
            key: key.to_string(),
        });
    }
    Ok(())
}
