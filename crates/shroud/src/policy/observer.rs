//! Observer policy: notify after every write or delete
//!
//! The mutation is committed first and the observer runs second, so the
//! observer always sees the store in its new state. An observer error is
//! returned to the caller but the mutation stays applied.

use std::rc::Rc;

use crate::error::HandleResult;
use crate::reflect;
use crate::store::StoreRef;
use crate::traps::TrapSet;
use crate::value::Value;

/// `(store, key, previous, next)`; `next` is `Undefined` for deletes.
pub type ChangeObserver = Rc<dyn Fn(&StoreRef, &str, &Value, &Value) -> HandleResult<()>>;

/// Build a trap set that reports every write and delete to `on_change`.
pub fn observer_policy<F>(on_change: F) -> TrapSet
where
    F: Fn(&StoreRef, &str, &Value, &Value) -> HandleResult<()> + 'static,
{
    let notify_set: ChangeObserver = Rc::new(on_change);
    let notify_delete = Rc::clone(&notify_set);

    TrapSet::new()
        .on_set(move |store, key, value| {
            let previous = reflect::get(store, key)?;
            reflect::set(store, key, value.clone())?;
            notify_set(store, key, &previous, &value)
        })
        .on_delete(move |store, key| {
            let previous = reflect::get(store, key)?;
            reflect::delete(store, key)?;
            notify_delete(store, key, &previous, &Value::Undefined)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProxyError;
    use crate::store::Record;
    use crate::VirtualHandle;
    use std::cell::RefCell;

    type Log = Rc<RefCell<Vec<(String, Value, Value)>>>;

    fn recording_handle(store: StoreRef) -> (VirtualHandle, Log) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let traps = observer_policy(move |_, key, previous, next| {
            sink.borrow_mut()
                .push((key.to_string(), previous.clone(), next.clone()));
            Ok(())
        });
        (VirtualHandle::new(store, traps), log)
    }

    #[test]
    fn test_write_notifies_once_with_previous_and_next() {
        let (handle, log) = recording_handle(Record::new().with("count", 1).into_shared());

        handle.write("count", 2).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![("count".to_string(), Value::Int(1), Value::Int(2))]
        );
        assert_eq!(handle.read("count").unwrap(), Value::Int(2));
    }

    #[test]
    fn test_new_key_reports_undefined_previous() {
        let (handle, log) = recording_handle(Record::new().into_shared());
        handle.write("fresh", "x").unwrap();
        assert_eq!(log.borrow()[0].1, Value::Undefined);
    }

    #[test]
    fn test_delete_reports_undefined_next() {
        let (handle, log) = recording_handle(Record::new().with("gone", true).into_shared());

        handle.remove("gone").unwrap();

        assert_eq!(
            *log.borrow(),
            vec![("gone".to_string(), Value::Bool(true), Value::Undefined)]
        );
        assert!(!handle.contains("gone").unwrap());
    }

    #[test]
    fn test_observer_sees_committed_state() {
        let store = Record::new().with("n", 0).into_shared();
        let seen = Rc::new(RefCell::new(Value::Undefined));
        let slot = Rc::clone(&seen);
        let handle = VirtualHandle::new(
            store,
            observer_policy(move |store, key, _, _| {
                *slot.borrow_mut() = reflect::get(store, key)?;
                Ok(())
            }),
        );

        handle.write("n", 9).unwrap();
        assert_eq!(*seen.borrow(), Value::Int(9));
    }

    #[test]
    fn test_observer_error_does_not_roll_back() {
        let store = Record::new().with("n", 0).into_shared();
        let handle = VirtualHandle::new(
            store.clone(),
            observer_policy(|_, _, _, _| Err(ProxyError::trap("observer failed"))),
        );

        assert!(handle.write("n", 5).is_err());
        assert_eq!(reflect::get(&store, "n").unwrap(), Value::Int(5));
    }

    #[test]
    fn test_reads_are_not_observed() {
        let (handle, log) = recording_handle(Record::new().with("a", 1).into_shared());
        handle.read("a").unwrap();
        handle.list_keys().unwrap();
        assert!(log.borrow().is_empty());
    }
}
