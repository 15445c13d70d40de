//! Integration tests for handle dispatch and the four policies
//!
//! Each module exercises one policy through the public API only, plus the
//! composition and revocation behavior that spans policies.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use shroud::{
    create_revocable_handle, create_virtual_handle, encapsulation_policy, interception_policy,
    observer_policy, reflect, validator_policy, Operation, ProxyError, Record, StoreRef,
    TrapSet, Validators, Value, VirtualHandle,
};

fn positive_count() -> Validators {
    Validators::new().rule("count", |v| v.as_int().is_some_and(|n| n > 0))
}

// ============================================================================
// Validation
// ============================================================================

mod validation {
    use super::*;

    #[test]
    fn test_create_virtual_handle_applies_traps() {
        let store = Record::new().with("count", 1).into_shared();
        let handle = create_virtual_handle(store.clone(), validator_policy(positive_count()));

        handle.write("count", 4).unwrap();
        assert!(handle.write("count", 0).is_err());
        assert!(handle.write("total", 1).is_err());
        assert_eq!(reflect::get(&store, "count").unwrap(), Value::Int(4));
        assert_eq!(handle.list_keys().unwrap(), vec!["count"]);
    }

    #[test]
    fn test_count_scenario() {
        let handle = VirtualHandle::new(
            Record::new().with("count", 1).into_shared(),
            validator_policy(positive_count()),
        );

        handle.write("count", 5).unwrap();
        assert_eq!(handle.read("count").unwrap(), Value::Int(5));

        let err = handle.write("count", -1).unwrap_err();
        assert!(matches!(err, ProxyError::Validation { .. }));
        assert_eq!(handle.read("count").unwrap(), Value::Int(5));
    }

    #[test]
    fn test_mutates_iff_predicate_accepts() {
        let store = Record::new().with("count", 1).into_shared();
        let handle = VirtualHandle::new(store.clone(), validator_policy(positive_count()));

        for (candidate, accepted) in [(3, true), (0, false), (7, true), (-4, false)] {
            let before = reflect::get(&store, "count").unwrap();
            let result = handle.write("count", candidate);
            let after = reflect::get(&store, "count").unwrap();
            if accepted {
                assert!(result.is_ok());
                assert_eq!(after, Value::Int(candidate as i64));
            } else {
                assert!(result.is_err());
                assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn test_non_integer_rejected() {
        let handle = VirtualHandle::new(
            Record::new().with("count", 1).into_shared(),
            validator_policy(positive_count()),
        );
        assert!(matches!(
            handle.write("count", "five"),
            Err(ProxyError::Validation { .. })
        ));
    }
}

// ============================================================================
// Observation
// ============================================================================

mod observation {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let handle = VirtualHandle::new(
            Record::new().with("status", "idle").into_shared(),
            observer_policy(move |_, key, previous, next| {
                sink.borrow_mut()
                    .push(format!("{key}: {previous} -> {next}"));
                Ok(())
            }),
        );

        handle.write("status", "busy").unwrap();
        handle.remove("status").unwrap();

        assert_eq!(
            *calls.borrow(),
            vec![
                "status: \"idle\" -> \"busy\"".to_string(),
                "status: \"busy\" -> undefined".to_string(),
            ]
        );
        assert_eq!(handle.read("status").unwrap(), Value::Undefined);
    }
}

// ============================================================================
// Encapsulation
// ============================================================================

mod encapsulation {
    use super::*;

    fn vault() -> StoreRef {
        Record::new()
            .with("label", "vault")
            .with("_key", "s3cr3t")
            .with("size", 3)
            .with("_salt", "nacl")
            .into_shared()
    }

    #[test]
    fn test_private_keys_hidden_from_every_path() {
        let store = vault();
        let handle = VirtualHandle::new(store.clone(), encapsulation_policy(|k| k.starts_with('_')));

        for key in ["_key", "_salt"] {
            assert!(handle.read(key).is_err());
            assert!(handle.write(key, "x").is_err());
            assert!(!handle.contains(key).unwrap());
            assert_eq!(handle.describe(key).unwrap(), None);
        }
        assert_eq!(handle.list_keys().unwrap(), vec!["label", "size"]);

        // Public reads equal native reads.
        for key in ["label", "size"] {
            assert_eq!(handle.read(key).unwrap(), reflect::get(&store, key).unwrap());
        }
        // Private state is untouched.
        assert_eq!(reflect::get(&store, "_key").unwrap(), Value::str("s3cr3t"));
    }

    #[test]
    fn test_private_operation_cannot_be_invoked() {
        let calls = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&calls);
        let mut record = Record::new().with("label", "vault");
        record.insert(
            "_peek",
            Operation::function(move |_| {
                counter.set(counter.get() + 1);
                Ok(Value::str("s3cr3t"))
            }),
        );
        let handle = VirtualHandle::new(
            record.into_shared(),
            encapsulation_policy(|k| k.starts_with('_')),
        );

        for key in ["_peek", "_absent"] {
            assert!(matches!(
                handle.invoke(key, &[]),
                Err(ProxyError::PrivacyViolation { key: ref k }) if k == key
            ));
        }
        assert_eq!(calls.get(), 0);
    }
}

// ============================================================================
// Revocation
// ============================================================================

mod revocation {
    use super::*;

    #[test]
    fn test_operations_fail_after_revoke() {
        let (handle, revoker) =
            create_revocable_handle(Record::new().with("username", "Mo").into_shared());

        assert_eq!(handle.read("username").unwrap(), Value::str("Mo"));
        handle.write("role", "admin").unwrap();

        revoker.revoke();
        revoker.revoke();
        assert!(revoker.is_revoked());

        assert!(matches!(handle.read("username"), Err(ProxyError::Revoked)));
        assert!(matches!(handle.write("username", "x"), Err(ProxyError::Revoked)));
        assert!(matches!(handle.remove("username"), Err(ProxyError::Revoked)));
        assert!(matches!(handle.contains("username"), Err(ProxyError::Revoked)));
        assert!(matches!(handle.list_keys(), Err(ProxyError::Revoked)));
        assert!(matches!(handle.describe("username"), Err(ProxyError::Revoked)));
        assert!(matches!(handle.invoke("username", &[]), Err(ProxyError::Revoked)));
    }

    #[test]
    fn test_revocation_overrides_policy() {
        let (handle, revoker) = VirtualHandle::revocable(
            Record::new().with("count", 1).into_shared(),
            validator_policy(positive_count()),
        );
        assert!(matches!(
            handle.write("count", -1),
            Err(ProxyError::Validation { .. })
        ));
        revoker.revoke();
        assert!(matches!(handle.write("count", -1), Err(ProxyError::Revoked)));
    }

    #[test]
    fn test_clones_share_revocation() {
        let (handle, revoker) = create_revocable_handle(Record::new().into_shared());
        let copy = handle.clone();
        revoker.revoke();
        assert!(copy.is_revoked());
    }

    #[test]
    fn test_store_outlives_revoked_handle() {
        let store = Record::new().with("username", "Mo").into_shared();
        let (handle, revoker) = create_revocable_handle(store.clone());
        revoker.revoke();
        drop(handle);
        assert_eq!(reflect::get(&store, "username").unwrap(), Value::str("Mo"));
    }
}

// ============================================================================
// Interception
// ============================================================================

mod interception {
    use super::*;

    #[test]
    fn test_request_served_from_cache() {
        let loads = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&loads);
        let mut file = Record::new();
        file.insert(
            "request",
            Operation::function(move |_| {
                counter.set(counter.get() + 1);
                Ok(Value::str("LOADED"))
            }),
        );

        let handle = VirtualHandle::new(
            file.into_shared(),
            interception_policy("request", Operation::function(|_| Ok(Value::str("CACHED")))),
        );

        for args in [vec![], vec![Value::str("hash-1")], vec![Value::Int(1), Value::Null]] {
            assert_eq!(handle.invoke("request", &args).unwrap(), Value::str("CACHED"));
        }
        assert_eq!(loads.get(), 0);
    }
}

// ============================================================================
// Composition
// ============================================================================

mod composition {
    use super::*;

    #[test]
    fn test_observed_validation() {
        let notified = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&notified);

        let validated = VirtualHandle::new(
            Record::new().with("count", 1).into_shared(),
            validator_policy(positive_count()),
        );
        let observed = VirtualHandle::new(
            validated.into_shared(),
            observer_policy(move |_, _, _, _| {
                counter.set(counter.get() + 1);
                Ok(())
            }),
        );

        observed.write("count", 2).unwrap();
        assert!(observed.write("count", -2).is_err());
        // The rejected write never reached the observer.
        assert_eq!(notified.get(), 1);
        assert_eq!(observed.read("count").unwrap(), Value::Int(2));
    }

    #[test]
    fn test_observer_reads_back_through_enclosing_handle() {
        let shared_slot: Rc<RefCell<Option<StoreRef>>> = Rc::new(RefCell::new(None));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let (reader, sink) = (Rc::clone(&shared_slot), Rc::clone(&seen));

        let inner = VirtualHandle::new(
            Record::new().with("n", 1).into_shared(),
            observer_policy(move |_, key, _, _| {
                if let Some(shared) = reader.borrow().as_ref() {
                    let current = reflect::get(shared, key)?;
                    sink.borrow_mut().push(current);
                }
                Ok(())
            }),
        );
        let shared = inner.into_shared();
        *shared_slot.borrow_mut() = Some(Rc::clone(&shared));
        let outer = VirtualHandle::new(shared, TrapSet::new());

        outer.write("n", 2).unwrap();
        outer.remove("n").unwrap();
        assert_eq!(*seen.borrow(), vec![Value::Int(2), Value::Undefined]);
        assert_eq!(outer.read("n").unwrap(), Value::Undefined);

        // Break the handle -> observer -> handle cycle.
        shared_slot.borrow_mut().take();
    }

    #[test]
    fn test_trap_writes_through_enclosing_handle() {
        let shared_slot: Rc<RefCell<Option<StoreRef>>> = Rc::new(RefCell::new(None));
        let reader = Rc::clone(&shared_slot);

        let inner = VirtualHandle::new(
            Record::new().with("n", 0).with("writes", 0).into_shared(),
            TrapSet::new().on_set(move |store, key, value| {
                reflect::set(store, key, value)?;
                if key == "writes" {
                    return Ok(());
                }
                if let Some(shared) = reader.borrow().as_ref() {
                    let writes = reflect::get(store, "writes")?.as_int().unwrap_or(0);
                    reflect::set(shared, "writes", Value::Int(writes + 1))?;
                }
                Ok(())
            }),
        );
        let shared = inner.into_shared();
        *shared_slot.borrow_mut() = Some(Rc::clone(&shared));
        let outer = VirtualHandle::new(Rc::clone(&shared), TrapSet::new());

        outer.write("n", 5).unwrap();
        outer.write("n", 6).unwrap();
        assert_eq!(reflect::get(&shared, "writes").unwrap(), Value::Int(2));

        shared_slot.borrow_mut().take();
    }

    #[test]
    fn test_revocable_encapsulated_view() {
        let store = Record::new()
            .with("name", "Mo")
            .with("_ssn", "123")
            .into_shared();
        let private = VirtualHandle::new(store, encapsulation_policy(|k| k.starts_with('_')));
        let (view, revoker) = VirtualHandle::revocable(private.into_shared(), TrapSet::new());

        assert_eq!(view.list_keys().unwrap(), vec!["name"]);
        assert!(matches!(
            view.read("_ssn"),
            Err(ProxyError::PrivacyViolation { .. })
        ));
        revoker.revoke();
        assert!(matches!(view.list_keys(), Err(ProxyError::Revoked)));
    }
}
