//! `shroud demo`: Run one policy against a built-in record.

use std::cell::{Cell, RefCell};
use std::path::Path;
use std::rc::Rc;

use clap::ValueEnum;
use shroud::{
    create_revocable_handle, encapsulation_policy, observer_policy, reflect, validator_policy,
    HandleResult, InterceptionConfig, Operation, Record, Validators, Value, VirtualHandle,
};
use termcolor::WriteColor;

use super::{flatten, load_config};
use crate::output::StyledOutput;

/// Which policy to demonstrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Log every write and delete
    Observe,
    /// Closed schema with a positive-integer `count`
    Validate,
    /// Hide keys starting with `_`
    Encapsulate,
    /// Disable a handle for good
    Revoke,
    /// Serve an operation (`request` unless configured) from a cache
    Intercept,
}

/// Run `scenario` and print what each step did.
///
/// Only the intercept scenario reads the config: its `[interception]`
/// section names the member to replace.
pub fn execute<W: WriteColor>(
    scenario: Scenario,
    config_path: Option<&Path>,
    out: &mut StyledOutput<W>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    tracing::debug!(?scenario, "running demo");
    match scenario {
        Scenario::Observe => observe(out),
        Scenario::Validate => validate(out),
        Scenario::Encapsulate => encapsulate(out),
        Scenario::Revoke => revoke(out),
        Scenario::Intercept => {
            let target = config.interception.unwrap_or_else(|| InterceptionConfig {
                operation: "request".to_string(),
            });
            intercept(&target, out)
        }
    }
    .map_err(flatten)
}

/// Print `label` and the outcome of an operation that may be rejected.
fn report<W: WriteColor, T>(
    out: &mut StyledOutput<W>,
    label: &str,
    result: HandleResult<T>,
    show: impl FnOnce(T) -> String,
) {
    out.bold(label);
    out.plain(" ");
    match result {
        Ok(value) => {
            out.success("ok");
            out.line(&format!(" {}", show(value)));
        }
        Err(err) => {
            out.error("rejected");
            out.line(&format!(" {err}"));
        }
    }
}

fn observe<W: WriteColor>(out: &mut StyledOutput<W>) -> HandleResult<()> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let handle = VirtualHandle::new(
        Record::new().with("status", "idle").into_shared(),
        observer_policy(move |_, key, previous, next| {
            sink.borrow_mut().push(format!("{key}: {previous} -> {next}"));
            Ok(())
        }),
    );

    handle.write("status", "busy")?;
    handle.write("owner", "mo")?;
    handle.remove("status")?;

    for entry in log.borrow().iter() {
        out.info("observed ");
        out.line(entry);
    }
    Ok(())
}

fn validate<W: WriteColor>(out: &mut StyledOutput<W>) -> HandleResult<()> {
    let validators =
        Validators::new().rule("count", |value| value.as_int().is_some_and(|n| n > 0));
    let handle = VirtualHandle::new(
        Record::new()
            .with("count", 1)
            .with("label", "widgets")
            .into_shared(),
        validator_policy(validators),
    );

    report(out, "count = 5", handle.write("count", 5), |_| String::new());
    report(out, "count = -1", handle.write("count", -1), |_| String::new());
    report(out, "label = \"gadgets\"", handle.write("label", "gadgets"), |_| {
        String::new()
    });
    report(out, "size = 3", handle.write("size", 3), |_| String::new());
    out.line(&format!("count is {}", handle.read("count")?));
    Ok(())
}

fn encapsulate<W: WriteColor>(out: &mut StyledOutput<W>) -> HandleResult<()> {
    let store = Record::new()
        .with("label", "vault")
        .with("_key", "s3cr3t")
        .with("size", 3)
        .into_shared();
    let handle = VirtualHandle::new(store.clone(), encapsulation_policy(|k| k.starts_with('_')));

    out.line(&format!("visible keys: {}", handle.list_keys()?.join(", ")));
    report(out, "read label", handle.read("label"), |v| v.to_string());
    report(out, "read _key", handle.read("_key"), |v| v.to_string());
    report(out, "has _key", handle.contains("_key"), |found| found.to_string());
    out.line(&format!(
        "store still holds _key: {}",
        reflect::has(&store, "_key")?
    ));
    Ok(())
}

fn revoke<W: WriteColor>(out: &mut StyledOutput<W>) -> HandleResult<()> {
    let (handle, revoker) =
        create_revocable_handle(Record::new().with("username", "Mo").into_shared());

    report(out, "read username", handle.read("username"), |v| v.to_string());
    revoker.revoke();
    out.info("revoked");
    out.newline();
    report(out, "read username", handle.read("username"), |v| v.to_string());
    report(out, "list keys", handle.list_keys(), |keys| keys.join(", "));
    Ok(())
}

fn intercept<W: WriteColor>(
    target: &InterceptionConfig,
    out: &mut StyledOutput<W>,
) -> HandleResult<()> {
    let name = target.operation.as_str();
    let loads = Rc::new(Cell::new(0usize));
    let counter = Rc::clone(&loads);
    let mut file = Record::new().with("name", "huge.bin");
    file.insert(
        name,
        Operation::function(move |_| {
            counter.set(counter.get() + 1);
            Ok(Value::str("LOADED"))
        }),
    );

    let handle = VirtualHandle::new(
        file.into_shared(),
        target.policy(Operation::function(|_| Ok(Value::str("CACHED")))),
    );

    for hash in ["a1", "b2", "c3"] {
        let label = format!("{name}({hash})");
        report(out, &label, handle.invoke(name, &[Value::str(hash)]), |v| {
            v.to_string()
        });
    }
    out.line(&format!("native loads: {}", loads.get()));
    Ok(())
}
