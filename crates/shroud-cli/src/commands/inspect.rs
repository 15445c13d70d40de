//! `shroud keys|get|set`: Inspect a JSON store through a policy handle.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use anyhow::Context;
use shroud::convert::{store_to_json, value_from_json, value_to_json};
use shroud::{observer_policy, VirtualHandle};
use termcolor::WriteColor;

use super::{flatten, load_config, load_store, visible_handle};
use crate::output::StyledOutput;

/// List the keys visible through the configured handle.
pub fn keys<W: WriteColor>(
    store_path: &Path,
    config_path: Option<&Path>,
    out: &mut StyledOutput<W>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let handle = visible_handle(load_store(store_path)?, &config);
    for key in handle.list_keys().map_err(flatten)? {
        out.line(&key);
    }
    Ok(())
}

/// Print one key, read through the configured handle, as JSON.
pub fn get<W: WriteColor>(
    store_path: &Path,
    key: &str,
    config_path: Option<&Path>,
    out: &mut StyledOutput<W>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let handle = visible_handle(load_store(store_path)?, &config);
    let value = handle.read(key).map_err(flatten)?;
    let json = value_to_json(&value).map_err(flatten)?;
    out.line(&serde_json::to_string_pretty(&json)?);
    Ok(())
}

/// Write `raw_value` to `key` through an observed view of the configured
/// handle, then print the notification and the resulting visible record.
/// The store file is left untouched.
pub fn set<W: WriteColor>(
    store_path: &Path,
    key: &str,
    raw_value: &str,
    config_path: Option<&Path>,
    out: &mut StyledOutput<W>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let json: serde_json::Value = serde_json::from_str(raw_value)
        .with_context(|| format!("Value for `{key}` is not valid JSON: {raw_value}"))?;

    let changes = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&changes);
    let visible = visible_handle(load_store(store_path)?, &config);
    let observed = VirtualHandle::new(
        visible.into_shared(),
        observer_policy(move |_, changed, previous, next| {
            sink.borrow_mut()
                .push(format!("{changed}: {previous} -> {next}"));
            Ok(())
        }),
    );

    observed.write(key, value_from_json(json)).map_err(flatten)?;

    for change in changes.borrow().iter() {
        out.info("changed ");
        out.line(change);
    }
    let record = store_to_json(&observed).map_err(flatten)?;
    out.line(&serde_json::to_string_pretty(&record)?);
    Ok(())
}
