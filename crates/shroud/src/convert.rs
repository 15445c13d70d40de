//! Conversions between JSON documents and store values.
//!
//! JSON objects become nested [`Record`]s, integers that fit in `i64` stay
//! integers, everything else numeric becomes a float. Going the other way,
//! any [`Store`] (including a handle) can be rendered; a handle renders only
//! what its traps let through.

use serde_json::{Map, Number, Value as Json};

use crate::error::{HandleResult, ProxyError};
use crate::store::{Record, Store};
use crate::value::Value;

/// Convert a JSON value into a store value
pub fn value_from_json(json: Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        Json::String(s) => Value::Str(s),
        Json::Array(items) => Value::List(items.into_iter().map(value_from_json).collect()),
        Json::Object(map) => Value::Object(record_from_json(map).into_shared()),
    }
}

/// Build a record from a JSON object, keeping key order
pub fn record_from_json(map: Map<String, Json>) -> Record {
    let mut record = Record::new();
    for (key, value) in map {
        record.insert(key, value_from_json(value));
    }
    record
}

/// Render a store value as JSON.
///
/// `Undefined` and non-finite floats render as `null`; operations render
/// as the string `"[operation]"`. A store that contains itself, directly or
/// through nested objects, is an error.
pub fn value_to_json(value: &Value) -> HandleResult<Json> {
    render_value(value, &mut Vec::new())
}

/// Render every enumerable key of `store` as a JSON object
pub fn store_to_json(store: &dyn Store) -> HandleResult<Json> {
    render_store(store, &mut Vec::new())
}

// Addresses of the stores currently being rendered, outermost first.
type Ancestors = Vec<*const ()>;

fn render_value(value: &Value, ancestors: &mut Ancestors) -> HandleResult<Json> {
    Ok(match value {
        Value::Undefined | Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Int(i) => Json::Number((*i).into()),
        Value::Float(f) => Number::from_f64(*f).map(Json::Number).unwrap_or(Json::Null),
        Value::Str(s) => Json::String(s.clone()),
        Value::List(items) => Json::Array(
            items
                .iter()
                .map(|item| render_value(item, ancestors))
                .collect::<HandleResult<Vec<_>>>()?,
        ),
        Value::Object(store) => render_store(&**store, ancestors)?,
        Value::Operation(_) => Json::String("[operation]".to_string()),
    })
}

fn render_store(store: &dyn Store, ancestors: &mut Ancestors) -> HandleResult<Json> {
    let address = store as *const dyn Store as *const ();
    if ancestors.contains(&address) {
        return Err(ProxyError::trap("cannot render a store that contains itself"));
    }
    ancestors.push(address);
    let rendered = render_entries(store, ancestors);
    ancestors.pop();
    rendered
}

fn render_entries(store: &dyn Store, ancestors: &mut Ancestors) -> HandleResult<Json> {
    let mut map = Map::new();
    for key in store.keys()? {
        let value = store.get(&key)?;
        map.insert(key, render_value(&value, ancestors)?);
    }
    Ok(Json::Object(map))
}
