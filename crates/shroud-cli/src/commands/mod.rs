//! Subcommand implementations and the helpers they share.

pub mod demo;
pub mod inspect;

use std::path::Path;

use anyhow::{bail, Context};
use serde_json::Value as Json;
use shroud::convert::record_from_json;
use shroud::{PolicyConfig, ProxyError, StoreRef, TrapSet, VirtualHandle};

/// Read a JSON object from `path` into a shared record.
pub fn load_store(path: &Path) -> anyhow::Result<StoreRef> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read store file {}", path.display()))?;
    let json: Json = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))?;
    match json {
        Json::Object(map) => {
            tracing::debug!(path = %path.display(), keys = map.len(), "loaded store");
            Ok(record_from_json(map).into_shared())
        }
        _ => bail!("{} must contain a JSON object", path.display()),
    }
}

/// Load the policy config at `path`, or the empty config when none is given.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<PolicyConfig> {
    match path {
        Some(path) => PolicyConfig::load(path)
            .with_context(|| format!("Failed to load policy config {}", path.display())),
        None => Ok(PolicyConfig::default()),
    }
}

/// Handle exposing only what the config's encapsulation section allows.
pub fn visible_handle(store: StoreRef, config: &PolicyConfig) -> VirtualHandle {
    let traps = config
        .encapsulation
        .as_ref()
        .map(|encapsulation| encapsulation.policy())
        .unwrap_or_else(TrapSet::new);
    VirtualHandle::new(store, traps)
}

/// `ProxyError` may carry `Rc`-backed values, which anyhow cannot hold.
pub(crate) fn flatten(err: ProxyError) -> anyhow::Error {
    anyhow::anyhow!("{err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn json_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    #[test]
    fn test_load_store_keeps_key_order() {
        let file = json_file(r#"{"b": 1, "a": 2}"#);
        let store = load_store(file.path()).unwrap();
        assert_eq!(store.keys().unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn test_load_store_rejects_non_object() {
        let file = json_file("[1, 2]");
        let err = load_store(file.path()).err().expect("expected an error");
        assert!(err.to_string().contains("must contain a JSON object"));
    }

    #[test]
    fn test_missing_config_is_empty() {
        assert_eq!(load_config(None).unwrap(), PolicyConfig::default());
    }
}
