pub mod data;
pub mod meta;
pub mod milestone;
pub mod settings;
pub mod status;
pub mod task;

use anyhow::Context;
use serde_json::{Map, Value};

/// Parse `KEY=VALUE` pairs into a JSON object. Values that parse as JSON
/// (numbers, booleans, quoted strings, objects) keep that type; anything
/// else is taken as a plain string.
pub(crate) fn parse_fields(pairs: &[String]) -> anyhow::Result<Map<String, Value>> {
    let mut fields = Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("expected KEY=VALUE, got '{pair}'"))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("empty key in '{pair}'");
        }
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        fields.insert(key.to_string(), value);
    }
    Ok(fields)
}
