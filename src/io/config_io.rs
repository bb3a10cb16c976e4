use std::fs;
use std::path::Path;

use crate::io::workspace_io::{CONFIG_FILE, WorkspaceError, atomic_write};
use crate::model::WorkspaceConfig;

/// Value shape of a settable config key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyType {
    Str,
    Bool,
    Int,
}

/// Every key `td config` can read or write, as `table.key`
const KEYS: &[(&str, KeyType)] = &[
    ("workspace.name", KeyType::Str),
    ("workspace.owner", KeyType::Str),
    ("ui.show_completed", KeyType::Bool),
    ("ui.sidebar_width", KeyType::Int),
    ("log.level", KeyType::Str),
];

/// Read the workspace config, returning both the parsed config and the raw
/// toml_edit document for round-trip-safe editing.
pub fn read_config(dir: &Path) -> Result<(WorkspaceConfig, toml_edit::DocumentMut), WorkspaceError> {
    let path = dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&path).map_err(|e| WorkspaceError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    let config: WorkspaceConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), WorkspaceError> {
    let path = dir.join(CONFIG_FILE);
    atomic_write(&path, doc.to_string().as_bytes())
        .map_err(|e| WorkspaceError::WriteError { path, source: e })
}

/// The config written by `td init`
pub fn default_document(name: &str, owner: &str) -> toml_edit::DocumentMut {
    let mut doc = toml_edit::DocumentMut::new();
    doc["workspace"] = toml_edit::table();
    doc["workspace"]["name"] = toml_edit::value(name);
    doc["workspace"]["owner"] = toml_edit::value(owner);
    doc["ui"] = toml_edit::table();
    doc["ui"]["show_completed"] = toml_edit::value(false);
    doc["ui"]["sidebar_width"] = toml_edit::value(32_i64);
    doc["log"] = toml_edit::table();
    doc["log"]["level"] = toml_edit::value("warn");
    doc
}

fn split_key(key: &str) -> Result<(&str, &str, KeyType), WorkspaceError> {
    let (_, ty) = KEYS
        .iter()
        .find(|(k, _)| *k == key)
        .ok_or_else(|| WorkspaceError::UnknownKey(key.to_string()))?;
    let (table, field) = key
        .split_once('.')
        .ok_or_else(|| WorkspaceError::UnknownKey(key.to_string()))?;
    Ok((table, field, *ty))
}

/// Current value of a key, as it appears in the file (`None` if unset).
pub fn get_value(doc: &toml_edit::DocumentMut, key: &str) -> Result<Option<String>, WorkspaceError> {
    let (table, field, _) = split_key(key)?;
    let value = doc
        .get(table)
        .and_then(|t| t.get(field))
        .and_then(|item| item.as_value())
        .map(|v| match v.as_str() {
            Some(s) => s.to_string(),
            None => v.to_string().trim().to_string(),
        });
    Ok(value)
}

/// Set a key from its command-line text, checking its type.
pub fn set_value(doc: &mut toml_edit::DocumentMut, key: &str, raw: &str) -> Result<(), WorkspaceError> {
    let (table, field, ty) = split_key(key)?;
    let invalid = || WorkspaceError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
    };
    let value = match ty {
        KeyType::Str => {
            if raw.trim().is_empty() {
                return Err(invalid());
            }
            toml_edit::value(raw)
        }
        KeyType::Bool => toml_edit::value(raw.parse::<bool>().map_err(|_| invalid())?),
        KeyType::Int => {
            let n: u16 = raw.parse().map_err(|_| invalid())?;
            toml_edit::value(i64::from(n))
        }
    };
    if !doc.contains_key(table) {
        doc[table] = toml_edit::table();
    }
    doc[table][field] = value;
    Ok(())
}
