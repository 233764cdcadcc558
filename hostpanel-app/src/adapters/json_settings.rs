//! JSON file settings source.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use hostpanel_core::error::{CoreError, CoreResult};
use hostpanel_core::traits::SettingsSource;

/// Reads operator settings from a JSON file on every `load`.
///
/// Nested objects are flattened into dotted keys, so
/// `{"reseller": {"plan": "free"}}` yields `reseller.plan = free`. Arrays are
/// joined with commas; numbers and booleans are rendered as text; `null` is
/// skipped.
pub struct JsonFileSettings {
    path: PathBuf,
}

impl JsonFileSettings {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SettingsSource for JsonFileSettings {
    async fn load(&self) -> CoreResult<HashMap<String, String>> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            CoreError::StorageError(format!(
                "Failed to read settings file {}: {e}",
                self.path.display()
            ))
        })?;
        let root: Value = serde_json::from_str(&raw).map_err(|e| {
            CoreError::ConfigError(format!(
                "Settings file {} is not valid JSON: {e}",
                self.path.display()
            ))
        })?;
        let Value::Object(map) = root else {
            return Err(CoreError::ConfigError(format!(
                "Settings file {} must contain a JSON object",
                self.path.display()
            )));
        };

        let mut settings = HashMap::new();
        for (key, value) in map {
            flatten(&key, value, &mut settings);
        }
        log::debug!(
            "Loaded {} settings from {}",
            settings.len(),
            self.path.display()
        );
        Ok(settings)
    }
}

fn flatten(prefix: &str, value: Value, out: &mut HashMap<String, String>) {
    match value {
        Value::Null => {}
        Value::Object(map) => {
            for (key, nested) in map {
                flatten(&format!("{prefix}.{key}"), nested, out);
            }
        }
        Value::Array(items) => {
            let joined = items
                .into_iter()
                .filter_map(scalar)
                .collect::<Vec<_>>()
                .join(",");
            out.insert(prefix.to_string(), joined);
        }
        other => {
            if let Some(text) = scalar(other) {
                out.insert(prefix.to_string(), text);
            }
        }
    }
}

fn scalar(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
