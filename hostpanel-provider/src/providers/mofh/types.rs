//! MOFH wire types

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// JSON API envelope: `{"result":[{"status":1,"statusmsg":"...","options":{...}}]}`.
#[derive(Debug, Deserialize)]
pub struct MofhEnvelope {
    pub result: Vec<MofhResult>,
}

/// One entry of the JSON API `result` array.
#[derive(Debug, Deserialize)]
pub struct MofhResult {
    /// `1`, `"1"` or `true` on success.
    #[serde(deserialize_with = "deserialize_status_flag")]
    pub status: StatusFlag,
    #[serde(default)]
    pub statusmsg: String,
    /// Endpoint-specific payload; `createacct` puts `vpusername` here.
    #[serde(default)]
    pub options: Option<Value>,
}

impl MofhResult {
    /// Read a string field out of `options`.
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options
            .as_ref()
            .and_then(|o| o.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Normalised envelope status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusFlag {
    pub success: bool,
    /// The flag as received, for error reporting.
    pub raw: String,
}

/// The panel emits the status as a number on some endpoints and a string on others.
fn deserialize_status_flag<'de, D>(deserializer: D) -> Result<StatusFlag, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let (success, raw) = match &value {
        Value::Number(n) => (n.as_i64() == Some(1), n.to_string()),
        Value::String(s) => (s.trim() == "1", s.clone()),
        Value::Bool(b) => (*b, b.to_string()),
        other => {
            return Err(serde::de::Error::custom(format!(
                "unexpected status flag: {other}"
            )));
        }
    };
    Ok(StatusFlag { success, raw })
}
