//! Flat key-value settings source

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::CoreResult;

/// Where the operator settings blob comes from.
#[async_trait]
pub trait SettingsSource: Send + Sync {
    /// Load every setting. Read once per process and again on explicit reload.
    async fn load(&self) -> CoreResult<HashMap<String, String>>;
}

/// In-memory settings
///
/// Used by tests and by embedders that assemble settings themselves.
#[derive(Default)]
pub struct InMemorySettings {
    values: RwLock<HashMap<String, String>>,
}

impl InMemorySettings {
    #[must_use]
    pub fn new(values: HashMap<String, String>) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values.write().await.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for InMemorySettings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[async_trait]
impl SettingsSource for InMemorySettings {
    async fn load(&self) -> CoreResult<HashMap<String, String>> {
        Ok(self.values.read().await.clone())
    }
}
