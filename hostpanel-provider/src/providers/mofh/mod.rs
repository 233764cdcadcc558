//! MOFH-style reseller panel (MyOwnFreeHost and compatible WHM reseller APIs)

mod error;
mod http;
mod provider;
mod types;

use reqwest::Client;

use crate::error::Result;
use crate::providers::common::{ClientOptions, create_http_client};
use crate::types::ResellerCredentials;

pub(crate) use types::{MofhEnvelope, MofhResult};

pub(crate) const PROVIDER_NAME: &str = "mofh";

/// Reseller API client speaking the JSON API (mutations) and the XML-style
/// API (status and availability queries) of a MOFH panel.
pub struct MofhProvider {
    pub(crate) client: Client,
    pub(crate) credentials: ResellerCredentials,
    pub(crate) max_retries: u32,
}

impl MofhProvider {
    /// Build a client with bounded timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidParameter`](crate::ProviderError::InvalidParameter)
    /// for malformed credentials, or a network error when the HTTP client cannot be built.
    pub fn new(credentials: ResellerCredentials, options: ClientOptions) -> Result<Self> {
        credentials
            .validate()
            .map_err(|e| crate::ProviderError::InvalidParameter {
                provider: PROVIDER_NAME.to_string(),
                param: "credentials".to_string(),
                detail: e.to_string(),
            })?;
        Ok(Self {
            client: create_http_client(PROVIDER_NAME, &options)?,
            credentials,
            max_retries: options.max_retries,
        })
    }

    pub(crate) fn json_api_url(&self, endpoint: &str) -> String {
        format!("{}/json-api/{endpoint}.php", self.credentials.base_url())
    }

    pub(crate) fn xml_api_url(&self, endpoint: &str) -> String {
        format!("{}/xml-api/{endpoint}.php", self.credentials.base_url())
    }
}
