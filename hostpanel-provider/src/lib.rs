//! # hostpanel-provider
//!
//! Client library for MOFH-style reseller hosting panels.
//!
//! The panel exposes two API families behind one reseller key:
//!
//! | Family | Endpoints | Body | Response |
//! |--------|-----------|------|----------|
//! | JSON API | `createacct`, `suspendacct`, `unsuspendacct`, `passwd` | form, Basic auth | `{"result":[{status,statusmsg,options}]}` |
//! | XML-style API | `getuserdomains`, `checkavailable` | form with `api_user`/`api_key`, Basic auth | bare JSON array or `1`/`0` |
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: use the platform's native TLS implementation.
//! - **`rustls`**: use rustls.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use hostpanel_provider::{
//!     ClientOptions, MofhProvider, ProviderUsername, ResellerApi, ResellerCredentials,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = ResellerCredentials {
//!         api_url: "https://panel.myownfreehost.net:2087".to_string(),
//!         api_username: "reseller".to_string(),
//!         api_password: "api-key".to_string(),
//!     };
//!     let client = MofhProvider::new(credentials, ClientOptions::default())?;
//!
//!     let entries = client
//!         .get_user_domains(&ProviderUsername::new("epiz_12345678"))
//!         .await?;
//!     for entry in entries {
//!         println!("{} {:?}", entry.domain, entry.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! - [`ProviderError::Rejected`]: the panel refused the request; its message is user-facing.
//! - [`ProviderError::ParseError`]: the body did not match the documented contract.
//! - [`ProviderError::NetworkError`], [`ProviderError::Timeout`], [`ProviderError::RateLimited`]:
//!   the outcome is unknown. Status and availability queries retry these with backoff;
//!   mutating calls are sent exactly once.

mod error;
mod http_client;
mod providers;
mod traits;
mod types;
mod utils;

pub use error::{ProviderError, Result};

pub use traits::ResellerApi;

pub use types::{
    CreateAccountParams, CreatedAccount, CredentialValidationError, DomainStatusEntry,
    InternalUsername, ProviderStatus, ProviderUsername, ResellerCredentials,
};

pub use providers::MofhProvider;
pub use providers::common::ClientOptions;

pub use utils::log_sanitizer;
