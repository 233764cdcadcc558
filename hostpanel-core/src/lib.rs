//! Hostpanel Core Library
//!
//! Business logic for hosting-account lifecycle management:
//! - Provisioning on the reseller provider (Hosting Service)
//! - The suspension state machine and its reconciliation against the provider
//! - Nameserver delegation checks for custom domains
//! - The owner deactivation rate limit
//!
//! Storage, settings and notifications are abstracted through traits so the
//! platform layer can inject its own implementations.

pub mod config;
pub mod crypto;
pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use config::{ConfigService, HostPanelConfig};
pub use error::{CoreError, CoreResult};
pub use services::{HostingService, ServiceContext};
pub use traits::{HostingAccountRepository, Notifier, SettingsSource};
