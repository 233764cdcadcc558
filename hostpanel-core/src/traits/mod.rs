//! Storage and collaborator abstraction trait definitions

mod account_repository;
mod notifier;
mod settings_source;

pub use account_repository::HostingAccountRepository;
pub use notifier::{NoopNotifier, Notifier};
pub use settings_source::{InMemorySettings, SettingsSource};
