//! Storage and settings adapters for the hosting panel.

mod json_settings;

pub use json_settings::JsonFileSettings;

#[cfg(feature = "sqlite-store")]
mod sqlite;

#[cfg(feature = "sqlite-store")]
pub use sqlite::SqliteHostingAccountRepository;
