//! Reseller API implementations

/// Shared utilities used by provider implementations.
pub mod common;

mod mofh;

pub use mofh::MofhProvider;
