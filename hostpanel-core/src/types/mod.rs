//! Type definition module

mod account;
mod hosting;
mod response;

pub use account::{
    ADMIN_SUSPENSION_MARKER, AccountPassword, HostingAccount, HostingStatus, is_admin_suspension,
};
pub use hosting::{
    CreateHostingRequest, CreatedHosting, DelegationCheck, DomainAvailability, DomainChoice,
    ProviderSnapshot, ReconcileOutcome, StatusSync, SweepReport,
};
pub use response::{ApiErrorBody, ApiResponse};

// Re-export the provider crate's identifier and status types
pub use hostpanel_provider::{DomainStatusEntry, InternalUsername, ProviderStatus, ProviderUsername};
