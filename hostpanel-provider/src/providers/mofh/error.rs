//! MOFH error mapping

use crate::error::ProviderError;
use crate::traits::{ProviderErrorMapper, RawApiError};

use super::{MofhProvider, PROVIDER_NAME};

/// Message fragments the panel uses when the reseller key itself is refused.
const CREDENTIAL_MARKERS: &[&str] = &[
    "access denied",
    "authentication failed",
    "invalid api key",
    "not authorized",
];

/// Classify a failure reported inside the panel envelope.
///
/// Only reseller-key failures are recognised; every other failed envelope is a
/// business rejection whose message is shown to the owner unchanged.
pub(crate) fn classify(raw: RawApiError) -> ProviderError {
    let lowered = raw.message.to_ascii_lowercase();
    if CREDENTIAL_MARKERS.iter().any(|m| lowered.contains(m)) {
        return ProviderError::InvalidCredentials {
            provider: PROVIDER_NAME.to_string(),
            raw_message: Some(raw.message),
        };
    }
    let raw_message = if raw.message.trim().is_empty() {
        match raw.status {
            Some(status) => format!("The provider rejected the request (status {status})"),
            None => "The provider rejected the request".to_string(),
        }
    } else {
        raw.message
    };
    ProviderError::Rejected {
        provider: PROVIDER_NAME.to_string(),
        raw_message,
    }
}

impl ProviderErrorMapper for MofhProvider {
    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn map_error(&self, raw: RawApiError) -> ProviderError {
        classify(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rejection_is_verbatim() {
        let err = classify(RawApiError::with_status(
            "0",
            "The domain demo.example.net is already assigned to an account",
        ));
        assert_eq!(
            err.to_string(),
            "The domain demo.example.net is already assigned to an account"
        );
        assert!(err.is_expected());
    }

    #[test]
    fn empty_message_gets_placeholder() {
        let err = classify(RawApiError::with_status("0", ""));
        assert!(matches!(
            err,
            ProviderError::Rejected { ref raw_message, .. } if raw_message.contains("status 0")
        ));
    }

    #[test]
    fn credential_failure_recognised() {
        let err = classify(RawApiError::new("Access denied: invalid API key"));
        assert!(matches!(err, ProviderError::InvalidCredentials { .. }));
    }
}
