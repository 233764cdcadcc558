//! MOFH request helpers and response parsing

use crate::error::Result;
use crate::http_client::HttpUtils;
use crate::traits::{ProviderErrorMapper, RawApiError};
use crate::types::{DomainStatusEntry, ProviderStatus};
use crate::utils::log_sanitizer::redact_form;

use super::{MofhEnvelope, MofhProvider, MofhResult, PROVIDER_NAME};

impl MofhProvider {
    /// POST to a JSON API endpoint and return the first envelope entry on success.
    ///
    /// Sent once: these endpoints mutate provider state.
    pub(crate) async fn post_json_api(
        &self,
        endpoint: &str,
        form: &[(&str, &str)],
    ) -> Result<MofhResult> {
        let url = self.json_api_url(endpoint);
        log::debug!("[{PROVIDER_NAME}] {endpoint} form: {}", redact_form(form));

        let request = self
            .client
            .post(&url)
            .basic_auth(
                &self.credentials.api_username,
                Some(&self.credentials.api_password),
            )
            .form(form);

        let (status, body) = HttpUtils::execute_request(request, PROVIDER_NAME, endpoint).await?;
        if !(200..300).contains(&status) && body.trim().is_empty() {
            return Err(self.parse_error(format!("HTTP {status} with empty body")));
        }

        let result = parse_json_envelope(&body)?;
        if result.status.success {
            Ok(result)
        } else {
            log::warn!(
                "[{PROVIDER_NAME}] {endpoint} rejected: {}",
                result.statusmsg
            );
            Err(self.map_error(RawApiError::with_status(
                result.status.raw,
                result.statusmsg,
            )))
        }
    }

    /// POST to an XML-style query endpoint and return the raw body.
    ///
    /// These endpoints want the reseller key twice: as HTTP Basic auth and as
    /// `api_user`/`api_key` in the body. Queries are idempotent and retried.
    pub(crate) async fn post_xml_api(
        &self,
        endpoint: &str,
        extra: &[(&str, &str)],
    ) -> Result<String> {
        let url = self.xml_api_url(endpoint);
        let mut form: Vec<(&str, &str)> = vec![
            ("api_user", self.credentials.api_username.as_str()),
            ("api_key", self.credentials.api_password.as_str()),
        ];
        form.extend_from_slice(extra);
        log::debug!("[{PROVIDER_NAME}] {endpoint} form: {}", redact_form(&form));

        let request = self
            .client
            .post(&url)
            .basic_auth(
                &self.credentials.api_username,
                Some(&self.credentials.api_password),
            )
            .form(&form);

        let (status, body) = HttpUtils::execute_request_with_retry(
            request,
            PROVIDER_NAME,
            endpoint,
            self.max_retries,
        )
        .await?;
        if !(200..300).contains(&status) {
            return Err(self.parse_error(format!("HTTP {status} from {endpoint}")));
        }
        Ok(body)
    }
}

/// Parse a JSON API body down to its first result entry.
pub(crate) fn parse_json_envelope(body: &str) -> Result<MofhResult> {
    let envelope: MofhEnvelope = HttpUtils::parse_json(body, PROVIDER_NAME)?;
    envelope
        .result
        .into_iter()
        .next()
        .ok_or_else(|| crate::ProviderError::ParseError {
            provider: PROVIDER_NAME.to_string(),
            detail: "empty result array".to_string(),
        })
}

/// Parse a `getuserdomains` body: `[["ACTIVE","domain"], ...]`.
///
/// An empty body, `null` or `[]` means the provider has no visible record yet.
pub(crate) fn parse_user_domains(body: &str) -> Result<Vec<DomainStatusEntry>> {
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let tuples: Vec<(String, String)> = HttpUtils::parse_json(trimmed, PROVIDER_NAME)?;
    Ok(tuples
        .into_iter()
        .map(|(status, domain)| DomainStatusEntry {
            status: ProviderStatus::parse(&status),
            domain: domain.trim().trim_end_matches('.').to_ascii_lowercase(),
        })
        .collect())
}

/// Parse a `checkavailable` body: `1` (available) or `0` (taken).
pub(crate) fn parse_availability(body: &str) -> Result<bool> {
    match body.trim() {
        "1" => Ok(true),
        "0" => Ok(false),
        other => {
            log::error!(
                "[{PROVIDER_NAME}] checkavailable returned: {}",
                crate::utils::log_sanitizer::truncate_for_log(other)
            );
            Err(crate::ProviderError::ParseError {
                provider: PROVIDER_NAME.to_string(),
                detail: "checkavailable returned neither 1 nor 0".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ProviderError;

    #[test]
    fn envelope_first_entry() {
        let r = parse_json_envelope(
            r#"{"result":[{"status":"1","statusmsg":"Account created","options":{"vpusername":"epiz_12345678"}}]}"#,
        )
        .unwrap();
        assert!(r.status.success);
        assert_eq!(r.option_str("vpusername"), Some("epiz_12345678"));
    }

    #[test]
    fn envelope_empty_result_is_parse_error() {
        let err = parse_json_envelope(r#"{"result":[]}"#).unwrap_err();
        assert!(matches!(err, ProviderError::ParseError { .. }));
    }

    #[test]
    fn envelope_html_is_parse_error() {
        let err = parse_json_envelope("<html>502</html>").unwrap_err();
        assert!(matches!(err, ProviderError::ParseError { .. }));
    }

    #[test]
    fn user_domains_tuples() {
        let entries =
            parse_user_domains(r#"[["ACTIVE","Demo.Example.net"],["SUSPENDED","b.example.net"]]"#)
                .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].status, ProviderStatus::Active);
        assert_eq!(entries[0].domain, "demo.example.net");
        assert_eq!(entries[1].status, ProviderStatus::Suspended);
    }

    #[test]
    fn user_domains_no_record() {
        assert!(parse_user_domains("").unwrap().is_empty());
        assert!(parse_user_domains("null").unwrap().is_empty());
        assert!(parse_user_domains("[]").unwrap().is_empty());
    }

    #[test]
    fn user_domains_garbage_is_parse_error() {
        let err = parse_user_domains("ERROR: unknown user").unwrap_err();
        assert!(matches!(err, ProviderError::ParseError { .. }));
    }

    #[test]
    fn availability_flags() {
        assert!(parse_availability("1").unwrap());
        assert!(!parse_availability(" 0\n").unwrap());
        assert!(matches!(
            parse_availability("maybe"),
            Err(ProviderError::ParseError { .. })
        ));
    }
}
