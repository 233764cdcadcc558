//! Shared HTTP execution for reseller API calls
//!
//! Each endpoint builds its own `RequestBuilder` (auth header, form body);
//! this module owns sending, transport-error classification, logging and
//! response-body parsing.

use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::ProviderError;
use crate::utils::log_sanitizer::truncate_for_log;

/// Upper bound for a server-suggested `Retry-After` wait.
const MAX_RETRY_AFTER_SECS: u64 = 30;
/// Upper bound for exponential backoff.
const MAX_BACKOFF_MS: u64 = 10_000;

/// HTTP helper functions
pub struct HttpUtils;

impl HttpUtils {
    /// Send a request once and return `(status_code, body)`.
    ///
    /// Transport failures map to `Timeout`/`NetworkError`, HTTP 429 to `RateLimited`,
    /// 502..=504 to `NetworkError`, and 401/403 to `InvalidCredentials`. Every other
    /// status is handed back to the caller, whose envelope parser decides.
    pub async fn execute_request(
        request_builder: RequestBuilder,
        provider_name: &str,
        endpoint: &str,
    ) -> Result<(u16, String), ProviderError> {
        log::debug!("[{provider_name}] POST {endpoint}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            } else {
                ProviderError::NetworkError {
                    provider: provider_name.to_string(),
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[{provider_name}] {endpoint} -> HTTP {status_code}");

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        match status_code {
            429 => {
                let body = response.text().await.unwrap_or_default();
                log::warn!("[{provider_name}] Rate limited (HTTP 429), retry_after={retry_after:?}");
                return Err(ProviderError::RateLimited {
                    provider: provider_name.to_string(),
                    retry_after,
                    raw_message: Some(body),
                });
            }
            502..=504 => {
                let body = response.text().await.unwrap_or_default();
                log::warn!("[{provider_name}] Upstream unavailable (HTTP {status_code})");
                return Err(ProviderError::NetworkError {
                    provider: provider_name.to_string(),
                    detail: format!("HTTP {status_code}: {}", truncate_for_log(&body)),
                });
            }
            401 | 403 => {
                let body = response.text().await.unwrap_or_default();
                log::error!("[{provider_name}] API credentials refused (HTTP {status_code})");
                return Err(ProviderError::InvalidCredentials {
                    provider: provider_name.to_string(),
                    raw_message: (!body.trim().is_empty()).then(|| truncate_for_log(&body)),
                });
            }
            _ => {}
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError {
                provider: provider_name.to_string(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[{provider_name}] Response Body: {}",
            truncate_for_log(&response_text)
        );

        Ok((status_code, response_text))
    }

    /// Parse a JSON response body.
    ///
    /// A body that does not match `T` means the provider changed its contract,
    /// so the failure is logged at `error` and surfaced as `ParseError`.
    pub fn parse_json<T>(response_text: &str, provider_name: &str) -> Result<T, ProviderError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!("[{provider_name}] JSON parse failed: {e}");
            log::error!(
                "[{provider_name}] Raw response: {}",
                truncate_for_log(response_text)
            );
            ProviderError::ParseError {
                provider: provider_name.to_string(),
                detail: e.to_string(),
            }
        })
    }

    /// Send a request, retrying transient failures with exponential backoff.
    ///
    /// Only used for read-only endpoints. Mutating endpoints go through
    /// [`execute_request`](Self::execute_request) so a lost response never
    /// turns into a second suspend or create on the provider side.
    pub async fn execute_request_with_retry(
        request_builder: RequestBuilder,
        provider_name: &str,
        endpoint: &str,
        max_retries: u32,
    ) -> Result<(u16, String), ProviderError> {
        if max_retries == 0 {
            return Self::execute_request(request_builder, provider_name, endpoint).await;
        }

        let mut last_error = None;

        for attempt in 0..=max_retries {
            let Some(req) = request_builder.try_clone() else {
                log::warn!("[{provider_name}] Cannot clone request, disabling retry");
                return Self::execute_request(request_builder, provider_name, endpoint).await;
            };

            match Self::execute_request(req, provider_name, endpoint).await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < max_retries && e.is_retryable() => {
                    let delay = retry_delay(&e, attempt);
                    log::warn!(
                        "[{}] {} failed (attempt {}/{}), retrying in {:.1}s: {}",
                        provider_name,
                        endpoint,
                        attempt + 1,
                        max_retries,
                        delay.as_secs_f32(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::NetworkError {
            provider: provider_name.to_string(),
            detail: "All retries exhausted with no error captured".to_string(),
        }))
    }
}

/// Wait before the next attempt: the server's `Retry-After` when given, backoff otherwise.
fn retry_delay(error: &ProviderError, attempt: u32) -> Duration {
    if let ProviderError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(MAX_RETRY_AFTER_SECS))
    } else {
        backoff_delay(attempt)
    }
}

/// 100ms, 200ms, 400ms, ... capped at 10s.
fn backoff_delay(attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20);
    let delay_ms = 100_u64.saturating_mul(1_u64 << capped_attempt);
    Duration::from_millis(delay_ms.min(MAX_BACKOFF_MS))
}
