//! HTTP retry helper for transient errors.
//!
//! Adapters call [`send_json`] instead of `reqwest::RequestBuilder::send()`
//! directly so every request gets a bounded retry budget with short
//! exponential backoff. Budgets are per-source design parameters: the
//! open-data feeds use [`OPEN_DATA_ATTEMPTS`], the places aggregator the
//! cheaper [`AGGREGATOR_ATTEMPTS`].

use std::time::Duration;

use crate::SourceError;

/// Retry budget for the government open-data feeds.
pub const OPEN_DATA_ATTEMPTS: u32 = 3;

/// Retry budget for each places-search sub-request (costlier API).
pub const AGGREGATOR_ATTEMPTS: u32 = 2;

/// Base delay for the exponential backoff (250ms, 500ms, 1s, ...).
const BACKOFF_BASE_MS: u64 = 250;

/// Delay to wait before retry number `attempt` (attempts are 1-based, so
/// the first retry is attempt 2 and waits the base delay).
pub(crate) const fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(BACKOFF_BASE_MS << (attempt - 2))
}

/// Sends an HTTP request and parses the response body as JSON, retrying
/// transient failures up to `attempts` times.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`] (builders are consumed by `.send()`).
///
/// Retries connection errors, timeouts, HTTP 429, and HTTP 5xx. Other
/// non-success statuses are permanent and fail immediately.
///
/// # Errors
///
/// Returns [`SourceError`] if the request still fails once the budget is
/// exhausted, or the server returns a non-retryable status.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(
    label: &str,
    attempts: u32,
    build_request: F,
) -> Result<serde_json::Value, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_error: Option<SourceError> = None;

    for attempt in 1..=attempts {
        if attempt > 1 {
            let delay = backoff_delay(attempt);
            log::warn!("{label}: retry {attempt}/{attempts} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < attempts {
                    log::warn!("{label}: transient error: {e}");
                    last_error = Some(SourceError::Http(e));
                    continue;
                }
                return Err(SourceError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    if attempt < attempts {
                        log::warn!("{label}: HTTP {status}");
                        last_error = Some(SourceError::Shape {
                            message: format!("HTTP {status}"),
                        });
                        continue;
                    }
                    return Err(SourceError::Shape {
                        message: format!("HTTP {status} after {attempts} attempts"),
                    });
                }

                if !status.is_success() {
                    return Err(SourceError::Shape {
                        message: format!("HTTP {status}"),
                    });
                }

                return Ok(response.json::<serde_json::Value>().await?);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| SourceError::Shape {
        message: "request failed after all attempts".to_string(),
    }))
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request()
}
