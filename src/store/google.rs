// src/store/google.rs
//! Google Sheets backend for [`SheetStore`].
//!
//! Thin wrapper around the generated `google-sheets4` client. Transient
//! API failures (rate limit, 5xx, socket errors) are retried with bounded
//! exponential backoff; permanent failures (not found, auth) surface
//! immediately and abort the run.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use google_sheets4::api::{ClearValuesRequest, ValueRange};
use google_sheets4::{common, hyper_rustls, hyper_util, yup_oauth2, Error as ApiError, Sheets};
use tracing::warn;

use super::SheetStore;
use crate::error::StoreError;

const MAX_ATTEMPTS: u32 = 5;
const BASE_DELAY: Duration = Duration::from_secs(4);
const MAX_DELAY: Duration = Duration::from_secs(10);

pub struct GoogleSheetsStore<C>
where
    C: common::Connector + Send + Sync + 'static,
{
    hub: Sheets<C>,
    spreadsheet_id: String,
}

impl<C> GoogleSheetsStore<C>
where
    C: common::Connector + Send + Sync + 'static,
{
    pub fn new(hub: Sheets<C>, spreadsheet_id: String) -> Self {
        Self {
            hub,
            spreadsheet_id,
        }
    }

    fn qualified(&self, tab: &str, range: &str) -> String {
        format!("'{tab}'!{range}")
    }
}

impl<C> std::fmt::Debug for GoogleSheetsStore<C>
where
    C: common::Connector + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleSheetsStore")
            .field("spreadsheet_id", &self.spreadsheet_id)
            .finish_non_exhaustive()
    }
}

/// Rate limits and server-side hiccups are worth retrying; anything else
/// (bad range, missing sheet, revoked credentials) is not.
fn is_transient(err: &ApiError) -> bool {
    match err {
        ApiError::HttpError(_) | ApiError::Io(_) => true,
        ApiError::Failure(res) => {
            let code = res.status().as_u16();
            code == 429 || code >= 500
        }
        ApiError::BadRequest(value) => {
            let code = value
                .get("error")
                .and_then(|e| e.get("code"))
                .and_then(|c| c.as_u64())
                .unwrap_or(0);
            code == 429 || code >= 500
        }
        _ => false,
    }
}

async fn retrying<T, F, Fut>(op: &'static str, mut call: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match call().await {
            Ok(v) => return Ok(v),
            Err(e) if is_transient(&e) && attempt < MAX_ATTEMPTS => {
                let delay = (BASE_DELAY * 2u32.saturating_pow(attempt - 1)).min(MAX_DELAY);
                warn!(op, attempt, delay_s = delay.as_secs(), error = %e, "transient sheet API error; backing off");
                tokio::time::sleep(delay).await;
            }
            Err(e) if is_transient(&e) => {
                return Err(StoreError::transient(op, format!("retries exhausted: {e}")));
            }
            Err(e) => return Err(StoreError::permanent(op, e.to_string())),
        }
    }
}

fn cell_to_string(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl<C> SheetStore for GoogleSheetsStore<C>
where
    C: common::Connector + Send + Sync + 'static,
{
    async fn read_range(&self, tab: &str, range: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let qualified = self.qualified(tab, range);
        let (_, value_range) = retrying("values_get", || {
            let range = qualified.clone();
            async move {
                self.hub
                    .spreadsheets()
                    .values_get(&self.spreadsheet_id, &range)
                    .doit()
                    .await
            }
        })
        .await?;

        Ok(value_range
            .values
            .unwrap_or_default()
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }

    async fn update_range(
        &self,
        tab: &str,
        start_cell: &str,
        rows: Vec<Vec<String>>,
    ) -> Result<(), StoreError> {
        let qualified = self.qualified(tab, start_cell);
        let values: Vec<Vec<serde_json::Value>> = rows
            .into_iter()
            .map(|row| row.into_iter().map(serde_json::Value::String).collect())
            .collect();

        retrying("values_update", || {
            let body = ValueRange {
                values: Some(values.clone()),
                ..Default::default()
            };
            let range = qualified.clone();
            async move {
                self.hub
                    .spreadsheets()
                    .values_update(body, &self.spreadsheet_id, &range)
                    .value_input_option("USER_ENTERED")
                    .doit()
                    .await
            }
        })
        .await?;
        Ok(())
    }

    async fn clear_tab(&self, tab: &str) -> Result<(), StoreError> {
        let range = format!("'{tab}'");
        retrying("values_clear", || {
            let range = range.clone();
            async move {
                self.hub
                    .spreadsheets()
                    .values_clear(ClearValuesRequest::default(), &self.spreadsheet_id, &range)
                    .doit()
                    .await
            }
        })
        .await?;
        Ok(())
    }
}

/// Connector type used by [`connect`].
pub type DefaultConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;

/// Build a store from service-account credentials JSON.
pub async fn connect(
    spreadsheet_id: String,
    service_account_json: &str,
) -> anyhow::Result<GoogleSheetsStore<DefaultConnector>> {
    let key = yup_oauth2::parse_service_account_key(service_account_json)?;
    let auth = yup_oauth2::ServiceAccountAuthenticator::builder(key)
        .build()
        .await?;

    let client = hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
        .build(
            hyper_rustls::HttpsConnectorBuilder::new()
                .with_native_roots()?
                .https_or_http()
                .enable_http1()
                .build(),
        );

    Ok(GoogleSheetsStore::new(
        Sheets::new(client, auth),
        spreadsheet_id,
    ))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn io_error() -> ApiError {
        ApiError::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "connection reset",
        ))
    }

    #[test]
    fn transient_classification_by_error_shape() {
        let rate_limited = ApiError::BadRequest(serde_json::json!({"error": {"code": 429}}));
        let server_side = ApiError::BadRequest(serde_json::json!({"error": {"code": 503}}));
        let not_found = ApiError::BadRequest(serde_json::json!({"error": {"code": 404}}));

        assert!(is_transient(&rate_limited));
        assert!(is_transient(&server_side));
        assert!(is_transient(&io_error()));
        assert!(!is_transient(&not_found));
        assert!(!is_transient(&ApiError::MissingAPIKey));
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_error_aborts_on_first_attempt() {
        let attempts = Cell::new(0u32);
        let result: Result<(), StoreError> = retrying("values_get", || {
            attempts.set(attempts.get() + 1);
            async { Err(ApiError::MissingAPIKey) }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(attempts.get(), 1);
        assert!(!err.transient);
        assert_eq!(err.op, "values_get");
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_exhaust_after_max_attempts() {
        let attempts = Cell::new(0u32);
        let result: Result<(), StoreError> = retrying("values_update", || {
            attempts.set(attempts.get() + 1);
            async { Err(io_error()) }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(attempts.get(), MAX_ATTEMPTS);
        assert!(err.transient);
        assert!(err.message.contains("retries exhausted"));
    }

    #[tokio::test(start_paused = true)]
    async fn transient_error_recovers_within_the_attempt_budget() {
        let attempts = Cell::new(0u32);
        let result = retrying("values_get", || {
            attempts.set(attempts.get() + 1);
            let n = attempts.get();
            async move {
                if n < 3 {
                    Err(io_error())
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(attempts.get(), 3);
    }
}
