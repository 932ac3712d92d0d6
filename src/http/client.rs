//! HTTP client for the upstream catalog API
//!
//! Provides a client that handles:
//! - Request construction with the API's auth and client headers
//! - Error classification for retry diagnostics
//! - Response body parsing

use crate::config::ApiConfig;
use crate::entity::PageResponse;
use crate::error::{is_retryable_message, Error, Result};
use reqwest::header::{ACCEPT_ENCODING, ACCEPT_LANGUAGE, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::error::Error as StdError;
use tracing::debug;

/// User agent sent with every request
pub const DEFAULT_USER_AGENT: &str = concat!("catalog-sync/", env!("CARGO_PKG_VERSION"));

/// Header carrying the API client identifier
const CLIENT_ID_HEADER: &str = "Client_Id";

/// HTTP client bound to one upstream API configuration
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: ApiConfig,
}

impl HttpClient {
    /// Create a client for the given API configuration
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(DEFAULT_USER_AGENT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Fetch one page of `endpoint` and decode it.
    ///
    /// Fails with a retryable error on transient transport failures and on
    /// 408/429/500/502/503/504; everything else is non-retryable.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        customer_param: &str,
        page: u32,
    ) -> Result<PageResponse<T>> {
        let url = self.build_url(endpoint);
        let limit = self.config.limit.to_string();
        let page_number = page.to_string();

        let request = self
            .client
            .get(&url)
            .query(&[
                (customer_param, self.config.customer.as_str()),
                ("Limit", limit.as_str()),
                ("Page", page_number.as_str()),
            ])
            .header(AUTHORIZATION, &self.config.authorization)
            .header(CLIENT_ID_HEADER, &self.config.client_id)
            .header(ACCEPT_LANGUAGE, "en")
            .header(ACCEPT_ENCODING, "gzip, deflate");

        debug!("GET {} page {}", url, page);

        let response = request.send().await.map_err(classify_send_error)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, body));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::decode(format!("error reading response body: {e}")))?;

        serde_json::from_slice(&body)
            .map_err(|e| Error::decode(format!("error unmarshaling JSON: {e}")))
    }

    /// Build full URL from an endpoint path
    fn build_url(&self, endpoint: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        format!("{base}/{endpoint}")
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Turn a failed send into a classified transport error.
///
/// reqwest keeps the interesting part ("connection refused", "dns error") in
/// the source chain, so the whole chain is matched.
fn classify_send_error(err: reqwest::Error) -> Error {
    let message = error_chain(&err);
    let retryable = err.is_timeout() || err.is_connect() || is_retryable_message(&message);
    Error::Transport { message, retryable }
}

/// Build an error for a non-success status
fn status_error(status: StatusCode, body: String) -> Error {
    Error::http_status(status.as_u16(), body)
}

/// Join an error and its sources into one line
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
