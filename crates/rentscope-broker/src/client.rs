//! HTTP transport for the rental broker's API gateway.
//!
//! Every request carries the browser-like header set the gateway expects,
//! the static tenant header and a per-request device-info header. Calls are
//! never retried; a failed call is reported to the caller as a
//! [`BrokerError`] and it is up to the caller to treat it as "no data".

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Url};
use serde::Serialize;

use rentscope_core::AppConfig;

use crate::error::BrokerError;

const TENANT_HEADER: &str = "x-tenant-id";
const DEVICE_INFO_HEADER: &str = "x-web-device-info";

/// Connection settings for [`BrokerClient`].
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub base_url: String,
    pub tenant_id: String,
    pub user_agent: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl BrokerSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            base_url: config.broker_base_url.clone(),
            tenant_id: config.broker_tenant_id.clone(),
            user_agent: config.broker_user_agent.clone(),
            connect_timeout_secs: config.broker_connect_timeout_secs,
            request_timeout_secs: config.broker_request_timeout_secs,
        }
    }
}

pub struct BrokerClient {
    client: Client,
    base_url: Url,
}

impl BrokerClient {
    /// # Errors
    ///
    /// - [`BrokerError::InvalidBaseUrl`] if `base_url` does not parse.
    /// - [`BrokerError::InvalidHeader`] if the tenant id is not a valid header value.
    /// - [`BrokerError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new(settings: &BrokerSettings) -> Result<Self, BrokerError> {
        // Exactly one trailing slash so relative joins append to the path
        // instead of replacing its last segment.
        let normalised = format!("{}/", settings.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| BrokerError::InvalidBaseUrl {
            base_url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .user_agent(settings.user_agent.as_str())
            .default_headers(static_headers(&settings.tenant_id)?)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// # Errors
    ///
    /// See [`BrokerClient::new`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, BrokerError> {
        Self::new(&BrokerSettings::from_app_config(config))
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Issues one request and returns the raw response body.
    ///
    /// # Errors
    ///
    /// - [`BrokerError::Http`] on connect failure, timeout or TLS error.
    /// - [`BrokerError::UnexpectedStatus`] for any non-2xx status.
    /// - [`BrokerError::EmptyBody`] when a 2xx response has no content.
    /// - [`BrokerError::InvalidBaseUrl`] if `path` cannot be joined onto the base URL.
    pub async fn fetch<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, BrokerError>
    where
        B: Serialize + ?Sized,
    {
        let url = self.endpoint_url(path)?;
        let session_id = chrono::Utc::now().timestamp();

        let mut request = self
            .client
            .request(method.clone(), url.clone())
            .header(DEVICE_INFO_HEADER, device_info(session_id));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%method, %url, error = %e, "broker request failed");
                return Err(BrokerError::Http(e));
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%method, %url, status = status.as_u16(), "broker returned non-success status");
            return Err(BrokerError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            tracing::warn!(%method, %url, "broker returned an empty body");
            return Err(BrokerError::EmptyBody {
                url: url.to_string(),
            });
        }

        Ok(text)
    }

    /// # Errors
    ///
    /// See [`BrokerClient::fetch`].
    pub async fn get(&self, path: &str) -> Result<String, BrokerError> {
        self.fetch::<()>(Method::GET, path, None).await
    }

    /// Sends `body` as JSON.
    ///
    /// # Errors
    ///
    /// See [`BrokerClient::fetch`].
    pub async fn post<B>(&self, path: &str, body: &B) -> Result<String, BrokerError>
    where
        B: Serialize + ?Sized,
    {
        self.fetch(Method::POST, path, Some(body)).await
    }

    fn endpoint_url(&self, path: &str) -> Result<Url, BrokerError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| BrokerError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: format!("cannot join \"{path}\": {e}"),
            })
    }
}

/// Headers sent on every request, mirroring what the broker's own web
/// frontend sends.
fn static_headers(tenant_id: &str) -> Result<HeaderMap, BrokerError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("tr"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(
        HeaderName::from_static("priority"),
        HeaderValue::from_static("u=1, i"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static("empty"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static("cors"),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static("same-site"),
    );
    headers.insert(
        HeaderName::from_static("sec-gpc"),
        HeaderValue::from_static("1"),
    );

    let tenant = HeaderValue::from_str(tenant_id).map_err(|e| BrokerError::InvalidHeader {
        name: TENANT_HEADER,
        reason: e.to_string(),
    })?;
    headers.insert(HeaderName::from_static(TENANT_HEADER), tenant);

    Ok(headers)
}

/// Device descriptor the gateway expects; `session_id` is a Unix timestamp.
pub(crate) fn device_info(session_id: i64) -> String {
    serde_json::json!({
        "browser": "Chrome",
        "webDeviceType": "desktop",
        "os": "Windows",
        "sessionId": session_id,
    })
    .to_string()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
