//! reqwest-backed implementation of the refresh call and user lookup.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use adminhub_core::config::ApiConfig;
use adminhub_core::error::{AppError, ErrorKind};
use adminhub_core::result::AppResult;
use adminhub_core::traits::{RefreshedToken, TokenRefresher, TokenStorage, UserDirectory};
use adminhub_core::types::UserProfile;

/// Body of the refresh request.
#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    /// Subject the new token is issued for.
    sub: &'a str,
}

/// Calls the dashboard backend on behalf of the session core.
///
/// Every request carries the currently stored bearer token, read from the
/// same storage the token store writes to.
#[derive(Clone)]
pub struct HttpSessionApi {
    /// Shared HTTP client.
    client: reqwest::Client,
    /// Base URL every endpoint is resolved against.
    base_url: Url,
    /// Path segments of the refresh endpoint.
    refresh_path: Vec<String>,
    /// Path segments of the user lookup prefix.
    users_path: Vec<String>,
    /// Source of the bearer token.
    storage: Arc<dyn TokenStorage>,
}

impl std::fmt::Debug for HttpSessionApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSessionApi")
            .field("base_url", &self.base_url)
            .field("refresh_path", &self.refresh_path)
            .field("users_path", &self.users_path)
            .finish()
    }
}

impl HttpSessionApi {
    /// Creates a client from API configuration.
    pub fn new(config: &ApiConfig, storage: Arc<dyn TokenStorage>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build HTTP client: {e}"),
                    e,
                )
            })?;

        let base_url = Url::parse(config.base_url.trim()).map_err(|e| {
            AppError::with_source(
                ErrorKind::Configuration,
                format!("Invalid api.base_url '{}': {e}", config.base_url),
                e,
            )
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::configuration(format!(
                "api.base_url '{}' cannot carry endpoint paths",
                config.base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            refresh_path: path_segments(&config.refresh_path),
            users_path: path_segments(&config.users_path),
            storage,
        })
    }

    /// Appends each segment to the base URL, percent-encoding as needed.
    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| AppError::configuration("api.base_url cannot carry endpoint paths"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.storage.load() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        what: &str,
    ) -> AppResult<T> {
        let response = self.authorized(request).send().await.map_err(|e| {
            let kind = if e.is_timeout() || e.is_connect() {
                ErrorKind::ServiceUnavailable
            } else {
                ErrorKind::ExternalService
            };
            AppError::with_source(kind, format!("{what} request failed: {e}"), e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, what, body.trim()));
        }

        response.json::<T>().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("{what} response could not be parsed: {e}"),
                e,
            )
        })
    }
}

#[async_trait]
impl TokenRefresher for HttpSessionApi {
    async fn refresh(&self, subject: &str) -> AppResult<RefreshedToken> {
        let url = self.endpoint(self.refresh_path.iter().map(String::as_str))?;
        debug!(subject, %url, "Requesting token refresh");
        let request = self.client.post(url).json(&RefreshRequest { sub: subject });
        let refreshed: RefreshedToken = self.send(request, "Token refresh").await?;

        if refreshed.access_token.trim().is_empty() {
            return Err(AppError::external_service(
                "Token refresh returned an empty access token",
            ));
        }
        Ok(refreshed)
    }
}

#[async_trait]
impl UserDirectory for HttpSessionApi {
    async fn get_user_by_id(&self, subject_id: &str) -> AppResult<UserProfile> {
        let url = self.endpoint(
            self.users_path
                .iter()
                .map(String::as_str)
                .chain(std::iter::once(subject_id)),
        )?;
        debug!(subject_id, %url, "Looking up user");
        self.send(self.client.get(url), "User lookup").await
    }
}

fn path_segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

fn status_error(status: StatusCode, what: &str, body: &str) -> AppError {
    let message = if body.is_empty() {
        format!("{what} failed with status {status}")
    } else {
        format!("{what} failed with status {status}: {body}")
    };

    match status {
        StatusCode::UNAUTHORIZED => AppError::authentication(message),
        StatusCode::FORBIDDEN => AppError::authorization(message),
        StatusCode::NOT_FOUND => AppError::not_found(message),
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT => {
            AppError::service_unavailable(message)
        }
        _ => AppError::external_service(message),
    }
}
