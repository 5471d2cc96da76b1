//! `PlacesProvider` backed by the Google Places web service.
//!
//! Every call is a single HTTP round-trip; nothing is cached and nothing is
//! retried. Provider status codes are mapped onto [`PlacesError`] so callers
//! never see transport types.
//!
//! The API key is appended as a query parameter on each request and is kept
//! out of every error message and log line.

use std::time::Duration;

use async_trait::async_trait;
use gatemap_core::{PlaceCandidate, PlaceDetail, PlacesError, PlacesProvider};
use reqwest::header::LOCATION;
use reqwest::{Client, redirect};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use super::google::{AutocompleteResponse, DetailsResponse};

/// Error type for [`HttpPlacesClient`] construction failures.
#[derive(Debug, Error)]
pub enum ClientBuildError {
    /// Failed to build the HTTP client.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
    /// The configured base URL is not an absolute URL.
    #[error("invalid places base URL {url:?}: {source}")]
    InvalidBaseUrl {
        /// Rejected value.
        url: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },
}

/// Default endpoint root for the places web service.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";

/// Default user agent for places requests.
pub const DEFAULT_USER_AGENT: &str = "gatemap-places/0.1";

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default bounding box for resolved photos, in pixels.
const DEFAULT_PHOTO_MAX_DIMENSION: u32 = 400;

/// Configuration for [`HttpPlacesClient`].
#[derive(Clone)]
pub struct HttpPlacesClientConfig {
    /// Endpoint root, e.g. `"https://maps.googleapis.com/maps/api/place"`.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: String,
    /// Request timeout duration.
    pub timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Maximum width of resolved photos.
    pub photo_max_width: u32,
    /// Maximum height of resolved photos.
    pub photo_max_height: u32,
}

impl std::fmt::Debug for HttpPlacesClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPlacesClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("photo_max_width", &self.photo_max_width)
            .field("photo_max_height", &self.photo_max_height)
            .finish()
    }
}

impl Default for HttpPlacesClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_key: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            photo_max_width: DEFAULT_PHOTO_MAX_DIMENSION,
            photo_max_height: DEFAULT_PHOTO_MAX_DIMENSION,
        }
    }
}

impl HttpPlacesClientConfig {
    /// Create a new configuration with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Point the client at a different endpoint root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the bounding box of resolved photos.
    #[must_use]
    pub fn with_photo_size(mut self, max_width: u32, max_height: u32) -> Self {
        self.photo_max_width = max_width;
        self.photo_max_height = max_height;
        self
    }
}

/// HTTP client for the places web service.
///
/// Two `reqwest` clients are kept: one for JSON endpoints and one that does
/// not follow redirects, so photo requests can report the image location
/// instead of downloading the image.
pub struct HttpPlacesClient {
    client: Client,
    photo_client: Client,
    config: HttpPlacesClientConfig,
}

impl std::fmt::Debug for HttpPlacesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPlacesClient")
            .field("client", &self.client)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HttpPlacesClient {
    /// Create a new client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ClientBuildError> {
        Self::with_config(HttpPlacesClientConfig::new(api_key))
    }

    /// Create a new client with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not absolute or the HTTP client
    /// fails to build.
    pub fn with_config(config: HttpPlacesClientConfig) -> Result<Self, ClientBuildError> {
        Url::parse(&config.base_url).map_err(|source| ClientBuildError::InvalidBaseUrl {
            url: config.base_url.clone(),
            source,
        })?;
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        let photo_client = Client::builder()
            .user_agent(&config.user_agent)
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(ClientBuildError::HttpClient)?;
        Ok(Self {
            client,
            photo_client,
            config,
        })
    }

    /// Build the URL of `endpoint` beneath the configured root.
    ///
    /// The result carries no query string, so it is safe to log.
    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        )
    }

    /// Issue a GET against a JSON endpoint and decode the body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, PlacesError> {
        let url = self.endpoint_url(endpoint);
        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.config.api_key.as_str())])
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &url))?
            .error_for_status()
            .map_err(|err| self.convert_reqwest_error(err, &url))?;

        response.json().await.map_err(|err| PlacesError::Parse {
            message: err.without_url().to_string(),
        })
    }

    /// Convert a reqwest error to a `PlacesError`, dropping the request URL
    /// (and with it the API key) from the message.
    fn convert_reqwest_error(&self, error: reqwest::Error, url: &str) -> PlacesError {
        if error.is_timeout() {
            return PlacesError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.timeout.as_secs(),
            };
        }

        if let Some(status) = error.status() {
            return PlacesError::Http {
                url: url.to_owned(),
                status: status.as_u16(),
                message: error.without_url().to_string(),
            };
        }

        PlacesError::Network {
            url: url.to_owned(),
            message: error.without_url().to_string(),
        }
    }
}

#[async_trait(?Send)]
impl PlacesProvider for HttpPlacesClient {
    async fn autocomplete(&self, query: &str) -> Result<Vec<PlaceCandidate>, PlacesError> {
        let response: AutocompleteResponse = self
            .get_json("autocomplete/json", &[("input", query)])
            .await?;
        response.into_candidates()
    }

    async fn details(&self, place_id: &str) -> Result<PlaceDetail, PlacesError> {
        let response: DetailsResponse = self
            .get_json("details/json", &[("place_id", place_id)])
            .await?;
        response.into_detail(place_id)
    }

    async fn resolve_photo_url(&self, reference: &str) -> Result<String, PlacesError> {
        if reference.trim().is_empty() {
            return Err(PlacesError::PhotoUnavailable);
        }

        let url = self.endpoint_url("photo");
        let max_width = self.config.photo_max_width.to_string();
        let max_height = self.config.photo_max_height.to_string();
        let response = self
            .photo_client
            .get(&url)
            .query(&[
                ("maxwidth", max_width.as_str()),
                ("maxheight", max_height.as_str()),
                ("photo_reference", reference),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|err| self.convert_reqwest_error(err, &url))?;

        let status = response.status();
        if status.is_redirection() {
            return response
                .headers()
                .get(LOCATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
                .ok_or_else(|| PlacesError::Parse {
                    message: "photo redirect missing Location header".to_owned(),
                });
        }
        if status.is_success() {
            return Ok(response.url().to_string());
        }
        Err(PlacesError::Http {
            url,
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or_default().to_owned(),
        })
    }
}
