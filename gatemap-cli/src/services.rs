//! Construction of the places client and the recent-places store.

use std::fmt;
use std::rc::Rc;

use camino::Utf8Path;
use gatemap_core::{PlacesProvider, RecencyStore};
use gatemap_data::{HttpPlacesClient, HttpPlacesClientConfig, SqliteRecencyStore, places};

use crate::CliError;

/// Resolved connection settings for the places provider.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct PlacesConfig {
    pub(crate) api_key: String,
    pub(crate) base_url: String,
}

impl fmt::Debug for PlacesConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlacesConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl PlacesConfig {
    /// Resolve merged options, requiring an API key.
    pub(crate) fn resolve(
        api_key: Option<String>,
        base_url: Option<String>,
        env: &'static str,
    ) -> Result<Self, CliError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: crate::ARG_API_KEY,
                env,
            })?;
        Ok(Self {
            api_key,
            ..Self::without_key(base_url)
        })
    }

    /// Settings for a provider that is never asked anything.
    pub(crate) fn without_key(base_url: Option<String>) -> Self {
        Self {
            api_key: String::new(),
            base_url: base_url.unwrap_or_else(|| places::DEFAULT_BASE_URL.to_owned()),
        }
    }
}

/// Builds the services a command needs.
pub(crate) trait Services {
    fn places(&self, config: &PlacesConfig) -> Result<Rc<dyn PlacesProvider>, CliError>;
    fn recents(&self, path: &Utf8Path) -> Result<Rc<dyn RecencyStore>, CliError>;
}

/// HTTP places client and `SQLite` recent places.
pub(crate) struct DefaultServices;

impl Services for DefaultServices {
    fn places(&self, config: &PlacesConfig) -> Result<Rc<dyn PlacesProvider>, CliError> {
        let client_config =
            HttpPlacesClientConfig::new(config.api_key.clone()).with_base_url(&config.base_url);
        let client = HttpPlacesClient::with_config(client_config).map_err(|source| {
            CliError::BuildPlacesClient {
                base_url: config.base_url.clone(),
                source,
            }
        })?;
        Ok(Rc::new(client))
    }

    fn recents(&self, path: &Utf8Path) -> Result<Rc<dyn RecencyStore>, CliError> {
        let store = SqliteRecencyStore::open(path).map_err(|source| CliError::OpenRecents {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Rc::new(store))
    }
}
