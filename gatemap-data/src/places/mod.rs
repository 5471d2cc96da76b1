//! HTTP-based places provider for the Google Places web service.
//!
//! This module provides [`HttpPlacesClient`], an implementation of
//! [`gatemap_core::PlacesProvider`] that issues autocomplete, details and
//! photo requests against the provider's web API.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use gatemap_core::PlacesProvider;
//! use gatemap_data::places::{HttpPlacesClient, HttpPlacesClientConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpPlacesClientConfig::new("my-api-key")
//!     .with_timeout(Duration::from_secs(5))
//!     .with_user_agent("my-app/1.0");
//! let client = HttpPlacesClient::with_config(config)?;
//!
//! let candidates = client.autocomplete("Starbucks").await?;
//! if let Some(first) = candidates.first() {
//!     let detail = client.details(first.place_id()).await?;
//!     println!("{} is at {:?}", detail.name, detail.coordinate);
//! }
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "http")]
mod client;
#[cfg(feature = "http")]
mod google;

#[doc(hidden)]
pub mod test_support;

#[cfg(feature = "http")]
pub use client::{
    ClientBuildError, DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HttpPlacesClient,
    HttpPlacesClientConfig,
};
