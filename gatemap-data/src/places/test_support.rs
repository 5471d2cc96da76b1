//! Test utilities for places providers.
//!
//! This module provides [`StubPlacesProvider`], a deterministic test double
//! for [`PlacesProvider`] that returns pre-configured responses without
//! making HTTP requests. Replies may be delayed on the Tokio clock, which lets
//! tests with paused time control the order in which responses arrive.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use gatemap_core::{PlaceCandidate, PlaceDetail, PlacesError, PlacesProvider};

/// A call observed by [`StubPlacesProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubCall {
    /// `autocomplete` with the given query.
    Autocomplete(String),
    /// `details` for the given place identifier.
    Details(String),
    /// `resolve_photo_url` for the given reference.
    Photo(String),
}

#[derive(Debug, Clone)]
struct StubReply<T> {
    result: Result<T, PlacesError>,
    delay: Duration,
}

impl<T: Clone> StubReply<T> {
    async fn deliver(&self) -> Result<T, PlacesError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.result.clone()
    }
}

/// Stub `PlacesProvider` for testing.
///
/// Unknown autocomplete queries return no candidates, unknown place
/// identifiers return [`PlacesError::NotFound`] and unknown photo references
/// return [`PlacesError::PhotoUnavailable`].
///
/// # Example
///
/// ```
/// use gatemap_core::{PlaceCandidate, PlacesProvider};
/// use gatemap_data::places::test_support::{StubCall, StubPlacesProvider};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let provider = StubPlacesProvider::new()
///     .with_candidates("Star", vec![PlaceCandidate::new("p1", "Starbucks, Main St")]);
///
/// let candidates = provider.autocomplete("Star").await.expect("stubbed");
/// assert_eq!(candidates.len(), 1);
/// assert_eq!(provider.calls(), vec![StubCall::Autocomplete("Star".to_owned())]);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct StubPlacesProvider {
    autocomplete: HashMap<String, StubReply<Vec<PlaceCandidate>>>,
    details: HashMap<String, StubReply<PlaceDetail>>,
    photos: HashMap<String, StubReply<String>>,
    calls: RefCell<Vec<StubCall>>,
}

impl StubPlacesProvider {
    /// Create a provider with no configured replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `candidates` immediately.
    #[must_use]
    pub fn with_candidates(self, query: &str, candidates: Vec<PlaceCandidate>) -> Self {
        self.with_candidates_after(query, candidates, Duration::ZERO)
    }

    /// Answer `query` with `candidates` once `delay` has elapsed.
    #[must_use]
    pub fn with_candidates_after(
        mut self,
        query: &str,
        candidates: Vec<PlaceCandidate>,
        delay: Duration,
    ) -> Self {
        self.autocomplete.insert(
            query.to_owned(),
            StubReply {
                result: Ok(candidates),
                delay,
            },
        );
        self
    }

    /// Fail autocomplete for `query` with `error`.
    #[must_use]
    pub fn with_autocomplete_error(mut self, query: &str, error: PlacesError) -> Self {
        self.autocomplete.insert(
            query.to_owned(),
            StubReply {
                result: Err(error),
                delay: Duration::ZERO,
            },
        );
        self
    }

    /// Answer details for `detail.place_id` immediately.
    #[must_use]
    pub fn with_detail(self, detail: PlaceDetail) -> Self {
        self.with_detail_after(detail, Duration::ZERO)
    }

    /// Answer details for `detail.place_id` once `delay` has elapsed.
    #[must_use]
    pub fn with_detail_after(mut self, detail: PlaceDetail, delay: Duration) -> Self {
        self.details.insert(
            detail.place_id.clone(),
            StubReply {
                result: Ok(detail),
                delay,
            },
        );
        self
    }

    /// Fail details for `place_id` with `error`.
    #[must_use]
    pub fn with_details_error(mut self, place_id: &str, error: PlacesError) -> Self {
        self.details.insert(
            place_id.to_owned(),
            StubReply {
                result: Err(error),
                delay: Duration::ZERO,
            },
        );
        self
    }

    /// Resolve `reference` to `url` once `delay` has elapsed.
    #[must_use]
    pub fn with_photo_after(mut self, reference: &str, url: &str, delay: Duration) -> Self {
        self.photos.insert(
            reference.to_owned(),
            StubReply {
                result: Ok(url.to_owned()),
                delay,
            },
        );
        self
    }

    /// Every call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.borrow().clone()
    }

    /// Queries passed to `autocomplete`, in order.
    #[must_use]
    pub fn autocomplete_queries(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                StubCall::Autocomplete(query) => Some(query.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: StubCall) {
        self.calls.borrow_mut().push(call);
    }
}

#[async_trait(?Send)]
impl PlacesProvider for StubPlacesProvider {
    async fn autocomplete(&self, query: &str) -> Result<Vec<PlaceCandidate>, PlacesError> {
        self.record(StubCall::Autocomplete(query.to_owned()));
        match self.autocomplete.get(query) {
            Some(reply) => reply.deliver().await,
            None => Ok(Vec::new()),
        }
    }

    async fn details(&self, place_id: &str) -> Result<PlaceDetail, PlacesError> {
        self.record(StubCall::Details(place_id.to_owned()));
        match self.details.get(place_id) {
            Some(reply) => reply.deliver().await,
            None => Err(PlacesError::NotFound {
                place_id: place_id.to_owned(),
            }),
        }
    }

    async fn resolve_photo_url(&self, reference: &str) -> Result<String, PlacesError> {
        self.record(StubCall::Photo(reference.to_owned()));
        match self.photos.get(reference) {
            Some(reply) => reply.deliver().await,
            None => Err(PlacesError::PhotoUnavailable),
        }
    }
}
