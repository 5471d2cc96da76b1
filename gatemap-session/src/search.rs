//! State machine behind the search overlay.
//!
//! A [`SearchSessionController`] lives exactly as long as the overlay is
//! open. Every text change resets the listed candidates; queries shorter
//! than [`MIN_QUERY_CHARS`] characters never reach the provider. Query
//! responses and selections each carry their own [`RequestToken`], so only
//! the latest of each may change state.

use std::cell::RefCell;
use std::rc::Rc;

use gatemap_core::{
    PlaceCandidate, PlaceDetail, PlacesError, PlacesProvider, RecencyError, RecencyStore, Region,
};
use log::{debug, error, warn};

use crate::sequence::{RequestSequence, RequestToken, Resolution};

/// Shortest query, in characters, that is sent to the provider.
pub const MIN_QUERY_CHARS: usize = 4;

/// Progress of the current query or selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchStatus {
    /// No request outstanding; the query is too short or empty.
    #[default]
    Idle,
    /// A request is outstanding.
    Loading,
    /// The latest request succeeded.
    Ready,
    /// The latest request failed.
    Error(PlacesError),
}

/// What happened to a query-text change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The text was too short; no request was made.
    Gated,
    /// The response was current and is now reflected in the status.
    Applied,
    /// A later change superseded the request.
    Discarded,
}

/// Entries to render under the search field.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    /// The query is empty, so the recent places are shown.
    Recent(Vec<PlaceCandidate>),
    /// Candidates returned for the current query.
    Live(Vec<PlaceCandidate>),
}

impl Listing {
    /// The entries regardless of their source.
    #[must_use]
    pub fn entries(&self) -> &[PlaceCandidate] {
        match self {
            Self::Recent(entries) | Self::Live(entries) => entries,
        }
    }
}

/// A resolved selection, ready to be applied to the map.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceChosen {
    /// Session that produced the selection.
    pub session: RequestToken,
    /// The candidate the user picked.
    pub candidate: PlaceCandidate,
    /// Details fetched for the candidate.
    pub detail: PlaceDetail,
    /// Viewport centred on the place.
    pub region: Region,
}

/// Controller for one open search overlay.
pub struct SearchSessionController {
    places: Rc<dyn PlacesProvider>,
    recents: Rc<dyn RecencyStore>,
    session: RequestToken,
    min_query_chars: usize,
    query: RefCell<String>,
    candidates: RefCell<Vec<PlaceCandidate>>,
    status: RefCell<SearchStatus>,
    queries: RequestSequence,
    selections: RequestSequence,
}

impl std::fmt::Debug for SearchSessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSessionController")
            .field("session", &self.session)
            .field("query", &self.query)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}

impl SearchSessionController {
    /// Open a standalone session.
    ///
    /// Its selections are never accepted by
    /// [`MapInteractionController::apply_place_chosen`](crate::MapInteractionController::apply_place_chosen);
    /// sessions opened through
    /// [`MapInteractionController::open_search`](crate::MapInteractionController::open_search)
    /// carry the map's session token instead.
    pub fn new(places: Rc<dyn PlacesProvider>, recents: Rc<dyn RecencyStore>) -> Self {
        Self::for_session(places, recents, RequestToken::DETACHED)
    }

    pub(crate) fn for_session(
        places: Rc<dyn PlacesProvider>,
        recents: Rc<dyn RecencyStore>,
        session: RequestToken,
    ) -> Self {
        Self {
            places,
            recents,
            session,
            min_query_chars: MIN_QUERY_CHARS,
            query: RefCell::new(String::new()),
            candidates: RefCell::new(Vec::new()),
            status: RefCell::new(SearchStatus::Idle),
            queries: RequestSequence::new(),
            selections: RequestSequence::new(),
        }
    }

    /// Override the minimum query length.
    #[must_use]
    pub const fn with_min_query_chars(mut self, min_query_chars: usize) -> Self {
        self.min_query_chars = min_query_chars;
        self
    }

    /// Token identifying this session.
    #[must_use]
    pub const fn session(&self) -> RequestToken {
        self.session
    }

    /// Current query text.
    #[must_use]
    pub fn query(&self) -> String {
        self.query.borrow().clone()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> SearchStatus {
        self.status.borrow().clone()
    }

    /// Candidates returned for the current query.
    #[must_use]
    pub fn candidates(&self) -> Vec<PlaceCandidate> {
        self.candidates.borrow().clone()
    }

    /// Entries to show: recent places for an empty query, live candidates
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`RecencyError`] when the recent places cannot be read.
    pub fn listing(&self) -> Result<Listing, RecencyError> {
        if self.query.borrow().is_empty() {
            return self.recents.list().map(Listing::Recent);
        }
        Ok(Listing::Live(self.candidates()))
    }

    /// Apply a change of the query text.
    ///
    /// Candidates are cleared and any pending query or selection is
    /// superseded. Text shorter than the minimum leaves the session `Idle`
    /// without contacting the provider; anything longer is sent to
    /// autocomplete, and the response is applied only if no later change has
    /// happened meanwhile. Provider failures surface as
    /// [`SearchStatus::Error`].
    pub async fn update_query(&self, text: &str) -> QueryOutcome {
        self.selections.invalidate();
        text.clone_into(&mut self.query.borrow_mut());
        self.candidates.borrow_mut().clear();

        if text.chars().count() < self.min_query_chars {
            self.queries.invalidate();
            self.set_status(SearchStatus::Idle);
            return QueryOutcome::Gated;
        }

        let token = self.queries.issue();
        self.set_status(SearchStatus::Loading);
        let response = self.places.autocomplete(text).await;

        if !self.queries.is_current(token) {
            debug!(
                "discarding stale autocomplete response for {text:?} (token {})",
                token.value()
            );
            return QueryOutcome::Discarded;
        }

        match response {
            Ok(candidates) => {
                *self.candidates.borrow_mut() = candidates;
                self.set_status(SearchStatus::Ready);
            }
            Err(err) => {
                warn!("autocomplete for {text:?} failed: {err}");
                self.set_status(SearchStatus::Error(err));
            }
        }
        QueryOutcome::Applied
    }

    /// Choose `candidate`.
    ///
    /// The candidate is remembered in the recent places first; a storage
    /// failure is logged and does not stop the selection. Details are then
    /// fetched and, if no later selection or text change happened meanwhile,
    /// returned as a [`PlaceChosen`] centred on the place.
    ///
    /// # Errors
    ///
    /// Returns the provider error when the details request fails; the
    /// session status becomes [`SearchStatus::Error`]. Nothing is retried.
    pub async fn select(
        &self,
        candidate: &PlaceCandidate,
    ) -> Result<Resolution<PlaceChosen>, PlacesError> {
        let token = self.selections.issue();
        self.queries.invalidate();

        if let Err(err) = self.recents.insert(candidate) {
            error!(
                "failed to remember place {}: {err}",
                candidate.place_id()
            );
        }

        self.set_status(SearchStatus::Loading);
        let response = self.places.details(candidate.place_id()).await;

        if !self.selections.is_current(token) {
            debug!(
                "discarding stale details for {} (token {})",
                candidate.place_id(),
                token.value()
            );
            return Ok(Resolution::Discarded);
        }

        match response {
            Ok(detail) => {
                self.set_status(SearchStatus::Ready);
                Ok(Resolution::Applied(PlaceChosen {
                    session: self.session,
                    candidate: candidate.clone(),
                    region: Region::centered_on(detail.coordinate),
                    detail,
                }))
            }
            Err(err) => {
                warn!("details for {} failed: {err}", candidate.place_id());
                self.set_status(SearchStatus::Error(err.clone()));
                Err(err)
            }
        }
    }

    fn set_status(&self, status: SearchStatus) {
        *self.status.borrow_mut() = status;
    }
}

#[cfg(test)]
mod tests {
    #![expect(clippy::expect_used, reason = "tests assert on known-good fixtures")]

    use super::*;
    use gatemap_core::Coordinate;
    use gatemap_core::test_support::MemoryRecencyStore;
    use gatemap_data::places::test_support::{StubCall, StubPlacesProvider};
    use proptest::prelude::*;
    use rstest::rstest;
    use std::time::Duration;
    use tokio::task::LocalSet;

    fn starbucks() -> PlaceCandidate {
        PlaceCandidate::new("p1", "Starbucks, Main St")
    }

    fn starbucks_detail() -> PlaceDetail {
        let coordinate = Coordinate::new(32.07, 34.78).expect("valid coordinate");
        PlaceDetail::new("p1", "Starbucks", "Main St", coordinate)
    }

    fn session(
        places: &Rc<StubPlacesProvider>,
        recents: &Rc<MemoryRecencyStore>,
    ) -> SearchSessionController {
        SearchSessionController::new(places.clone(), recents.clone())
    }

    #[rstest]
    #[tokio::test]
    async fn short_query_never_reaches_provider() {
        let places = Rc::new(StubPlacesProvider::new());
        let recents = Rc::new(MemoryRecencyStore::default());
        let search = session(&places, &recents);

        assert_eq!(search.update_query("Sta").await, QueryOutcome::Gated);

        assert!(places.calls().is_empty());
        assert_eq!(search.status(), SearchStatus::Idle);
        assert_eq!(search.query(), "Sta");
    }

    #[rstest]
    #[tokio::test]
    async fn four_characters_issue_one_request_then_select() {
        let places = Rc::new(
            StubPlacesProvider::new()
                .with_candidates("Star", vec![starbucks()])
                .with_detail(starbucks_detail()),
        );
        let recents = Rc::new(MemoryRecencyStore::default());
        let search = session(&places, &recents);

        search.update_query("Sta").await;
        assert_eq!(search.update_query("Star").await, QueryOutcome::Applied);
        assert_eq!(places.autocomplete_queries(), vec!["Star".to_owned()]);
        assert_eq!(search.candidates(), vec![starbucks()]);
        assert_eq!(search.status(), SearchStatus::Ready);

        let chosen = search
            .select(&starbucks())
            .await
            .expect("details should resolve")
            .applied()
            .expect("selection should be current");

        assert_eq!(recents.list().expect("list"), vec![starbucks()]);
        assert_eq!(chosen.region.center(), starbucks_detail().coordinate);
        assert_eq!(chosen.session, search.session());
        assert_eq!(
            places.calls().last(),
            Some(&StubCall::Details("p1".to_owned()))
        );
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn later_query_wins_when_earlier_reply_arrives_last() {
        let places = Rc::new(
            StubPlacesProvider::new()
                .with_candidates_after(
                    "Coffee",
                    vec![PlaceCandidate::new("c1", "Coffee Bean")],
                    Duration::from_millis(300),
                )
                .with_candidates_after(
                    "Coffee Shop",
                    vec![PlaceCandidate::new("c2", "Coffee Shop on Dizengoff")],
                    Duration::from_millis(50),
                ),
        );
        let recents = Rc::new(MemoryRecencyStore::default());
        let search = session(&places, &recents);

        let (first, second) = tokio::join!(
            search.update_query("Coffee"),
            search.update_query("Coffee Shop")
        );

        assert_eq!(first, QueryOutcome::Discarded);
        assert_eq!(second, QueryOutcome::Applied);
        assert_eq!(search.status(), SearchStatus::Ready);
        let ids: Vec<String> = search
            .candidates()
            .iter()
            .map(|candidate| candidate.place_id().to_owned())
            .collect();
        assert_eq!(ids, vec!["c2"]);
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn shortening_query_drops_pending_response() {
        let places = Rc::new(StubPlacesProvider::new().with_candidates_after(
            "Coffee",
            vec![PlaceCandidate::new("c1", "Coffee Bean")],
            Duration::from_millis(100),
        ));
        let recents = Rc::new(MemoryRecencyStore::default());
        let search = session(&places, &recents);

        let clear_text = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            search.update_query("").await
        };
        let (first, cleared) = tokio::join!(search.update_query("Coffee"), clear_text);

        assert_eq!(first, QueryOutcome::Discarded);
        assert_eq!(cleared, QueryOutcome::Gated);
        assert_eq!(search.status(), SearchStatus::Idle);
        assert!(search.candidates().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn provider_failure_becomes_error_status() {
        let failure = PlacesError::Provider {
            code: "OVER_QUERY_LIMIT".to_owned(),
            message: String::new(),
        };
        let places =
            Rc::new(StubPlacesProvider::new().with_autocomplete_error("Cafe", failure.clone()));
        let recents = Rc::new(MemoryRecencyStore::default());
        let search = session(&places, &recents);

        assert_eq!(search.update_query("Cafe").await, QueryOutcome::Applied);
        assert_eq!(search.status(), SearchStatus::Error(failure));
    }

    #[rstest]
    #[tokio::test]
    async fn empty_query_lists_recent_places() {
        let places = Rc::new(StubPlacesProvider::new().with_candidates("Star", vec![starbucks()]));
        let recents = Rc::new(MemoryRecencyStore::with_entries([PlaceCandidate::new(
            "r1", "Bakery",
        )]));
        let search = session(&places, &recents);

        let initial = search.listing().expect("listing");
        assert!(matches!(initial, Listing::Recent(ref entries) if entries.len() == 1));

        search.update_query("Star").await;
        assert_eq!(
            search.listing().expect("listing"),
            Listing::Live(vec![starbucks()])
        );
    }

    #[rstest]
    #[tokio::test]
    async fn details_failure_sets_error_but_keeps_recent_entry() {
        let places = Rc::new(StubPlacesProvider::new());
        let recents = Rc::new(MemoryRecencyStore::default());
        let search = session(&places, &recents);

        let err = search
            .select(&starbucks())
            .await
            .expect_err("unknown place should fail");

        assert!(matches!(err, PlacesError::NotFound { .. }));
        assert!(matches!(search.status(), SearchStatus::Error(_)));
        assert_eq!(recents.list().expect("list").len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn recency_write_failure_does_not_block_selection() {
        let places = Rc::new(StubPlacesProvider::new().with_detail(starbucks_detail()));
        let recents = Rc::new(MemoryRecencyStore::default());
        recents.fail_writes();
        let search = session(&places, &recents);

        let resolution = search.select(&starbucks()).await.expect("details");

        assert!(resolution.is_applied());
        assert!(recents.list().expect("list").is_empty());
    }

    #[rstest]
    #[tokio::test(start_paused = true)]
    async fn keystroke_supersedes_pending_selection() {
        let places = Rc::new(
            StubPlacesProvider::new()
                .with_detail_after(starbucks_detail(), Duration::from_millis(100)),
        );
        let recents = Rc::new(MemoryRecencyStore::default());
        let search = session(&places, &recents);

        let type_more = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            search.update_query("St").await
        };
        let chosen = starbucks();
        let (selection, _) = tokio::join!(search.select(&chosen), type_more);

        assert_eq!(selection, Ok(Resolution::Discarded));
        assert_eq!(search.status(), SearchStatus::Idle);
    }

    proptest! {
        #[test]
        fn queries_below_minimum_make_no_calls(text in "\\PC{0,3}") {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .expect("runtime");
            let places = Rc::new(StubPlacesProvider::new());
            let recents = Rc::new(MemoryRecencyStore::default());
            let search = session(&places, &recents);

            let outcome = runtime.block_on(search.update_query(&text));

            prop_assert_eq!(outcome, QueryOutcome::Gated);
            prop_assert!(places.calls().is_empty());
            prop_assert_eq!(search.status(), SearchStatus::Idle);
        }
    }

    /// Type each text after its gap without waiting for earlier replies,
    /// then collect every outcome.
    async fn type_queries(
        search: Rc<SearchSessionController>,
        typed: Vec<(String, u64)>,
    ) -> Vec<QueryOutcome> {
        let mut pending = Vec::new();
        for (text, gap) in typed {
            tokio::time::sleep(Duration::from_millis(gap)).await;
            let typing = Rc::clone(&search);
            pending.push(tokio::task::spawn_local(async move {
                typing.update_query(&text).await
            }));
            tokio::task::yield_now().await;
        }
        let mut outcomes = Vec::new();
        for handle in pending {
            outcomes.push(handle.await.expect("query task"));
        }
        outcomes
    }

    proptest! {
        #[test]
        fn last_text_typed_wins_whatever_the_reply_order(
            replies in proptest::collection::vec((0..300_u64, 0..100_u64), 1..6),
            trailing in proptest::option::of(prop_oneof![Just(""), Just("Caf")]),
        ) {
            let mut places = StubPlacesProvider::new();
            let mut typed = Vec::new();
            for (index, (delay, gap)) in replies.iter().enumerate() {
                let text = format!("Cafe {index}");
                places = places.with_candidates_after(
                    &text,
                    vec![PlaceCandidate::new(format!("c{index}"), text.clone())],
                    Duration::from_millis(*delay),
                );
                typed.push((text, *gap));
            }
            if let Some(short) = trailing {
                typed.push((short.to_owned(), 10));
            }
            let last_text = typed.last().map(|(text, _)| text.clone()).unwrap_or_default();
            let search = Rc::new(SearchSessionController::new(
                Rc::new(places),
                Rc::new(MemoryRecencyStore::default()),
            ));
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .start_paused(true)
                .build()
                .expect("runtime");

            let outcomes = runtime.block_on(
                LocalSet::new().run_until(type_queries(Rc::clone(&search), typed)),
            );

            prop_assert_eq!(search.query(), last_text);
            if trailing.is_some() {
                prop_assert_eq!(outcomes.last(), Some(&QueryOutcome::Gated));
                prop_assert_eq!(search.status(), SearchStatus::Idle);
                prop_assert!(search.candidates().is_empty());
            } else {
                let ids: Vec<String> = search
                    .candidates()
                    .iter()
                    .map(|candidate| candidate.place_id().to_owned())
                    .collect();
                prop_assert_eq!(outcomes.last(), Some(&QueryOutcome::Applied));
                prop_assert_eq!(search.status(), SearchStatus::Ready);
                prop_assert_eq!(ids, vec![format!("c{}", replies.len() - 1)]);
            }
        }
    }
}
