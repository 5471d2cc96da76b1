//! Behavioural tests for the search overlay driven through the map.

use gatemap_core::test_support::{MemoryRecencyStore, ScriptedPositionProvider};
use gatemap_core::{Coordinate, GateMarker, PlaceCandidate, PlaceDetail, RecencyStore, Region};
use gatemap_data::places::test_support::StubPlacesProvider;
use gatemap_session::{
    Listing, MapInteractionController, Overlay, SearchSessionController, SearchStatus,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tokio::runtime::Runtime;

const SLOW: Duration = Duration::from_millis(400);
const FAST: Duration = Duration::from_millis(40);

struct SearchWorld {
    runtime: Runtime,
    provider: Option<StubPlacesProvider>,
    stub: Option<Rc<StubPlacesProvider>>,
    recents: Rc<MemoryRecencyStore>,
    map: Option<MapInteractionController>,
    session: Option<SearchSessionController>,
}

impl SearchWorld {
    fn configure(&mut self, apply: impl FnOnce(StubPlacesProvider) -> StubPlacesProvider) {
        let provider = self.provider.take().unwrap_or_default();
        self.provider = Some(apply(provider));
    }

    /// Build the map on first use and open a search session.
    fn session(&mut self) -> &SearchSessionController {
        if self.session.is_none() {
            let stub = Rc::new(self.provider.take().unwrap_or_default());
            let home = Region::centered_on(place_coordinate());
            let map = MapInteractionController::new(
                stub.clone(),
                self.recents.clone(),
                Rc::new(ScriptedPositionProvider::granted()),
                vec![GateMarker::new("gate-a", place_coordinate())],
                home,
            );
            self.session = Some(map.open_search());
            self.map = Some(map);
            self.stub = Some(stub);
        }
        self.session.as_ref().expect("session was just opened")
    }

    fn stub(&self) -> &StubPlacesProvider {
        self.stub.as_deref().expect("provider must be in use")
    }

    fn map(&self) -> &MapInteractionController {
        self.map.as_ref().expect("map must be built")
    }
}

fn place_coordinate() -> Coordinate {
    Coordinate::new(32.0711, 34.7873).expect("valid coordinate")
}

fn detail_for(place_id: &str) -> PlaceDetail {
    PlaceDetail::new(place_id, "Starbucks", "Main St", place_coordinate())
}

fn ids(entries: &[PlaceCandidate]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| entry.place_id().to_owned())
        .collect()
}

#[fixture]
fn world() -> RefCell<SearchWorld> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("runtime");
    RefCell::new(SearchWorld {
        runtime,
        provider: None,
        stub: None,
        recents: Rc::new(MemoryRecencyStore::default()),
        map: None,
        session: None,
    })
}

// --- Given steps ---

#[given("a places provider that knows \"{query}\" as \"{place_id}\" described as \"{description}\"")]
fn provider_knows(
    #[from(world)] world: &RefCell<SearchWorld>,
    query: String,
    place_id: String,
    description: String,
) {
    world.borrow_mut().configure(|provider| {
        provider
            .with_candidates(&query, vec![PlaceCandidate::new(place_id.clone(), description)])
            .with_detail(detail_for(&place_id))
    });
}

#[given("a places provider that answers \"{query}\" slowly with \"{place_id}\"")]
fn provider_slow(#[from(world)] world: &RefCell<SearchWorld>, query: String, place_id: String) {
    world.borrow_mut().configure(|provider| {
        provider.with_candidates_after(&query, vec![PlaceCandidate::new(place_id, "slow")], SLOW)
    });
}

#[given("the provider answers \"{query}\" quickly with \"{place_id}\"")]
fn provider_fast(#[from(world)] world: &RefCell<SearchWorld>, query: String, place_id: String) {
    world.borrow_mut().configure(|provider| {
        provider.with_candidates_after(&query, vec![PlaceCandidate::new(place_id, "fast")], FAST)
    });
}

#[given("the recent places already contain \"{place_id}\"")]
fn recent_places_contain(#[from(world)] world: &RefCell<SearchWorld>, place_id: String) {
    world
        .borrow()
        .recents
        .insert(&PlaceCandidate::new(place_id, "remembered"))
        .expect("insert");
}

// --- When steps ---

fn type_text(world: &RefCell<SearchWorld>, text: &str) {
    let mut world = world.borrow_mut();
    world.session();
    let world = &*world;
    let session = world.session.as_ref().expect("session");
    world.runtime.block_on(session.update_query(text));
}

#[when("the user types \"{text}\"")]
fn user_types(#[from(world)] world: &RefCell<SearchWorld>, text: String) {
    type_text(world, &text);
}

#[when("the user clears the search text")]
fn user_clears(#[from(world)] world: &RefCell<SearchWorld>) {
    type_text(world, "");
}

#[when("the user types \"{first}\" and then \"{second}\" before the first reply")]
fn user_types_quickly(
    #[from(world)] world: &RefCell<SearchWorld>,
    first: String,
    second: String,
) {
    let mut world = world.borrow_mut();
    world.session();
    let world = &*world;
    let session = world.session.as_ref().expect("session");
    world.runtime.block_on(async {
        tokio::join!(session.update_query(&first), session.update_query(&second))
    });
}

#[when("the user chooses candidate \"{place_id}\"")]
fn user_chooses(#[from(world)] world: &RefCell<SearchWorld>, place_id: String) {
    let world = world.borrow();
    let session = world.session.as_ref().expect("session");
    let candidate = session
        .candidates()
        .into_iter()
        .find(|candidate| candidate.place_id() == place_id)
        .expect("candidate should be listed");
    let chosen = world
        .runtime
        .block_on(session.select(&candidate))
        .expect("details should resolve")
        .applied()
        .expect("selection should be current");
    assert!(world.map().apply_place_chosen(&chosen).is_applied());
}

// --- Then steps ---

#[then("no autocomplete request has been made")]
fn no_request(#[from(world)] world: &RefCell<SearchWorld>) {
    assert!(world.borrow().stub().autocomplete_queries().is_empty());
}

#[then("exactly one autocomplete request for \"{query}\" has been made")]
fn one_request(#[from(world)] world: &RefCell<SearchWorld>, query: String) {
    assert_eq!(world.borrow().stub().autocomplete_queries(), vec![query]);
}

#[then("the search is idle")]
fn search_idle(#[from(world)] world: &RefCell<SearchWorld>) {
    let world = world.borrow();
    let session = world.session.as_ref().expect("session");
    assert_eq!(session.status(), SearchStatus::Idle);
}

#[then("the search is ready")]
fn search_ready(#[from(world)] world: &RefCell<SearchWorld>) {
    let world = world.borrow();
    let session = world.session.as_ref().expect("session");
    assert_eq!(session.status(), SearchStatus::Ready);
}

#[then("the listed candidates are \"{expected}\"")]
fn listed_candidates(#[from(world)] world: &RefCell<SearchWorld>, expected: String) {
    let world = world.borrow();
    let session = world.session.as_ref().expect("session");
    assert_eq!(ids(&session.candidates()), vec![expected]);
}

#[then("the recent places are \"{expected}\"")]
fn recent_places(#[from(world)] world: &RefCell<SearchWorld>, expected: String) {
    let world = world.borrow();
    assert_eq!(ids(&world.recents.list().expect("list")), vec![expected]);
}

#[then("the camera heads to the place's coordinate")]
fn camera_heads_to_place(#[from(world)] world: &RefCell<SearchWorld>) {
    let world = world.borrow();
    let animation = world
        .map()
        .camera()
        .animation()
        .expect("camera should be moving");
    assert_eq!(animation.target.center(), place_coordinate());
}

#[then("the search overlay is closed")]
fn search_closed(#[from(world)] world: &RefCell<SearchWorld>) {
    assert_eq!(world.borrow().map().overlay(), Overlay::None);
}

#[then("the listing shows recent places \"{expected}\"")]
fn listing_shows_recent(#[from(world)] world: &RefCell<SearchWorld>, expected: String) {
    let world = world.borrow();
    let session = world.session.as_ref().expect("session");
    match session.listing().expect("listing") {
        Listing::Recent(entries) => assert_eq!(ids(&entries), vec![expected]),
        Listing::Live(entries) => panic!("expected recent places, got {entries:?}"),
    }
}

// --- Scenario registrations ---

macro_rules! register_scenario {
    ($fn_name:ident, $title:literal) => {
        #[scenario(path = "tests/features/search_session.feature", name = $title)]
        fn $fn_name(world: RefCell<SearchWorld>) {
            let _ = world;
        }
    };
}

register_scenario!(
    short_queries_stay_local,
    "short queries stay local until the fourth character"
);
register_scenario!(
    choosing_candidate,
    "choosing a candidate remembers it and centres the map"
);
register_scenario!(
    slow_reply_ignored,
    "a slow reply for an older query is ignored"
);
register_scenario!(
    empty_query_lists_recent,
    "an empty query lists the recent places"
);
