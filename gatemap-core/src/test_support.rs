//! Test-only, in-memory implementations of the core service traits used by
//! unit and behaviour tests.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use async_trait::async_trait;

use crate::recency::push_unique;
use crate::{
    Coordinate, LocationError, PlaceCandidate, PositionOptions, PositionProvider, RecencyError,
    RecencyStore,
};

/// In-memory `RecencyStore` with the same semantics as the persisted store.
#[derive(Debug, Default)]
pub struct MemoryRecencyStore {
    entries: RefCell<Vec<PlaceCandidate>>,
    capacity: Option<usize>,
    fail_writes: Cell<bool>,
}

impl MemoryRecencyStore {
    /// Create a store pre-populated with `entries`, deduplicated in order.
    pub fn with_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = PlaceCandidate>,
    {
        let store = Self::default();
        for entry in entries {
            push_unique(&mut store.entries.borrow_mut(), &entry, None);
        }
        store
    }

    /// Bound the store to `capacity` entries.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Make every subsequent write fail with [`RecencyError::Storage`].
    pub fn fail_writes(&self) {
        self.fail_writes.set(true);
    }

    fn check_writable(&self, operation: &'static str) -> Result<(), RecencyError> {
        if self.fail_writes.get() {
            return Err(RecencyError::Storage {
                operation,
                source: "storage is read-only".into(),
            });
        }
        Ok(())
    }
}

impl RecencyStore for MemoryRecencyStore {
    fn insert(&self, candidate: &PlaceCandidate) -> Result<bool, RecencyError> {
        self.check_writable("insert")?;
        Ok(push_unique(
            &mut self.entries.borrow_mut(),
            candidate,
            self.capacity,
        ))
    }

    fn list(&self) -> Result<Vec<PlaceCandidate>, RecencyError> {
        Ok(self.entries.borrow().clone())
    }

    fn clear(&self) -> Result<(), RecencyError> {
        self.check_writable("clear")?;
        self.entries.borrow_mut().clear();
        Ok(())
    }
}

/// Deterministic `PositionProvider` replaying scripted fixes.
///
/// Fixes are returned in the order they were queued; once the queue is
/// exhausted, requests fail with [`LocationError::PositionUnavailable`].
#[derive(Debug)]
pub struct ScriptedPositionProvider {
    authorization: Result<(), LocationError>,
    fixes: RefCell<VecDeque<Result<Coordinate, LocationError>>>,
    observing: Cell<bool>,
    stop_calls: Cell<usize>,
    position_requests: Cell<usize>,
    last_options: Cell<Option<PositionOptions>>,
}

impl ScriptedPositionProvider {
    fn with_authorization(authorization: Result<(), LocationError>) -> Self {
        Self {
            authorization,
            fixes: RefCell::new(VecDeque::new()),
            observing: Cell::new(false),
            stop_calls: Cell::new(0),
            position_requests: Cell::new(0),
            last_options: Cell::new(None),
        }
    }

    /// A provider whose permission prompt is accepted.
    #[must_use]
    pub fn granted() -> Self {
        Self::with_authorization(Ok(()))
    }

    /// A provider whose permission prompt is declined.
    #[must_use]
    pub fn denied() -> Self {
        Self::with_authorization(Err(LocationError::PermissionDenied))
    }

    /// A provider that cannot ask for permission at all.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::with_authorization(Err(LocationError::PermissionUnavailable))
    }

    /// Queue a successful fix.
    #[must_use]
    pub fn with_fix(self, coordinate: Coordinate) -> Self {
        self.fixes.borrow_mut().push_back(Ok(coordinate));
        self
    }

    /// Queue a failed fix.
    #[must_use]
    pub fn with_failure(self, error: LocationError) -> Self {
        self.fixes.borrow_mut().push_back(Err(error));
        self
    }

    /// Whether observation is currently active.
    #[must_use]
    pub fn is_observing(&self) -> bool {
        self.observing.get()
    }

    /// Number of times observation was stopped.
    #[must_use]
    pub fn stop_calls(&self) -> usize {
        self.stop_calls.get()
    }

    /// Number of one-shot position requests served.
    #[must_use]
    pub fn position_requests(&self) -> usize {
        self.position_requests.get()
    }

    /// Options passed to the most recent position request.
    #[must_use]
    pub fn last_options(&self) -> Option<PositionOptions> {
        self.last_options.get()
    }
}

#[async_trait(?Send)]
impl PositionProvider for ScriptedPositionProvider {
    async fn request_authorization(&self) -> Result<(), LocationError> {
        self.authorization.clone()
    }

    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> Result<Coordinate, LocationError> {
        self.authorization.clone()?;
        self.position_requests.set(self.position_requests.get() + 1);
        self.last_options.set(Some(options));
        self.fixes
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| {
                Err(LocationError::PositionUnavailable {
                    message: "no scripted fix left".to_owned(),
                })
            })
    }

    fn start_observing(&self) -> Result<(), LocationError> {
        self.authorization.clone()?;
        self.observing.set(true);
        Ok(())
    }

    fn stop_observing(&self) {
        if self.observing.replace(false) {
            self.stop_calls.set(self.stop_calls.get() + 1);
        }
    }
}
