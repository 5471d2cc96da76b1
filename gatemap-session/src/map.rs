//! Camera, gate markers and the overlay above the map.
//!
//! The overlay is a single [`Overlay`] value, so the search overlay and the
//! marker detail overlay can never be open together. Camera moves are
//! modelled as [`CameraAnimation`]s; starting a new one preempts whatever
//! animation was in flight, and the renderer reports completion through
//! [`MapInteractionController::finish_animation`].

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gatemap_core::{
    Coordinate, GateMarker, LocationError, ObservationGuard, PlaceDetail, PlacesError,
    PlacesProvider, PositionOptions, PositionProvider, RecencyStore, Region, RegionError,
    observe,
};
use log::{debug, warn};
use thiserror::Error;

use crate::search::{PlaceChosen, SearchSessionController};
use crate::sequence::{RequestSequence, RequestToken, Resolution};

/// Default duration of a camera animation.
pub const DEFAULT_ANIMATION_DURATION: Duration = Duration::from_millis(2_000);

/// Errors raised by marker interactions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    /// No gate marker has the tapped identifier.
    #[error("no gate marker with place id {place_id}")]
    UnknownMarker {
        /// Identifier that was tapped.
        place_id: String,
    },
    /// The places provider failed.
    #[error(transparent)]
    Places(#[from] PlacesError),
}

/// Tunables for [`MapInteractionController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapSettings {
    /// Duration of every camera animation.
    pub animation_duration: Duration,
    /// Options for one-shot position requests.
    pub position_options: PositionOptions,
    /// Span, in degrees, of regions centred on a position update.
    pub region_delta: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            animation_duration: DEFAULT_ANIMATION_DURATION,
            position_options: PositionOptions::default(),
            region_delta: gatemap_core::DEFAULT_REGION_DELTA,
        }
    }
}

/// A camera move that has started but not yet finished.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraAnimation {
    /// Region the camera is moving to.
    pub target: Region,
    /// How long the move takes.
    pub duration: Duration,
    /// Identifies this animation for [`MapInteractionController::finish_animation`].
    pub token: RequestToken,
}

/// Camera state: where it rests and where it is heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    region: Region,
    animation: Option<CameraAnimation>,
}

impl Camera {
    /// Region the camera last settled on.
    #[must_use]
    pub const fn region(&self) -> Region {
        self.region
    }

    /// The animation in flight, if any.
    #[must_use]
    pub const fn animation(&self) -> Option<CameraAnimation> {
        self.animation
    }

    /// Region the camera shows once any animation completes.
    #[must_use]
    pub const fn destination(&self) -> Region {
        match self.animation {
            Some(animation) => animation.target,
            None => self.region,
        }
    }
}

/// Progress of one asynchronously loaded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    /// The request is outstanding; render a placeholder.
    Loading,
    /// The value arrived.
    Ready(T),
    /// There is nothing to load.
    Missing,
    /// The request failed.
    Failed(PlacesError),
}

/// Content of the marker detail overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView {
    /// The tapped marker.
    pub marker: GateMarker,
    /// Token of the tap that opened the overlay.
    pub token: RequestToken,
    /// Place details for the marker.
    pub detail: Loadable<PlaceDetail>,
    /// Resolved photo URL.
    pub photo_url: Loadable<String>,
}

/// What is drawn above the map.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Nothing.
    None,
    /// The search overlay for the given session.
    Search {
        /// Session shown in the overlay.
        session: RequestToken,
    },
    /// Details of a tapped marker.
    Detail(DetailView),
}

/// Coordinates the camera, the static markers and the overlay.
pub struct MapInteractionController {
    places: Rc<dyn PlacesProvider>,
    recents: Rc<dyn RecencyStore>,
    position: Rc<dyn PositionProvider>,
    markers: Vec<GateMarker>,
    settings: MapSettings,
    zoom: Region,
    camera: RefCell<Camera>,
    overlay: RefCell<Overlay>,
    sessions: RequestSequence,
    details: RequestSequence,
    locates: RequestSequence,
    animations: RequestSequence,
}

impl std::fmt::Debug for MapInteractionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapInteractionController")
            .field("markers", &self.markers.len())
            .field("settings", &self.settings)
            .field("camera", &self.camera)
            .field("overlay", &self.overlay)
            .finish_non_exhaustive()
    }
}

impl MapInteractionController {
    /// Create a controller resting on `initial` with no overlay.
    pub fn new(
        places: Rc<dyn PlacesProvider>,
        recents: Rc<dyn RecencyStore>,
        position: Rc<dyn PositionProvider>,
        markers: Vec<GateMarker>,
        initial: Region,
    ) -> Self {
        Self {
            places,
            recents,
            position,
            markers,
            settings: MapSettings::default(),
            zoom: Region::centered_on(initial.center()),
            camera: RefCell::new(Camera {
                region: initial,
                animation: None,
            }),
            overlay: RefCell::new(Overlay::None),
            sessions: RequestSequence::new(),
            details: RequestSequence::new(),
            locates: RequestSequence::new(),
            animations: RequestSequence::new(),
        }
    }

    /// Replace the default settings.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError`] when `settings.region_delta` is not a valid
    /// span.
    pub fn with_settings(mut self, settings: MapSettings) -> Result<Self, RegionError> {
        self.zoom = Region::new(
            self.zoom.center(),
            settings.region_delta,
            settings.region_delta,
        )?;
        self.settings = settings;
        Ok(self)
    }

    /// Current camera state.
    #[must_use]
    pub fn camera(&self) -> Camera {
        *self.camera.borrow()
    }

    /// Current overlay.
    #[must_use]
    pub fn overlay(&self) -> Overlay {
        self.overlay.borrow().clone()
    }

    /// Every configured marker.
    #[must_use]
    pub fn markers(&self) -> &[GateMarker] {
        &self.markers
    }

    /// Markers inside the region the camera is showing or heading to.
    #[must_use]
    pub fn visible_markers(&self) -> Vec<&GateMarker> {
        let viewport = self.camera.borrow().destination();
        self.markers
            .iter()
            .filter(|marker| viewport.contains(marker.coordinate))
            .collect()
    }

    /// Open the search overlay, replacing any detail overlay.
    pub fn open_search(&self) -> SearchSessionController {
        let session = self.sessions.issue();
        self.details.invalidate();
        self.set_overlay(Overlay::Search { session });
        debug!("opened search session {}", session.value());
        SearchSessionController::for_session(self.places.clone(), self.recents.clone(), session)
    }

    /// Close the search overlay showing `session`, discarding the session.
    ///
    /// Does nothing if another overlay has replaced it.
    pub fn close_search(&self, session: SearchSessionController) {
        let token = session.session();
        drop(session);
        let mut overlay = self.overlay.borrow_mut();
        if matches!(*overlay, Overlay::Search { session: open } if open == token) {
            *overlay = Overlay::None;
        }
    }

    /// Apply a selection made in the search overlay.
    ///
    /// The overlay closes and the camera moves to the chosen region. A
    /// selection from a session whose overlay is no longer open is
    /// discarded.
    pub fn apply_place_chosen(&self, chosen: &PlaceChosen) -> Resolution<CameraAnimation> {
        {
            let mut overlay = self.overlay.borrow_mut();
            if !matches!(*overlay, Overlay::Search { session: open } if open == chosen.session) {
                debug!(
                    "discarding place {} chosen in closed session {}",
                    chosen.candidate.place_id(),
                    chosen.session.value()
                );
                return Resolution::Discarded;
            }
            *overlay = Overlay::None;
        }
        Resolution::Applied(self.animate_to(chosen.region))
    }

    /// Open the detail overlay for the marker `place_id` and load its
    /// details, then its photo.
    ///
    /// While requests are outstanding the overlay reports
    /// [`Loadable::Loading`]. Closing the overlay, opening search or tapping
    /// another marker makes pending results stale; they are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::UnknownMarker`] for an unconfigured identifier and
    /// [`MapError::Places`] when the details request fails. Photo failures
    /// only mark the photo as failed.
    pub async fn tap_marker(&self, place_id: &str) -> Result<Resolution<DetailView>, MapError> {
        let marker = self
            .markers
            .iter()
            .find(|marker| marker.place_id == place_id)
            .cloned()
            .ok_or_else(|| MapError::UnknownMarker {
                place_id: place_id.to_owned(),
            })?;

        let token = self.details.issue();
        self.set_overlay(Overlay::Detail(DetailView {
            marker,
            token,
            detail: Loadable::Loading,
            photo_url: Loadable::Loading,
        }));

        let response = self.places.details(place_id).await;
        if !self.details.is_current(token) {
            debug!("discarding stale details for marker {place_id}");
            return Ok(Resolution::Discarded);
        }

        let detail = match response {
            Ok(detail) => detail,
            Err(err) => {
                warn!("details for marker {place_id} failed: {err}");
                self.update_detail(|view| {
                    view.detail = Loadable::Failed(err.clone());
                    view.photo_url = Loadable::Missing;
                });
                return Err(err.into());
            }
        };

        let reference = detail.photo_reference.clone();
        self.update_detail(|view| {
            view.detail = Loadable::Ready(detail);
            if reference.is_none() {
                view.photo_url = Loadable::Missing;
            }
        });

        if let Some(reference) = reference {
            let photo = self.places.resolve_photo_url(&reference).await;
            if !self.details.is_current(token) {
                debug!("discarding stale photo for marker {place_id}");
                return Ok(Resolution::Discarded);
            }
            let photo_url = match photo {
                Ok(url) => Loadable::Ready(url),
                Err(PlacesError::PhotoUnavailable) => Loadable::Missing,
                Err(err) => {
                    warn!("photo for marker {place_id} failed: {err}");
                    Loadable::Failed(err)
                }
            };
            self.update_detail(|view| view.photo_url = photo_url);
        }

        match self.overlay() {
            Overlay::Detail(view) => Ok(Resolution::Applied(view)),
            Overlay::None | Overlay::Search { .. } => Ok(Resolution::Discarded),
        }
    }

    /// Close the detail overlay; pending detail and photo results become
    /// stale.
    pub fn close_detail(&self) {
        self.details.invalidate();
        let mut overlay = self.overlay.borrow_mut();
        if matches!(*overlay, Overlay::Detail(_)) {
            *overlay = Overlay::None;
        }
    }

    /// Locate the device and move the camera there.
    ///
    /// When several locate requests overlap, only the latest moves the
    /// camera.
    ///
    /// # Errors
    ///
    /// Returns the [`LocationError`] from authorisation or the position
    /// request; the camera stays where it was.
    pub async fn center_on_user(&self) -> Result<Resolution<CameraAnimation>, LocationError> {
        let token = self.locates.issue();
        let fix = self.locate().await;

        if !self.locates.is_current(token) {
            debug!("discarding stale position fix (token {})", token.value());
            return Ok(Resolution::Discarded);
        }

        match fix {
            Ok(coordinate) => Ok(Resolution::Applied(self.on_position_update(coordinate))),
            Err(err) => {
                warn!("could not locate the device: {err}");
                Err(err)
            }
        }
    }

    async fn locate(&self) -> Result<Coordinate, LocationError> {
        self.position.request_authorization().await?;
        self.position
            .current_position(self.settings.position_options)
            .await
    }

    /// Centre the camera on a position reported by the device.
    pub fn on_position_update(&self, coordinate: Coordinate) -> CameraAnimation {
        self.animate_to(self.zoom.recentred(coordinate))
    }

    /// Start continuous position observation.
    ///
    /// Feed the reported coordinates to
    /// [`MapInteractionController::on_position_update`]; observation stops
    /// when the guard is dropped.
    ///
    /// # Errors
    ///
    /// Returns the provider's [`LocationError`] when observation cannot
    /// start.
    pub fn observe_position(&self) -> Result<ObservationGuard<'_>, LocationError> {
        observe(self.position.as_ref())
    }

    /// Record that the animation identified by `token` completed.
    ///
    /// Returns `false` when a newer animation had already preempted it.
    pub fn finish_animation(&self, token: RequestToken) -> bool {
        let mut camera = self.camera.borrow_mut();
        match camera.animation {
            Some(animation) if animation.token == token => {
                camera.region = animation.target;
                camera.animation = None;
                true
            }
            _ => false,
        }
    }

    fn animate_to(&self, target: Region) -> CameraAnimation {
        let animation = CameraAnimation {
            target,
            duration: self.settings.animation_duration,
            token: self.animations.issue(),
        };
        let mut camera = self.camera.borrow_mut();
        if let Some(previous) = camera.animation.replace(animation) {
            debug!("camera animation {} preempted", previous.token.value());
        }
        animation
    }

    fn set_overlay(&self, overlay: Overlay) {
        *self.overlay.borrow_mut() = overlay;
    }

    fn update_detail(&self, apply: impl FnOnce(&mut DetailView)) {
        if let Overlay::Detail(view) = &mut *self.overlay.borrow_mut() {
            apply(view);
        }
    }
}
