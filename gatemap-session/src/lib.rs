//! Controllers coordinating place search, recent places and the map.
//!
//! Both controllers run on a single cooperative event loop. They take
//! `&self`, keep their state in cells, and never hold a borrow across an
//! `.await`, so several operations can be in flight at once on one thread.
//! Every asynchronous operation is stamped with a [`RequestToken`]; when it
//! completes, the result is applied only if the token is still the latest
//! for its session. Anything else resolves to [`Resolution::Discarded`].
//!
//! - [`SearchSessionController`] owns the state of an open search overlay.
//! - [`MapInteractionController`] owns the camera, the gate markers and the
//!   overlay shown above the map.

#![forbid(unsafe_code)]

pub mod map;
pub mod search;
pub mod sequence;

pub use map::{
    Camera, CameraAnimation, DEFAULT_ANIMATION_DURATION, DetailView, Loadable, MapError,
    MapInteractionController, MapSettings, Overlay,
};
pub use search::{
    Listing, MIN_QUERY_CHARS, PlaceChosen, QueryOutcome, SearchSessionController, SearchStatus,
};
pub use sequence::{RequestSequence, RequestToken, Resolution};
