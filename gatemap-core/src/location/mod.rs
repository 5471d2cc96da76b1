//! Best-effort access to the device position.
//!
//! [`PositionProvider`] wraps platform location APIs: permission
//! negotiation, one-shot position fixes and continuous observation.
//! Observation holds OS resources, so it is acquired through [`observe`],
//! which hands back an [`ObservationGuard`] that releases them on drop.

mod error;
mod provider;

pub use error::LocationError;
pub use provider::{ObservationGuard, PositionOptions, PositionProvider, observe};
