//! Monotonic request tokens used to suppress stale responses.

use std::cell::Cell;

/// Identifies one issued request within a [`RequestSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestToken(u64);

impl RequestToken {
    /// Token of a standalone search session. Sequences start issuing at one,
    /// so no map session ever matches it.
    pub(crate) const DETACHED: Self = Self(0);

    /// Raw counter value, useful in log lines.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Per-session counter implementing last-request-wins.
///
/// Issuing a token or invalidating the sequence makes every earlier token
/// stale.
///
/// # Examples
///
/// ```
/// use gatemap_session::RequestSequence;
///
/// let sequence = RequestSequence::new();
/// let first = sequence.issue();
/// let second = sequence.issue();
/// assert!(!sequence.is_current(first));
/// assert!(sequence.is_current(second));
///
/// sequence.invalidate();
/// assert!(!sequence.is_current(second));
/// ```
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: Cell<u64>,
}

impl RequestSequence {
    /// Create a sequence with no outstanding request.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            latest: Cell::new(0),
        }
    }

    /// Issue a token that supersedes every earlier one.
    pub fn issue(&self) -> RequestToken {
        let next = self.latest.get().wrapping_add(1);
        self.latest.set(next);
        RequestToken(next)
    }

    /// Whether `token` is the most recently issued one.
    #[must_use]
    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.get() == token.0
    }

    /// Make every issued token stale without issuing a new one.
    pub fn invalidate(&self) {
        self.latest.set(self.latest.get().wrapping_add(1));
    }
}

/// Outcome of an operation whose result may have gone stale.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// The result was current and has been applied.
    Applied(T),
    /// A newer request or a closed overlay superseded this one; nothing
    /// changed.
    Discarded,
}

impl<T> Resolution<T> {
    /// Whether the result was applied.
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// The applied value, if any.
    #[must_use]
    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Discarded => None,
        }
    }
}
