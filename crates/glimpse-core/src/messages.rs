//! Queue item types exchanged between the caller and slot workers.

use crate::env::Step;

/// One queued request for a single slot: an opaque action payload plus the
/// reset override flag.
#[derive(Debug, Clone)]
pub struct Action<A> {
    /// Payload handed to [`Environment::step`](crate::env::Environment::step).
    pub payload: A,
    /// Restart the slot's episode instead of stepping, regardless of the
    /// environment's own terminal state.
    pub force_reset: bool,
}

impl<A> Action<A> {
    /// An ordinary step request.
    pub fn step(payload: A) -> Self {
        Self {
            payload,
            force_reset: false,
        }
    }
}

impl<A: Default> Action<A> {
    /// A reset request. The payload is a throwaway default value; workers
    /// never look at it when `force_reset` is set.
    pub fn reset() -> Self {
        Self {
            payload: A::default(),
            force_reset: true,
        }
    }
}

/// Why a worker restarted its episode instead of stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetCause {
    /// The caller set `force_reset` on the action.
    Forced,
    /// The environment reported `is_done()` before the action was applied.
    EpisodeDone,
}

/// One published result for a single slot.
///
/// `data` carries the environment's computation outcome in-band: an `Err`
/// here means *that slot's* environment failed, while the pool itself is
/// still healthy (engine faults surface as
/// [`PoolError::Worker`](crate::error::PoolError) instead).
#[derive(Debug)]
pub struct Reply<O, I, E> {
    /// Index of the slot that produced this result.
    pub env_id: usize,
    /// `Some` when the worker restarted the episode rather than stepping.
    pub restarted: Option<ResetCause>,
    /// The transition outcome, or the captured environment error.
    pub data: Result<Step<O, I>, E>,
}
