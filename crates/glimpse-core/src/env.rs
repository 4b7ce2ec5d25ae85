//! The capability contract every pool-compatible environment implements.

/// Outcome of a single `reset` or `step` call on one environment.
#[derive(Debug, Clone)]
pub struct Step<O, I> {
    /// Observation payload.
    pub obs: O,
    /// Scalar reward earned by the transition.
    pub reward: f32,
    /// Episode reached a terminal state.
    pub done: bool,
    /// Episode was cut off without reaching a terminal state.
    pub truncated: bool,
    /// Auxiliary info record.
    pub info: I,
}

impl<O, I> Step<O, I> {
    /// Episode ended for any reason (terminal or truncated).
    #[inline]
    pub fn episode_over(&self) -> bool {
        self.done || self.truncated
    }
}

/// A single simulation instance that can be driven by an [`EnvPool`].
///
/// Implementations advance internal state one transition at a time. The pool
/// guarantees that no two calls are ever made concurrently against the same
/// instance: each instance is owned by exactly one worker thread, so
/// implementations need no internal locking.
///
/// Computation failures are reported through [`Environment::Error`], not by
/// panicking; the pool captures them and delivers them in-band for the
/// affected slot while the other slots keep making progress.
///
/// [`EnvPool`]: crate::pool::EnvPool
pub trait Environment {
    /// Action payload consumed by [`step`](Environment::step).
    ///
    /// `Default` supplies the throwaway payload for reset requests and
    /// shutdown wake-ups.
    type Action: Default + Send + 'static;
    /// Observation payload produced by every transition.
    type Observation: Send + 'static;
    /// Auxiliary info record attached to every transition.
    type Info: Send + 'static;
    /// Computation error type.
    type Error: std::error::Error + Send + 'static;

    /// Start a new episode and return its first observation.
    ///
    /// Must reset any internal step counter.
    fn reset(&mut self) -> Result<Step<Self::Observation, Self::Info>, Self::Error>;

    /// Advance the current episode by one transition.
    ///
    /// Sets `done` on the returned [`Step`] when a terminal condition is met.
    fn step(&mut self, action: &Self::Action)
        -> Result<Step<Self::Observation, Self::Info>, Self::Error>;

    /// Whether the environment is at a terminal state since the last reset.
    fn is_done(&self) -> bool;
}
