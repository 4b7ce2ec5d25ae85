//! The pool: an ordered collection of slots and the round-trip protocol
//! (`send`, `recv`, `reset`, `shutdown`) over them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;

use crate::env::Environment;
use crate::error::{PoolError, Result};
use crate::messages::{Action, Reply};
use crate::slot::Slot;

/// Reply type produced by a pool over environment `E`.
pub type EnvReply<E> = Reply<
    <E as Environment>::Observation,
    <E as Environment>::Info,
    <E as Environment>::Error,
>;

/// Configuration for an [`EnvPool`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of environments (= slots = worker threads). Fixed for the
    /// pool's lifetime.
    pub num_envs: usize,
    /// Inbound action queue capacity per slot. `None` (the default) means
    /// unbounded; `Some(n)` bounds the queue and makes `send` block the
    /// caller when a slot's queue is full. Outbound reply queues are always
    /// unbounded so workers can never block while publishing.
    pub queue_capacity: Option<usize>,
}

impl PoolConfig {
    /// Configuration with unbounded inbound queues.
    pub fn new(num_envs: usize) -> Self {
        Self {
            num_envs,
            queue_capacity: None,
        }
    }

    /// Bound each slot's inbound queue to `capacity` items.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }
}

/// A fixed-size pool of environments, each driven by its own worker thread.
///
/// The protocol is round-synchronous: submit exactly one action per slot with
/// [`send`](EnvPool::send) (or [`reset`](EnvPool::reset)), then collect
/// exactly one result per slot with [`recv`](EnvPool::recv), and repeat.
/// Submitting a second action for a slot before consuming its previous result
/// is a caller protocol violation; the queues will buffer the items, but
/// replies then lag one round behind and batch alignment is on the caller.
///
/// Index `i` in every batch denotes the same slot for the pool's lifetime,
/// and the result at index `i` always corresponds to the most recently
/// consumed action for that slot. No ordering holds *across* slots: they make
/// independent progress.
pub struct EnvPool<E: Environment> {
    slots: Vec<Slot<E>>,
    stop: Arc<AtomicBool>,
    /// Results already collected for the round in progress. Lets a timed-out
    /// `recv` resume later without losing or reordering replies.
    pending: Vec<Option<EnvReply<E>>>,
    closed: bool,
}

impl<E: Environment> std::fmt::Debug for EnvPool<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvPool")
            .field("num_envs", &self.slots.len())
            .field("closed", &self.closed)
            .finish()
    }
}

impl<E: Environment + Send + 'static> EnvPool<E> {
    /// Build a pool of `num_envs` environments with unbounded queues.
    ///
    /// `factory` is called once per slot index; every instance is built
    /// independently from the caller's shared configuration.
    pub fn new<F>(num_envs: usize, factory: F) -> Result<Self>
    where
        F: FnMut(usize) -> std::result::Result<E, E::Error>,
    {
        Self::with_config(PoolConfig::new(num_envs), factory)
    }

    /// Build a pool from an explicit [`PoolConfig`].
    pub fn with_config<F>(config: PoolConfig, mut factory: F) -> Result<Self>
    where
        F: FnMut(usize) -> std::result::Result<E, E::Error>,
    {
        if config.num_envs == 0 {
            return Err(PoolError::InvalidConfig {
                param: "num_envs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        // Build every instance before spawning anything so a factory failure
        // costs no thread cleanup.
        let mut envs = Vec::with_capacity(config.num_envs);
        for env_id in 0..config.num_envs {
            let env = factory(env_id).map_err(|err| PoolError::Build {
                slot: env_id,
                message: err.to_string(),
            })?;
            envs.push(env);
        }

        let stop = Arc::new(AtomicBool::new(false));
        let mut slots: Vec<Slot<E>> = Vec::with_capacity(config.num_envs);
        for (env_id, env) in envs.into_iter().enumerate() {
            match Slot::spawn(env_id, env, config.queue_capacity, Arc::clone(&stop)) {
                Ok(slot) => slots.push(slot),
                Err(err) => {
                    // Unwind the workers that did start before surfacing.
                    stop.store(true, Ordering::Release);
                    for started in &slots {
                        let _ = started.actions.try_send(Action::reset());
                    }
                    for started in &mut slots {
                        if let Some(handle) = started.worker.take() {
                            let _ = handle.join();
                        }
                    }
                    return Err(err);
                }
            }
        }

        let pending = (0..config.num_envs).map(|_| None).collect();
        Ok(Self {
            slots,
            stop,
            pending,
            closed: false,
        })
    }

    /// Number of environments in the pool.
    #[inline]
    pub fn num_envs(&self) -> usize {
        self.slots.len()
    }

    /// Alias for [`num_envs`](EnvPool::num_envs).
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false: a pool holds at least one slot.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Enqueue one action per slot, in slot order.
    ///
    /// Does not wait for any computation. The batch length is validated
    /// before anything is enqueued, so a mismatch has no partial effects.
    /// With a bounded queue capacity this blocks while a slot's queue is
    /// full (backpressure); with the default unbounded queues it never
    /// blocks.
    pub fn send(&mut self, actions: Vec<Action<E::Action>>) -> Result<()> {
        self.ensure_open()?;
        if actions.len() != self.slots.len() {
            return Err(PoolError::BatchSizeMismatch {
                expected: self.slots.len(),
                actual: actions.len(),
            });
        }
        for (env_id, (slot, action)) in self.slots.iter().zip(actions).enumerate() {
            slot.actions.send(action).map_err(|_| PoolError::Worker {
                slot: env_id,
                message: "worker thread is no longer running".to_string(),
            })?;
        }
        Ok(())
    }

    /// Collect one result per slot, in slot order, blocking until all are
    /// available.
    ///
    /// Total latency is the maximum over slots, not the sum: every worker
    /// computes concurrently and this call merely waits for the stragglers.
    pub fn recv(&mut self) -> Result<Vec<EnvReply<E>>> {
        self.recv_inner(None)
    }

    /// Like [`recv`](EnvPool::recv), but give up after `timeout`.
    ///
    /// On timeout the error names the slot that stalled, and every result
    /// collected so far is retained inside the pool: a later `recv` or
    /// `recv_timeout` resumes the same round with no loss or duplication.
    pub fn recv_timeout(&mut self, timeout: Duration) -> Result<Vec<EnvReply<E>>> {
        self.recv_inner(Some(Instant::now() + timeout))
    }

    /// Convenience round trip: [`send`](EnvPool::send) then
    /// [`recv`](EnvPool::recv).
    pub fn step(&mut self, actions: Vec<Action<E::Action>>) -> Result<Vec<EnvReply<E>>> {
        self.send(actions)?;
        self.recv()
    }

    /// Request a restart of every slot's episode.
    ///
    /// Equivalent to sending a batch of `force_reset` actions; the caller
    /// must still [`recv`](EnvPool::recv) to obtain the post-reset results.
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_open()?;
        for (env_id, slot) in self.slots.iter().enumerate() {
            slot.actions
                .send(Action::reset())
                .map_err(|_| PoolError::Worker {
                    slot: env_id,
                    message: "worker thread is no longer running".to_string(),
                })?;
        }
        Ok(())
    }

    /// Slots that have not yet delivered a result for the round currently
    /// being collected.
    ///
    /// Meaningful after a [`recv_timeout`](EnvPool::recv_timeout) failure:
    /// the returned indices are the workers still owing a reply. When no
    /// partial collection is in progress this lists every slot.
    pub fn outstanding_slots(&self) -> Vec<usize> {
        self.pending
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_none())
            .map(|(env_id, _)| env_id)
            .collect()
    }

    /// Stop and join every worker thread.
    ///
    /// Protocol: set the stop flag, wake every slot with a throwaway item so
    /// a worker blocked on its dequeue re-observes the flag, then join. The
    /// pool is unusable afterwards; any further operation (including a
    /// second `shutdown`) fails with [`PoolError::Closed`].
    pub fn shutdown(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.closed = true;
        self.stop.store(true, Ordering::Release);
        for slot in &self.slots {
            // A full bounded queue means the worker is not blocked on the
            // dequeue (it has work), so skipping the wake-up is safe.
            let _ = slot.actions.try_send(Action::reset());
        }

        let mut first_err = None;
        for (env_id, slot) in self.slots.iter_mut().enumerate() {
            if let Some(handle) = slot.worker.take() {
                if handle.join().is_err() && first_err.is_none() {
                    first_err = Some(PoolError::Worker {
                        slot: env_id,
                        message: "worker thread panicked".to_string(),
                    });
                }
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn recv_inner(&mut self, deadline: Option<Instant>) -> Result<Vec<EnvReply<E>>> {
        self.ensure_open()?;
        for (env_id, slot) in self.slots.iter().enumerate() {
            if self.pending[env_id].is_some() {
                continue;
            }
            let reply = match deadline {
                None => slot.replies.recv().map_err(|_| PoolError::Worker {
                    slot: env_id,
                    message: "worker thread exited before publishing a result".to_string(),
                })?,
                Some(deadline) => {
                    slot.replies.recv_deadline(deadline).map_err(|err| match err {
                        RecvTimeoutError::Timeout => PoolError::RecvTimeout { slot: env_id },
                        RecvTimeoutError::Disconnected => PoolError::Worker {
                            slot: env_id,
                            message: "worker thread exited before publishing a result"
                                .to_string(),
                        },
                    })?
                }
            };
            self.pending[env_id] = Some(reply);
        }

        let batch = self
            .pending
            .iter_mut()
            .map(|entry| entry.take().expect("collected round is complete"))
            .collect();
        Ok(batch)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(PoolError::Closed)
        } else {
            Ok(())
        }
    }
}

impl<E: Environment> Drop for EnvPool<E> {
    /// Best-effort shutdown for pools dropped without an explicit
    /// [`shutdown`](EnvPool::shutdown): same signal/wake/join protocol,
    /// errors swallowed.
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.stop.store(true, Ordering::Release);
        for slot in &self.slots {
            let _ = slot.actions.try_send(Action::reset());
        }
        for slot in &mut self.slots {
            if let Some(handle) = slot.worker.take() {
                let _ = handle.join();
            }
        }
    }
}
