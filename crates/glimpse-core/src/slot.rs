//! One pool slot: an environment instance, its queue pair, and the worker
//! thread that drives them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};

use crate::env::Environment;
use crate::error::{PoolError, Result};
use crate::messages::{Action, Reply, ResetCause};

/// Handle to one slot, held by the pool.
///
/// The worker thread is the only reader of `actions` and the only writer of
/// `replies`; the pool holds the opposite ends.
pub(crate) struct Slot<E: Environment> {
    pub(crate) actions: Sender<Action<E::Action>>,
    pub(crate) replies: Receiver<Reply<E::Observation, E::Info, E::Error>>,
    pub(crate) worker: Option<JoinHandle<()>>,
}

impl<E: Environment + Send + 'static> Slot<E> {
    /// Spawn the worker thread for `env` and wire up its queue pair.
    ///
    /// The inbound queue capacity follows the pool configuration. The
    /// outbound queue is always unbounded: publishing a result must never
    /// block a worker.
    pub(crate) fn spawn(
        env_id: usize,
        env: E,
        queue_capacity: Option<usize>,
        stop: Arc<AtomicBool>,
    ) -> Result<Self> {
        let (action_tx, action_rx) = match queue_capacity {
            Some(capacity) => bounded(capacity),
            None => unbounded(),
        };
        let (reply_tx, reply_rx) = unbounded();

        let worker = std::thread::Builder::new()
            .name(format!("glimpse-env-{}", env_id))
            .spawn(move || run_worker(env_id, env, action_rx, reply_tx, stop))
            .map_err(|err| PoolError::Worker {
                slot: env_id,
                message: format!("failed to spawn worker thread: {}", err),
            })?;

        Ok(Self {
            actions: action_tx,
            replies: reply_rx,
            worker: Some(worker),
        })
    }
}

/// Worker control loop: dequeue, compute, publish, until stopped.
fn run_worker<E: Environment>(
    env_id: usize,
    mut env: E,
    actions: Receiver<Action<E::Action>>,
    replies: Sender<Reply<E::Observation, E::Info, E::Error>>,
    stop: Arc<AtomicBool>,
) {
    log::debug!("worker {} started", env_id);
    loop {
        // Always block on the dequeue first and check the stop flag after it
        // returns. Checking before the dequeue would race with shutdown: the
        // flag could be set and the wake-up item enqueued between the check
        // and the block, leaving this thread asleep forever.
        let action = match actions.recv() {
            Ok(action) => action,
            // Pool dropped its sender without the shutdown handshake.
            Err(_) => break,
        };
        if stop.load(Ordering::Acquire) {
            // The dequeued item is the shutdown wake-up; discard it.
            break;
        }

        let restarted = if action.force_reset {
            Some(ResetCause::Forced)
        } else if env.is_done() {
            Some(ResetCause::EpisodeDone)
        } else {
            None
        };

        let data = match restarted {
            Some(_) => env.reset(),
            None => env.step(&action.payload),
        };
        if let Err(err) = &data {
            let op = if restarted.is_some() { "reset" } else { "step" };
            log::error!("env {}: {} failed: {}", env_id, op, err);
        }

        let reply = Reply {
            env_id,
            restarted,
            data,
        };
        if replies.send(reply).is_err() {
            // Pool is gone; nothing left to publish to.
            break;
        }
    }
    log::debug!("worker {} stopped", env_id);
}
