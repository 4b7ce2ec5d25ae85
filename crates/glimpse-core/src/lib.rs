//! # Glimpse Core
//!
//! Batched, asynchronous stepping of a fixed collection of independent
//! simulation environments.
//!
//! A caller submits one batch of actions across all environments, then later
//! collects one batch of results. The per-environment computation runs on
//! dedicated worker threads and may block (image decoding, file I/O) without
//! stalling the caller or the other environments.
//!
//! ## Architecture Overview
//!
//! ```text
//!  caller thread                    worker threads (one per slot)
//!  ┌───────────┐   action queues    ┌────────┐ ┌────────┐ ┌────────┐
//!  │           │ ─────────────────▶ │ env 0  │ │ env 1  │ │ env N-1│
//!  │ send/recv │                    │ worker │ │ worker │ │ worker │
//!  │           │ ◀───────────────── └────────┘ └────────┘ └────────┘
//!  └───────────┘   reply queues
//! ```
//!
//! Each slot owns exactly one environment instance, one inbound action queue,
//! and one outbound reply queue. Slots never communicate with each other, so
//! no environment is ever touched by two threads.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use glimpse_core::{Action, EnvPool};
//!
//! let mut pool = EnvPool::new(8, |env_id| MyEnv::build(env_id))?;
//! pool.reset()?;
//! let first = pool.recv()?;
//!
//! let actions = policy(&first);
//! let replies = pool.step(actions)?;
//! pool.shutdown()?;
//! ```

pub mod env;
pub mod error;
pub mod messages;
pub mod pool;

mod slot;

pub use env::{Environment, Step};
pub use error::{PoolError, Result};
pub use messages::{Action, Reply, ResetCause};
pub use pool::{EnvPool, EnvReply, PoolConfig};
