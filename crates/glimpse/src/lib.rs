//! # Glimpse
//!
//! Batched, asynchronous pools of glimpse-based image environments.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use glimpse::{Action, EnvPool, SlideConfig, SlideEnv, SlideRecord};
//!
//! let config = SlideConfig::new(dataset, (256, 256), 100);
//!
//! // One worker thread per environment; image decoding happens off the
//! // caller's thread.
//! let mut pool = EnvPool::new(8, |env_id| {
//!     SlideEnv::with_seed(config.clone(), env_id as u64)
//! })?;
//!
//! pool.reset()?;
//! let first = pool.recv()?;
//!
//! let actions = first.iter().map(|_| Action::step([0.0, 0.0])).collect();
//! let replies = pool.step(actions)?;
//! pool.shutdown()?;
//! ```
//!
//! ## Crate Structure
//!
//! - [`glimpse_core`]: the pool engine and the environment capability trait
//! - [`glimpse_envs`]: environment implementations (the slide environment)

// Re-export the pool engine and capability contract.
pub use glimpse_core::*;

// Re-export environment implementations.
pub use glimpse_envs::*;
