//! Environment implementations for the glimpse pool.
//!
//! Currently ships the slide environment: an agent that observes a large
//! image through a small movable view window, one glimpse per step.

pub mod shared;
pub mod slide;

pub use slide::{
    continuous_to_coords, Patch, SlideConfig, SlideEnv, SlideError, SlideInfo, SlideRecord,
    ViewRect,
};
