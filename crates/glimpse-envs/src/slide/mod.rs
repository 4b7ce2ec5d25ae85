//! The slide environment: glimpse-based navigation over large images.
//!
//! Each episode picks one image ("slide") from a dataset of labelled files.
//! The agent emits a continuous point in `[-1, 1]^2` per step and observes
//! the fixed-size patch of the slide that the point selects. Episodes end
//! after a configured number of glimpses.

mod env;
mod view;

pub use env::{SlideConfig, SlideEnv, SlideError, SlideInfo, SlideRecord};
pub use view::{continuous_to_coords, Patch, ViewRect};
