//! The slide environment proper: dataset handling, episode state, and the
//! capability contract implementation.

use std::fmt;
use std::path::PathBuf;

use glimpse_core::{Environment, Step};
use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::shared::rng::{generator, symmetric_unit, Xoshiro256StarStar};

use super::view::{continuous_to_coords, Patch};

/// One dataset entry: an image file and its class label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideRecord {
    pub path: PathBuf,
    pub label: i32,
}

/// Configuration for a [`SlideEnv`].
///
/// Serializable so a dataset manifest can be kept as JSON next to the image
/// files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideConfig {
    /// Labelled image files to sample episodes from.
    pub dataset: Vec<SlideRecord>,
    /// View size as `(height, width)` in pixels.
    pub view_size: (u32, u32),
    /// Number of glimpses after which an episode ends.
    pub max_episode_len: u32,
}

impl SlideConfig {
    pub fn new(dataset: Vec<SlideRecord>, view_size: (u32, u32), max_episode_len: u32) -> Self {
        Self {
            dataset,
            view_size,
            max_episode_len,
        }
    }

    fn validate(&self) -> Result<(), SlideError> {
        if self.dataset.is_empty() {
            return Err(SlideError::InvalidConfig {
                param: "dataset".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.view_size.0 == 0 || self.view_size.1 == 0 {
            return Err(SlideError::InvalidConfig {
                param: "view_size".to_string(),
                message: "both dimensions must be at least 1".to_string(),
            });
        }
        if self.max_episode_len == 0 {
            return Err(SlideError::InvalidConfig {
                param: "max_episode_len".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Info record attached to every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideInfo {
    /// Glimpses taken since the episode started.
    pub timestep: u32,
    /// Class label of the current slide.
    pub target: i32,
}

/// Errors raised by the slide environment.
#[derive(Debug)]
pub enum SlideError {
    /// Invalid configuration (empty dataset, zero-sized view, etc.).
    InvalidConfig { param: String, message: String },
    /// An image file could not be read or decoded.
    ImageRead {
        path: PathBuf,
        source: image::ImageError,
    },
    /// The configured view does not fit inside a dataset image.
    ViewExceedsImage {
        path: PathBuf,
        image: (u32, u32),
        view: (u32, u32),
    },
    /// `step` was called before any episode was started.
    NotReset,
}

impl fmt::Display for SlideError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { param, message } => {
                write!(f, "Invalid configuration for '{}': {}", param, message)
            }
            Self::ImageRead { path, source } => {
                write!(f, "Failed to read image {}: {}", path.display(), source)
            }
            Self::ViewExceedsImage { path, image, view } => write!(
                f,
                "View {}x{} does not fit inside image {} ({}x{})",
                view.0,
                view.1,
                path.display(),
                image.0,
                image.1
            ),
            Self::NotReset => write!(f, "step called before reset"),
        }
    }
}

impl std::error::Error for SlideError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageRead { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// The slide currently backing an episode.
#[derive(Debug)]
struct Slide {
    pixels: RgbImage,
    label: i32,
}

/// Glimpse-based navigation over a dataset of labelled images.
///
/// Every episode samples one image uniformly at random, decodes it, and
/// serves fixed-size patches selected by the agent's continuous `[x, y]`
/// actions. The reward is always zero; downstream consumers attach their own
/// objective via the `target` label in [`SlideInfo`].
#[derive(Debug)]
pub struct SlideEnv {
    config: SlideConfig,
    slide: Option<Slide>,
    timestep: u32,
    rng: Xoshiro256StarStar,
}

impl SlideEnv {
    /// Build an entropy-seeded environment.
    pub fn new(config: SlideConfig) -> Result<Self, SlideError> {
        Self::build(config, None)
    }

    /// Build a deterministically seeded environment.
    ///
    /// Two environments with the same configuration and seed replay
    /// identical episodes.
    pub fn with_seed(config: SlideConfig, seed: u64) -> Result<Self, SlideError> {
        Self::build(config, Some(seed))
    }

    fn build(config: SlideConfig, seed: Option<u64>) -> Result<Self, SlideError> {
        config.validate()?;
        Ok(Self {
            config,
            slide: None,
            timestep: 0,
            rng: generator(seed),
        })
    }

    /// View size as `(height, width)`.
    #[inline]
    pub fn view_size(&self) -> (u32, u32) {
        self.config.view_size
    }

    /// Pick a dataset record uniformly at random and decode it.
    fn load_random_slide(&mut self) -> Result<(), SlideError> {
        use rand::Rng;
        let record = &self.config.dataset[self.rng.gen_range(0..self.config.dataset.len())];

        let pixels = image::open(&record.path)
            .map_err(|source| SlideError::ImageRead {
                path: record.path.clone(),
                source,
            })?
            .to_rgb8();

        let (view_h, view_w) = self.config.view_size;
        if pixels.height() < view_h || pixels.width() < view_w {
            return Err(SlideError::ViewExceedsImage {
                path: record.path.clone(),
                image: (pixels.height(), pixels.width()),
                view: (view_h, view_w),
            });
        }

        log::debug!(
            "loaded slide {} ({}x{}, label {})",
            record.path.display(),
            pixels.height(),
            pixels.width(),
            record.label
        );
        self.slide = Some(Slide {
            pixels,
            label: record.label,
        });
        Ok(())
    }

    /// Extract the patch selected by `point` from the current slide.
    fn glimpse(slide: &Slide, point: [f32; 2], view_size: (u32, u32)) -> Patch {
        let rect = continuous_to_coords(
            point,
            (slide.pixels.height(), slide.pixels.width()),
            view_size,
        );
        let mut patch = Patch::new(3, rect.height as usize, rect.width as usize);
        for y in 0..rect.height {
            for x in 0..rect.width {
                let pixel = slide.pixels.get_pixel(rect.left + x, rect.top + y);
                for band in 0..3 {
                    patch.set(band, y as usize, x as usize, pixel[band]);
                }
            }
        }
        patch
    }
}

impl Environment for SlideEnv {
    type Action = [f32; 2];
    type Observation = Patch;
    type Info = SlideInfo;
    type Error = SlideError;

    fn reset(&mut self) -> Result<Step<Patch, SlideInfo>, SlideError> {
        self.load_random_slide()?;
        self.timestep = 0;

        // First observation: a uniformly random glimpse of the fresh slide.
        let point = [symmetric_unit(&mut self.rng), symmetric_unit(&mut self.rng)];
        let slide = self.slide.as_ref().ok_or(SlideError::NotReset)?;
        let obs = Self::glimpse(slide, point, self.config.view_size);

        Ok(Step {
            obs,
            reward: 0.0,
            done: false,
            truncated: false,
            info: SlideInfo {
                timestep: 0,
                target: slide.label,
            },
        })
    }

    fn step(&mut self, action: &[f32; 2]) -> Result<Step<Patch, SlideInfo>, SlideError> {
        let slide = self.slide.as_ref().ok_or(SlideError::NotReset)?;
        let obs = Self::glimpse(slide, *action, self.config.view_size);
        let target = slide.label;

        self.timestep += 1;
        Ok(Step {
            obs,
            reward: 0.0,
            done: self.is_done(),
            truncated: false,
            info: SlideInfo {
                timestep: self.timestep,
                target,
            },
        })
    }

    fn is_done(&self) -> bool {
        self.timestep >= self.config.max_episode_len
    }
}
