//! Random number generation utilities for environments.

use rand::SeedableRng;

pub use rand_xoshiro::Xoshiro256StarStar;

/// Build a generator: deterministic when a seed is given, entropy-seeded
/// otherwise.
pub fn generator(seed: Option<u64>) -> Xoshiro256StarStar {
    match seed {
        Some(seed) => Xoshiro256StarStar::seed_from_u64(seed),
        None => Xoshiro256StarStar::from_entropy(),
    }
}

/// Draw a float uniformly from [-1, 1).
#[inline]
pub fn symmetric_unit(rng: &mut Xoshiro256StarStar) -> f32 {
    use rand::Rng;
    rng.gen::<f32>() * 2.0 - 1.0
}
