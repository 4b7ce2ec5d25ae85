//! Throughput driver: time batched rounds over a pool of slide environments.
//!
//! Synthesizes a slide into the temp directory, then measures send/recv
//! round-trip rate for a pool of 8 environments.
//!
//! Run with: `cargo run --release --example throughput`

use std::time::Instant;

use glimpse::{Action, EnvPool, SlideConfig, SlideEnv, SlideRecord};

const NUM_ENVS: usize = 8;
const TOTAL_STEPS: usize = 100_000;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::temp_dir().join(format!("glimpse-throughput-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let slide_path = dir.join("slide.png");
    let slide = image::RgbImage::from_fn(2048, 2048, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    slide.save(&slide_path)?;

    let config = SlideConfig::new(
        vec![SlideRecord {
            path: slide_path,
            label: 0,
        }],
        (256, 256),
        100,
    );

    let mut pool = EnvPool::new(NUM_ENVS, |env_id| {
        SlideEnv::with_seed(config.clone(), env_id as u64)
    })?;

    pool.reset()?;
    pool.recv()?;

    let start = Instant::now();
    let mut steps = 0usize;
    while steps < TOTAL_STEPS {
        let actions = (0..NUM_ENVS).map(|_| Action::step([0.0, 0.0])).collect();
        pool.step(actions)?;
        steps += NUM_ENVS;

        if steps % 10_000 == 0 {
            let elapsed = start.elapsed();
            println!(
                "{} steps in {} ms ({:.0} steps/s)",
                steps,
                elapsed.as_millis(),
                steps as f64 / elapsed.as_secs_f64()
            );
        }
    }

    let elapsed = start.elapsed();
    println!(
        "total: {} steps in {:.2} s ({:.0} steps/s)",
        steps,
        elapsed.as_secs_f64(),
        steps as f64 / elapsed.as_secs_f64()
    );

    pool.shutdown()?;
    Ok(())
}
