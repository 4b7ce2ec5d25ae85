use std::path::PathBuf;

use glimpse_core::Environment;
use glimpse_envs::{SlideConfig, SlideEnv, SlideError, SlideRecord};

/// Write a small deterministic RGB gradient to a temp PNG and return its
/// path. `name` keeps per-test files apart.
fn gradient_png(name: &str, width: u32, height: u32) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("glimpse-envs-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join(format!("{}.png", name));
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([x as u8, y as u8, (x ^ y) as u8])
    });
    img.save(&path).expect("save temp png");
    path
}

fn config_for(path: PathBuf, label: i32) -> SlideConfig {
    SlideConfig::new(vec![SlideRecord { path, label }], (16, 16), 4)
}

#[test]
fn empty_dataset_is_rejected() {
    let err = SlideEnv::new(SlideConfig::new(vec![], (16, 16), 4)).unwrap_err();
    assert!(matches!(err, SlideError::InvalidConfig { .. }));
}

#[test]
fn zero_sized_view_is_rejected() {
    let path = gradient_png("zero-view", 64, 48);
    let err = SlideEnv::new(SlideConfig::new(
        vec![SlideRecord { path, label: 0 }],
        (0, 16),
        4,
    ))
    .unwrap_err();
    assert!(matches!(err, SlideError::InvalidConfig { .. }));
}

#[test]
fn zero_episode_length_is_rejected() {
    let path = gradient_png("zero-len", 64, 48);
    let err = SlideEnv::new(SlideConfig::new(
        vec![SlideRecord { path, label: 0 }],
        (16, 16),
        0,
    ))
    .unwrap_err();
    assert!(matches!(err, SlideError::InvalidConfig { .. }));
}

#[test]
fn reset_serves_a_fresh_episode() {
    let path = gradient_png("reset", 64, 48);
    let mut env = SlideEnv::with_seed(config_for(path, 3), 11).unwrap();

    let step = env.reset().unwrap();
    assert_eq!(step.obs.bands(), 3);
    assert_eq!(step.obs.height(), 16);
    assert_eq!(step.obs.width(), 16);
    assert_eq!(step.reward, 0.0);
    assert!(!step.done);
    assert!(!step.truncated);
    assert_eq!(step.info.timestep, 0);
    assert_eq!(step.info.target, 3);
    assert!(!env.is_done());
}

#[test]
fn episode_ends_after_max_glimpses() {
    let path = gradient_png("episode-end", 64, 48);
    let mut env = SlideEnv::with_seed(config_for(path, 0), 5).unwrap();
    env.reset().unwrap();

    for expected in 1..=4u32 {
        let step = env.step(&[0.0, 0.0]).unwrap();
        assert_eq!(step.info.timestep, expected);
        assert_eq!(step.reward, 0.0);
        assert!(!step.truncated);
        assert_eq!(step.done, expected == 4);
    }
    assert!(env.is_done());

    // A new episode starts counting from zero again.
    let step = env.reset().unwrap();
    assert_eq!(step.info.timestep, 0);
    assert!(!env.is_done());
}

#[test]
fn corner_glimpse_is_pixel_exact() {
    let path = gradient_png("corner", 64, 48);
    let mut env = SlideEnv::with_seed(config_for(path, 0), 0).unwrap();
    env.reset().unwrap();

    // [1, 1] anchors the view at the bottom-right corner: left = 64 - 16,
    // top = 48 - 16.
    let step = env.step(&[1.0, 1.0]).unwrap();
    for y in 0..16usize {
        for x in 0..16usize {
            let sx = (48 + x) as u8;
            let sy = (32 + y) as u8;
            assert_eq!(step.obs.get(0, y, x), sx, "red at ({}, {})", y, x);
            assert_eq!(step.obs.get(1, y, x), sy, "green at ({}, {})", y, x);
            assert_eq!(step.obs.get(2, y, x), sx ^ sy, "blue at ({}, {})", y, x);
        }
    }
}

#[test]
fn step_before_reset_is_an_error() {
    let path = gradient_png("no-reset", 64, 48);
    let mut env = SlideEnv::new(config_for(path, 0)).unwrap();
    assert!(matches!(
        env.step(&[0.0, 0.0]).unwrap_err(),
        SlideError::NotReset
    ));
}

#[test]
fn oversized_view_fails_at_reset() {
    let path = gradient_png("oversized", 32, 32);
    let config = SlideConfig::new(vec![SlideRecord { path, label: 0 }], (64, 64), 4);
    let mut env = SlideEnv::new(config).unwrap();
    assert!(matches!(
        env.reset().unwrap_err(),
        SlideError::ViewExceedsImage { .. }
    ));
}

#[test]
fn unreadable_file_fails_at_reset() {
    let config = SlideConfig::new(
        vec![SlideRecord {
            path: PathBuf::from("/nonexistent/glimpse/slide.png"),
            label: 0,
        }],
        (16, 16),
        4,
    );
    let mut env = SlideEnv::new(config).unwrap();
    let err = env.reset().unwrap_err();
    assert!(matches!(err, SlideError::ImageRead { .. }));
    // The decode failure is chained as the error source.
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn same_seed_replays_identical_episodes() {
    let path = gradient_png("determinism", 64, 48);
    let config = config_for(path, 1);
    let mut a = SlideEnv::with_seed(config.clone(), 99).unwrap();
    let mut b = SlideEnv::with_seed(config, 99).unwrap();

    let first_a = a.reset().unwrap();
    let first_b = b.reset().unwrap();
    assert_eq!(first_a.obs, first_b.obs);

    let step_a = a.step(&[0.25, -0.75]).unwrap();
    let step_b = b.step(&[0.25, -0.75]).unwrap();
    assert_eq!(step_a.obs, step_b.obs);
    assert_eq!(step_a.info, step_b.info);
}

#[test]
fn config_round_trips_through_json() {
    let config = SlideConfig::new(
        vec![
            SlideRecord {
                path: PathBuf::from("slides/a.png"),
                label: 0,
            },
            SlideRecord {
                path: PathBuf::from("slides/b.png"),
                label: 1,
            },
        ],
        (256, 256),
        100,
    );
    let json = serde_json::to_string(&config).unwrap();
    let parsed: SlideConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.dataset, config.dataset);
    assert_eq!(parsed.view_size, config.view_size);
    assert_eq!(parsed.max_episode_len, config.max_episode_len);
}
