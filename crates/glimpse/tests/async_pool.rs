//! End-to-end rounds: the pool engine driving real slide environments.

use std::path::PathBuf;

use glimpse::{
    Action, EnvPool, PoolConfig, ResetCause, SlideConfig, SlideEnv, SlideError, SlideRecord,
};

fn gradient_png(name: &str, width: u32, height: u32) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("glimpse-pool-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    let path = dir.join(format!("{}.png", name));
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([x as u8, y as u8, (x ^ y) as u8])
    });
    img.save(&path).expect("save temp png");
    path
}

fn slide_config(name: &str, max_episode_len: u32) -> SlideConfig {
    SlideConfig::new(
        vec![SlideRecord {
            path: gradient_png(name, 96, 96),
            label: 7,
        }],
        (32, 32),
        max_episode_len,
    )
}

fn glance_batch(n: usize) -> Vec<Action<[f32; 2]>> {
    (0..n).map(|_| Action::step([0.0, 0.0])).collect()
}

#[test]
fn pool_round_trip_over_slides() {
    let config = slide_config("round-trip", 10);
    let mut pool = EnvPool::new(4, |env_id| SlideEnv::with_seed(config.clone(), env_id as u64))
        .expect("build pool");

    pool.reset().expect("reset");
    let first = pool.recv().expect("recv");
    assert_eq!(first.len(), 4);
    for (i, reply) in first.iter().enumerate() {
        assert_eq!(reply.env_id, i);
        assert_eq!(reply.restarted, Some(ResetCause::Forced));
        let step = reply.data.as_ref().expect("reset result");
        assert_eq!(step.obs.bands(), 3);
        assert_eq!(step.obs.height(), 32);
        assert_eq!(step.obs.width(), 32);
        assert_eq!(step.info.timestep, 0);
        assert_eq!(step.info.target, 7);
    }

    for round in 1..=3u32 {
        let replies = pool.step(glance_batch(4)).expect("round");
        for reply in &replies {
            let step = reply.data.as_ref().expect("step result");
            assert_eq!(step.info.timestep, round);
            assert_eq!(step.reward, 0.0);
        }
    }

    pool.shutdown().expect("shutdown");
}

#[test]
fn episodes_restart_transparently_at_their_limit() {
    let config = slide_config("restart", 2);
    let mut pool =
        EnvPool::new(2, |env_id| SlideEnv::with_seed(config.clone(), env_id as u64)).unwrap();

    pool.reset().unwrap();
    pool.recv().unwrap();

    // Two glimpses exhaust the episode.
    pool.step(glance_batch(2)).unwrap();
    let replies = pool.step(glance_batch(2)).unwrap();
    for reply in &replies {
        assert!(reply.data.as_ref().unwrap().done);
    }

    // The next round restarts every episode without an explicit reset.
    let replies = pool.step(glance_batch(2)).unwrap();
    for reply in &replies {
        assert_eq!(reply.restarted, Some(ResetCause::EpisodeDone));
        assert_eq!(reply.data.as_ref().unwrap().info.timestep, 0);
    }

    pool.shutdown().unwrap();
}

#[test]
fn broken_slide_only_breaks_its_own_slot() {
    let good = slide_config("isolated", 10);
    let bad = SlideConfig::new(
        vec![SlideRecord {
            path: PathBuf::from("/nonexistent/glimpse/slide.png"),
            label: 0,
        }],
        (32, 32),
        10,
    );

    let mut pool = EnvPool::new(3, |env_id| {
        let config = if env_id == 1 { bad.clone() } else { good.clone() };
        SlideEnv::with_seed(config, env_id as u64)
    })
    .unwrap();

    pool.reset().unwrap();
    let replies = pool.recv().unwrap();
    assert!(matches!(
        replies[1].data.as_ref().unwrap_err(),
        SlideError::ImageRead { .. }
    ));
    for i in [0usize, 2] {
        assert!(replies[i].data.is_ok(), "slot {} should be healthy", i);
    }

    // The healthy slots keep stepping on later rounds; the broken one keeps
    // reporting failures in-band (its episode never started, so stepping it
    // is itself an error).
    let replies = pool.step(glance_batch(3)).unwrap();
    assert!(replies[1].data.is_err());
    for i in [0usize, 2] {
        assert_eq!(replies[i].data.as_ref().unwrap().info.timestep, 1);
    }

    pool.shutdown().unwrap();
}

#[test]
fn bounded_pool_round_trips() {
    let config = slide_config("bounded", 10);
    let mut pool = EnvPool::with_config(PoolConfig::new(2).with_queue_capacity(2), |env_id| {
        SlideEnv::with_seed(config.clone(), env_id as u64)
    })
    .unwrap();

    pool.reset().unwrap();
    assert_eq!(pool.recv().unwrap().len(), 2);
    pool.shutdown().unwrap();
}
