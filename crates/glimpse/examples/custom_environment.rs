//! Custom Environment Example - LineWalk
//!
//! Demonstrates how to implement a custom environment and drive a pool of
//! them. LineWalk is a tiny 1-D task: the agent starts at the origin and
//! nudges its position left or right each step, trying to reach +1.
//!
//! Run with: `cargo run --example custom_environment`

use std::fmt;

use glimpse::{Action, EnvPool, Environment, Step};

/// Walk a point along a line until it reaches the goal or runs out of steps.
struct LineWalk {
    position: f32,
    steps: u32,
    max_steps: u32,
}

impl LineWalk {
    fn new(max_steps: u32) -> Self {
        Self {
            position: 0.0,
            steps: 0,
            max_steps,
        }
    }
}

#[derive(Debug)]
struct WalkError;

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "walk failed")
    }
}

impl std::error::Error for WalkError {}

impl Environment for LineWalk {
    type Action = f32;
    type Observation = f32;
    type Info = u32;
    type Error = WalkError;

    fn reset(&mut self) -> Result<Step<f32, u32>, WalkError> {
        self.position = 0.0;
        self.steps = 0;
        Ok(Step {
            obs: 0.0,
            reward: 0.0,
            done: false,
            truncated: false,
            info: 0,
        })
    }

    fn step(&mut self, action: &f32) -> Result<Step<f32, u32>, WalkError> {
        self.position = (self.position + action.clamp(-0.1, 0.1)).clamp(-1.0, 1.0);
        self.steps += 1;

        let reached_goal = self.position >= 1.0;
        let out_of_steps = self.steps >= self.max_steps;
        Ok(Step {
            obs: self.position,
            reward: if reached_goal { 1.0 } else { -0.01 },
            done: reached_goal,
            truncated: out_of_steps && !reached_goal,
            info: self.steps,
        })
    }

    fn is_done(&self) -> bool {
        self.position >= 1.0 || self.steps >= self.max_steps
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let num_envs = 4;
    let mut pool = EnvPool::new(num_envs, |_| Ok(LineWalk::new(50)))?;

    // Start every episode, then collect the initial observations.
    pool.reset()?;
    let mut replies = pool.recv()?;

    let mut finished = 0usize;
    while finished < 20 {
        // Always walk right; every episode ends at the goal.
        let actions = replies.iter().map(|_| Action::step(0.1)).collect();
        replies = pool.step(actions)?;

        for reply in &replies {
            let step = reply.data.as_ref().expect("walk never fails");
            if step.episode_over() {
                finished += 1;
                println!(
                    "env {} finished an episode after {} steps (reward {})",
                    reply.env_id, step.info, step.reward
                );
            }
        }
    }

    pool.shutdown()?;
    Ok(())
}
