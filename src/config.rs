use glam::DVec2;

use crate::agent::Role;
use crate::environment::Base;
use crate::error::{require_non_negative, require_positive, ConfigError, ConfigResult};

/// Repulsion constant K for obstacle forces (`separation * K / distance^2`).
pub const DEFAULT_OBSTACLE_REPULSION: f64 = 1000.0;
/// Annealing timer decrement per tick.
pub const DEFAULT_ANNEALING_STEP: f64 = 0.001;
/// Speed every new agent is renormalized to.
pub const DEFAULT_SPEED_TARGET: f64 = 50.0;
/// Length of the per-tick noise vector for new agents.
pub const DEFAULT_NOISE_AMPLITUDE: f64 = 30.0;

/// Everything the engine needs at construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub world_width: f64,
    pub world_height: f64,
    /// Interaction radius; also the grid cell size.
    pub interaction_radius: f64,
    pub worker_count: usize,
    /// Checked in order; the last base containing an agent wins.
    pub bases: Vec<Base>,
    /// RNG seed for placement and noise.
    pub seed: u64,
    pub obstacle_repulsion: f64,
    pub annealing_step: f64,
    pub speed_target: f64,
    pub noise_amplitude: f64,
    /// Weight of the same-role alignment term. 0 leaves same-role pairs inert.
    pub alignment_weight: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            world_width: 300.0,
            world_height: 300.0,
            interaction_radius: 5.0,
            worker_count: 10,
            bases: vec![
                Base::new(DVec2::new(280.0, 150.0), 5.0, Role::FactionA),
                Base::new(DVec2::new(150.0, 150.0), 5.0, Role::FactionB),
            ],
            seed: 42,
            obstacle_repulsion: DEFAULT_OBSTACLE_REPULSION,
            annealing_step: DEFAULT_ANNEALING_STEP,
            speed_target: DEFAULT_SPEED_TARGET,
            noise_amplitude: DEFAULT_NOISE_AMPLITUDE,
            alignment_weight: 0.0,
        }
    }
}

impl EngineConfig {
    /// Config for a world of the given size and radius, everything else default.
    pub fn new(world_width: f64, world_height: f64, interaction_radius: f64) -> Self {
        Self {
            world_width,
            world_height,
            interaction_radius,
            ..Self::default()
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.worker_count = workers;
        self
    }

    pub fn with_bases(mut self, bases: Vec<Base>) -> Self {
        self.bases = bases;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_obstacle_repulsion(mut self, k: f64) -> Self {
        self.obstacle_repulsion = k;
        self
    }

    pub fn with_annealing_step(mut self, step: f64) -> Self {
        self.annealing_step = step;
        self
    }

    pub fn with_speed_target(mut self, speed: f64) -> Self {
        self.speed_target = speed;
        self
    }

    pub fn with_noise_amplitude(mut self, noise: f64) -> Self {
        self.noise_amplitude = noise;
        self
    }

    pub fn with_alignment_weight(mut self, weight: f64) -> Self {
        self.alignment_weight = weight;
        self
    }

    /// Check every parameter. Called by the engine before anything is built.
    pub fn validate(&self) -> ConfigResult<()> {
        require_positive("world width", self.world_width)?;
        require_positive("world height", self.world_height)?;
        require_positive("interaction radius", self.interaction_radius)?;
        if self.worker_count == 0 {
            return Err(ConfigError::NoWorkers);
        }
        require_non_negative("obstacle repulsion", self.obstacle_repulsion)?;
        require_non_negative("annealing step", self.annealing_step)?;
        require_non_negative("speed target", self.speed_target)?;
        require_non_negative("noise amplitude", self.noise_amplitude)?;
        require_non_negative("alignment weight", self.alignment_weight)?;

        for (index, base) in self.bases.iter().enumerate() {
            let reason = if !base.center.is_finite() {
                Some("center is not finite")
            } else if !(base.radius.is_finite() && base.radius >= 0.0) {
                Some("radius must be a non-negative finite number")
            } else if base.role == Role::Obstacle {
                Some("bases cannot convert agents into obstacles")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(ConfigError::InvalidBase { index, reason });
            }
        }
        Ok(())
    }
}
