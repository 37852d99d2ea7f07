use glam::DVec2;

use crate::agent::{rescale, Agent, AgentId, Role, RoleTrigger};
use crate::environment::Environment;
use crate::workers::WorkerPool;

/// Per-tick inputs shared by every agent update.
#[derive(Debug, Clone, Copy)]
pub struct StepParams {
    pub dt: f64,
    pub world_size: DVec2,
    pub annealing_step: f64,
    pub seed: u64,
    pub tick: u64,
}

/// Kinematic and role update for every agent, range-partitioned across workers.
/// No agent reads another here, so the partition needs no further care.
pub fn update(agents: &mut [Agent], env: &Environment, pool: &WorkerPool, params: &StepParams) {
    pool.dispatch_mut(agents, |_, chunk| {
        for agent in chunk {
            update_agent(agent, env, params);
        }
    });
}

/// Advance one agent by one tick. Obstacles are left untouched.
pub fn update_agent(agent: &mut Agent, env: &Environment, params: &StepParams) {
    if agent.is_frozen() {
        return;
    }

    // Vicsek step: neighbors, renormalize, noise, renormalize.
    agent.velocity = rescale(agent.velocity + agent.pending_velocity, agent.speed_target);
    let mut rng = fastrand::Rng::with_seed(noise_seed(params.seed, params.tick, agent.id));
    let angle = rng.f64() * std::f64::consts::TAU;
    agent.velocity += DVec2::from_angle(angle) * agent.noise_amplitude;
    agent.velocity = rescale(agent.velocity, agent.speed_target);

    agent.position = wrap(agent.position + agent.velocity * params.dt, params.world_size);
    agent.pending_velocity = DVec2::ZERO;

    env.detect_base_transition(agent);

    if agent.role != Role::Neutral {
        agent.annealing_timer -= params.annealing_step;
        if agent.annealing_timer < 0.0 {
            agent.apply_trigger(RoleTrigger::AnnealingExpired);
        }
    }

    if agent.commit_role() {
        log::trace!("agent {} is now {}", agent.id, agent.role.label());
    }
}

/// Wrap a position into `[0, w) x [0, h)`.
pub fn wrap(position: DVec2, size: DVec2) -> DVec2 {
    DVec2::new(wrap_axis(position.x, size.x), wrap_axis(position.y, size.y))
}

fn wrap_axis(value: f64, len: f64) -> f64 {
    let wrapped = value.rem_euclid(len);
    // rem_euclid rounds tiny negatives up to exactly `len`.
    if wrapped >= len {
        0.0
    } else {
        wrapped
    }
}

/// Per-agent, per-tick noise seed. Independent of which worker runs the
/// agent, so noise is identical for any worker count.
fn noise_seed(seed: u64, tick: u64, id: AgentId) -> u64 {
    // splitmix64 finalizer over the combined key.
    let mut z = seed
        ^ tick.wrapping_mul(0x9E37_79B9_7F4A_7C15)
        ^ (id as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
