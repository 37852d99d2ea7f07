//! Multithreaded Vicsek swarm with factions, obstacles and bases.
//!
//! Agents live on a toroidal world. Each tick the engine rebuilds a uniform
//! grid (cell size = interaction radius), accumulates neighbor forces in two
//! barrier-separated waves over column slices, then updates kinematics and
//! roles in parallel. See [`PhysicsEngine::tick`].

pub mod agent;
pub mod config;
pub mod debug;
pub mod engine;
pub mod environment;
pub mod error;
pub mod snapshot;
pub mod spatial;
pub mod store;
pub mod systems;
pub mod workers;

pub use agent::{Agent, AgentId, CellId, Role, RoleTrigger};
pub use config::EngineConfig;
pub use engine::PhysicsEngine;
pub use environment::{Base, Environment};
pub use error::{ConfigError, ConfigResult};
pub use snapshot::{AgentSnapshot, Snapshot};
pub use spatial::SpatialGrid;
pub use store::AgentStore;
pub use workers::{TaskBatch, WorkerPool};

/// Build an engine from the essentials, leaving every tunable at its default.
pub fn init_engine(
    world_width: f64,
    world_height: f64,
    interaction_radius: f64,
    worker_count: usize,
    bases: Vec<Base>,
    seed: u64,
) -> ConfigResult<PhysicsEngine> {
    PhysicsEngine::new(
        EngineConfig::new(world_width, world_height, interaction_radius)
            .with_workers(worker_count)
            .with_bases(bases)
            .with_seed(seed),
    )
}
