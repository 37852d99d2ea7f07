use std::ops::Range;

use glam::DVec2;
use instant::Instant;

use crate::agent::{Agent, AgentId, Role};
use crate::config::EngineConfig;
use crate::debug::{SystemTimers, TickHistory, TickPhase};
use crate::environment::Environment;
use crate::error::ConfigResult;
use crate::snapshot::Snapshot;
use crate::spatial::SpatialGrid;
use crate::store::AgentStore;
use crate::systems::{forces, kinematics, rebuild};
use crate::workers::WorkerPool;

/// Initial velocity components of scattered agents are drawn from `[-v, v)`.
const SCATTER_VELOCITY: f64 = 5.0;

/// Owns the whole simulation: agents, grid, rules, workers, RNG and timers.
///
/// Observers only ever get shared references or snapshots; every mutation
/// goes through the engine.
pub struct PhysicsEngine {
    config: EngineConfig,
    store: AgentStore,
    grid: SpatialGrid,
    env: Environment,
    pool: WorkerPool,
    /// Column ranges for the two-wave force pass.
    slices: Vec<Range<usize>>,
    /// Placement RNG (deterministic per seed).
    rng: fastrand::Rng,
    timers: SystemTimers,
    history: TickHistory,
    tick_count: u64,
}

impl PhysicsEngine {
    pub fn new(config: EngineConfig) -> ConfigResult<Self> {
        config.validate()?;

        let grid = SpatialGrid::new(
            config.world_width,
            config.world_height,
            config.interaction_radius,
        )?;
        let pool = WorkerPool::new(config.worker_count)?;
        let slices = forces::column_slices(grid.width(), pool.workers());
        log::debug!(
            "force pass: {} column slices over {} columns",
            slices.len(),
            grid.width()
        );

        log::info!(
            "engine ready: {}x{} world, radius {}, {} workers, {} bases, seed {}",
            config.world_width,
            config.world_height,
            config.interaction_radius,
            config.worker_count,
            config.bases.len(),
            config.seed
        );

        Ok(Self {
            env: Environment::new(&config),
            rng: fastrand::Rng::with_seed(config.seed),
            store: AgentStore::with_capacity(1024),
            grid,
            pool,
            slices,
            timers: SystemTimers::new(),
            history: TickHistory::new(),
            tick_count: 0,
            config,
        })
    }

    // -----------------------------------------------------------------------
    // Population
    // -----------------------------------------------------------------------

    /// Add an agent with the configured speed and noise. Velocity starts at zero.
    pub fn create_agent(&mut self, position: DVec2, role: Role) -> AgentId {
        self.store.create(
            position,
            role,
            self.config.speed_target,
            self.config.noise_amplitude,
        )
    }

    /// Place `count` agents uniformly over the world with small random
    /// velocities, drawn from the engine's seeded RNG.
    pub fn spawn_scattered(&mut self, count: usize, role: Role) -> Vec<AgentId> {
        let mut ids = Vec::with_capacity(count);
        for _ in 0..count {
            let position = DVec2::new(
                self.rng.f64() * self.config.world_width,
                self.rng.f64() * self.config.world_height,
            );
            let velocity = DVec2::new(
                (self.rng.f64() * 2.0 - 1.0) * SCATTER_VELOCITY,
                (self.rng.f64() * 2.0 - 1.0) * SCATTER_VELOCITY,
            );
            let id = self.create_agent(position, role);
            if let Some(agent) = self.store.get_mut(id) {
                agent.velocity = velocity;
            }
            ids.push(id);
        }
        log::debug!("scattered {} {} agents", count, role.label());
        ids
    }

    /// Set an agent's velocity. Returns false for an unknown id.
    pub fn set_velocity(&mut self, id: AgentId, velocity: DVec2) -> bool {
        self.edit(id, |agent| agent.velocity = velocity)
    }

    pub fn set_speed_target(&mut self, id: AgentId, speed: f64) -> bool {
        self.edit(id, |agent| agent.speed_target = speed)
    }

    pub fn set_noise_amplitude(&mut self, id: AgentId, noise: f64) -> bool {
        self.edit(id, |agent| agent.noise_amplitude = noise)
    }

    pub fn set_annealing_timer(&mut self, id: AgentId, timer: f64) -> bool {
        self.edit(id, |agent| agent.annealing_timer = timer)
    }

    fn edit(&mut self, id: AgentId, f: impl FnOnce(&mut Agent)) -> bool {
        match self.store.get_mut(id) {
            Some(agent) => {
                f(agent);
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Tick pipeline
    // -----------------------------------------------------------------------

    /// Advance the simulation by one fixed step.
    pub fn tick(&mut self, dt: f64) {
        let start = Instant::now();

        // 1. Grid rebuild (single-threaded)
        self.rebuild_grid();

        // 2. Neighbor forces (two waves over column slices)
        self.accumulate_forces();

        // 3. Kinematics + roles (range-partitioned)
        self.update_agents(dt);

        self.tick_count += 1;
        let elapsed = start.elapsed().as_secs_f64();
        self.history.record(elapsed);
        log::trace!("tick {} done in {:.3}ms", self.tick_count, elapsed * 1000.0);
    }

    /// Step 1: clear recorded cells and re-insert every in-bounds agent.
    pub fn rebuild_grid(&mut self) {
        rebuild::rebuild(self.store.as_mut_slice(), &mut self.grid, &mut self.timers);
    }

    /// Step 2: sum neighbor forces into `pending_velocity`.
    pub fn accumulate_forces(&mut self) {
        self.timers.begin();
        forces::accumulate(
            self.store.as_mut_slice(),
            &self.grid,
            &self.env,
            &self.pool,
            &self.slices,
        );
        self.timers.end(TickPhase::Forces);
    }

    /// Step 3: integrate velocities and positions, then resolve role changes.
    pub fn update_agents(&mut self, dt: f64) {
        let params = kinematics::StepParams {
            dt,
            world_size: DVec2::new(self.config.world_width, self.config.world_height),
            annealing_step: self.config.annealing_step,
            seed: self.config.seed,
            tick: self.tick_count,
        };
        self.timers.begin();
        kinematics::update(self.store.as_mut_slice(), &self.env, &self.pool, &params);
        self.timers.end(TickPhase::Kinematics);
    }

    // -----------------------------------------------------------------------
    // Observation
    // -----------------------------------------------------------------------

    /// Lazy, restartable pass over (id, position, velocity, role).
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot::new(self.store.as_slice())
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.store.get(id)
    }

    pub fn agents(&self) -> &[Agent] {
        self.store.as_slice()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn workers(&self) -> usize {
        self.pool.workers()
    }

    pub fn column_slices(&self) -> &[Range<usize>] {
        &self.slices
    }

    pub fn timers(&self) -> &SystemTimers {
        &self.timers
    }

    pub fn history(&self) -> &TickHistory {
        &self.history
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
