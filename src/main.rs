use instant::Instant;
use vicsek_swarm::{EngineConfig, PhysicsEngine, Role};

/// Fixed simulation step (seconds per tick).
const TICK_RATE: f64 = 1.0 / 60.0;
/// How many neutral agents to scatter on startup.
const INITIAL_AGENT_COUNT: usize = 5000;
/// Obstacles scattered alongside them.
const OBSTACLE_COUNT: usize = 50;
/// Ticks to run before exiting.
const TICK_LIMIT: u64 = 3600;
/// How often to log the tick rate (seconds).
const STATS_LOG_INTERVAL: f64 = 5.0;

// ---------------------------------------------------------------------------
// Tick timing
// ---------------------------------------------------------------------------

struct TickStats {
    last_log_time: Instant,
    tick_time_sum: f64,
    tick_time_min: f64,
    tick_time_max: f64,
    ticks_since_log: u32,
}

impl TickStats {
    fn new() -> Self {
        Self {
            last_log_time: Instant::now(),
            tick_time_sum: 0.0,
            tick_time_min: f64::MAX,
            tick_time_max: 0.0,
            ticks_since_log: 0,
        }
    }

    fn record_tick(&mut self, engine: &PhysicsEngine, dt: f64) {
        self.ticks_since_log += 1;
        self.tick_time_sum += dt;
        self.tick_time_min = self.tick_time_min.min(dt);
        self.tick_time_max = self.tick_time_max.max(dt);

        let elapsed = self.last_log_time.elapsed().as_secs_f64();
        if elapsed >= STATS_LOG_INTERVAL {
            let avg_ms = (self.tick_time_sum / self.ticks_since_log as f64) * 1000.0;
            let tps = self.ticks_since_log as f64 / elapsed;
            log::info!(
                "TPS: {:.0} | avg: {:.2}ms | min: {:.2}ms | max: {:.2}ms | total ticks: {}",
                tps,
                avg_ms,
                self.tick_time_min * 1000.0,
                self.tick_time_max * 1000.0,
                engine.tick_count(),
            );
            for phase in vicsek_swarm::debug::TickPhase::ALL {
                log::debug!("  {:<12} {:>8.1}us", phase.label(), engine.timers().phase_us(phase));
            }
            self.last_log_time = Instant::now();
            self.tick_time_sum = 0.0;
            self.tick_time_min = f64::MAX;
            self.tick_time_max = 0.0;
            self.ticks_since_log = 0;
        }
    }
}

fn census(engine: &PhysicsEngine) -> [usize; 4] {
    let mut counts = [0usize; 4];
    for agent in engine.snapshot() {
        counts[agent.role as usize] += 1;
    }
    counts
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = PhysicsEngine::new(EngineConfig::default())?;
    engine.spawn_scattered(INITIAL_AGENT_COUNT, Role::Neutral);
    engine.spawn_scattered(OBSTACLE_COUNT, Role::Obstacle);
    log::info!("Spawned {} agents", engine.len());

    let mut stats = TickStats::new();
    while engine.tick_count() < TICK_LIMIT {
        let start = Instant::now();
        engine.tick(TICK_RATE);
        stats.record_tick(&engine, start.elapsed().as_secs_f64());
    }

    let [neutral, obstacle, faction_a, faction_b] = census(&engine);
    log::info!(
        "Finished {} ticks ({:.0} TPS over last {} ticks, worst {:.2}ms) | neutral {} | obstacle {} | A {} | B {}",
        engine.tick_count(),
        engine.history().ticks_per_second(),
        engine.history().samples().count(),
        engine.history().worst_seconds() * 1000.0,
        neutral,
        obstacle,
        faction_a,
        faction_b,
    );
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("vicsek-swarm starting up");

    if let Err(e) = run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
