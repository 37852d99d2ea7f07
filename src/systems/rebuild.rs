use crate::agent::Agent;
use crate::debug::{SystemTimers, TickPhase};
use crate::spatial::SpatialGrid;

/// Rebuild the grid from current positions.
///
/// Only agents strictly inside the world are inserted. Only cells recorded on agents are cleared, so the cost scales with the
/// population rather than the grid. Agents outside the world are left out of
/// the grid (and out of every interaction) until they come back in bounds.
pub fn rebuild(agents: &mut [Agent], grid: &mut SpatialGrid, timers: &mut SystemTimers) {
    timers.begin();
    for agent in agents.iter() {
        if let Some(cell) = agent.current_cell {
            grid.clear(cell);
        }
    }
    timers.end(TickPhase::GridClear);

    timers.begin();
    for agent in agents.iter_mut() {
        let pos = agent.position;
        agent.current_cell = if grid.contains(pos.x, pos.y) {
            Some(grid.insert(pos.x, pos.y, agent.id))
        } else {
            None
        };
    }
    timers.end(TickPhase::GridInsert);
}
