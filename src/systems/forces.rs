use std::marker::PhantomData;
use std::ops::Range;

use glam::DVec2;

use crate::agent::{Agent, AgentId, CellId};
use crate::environment::Environment;
use crate::spatial::SpatialGrid;
use crate::workers::{split_range, WorkerPool};

/// Column slices for the force pass.
///
/// Aims for `2 * workers` slices so each wave keeps every worker busy. The
/// count is kept even (slice 0 and the last slice touch across the seam) and
/// never exceeds the column count, so every slice owns at least one column.
/// A single-column grid gets one slice.
pub fn column_slices(columns: usize, workers: usize) -> Vec<Range<usize>> {
    let wanted = 2 * workers.max(1);
    let count = if columns >= wanted {
        wanted
    } else if columns >= 2 {
        columns - columns % 2
    } else {
        1
    };
    split_range(columns, count).collect()
}

/// Raw view of the agent array for the force pass.
///
/// # Safety
///
/// Slice `i` only writes `pending_velocity` of agents sitting in its own
/// columns, and only reads agents in its columns plus one column either
/// side. Waves run even and odd slices separately, so no two slices running
/// at once are adjacent: an agent written by one task is never touched by
/// another task in the same wave. Nothing else accesses the array while
/// `accumulate` runs.
struct AgentsPtr<'a> {
    ptr: *mut Agent,
    len: usize,
    _borrow: PhantomData<&'a mut [Agent]>,
}

unsafe impl Send for AgentsPtr<'_> {}
unsafe impl Sync for AgentsPtr<'_> {}

impl<'a> AgentsPtr<'a> {
    fn new(agents: &'a mut [Agent]) -> Self {
        Self {
            ptr: agents.as_mut_ptr(),
            len: agents.len(),
            _borrow: PhantomData,
        }
    }

    #[inline(always)]
    unsafe fn get(&self, id: AgentId) -> &Agent {
        let idx = id as usize;
        debug_assert!(idx < self.len);
        &*self.ptr.add(idx)
    }

    #[inline(always)]
    unsafe fn add_pending(&self, id: AgentId, force: DVec2) {
        let idx = id as usize;
        debug_assert!(idx < self.len);
        let pending = std::ptr::addr_of_mut!((*self.ptr.add(idx)).pending_velocity);
        *pending += force;
    }
}

struct SliceSolver<'a> {
    agents: AgentsPtr<'a>,
    grid: &'a SpatialGrid,
    env: &'a Environment,
}

impl SliceSolver<'_> {
    fn solve_slice(&self, columns: Range<usize>) {
        for cell in self.grid.column_cells(columns) {
            let members = self.grid.cell(cell);
            if members.is_empty() {
                continue;
            }
            let (neighbors, count) = self.grid.distinct_neighbors_of(cell);
            for &id in members {
                // SAFETY: see `AgentsPtr`. `id` lives in this slice's columns.
                unsafe {
                    let force = self.force_on(id, &neighbors[..count]);
                    self.agents.add_pending(id, force);
                }
            }
        }
    }

    /// Sum of forces on `id` from every other agent in the neighbor cells.
    unsafe fn force_on(&self, id: AgentId, neighbors: &[CellId]) -> DVec2 {
        let me = self.agents.get(id);
        if me.is_frozen() {
            return DVec2::ZERO;
        }
        let mut force = DVec2::ZERO;
        for &cell in neighbors {
            for &other_id in self.grid.cell(cell) {
                if other_id != id {
                    force += self.env.interact(me, self.agents.get(other_id));
                }
            }
        }
        force
    }
}

/// Accumulate neighbor forces into each agent's `pending_velocity`.
///
/// Two waves: even-indexed column slices first, then odd-indexed, with a
/// barrier after each. Grid membership is read-only for the whole pass.
pub fn accumulate(
    agents: &mut [Agent],
    grid: &SpatialGrid,
    env: &Environment,
    pool: &WorkerPool,
    slices: &[Range<usize>],
) {
    let solver = SliceSolver {
        agents: AgentsPtr::new(agents),
        grid,
        env,
    };
    for wave in 0..2 {
        let solver = &solver;
        pool.batch(move |batch| {
            for columns in slices.iter().skip(wave).step_by(2) {
                batch.submit(move || solver.solve_slice(columns.clone()));
            }
        });
    }
}
