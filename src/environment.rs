use glam::DVec2;

use crate::agent::{Agent, Role, RoleTrigger};
use crate::config::EngineConfig;

/// Pairs closer than this are treated as coincident and skipped.
const MIN_SEPARATION: f64 = 0.01;
const MIN_SEPARATION_SQ: f64 = MIN_SEPARATION * MIN_SEPARATION;

/// Circular zone that converts non-obstacle agents to `role`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Base {
    pub center: DVec2,
    pub radius: f64,
    pub role: Role,
}

impl Base {
    pub fn new(center: DVec2, radius: f64, role: Role) -> Self {
        Self {
            center,
            radius,
            role,
        }
    }
}

/// Interaction rules and base layout. Built once from the config and shared
/// read-only with every worker.
#[derive(Debug, Clone)]
pub struct Environment {
    world_size: DVec2,
    interaction_radius: f64,
    obstacle_repulsion: f64,
    alignment_weight: f64,
    bases: Vec<Base>,
}

impl Environment {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            world_size: DVec2::new(config.world_width, config.world_height),
            interaction_radius: config.interaction_radius,
            obstacle_repulsion: config.obstacle_repulsion,
            alignment_weight: config.alignment_weight,
            bases: config.bases.clone(),
        }
    }

    pub fn interaction_radius(&self) -> f64 {
        self.interaction_radius
    }

    pub fn bases(&self) -> &[Base] {
        &self.bases
    }

    /// Shortest vector from `to` to `from` on the torus.
    pub fn separation(&self, from: DVec2, to: DVec2) -> DVec2 {
        let delta = from - to;
        delta - self.world_size * (delta / self.world_size).round()
    }

    /// Force that `other` exerts on an agent of role `role_self`.
    ///
    /// `separation` points from `other` to the receiving agent. Only the
    /// receiver's accumulator is ever touched with the result; `other` is
    /// borrowed immutably. Returns zero outside `(MIN_SEPARATION, radius)`.
    pub fn pairwise_force(
        &self,
        role_self: Role,
        other: &Agent,
        separation: DVec2,
        distance: f64,
    ) -> DVec2 {
        if distance >= self.interaction_radius || distance * distance <= MIN_SEPARATION_SQ {
            return DVec2::ZERO;
        }

        match (role_self, other.role) {
            // Frozen agents accumulate nothing.
            (Role::Obstacle, _) => DVec2::ZERO,
            (_, Role::Obstacle) => {
                separation * (self.obstacle_repulsion / (distance * distance))
            }
            (me, them) if me.rival() == Some(them) => -(other.velocity * other.annealing_timer),
            // Same-role alignment, inert at weight 0.
            (me, them) if me == them => other.velocity * self.alignment_weight,
            _ => DVec2::ZERO,
        }
    }

    /// Force on `agent` from `other`, including the separation and range checks.
    #[inline]
    pub fn interact(&self, agent: &Agent, other: &Agent) -> DVec2 {
        let separation = self.separation(agent.position, other.position);
        let distance = separation.length();
        self.pairwise_force(agent.role, other, separation, distance)
    }

    /// The role of the last configured base containing `position`.
    pub fn base_role_at(&self, position: DVec2) -> Option<Role> {
        self.bases
            .iter()
            .rev()
            .find(|base| self.separation(position, base.center).length() <= base.radius)
            .map(|base| base.role)
    }

    /// Schedule a role change for an agent standing in a base.
    pub fn detect_base_transition(&self, agent: &mut Agent) {
        if agent.is_frozen() {
            return;
        }
        if let Some(role) = self.base_role_at(agent.position) {
            agent.apply_trigger(RoleTrigger::EnteredBase(role));
        }
    }
}
