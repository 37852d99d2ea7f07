use glam::DVec2;

/// Stable agent identity: index into the agent store, valid for the agent's lifetime.
pub type AgentId = u32;

/// Flat column-major index into the spatial grid.
pub type CellId = usize;

/// Value the annealing timer is reset to on every role change.
pub const ANNEALING_RESET: f64 = 1.0;

/// Behavioral role. Decides which pair forces apply and which pipeline
/// steps an agent takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Role {
    Neutral,
    /// Frozen: never moves, never transitions, still repels others.
    Obstacle,
    FactionA,
    FactionB,
}

impl Role {
    pub const ALL: [Role; 4] = [Self::Neutral, Self::Obstacle, Self::FactionA, Self::FactionB];

    pub fn label(self) -> &'static str {
        match self {
            Self::Neutral => "Neutral",
            Self::Obstacle => "Obstacle",
            Self::FactionA => "Faction A",
            Self::FactionB => "Faction B",
        }
    }

    pub fn is_faction(self) -> bool {
        matches!(self, Self::FactionA | Self::FactionB)
    }

    /// The faction this role is pulled against, if any.
    pub fn rival(self) -> Option<Role> {
        match self {
            Self::FactionA => Some(Self::FactionB),
            Self::FactionB => Some(Self::FactionA),
            Self::Neutral | Self::Obstacle => None,
        }
    }

    /// Role transition table. `None` means the trigger leaves the role alone.
    pub fn on_trigger(self, trigger: RoleTrigger) -> Option<Role> {
        match (self, trigger) {
            (Self::Obstacle, _) => None,
            (_, RoleTrigger::EnteredBase(Self::Obstacle)) => None,
            (_, RoleTrigger::EnteredBase(target)) => Some(target),
            (Self::FactionA | Self::FactionB, RoleTrigger::AnnealingExpired) => Some(Self::Neutral),
            (Self::Neutral, RoleTrigger::AnnealingExpired) => None,
        }
    }
}

/// Conditions that can schedule a role change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleTrigger {
    /// Agent is inside a base that converts to the given role.
    EnteredBase(Role),
    /// Annealing timer dropped below zero.
    AnnealingExpired,
}

/// One simulated particle.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub position: DVec2,
    pub velocity: DVec2,
    /// Neighbor forces summed during the current tick, folded into
    /// `velocity` by the kinematic update.
    pub pending_velocity: DVec2,
    pub role: Role,
    pub pending_role: Role,
    /// Counts down while in a faction; expiry reverts to Neutral.
    pub annealing_timer: f64,
    pub speed_target: f64,
    pub noise_amplitude: f64,
    /// Grid cell recorded by the last rebuild. `None` while out of bounds.
    pub current_cell: Option<CellId>,
}

impl Agent {
    pub fn new(
        id: AgentId,
        position: DVec2,
        role: Role,
        speed_target: f64,
        noise_amplitude: f64,
    ) -> Self {
        Self {
            id,
            position,
            velocity: DVec2::ZERO,
            pending_velocity: DVec2::ZERO,
            role,
            pending_role: role,
            annealing_timer: ANNEALING_RESET,
            speed_target,
            noise_amplitude,
            current_cell: None,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.role == Role::Obstacle
    }

    /// Schedule a role change if the transition table allows one.
    pub fn apply_trigger(&mut self, trigger: RoleTrigger) {
        if let Some(next) = self.role.on_trigger(trigger) {
            self.pending_role = next;
        }
    }

    /// Apply a scheduled role change: heading flips, timer resets.
    /// Returns true if the role changed.
    pub fn commit_role(&mut self) -> bool {
        if self.pending_role == self.role {
            return false;
        }
        self.velocity = -self.velocity;
        self.annealing_timer = ANNEALING_RESET;
        self.role = self.pending_role;
        true
    }
}

/// Scale `v` to `length`. A zero-length vector comes back unchanged.
#[inline]
pub fn rescale(v: DVec2, length: f64) -> DVec2 {
    let current = v.length();
    if current > 0.0 {
        v * (length / current)
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obstacle_ignores_every_trigger() {
        for role in Role::ALL {
            assert_eq!(Role::Obstacle.on_trigger(RoleTrigger::EnteredBase(role)), None);
        }
        assert_eq!(Role::Obstacle.on_trigger(RoleTrigger::AnnealingExpired), None);
    }

    #[test]
    fn bases_never_create_obstacles() {
        for role in Role::ALL {
            assert_eq!(role.on_trigger(RoleTrigger::EnteredBase(Role::Obstacle)), None);
        }
    }

    #[test]
    fn annealing_only_reverts_factions() {
        assert_eq!(Role::Neutral.on_trigger(RoleTrigger::AnnealingExpired), None);
        assert_eq!(
            Role::FactionA.on_trigger(RoleTrigger::AnnealingExpired),
            Some(Role::Neutral)
        );
        assert_eq!(
            Role::FactionB.on_trigger(RoleTrigger::AnnealingExpired),
            Some(Role::Neutral)
        );
    }

    #[test]
    fn rivals_are_symmetric() {
        assert_eq!(Role::FactionA.rival(), Some(Role::FactionB));
        assert_eq!(Role::FactionB.rival(), Some(Role::FactionA));
        assert_eq!(Role::Neutral.rival(), None);
        assert_eq!(Role::Obstacle.rival(), None);
    }

    #[test]
    fn commit_flips_heading_and_resets_timer() {
        let mut agent = Agent::new(0, DVec2::ZERO, Role::FactionA, 50.0, 30.0);
        agent.velocity = DVec2::new(3.0, -4.0);
        agent.annealing_timer = -0.0005;
        agent.apply_trigger(RoleTrigger::AnnealingExpired);

        assert!(agent.commit_role());
        assert_eq!(agent.role, Role::Neutral);
        assert_eq!(agent.velocity, DVec2::new(-3.0, 4.0));
        assert_eq!(agent.annealing_timer, ANNEALING_RESET);
        assert!(!agent.commit_role());
    }

    #[test]
    fn rescale_keeps_zero_vector() {
        assert_eq!(rescale(DVec2::ZERO, 50.0), DVec2::ZERO);
        let v = rescale(DVec2::new(3.0, 4.0), 10.0);
        assert!((v.length() - 10.0).abs() < 1e-12);
        assert!((v.x - 6.0).abs() < 1e-12);
    }
}
