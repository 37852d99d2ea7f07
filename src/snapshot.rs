use glam::DVec2;

use crate::agent::{Agent, AgentId, Role};

/// Read-only view of one agent for observers (renderers, recorders).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub position: DVec2,
    pub velocity: DVec2,
    pub role: Role,
}

impl From<&Agent> for AgentSnapshot {
    fn from(agent: &Agent) -> Self {
        Self {
            id: agent.id,
            position: agent.position,
            velocity: agent.velocity,
            role: agent.role,
        }
    }
}

/// Lazy pass over every agent in id order. Clone it to restart from the
/// same point, or ask the engine for a fresh one.
#[derive(Clone)]
pub struct Snapshot<'a> {
    agents: std::slice::Iter<'a, Agent>,
}

impl<'a> Snapshot<'a> {
    pub(crate) fn new(agents: &'a [Agent]) -> Self {
        Self {
            agents: agents.iter(),
        }
    }
}

impl Iterator for Snapshot<'_> {
    type Item = AgentSnapshot;

    fn next(&mut self) -> Option<Self::Item> {
        self.agents.next().map(AgentSnapshot::from)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.agents.size_hint()
    }
}

impl ExactSizeIterator for Snapshot<'_> {}
