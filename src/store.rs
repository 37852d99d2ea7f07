use glam::DVec2;

use crate::agent::{Agent, AgentId, Role};

/// Append-only agent container. An agent's id is its slot index, so lookups
/// are O(1) and ids never move. There is no removal.
pub struct AgentStore {
    agents: Vec<Agent>,
}

impl AgentStore {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            agents: Vec::with_capacity(cap),
        }
    }

    /// Append a new agent and return its id.
    pub fn create(
        &mut self,
        position: DVec2,
        role: Role,
        speed_target: f64,
        noise_amplitude: f64,
    ) -> AgentId {
        let id = self.agents.len() as AgentId;
        self.agents
            .push(Agent::new(id, position, role, speed_target, noise_amplitude));
        id
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id as usize)
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id as usize)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Iterate in insertion (= id) order.
    pub fn iter(&self) -> std::slice::Iter<'_, Agent> {
        self.agents.iter()
    }

    pub fn as_slice(&self) -> &[Agent] {
        &self.agents
    }

    pub fn as_mut_slice(&mut self) -> &mut [Agent] {
        &mut self.agents
    }
}
