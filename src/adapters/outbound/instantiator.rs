use crate::domains::crowd::{Agent, AgentId, Instantiator};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInstantiator;

impl Instantiator for NoopInstantiator {
    fn instantiate(&mut self, _agent: &Agent) {}
    fn destroy(&mut self, _agent: AgentId) {}
}

#[derive(Debug, Default, Clone)]
pub struct InstantiationLog {
    pub created: usize,
    pub destroyed: usize,
    pub live: HashSet<AgentId>,
}

/// Tracks which agents are materialized. Clones share the same log, so a test
/// can keep a handle after moving one into the simulation.
#[derive(Debug, Default, Clone)]
pub struct RecordingInstantiator {
    log: Arc<Mutex<InstantiationLog>>,
}

impl RecordingInstantiator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> InstantiationLog {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }
}

impl Instantiator for RecordingInstantiator {
    fn instantiate(&mut self, agent: &Agent) {
        if let Ok(mut log) = self.log.lock() {
            log.created += 1;
            log.live.insert(agent.id);
        }
    }

    fn destroy(&mut self, agent: AgentId) {
        if let Ok(mut log) = self.log.lock() {
            log.destroyed += 1;
            log.live.remove(&agent);
        }
    }
}
