//! Agents and the world that owns them
//!
//! The world is the authoritative store of agents. Agents are addressed by
//! generational [`AgentId`] keys: once an agent dies its id never resolves
//! again, even if the underlying slot is reused by a newly created agent.
//! Iteration code relies on that to detect agents that died after a
//! snapshot was taken.

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};
use std::collections::BTreeMap;
use std::fmt;

use crate::vm::value::Value;

/// Agent collections
pub mod agentset;
/// Shuffled snapshot iteration over agent collections
pub mod shufflerator;

pub use agentset::AgentSet;
pub use shufflerator::Shufflerator;

new_key_type! {
    /// Stable handle to an agent owned by the [`World`].
    pub struct AgentId;
}

/// Kind of agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// The single observer
    Observer,
    /// Mobile agent
    Turtle,
    /// Grid cell
    Patch,
    /// Connection between turtles
    Link,
}

impl AgentKind {
    /// Type-tag bit for this kind
    pub fn bit(self) -> AgentBits {
        match self {
            AgentKind::Observer => AgentBits::OBSERVER,
            AgentKind::Turtle => AgentBits::TURTLE,
            AgentKind::Patch => AgentBits::PATCH,
            AgentKind::Link => AgentBits::LINK,
        }
    }

    /// Lowercase name used in diagnostics
    pub fn name(self) -> &'static str {
        match self {
            AgentKind::Observer => "observer",
            AgentKind::Turtle => "turtle",
            AgentKind::Patch => "patch",
            AgentKind::Link => "link",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bitmask of agent kinds, used as a runtime type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AgentBits(u8);

impl AgentBits {
    /// No kinds
    pub const NONE: AgentBits = AgentBits(0);
    /// Observer bit
    pub const OBSERVER: AgentBits = AgentBits(0b0001);
    /// Turtle bit
    pub const TURTLE: AgentBits = AgentBits(0b0010);
    /// Patch bit
    pub const PATCH: AgentBits = AgentBits(0b0100);
    /// Link bit
    pub const LINK: AgentBits = AgentBits(0b1000);
    /// Every kind
    pub const ALL: AgentBits = AgentBits(0b1111);

    /// Union of two masks
    pub const fn union(self, other: AgentBits) -> AgentBits {
        AgentBits(self.0 | other.0)
    }

    /// Whether every bit of `other` is set in `self`
    pub fn contains(self, other: AgentBits) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether `self` and `other` share at least one bit
    pub fn intersects(self, other: AgentBits) -> bool {
        self.0 & other.0 != 0
    }
}

/// An individual agent
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    /// Agent kind
    pub kind: AgentKind,
    /// Breed the agent currently belongs to
    pub breed: String,
    /// World-unique, monotonically assigned number
    pub who: u64,
    /// Agent-owned variables
    pub vars: BTreeMap<String, Value>,
}

/// Authoritative agent store
#[derive(Debug, Default)]
pub struct World {
    agents: SlotMap<AgentId, Agent>,
    /// Breed name -> members in creation order
    breeds: BTreeMap<String, Vec<AgentId>>,
    next_who: u64,
    output: Vec<String>,
}

impl World {
    /// Create an empty world
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new agent of the given kind in the given breed
    pub fn create_agent(&mut self, kind: AgentKind, breed: &str) -> AgentId {
        let who = self.next_who;
        self.next_who += 1;
        let id = self.agents.insert(Agent {
            kind,
            breed: breed.to_string(),
            who,
            vars: BTreeMap::new(),
        });
        self.breeds.entry(breed.to_string()).or_default().push(id);
        id
    }

    /// Create `count` turtles of the given breed
    pub fn create_turtles(&mut self, breed: &str, count: usize) -> Vec<AgentId> {
        (0..count)
            .map(|_| self.create_agent(AgentKind::Turtle, breed))
            .collect()
    }

    /// Remove an agent. Returns false if it was already dead.
    pub fn kill(&mut self, id: AgentId) -> bool {
        match self.agents.remove(id) {
            Some(agent) => {
                if let Some(members) = self.breeds.get_mut(&agent.breed) {
                    members.retain(|member| *member != id);
                }
                true
            }
            None => false,
        }
    }

    /// Whether the id still refers to a living agent
    pub fn is_alive(&self, id: AgentId) -> bool {
        self.agents.contains_key(id)
    }

    /// Look up an agent
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Look up an agent mutably
    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    /// Find a living agent by its who number
    pub fn find_by_who(&self, who: u64) -> Option<AgentId> {
        self.agents
            .iter()
            .find(|(_, agent)| agent.who == who)
            .map(|(id, _)| id)
    }

    /// Living members of a breed, in creation order
    pub fn breed_members(&self, breed: &str) -> &[AgentId] {
        self.breeds.get(breed).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of living agents
    pub fn count(&self) -> usize {
        self.agents.len()
    }

    /// Append a line to the output area
    pub fn push_output(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }

    /// Everything printed so far
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Human-readable description of an agent, e.g. `turtle 3`
    pub fn describe(&self, id: AgentId) -> String {
        match self.get(id) {
            Some(agent) => format!("{} {}", agent.kind, agent.who),
            None => "nobody".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kill_invalidates_id_even_after_slot_reuse() {
        let mut world = World::new();
        let first = world.create_agent(AgentKind::Turtle, "turtles");
        assert!(world.kill(first));
        assert!(!world.kill(first));

        let second = world.create_agent(AgentKind::Turtle, "turtles");
        assert!(!world.is_alive(first));
        assert!(world.is_alive(second));
        assert_eq!(world.breed_members("turtles"), &[second]);
    }

    #[test]
    fn test_who_numbers_are_monotonic() {
        let mut world = World::new();
        let ids = world.create_turtles("turtles", 3);
        world.kill(ids[1]);
        let fresh = world.create_agent(AgentKind::Turtle, "turtles");

        assert_eq!(world.get(fresh).unwrap().who, 3);
        assert_eq!(world.find_by_who(2), Some(ids[2]));
        assert_eq!(world.find_by_who(1), None);
        assert_eq!(world.describe(ids[0]), "turtle 0");
        assert_eq!(world.describe(ids[1]), "nobody");
    }

    #[test]
    fn test_agent_bits() {
        let mobile = AgentBits::TURTLE.union(AgentBits::LINK);
        assert!(mobile.contains(AgentBits::TURTLE));
        assert!(!mobile.contains(AgentBits::PATCH));
        assert!(mobile.intersects(AgentBits::ALL));
        assert!(!AgentBits::NONE.intersects(mobile));
        assert_eq!(AgentKind::Patch.bit(), AgentBits::PATCH);
    }
}
