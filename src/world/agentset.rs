use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{AgentBits, AgentId, AgentKind, Shufflerator, World};

/// A collection of agents of one kind.
///
/// A breed set is live: its membership is whatever the world holds for that
/// breed at the moment it is read, so it grows and shrinks as agents are
/// created and killed. A fixed set holds an explicit member list; members
/// that have died are simply no longer reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AgentSet {
    /// Every living member of a breed
    Breed {
        /// Kind shared by the breed's members
        kind: AgentKind,
        /// Breed name
        name: String,
    },
    /// An explicit list of agents
    Fixed {
        /// Kind shared by the members
        kind: AgentKind,
        /// Members in natural order
        members: Vec<AgentId>,
    },
}

impl AgentSet {
    /// Live set over a breed
    pub fn breed(kind: AgentKind, name: impl Into<String>) -> Self {
        AgentSet::Breed {
            kind,
            name: name.into(),
        }
    }

    /// The default `turtles` breed
    pub fn turtles() -> Self {
        Self::breed(AgentKind::Turtle, "turtles")
    }

    /// Fixed set over explicit members
    pub fn fixed(kind: AgentKind, members: Vec<AgentId>) -> Self {
        AgentSet::Fixed { kind, members }
    }

    /// Kind of the set's members
    pub fn kind(&self) -> AgentKind {
        match self {
            AgentSet::Breed { kind, .. } | AgentSet::Fixed { kind, .. } => *kind,
        }
    }

    /// Type tag for contexts executing over this set
    pub fn agent_bit(&self) -> AgentBits {
        self.kind().bit()
    }

    /// Living members in natural order
    pub fn members(&self, world: &World) -> Vec<AgentId> {
        match self {
            AgentSet::Breed { name, .. } => world.breed_members(name).to_vec(),
            AgentSet::Fixed { members, .. } => members
                .iter()
                .copied()
                .filter(|id| world.is_alive(*id))
                .collect(),
        }
    }

    /// First living member in natural order
    pub fn first(&self, world: &World) -> Option<AgentId> {
        match self {
            AgentSet::Breed { name, .. } => world.breed_members(name).first().copied(),
            AgentSet::Fixed { members, .. } => {
                members.iter().copied().find(|id| world.is_alive(*id))
            }
        }
    }

    /// Number of living members
    pub fn count(&self, world: &World) -> usize {
        match self {
            AgentSet::Breed { name, .. } => world.breed_members(name).len(),
            AgentSet::Fixed { members, .. } => {
                members.iter().filter(|id| world.is_alive(**id)).count()
            }
        }
    }

    /// Whether the set currently has no living members
    pub fn is_empty(&self, world: &World) -> bool {
        self.first(world).is_none()
    }

    /// Snapshot the current membership in shuffled order
    pub fn shufflerator<R: Rng + ?Sized>(&self, world: &World, rng: &mut R) -> Shufflerator {
        Shufflerator::new(self.members(world), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breed_set_is_live() {
        let mut world = World::new();
        let ids = world.create_turtles("turtles", 2);
        let set = AgentSet::turtles();
        assert_eq!(set.count(&world), 2);

        world.create_turtles("turtles", 1);
        world.create_turtles("wolves", 4);
        assert_eq!(set.count(&world), 3);

        world.kill(ids[0]);
        assert_eq!(set.first(&world), Some(ids[1]));
        assert_eq!(set.agent_bit(), AgentBits::TURTLE);
    }

    #[test]
    fn test_fixed_set_drops_dead_members() {
        let mut world = World::new();
        let ids = world.create_turtles("turtles", 3);
        let set = AgentSet::fixed(AgentKind::Turtle, ids.clone());

        world.kill(ids[0]);
        world.create_turtles("turtles", 1);

        assert_eq!(set.members(&world), vec![ids[1], ids[2]]);
        assert_eq!(set.first(&world), Some(ids[1]));
        assert_eq!(set.count(&world), 2);
    }

    #[test]
    fn test_empty_set() {
        let world = World::new();
        let set = AgentSet::breed(AgentKind::Patch, "patches");
        assert!(set.is_empty(&world));
        assert_eq!(set.agent_bit(), AgentBits::PATCH);
    }
}
