use rand::Rng;
use rand::seq::SliceRandom;

use super::{AgentId, World};

/// Shuffled, single-pass iteration over a snapshot of an agent collection.
///
/// Membership is copied into a private buffer when the shufflerator is built
/// and the permutation is drawn from the supplied RNG at that point, so the
/// RNG is free for executing code once construction returns. Agents created
/// after construction are never seen. Agents that die before their turn are
/// skipped when [`Shufflerator::next_live`] reaches them.
#[derive(Debug, Clone)]
pub struct Shufflerator {
    buffer: Vec<AgentId>,
    index: usize,
    skipped: usize,
}

impl Shufflerator {
    /// Shuffle `members` using `rng`
    pub fn new<R: Rng + ?Sized>(mut members: Vec<AgentId>, rng: &mut R) -> Self {
        members.shuffle(rng);
        Self {
            buffer: members,
            index: 0,
            skipped: 0,
        }
    }

    /// Next member that is still alive in `world`
    pub fn next_live(&mut self, world: &World) -> Option<AgentId> {
        while let Some(&id) = self.buffer.get(self.index) {
            self.index += 1;
            if world.is_alive(id) {
                return Some(id);
            }
            self.skipped += 1;
        }
        None
    }

    /// Size of the snapshot
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the snapshot was empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Snapshot entries not yet reached
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.index
    }

    /// Dead agents passed over so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Drain against a world that will not change, yielding living members
    pub fn live(mut self, world: &World) -> impl Iterator<Item = AgentId> + '_ {
        std::iter::from_fn(move || self.next_live(world))
    }
}
