use parking_lot::{Mutex, MutexGuard};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::interpreter::{BasicInterpreter, Interpreter};
use crate::config::VmConfig;
use crate::world::World;

/// Execution environment shared by every job in a model.
///
/// Cloning is cheap; clones refer to the same world, interpreter and halt
/// flag.
#[derive(Clone)]
pub struct Workspace {
    world: Arc<Mutex<World>>,
    interpreter: Arc<dyn Interpreter>,
    halted: Arc<AtomicBool>,
    config: Arc<VmConfig>,
}

impl Workspace {
    /// Create a workspace around an existing world
    pub fn new(world: World, interpreter: Arc<dyn Interpreter>, config: VmConfig) -> Self {
        Self {
            world: Arc::new(Mutex::new(world)),
            interpreter,
            halted: Arc::new(AtomicBool::new(false)),
            config: Arc::new(config),
        }
    }

    /// Workspace using the reference interpreter and default configuration
    pub fn with_world(world: World) -> Self {
        Self::new(world, Arc::new(BasicInterpreter), VmConfig::default())
    }

    /// Lock the world
    pub fn lock_world(&self) -> MutexGuard<'_, World> {
        self.world.lock()
    }

    /// Interpreter used to drive contexts
    pub fn interpreter(&self) -> &dyn Interpreter {
        self.interpreter.as_ref()
    }

    /// Active configuration
    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// Ask running jobs to stop at the next agent boundary
    pub fn halt(&self) {
        self.halted.store(true, Ordering::SeqCst);
    }

    /// Allow jobs to run again after a halt
    pub fn clear_halt(&self) {
        self.halted.store(false, Ordering::SeqCst);
    }

    /// Whether a halt has been requested
    pub fn halted(&self) -> bool {
        self.halted.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("halted", &self.halted())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Shared, seedable random source
#[derive(Debug, Clone)]
pub struct RandomSource(Arc<Mutex<SmallRng>>);

impl RandomSource {
    /// Deterministic source for a seed
    pub fn seeded(seed: u64) -> Self {
        Self(Arc::new(Mutex::new(SmallRng::seed_from_u64(seed))))
    }

    /// Source seeded from the configuration
    pub fn from_config(config: &VmConfig) -> Self {
        Self::seeded(config.effective_seed())
    }

    /// Lock the generator
    pub fn lock(&self) -> MutexGuard<'_, SmallRng> {
        self.0.lock()
    }
}
