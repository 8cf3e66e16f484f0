//! Units of work
//!
//! A job runs one procedure over one agent set. The scheduler routes jobs by
//! [`Job::exclusive`]: exclusive jobs are run to completion with
//! [`Job::run`] and nothing else touches the world meanwhile; other jobs are
//! advanced incrementally with [`Job::step`].

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use super::activation::Activation;
use super::context::Context;
use super::error::{JobError, JobResult};
use super::interpreter::ExecEnv;
use super::procedure::Procedure;
use super::value::Value;
use super::workspace::{RandomSource, Workspace};
use crate::world::AgentSet;

/// Identity of whoever asked for a job to run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobOwner {
    /// Unique owner id
    pub id: Uuid,
    /// Display name, e.g. the button or console that started the job
    pub name: String,
}

impl JobOwner {
    /// Create an owner with a fresh id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Counts from a completed exclusive run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSummary {
    /// Agents in the snapshot taken at the start of the run
    pub snapshot_size: usize,
    /// Agents whose execution was started
    pub executed: usize,
    /// Snapshot members that died before their turn
    pub skipped: usize,
}

/// A unit of work the scheduler can run
pub trait Job {
    /// Who requested the job
    fn owner(&self) -> &JobOwner;

    /// Whether the job must run to completion without interleaving
    fn exclusive(&self) -> bool;

    /// Run the job to completion
    fn run(&mut self) -> JobResult<RunSummary>;

    /// Advance the job incrementally
    fn step(&mut self) -> JobResult<()>;
}

/// Where each agent's frame comes from, decided once at construction
#[derive(Debug, Clone)]
enum FrameSource {
    /// Reuse the invoking context's frame for every agent
    Caller(Arc<Activation>),
    /// Build one root frame per run
    Fresh,
}

/// Job that runs a procedure for every agent in a set, one agent at a time,
/// before returning.
#[derive(Debug)]
pub struct ExclusiveJob {
    owner: JobOwner,
    agentset: AgentSet,
    procedure: Arc<Procedure>,
    address: usize,
    frame: FrameSource,
    workspace: Workspace,
    random: RandomSource,
}

impl ExclusiveJob {
    /// Create a job. With a `caller_frame`, every agent runs in that frame so
    /// nested calls share the invoker's lineage; without one, each run builds
    /// a fresh root frame for `procedure`.
    pub fn new(
        owner: JobOwner,
        agentset: AgentSet,
        procedure: Arc<Procedure>,
        address: usize,
        caller_frame: Option<Arc<Activation>>,
        workspace: Workspace,
        random: RandomSource,
    ) -> Self {
        let frame = match caller_frame {
            Some(activation) => FrameSource::Caller(activation),
            None => FrameSource::Fresh,
        };
        Self {
            owner,
            agentset,
            procedure,
            address,
            frame,
            workspace,
            random,
        }
    }

    /// Agent set the job runs over
    pub fn agentset(&self) -> &AgentSet {
        &self.agentset
    }

    /// Entry address
    pub fn address(&self) -> usize {
        self.address
    }

    /// Evaluate the procedure as a reporter against the first member of the
    /// agent set. No shuffling and no iteration.
    pub fn call_reporter_procedure(&self) -> JobResult<Value> {
        let mut world = self.workspace.lock_world();
        let mut random = self.random.lock();
        let agent = self
            .agentset
            .first(&world)
            .ok_or(JobError::EmptyAgentSet)?;

        let mut context = Context::new(
            self.owner.clone(),
            Some(agent),
            self.agentset.agent_bit(),
        );
        let activation = Activation::root(Arc::clone(&self.procedure), 0);
        let mut env = ExecEnv::new(&mut world, &mut random);
        let result =
            context.call_reporter_procedure(activation, self.workspace.interpreter(), &mut env);

        result.map_err(|source| JobError::Runtime {
            procedure: context.procedure_name(),
            agent: context.describe_agent(&world),
            ip: context.ip(),
            source,
        })
    }
}

impl Job for ExclusiveJob {
    fn owner(&self) -> &JobOwner {
        &self.owner
    }

    fn exclusive(&self) -> bool {
        true
    }

    fn run(&mut self) -> JobResult<RunSummary> {
        // The world stays locked for the whole pass: no other job can observe
        // it half-visited.
        let mut world = self.workspace.lock_world();
        let mut random = self.random.lock();
        let interpreter = self.workspace.interpreter();
        let trace_agents = self.workspace.config().trace_agents;

        // Snapshot before anything runs so agents hatched during the pass are
        // never visited.
        let mut agents = self.agentset.shufflerator(&world, &mut *random);
        let activation = match &self.frame {
            FrameSource::Caller(activation) => Arc::clone(activation),
            FrameSource::Fresh => Activation::root(Arc::clone(&self.procedure), self.address),
        };
        let mut context = Context::new(self.owner.clone(), None, self.agentset.agent_bit());

        debug!(
            owner = %self.owner.name,
            procedure = %self.procedure.name,
            agents = agents.len(),
            "exclusive job started"
        );

        let mut executed = 0;
        while let Some(agent) = agents.next_live(&world) {
            if self.workspace.halted() {
                warn!(owner = %self.owner.name, executed, "exclusive job halted");
                return Err(JobError::Halted);
            }
            if trace_agents {
                trace!(agent = %world.describe(agent), "running agent");
            }

            context.reset(agent, Arc::clone(&activation), self.address);
            let mut env = ExecEnv::new(&mut world, &mut random);
            if let Err(source) = context.run_exclusive(interpreter, &mut env) {
                let err = JobError::Runtime {
                    procedure: context.procedure_name(),
                    agent: context.describe_agent(&world),
                    ip: context.ip(),
                    source,
                };
                warn!(owner = %self.owner.name, error = %err, "exclusive job aborted");
                return Err(err);
            }
            context.release_agent();
            executed += 1;
        }

        let summary = RunSummary {
            snapshot_size: agents.len(),
            executed,
            skipped: agents.skipped(),
        };
        debug!(
            owner = %self.owner.name,
            executed = summary.executed,
            skipped = summary.skipped,
            "exclusive job finished"
        );
        Ok(summary)
    }

    fn step(&mut self) -> JobResult<()> {
        panic!(
            "exclusive job for {} cannot be stepped; the scheduler must call run()",
            self.owner.name
        )
    }
}
